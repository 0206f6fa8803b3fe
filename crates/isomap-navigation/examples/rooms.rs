use isomap_navigation::RoomIndex;
use isomap_navigation::projection::{GridDimensions, TileCoord};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 23x17 grid split into 5x4 rooms; the last column and row of rooms are clipped
    let dims = GridDimensions::new(23, 17)?;
    let rooms = RoomIndex::new(dims, 5, 4)?;
    println!("{} rooms on a {} grid", rooms.room_count(), dims);

    for y in 0..dims.col as i32 {
        for x in 0..dims.row as i32 {
            print!("{:>3}", rooms.room_id(TileCoord::new(x, y)));
        }
        println!();
    }

    for id in [1, 5, rooms.room_count() as i64] {
        if let (Some((row, col)), Some(vertices)) = (rooms.room_row_col(id), rooms.clockwise_vertices(id)) {
            println!(
                "Room {} (row {}, col {}): {}",
                id,
                row,
                col,
                vertices.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" -> ")
            );
        }
    }
    Ok(())
}
