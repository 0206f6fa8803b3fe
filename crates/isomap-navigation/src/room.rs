use isomap_projection::{GridDimensions, TileCoord};

use crate::error::NavigationError;

/// Partition of the grid into fixed-size rectangular rooms.
///
/// Rooms are `room_row` tiles wide along x and `room_col` tiles along y.
/// Ids start at 1 in the room holding tile `(0, 0)` and count along x first.
/// Rooms on the far edges are clipped to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomIndex {
    dims: GridDimensions,
    room_row: u32,
    room_col: u32,
    per_row: u32,
    per_col: u32,
}

impl RoomIndex {
    /// Creates a room index.
    ///
    /// # Errors
    /// Returns `Err(NavigationError::InvalidRoomSize)` if either room extent is zero.
    pub fn new(dims: GridDimensions, room_row: u32, room_col: u32) -> Result<Self, NavigationError> {
        if room_row == 0 || room_col == 0 {
            return Err(NavigationError::InvalidRoomSize("Room row and col must be non-zero"));
        }
        Ok(RoomIndex {
            dims,
            room_row,
            room_col,
            per_row: dims.row.div_ceil(room_row),
            per_col: dims.col.div_ceil(room_col),
        })
    }

    /// Total number of rooms.
    pub fn room_count(&self) -> u32 {
        self.per_row * self.per_col
    }

    /// Room extents in tiles, `(room_row, room_col)`.
    pub fn room_size(&self) -> (u32, u32) {
        (self.room_row, self.room_col)
    }

    /// Id of the room holding `tile`, or `-1` if the tile is outside the grid.
    pub fn room_id(&self, tile: TileCoord) -> i64 {
        if !self.dims.contains(tile) {
            return -1;
        }
        let room_x = i64::from(tile.x) / i64::from(self.room_row) + 1;
        let room_y = i64::from(tile.y) / i64::from(self.room_col) + 1;
        (room_y - 1) * i64::from(self.per_row) + room_x
    }

    /// One-based `(row, col)` of a room: `row` counts along y, `col` along x.
    pub fn room_row_col(&self, id: i64) -> Option<(u32, u32)> {
        if id < 1 || id > i64::from(self.room_count()) {
            return None;
        }
        let id = id as u32;
        let row = id.div_ceil(self.per_row);
        let col = match id % self.per_row {
            0 => self.per_row,
            rem => rem,
        };
        Some((row, col))
    }

    /// Corner tiles of a room in clockwise order: `(x, y)`, `(max_x, y)`,
    /// `(max_x, max_y)`, `(x, max_y)`.
    pub fn clockwise_vertices(&self, id: i64) -> Option<[TileCoord; 4]> {
        let (row, col) = self.room_row_col(id)?;
        let x = (col - 1) * self.room_row;
        let y = (row - 1) * self.room_col;
        let max_x = (x + self.room_row).min(self.dims.row) - 1;
        let max_y = (y + self.room_col).min(self.dims.col) - 1;
        let (x, y, max_x, max_y) = (x as i32, y as i32, max_x as i32, max_y as i32);
        Some([
            TileCoord::new(x, y),
            TileCoord::new(max_x, y),
            TileCoord::new(max_x, max_y),
            TileCoord::new(x, max_y),
        ])
    }

    /// Distinct ids of the rooms holding any in-bounds tile of `tiles`, in
    /// first-seen order.
    pub fn rooms_touching(&self, tiles: &[TileCoord]) -> Vec<i64> {
        let mut ids = Vec::new();
        for &tile in tiles {
            let id = self.room_id(tile);
            if id > 0 && !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn index(row: u32, col: u32, room_row: u32, room_col: u32) -> RoomIndex {
        RoomIndex::new(GridDimensions::new(row, col).unwrap(), room_row, room_col).unwrap()
    }

    #[test]
    fn test_room_size_validation() {
        let dims = GridDimensions::new(10, 10).unwrap();
        assert!(matches!(RoomIndex::new(dims, 0, 5), Err(NavigationError::InvalidRoomSize(_))));
        assert!(matches!(RoomIndex::new(dims, 5, 0), Err(NavigationError::InvalidRoomSize(_))));
    }

    #[test]
    fn test_fifty_by_fifty_with_ten_tile_rooms() {
        let rooms = index(50, 50, 10, 10);
        assert_eq!(rooms.room_count(), 25);
        assert_eq!(rooms.room_id(TileCoord::new(0, 0)), 1);
        assert_eq!(rooms.room_id(TileCoord::new(9, 9)), 1);
        assert_eq!(rooms.room_id(TileCoord::new(10, 0)), 2);
        assert_eq!(rooms.room_id(TileCoord::new(0, 10)), 6);
        assert_eq!(rooms.room_id(TileCoord::new(49, 49)), 25);
        assert_eq!(
            rooms.clockwise_vertices(7),
            Some([
                TileCoord::new(10, 10),
                TileCoord::new(19, 10),
                TileCoord::new(19, 19),
                TileCoord::new(10, 19),
            ])
        );
    }

    #[test]
    fn test_outside_tiles_have_no_room() {
        let rooms = index(20, 20, 10, 10);
        assert_eq!(rooms.room_id(TileCoord::new(-1, 3)), -1);
        assert_eq!(rooms.room_id(TileCoord::new(3, -1)), -1);
        assert_eq!(rooms.room_id(TileCoord::new(20, 0)), -1);
    }

    #[test]
    fn test_row_col() {
        let rooms = index(30, 20, 10, 10);
        assert_eq!(rooms.room_row_col(1), Some((1, 1)));
        assert_eq!(rooms.room_row_col(3), Some((1, 3)));
        assert_eq!(rooms.room_row_col(4), Some((2, 1)));
        assert_eq!(rooms.room_row_col(6), Some((2, 3)));
        assert_eq!(rooms.room_row_col(0), None);
        assert_eq!(rooms.room_row_col(7), None);
    }

    #[test]
    fn test_rooms_partition_grid() {
        // Uneven edges on both axes.
        let rooms = index(23, 17, 5, 4);
        let mut counts: HashMap<i64, u32> = HashMap::new();
        for x in 0..23 {
            for y in 0..17 {
                let id = rooms.room_id(TileCoord::new(x, y));
                assert!(id >= 1 && id <= i64::from(rooms.room_count()));
                let [min, _, max, _] = rooms.clockwise_vertices(id).unwrap();
                assert!(min.x <= x && x <= max.x && min.y <= y && y <= max.y);
                *counts.entry(id).or_default() += 1;
            }
        }
        assert_eq!(counts.len() as u32, rooms.room_count());

        // Every room's rectangle holds exactly the tiles mapped to it.
        for (id, count) in counts {
            let [min, _, max, _] = rooms.clockwise_vertices(id).unwrap();
            let area = ((max.x - min.x + 1) * (max.y - min.y + 1)) as u32;
            assert_eq!(area, count);
        }
    }

    #[test]
    fn test_edge_rooms_are_clipped() {
        let rooms = index(23, 17, 5, 4);
        let last = i64::from(rooms.room_count());
        assert_eq!(
            rooms.clockwise_vertices(last),
            Some([
                TileCoord::new(20, 16),
                TileCoord::new(22, 16),
                TileCoord::new(22, 16),
                TileCoord::new(20, 16),
            ])
        );
    }

    #[test]
    fn test_rooms_touching() {
        let rooms = index(50, 50, 10, 10);
        let tiles = [
            TileCoord::new(0, 0),
            TileCoord::new(5, 5),
            TileCoord::new(45, 0),
            TileCoord::new(-3, 2),
            TileCoord::new(45, 45),
        ];
        assert_eq!(rooms.rooms_touching(&tiles), vec![1, 5, 25]);
    }
}
