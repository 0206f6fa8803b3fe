use std::collections::HashSet;

use isomap_projection::{Gid, GridDimensions, TileCoord};

use super::layers::{LayerKind, LayerSource};

/// Impassable tiles of a map, keyed by GID.
///
/// Built once per map load and never mutated afterwards, so it can be shared
/// across threads by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct BarrierSet {
    dims: GridDimensions,
    tiles: HashSet<Gid>,
}

impl BarrierSet {
    /// Scans the layers of `source`.
    ///
    /// A tile is a barrier when the barrier layer holds a non-zero value for
    /// it, or when the floor layer holds `0`. Absent layers and entries past
    /// the end of a short layer contribute nothing.
    pub fn build<S: LayerSource + ?Sized>(source: &S) -> Self {
        let dims = source.dimensions();
        let barrier = source.layer(LayerKind::Barrier);
        let floor = source.layer(LayerKind::Floor);

        let tiles = (0..dims.tile_count())
            .filter(|&i| {
                let i = i as usize;
                let blocked = barrier.and_then(|l| l.get(i)).is_some_and(|&v| v > 0);
                let hole = floor.and_then(|l| l.get(i)).is_some_and(|&v| v == 0);
                blocked || hole
            })
            .map(Gid)
            .collect();

        BarrierSet { dims, tiles }
    }

    /// A set with no barriers.
    pub fn empty(dims: GridDimensions) -> Self {
        BarrierSet { dims, tiles: HashSet::new() }
    }

    /// Returns `true` if `tile` is impassable. Out-of-bounds tiles are not.
    pub fn is_barrier(&self, tile: TileCoord) -> bool {
        self.dims.tile_to_gid(tile).is_some_and(|gid| self.tiles.contains(&gid))
    }

    /// Returns `true` if `gid` is impassable.
    pub fn contains(&self, gid: Gid) -> bool {
        self.tiles.contains(&gid)
    }

    /// Grid the set was built for.
    pub fn dims(&self) -> GridDimensions {
        self.dims
    }

    /// Number of barrier tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns `true` when the map has no barriers.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Barrier tiles in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        self.tiles.iter().map(|&gid| self.dims.gid_to_tile(gid))
    }
}
