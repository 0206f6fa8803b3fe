#![warn(missing_docs)]

use isomap_projection::{GridDimensions, TileCoord};
use rand::Rng;

use crate::error::NavigationError;

/// Tile layers that feed the barrier index.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerKind {
    /// Non-zero values mark impassable tiles.
    Barrier = 0,
    /// Zero values mark holes in the floor, which are impassable too.
    Floor = 1,
}

impl LayerKind {
    /// Layer name as it appears in map files.
    pub const fn name(&self) -> &'static str {
        match self {
            LayerKind::Barrier => "barrier",
            LayerKind::Floor => "floor",
        }
    }

    /// Looks up a layer kind by its map-file name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "barrier" => Some(LayerKind::Barrier),
            "floor" => Some(LayerKind::Floor),
            _ => None,
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Anything that can hand out per-tile layer values indexed by GID.
pub trait LayerSource {
    /// Size of the grid the layers describe.
    fn dimensions(&self) -> GridDimensions;

    /// Values of a layer in GID order, or `None` if the map lacks it.
    fn layer(&self, kind: LayerKind) -> Option<&[u32]>;
}

/// In-memory tile layers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileLayers {
    dims: GridDimensions,
    barrier: Option<Vec<u32>>,
    floor: Option<Vec<u32>>,
}

impl TileLayers {
    /// Creates a source with no layers at all. Every tile is walkable.
    pub fn empty(dims: GridDimensions) -> Self {
        TileLayers { dims, barrier: None, floor: None }
    }

    /// Creates a source with a complete floor and no barriers.
    pub fn open(dims: GridDimensions) -> Self {
        TileLayers {
            dims,
            barrier: None,
            floor: Some(vec![1; dims.tile_count() as usize]),
        }
    }

    /// Replaces a layer with `data`.
    ///
    /// # Errors
    /// Returns `Err(NavigationError::InvalidLayer)` if `data` does not hold
    /// exactly one value per tile.
    pub fn with_layer(mut self, kind: LayerKind, data: Vec<u32>) -> Result<Self, NavigationError> {
        if data.len() != self.dims.tile_count() as usize {
            return Err(NavigationError::InvalidLayer("Layer length must equal row * col"));
        }
        *self.slot(kind) = Some(data);
        Ok(self)
    }

    /// Marks `tiles` as barriers, creating the barrier layer if needed.
    /// Out-of-bounds tiles are ignored.
    pub fn with_barriers<I>(mut self, tiles: I) -> Self
    where
        I: IntoIterator<Item = TileCoord>,
    {
        for tile in tiles {
            self.set_barrier(tile, true);
        }
        self
    }

    /// Sets or clears the barrier flag of one tile. Returns `false` if the
    /// tile is outside the grid.
    pub fn set_barrier(&mut self, tile: TileCoord, blocked: bool) -> bool {
        let Some(gid) = self.dims.tile_to_gid(tile) else {
            return false;
        };
        let count = self.dims.tile_count() as usize;
        let layer = self.barrier.get_or_insert_with(|| vec![0; count]);
        layer[gid.0 as usize] = u32::from(blocked);
        true
    }

    /// Generates an open map with `obstacles` rectangular obstacles, each
    /// between 1 and `max_size` tiles on a side.
    pub fn random<R: Rng>(
        dims: GridDimensions,
        obstacles: usize,
        max_size: u32,
        rng: &mut R,
    ) -> Self {
        let max_size = max_size.max(1);
        let mut layers = TileLayers::open(dims);
        for _ in 0..obstacles {
            let start_x = rng.random_range(0..dims.row);
            let start_y = rng.random_range(0..dims.col);
            let width = rng.random_range(1..=max_size);
            let height = rng.random_range(1..=max_size);

            for x in start_x..(start_x + width).min(dims.row) {
                for y in start_y..(start_y + height).min(dims.col) {
                    layers.set_barrier(TileCoord::new(x as i32, y as i32), true);
                }
            }
        }
        layers
    }

    fn slot(&mut self, kind: LayerKind) -> &mut Option<Vec<u32>> {
        match kind {
            LayerKind::Barrier => &mut self.barrier,
            LayerKind::Floor => &mut self.floor,
        }
    }
}

impl LayerSource for TileLayers {
    fn dimensions(&self) -> GridDimensions {
        self.dims
    }

    fn layer(&self, kind: LayerKind) -> Option<&[u32]> {
        match kind {
            LayerKind::Barrier => self.barrier.as_deref(),
            LayerKind::Floor => self.floor.as_deref(),
        }
    }
}

#[cfg(feature = "serde")]
pub use tiled::TiledMap;

#[cfg(feature = "serde")]
mod tiled {
    use isomap_projection::{GridDimensions, TileSize};
    use serde::Deserialize;
    use tracing::{debug, warn};

    use super::{LayerKind, LayerSource, TileLayers};
    use crate::error::NavigationError;

    #[derive(Debug, Deserialize)]
    struct RawMap {
        width: u32,
        height: u32,
        tilewidth: f64,
        tileheight: f64,
        orientation: String,
        #[serde(default)]
        layers: Vec<RawLayer>,
    }

    #[derive(Debug, Deserialize)]
    struct RawLayer {
        name: String,
        // Object groups carry no tile data.
        #[serde(default)]
        data: Option<Vec<u32>>,
    }

    /// A map loaded from a Tiled JSON export.
    ///
    /// Only isometric maps are accepted. Layers named `barrier` and `floor`
    /// are kept; all others are ignored.
    #[derive(Debug, Clone, PartialEq)]
    pub struct TiledMap {
        layers: TileLayers,
        tile_size: TileSize,
    }

    impl TiledMap {
        /// Parses a Tiled JSON document.
        ///
        /// # Errors
        /// * `InvalidMapFile` if the JSON is malformed.
        /// * `UnsupportedOrientation` if the map is not isometric.
        /// * `InvalidDimensions` if the map is empty.
        /// * `InvalidLayer` if a kept layer has the wrong number of tiles.
        pub fn from_json(json: &str) -> Result<Self, NavigationError> {
            let raw: RawMap = serde_json::from_str(json).map_err(|e| {
                warn!("Failed to parse Tiled map: {}", e);
                NavigationError::InvalidMapFile("Malformed Tiled JSON")
            })?;

            if raw.orientation != "isometric" {
                return Err(NavigationError::UnsupportedOrientation(
                    "Only isometric maps are supported",
                ));
            }
            let dims = GridDimensions::new(raw.width, raw.height)
                .map_err(|_| NavigationError::InvalidDimensions("Map width and height must be non-zero"))?;
            let tile_size = TileSize::new(raw.tilewidth, raw.tileheight);

            let mut layers = TileLayers::empty(dims);
            for layer in raw.layers {
                let Some(kind) = LayerKind::from_name(&layer.name) else {
                    debug!(name = %layer.name, "Skipping unused map layer");
                    continue;
                };
                let Some(data) = layer.data else {
                    return Err(NavigationError::InvalidLayer("Tile layer has no data"));
                };
                layers = layers.with_layer(kind, data)?;
            }

            Ok(TiledMap { layers, tile_size })
        }

        /// Pixel size of one tile as declared by the map.
        pub fn tile_size(&self) -> TileSize {
            self.tile_size
        }

        /// The parsed layers.
        pub fn layers(&self) -> &TileLayers {
            &self.layers
        }

        /// Consumes the map, returning its layers.
        pub fn into_layers(self) -> TileLayers {
            self.layers
        }
    }

    impl LayerSource for TiledMap {
        fn dimensions(&self) -> GridDimensions {
            self.layers.dimensions()
        }

        fn layer(&self, kind: LayerKind) -> Option<&[u32]> {
            self.layers.layer(kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_open_layers() {
        let dims = GridDimensions::new(4, 3).unwrap();
        let layers = TileLayers::open(dims);
        assert_eq!(layers.dimensions(), dims);
        assert_eq!(layers.layer(LayerKind::Floor).map(|l| l.len()), Some(12));
        assert!(layers.layer(LayerKind::Barrier).is_none());
    }

    #[test]
    fn test_with_layer_checks_length() {
        let dims = GridDimensions::new(2, 2).unwrap();
        let result = TileLayers::empty(dims).with_layer(LayerKind::Barrier, vec![0, 1, 0]);
        assert!(matches!(result, Err(NavigationError::InvalidLayer(_))));
        let layers = TileLayers::empty(dims).with_layer(LayerKind::Barrier, vec![0, 1, 0, 0]).unwrap();
        assert_eq!(layers.layer(LayerKind::Barrier), Some(&[0, 1, 0, 0][..]));
    }

    #[test]
    fn test_set_barrier() {
        let dims = GridDimensions::new(3, 3).unwrap();
        let mut layers = TileLayers::open(dims).with_barriers([TileCoord::new(1, 2), TileCoord::new(9, 9)]);
        assert_eq!(layers.layer(LayerKind::Barrier).unwrap()[7], 1);
        assert!(!layers.set_barrier(TileCoord::new(-1, 0), true));
        assert!(layers.set_barrier(TileCoord::new(1, 2), false));
        assert!(layers.layer(LayerKind::Barrier).unwrap().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_random_is_reproducible() {
        let dims = GridDimensions::new(20, 15).unwrap();
        let a = TileLayers::random(dims, 10, 3, &mut StdRng::seed_from_u64(7));
        let b = TileLayers::random(dims, 10, 3, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        let blocked = a.layer(LayerKind::Barrier).unwrap().iter().filter(|&&v| v > 0).count();
        assert!(blocked >= 1 && blocked <= 90);
    }

    #[test]
    fn test_layer_names() {
        assert_eq!(LayerKind::from_name("barrier"), Some(LayerKind::Barrier));
        assert_eq!(LayerKind::from_name(LayerKind::Floor.name()), Some(LayerKind::Floor));
        assert_eq!(LayerKind::from_name("objects"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tiled_map_from_json() {
        let json = r#"{
            "width": 3, "height": 2, "tilewidth": 64, "tileheight": 32,
            "orientation": "isometric",
            "layers": [
                {"name": "floor", "data": [1, 1, 1, 1, 0, 1]},
                {"name": "barrier", "data": [0, 0, 5, 0, 0, 0]},
                {"name": "decor", "data": [0, 0, 0, 0, 0, 0]},
                {"name": "spawns", "objects": []}
            ]
        }"#;
        let map = TiledMap::from_json(json).unwrap();
        assert_eq!(map.dimensions(), GridDimensions::new(3, 2).unwrap());
        assert_eq!(map.tile_size(), isomap_projection::TileSize::new(64.0, 32.0));
        assert_eq!(map.layer(LayerKind::Barrier).unwrap()[2], 5);
        assert_eq!(map.layer(LayerKind::Floor).unwrap()[4], 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_tiled_map_rejects_bad_input() {
        assert!(matches!(TiledMap::from_json("{"), Err(NavigationError::InvalidMapFile(_))));

        let orthogonal = r#"{"width": 2, "height": 2, "tilewidth": 32, "tileheight": 32,
            "orientation": "orthogonal", "layers": []}"#;
        assert!(matches!(
            TiledMap::from_json(orthogonal),
            Err(NavigationError::UnsupportedOrientation(_))
        ));

        let short = r#"{"width": 2, "height": 2, "tilewidth": 64, "tileheight": 32,
            "orientation": "isometric", "layers": [{"name": "barrier", "data": [0, 1]}]}"#;
        assert!(matches!(TiledMap::from_json(short), Err(NavigationError::InvalidLayer(_))));
    }
}
