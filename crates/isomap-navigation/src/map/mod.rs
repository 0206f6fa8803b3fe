//! Map-related functionality for navigation.
//!
//! This module provides the tile-layer sources a map is loaded from, the
//! barrier index built from them, and the per-map service context.

pub mod barrier;
pub mod context;
pub mod layers;

pub use barrier::BarrierSet;
pub use context::{MapContext, MapOptions};
#[cfg(feature = "serde")]
pub use layers::TiledMap;
pub use layers::{LayerKind, LayerSource, TileLayers};
