//! This module defines the error types used by the `isomap-navigation` crate.

#![warn(missing_docs)]

use isomap_projection::{ProjectionError, TileCoord};

/// Error type for map construction and loading.
///
/// This enum encapsulates all possible errors that can occur while building
/// a map context, a room index or a tile-layer source.
#[derive(Debug, PartialEq)]
pub enum NavigationError {
    /// Error for invalid map dimensions.
    /// This variant is returned when map width or height is zero or too large.
    InvalidDimensions(&'static str),
    /// Error for invalid room extents.
    /// This variant is returned when a room row or column size is zero.
    InvalidRoomSize(&'static str),
    /// Error for a malformed tile layer.
    /// This variant is returned when a layer's length does not match the grid.
    InvalidLayer(&'static str),
    /// Error for a map whose orientation is not isometric.
    UnsupportedOrientation(&'static str),
    /// Error for a map file that cannot be parsed.
    InvalidMapFile(&'static str),
    /// Error raised by the projection library.
    Projection(ProjectionError),
}

impl core::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NavigationError::InvalidDimensions(msg) => write!(f, "Invalid map dimensions: {}", msg),
            NavigationError::InvalidRoomSize(msg) => write!(f, "Invalid room size: {}", msg),
            NavigationError::InvalidLayer(msg) => write!(f, "Invalid tile layer: {}", msg),
            NavigationError::UnsupportedOrientation(msg) => {
                write!(f, "Unsupported map orientation: {}", msg)
            }
            NavigationError::InvalidMapFile(msg) => write!(f, "Invalid map file: {}", msg),
            NavigationError::Projection(err) => write!(f, "Projection error: {}", err),
        }
    }
}

impl core::error::Error for NavigationError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            NavigationError::Projection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProjectionError> for NavigationError {
    fn from(err: ProjectionError) -> Self {
        NavigationError::Projection(err)
    }
}

/// Reasons a path search produced no path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// Start and end are the same tile.
    InvalidEndpoint,
    /// An endpoint is a barrier tile.
    BlockedEndpoint(TileCoord),
    /// An endpoint lies outside the grid.
    OutOfBounds(TileCoord),
    /// The open set emptied before reaching the goal.
    NoPathFound,
    /// The search hit its iteration cap after expanding this many nodes.
    BudgetExceeded(usize),
}

impl core::fmt::Display for PathError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PathError::InvalidEndpoint => write!(f, "Start and end are the same tile"),
            PathError::BlockedEndpoint(tile) => write!(f, "Endpoint {} is a barrier", tile),
            PathError::OutOfBounds(tile) => write!(f, "Endpoint {} is outside the map", tile),
            PathError::NoPathFound => write!(f, "No path found"),
            PathError::BudgetExceeded(n) => {
                write!(f, "Search budget exceeded after expanding {} nodes", n)
            }
        }
    }
}

impl core::error::Error for PathError {}
