#![warn(missing_docs)]

//! Error types for the projection library.
//!
//! This module defines error types that can occur while describing a grid
//! or the pixel extents of its tiles.

use core::fmt;

/// Errors that can occur when building grid dimensions or a projection.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Error for invalid grid dimensions.
    /// This variant is returned when a grid extent is zero or the tile count overflows.
    InvalidDimensions(&'static str),
    /// Error for an invalid tile size.
    /// This variant is returned when a tile width or height is not positive.
    InvalidTileSize(&'static str),
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::InvalidDimensions(msg) => write!(f, "Invalid grid dimensions: {}", msg),
            ProjectionError::InvalidTileSize(msg) => write!(f, "Invalid tile size: {}", msg),
        }
    }
}

impl core::error::Error for ProjectionError {}
