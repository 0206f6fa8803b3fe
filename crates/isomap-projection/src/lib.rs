#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for isometric tile grids."]
#![doc = ""]
#![doc = "This crate provides tile and pixel coordinate types, the dense tile index (GID),"]
#![doc = "and the diamond projection between tile space and pixel space."]

use core::cmp::Ordering;
use core::fmt;
use libm::{floor, sqrt};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::ProjectionError;

/// Integer tile indices `(x, y)`.
///
/// `x` runs along the grid's `row` extent and `y` along its `col` extent.
/// Values outside the grid are representable; bounds are checked by
/// [`GridDimensions::contains`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Tile index along the row extent.
    pub x: i32,
    /// Tile index along the column extent.
    pub y: i32,
}

impl TileCoord {
    /// Construct a new tile coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        TileCoord { x, y }
    }

    /// Returns the tile shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        TileCoord { x: self.x + dx, y: self.y + dy }
    }

    /// Taxicab distance between two tiles.
    pub const fn manhattan(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl From<(i32, i32)> for TileCoord {
    fn from((x, y): (i32, i32)) -> Self {
        TileCoord { x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A world-space pixel position.
///
/// The origin is the centre of the map's pixel bounding box and the y axis
/// points up, so the first tile of the grid sits at the top of the diamond.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct PixelPos {
    /// Horizontal position in pixels.
    pub x: f64,
    /// Vertical position in pixels (up is positive).
    pub y: f64,
}

impl PixelPos {
    /// Construct a new pixel position.
    pub const fn new(x: f64, y: f64) -> Self {
        PixelPos { x, y }
    }

    /// Straight-line distance to `other` in pixels.
    pub fn distance(self, other: PixelPos) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        sqrt(dx * dx + dy * dy)
    }

    /// Returns `true` when both axes differ by at most `epsilon`.
    pub fn fuzzy_eq(self, other: PixelPos, epsilon: f64) -> bool {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        -epsilon <= dx && dx <= epsilon && -epsilon <= dy && dy <= epsilon
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: PixelPos, t: f64) -> PixelPos {
        let t = t.clamp(0.0, 1.0);
        PixelPos {
            x: self.x * (1.0 - t) + other.x * t,
            y: self.y * (1.0 - t) + other.y * t,
        }
    }
}

impl fmt::Display for PixelPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}px, {:.1}px)", self.x, self.y)
    }
}

/// A width/height pair in pixels, used for viewport and map extents.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct PixelSize {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl PixelSize {
    /// Construct a new pixel size.
    pub const fn new(width: f64, height: f64) -> Self {
        PixelSize { width, height }
    }

    /// Returns the size scaled independently on each axis.
    pub fn scale(self, sx: f64, sy: f64) -> PixelSize {
        PixelSize { width: self.width * sx, height: self.height * sy }
    }
}

/// Pixel extents of a single tile's diamond.
pub type TileSize = PixelSize;

/// Dense linear tile index: `y * row + x`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Gid(pub u32);

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Size of a tile grid.
///
/// Valid tiles satisfy `0 <= x < row` and `0 <= y < col`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDimensions {
    /// Number of tiles along the x axis.
    pub row: u32,
    /// Number of tiles along the y axis.
    pub col: u32,
}

impl GridDimensions {
    /// Construct new grid dimensions.
    ///
    /// # Errors
    ///
    /// Returns `Err(ProjectionError::InvalidDimensions)` if either extent is zero,
    /// exceeds `i32::MAX`, or the tile count does not fit a [`Gid`].
    pub const fn new(row: u32, col: u32) -> Result<Self, ProjectionError> {
        if row == 0 || col == 0 {
            return Err(ProjectionError::InvalidDimensions("row and col must be non-zero"));
        }
        if row > i32::MAX as u32 || col > i32::MAX as u32 {
            return Err(ProjectionError::InvalidDimensions("extent does not fit a tile coordinate"));
        }
        if row.checked_mul(col).is_none() {
            return Err(ProjectionError::InvalidDimensions("tile count would overflow"));
        }
        Ok(GridDimensions { row, col })
    }

    /// Total number of tiles.
    pub const fn tile_count(&self) -> u32 {
        self.row * self.col
    }

    /// The larger of the two extents.
    pub const fn max_count(&self) -> u32 {
        if self.row > self.col { self.row } else { self.col }
    }

    /// Returns `true` if `tile` lies inside the grid.
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as u32) < self.row && (tile.y as u32) < self.col
    }

    /// Dense index of an in-bounds tile, `None` otherwise.
    pub const fn tile_to_gid(&self, tile: TileCoord) -> Option<Gid> {
        if self.contains(tile) {
            Some(Gid(tile.y as u32 * self.row + tile.x as u32))
        } else {
            None
        }
    }

    /// Tile for a dense index. Inverse of [`tile_to_gid`](Self::tile_to_gid)
    /// for indices below [`tile_count`](Self::tile_count).
    pub const fn gid_to_tile(&self, gid: Gid) -> TileCoord {
        TileCoord::new((gid.0 % self.row) as i32, (gid.0 / self.row) as i32)
    }
}

impl fmt::Display for GridDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.row, self.col)
    }
}

/// Isometric (diamond) projection between tile space and pixel space.
///
/// The map's pixel extents are the bounding box of the diamond:
/// `(row + col) * tile / 2` on each axis. Pixel positions are relative to
/// the centre of that box with y pointing up.
///
/// ```
/// use isomap_projection::{GridDimensions, IsoProjection, PixelPos, TileCoord, TileSize};
///
/// let dims = GridDimensions::new(4, 4).unwrap();
/// let projection = IsoProjection::new(dims, TileSize::new(64.0, 32.0)).unwrap();
/// assert_eq!(projection.tile_to_pixel(TileCoord::new(0, 0)), PixelPos::new(0.0, 48.0));
/// assert_eq!(projection.pixel_to_tile(PixelPos::new(0.0, 48.0)), TileCoord::new(0, 0));
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoProjection {
    dims: GridDimensions,
    tile: TileSize,
    map_size: PixelSize,
}

impl IsoProjection {
    /// Construct a projection for a grid with the given tile size.
    ///
    /// # Errors
    ///
    /// Returns `Err(ProjectionError::InvalidTileSize)` if the tile width or height
    /// is not a positive finite number.
    pub fn new(dims: GridDimensions, tile: TileSize) -> Result<Self, ProjectionError> {
        if !(tile.width > 0.0 && tile.width.is_finite()) {
            return Err(ProjectionError::InvalidTileSize("width must be positive"));
        }
        if !(tile.height > 0.0 && tile.height.is_finite()) {
            return Err(ProjectionError::InvalidTileSize("height must be positive"));
        }
        let side = (dims.row + dims.col) as f64 / 2.0;
        Ok(IsoProjection {
            dims,
            tile,
            map_size: PixelSize::new(side * tile.width, side * tile.height),
        })
    }

    /// Grid covered by this projection.
    pub fn dims(&self) -> GridDimensions {
        self.dims
    }

    /// Pixel size of one tile.
    pub fn tile_size(&self) -> TileSize {
        self.tile
    }

    /// Pixel extents of the whole map.
    pub fn map_size(&self) -> PixelSize {
        self.map_size
    }

    /// Pixel centre of a tile.
    ///
    /// Works for any tile, including ones outside the grid.
    pub fn tile_to_pixel(&self, tile: TileCoord) -> PixelPos {
        let side_length = (self.dims.row + self.dims.col) as f64 / 2.0;
        let zero_width_grid = self.dims.col as f64 / 2.0 + 0.5;
        let (x, y) = (tile.x as f64, tile.y as f64);
        let grid_x = zero_width_grid + (x - y) * 0.5;
        let grid_y = side_length + (-x - y) * 0.5;
        PixelPos {
            x: grid_x * self.tile.width - self.map_size.width / 2.0 - self.tile.width / 2.0,
            y: grid_y * self.tile.height - self.map_size.height / 2.0 - self.tile.height / 2.0,
        }
    }

    /// Tile under a pixel position.
    ///
    /// Never fails; positions off the map yield tiles outside the grid.
    pub fn pixel_to_tile(&self, pixel: PixelPos) -> TileCoord {
        let max_count = self.dims.max_count() as f64;
        let square = PixelSize::new(max_count * self.tile.width, max_count * self.tile.height);

        // Non-square grids sit off-centre inside the max_count square.
        let shift_x = (square.width - self.map_size.width) / 2.0;
        let shift_y = (square.height - self.map_size.height) / 2.0;
        let (x, y) = match self.dims.row.cmp(&self.dims.col) {
            Ordering::Less => (pixel.x - shift_x, pixel.y + shift_y),
            Ordering::Greater => (pixel.x + shift_x, pixel.y + shift_y),
            Ordering::Equal => (pixel.x, pixel.y),
        };

        let tile_pos_x = (x + square.width / 2.0) / self.tile.width;
        let tile_pos_y = (y + square.height / 2.0) / self.tile.height;
        let inverse_tiled_y = max_count - tile_pos_y;
        let half_map = max_count / 2.0;

        TileCoord {
            x: floor(inverse_tiled_y + tile_pos_x - half_map) as i32,
            y: floor(inverse_tiled_y - tile_pos_x + half_map) as i32,
        }
    }

    /// Pixel distance between the centres of two tiles.
    pub fn tile_distance(&self, a: TileCoord, b: TileCoord) -> f64 {
        self.tile_to_pixel(a).distance(self.tile_to_pixel(b))
    }
}

impl fmt::Display for IsoProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IsoProjection ({} tiles, tile: {}x{}px, map: {}x{}px)",
            self.dims, self.tile.width, self.tile.height, self.map_size.width, self.map_size.height
        )
    }
}
