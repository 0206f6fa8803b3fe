//! Viewport visibility: which tiles a rectangular camera view covers, and
//! what changed since the last camera move.
//!
//! On an isometric grid a screen rectangle covers a diamond-shaped block of
//! tiles. The block is described by four vertex tiles; every tile `(x, y)`
//! with `x + y` and `x - y` inside the vertices' ranges is part of it.

use std::collections::HashMap;

use isomap_projection::{Gid, GridDimensions, IsoProjection, PixelPos, PixelSize, TileCoord};
use tracing::debug;

/// Marks the four vertex tiles of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CornerFlag {
    /// An ordinary tile.
    Plain,
    /// One of the view's vertex tiles.
    Corner,
}

/// A tile in the visible list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleTile {
    /// The tile.
    pub coord: TileCoord,
    /// Whether it is a vertex of the view.
    pub corner: CornerFlag,
}

/// When the tracker recomputes the view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Granularity {
    /// Recompute when the camera centre moves to another tile.
    #[default]
    Tile,
    /// Recompute when the camera centre moves more than `epsilon` pixels on
    /// either axis.
    Pixel {
        /// Per-axis movement threshold in pixels.
        epsilon: f64,
    },
}

/// The visible tiles of one camera position.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    dims: GridDimensions,
    /// `[left_up, right_up, left_down, right_down]`.
    pub vertices: [TileCoord; 4],
    /// Visible tiles in walk order, corners flagged.
    pub tiles: Vec<VisibleTile>,
    /// Visible tiles keyed by GID.
    pub visible: HashMap<Gid, TileCoord>,
}

impl ViewSnapshot {
    /// Computes the view of a `area`-sized rectangle centred on `center`.
    pub fn compute(projection: &IsoProjection, center: PixelPos, area: PixelSize) -> Self {
        let dims = projection.dims();
        let vertices = view_vertices(projection, center, area);
        let tiles = visible_tiles(dims, &vertices);
        let visible = tiles
            .iter()
            .filter_map(|t| dims.tile_to_gid(t.coord).map(|gid| (gid, t.coord)))
            .collect();
        ViewSnapshot { dims, vertices, tiles, visible }
    }

    /// Returns `true` if `tile` is visible.
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.dims.tile_to_gid(tile).is_some_and(|gid| self.visible.contains_key(&gid))
    }

    /// Number of visible tiles.
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    /// Returns `true` when no in-bounds tile is visible.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

/// Tiles that left and entered the view between two snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewDelta {
    /// Visible before, not visible now.
    pub removed: HashMap<Gid, TileCoord>,
    /// Visible now, not visible before.
    pub added: HashMap<Gid, TileCoord>,
}

impl ViewDelta {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    /// Every tile whose visibility changed.
    pub fn changed(&self) -> impl Iterator<Item = (&Gid, &TileCoord)> + '_ {
        self.removed.iter().chain(self.added.iter())
    }
}

/// Splits the change from `prev` to `next` into removed and added tiles.
pub fn diff(prev: &HashMap<Gid, TileCoord>, next: &HashMap<Gid, TileCoord>) -> ViewDelta {
    let removed = prev
        .iter()
        .filter(|(gid, _)| !next.contains_key(gid))
        .map(|(&gid, &tile)| (gid, tile))
        .collect();
    let added = next
        .iter()
        .filter(|(gid, _)| !prev.contains_key(gid))
        .map(|(&gid, &tile)| (gid, tile))
        .collect();
    ViewDelta { removed, added }
}

/// Vertex tiles of the diamond covering a pixel rectangle.
///
/// Returns `[left_up, right_up, left_down, right_down]`: the tiles with the
/// smallest x, smallest y, largest y and largest x. The diamond is grown by
/// one tile on every side of the corner tiles' bounds, then by one more where
/// needed so all four vertices are whole tiles. The result may extend past
/// the grid; [`visible_tiles`] clips it.
pub fn view_vertices(projection: &IsoProjection, center: PixelPos, area: PixelSize) -> [TileCoord; 4] {
    let half_w = area.width / 2.0;
    let half_h = area.height / 2.0;
    let left_up = projection.pixel_to_tile(PixelPos::new(center.x - half_w, center.y + half_h));
    let right_up = projection.pixel_to_tile(PixelPos::new(center.x + half_w, center.y + half_h));
    let left_down = projection.pixel_to_tile(PixelPos::new(center.x - half_w, center.y - half_h));
    let right_down = projection.pixel_to_tile(PixelPos::new(center.x + half_w, center.y - half_h));

    // x + y grows downwards on screen, x - y grows to the right.
    let s0 = sum(left_up).min(sum(right_up)) - 1;
    let mut s1 = sum(left_down).max(sum(right_down)) + 1;
    let mut d0 = diff_of(left_up).min(diff_of(left_down)) - 1;
    let mut d1 = diff_of(right_up).max(diff_of(right_down)) + 1;

    if (s1 - s0).rem_euclid(2) != 0 {
        s1 += 1;
    }
    if (d0 - s0).rem_euclid(2) != 0 {
        d0 -= 1;
    }
    if (d1 - s0).rem_euclid(2) != 0 {
        d1 += 1;
    }

    [vertex(s0, d0), vertex(s0, d1), vertex(s1, d0), vertex(s1, d1)]
}

/// In-bounds tiles of the diamond spanned by `vertices`.
///
/// Tiles are emitted column by column in increasing x, each column from its
/// largest y down to its smallest. No tile appears twice. The vertex tiles,
/// when inside the grid, are flagged [`CornerFlag::Corner`].
pub fn visible_tiles(dims: GridDimensions, vertices: &[TileCoord; 4]) -> Vec<VisibleTile> {
    let [left_up, right_up, _, right_down] = *vertices;
    let s0 = sum(left_up);
    let s1 = sum(right_down);
    let d0 = diff_of(left_up);
    let d1 = diff_of(right_up);

    let x_start = i64::from(left_up.x).max(0);
    let x_end = i64::from(right_down.x).min(i64::from(dims.row) - 1);
    let y_limit = i64::from(dims.col) - 1;

    let mut tiles = Vec::new();
    for x in x_start..=x_end {
        // Lower staircase: left_up -> right_up -> right_down.
        let y_min = (s0 - x).max(x - d1).max(0);
        // Upper staircase: left_up -> left_down -> right_down.
        let y_max = (s1 - x).min(x - d0).min(y_limit);
        for y in (y_min..=y_max).rev() {
            let coord = TileCoord::new(x as i32, y as i32);
            let corner = if vertices.contains(&coord) { CornerFlag::Corner } else { CornerFlag::Plain };
            tiles.push(VisibleTile { coord, corner });
        }
    }
    tiles
}

/// The `(2 * radius + 1)²` block of tiles around `center`, clipped to the grid.
pub fn diamond_view(dims: GridDimensions, center: TileCoord, radius: u32) -> Vec<TileCoord> {
    let r = i64::from(radius);
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    let x_range = (cx - r).max(0)..=(cx + r).min(i64::from(dims.row) - 1);
    let y_range = (cy - r).max(0)..=(cy + r).min(i64::from(dims.col) - 1);

    let mut tiles = Vec::new();
    for y in y_range {
        for x in x_range.clone() {
            tiles.push(TileCoord::new(x as i32, y as i32));
        }
    }
    tiles
}

/// Returns `true` if the segment `a -> b` is at least partly on screen: either
/// endpoint is visible, or the segment properly crosses one of the view's
/// diagonals.
pub fn segment_in_view(snapshot: &ViewSnapshot, a: TileCoord, b: TileCoord) -> bool {
    if snapshot.contains(a) || snapshot.contains(b) {
        return true;
    }
    let [v0, v1, v2, v3] = snapshot.vertices;
    segments_cross((a, b), (v0, v3)) || segments_cross((a, b), (v1, v2))
}

fn segments_cross((a1, a2): (TileCoord, TileCoord), (b1, b2): (TileCoord, TileCoord)) -> bool {
    // Differences of saturated coordinates need 33 bits, their products 66.
    let cross = |o: TileCoord, p: TileCoord, q: TileCoord| {
        let (px, py) = (i128::from(p.x) - i128::from(o.x), i128::from(p.y) - i128::from(o.y));
        let (qx, qy) = (i128::from(q.x) - i128::from(o.x), i128::from(q.y) - i128::from(o.y));
        px * qy - qx * py
    };
    let d1 = cross(a1, a2, b1);
    let d2 = cross(a1, a2, b2);
    let d3 = cross(b1, b2, a1);
    let d4 = cross(b1, b2, a2);
    d1.signum() * d2.signum() < 0 && d3.signum() * d4.signum() < 0
}

fn sum(t: TileCoord) -> i64 {
    i64::from(t.x) + i64::from(t.y)
}

fn diff_of(t: TileCoord) -> i64 {
    i64::from(t.x) - i64::from(t.y)
}

fn vertex(s: i64, d: i64) -> TileCoord {
    let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    TileCoord::new(clamp((s + d).div_euclid(2)), clamp((s - d).div_euclid(2)))
}

/// Tracks the camera's view and reports what changed as it moves.
#[derive(Debug, Clone)]
pub struct ViewportTracker {
    projection: IsoProjection,
    view: PixelSize,
    preview: Option<PixelSize>,
    granularity: Granularity,
    realtime: bool,
    last_center: Option<PixelPos>,
    last_center_tile: Option<TileCoord>,
    snapshot: Option<ViewSnapshot>,
    preview_vertices: Option<[TileCoord; 4]>,
    delta: ViewDelta,
}

impl ViewportTracker {
    /// Creates a tracker for a `view`-sized camera.
    pub fn new(projection: IsoProjection, view: PixelSize, granularity: Granularity) -> Self {
        ViewportTracker {
            projection,
            view,
            preview: None,
            granularity,
            realtime: true,
            last_center: None,
            last_center_tile: None,
            snapshot: None,
            preview_vertices: None,
            delta: ViewDelta::default(),
        }
    }

    /// Also tracks the vertices of a larger preview rectangle around the view.
    pub fn with_preview(mut self, preview: PixelSize) -> Self {
        self.preview = Some(preview);
        self
    }

    /// When `false`, the view is computed once and then frozen until
    /// [`clear`](Self::clear).
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Feeds a new camera centre.
    ///
    /// Returns the change in visible tiles when the centre crossed the
    /// granularity threshold and the view was recomputed, `None` otherwise.
    /// The first call always recomputes.
    pub fn update(&mut self, center: PixelPos) -> Option<&ViewDelta> {
        let center_tile = self.projection.pixel_to_tile(center);
        let moved = match self.granularity {
            Granularity::Tile => self.last_center_tile != Some(center_tile),
            Granularity::Pixel { epsilon } => {
                self.last_center.is_none_or(|last| !last.fuzzy_eq(center, epsilon))
            }
        };
        if !moved {
            return None;
        }
        self.last_center = Some(center);
        self.last_center_tile = Some(center_tile);

        if !self.realtime && self.snapshot.is_some() {
            return None;
        }

        let next = ViewSnapshot::compute(&self.projection, center, self.view);
        self.delta = match &self.snapshot {
            Some(prev) => diff(&prev.visible, &next.visible),
            None => diff(&HashMap::new(), &next.visible),
        };
        self.preview_vertices = self
            .preview
            .map(|area| view_vertices(&self.projection, center, area));

        debug!(
            center = %center,
            tile = %center_tile,
            visible = next.len(),
            added = self.delta.added.len(),
            removed = self.delta.removed.len(),
            "View recomputed"
        );
        self.snapshot = Some(next);
        Some(&self.delta)
    }

    /// Current view, once [`update`](Self::update) has run.
    pub fn snapshot(&self) -> Option<&ViewSnapshot> {
        self.snapshot.as_ref()
    }

    /// Change produced by the most recent recomputation.
    pub fn last_delta(&self) -> &ViewDelta {
        &self.delta
    }

    /// Vertices of the preview rectangle, if one is configured.
    pub fn preview_vertices(&self) -> Option<[TileCoord; 4]> {
        self.preview_vertices
    }

    /// Tile under the last accepted camera centre.
    pub fn center_tile(&self) -> Option<TileCoord> {
        self.last_center_tile
    }

    /// Size of the tracked view.
    pub fn view_size(&self) -> PixelSize {
        self.view
    }

    /// Forgets all state; the next update recomputes from scratch.
    pub fn clear(&mut self) {
        self.last_center = None;
        self.last_center_tile = None;
        self.snapshot = None;
        self.preview_vertices = None;
        self.delta = ViewDelta::default();
    }
}
