/*

A* = f(n) = g(n) + h(n)

Where:
    n = a tile on the grid
    g(n) = cost from the start tile to n, STEP per move
    h(n) = manhattan distance from n to the goal, times STEP
    f(n) = estimated cost of the cheapest path through n

Loop:
    - pop the open tile with lowest f(n), FIFO among equals
    - if it is the goal, walk the parents back to the start
    - close it
    - for each in-bounds, non-barrier, non-closed neighbour:
        - already open with a worse g: reparent and re-queue
        - otherwise: open it

*/

use std::collections::HashMap;
use std::time::Instant;

use isomap_projection::{Gid, GridDimensions, TileCoord};
use tracing::{debug, warn};

use crate::error::PathError;
use crate::map::BarrierSet;
use crate::queue::PriorityQueue;

/// Cost of a single move, orthogonal or diagonal.
pub const STEP: f64 = 10.0;

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (-1, -1), (-1, 1), (1, -1)];

/// Search options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathfinderConfig {
    /// Also step to the four diagonal neighbours.
    pub eight_directional: bool,
    /// Maximum number of expanded nodes; `None` searches until exhaustion.
    pub max_iterations: Option<usize>,
}

/// A node in the per-search arena. `parent` indexes the same arena.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathNode {
    /// Tile this node stands on.
    pub coord: TileCoord,
    /// Cost from the start.
    pub g: f64,
    /// Heuristic cost to the goal.
    pub h: f64,
    /// `g + h`.
    pub f: f64,
    /// Arena index of the predecessor; `None` for the start node.
    pub parent: Option<usize>,
}

/// A* search over a barrier set.
///
/// Holds no per-search state, so one pathfinder can serve concurrent callers.
#[derive(Debug, Clone, Copy)]
pub struct AStarPathfinder<'a> {
    barriers: &'a BarrierSet,
    dims: GridDimensions,
    config: PathfinderConfig,
}

impl<'a> AStarPathfinder<'a> {
    /// Creates a pathfinder over `barriers`, using the grid they were built for.
    pub fn new(barriers: &'a BarrierSet, config: PathfinderConfig) -> Self {
        AStarPathfinder { barriers, dims: barriers.dims(), config }
    }

    /// Search options in use.
    pub fn config(&self) -> PathfinderConfig {
        self.config
    }

    /// Finds a path from `start` to `end`, both included.
    ///
    /// # Errors
    /// * `InvalidEndpoint` if `start == end`.
    /// * `OutOfBounds` if either endpoint lies outside the grid.
    /// * `BlockedEndpoint` if either endpoint is a barrier.
    /// * `NoPathFound` if the goal is unreachable.
    /// * `BudgetExceeded` if the iteration cap was hit first.
    pub fn find_path(&self, start: TileCoord, end: TileCoord) -> Result<Vec<TileCoord>, PathError> {
        let start_gid = self.check_endpoints(start, end).inspect_err(|e| {
            warn!(%start, %end, "Path request rejected: {}", e);
        })?;

        let timer = Instant::now();
        let mut nodes: Vec<PathNode> = Vec::new();
        let mut open_index: HashMap<Gid, usize> = HashMap::new();
        let mut closed: HashMap<Gid, usize> = HashMap::new();
        let mut open = PriorityQueue::new(|a: &(f64, usize), b: &(f64, usize)| a.0.total_cmp(&b.0));

        let h = heuristic(start, end);
        nodes.push(PathNode { coord: start, g: 0.0, h, f: h, parent: None });
        open.push((h, 0));
        open_index.insert(start_gid, 0);

        let diagonals: &[(i32, i32)] = if self.config.eight_directional { &DIAGONAL } else { &[] };
        let mut expanded = 0usize;

        while let Some((f, index)) = open.pop() {
            let current = nodes[index];
            let Some(gid) = self.dims.tile_to_gid(current.coord) else {
                continue;
            };
            // Superseded by a cheaper entry for the same tile.
            if f != current.f || closed.contains_key(&gid) {
                continue;
            }
            if self.config.max_iterations.is_some_and(|max| expanded >= max) {
                warn!(%start, %end, expanded, "Path search budget exceeded");
                return Err(PathError::BudgetExceeded(expanded));
            }
            expanded += 1;
            open_index.remove(&gid);
            closed.insert(gid, index);

            if current.coord == end {
                let path = reconstruct_path(&nodes, index);
                debug!(
                    %start, %end,
                    length = path.len(),
                    expanded,
                    elapsed_ms = timer.elapsed().as_secs_f64() * 1000.0,
                    "Path found"
                );
                return Ok(path);
            }

            for &(dx, dy) in ORTHOGONAL.iter().chain(diagonals) {
                let next = current.coord.offset(dx, dy);
                let Some(next_gid) = self.dims.tile_to_gid(next) else {
                    continue;
                };
                if next != end && self.barriers.contains(next_gid) {
                    continue;
                }
                if closed.contains_key(&next_gid) {
                    continue;
                }

                let g = current.g + STEP;
                match open_index.get(&next_gid) {
                    Some(&open_at) => {
                        let node = &mut nodes[open_at];
                        if g < node.g {
                            node.g = g;
                            node.f = g + node.h;
                            node.parent = Some(index);
                            open.push((node.f, open_at));
                        }
                    }
                    None => {
                        let h = heuristic(next, end);
                        let new_index = nodes.len();
                        nodes.push(PathNode { coord: next, g, h, f: g + h, parent: Some(index) });
                        open.push((g + h, new_index));
                        open_index.insert(next_gid, new_index);
                    }
                }
            }
        }

        debug!(
            %start, %end,
            expanded,
            elapsed_ms = timer.elapsed().as_secs_f64() * 1000.0,
            "No path found"
        );
        Err(PathError::NoPathFound)
    }

    fn check_endpoints(&self, start: TileCoord, end: TileCoord) -> Result<Gid, PathError> {
        if start == end {
            return Err(PathError::InvalidEndpoint);
        }
        let start_gid = self.dims.tile_to_gid(start).ok_or(PathError::OutOfBounds(start))?;
        let end_gid = self.dims.tile_to_gid(end).ok_or(PathError::OutOfBounds(end))?;
        if self.barriers.contains(start_gid) {
            return Err(PathError::BlockedEndpoint(start));
        }
        if self.barriers.contains(end_gid) {
            return Err(PathError::BlockedEndpoint(end));
        }
        Ok(start_gid)
    }
}

fn heuristic(from: TileCoord, to: TileCoord) -> f64 {
    from.manhattan(to) as f64 * STEP
}

fn reconstruct_path(nodes: &[PathNode], mut index: usize) -> Vec<TileCoord> {
    let mut path = vec![nodes[index].coord];
    while let Some(parent) = nodes[index].parent {
        path.push(nodes[parent].coord);
        index = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileLayers;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::VecDeque;

    fn grid(row: u32, col: u32, barriers: &[(i32, i32)]) -> BarrierSet {
        let dims = GridDimensions::new(row, col).unwrap();
        let layers = TileLayers::open(dims).with_barriers(barriers.iter().map(|&t| TileCoord::from(t)));
        BarrierSet::build(&layers)
    }

    fn four_way() -> PathfinderConfig {
        PathfinderConfig::default()
    }

    fn eight_way() -> PathfinderConfig {
        PathfinderConfig { eight_directional: true, max_iterations: None }
    }

    fn assert_connected(path: &[TileCoord], barriers: &BarrierSet, diagonal: bool) {
        for step in path.windows(2) {
            let dx = (step[1].x - step[0].x).abs();
            let dy = (step[1].y - step[0].y).abs();
            if diagonal {
                assert!(dx <= 1 && dy <= 1 && dx + dy > 0, "bad step {:?}", step);
            } else {
                assert_eq!(dx + dy, 1, "bad step {:?}", step);
            }
        }
        for tile in path {
            assert!(!barriers.is_barrier(*tile));
        }
    }

    fn bfs_length(barriers: &BarrierSet, start: TileCoord, end: TileCoord) -> Option<usize> {
        let dims = barriers.dims();
        let mut dist = vec![usize::MAX; dims.tile_count() as usize];
        let mut queue = VecDeque::new();
        dist[dims.tile_to_gid(start)?.0 as usize] = 0;
        queue.push_back(start);
        while let Some(tile) = queue.pop_front() {
            let d = dist[dims.tile_to_gid(tile)?.0 as usize];
            if tile == end {
                return Some(d + 1);
            }
            for (dx, dy) in ORTHOGONAL {
                let next = tile.offset(dx, dy);
                let Some(gid) = dims.tile_to_gid(next) else { continue };
                if barriers.contains(gid) || dist[gid.0 as usize] != usize::MAX {
                    continue;
                }
                dist[gid.0 as usize] = d + 1;
                queue.push_back(next);
            }
        }
        None
    }

    #[test]
    fn test_open_grid_four_directional() {
        let barriers = grid(10, 10, &[]);
        let finder = AStarPathfinder::new(&barriers, four_way());
        let path = finder.find_path(TileCoord::new(0, 0), TileCoord::new(9, 9)).unwrap();
        assert_eq!(path.len(), 19);
        assert_eq!(path[0], TileCoord::new(0, 0));
        assert_eq!(path[18], TileCoord::new(9, 9));
        assert_connected(&path, &barriers, false);
    }

    #[test]
    fn test_open_grid_eight_directional() {
        let barriers = grid(10, 10, &[]);
        let finder = AStarPathfinder::new(&barriers, eight_way());
        let path = finder.find_path(TileCoord::new(0, 0), TileCoord::new(3, 3)).unwrap();
        assert_eq!(
            path,
            vec![TileCoord::new(0, 0), TileCoord::new(1, 1), TileCoord::new(2, 2), TileCoord::new(3, 3)]
        );
    }

    #[test]
    fn test_routes_around_wall_gap() {
        // Wall along y = 2 with a gap at x = 4.
        let wall: Vec<(i32, i32)> = (0..5).filter(|&x| x != 4).map(|x| (x, 2)).collect();
        let barriers = grid(5, 5, &wall);
        let finder = AStarPathfinder::new(&barriers, four_way());
        let path = finder.find_path(TileCoord::new(0, 0), TileCoord::new(0, 4)).unwrap();
        assert!(path.contains(&TileCoord::new(4, 2)));
        assert_eq!(path.len(), 13);
        assert_connected(&path, &barriers, false);
    }

    #[test]
    fn test_full_wall_has_no_path() {
        let wall: Vec<(i32, i32)> = (0..6).map(|x| (x, 3)).collect();
        let barriers = grid(6, 6, &wall);
        for config in [four_way(), eight_way()] {
            let finder = AStarPathfinder::new(&barriers, config);
            let result = finder.find_path(TileCoord::new(0, 0), TileCoord::new(5, 5));
            assert_eq!(result, Err(PathError::NoPathFound));
        }
    }

    #[test]
    fn test_rejected_endpoints() {
        let barriers = grid(5, 5, &[(2, 2)]);
        let finder = AStarPathfinder::new(&barriers, four_way());
        let a = TileCoord::new(1, 1);
        assert_eq!(finder.find_path(a, a), Err(PathError::InvalidEndpoint));
        assert_eq!(
            finder.find_path(a, TileCoord::new(2, 2)),
            Err(PathError::BlockedEndpoint(TileCoord::new(2, 2)))
        );
        assert_eq!(
            finder.find_path(TileCoord::new(2, 2), a),
            Err(PathError::BlockedEndpoint(TileCoord::new(2, 2)))
        );
        assert_eq!(
            finder.find_path(a, TileCoord::new(5, 0)),
            Err(PathError::OutOfBounds(TileCoord::new(5, 0)))
        );
        assert_eq!(
            finder.find_path(TileCoord::new(-1, 0), a),
            Err(PathError::OutOfBounds(TileCoord::new(-1, 0)))
        );
    }

    #[test]
    fn test_out_of_bounds_does_not_alias_barrier() {
        // (5, 1) has the same y * row + x as (0, 2), a barrier.
        let barriers = grid(5, 5, &[(0, 2)]);
        let finder = AStarPathfinder::new(&barriers, four_way());
        assert_eq!(
            finder.find_path(TileCoord::new(0, 0), TileCoord::new(5, 1)),
            Err(PathError::OutOfBounds(TileCoord::new(5, 1)))
        );
    }

    #[test]
    fn test_budget_exceeded() {
        let barriers = grid(30, 30, &[]);
        let config = PathfinderConfig { eight_directional: false, max_iterations: Some(5) };
        let finder = AStarPathfinder::new(&barriers, config);
        let result = finder.find_path(TileCoord::new(0, 0), TileCoord::new(29, 29));
        assert_eq!(result, Err(PathError::BudgetExceeded(5)));
    }

    #[test]
    fn test_matches_bfs_on_random_maps() {
        let mut rng = StdRng::seed_from_u64(42);
        let dims = GridDimensions::new(24, 18).unwrap();
        for _ in 0..20 {
            let layers = TileLayers::random(dims, 40, 3, &mut rng);
            let barriers = BarrierSet::build(&layers);
            let finder = AStarPathfinder::new(&barriers, four_way());
            for _ in 0..10 {
                let start = TileCoord::new(rng.random_range(0..24), rng.random_range(0..18));
                let end = TileCoord::new(rng.random_range(0..24), rng.random_range(0..18));
                if start == end || barriers.is_barrier(start) || barriers.is_barrier(end) {
                    continue;
                }
                match (finder.find_path(start, end), bfs_length(&barriers, start, end)) {
                    (Ok(path), Some(expected)) => {
                        assert_eq!(path.len(), expected, "{} -> {}", start, end);
                        assert_eq!(path.first(), Some(&start));
                        assert_eq!(path.last(), Some(&end));
                        assert_connected(&path, &barriers, false);
                    }
                    (Err(PathError::NoPathFound), None) => {}
                    (got, expected) => panic!("{} -> {}: got {:?}, bfs {:?}", start, end, got, expected),
                }
            }
        }
    }

    #[test]
    fn test_pathfinder_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AStarPathfinder<'static>>();

        let barriers = grid(16, 16, &[(3, 3), (4, 4)]);
        let finder = AStarPathfinder::new(&barriers, eight_way());
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|i| s.spawn(move || finder.find_path(TileCoord::new(0, i), TileCoord::new(15, 15 - i))))
                .collect();
            for handle in handles {
                assert!(handle.join().unwrap().is_ok());
            }
        });
    }
}
