use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use isomap_navigation::projection::{PixelPos, TileCoord};

#[derive(Debug, Clone)]
pub struct State {
    pub camera: PixelPos,
    pub center_tile: Option<TileCoord>,
    pub view_vertices: Option<[TileCoord; 4]>,
    pub visible_tiles: usize,
    pub recomputes: u64,
    pub tiles_added: u64,
    pub tiles_removed: u64,
    pub route_segments_in_view: usize,
    pub preview_rooms: Vec<i64>,
    pub last_tap: Option<(TileCoord, i64)>,
    pub tap_area: Vec<TileCoord>,
    pub last_update_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            camera: PixelPos::default(),
            center_tile: None,
            view_vertices: None,
            visible_tiles: 0,
            recomputes: 0,
            tiles_added: 0,
            tiles_removed: 0,
            route_segments_in_view: 0,
            preview_rooms: Vec::new(),
            last_tap: None,
            tap_area: Vec::new(),
            last_update_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn touch(bb: &Blackboard) {
    bb.write().last_update_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faults_are_deduplicated() {
        let bb: Blackboard = Arc::default();
        raise_fault(&bb, "view lagged");
        raise_fault(&bb, "view lagged");
        raise_fault(&bb, "no route");
        assert_eq!(snapshot(&bb).faults, vec!["view lagged".to_string(), "no route".to_string()]);
    }

    #[test]
    fn test_touch_advances_timestamp() {
        let bb: Blackboard = Arc::default();
        let before = snapshot(&bb).last_update_ts;
        touch(&bb);
        assert!(snapshot(&bb).last_update_ts >= before);
    }
}
