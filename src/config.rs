use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use isomap_navigation::projection::{PixelSize, TileCoord, TileSize};
use isomap_navigation::{Granularity, MapOptions, PathfinderConfig};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub map: MapConfig,
    #[serde(default)]
    pub pathfinder: PathfinderConfig,
    pub view: ViewConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: "info".into() }
    }
}

/// Where the map comes from. A Tiled export is used when `path` is set,
/// otherwise a random map of `row` x `col` tiles is generated.
#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    pub path: Option<String>,
    pub row: u32,
    pub col: u32,
    pub tile_width: f64,
    pub tile_height: f64,
    pub obstacles: usize,
    pub max_obstacle_size: u32,
    pub seed: u64,
    pub room_row: u32,
    pub room_col: u32,
}

impl MapConfig {
    pub fn tile_size(&self) -> TileSize {
        TileSize::new(self.tile_width, self.tile_height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GranularityKind {
    Tile,
    Pixel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    pub width: f64,
    pub height: f64,
    pub granularity: GranularityKind,
    #[serde(default = "default_pixel_epsilon")]
    pub pixel_epsilon: f64,
    #[serde(default)]
    pub preview: bool,
    #[serde(default = "default_true")]
    pub realtime: bool,
}

impl ViewConfig {
    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    pub fn preview_size(&self) -> Option<PixelSize> {
        self.preview.then(|| self.size().scale(6.0, 3.0))
    }

    pub fn granularity(&self) -> Granularity {
        match self.granularity {
            GranularityKind::Tile => Granularity::Tile,
            GranularityKind::Pixel => Granularity::Pixel { epsilon: self.pixel_epsilon },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub tick_ms: u64,
    pub speed_px_per_tick: f64,
    pub topic_capacity: usize,
    pub start: Option<[i32; 2]>,
    pub goal: Option<[i32; 2]>,
}

impl SessionConfig {
    pub fn start(&self) -> Option<TileCoord> {
        self.start.map(|[x, y]| TileCoord::new(x, y))
    }

    pub fn goal(&self) -> Option<TileCoord> {
        self.goal.map(|[x, y]| TileCoord::new(x, y))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            tick_ms: 16,
            speed_px_per_tick: 12.0,
            topic_capacity: 32,
            start: None,
            goal: None,
        }
    }
}

impl AppConfig {
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            room_row: self.map.room_row,
            room_col: self.map.room_col,
            pathfinder: self.pathfinder,
        }
    }
}

fn default_pixel_epsilon() -> f64 {
    5.0
}

fn default_true() -> bool {
    true
}

/// Reads `path` as TOML, then applies `ISOMAP__SECTION__KEY` environment overrides.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    Config::builder()
        .add_source(File::new(path, FileFormat::Toml).required(true))
        .add_source(Environment::with_prefix("ISOMAP").prefix_separator("__").separator("__").try_parsing(true))
        .build()?
        .try_deserialize()
}
