/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::body::DEFAULT_MASS;
use crate::domain::grid::{DEFAULT_GRAVITY, DEFAULT_RESOLUTION};

/// Smallest arena, in tiles, that leaves room above its floor to spawn in.
pub const MIN_GRID_TILES: usize = 4;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct DemoConfig {
    pub grid: GridConfig,
    pub body: BodyConfig,
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub gravity: f32,
    pub resolution: u32,
    /// Level file to load instead of the default layout.
    pub level: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct BodyConfig {
    pub width: u32,
    pub height: u32,
    pub mass: f32,
    pub walk_speed: f32,
    pub jump_speed: f32,
}

impl DemoConfig {
    /// Frame delta handed to `Grid::update`, in seconds.
    pub fn timestep(&self) -> f32 {
        self.tick_rate_ms as f32 / 1000.0
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    grid: TomlGrid,
    #[serde(default)]
    body: TomlBody,
    #[serde(default)]
    timing: TomlTiming,
}

#[derive(Deserialize, Debug)]
struct TomlGrid {
    #[serde(default = "default_grid_width")]
    width: usize,
    #[serde(default = "default_grid_height")]
    height: usize,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_resolution")]
    resolution: u32,
    #[serde(default)]
    level: String,
}

#[derive(Deserialize, Debug)]
struct TomlBody {
    #[serde(default = "default_body_size")]
    width: u32,
    #[serde(default = "default_body_size")]
    height: u32,
    #[serde(default = "default_mass")]
    mass: f32,
    #[serde(default = "default_walk_speed")]
    walk_speed: f32,
    #[serde(default = "default_jump_speed")]
    jump_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

// ── Defaults ──

fn default_grid_width() -> usize { 20 }
fn default_grid_height() -> usize { 10 }
fn default_gravity() -> f32 { DEFAULT_GRAVITY }
fn default_resolution() -> u32 { DEFAULT_RESOLUTION }
fn default_body_size() -> u32 { 24 }
fn default_mass() -> f32 { DEFAULT_MASS }
fn default_walk_speed() -> f32 { 270.0 }
fn default_jump_speed() -> f32 { -800.0 }
fn default_tick_rate() -> u64 { 16 }     // ~60 steps per second

impl Default for TomlGrid {
    fn default() -> Self {
        TomlGrid {
            width: default_grid_width(),
            height: default_grid_height(),
            gravity: default_gravity(),
            resolution: default_resolution(),
            level: String::new(),
        }
    }
}

impl Default for TomlBody {
    fn default() -> Self {
        TomlBody {
            width: default_body_size(),
            height: default_body_size(),
            mass: default_mass(),
            walk_speed: default_walk_speed(),
            jump_speed: default_jump_speed(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
        }
    }
}

// ── Loading ──

impl DemoConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    /// Parse config text directly. Parse errors fall back to defaults.
    pub fn from_toml_str(text: &str) -> Self {
        let toml_cfg = parse_toml(text, Path::new("<inline>"));
        Self::resolve(toml_cfg, &[])
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let level = resolve_level_path(&toml_cfg.grid.level, search_dirs);

        let mut resolution = toml_cfg.grid.resolution;
        if resolution == 0 {
            log::warn!("config: grid.resolution must be positive, using {DEFAULT_RESOLUTION}");
            resolution = DEFAULT_RESOLUTION;
        }
        let width = at_least_min_tiles("grid.width", toml_cfg.grid.width);
        let height = at_least_min_tiles("grid.height", toml_cfg.grid.height);

        DemoConfig {
            grid: GridConfig {
                width,
                height,
                gravity: toml_cfg.grid.gravity,
                resolution,
                level,
            },
            body: BodyConfig {
                width: toml_cfg.body.width,
                height: toml_cfg.body.height,
                mass: toml_cfg.body.mass,
                walk_speed: toml_cfg.body.walk_speed,
                jump_speed: toml_cfg.body.jump_speed,
            },
            tick_rate_ms: toml_cfg.timing.tick_rate_ms.max(1),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), &[])
    }
}

fn at_least_min_tiles(key: &str, tiles: usize) -> usize {
    if tiles < MIN_GRID_TILES {
        log::warn!("config: {key} = {tiles} is too small, using {MIN_GRID_TILES}");
        MIN_GRID_TILES
    } else {
        tiles
    }
}

/// Empty → no level. Absolute paths are taken as is; relative ones are
/// looked up in the candidate dirs, then left relative to the CWD.
fn resolve_level_path(level: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    if level.is_empty() {
        return None;
    }
    let path = PathBuf::from(level);
    if path.is_absolute() {
        return Some(path);
    }
    let found = search_dirs.iter()
        .map(|d| d.join(level))
        .find(|p| p.is_file())
        .unwrap_or(path);
    Some(found)
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    log::info!("config: using {}", path.display());
                    return parse_toml(&text, &path);
                }
                Err(e) => {
                    log::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    log::debug!("config: no config.toml found, using defaults");
    TomlConfig::default()
}

fn parse_toml(text: &str, path: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::warn!("{} parse error: {e}", path.display());
            log::warn!("using default settings");
            TomlConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::body::Body;
    use crate::domain::grid::Grid;

    #[test]
    fn empty_text_gives_defaults() {
        let cfg = DemoConfig::from_toml_str("");
        assert_eq!(cfg.grid.width, 20);
        assert_eq!(cfg.grid.height, 10);
        assert_eq!(cfg.grid.gravity, 48.0);
        assert_eq!(cfg.grid.resolution, 32);
        assert!(cfg.grid.level.is_none());
        assert_eq!(cfg.body.width, 24);
        assert_eq!(cfg.body.mass, 80.0);
        assert_eq!(cfg.tick_rate_ms, 16);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = DemoConfig::from_toml_str("[grid]\ngravity = 10.0\n\n[body]\nwalk_speed = 100.0\n");
        assert_eq!(cfg.grid.gravity, 10.0);
        assert_eq!(cfg.grid.width, 20);
        assert_eq!(cfg.body.walk_speed, 100.0);
        assert_eq!(cfg.body.jump_speed, -800.0);
    }

    #[test]
    fn parse_error_falls_back_to_defaults() {
        let cfg = DemoConfig::from_toml_str("[grid\nwidth = ");
        assert_eq!(cfg.grid.width, 20);
    }

    #[test]
    fn zero_resolution_and_tick_are_corrected() {
        let cfg = DemoConfig::from_toml_str("[grid]\nresolution = 0\n[timing]\ntick_rate_ms = 0\n");
        assert_eq!(cfg.grid.resolution, 32);
        assert_eq!(cfg.tick_rate_ms, 1);
    }

    #[test]
    fn tiny_grid_is_raised_to_minimum() {
        let cfg = DemoConfig::from_toml_str("[grid]\nwidth = 6\nheight = 3\n");
        assert_eq!(cfg.grid.width, 6);
        assert_eq!(cfg.grid.height, MIN_GRID_TILES);
        let cfg = DemoConfig::from_toml_str("[grid]\nwidth = 0\nheight = 0\n");
        assert_eq!((cfg.grid.width, cfg.grid.height), (MIN_GRID_TILES, MIN_GRID_TILES));
    }

    #[test]
    fn player_lands_in_smallest_arena() {
        let cfg = DemoConfig::from_toml_str("[grid]\nwidth = 6\nheight = 3\n");
        let mut grid = Grid::new(cfg.grid.width, cfg.grid.height, cfg.grid.gravity);
        let (x, y) = grid.arena_spawn();
        let id = grid.add(Body::new(cfg.body.width, cfg.body.height, x, y).with_mass(cfg.body.mass));
        for _ in 0..120 {
            grid.update(cfg.timestep());
        }
        let body = grid.body(id).expect("registered body");
        assert!(body.is_on_ground());
        assert_eq!(body.y(), ((cfg.grid.height - 2) * 32) as f32);
    }

    #[test]
    fn level_path_is_kept() {
        let cfg = DemoConfig::from_toml_str("[grid]\nlevel = \"/tmp/arena.txt\"\n");
        assert_eq!(cfg.grid.level, Some(PathBuf::from("/tmp/arena.txt")));
        let cfg = DemoConfig::from_toml_str("[grid]\nlevel = \"levels/a.txt\"\n");
        assert_eq!(cfg.grid.level, Some(PathBuf::from("levels/a.txt")));
    }

    #[test]
    fn timestep_is_seconds() {
        let cfg = DemoConfig::from_toml_str("[timing]\ntick_rate_ms = 20\n");
        assert!((cfg.timestep() - 0.02).abs() < 1e-6);
    }
}
