/// Level loader: ASCII level text → `Grid`.
///
/// ## Format (`.txt`):
///   Optional line 1: `# Level Name`
///   Then one line per stored grid row (row 0 first), one char per stored
///   column. A level `cols` wide and `rows` tall builds a grid of
///   `(cols - 1) x (rows - 1)` tiles.
///
/// ## Legend:
///   '|' = Wall          '_' = Floor
///   'L' = Wall + floor  'P' = Player spawn (open cell)
///   '.' or ' ' = Open
///
/// Short rows are padded with open cells. Trailing blank lines are
/// dropped, so use '.' for an open last row.

use std::path::{Path, PathBuf};

use crate::domain::grid::Grid;

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("could not read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("level has no rows")]
    Empty,
    #[error("level is {cols}x{rows} cells, needs at least 2x2")]
    TooSmall { cols: usize, rows: usize },
    #[error("unknown tile {ch:?} at ({x}, {y})")]
    UnknownTile { ch: char, x: usize, y: usize },
    #[error("second player spawn at ({x}, {y})")]
    DuplicateSpawn { x: usize, y: usize },
}

/// A parsed level.
#[derive(Clone, Debug)]
pub struct LevelDef {
    pub name: String,
    pub rows: Vec<String>,
    /// Cell holding the player spawn marker.
    pub spawn: Option<(usize, usize)>,
}

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

/// Read and parse a level file.
pub fn load_level_file(path: &Path) -> Result<LevelDef, LevelError> {
    let content = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let def = parse_level(&content)?;
    log::debug!("loaded level {:?} from {}", def.name, path.display());
    Ok(def)
}

/// Parse a level from text content.
pub fn parse_level(content: &str) -> Result<LevelDef, LevelError> {
    let mut name = String::new();
    let mut rows: Vec<String> = vec![];

    for (i, line) in content.lines().enumerate() {
        if i == 0 && line.starts_with('#') {
            name = line[1..].trim().to_string();
        } else {
            rows.push(line.trim_end_matches('\r').to_string());
        }
    }

    while rows.last().is_some_and(|r| r.trim().is_empty()) {
        rows.pop();
    }
    if rows.is_empty() {
        return Err(LevelError::Empty);
    }

    let cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
    if cols < 2 || rows.len() < 2 {
        return Err(LevelError::TooSmall { cols, rows: rows.len() });
    }
    for row in &mut rows {
        let len = row.chars().count();
        row.extend(std::iter::repeat('.').take(cols - len));
    }

    let mut spawn = None;
    for (y, row) in rows.iter().enumerate() {
        for (x, ch) in row.chars().enumerate() {
            match ch {
                '|' | '_' | 'L' | '.' | ' ' => {}
                'P' => {
                    if spawn.is_some() {
                        return Err(LevelError::DuplicateSpawn { x, y });
                    }
                    spawn = Some((x, y));
                }
                _ => return Err(LevelError::UnknownTile { ch, x, y }),
            }
        }
    }

    if name.is_empty() {
        name = "Untitled".to_string();
    }

    Ok(LevelDef { name, rows, spawn })
}

impl LevelDef {
    /// Stored grid columns.
    pub fn cols(&self) -> usize {
        self.rows.first().map_or(0, |r| r.chars().count())
    }

    /// Build a grid with this level's cells painted in.
    pub fn build_grid(&self, gravity: f32, resolution: u32) -> Grid {
        let mut grid = Grid::blank(self.cols() - 1, self.rows.len() - 1, gravity, resolution);
        for (y, row) in self.rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                match ch {
                    '|' => grid.paint_wall(x, y),
                    '_' => grid.paint_floor(x, y),
                    'L' => {
                        grid.paint_wall(x, y);
                        grid.paint_floor(x, y);
                    }
                    _ => {}
                }
            }
        }
        grid
    }

    /// World position (left, bottom) of a body standing in the spawn cell.
    pub fn spawn_position(&self, resolution: u32) -> Option<(f32, f32)> {
        self.spawn.map(|(x, y)| {
            let res = resolution as f32;
            (x as f32 * res, (y + 1) as f32 * res)
        })
    }
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback level
// ══════════════════════════════════════════════════════════════

/// The default 20x10 arena with its low platforms, matching
/// `Grid::new(20, 10, gravity)`.
pub fn default_level() -> LevelDef {
    const ROWS: [&str; 11] = [
        "|...................|",
        "|...................|",
        "|...................|",
        "|...................|",
        "|...................|",
        "|.P.................|",
        "|.................L||",
        "|...L|........L|L|_.|",
        "L___________________|",
        "|...................|",
        ".....................",
    ];
    LevelDef {
        name: "Boxed Arena".to_string(),
        rows: ROWS.iter().map(|r| r.to_string()).collect(),
        spawn: Some((2, 5)),
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
