/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into the `front` buffer
///   2. Compare each glyph with the `back` buffer (previous frame)
///   3. Only emit terminal commands for glyphs that changed
///   4. Batch everything with `queue!`, flush once
///   5. Swap front/back
///
/// One grid cell is `CELL_W` terminal columns by one terminal row. A wall
/// is drawn on the cell's left column, a floor along its top.
///
/// The pointer selects an edge: a cell's left column picks its wall, the
/// right column its floor. The selection is tinted green when a click
/// would paint it and red when it would erase it.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use tilegrid::domain::body::Body;
use tilegrid::domain::cell::Edge;
use tilegrid::domain::grid::Grid;
use tilegrid::sim::step::EPSILON;

const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const PAINT_BG: Color = Color::Rgb { r: 30, g: 110, b: 40 };
const ERASE_BG: Color = Color::Rgb { r: 130, g: 30, b: 30 };

/// Terminal columns per grid cell.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

// ── Glyph: the unit of the frame buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    const BLANK: Glyph = Glyph { ch: ' ', fg: Color::White, bg: BASE_BG };

    /// Differs from any real glyph, so the next flush repaints everything.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Glyph { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D array of glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    glyphs: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, glyphs: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.glyphs = vec![Glyph::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.glyphs.fill(Glyph::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, glyph: Glyph) {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x] = glyph;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.glyphs[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Glyph::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Glyph::new(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            enhanced_keys: false,
        }
    }

    /// Enter raw mode and the alternate screen.
    /// Returns whether the terminal will report key Release events.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;

        self.enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.enhanced_keys {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        log::debug!("keyboard enhancement: {}", self.enhanced_keys);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(self.enhanced_keys)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced_keys {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        self.back.glyphs.fill(Glyph::INVALID);
    }

    pub fn render(
        &mut self,
        grid: &Grid,
        player: Option<&Body>,
        selected: Option<Edge>,
        level_name: &str,
    ) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_hud(player, level_name);
        self.compose_grid(grid);
        if let Some(edge) = selected {
            self.compose_selection(grid, edge);
        }
        if let Some(body) = player {
            self.compose_body(grid, body);
        }
        self.compose_help(grid);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let glyph = self.front.get(x, y);
                if glyph == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if glyph.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(glyph.fg))?;
                    last_fg = glyph.fg;
                }
                if glyph.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(glyph.bg))?;
                    last_bg = glyph.bg;
                }
                queue!(self.writer, Print(glyph.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose_hud(&mut self, player: Option<&Body>, level_name: &str) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        let hud = match player {
            Some(b) => format!(
                " {level_name}  x:{:7.1} y:{:7.1}  vx:{:7.1} vy:{:7.1}  {}",
                b.x(), b.y(), b.vx(), b.vy(),
                if b.is_on_ground() { "GROUND" } else { "AIR" },
            ),
            None => format!(" {level_name}"),
        };
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_grid(&mut self, grid: &Grid) {
        let wall_fg = Color::Rgb { r: 90, g: 140, b: 255 };
        for y in 0..grid.rows() {
            for x in 0..grid.cols() {
                let col = x * CELL_W;
                let row = MAP_ROW + y;
                let wall = grid.wall_type(x, y).is_solid();
                let floor = grid.floor_type(x, y).is_solid();
                let (left, right) = match (wall, floor) {
                    (true, true) => ('▛', '▀'),
                    (true, false) => ('▌', ' '),
                    (false, true) => ('▀', '▀'),
                    (false, false) => ('·', ' '),
                };
                let fg = if wall || floor { wall_fg } else { Color::DarkGrey };
                self.front.set(col, row, Glyph::new(left, fg, BASE_BG));
                self.front.set(col + 1, row, Glyph::new(right, fg, BASE_BG));
            }
        }
    }

    fn compose_selection(&mut self, grid: &Grid, edge: Edge) {
        let bg = if grid.edge_type(edge).is_solid() { ERASE_BG } else { PAINT_BG };
        let (x, y) = edge.cell();
        let row = MAP_ROW + y;
        let cols = match edge {
            Edge::Wall { .. } => 0..1,
            Edge::Floor { .. } => 0..CELL_W,
        };
        for col in cols.map(|c| x * CELL_W + c) {
            let glyph = self.front.get(col, row);
            self.front.set(col, row, Glyph::new(glyph.ch, glyph.fg, bg));
        }
    }

    /// Overlay the body's box at half-cell horizontal precision.
    fn compose_body(&mut self, grid: &Grid, body: &Body) {
        let res = grid.resolution() as f32;
        let sub = res / CELL_W as f32;
        let (w, h) = (body.width() as f32, body.height() as f32);

        let col_start = (body.x() / sub) as usize;
        let col_end = ((body.x() + w - EPSILON) / sub) as usize;
        let row_start = ((body.y() - h) / res) as usize;
        let row_end = ((body.y() - EPSILON) / res) as usize;

        for row in row_start..=row_end {
            for col in col_start..=col_end {
                self.front.set(col, MAP_ROW + row, Glyph::new('█', Color::Red, BASE_BG));
            }
        }
    }

    fn compose_help(&mut self, grid: &Grid) {
        let help_row = MAP_ROW + grid.rows() + 1;
        let help = " ←/→ or A/D: walk   ↑/W/Space: jump   R: respawn   click: toggle edge   Q/Esc: quit";
        self.front.put_str(0, help_row, help, Color::DarkGrey, BASE_BG);
    }
}

/// Edge under terminal cell (`column`, `row`), if it lies on the grid.
pub fn edge_at(grid: &Grid, column: u16, row: u16) -> Option<Edge> {
    let column = column as usize;
    let x = column / CELL_W;
    let y = (row as usize).checked_sub(MAP_ROW)?;
    grid.cell(x, y)?;
    if column % CELL_W == 0 {
        Some(Edge::Wall { x, y })
    } else {
        Some(Edge::Floor { x, y })
    }
}
