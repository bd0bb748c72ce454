/// Grid: the complete world of a running simulation.
///
/// ## Layout
///
/// A grid built for `width x height` tiles stores `(width + 1) x (height + 1)`
/// cells; the extra column/row is a capping margin so the right-hand wall
/// column and the bottom floor row can be painted.
///
/// Cells live in one dense row-major `Vec`, index `x + y * cols`.
///
/// ## Bodies
///
/// The grid owns the bodies registered with it. `add` hands back a
/// `BodyId`; `remove` gives the body back to the host, so a body outlives
/// its registration. Iteration order is registration order.
///
/// ## Preconditions
///
/// Cell coordinates passed to the unchecked queries and paint calls must
/// lie in `[0, cols) x [0, rows)`. This is debug-asserted only; use
/// `cell()` for a checked lookup.

use std::ops::RangeInclusive;

use super::body::{Body, BodyId};
use super::cell::{Barrier, Cell, Edge};

/// World units per tile edge unless the caller picks another.
pub const DEFAULT_RESOLUTION: u32 = 32;
/// Gravity used by hosts that don't configure one.
pub const DEFAULT_GRAVITY: f32 = 48.0;

/// Decorative platforms of the default layout, as `(x, rows above the
/// bottom margin)`. They assume a grid at least 20 tiles wide.
const DEMO_WALLS: [(usize, usize); 8] = [
    (14, 3), (15, 3),
    (4, 3), (5, 3),
    (16, 3), (17, 3),
    (18, 4), (19, 4),
];
const DEMO_FLOORS: [(usize, usize); 5] = [(14, 3), (4, 3), (16, 3), (18, 4), (18, 3)];

#[derive(Clone, Debug)]
pub struct Grid {
    pub(crate) cols: usize,
    pub(crate) rows: usize,
    pub(crate) resolution: u32,
    pub(crate) gravity: f32,
    pub(crate) cells: Vec<Cell>,
    pub(crate) nodes: Vec<(BodyId, Body)>,
    next_id: u32,
}

// ── Construction ──

impl Grid {
    /// Empty grid: every cell `None/None`, no bodies.
    pub fn blank(width: usize, height: usize, gravity: f32, resolution: u32) -> Self {
        debug_assert!(resolution > 0, "tile resolution must be positive");
        let cols = width + 1;
        let rows = height + 1;
        Grid {
            cols,
            rows,
            resolution,
            gravity,
            cells: vec![Cell::default(); cols * rows],
            nodes: Vec::new(),
            next_id: 0,
        }
    }

    /// Boxed arena: base floor plus solid boundary walls, no platforms.
    pub fn arena(width: usize, height: usize, gravity: f32) -> Self {
        let mut grid = Grid::blank(width, height, gravity, DEFAULT_RESOLUTION);
        grid.paint_arena();
        grid
    }

    /// Default layout: the boxed arena plus a few low platforms.
    pub fn new(width: usize, height: usize, gravity: f32) -> Self {
        let mut grid = Grid::arena(width, height, gravity);
        grid.paint_demo_platforms();
        grid
    }

    /// Paint a continuous floor one row above the bottom boundary and
    /// solid walls down the leftmost and rightmost columns.
    pub fn paint_arena(&mut self) {
        let width = self.width();
        let height = self.height();

        if height >= 2 {
            for x in 0..width {
                self.paint_floor(x, height - 2);
            }
        }

        for y in 0..height {
            self.paint_wall(0, y);
            self.paint_wall(width, y);
        }
    }

    /// Bottom-left of a body dropped one tile above the arena floor, two
    /// tiles in from the left wall.
    pub fn arena_spawn(&self) -> (f32, f32) {
        let res = self.resolution as f32;
        let x = 2.min(self.width().saturating_sub(1));
        let y = self.height().saturating_sub(3);
        (x as f32 * res, y as f32 * res)
    }

    /// Paint the default layout's low platforms. Segments that don't fit
    /// the grid are skipped.
    pub fn paint_demo_platforms(&mut self) {
        let width = self.width();
        let height = self.height();
        let fits = |&(x, up): &(usize, usize)| x < width && up <= height;

        for &(x, up) in DEMO_WALLS.iter() {
            if fits(&(x, up)) {
                self.paint_wall(x, height - up);
            } else {
                log::debug!("demo wall ({x}, h-{up}) skipped: grid is {width}x{height}");
            }
        }
        for &(x, up) in DEMO_FLOORS.iter() {
            if fits(&(x, up)) {
                self.paint_floor(x, height - up);
            } else {
                log::debug!("demo floor ({x}, h-{up}) skipped: grid is {width}x{height}");
            }
        }
    }
}

// ── Dimensions ──

impl Grid {
    /// Tile width the grid was built for (`cols - 1`).
    pub fn width(&self) -> usize { self.cols - 1 }
    /// Tile height the grid was built for (`rows - 1`).
    pub fn height(&self) -> usize { self.rows - 1 }
    /// Stored cell columns.
    pub fn cols(&self) -> usize { self.cols }
    /// Stored cell rows.
    pub fn rows(&self) -> usize { self.rows }
    pub fn resolution(&self) -> u32 { self.resolution }
    pub fn gravity(&self) -> f32 { self.gravity }
}

// ── Cell query / authoring API ──

impl Grid {
    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.cols && y < self.rows, "cell ({x}, {y}) outside {}x{} grid", self.cols, self.rows);
        x + y * self.cols
    }

    /// Checked lookup. `None` outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        if x < self.cols && y < self.rows {
            Some(self.cells[x + y * self.cols])
        } else {
            None
        }
    }

    #[inline]
    pub fn wall_type(&self, x: usize, y: usize) -> Barrier {
        self.cells[self.index(x, y)].wall()
    }

    #[inline]
    pub fn floor_type(&self, x: usize, y: usize) -> Barrier {
        self.cells[self.index(x, y)].floor()
    }

    pub fn set_wall(&mut self, x: usize, y: usize, wall: Barrier) {
        let i = self.index(x, y);
        self.cells[i].set_wall(wall);
    }

    pub fn set_floor(&mut self, x: usize, y: usize, floor: Barrier) {
        let i = self.index(x, y);
        self.cells[i].set_floor(floor);
    }

    pub fn paint_wall(&mut self, x: usize, y: usize) {
        self.set_wall(x, y, Barrier::Solid);
    }

    pub fn paint_floor(&mut self, x: usize, y: usize) {
        self.set_floor(x, y, Barrier::Solid);
    }

    pub fn erase_wall(&mut self, x: usize, y: usize) {
        self.set_wall(x, y, Barrier::None);
    }

    pub fn erase_floor(&mut self, x: usize, y: usize) {
        self.set_floor(x, y, Barrier::None);
    }

    pub fn edge_type(&self, edge: Edge) -> Barrier {
        match edge {
            Edge::Wall { x, y } => self.wall_type(x, y),
            Edge::Floor { x, y } => self.floor_type(x, y),
        }
    }

    /// Erase a solid edge, paint an empty one. Returns the new state.
    pub fn toggle_edge(&mut self, edge: Edge) -> Barrier {
        let solid = self.edge_type(edge).is_solid();
        match (edge, solid) {
            (Edge::Wall { x, y }, true) => self.erase_wall(x, y),
            (Edge::Wall { x, y }, false) => self.paint_wall(x, y),
            (Edge::Floor { x, y }, true) => self.erase_floor(x, y),
            (Edge::Floor { x, y }, false) => self.paint_floor(x, y),
        }
        log::debug!("{edge:?} {}", if solid { "erased" } else { "painted" });
        self.edge_type(edge)
    }
}

// ── Body registry ──

impl Grid {
    /// Register a body and take ownership of it.
    ///
    /// The body must not already be attached to a grid. Debug builds
    /// panic on that; release builds log a warning and re-attach it.
    pub fn add(&mut self, mut body: Body) -> BodyId {
        debug_assert!(!body.is_added(), "body is already registered with a grid");
        if body.is_added() {
            log::warn!("add: body already attached to a grid, re-attaching");
        }

        let id = BodyId(self.next_id);
        self.next_id += 1;
        body.attach();
        self.nodes.push((id, body));
        log::debug!("body {:?} added ({} registered)", id, self.nodes.len());
        id
    }

    /// Unregister a body and hand it back, detached.
    /// Order of the remaining bodies is preserved.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let Some(pos) = self.nodes.iter().position(|(nid, _)| *nid == id) else {
            log::warn!("remove: body {:?} is not registered", id);
            return None;
        };
        let (_, mut body) = self.nodes.remove(pos);
        body.detach();
        log::debug!("body {:?} removed ({} registered)", id, self.nodes.len());
        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.nodes.iter().find(|(nid, _)| *nid == id).map(|(_, b)| b)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.nodes.iter_mut().find(|(nid, _)| *nid == id).map(|(_, b)| b)
    }

    /// Registered bodies in registration order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.nodes.iter().map(|(id, b)| (*id, b))
    }

    pub fn body_count(&self) -> usize {
        self.nodes.len()
    }
}

// ══════════════════════════════════════════════════════════════
// Read-only cell view used while bodies are borrowed mutably
// ══════════════════════════════════════════════════════════════

pub(crate) struct CellView<'a> {
    cells: &'a [Cell],
    cols: usize,
    rows: usize,
}

impl<'a> CellView<'a> {
    #[inline]
    pub(crate) fn new(cells: &'a [Cell], cols: usize, rows: usize) -> Self {
        CellView { cells, cols, rows }
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> &Cell {
        debug_assert!(x < self.cols && y < self.rows, "cell ({x}, {y}) outside {}x{} grid", self.cols, self.rows);
        &self.cells[x + y * self.cols]
    }

    /// Is there a solid wall in column `x` on any of `rows`?
    #[inline]
    pub(crate) fn any_wall(&self, x: usize, mut rows: RangeInclusive<usize>) -> bool {
        rows.any(|y| self.at(x, y).wall().is_solid())
    }

    /// Is there a solid floor in row `y` under any of `cols`?
    #[inline]
    pub(crate) fn any_floor(&self, mut cols: RangeInclusive<usize>, y: usize) -> bool {
        cols.any(|x| self.at(x, y).floor().is_solid())
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_grid_has_margin_row_and_column() {
        let g = Grid::blank(20, 10, 48.0, 32);
        assert_eq!(g.cols(), 21);
        assert_eq!(g.rows(), 11);
        assert_eq!(g.width(), 20);
        assert_eq!(g.height(), 10);
        assert!(g.cells.iter().all(|c| c.is_open()));
    }

    #[test]
    fn paint_then_query_round_trip() {
        let mut g = Grid::blank(8, 8, 48.0, 32);
        g.paint_wall(3, 4);
        assert_eq!(g.wall_type(3, 4), Barrier::Solid);
        assert_eq!(g.floor_type(3, 4), Barrier::None);
        assert_eq!(g.wall_type(4, 4), Barrier::None);
        assert_eq!(g.floor_type(4, 4), Barrier::None);
        assert_eq!(g.wall_type(3, 5), Barrier::None);

        g.paint_floor(3, 4);
        assert_eq!(g.floor_type(3, 4), Barrier::Solid);
    }

    #[test]
    fn erase_restores_none() {
        let mut g = Grid::blank(4, 4, 48.0, 32);
        g.paint_wall(1, 1);
        g.paint_floor(1, 1);
        g.erase_wall(1, 1);
        assert_eq!(g.wall_type(1, 1), Barrier::None);
        assert_eq!(g.floor_type(1, 1), Barrier::Solid);
        g.erase_floor(1, 1);
        assert!(g.cell(1, 1).is_some_and(|c| c.is_open()));
    }

    #[test]
    fn checked_cell_outside_is_none() {
        let g = Grid::blank(4, 4, 48.0, 32);
        assert!(g.cell(4, 4).is_some());
        assert!(g.cell(5, 0).is_none());
        assert!(g.cell(0, 5).is_none());
    }

    #[test]
    fn arena_is_boxed() {
        let g = Grid::arena(20, 10, 48.0);
        for x in 0..20 {
            assert!(g.floor_type(x, 8).is_solid(), "floor missing at column {x}");
        }
        assert!(!g.floor_type(20, 8).is_solid());
        for y in 0..10 {
            assert!(g.wall_type(0, y).is_solid());
            assert!(g.wall_type(20, y).is_solid());
        }
        assert!(!g.wall_type(0, 10).is_solid());
        // no platforms in the bare arena
        assert!(!g.wall_type(14, 7).is_solid());
    }

    #[test]
    fn arena_spawn_drops_onto_floor() {
        for height in 4..=12 {
            let mut g = Grid::arena(8, height, 48.0);
            let (x, y) = g.arena_spawn();
            assert_eq!((x, y), (64.0, ((height - 3) * 32) as f32));
            let id = g.add(Body::new(24, 24, x, y));
            for _ in 0..120 {
                g.update(1.0 / 60.0);
            }
            let b = g.body(id).expect("registered body");
            assert!(b.is_on_ground(), "height {height}");
            assert_eq!(b.y(), ((height - 2) * 32) as f32);
        }
    }

    #[test]
    fn toggle_edge_paints_then_erases() {
        let mut g = Grid::blank(4, 4, 48.0, 32);
        let wall = Edge::Wall { x: 2, y: 1 };
        assert_eq!(g.toggle_edge(wall), Barrier::Solid);
        assert!(g.wall_type(2, 1).is_solid());
        assert!(!g.floor_type(2, 1).is_solid());
        assert_eq!(g.toggle_edge(wall), Barrier::None);
        assert!(g.cell(2, 1).is_some_and(|c| c.is_open()));

        let floor = Edge::Floor { x: 3, y: 3 };
        g.toggle_edge(floor);
        assert_eq!(g.edge_type(floor), Barrier::Solid);
        assert_eq!(g.edge_type(Edge::Wall { x: 3, y: 3 }), Barrier::None);
    }

    #[test]
    fn erased_floor_drops_resting_body_on_next_walk() {
        let mut g = Grid::arena(20, 10, 48.0);
        let id = g.add(Body::new(10, 10, 64.0, 224.0));
        for _ in 0..60 {
            g.update(1.0 / 60.0);
        }
        assert!(g.body(id).is_some_and(|b| b.is_on_ground() && b.y() == 256.0));

        g.toggle_edge(Edge::Floor { x: 2, y: 8 });
        if let Some(b) = g.body_mut(id) {
            b.set_vx(1.0);
        }
        g.update(1.0 / 60.0);
        assert!(g.body(id).is_some_and(|b| !b.is_on_ground()));
    }

    #[test]
    fn default_layout_has_platforms() {
        let g = Grid::new(20, 10, 48.0);
        assert!(g.wall_type(4, 7).is_solid());
        assert!(g.wall_type(5, 7).is_solid());
        assert!(g.floor_type(4, 7).is_solid());
        assert!(!g.floor_type(5, 7).is_solid());
        assert!(g.wall_type(18, 6).is_solid());
        assert!(g.wall_type(19, 6).is_solid());
        assert!(g.floor_type(18, 6).is_solid());
        assert!(g.floor_type(18, 7).is_solid());
        assert!(!g.wall_type(18, 7).is_solid());
        assert_eq!(g.resolution(), DEFAULT_RESOLUTION);
        assert_eq!(g.gravity(), 48.0);
    }

    #[test]
    fn default_layout_skips_platforms_on_small_grid() {
        let g = Grid::new(8, 6, 48.0);
        assert!(g.wall_type(4, 3).is_solid());
        assert!(g.wall_type(8, 0).is_solid());
        assert!(g.floor_type(7, 4).is_solid());
    }

    #[test]
    fn add_attaches_and_remove_detaches() {
        let mut g = Grid::blank(4, 4, 48.0, 32);
        let id = g.add(Body::new(10, 10, 40.0, 40.0));
        assert_eq!(g.body_count(), 1);
        assert!(g.body(id).is_some_and(|b| b.is_added()));

        let body = g.remove(id).expect("registered body");
        assert!(!body.is_added());
        assert_eq!(body.x(), 40.0);
        assert_eq!(g.body_count(), 0);
        assert!(g.body(id).is_none());
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut g = Grid::blank(4, 4, 48.0, 32);
        let id = g.add(Body::new(10, 10, 40.0, 40.0));
        assert!(g.remove(id).is_some());
        assert!(g.remove(id).is_none());
    }

    #[test]
    fn removed_body_can_be_added_again() {
        let mut g = Grid::blank(4, 4, 48.0, 32);
        let first = g.add(Body::new(10, 10, 40.0, 40.0));
        let body = g.remove(first).expect("registered body");
        let second = g.add(body);
        assert_ne!(first, second);
        assert!(g.body(second).is_some_and(|b| b.is_added()));
    }

    #[test]
    fn remove_preserves_registration_order() {
        let mut g = Grid::blank(4, 4, 48.0, 32);
        let a = g.add(Body::new(1, 1, 1.0, 1.0));
        let b = g.add(Body::new(2, 2, 2.0, 2.0));
        let c = g.add(Body::new(3, 3, 3.0, 3.0));
        g.remove(b);
        let order: Vec<BodyId> = g.bodies().map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, c]);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already registered")]
    fn double_add_panics_in_debug() {
        let mut g = Grid::blank(4, 4, 48.0, 32);
        let mut body = Body::new(10, 10, 40.0, 40.0);
        body.attach();
        g.add(body);
    }

    #[test]
    fn body_mut_reaches_registered_body() {
        let mut g = Grid::blank(4, 4, 48.0, 32);
        let id = g.add(Body::new(10, 10, 40.0, 40.0));
        if let Some(b) = g.body_mut(id) {
            b.set_vx(12.0);
        }
        assert_eq!(g.body(id).map(|b| b.vx()), Some(12.0));
    }
}
