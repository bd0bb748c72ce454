/// Cell barriers and their properties.
/// A cell carries two independent barriers: a wall on its left edge and a
/// floor on its top edge. Solidity is queried via methods so barrier
/// semantics stay centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Barrier {
    #[default]
    None,
    Solid,
}

impl Barrier {
    /// Does this barrier stop a body crossing it?
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, Barrier::Solid)
    }
}

/// One tile of the grid.
///
/// `wall` blocks horizontal motion across the cell's left edge,
/// `floor` blocks vertical motion across the cell's top edge.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Cell {
    wall: Barrier,
    floor: Barrier,
}

impl Cell {
    #[inline]
    pub fn wall(&self) -> Barrier {
        self.wall
    }

    #[inline]
    pub fn floor(&self) -> Barrier {
        self.floor
    }

    pub fn set_wall(&mut self, wall: Barrier) {
        self.wall = wall;
    }

    pub fn set_floor(&mut self, floor: Barrier) {
        self.floor = floor;
    }

    /// Neither wall nor floor is solid.
    pub fn is_open(&self) -> bool {
        !self.wall.is_solid() && !self.floor.is_solid()
    }
}

/// One paintable edge: the left edge (wall) or top edge (floor) of a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Edge {
    Wall { x: usize, y: usize },
    Floor { x: usize, y: usize },
}

impl Edge {
    pub fn cell(&self) -> (usize, usize) {
        match *self {
            Edge::Wall { x, y } | Edge::Floor { x, y } => (x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cell_is_open() {
        let c = Cell::default();
        assert_eq!(c.wall(), Barrier::None);
        assert_eq!(c.floor(), Barrier::None);
        assert!(c.is_open());
    }

    #[test]
    fn wall_and_floor_are_independent() {
        let mut c = Cell::default();
        c.set_wall(Barrier::Solid);
        assert!(c.wall().is_solid());
        assert!(!c.floor().is_solid());
        assert!(!c.is_open());

        c.set_floor(Barrier::Solid);
        c.set_wall(Barrier::None);
        assert!(!c.wall().is_solid());
        assert!(c.floor().is_solid());
    }

    #[test]
    fn edge_names_its_cell() {
        assert_eq!(Edge::Wall { x: 3, y: 7 }.cell(), (3, 7));
        assert_eq!(Edge::Floor { x: 0, y: 2 }.cell(), (0, 2));
    }
}
