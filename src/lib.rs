//! Tile Grid: a 2D tile-grid physics core for platform games.
//!
//! Bodies move under gravity and are resolved, one axis at a time,
//! against a static grid of walls and floors. See `domain::grid::Grid`
//! and `Grid::update`.

pub mod config;
pub mod domain;
pub mod sim;

pub use domain::body::{Body, BodyId};
pub use domain::cell::{Barrier, Cell, Edge};
pub use domain::grid::Grid;
pub use sim::event::{ContactEvent, Side};
