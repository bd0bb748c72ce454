pub mod body;
pub mod cell;
pub mod grid;
