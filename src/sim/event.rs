/// Contacts reported by a simulation step.
/// Hosts that want them call `Grid::update_with_events`; plain `update`
/// discards them.

use crate::domain::body::BodyId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContactEvent {
    /// Stopped flush against the wall in `column`.
    HitWall { id: BodyId, side: Side, column: usize },
    /// Walked off the floor it was standing on.
    LeftGround { id: BodyId },
    /// Came down onto the floor of `row`.
    Landed { id: BodyId, row: usize },
    /// Bumped its head on the floor of `row`.
    HitCeiling { id: BodyId, row: usize },
}
