/// The step function: advances every registered body by one timestep.
///
/// Processing order, per body, in registration order:
///   1. Gravity (skipped while on ground)
///   2. Horizontal move + wall resolution
///   3. Ground-loss check (only after a horizontal move)
///   4. Vertical move + floor resolution (landing / ceiling)
///
/// X is resolved with the body's pre-move y, Y with the already-resolved x.
/// That order decides snap coordinates when a wall and a floor are hit in
/// the same step.
///
/// Each axis moves at most `resolution - EPSILON` per step, so a body can
/// enter at most one new tile column/row per step. Only that one boundary
/// is tested.
///
/// Tile indices come from `f32 as usize`, which truncates and saturates
/// negatives to 0. Hosts keep bodies inside the boxed arena.

use crate::domain::body::{Body, BodyId};
use crate::domain::grid::{CellView, Grid};
use super::event::{ContactEvent, Side};

/// Keeps the leading edge off the exact tile boundary.
pub const EPSILON: f32 = 0.001;

// ══════════════════════════════════════════════════════════════
// Main entry points
// ══════════════════════════════════════════════════════════════

impl Grid {
    /// Advance all bodies by `timestep` world-time units.
    pub fn update(&mut self, timestep: f32) {
        let map = CellView::new(&self.cells, self.cols, self.rows);
        for (_, body) in self.nodes.iter_mut() {
            step_body(&map, self.resolution, self.gravity, body, timestep);
        }
    }

    /// Same as `update`, appending the contacts of this step to `events`.
    pub fn update_with_events(&mut self, timestep: f32, events: &mut Vec<ContactEvent>) {
        let map = CellView::new(&self.cells, self.cols, self.rows);
        for (id, body) in self.nodes.iter_mut() {
            let contacts = step_body(&map, self.resolution, self.gravity, body, timestep);
            contacts.report(*id, events);
        }
    }
}

/// What happened to one body during one step.
#[derive(Clone, Copy, Default, Debug)]
struct Contacts {
    wall: Option<(Side, usize)>,
    left_ground: bool,
    landed: Option<usize>,
    ceiling: Option<usize>,
}

impl Contacts {
    fn report(self, id: BodyId, events: &mut Vec<ContactEvent>) {
        if let Some((side, column)) = self.wall {
            events.push(ContactEvent::HitWall { id, side, column });
        }
        if self.left_ground {
            events.push(ContactEvent::LeftGround { id });
        }
        if let Some(row) = self.landed {
            events.push(ContactEvent::Landed { id, row });
        }
        if let Some(row) = self.ceiling {
            events.push(ContactEvent::HitCeiling { id, row });
        }
    }
}

fn step_body(map: &CellView, resolution: u32, gravity: f32, body: &mut Body, timestep: f32) -> Contacts {
    let mut contacts = Contacts::default();

    resolve_gravity(body, gravity, timestep);

    if body.vx != 0.0 {
        contacts.wall = resolve_horizontal(map, resolution, body, timestep);
        if body.on_ground && !floor_beneath(map, resolution, body) {
            body.on_ground = false;
            contacts.left_ground = true;
        }
    }

    if body.vy != 0.0 {
        match resolve_vertical(map, resolution, body, timestep) {
            Some(VerticalHit::Floor(row)) => contacts.landed = Some(row),
            Some(VerticalHit::Ceiling(row)) => contacts.ceiling = Some(row),
            None => {}
        }
    }

    contacts
}

// ══════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════

/// Tile index containing world coordinate `v`.
#[inline]
fn tile(v: f32, res: f32) -> usize {
    (v / res) as usize
}

/// Limit a per-step displacement to just under one tile.
#[inline]
fn clamp_step(d: f32, res: f32) -> f32 {
    let limit = res - EPSILON;
    d.clamp(-limit, limit)
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

/// Gravity is scaled by the body's mass as well as the timestep.
#[inline]
fn resolve_gravity(body: &mut Body, gravity: f32, timestep: f32) {
    if !body.on_ground {
        body.vy += body.mass * gravity * timestep;
    }
}

// ══════════════════════════════════════════════════════════════
// Horizontal: walls
// ══════════════════════════════════════════════════════════════

fn resolve_horizontal(map: &CellView, resolution: u32, body: &mut Body, timestep: f32) -> Option<(Side, usize)> {
    let res = resolution as f32;
    let w = body.width as f32;
    let h = body.height as f32;

    let dx = clamp_step(body.vx * timestep, res);
    let xp = body.x;
    body.x += dx;

    let rows = tile(body.y - h, res)..=tile(body.y - EPSILON, res);

    if body.vx > 0.0 {
        // Leading edge is the right side.
        let from = tile(xp + w - EPSILON, res);
        let to = tile(body.x + w, res);
        if from != to && map.any_wall(to, rows) {
            body.vx = 0.0;
            body.x = (to * resolution as usize) as f32 - w;
            return Some((Side::Right, to));
        }
    } else {
        // Leading edge is the left side; the wall sits on the left edge
        // of the column to its right.
        let from = tile(xp + EPSILON, res) + 1;
        let to = tile(body.x, res) + 1;
        if from != to && map.any_wall(to, rows) {
            body.vx = 0.0;
            body.x = (to * resolution as usize) as f32;
            return Some((Side::Left, to));
        }
    }

    None
}

/// Is there still solid floor somewhere under the body's x-span?
fn floor_beneath(map: &CellView, resolution: u32, body: &Body) -> bool {
    let res = resolution as f32;
    let w = body.width as f32;
    let cols = tile(body.x, res)..=tile(body.x + w - EPSILON, res);
    map.any_floor(cols, tile(body.y, res))
}

// ══════════════════════════════════════════════════════════════
// Vertical: floors and ceilings
// ══════════════════════════════════════════════════════════════

enum VerticalHit {
    Floor(usize),
    Ceiling(usize),
}

fn resolve_vertical(map: &CellView, resolution: u32, body: &mut Body, timestep: f32) -> Option<VerticalHit> {
    let res = resolution as f32;
    let w = body.width as f32;
    let h = body.height as f32;

    let dy = clamp_step(body.vy * timestep, res);
    let yp = body.y;
    body.y += dy;

    let cols = tile(body.x + EPSILON, res)..=tile(body.x + w - EPSILON, res);

    if body.vy > 0.0 {
        // Falling: the bottom edge leads.
        let from = tile(yp - EPSILON, res);
        let to = tile(body.y, res);
        if from != to && map.any_floor(cols, to) {
            body.on_ground = true;
            body.vy = 0.0;
            body.y = (to * resolution as usize) as f32;
            return Some(VerticalHit::Floor(to));
        }
    } else {
        // Rising: the top edge leads.
        let from = tile(yp - h + EPSILON, res) + 1;
        let to = tile(body.y - h, res) + 1;
        if from != to && map.any_floor(cols, to) {
            body.vy = 0.0;
            body.y = (to * resolution as usize + body.height as usize) as f32;
            return Some(VerticalHit::Ceiling(to));
        }
    }

    None
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
