/// Bodies: the rectangular nodes moved by the grid.
///
/// A body is inert between steps. All physics is driven by `Grid::update`;
/// the body only stores state and exposes accessors/mutators.
///
/// ## Box convention
///
/// `(x, y)` is the left edge and the bottom edge of the box (y grows
/// downward). The box spans `[x, x + width]` horizontally and
/// `[y - height, y]` vertically.

/// Default mass for a new body.
pub const DEFAULT_MASS: f32 = 80.0;
/// Default friction coefficient. Stored but not used by the step.
pub const DEFAULT_FRICTION: f32 = 0.92;

/// Handle to a body registered in a grid.
/// Unique per grid; never reused after removal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BodyId(pub(crate) u32);

#[derive(Clone, Debug)]
pub struct Body {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) mass: f32,
    pub(crate) friction: f32,
    pub(crate) on_ground: bool,
    pub(crate) added: bool,
}

impl Body {
    /// A body at rest at `(x, y)`: no velocity, not on ground, not added.
    pub fn new(width: u32, height: u32, x: f32, y: f32) -> Self {
        Body {
            width,
            height,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            mass: DEFAULT_MASS,
            friction: DEFAULT_FRICTION,
            on_ground: false,
            added: false,
        }
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    // ── Accessors ──

    pub fn width(&self) -> u32 { self.width }
    pub fn height(&self) -> u32 { self.height }
    pub fn x(&self) -> f32 { self.x }
    pub fn y(&self) -> f32 { self.y }
    pub fn vx(&self) -> f32 { self.vx }
    pub fn vy(&self) -> f32 { self.vy }
    pub fn mass(&self) -> f32 { self.mass }
    pub fn friction(&self) -> f32 { self.friction }

    /// Was the body resting on a solid floor after the last step?
    pub fn is_on_ground(&self) -> bool { self.on_ground }

    /// Is the body currently registered in a grid?
    pub fn is_added(&self) -> bool { self.added }

    // ── Mutators ──

    pub fn set_vx(&mut self, vx: f32) {
        self.vx = vx;
    }

    /// Any vertical velocity means the body is leaving the ground,
    /// so a non-zero `vy` clears the ground flag right away.
    pub fn set_vy(&mut self, vy: f32) {
        self.vy = vy;
        if vy != 0.0 {
            self.on_ground = false;
        }
    }

    pub fn add_vx(&mut self, delta: f32) {
        self.set_vx(self.vx + delta);
    }

    pub fn add_vy(&mut self, delta: f32) {
        self.set_vy(self.vy + delta);
    }

    /// Teleport the body and drop its ground contact; gravity resumes
    /// on the next step until it lands again.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.on_ground = false;
    }

    // ── Registration (grid only) ──

    pub(crate) fn attach(&mut self) {
        self.added = true;
    }

    pub(crate) fn detach(&mut self) {
        self.added = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_body_is_at_rest() {
        let b = Body::new(10, 12, 64.0, 96.0);
        assert_eq!(b.width(), 10);
        assert_eq!(b.height(), 12);
        assert_eq!(b.vx(), 0.0);
        assert_eq!(b.vy(), 0.0);
        assert_eq!(b.mass(), DEFAULT_MASS);
        assert_eq!(b.friction(), DEFAULT_FRICTION);
        assert!(!b.is_on_ground());
        assert!(!b.is_added());
    }

    #[test]
    fn set_vy_nonzero_clears_ground() {
        let mut b = Body::new(10, 10, 0.0, 0.0);
        b.on_ground = true;
        b.set_vy(-5.0);
        assert!(!b.is_on_ground());
        assert_eq!(b.vy(), -5.0);
    }

    #[test]
    fn set_vy_zero_keeps_ground() {
        let mut b = Body::new(10, 10, 0.0, 0.0);
        b.on_ground = true;
        b.set_vy(0.0);
        assert!(b.is_on_ground());
    }

    #[test]
    fn set_vx_keeps_ground() {
        let mut b = Body::new(10, 10, 0.0, 0.0);
        b.on_ground = true;
        b.set_vx(100.0);
        assert!(b.is_on_ground());
        assert_eq!(b.vx(), 100.0);
    }

    #[test]
    fn add_deltas_go_through_setters() {
        let mut b = Body::new(10, 10, 0.0, 0.0).with_velocity(1.0, 0.0);
        b.on_ground = true;
        b.add_vx(2.5);
        assert_eq!(b.vx(), 3.5);
        assert!(b.is_on_ground());

        b.add_vy(-1.0);
        assert_eq!(b.vy(), -1.0);
        assert!(!b.is_on_ground());
    }

    #[test]
    fn set_position_moves_and_clears_ground() {
        let mut b = Body::new(10, 10, 64.0, 96.0);
        b.on_ground = true;
        b.set_position(32.0, 40.0);
        assert_eq!((b.x(), b.y()), (32.0, 40.0));
        assert!(!b.is_on_ground());
    }

    #[test]
    fn builders_override_defaults() {
        let b = Body::new(4, 4, 0.0, 0.0).with_mass(1.0).with_friction(0.5);
        assert_eq!(b.mass(), 1.0);
        assert_eq!(b.friction(), 0.5);
    }
}
