/// Keyboard and mouse state tracker for the demo host.
///
/// Tracks which keys are currently held so that:
///   - walking continues while an arrow key is held
///   - jumping fires only on the initial press
///
/// The mouse is tracked as a pointer position plus the left clicks of the
/// last drain, both in terminal cells.
///
/// Terminals without keyboard enhancement never report Release events, so
/// a key counts as released once no Press/Repeat arrives for `HOLD_TIMEOUT`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};

const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Last Press/Repeat per key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,
    /// Raw events of the last drain, for Ctrl+C detection.
    raw_events: Vec<KeyEvent>,
    /// Last reported mouse position (column, row).
    pointer: Option<(u16, u16)>,
    /// Left-button presses of the last drain.
    clicks: Vec<(u16, u16)>,
    /// Honor explicit Release events (keyboard enhancement confirmed).
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            pointer: None,
            clicks: Vec::with_capacity(4),
            honor_release: false,
        }
    }

    /// Drain pending terminal events without blocking.
    /// Call once per frame, before stepping the grid.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.clicks.clear();

        while event::poll(Duration::ZERO)? {
            let key = match event::read()? {
                Event::Key(key) => key,
                Event::Mouse(mouse) => {
                    self.track_mouse(mouse);
                    continue;
                }
                _ => continue,
            };
            self.raw_events.push(key);

            match key.kind {
                KeyEventKind::Release if self.honor_release => {
                    self.last_active.remove(&key.code);
                }
                KeyEventKind::Release => {}
                _ => {
                    if !self.is_held(key.code) {
                        self.fresh_presses.push(key.code);
                    }
                    self.last_active.insert(key.code, Instant::now());
                }
            }
        }

        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        Ok(())
    }

    fn track_mouse(&mut self, mouse: MouseEvent) {
        let at = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => self.pointer = Some(at),
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer = Some(at);
                self.clicks.push(at);
            }
            _ => {}
        }
    }

    pub fn pointer(&self) -> Option<(u16, u16)> {
        self.pointer
    }

    pub fn clicks(&self) -> &[(u16, u16)] {
        &self.clicks
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .is_some_and(|t| t.elapsed() < HOLD_TIMEOUT)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.fresh_presses.contains(c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn left_press_moves_pointer_and_clicks() {
        let mut kb = InputState::new();
        kb.track_mouse(mouse(MouseEventKind::Moved, 4, 3));
        assert_eq!(kb.pointer(), Some((4, 3)));
        assert!(kb.clicks().is_empty());

        kb.track_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 6, 5));
        kb.track_mouse(mouse(MouseEventKind::Down(MouseButton::Right), 8, 5));
        kb.track_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 9, 9));
        assert_eq!(kb.pointer(), Some((6, 5)));
        assert_eq!(kb.clicks(), &[(6, 5)]);
    }
}
