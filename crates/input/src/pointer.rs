use glam::Vec2;

use crate::Action;

/// Radians of orbit per pixel of left drag.
pub const ORBIT_SPEED: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Tracks cursor position and held buttons and turns motion into drags.
///
/// Right drag translates; left drag orbits. When both are held, translate
/// wins.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Last cursor position, y up. `None` until the first move.
    position: Option<Vec2>,
    window_height: f32,
    left: bool,
    right: bool,
}

impl PointerState {
    pub fn new(window_height: f32) -> Self {
        Self {
            window_height,
            ..Self::default()
        }
    }

    pub fn set_window_height(&mut self, window_height: f32) {
        self.window_height = window_height;
    }

    pub fn window_height(&self) -> f32 {
        self.window_height
    }

    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    pub fn is_pressed(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Left => self.left,
            PointerButton::Right => self.right,
            PointerButton::Middle => false,
        }
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) {
        match button {
            PointerButton::Left => self.left = pressed,
            PointerButton::Right => self.right = pressed,
            PointerButton::Middle => {}
        }
    }

    /// Record a cursor move given in window coordinates (y down).
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Action {
        let new = Vec2::new(x, self.window_height - y);
        let Some(old) = self.position.replace(new) else {
            return Action::Noop;
        };
        if self.right {
            Action::Translate { from: old, to: new }
        } else if self.left {
            let d = new - old;
            Action::Orbit {
                du: d.x * ORBIT_SPEED,
                dv: -d.y * ORBIT_SPEED,
            }
        } else {
            Action::Noop
        }
    }

    /// The cursor left the window; the next move starts a fresh drag.
    pub fn cursor_left(&mut self) {
        self.position = None;
    }

    /// Vertical scroll in notches, positive away from the user.
    pub fn scrolled(&self, delta: f32) -> Action {
        if delta == 0.0 || self.window_height <= 0.0 {
            return Action::Noop;
        }
        tracing::trace!(delta, "zoom");
        Action::Zoom {
            delta,
            window_height: self.window_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_move_only_records_position() {
        let mut p = PointerState::new(600.0);
        p.button(PointerButton::Left, true);
        assert_eq!(p.cursor_moved(10.0, 100.0), Action::Noop);
        assert_eq!(p.position(), Some(Vec2::new(10.0, 500.0)));
    }

    #[test]
    fn left_drag_orbits_with_flipped_y() {
        let mut p = PointerState::new(600.0);
        p.cursor_moved(100.0, 100.0);
        p.button(PointerButton::Left, true);
        // 20 px right, 10 px down on screen
        let action = p.cursor_moved(120.0, 110.0);
        let Action::Orbit { du, dv } = action else {
            panic!("expected orbit, got {action:?}");
        };
        assert!((du - 0.2).abs() < 1e-6);
        assert!((dv - 0.1).abs() < 1e-6);
    }

    #[test]
    fn right_drag_translates_and_wins_over_left() {
        let mut p = PointerState::new(600.0);
        p.cursor_moved(0.0, 600.0);
        p.button(PointerButton::Left, true);
        p.button(PointerButton::Right, true);
        assert_eq!(
            p.cursor_moved(5.0, 590.0),
            Action::Translate {
                from: Vec2::new(0.0, 0.0),
                to: Vec2::new(5.0, 10.0),
            }
        );
    }

    #[test]
    fn hover_without_buttons_is_noop() {
        let mut p = PointerState::new(600.0);
        p.cursor_moved(0.0, 0.0);
        assert_eq!(p.cursor_moved(50.0, 50.0), Action::Noop);
    }

    #[test]
    fn leaving_window_restarts_drag() {
        let mut p = PointerState::new(600.0);
        p.button(PointerButton::Left, true);
        p.cursor_moved(0.0, 0.0);
        p.cursor_left();
        assert_eq!(p.cursor_moved(300.0, 300.0), Action::Noop);
    }

    #[test]
    fn scroll_carries_window_height() {
        let p = PointerState::new(480.0);
        assert_eq!(
            p.scrolled(1.0),
            Action::Zoom {
                delta: 1.0,
                window_height: 480.0,
            }
        );
        assert_eq!(p.scrolled(0.0), Action::Noop);
    }

    #[test]
    fn released_button_stops_drag() {
        let mut p = PointerState::new(600.0);
        p.cursor_moved(0.0, 0.0);
        p.button(PointerButton::Left, true);
        p.button(PointerButton::Left, false);
        assert!(!p.is_pressed(PointerButton::Left));
        assert_eq!(p.cursor_moved(10.0, 0.0), Action::Noop);
    }
}
