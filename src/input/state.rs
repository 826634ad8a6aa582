//! Input state management
//!
//! Polls keyboard and mouse through macroquad and freezes the result into
//! an `InputSnapshot` for the frame.

use macroquad::prelude::*;
use super::{Action, InputSnapshot};

/// Device-facing input poller. The only place that touches macroquad input.
pub struct InputState {
    /// Mouse position at the previous poll, pixels
    last_mouse: Option<(f32, f32)>,
    /// Whether mouse travel turns the view (cursor grabbed)
    pub mouse_look: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            last_mouse: None,
            mouse_look: false,
        }
    }

    /// Grab or release the cursor for mouse look
    pub fn set_mouse_look(&mut self, enabled: bool) {
        self.mouse_look = enabled;
        set_cursor_grab(enabled);
        show_mouse(!enabled);
        self.last_mouse = None;
    }

    /// Call once per frame, before the simulation step
    pub fn poll(&mut self) -> InputSnapshot {
        let mut snapshot = InputSnapshot::new();

        for action in Action::ALL {
            if self.keyboard_pressed(action) {
                snapshot = snapshot.pressing(action);
            } else if self.keyboard_down(action) {
                snapshot = snapshot.holding(action);
            }
        }

        let (mx, my) = mouse_position();
        if self.mouse_look {
            if let Some((lx, _)) = self.last_mouse {
                snapshot = snapshot.looking(mx - lx);
            }
        }
        self.last_mouse = Some((mx, my));

        snapshot
    }

    fn keyboard_down(&self, action: Action) -> bool {
        match action {
            Action::MoveForward => is_key_down(KeyCode::W),
            Action::MoveBackward => is_key_down(KeyCode::S),
            Action::StrafeLeft => is_key_down(KeyCode::A),
            Action::StrafeRight => is_key_down(KeyCode::D),
            Action::Pause => is_key_down(KeyCode::P),
            Action::ToggleCollisionDebug => is_key_down(KeyCode::F3),
        }
    }

    fn keyboard_pressed(&self, action: Action) -> bool {
        match action {
            Action::Pause => is_key_pressed(KeyCode::P),
            Action::ToggleCollisionDebug => is_key_pressed(KeyCode::F3),
            _ => false,
        }
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
