//! Game action definitions

use serde::{Serialize, Deserialize};

/// Digital actions the simulation and the host react to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    // Movement (WASD)
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,

    // System
    Pause,
    ToggleCollisionDebug,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::Pause,
        Action::ToggleCollisionDebug,
    ];

    fn bit(self) -> u16 {
        match self {
            Action::MoveForward => 1 << 0,
            Action::MoveBackward => 1 << 1,
            Action::StrafeLeft => 1 << 2,
            Action::StrafeRight => 1 << 3,
            Action::Pause => 1 << 4,
            Action::ToggleCollisionDebug => 1 << 5,
        }
    }
}

/// Immutable per-frame input state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Actions held this frame
    held: u16,
    /// Actions that went down this frame
    pressed: u16,
    /// Horizontal look travel this frame, pixels, positive to the right
    pub look_delta_x: f32,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: mark an action as held
    pub fn holding(mut self, action: Action) -> Self {
        self.held |= action.bit();
        self
    }

    /// Builder: mark an action as pressed this frame (and held)
    pub fn pressing(mut self, action: Action) -> Self {
        self.pressed |= action.bit();
        self.held |= action.bit();
        self
    }

    /// Builder: horizontal look travel
    pub fn looking(mut self, dx: f32) -> Self {
        self.look_delta_x = dx;
        self
    }

    pub fn is_down(&self, action: Action) -> bool {
        self.held & action.bit() != 0
    }

    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed & action.bit() != 0
    }

    /// Movement intent as (strafe, forward). Strafe is +1 for left, -1 for
    /// right; forward is +1 for forward, -1 for back. When both keys of a
    /// pair are held, left and forward win.
    pub fn move_axes(&self) -> (f32, f32) {
        let strafe = if self.is_down(Action::StrafeLeft) {
            1.0
        } else if self.is_down(Action::StrafeRight) {
            -1.0
        } else {
            0.0
        };
        let forward = if self.is_down(Action::MoveForward) {
            1.0
        } else if self.is_down(Action::MoveBackward) {
            -1.0
        } else {
            0.0
        };
        (strafe, forward)
    }
}
