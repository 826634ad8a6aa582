//! First-person player controller
//!
//! Turns the frame's input snapshot into a facing direction and a walking
//! velocity. Runs in the logic phase, so it never touches the position.

use serde::{Serialize, Deserialize};
use crate::config::PlayerSettings;
use crate::input::InputSnapshot;
use crate::math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerController {
    /// Unit facing direction in the XZ plane
    pub dir: Vec3,
    /// True if movement keys produced a velocity this tick
    pub moving: bool,
}

impl PlayerController {
    pub fn new() -> Self {
        Self {
            dir: Vec3::FORWARD,
            moving: false,
        }
    }

    /// Apply look and movement intent. Returns the velocity for this tick.
    pub fn logic(&mut self, input: &InputSnapshot, dt: f32, settings: &PlayerSettings) -> Vec3 {
        let yaw = input.look_delta_x * dt * -settings.turn_sensitivity;
        if yaw != 0.0 && yaw.is_finite() {
            let turned = self.dir.rotate_y(yaw).normalize();
            if turned != Vec3::ZERO {
                self.dir = turned;
            }
        }

        let (strafe, forward) = input.move_axes();
        if strafe == 0.0 && forward == 0.0 {
            self.moving = false;
            return Vec3::ZERO;
        }

        self.moving = true;
        let angle = strafe.atan2(forward);
        let mut velocity = self.dir.rotate_y(angle).normalize() * settings.speed;
        velocity.y = 0.0;
        velocity
    }

    /// Yaw that rotates `Vec3::FORWARD` onto the facing direction
    pub fn yaw(&self) -> f32 {
        (-self.dir.x).atan2(-self.dir.z)
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new()
    }
}
