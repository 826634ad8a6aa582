//! Sliding doors
//!
//! A door slides sideways out of its frame while the player is close and
//! slides back when the player leaves. The slide offset is clamped to
//! `[0, max_offset]` every tick and the phase advances at most one step per
//! tick, so a long frame can never jump from `Closed` straight to `Open`.

use serde::{Serialize, Deserialize};
use crate::config::DoorSettings;
use crate::math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorPhase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

/// Door state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub phase: DoorPhase,
    /// Current slide distance along the door's local X axis
    pub offset: f32,
    /// Closed position (tile centre)
    pub base_position: Vec3,
    /// Rotation about Y; the slide axis is local X rotated by this
    pub yaw: f32,
    pub max_offset: f32,
    pub speed: f32,
    pub trigger_radius: f32,
}

impl Door {
    pub fn new(base_position: Vec3, yaw: f32, settings: &DoorSettings) -> Self {
        Self {
            phase: DoorPhase::Closed,
            offset: 0.0,
            base_position,
            yaw,
            max_offset: settings.max_offset(),
            speed: settings.speed,
            trigger_radius: settings.trigger_radius(),
        }
    }

    /// True when `target` is close enough to hold the door open
    pub fn wants_open(&self, target: Vec3) -> bool {
        self.base_position.distance(target) < self.trigger_radius
    }

    /// Advance one tick. Returns the new phase if it changed.
    pub fn update(&mut self, target: Vec3, dt: f32) -> Option<DoorPhase> {
        let open = self.wants_open(target);
        let step = self.speed * dt.max(0.0);

        self.offset = if open {
            (self.offset + step).min(self.max_offset)
        } else {
            (self.offset - step).max(0.0)
        };

        let next = match (self.phase, open) {
            (DoorPhase::Closed, true) => DoorPhase::Opening,
            (DoorPhase::Closing, true) => DoorPhase::Opening,
            (DoorPhase::Opening, true) if self.offset >= self.max_offset => DoorPhase::Open,
            (DoorPhase::Open, false) => DoorPhase::Closing,
            (DoorPhase::Opening, false) => DoorPhase::Closing,
            (DoorPhase::Closing, false) if self.offset <= 0.0 => DoorPhase::Closed,
            (phase, _) => phase,
        };

        if next != self.phase {
            self.phase = next;
            Some(next)
        } else {
            None
        }
    }

    /// World position for the current offset
    pub fn position(&self) -> Vec3 {
        self.base_position + Vec3::new(self.offset, 0.0, 0.0).rotate_y(self.yaw)
    }
}
