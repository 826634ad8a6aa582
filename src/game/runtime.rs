//! Runtime
//!
//! The host-facing side of the simulation: turns wall-clock time into
//! clamped tick lengths, handles pause and the collision debug toggle, and
//! steps the world once per frame callback.

use tracing::{debug, info};
use crate::input::{Action, InputSnapshot};
use super::World;

/// Turns absolute frame timestamps into tick lengths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    last: Option<f64>,
    max_step: f32,
}

impl FrameClock {
    pub fn new(max_step: f32) -> Self {
        Self {
            last: None,
            max_step,
        }
    }

    /// Record a frame at `now` seconds. The first call returns 0; later
    /// calls return the elapsed time clamped to `[0, max_step]`. Clocks
    /// that go backwards or produce NaN yield 0.
    pub fn tick(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => {
                let elapsed = (now - last) as f32;
                if elapsed.is_finite() && elapsed > 0.0 {
                    elapsed.min(self.max_step)
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
        if now.is_finite() {
            self.last = Some(now);
        }
        dt
    }
}

/// Owns the world and drives it from the frame loop
pub struct Runtime {
    pub world: World,
    clock: FrameClock,
    pub paused: bool,
}

impl Runtime {
    pub fn new(world: World) -> Self {
        let max_step = world.settings().sim.max_frame_step;
        Self {
            world,
            clock: FrameClock::new(max_step),
            paused: false,
        }
    }

    /// One frame: toggles, clock, and a world update unless paused.
    /// Returns the tick length that was simulated (0 while paused).
    pub fn frame(&mut self, now: f64, input: &InputSnapshot) -> f32 {
        if input.is_pressed(Action::Pause) {
            self.set_paused(!self.paused);
        }
        if input.is_pressed(Action::ToggleCollisionDebug) {
            self.set_debug_collisions(!self.world.debug_collisions);
        }

        let dt = self.clock.tick(now);
        if self.paused {
            return 0.0;
        }
        self.world.update(input, dt);
        if self.world.debug_collisions && !self.world.events.contacts.is_empty() {
            debug!(tick = self.world.ticks(), contacts = self.world.events.contacts.len(), "tick contacts");
        }
        dt
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!(paused, "pause toggled");
        }
        self.paused = paused;
    }

    pub fn set_debug_collisions(&mut self, enabled: bool) {
        if self.world.debug_collisions != enabled {
            info!(enabled, "collision debug toggled");
        }
        self.world.debug_collisions = enabled;
    }
}
