//! Event System
//!
//! Per-tick records of what the simulation did, for systems that want to
//! react without being called directly (HUD, debug overlay, audio).
//! Queues are cleared at the start of every world update, so after an
//! update they hold exactly that tick's events.

use super::collision::{CandidateSource, Face};
use super::door::DoorPhase;
use super::entity::EntityId;

/// Events of one type, collected during a tick
#[derive(Debug)]
pub struct EventQueue<T> {
    events: Vec<T>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn send(&mut self, event: T) {
        self.events.push(event);
    }

    pub fn extend<I: IntoIterator<Item = T>>(&mut self, events: I) {
        self.events.extend(events);
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Container for all simulation events
#[derive(Debug, Default)]
pub struct Events {
    /// One per candidate an entity was resolved against
    pub contacts: EventQueue<ContactEvent>,

    /// Door phase transitions
    pub doors: EventQueue<DoorEvent>,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_all(&mut self) {
        self.contacts.clear();
        self.doors.clear();
    }
}

// =============================================================================
// Event Types
// =============================================================================

/// An entity's box hit a solid tile or another entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    /// The entity that was pushed
    pub entity: EntityId,
    /// What it hit
    pub source: CandidateSource,
    /// Face of the entity's box that made contact
    pub face: Face,
    /// Penetration before correction (zero for resting contact)
    pub depth: f32,
}

/// A door entered a new phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorEvent {
    pub door: EntityId,
    pub phase: DoorPhase,
}
