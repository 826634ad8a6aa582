//! Input handling
//!
//! The simulation never reads devices directly. Once per frame the host
//! polls keyboard and mouse into an `InputSnapshot`, and that immutable
//! value is what the logic phase sees. Replaying the same snapshots
//! replays the same simulation.

mod actions;
mod state;

pub use actions::*;
pub use state::*;
