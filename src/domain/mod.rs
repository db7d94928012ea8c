//! Domain entities for phasegate.
//!
//! This module contains the core business entities:
//! - Phase/Status: the lifecycle taxonomy and the transition table
//! - ProjectState: the durable per-project workflow record

mod phase;
mod state;

pub use phase::{can_transition, requires_approval, Phase, Status, ALL_PHASES};
pub use state::{slugify, Approval, PhaseState, PhaseStates, ProjectState};
