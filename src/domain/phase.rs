//! Phase taxonomy and the transition table.
//!
//! Transitions are an explicit edge list rather than "phase + 1" so that
//! revision edges (going back to amend an earlier artifact) traverse the same
//! code path as forward edges, and individual edges can require approval.

use serde::{Deserialize, Serialize};

/// One discrete stage of the feature lifecycle, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Init,
    Specify,
    Plan,
    Task,
    Execute,
    Review,
    Complete,
}

/// All phases in canonical order.
pub const ALL_PHASES: [Phase; 7] = [
    Phase::Init,
    Phase::Specify,
    Phase::Plan,
    Phase::Task,
    Phase::Execute,
    Phase::Review,
    Phase::Complete,
];

impl Phase {
    /// The wire name used in the state document and CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Specify => "specify",
            Self::Plan => "plan",
            Self::Task => "task",
            Self::Execute => "execute",
            Self::Review => "review",
            Self::Complete => "complete",
        }
    }

    /// Display name for status output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Specify => "Specify",
            Self::Plan => "Plan",
            Self::Task => "Task",
            Self::Execute => "Execute",
            Self::Review => "Review",
            Self::Complete => "Complete",
        }
    }

    /// The canonical forward successor. Complete is terminal.
    pub fn next_phase(&self) -> Phase {
        match self {
            Self::Init => Self::Specify,
            Self::Specify => Self::Plan,
            Self::Plan => Self::Task,
            Self::Task => Self::Execute,
            Self::Execute => Self::Review,
            Self::Review => Self::Complete,
            Self::Complete => Self::Complete,
        }
    }

    /// Canonical artifact file name for this phase.
    pub fn output_filename(&self) -> String {
        match self {
            Self::Specify => "spec.md".to_string(),
            Self::Plan => "plan.md".to_string(),
            Self::Task => "tasks.md".to_string(),
            Self::Execute => "implementation.md".to_string(),
            Self::Review => "review.md".to_string(),
            other => format!("{}.md", other.as_str()),
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approval state of a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InProgress,
    Approved,
    Rejected,
    Blocked,
}

impl Status {
    /// Display name for status output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Blocked => "Blocked",
        }
    }

    /// Badge/indicator for the status table.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Pending => "·",
            Self::InProgress => "▶",
            Self::Approved => "✓",
            Self::Rejected => "✗",
            Self::Blocked => "⊘",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The fixed edge set of legal transitions.
///
/// Forward edges walk the lifecycle; revision edges return to an earlier phase
/// to amend its artifact. Only Plan -> Task requires the source phase to be
/// approved first.
const EDGES: &[(Phase, Phase, bool)] = &[
    // Forward edges
    (Phase::Init, Phase::Specify, false),
    (Phase::Specify, Phase::Plan, false),
    (Phase::Plan, Phase::Task, true),
    (Phase::Task, Phase::Execute, false),
    (Phase::Execute, Phase::Review, false),
    (Phase::Review, Phase::Complete, false),
    // Revision edges
    (Phase::Plan, Phase::Specify, false),
    (Phase::Task, Phase::Plan, false),
    (Phase::Execute, Phase::Task, false),
    (Phase::Review, Phase::Execute, false),
];

/// Whether `(from, to)` is a member of the edge set. Self-loops are illegal.
pub fn can_transition(from: Phase, to: Phase) -> bool {
    EDGES.iter().any(|&(f, t, _)| f == from && t == to)
}

/// Whether the `(from, to)` edge requires the source phase to be approved.
/// Pairs absent from the edge set report false.
pub fn requires_approval(from: Phase, to: Phase) -> bool {
    EDGES
        .iter()
        .find(|&&(f, t, _)| f == from && t == to)
        .map(|&(_, _, gated)| gated)
        .unwrap_or(false)
}
