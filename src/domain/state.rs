//! Project state entities: the durable record of how a project moved through
//! the workflow.

use super::{Phase, Status, ALL_PHASES};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An immutable audit record of a human sign-off on a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Approval {
    pub fn new(approved_by: impl Into<String>, comments: Option<String>) -> Self {
        Self {
            approved_by: approved_by.into(),
            approved_at: Utc::now(),
            comments,
        }
    }
}

/// Per-phase progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    pub phase: Phase,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Append-only audit trail, in insertion order.
    #[serde(default)]
    pub approvals: Vec<Approval>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_used: Option<String>,
    /// Accumulates across repeated completions; never deduplicated.
    #[serde(default)]
    pub output_files: Vec<String>,
}

impl PhaseState {
    fn seeded(phase: Phase) -> Self {
        // Init is considered approved at creation; there is no human approver
        // to record for it.
        let status = if phase == Phase::Init {
            Status::Approved
        } else {
            Status::Pending
        };
        Self {
            phase,
            status,
            started_at: None,
            completed_at: None,
            approvals: Vec::new(),
            agent_used: None,
            output_files: Vec::new(),
        }
    }

    /// Record a human approval. Earlier entries are never rewritten.
    pub fn approve(&mut self, approval: Approval) {
        self.completed_at = Some(approval.approved_at);
        self.approvals.push(approval);
        self.status = Status::Approved;
    }
}

/// One record per phase, all seven created eagerly.
///
/// A fixed struct rather than an open map: completeness is enforced by the
/// type instead of by convention, so `for_phase` can never miss a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseStates {
    pub init: PhaseState,
    pub specify: PhaseState,
    pub plan: PhaseState,
    pub task: PhaseState,
    pub execute: PhaseState,
    pub review: PhaseState,
    pub complete: PhaseState,
}

impl PhaseStates {
    fn seeded() -> Self {
        Self {
            init: PhaseState::seeded(Phase::Init),
            specify: PhaseState::seeded(Phase::Specify),
            plan: PhaseState::seeded(Phase::Plan),
            task: PhaseState::seeded(Phase::Task),
            execute: PhaseState::seeded(Phase::Execute),
            review: PhaseState::seeded(Phase::Review),
            complete: PhaseState::seeded(Phase::Complete),
        }
    }

    pub fn for_phase(&self, phase: Phase) -> &PhaseState {
        match phase {
            Phase::Init => &self.init,
            Phase::Specify => &self.specify,
            Phase::Plan => &self.plan,
            Phase::Task => &self.task,
            Phase::Execute => &self.execute,
            Phase::Review => &self.review,
            Phase::Complete => &self.complete,
        }
    }

    pub fn for_phase_mut(&mut self, phase: Phase) -> &mut PhaseState {
        match phase {
            Phase::Init => &mut self.init,
            Phase::Specify => &mut self.specify,
            Phase::Plan => &mut self.plan,
            Phase::Task => &mut self.task,
            Phase::Execute => &mut self.execute,
            Phase::Review => &mut self.review,
            Phase::Complete => &mut self.complete,
        }
    }

    /// Iterate phase records in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &PhaseState> {
        ALL_PHASES.iter().map(move |&p| self.for_phase(p))
    }
}

/// The whole durable state document for one project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    pub project_id: String,
    pub project_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_phase: Phase,
    pub phases: PhaseStates,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ProjectState {
    /// Create a freshly seeded project: Init approved, everything else
    /// pending, current phase Init.
    pub fn new(project_name: impl Into<String>) -> Self {
        let project_name = project_name.into();
        let now = Utc::now();
        Self {
            project_id: slugify(&project_name),
            project_name,
            created_at: now,
            updated_at: now,
            current_phase: Phase::Init,
            phases: PhaseStates::seeded(),
            metadata: BTreeMap::new(),
        }
    }

    /// The record for the phase the project is currently in.
    pub fn current(&self) -> &PhaseState {
        self.phases.for_phase(self.current_phase)
    }

    pub fn current_mut(&mut self) -> &mut PhaseState {
        self.phases.for_phase_mut(self.current_phase)
    }

    /// Refresh the modification stamp. Called by every mutating operation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Derive a stable project ID from a human name: lowercase, runs of anything
/// non-alphanumeric collapsed to single hyphens.
pub fn slugify(name: &str) -> String {
    let re = Regex::new(r"[^a-z0-9]+").expect("valid slug regex");
    re.replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}
