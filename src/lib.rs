//! phasegate: phase-gated development workflow engine
//!
//! This crate sequences a feature through fixed development phases (Init,
//! Specify, Plan, Task, Execute, Review, Complete), gating progress behind
//! explicit human approvals recorded in a durable per-project state document.

pub mod commands;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod store;

pub use config::ProjectConfig;
pub use engine::WorkflowEngine;
pub use error::{Result, WorkflowError};
pub use store::StateStore;
