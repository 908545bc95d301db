//! Error types for world construction, plan decoding, configuration and planning.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while building an in-memory [`crate::world::World`] snapshot.
#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: &'static str, name: String },

    #[error("{kind} {name} references unknown parent {parent}")]
    UnknownParent {
        kind: &'static str,
        name: String,
        parent: String,
    },
}

/// Errors raised when a planner solution has a malformed shape.
///
/// Unknown action names are not errors; they decode to [`crate::actions::TaskAction::Unsupported`].
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("action {index} ({action}) is missing positional argument {position}")]
    MissingArgument {
        index: usize,
        action: String,
        position: usize,
    },

    #[error("action {index} ({action}) expected {expected} at position {position}, found {found}")]
    UnexpectedArgument {
        index: usize,
        action: String,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors raised while loading or validating [`crate::config::PlannerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid planner config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("domain name must not be empty")]
    EmptyDomainName,

    #[error("max planning time must be positive, got {0}")]
    InvalidPlanningTime(f64),
}

/// Errors surfaced by a full encode/solve/decode round trip.
#[derive(Debug, Error)]
pub enum PlanningError {
    #[error("planner did not return within {0:?}")]
    Timeout(Duration),

    #[error("planner failed: {0}")]
    Planner(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl PlanningError {
    /// Check if the planner ran out of time
    pub fn is_timeout(&self) -> bool {
        matches!(self, PlanningError::Timeout(_))
    }

    /// Check if retrying with the same inputs could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            PlanningError::Timeout(_) => true,
            PlanningError::Planner(_) => true,
            PlanningError::Decode(_) => false,
        }
    }
}
