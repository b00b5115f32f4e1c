//! Transport-neutral error classification.

use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Abstract failure categories shared by all core operations.
///
/// Transports map these onto their own status signaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Referenced person or task does not exist.
    NotFound,
    /// A single-assignment field is already set, or a uniqueness rule is violated.
    Conflict,
    /// The task was never started.
    PreconditionFailed,
    /// Malformed caller input.
    Validation,
    /// Persistence failure.
    Storage,
    /// External collaborator failure.
    Upstream,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::PreconditionFailed => "precondition_failed",
            Self::Validation => "validation",
            Self::Storage => "storage",
            Self::Upstream => "upstream",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
