use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for engine operations that touch the outside world.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised by snapshot sources and the simulator process, never by a check verdict.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("failed to spawn simulator: {0}")]
    SimulatorStart(String),
    #[error("simulator terminated early with status {0}")]
    SimulatorExited(ExitStatus),
    #[error("simulator did not report readiness within {0:?}")]
    StartupTimeout(Duration),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("snapshot source closed")]
    SourceClosed,
}

impl ValidationError {
    pub(crate) fn simulator_start(err: impl Into<String>) -> Self {
        ValidationError::SimulatorStart(err.into())
    }
}

/// Raised by a validation unit whose own logic broke while checking a snapshot.
///
/// Kept apart from a `Failing` verdict so a broken check is never reported as
/// misbehaviour of the system under test.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct EvaluationError {
    pub message: String,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
