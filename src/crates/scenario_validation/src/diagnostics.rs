use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::sequence::SetKind;

/// Something worth reporting while a scenario runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DiagnosticEvent {
    RunStarted {
        always_sequences: usize,
        eventually_sequences: usize,
        timeout: Duration,
    },
    SequenceAdvanced {
        set: SetKind,
        sequence: usize,
        position: usize,
        description: String,
        tick: u64,
    },
    InvariantViolated {
        sequence: usize,
        position: usize,
        description: String,
        tick: u64,
        timestamp: f64,
    },
    MilestonesReached {
        tick: u64,
        timestamp: f64,
    },
    TimedOut {
        ticks: u64,
        pending: Vec<String>,
    },
    Aborted {
        ticks: u64,
    },
    EvaluationFailed {
        set: SetKind,
        description: String,
        message: String,
        tick: u64,
    },
}

/// Receives engine diagnostics; handed to the orchestrator at construction.
pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, event: &DiagnosticEvent);
}

/// Forwards diagnostics as structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::RunStarted {
                always_sequences,
                eventually_sequences,
                timeout,
            } => info!(
                always_sequences,
                eventually_sequences,
                timeout_ms = timeout.as_millis() as u64,
                "Scenario started"
            ),
            DiagnosticEvent::SequenceAdvanced {
                set,
                sequence,
                position,
                description,
                tick,
            } => debug!(?set, sequence, position, tick, %description, "Sequence advanced"),
            DiagnosticEvent::InvariantViolated {
                sequence,
                position,
                description,
                tick,
                timestamp,
            } => warn!(sequence, position, tick, timestamp, %description, "Invariant violated"),
            DiagnosticEvent::MilestonesReached { tick, timestamp } => {
                info!(tick, timestamp, "Milestones reached")
            }
            DiagnosticEvent::TimedOut { ticks, pending } => {
                warn!(ticks, ?pending, "Scenario timed out")
            }
            DiagnosticEvent::Aborted { ticks } => info!(ticks, "Scenario aborted"),
            DiagnosticEvent::EvaluationFailed {
                set,
                description,
                message,
                tick,
            } => warn!(?set, tick, %description, %message, "Validation raised an error"),
        }
    }
}

/// Buffers every event for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, event: &DiagnosticEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
