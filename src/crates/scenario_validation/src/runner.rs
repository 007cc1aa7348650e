use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::diagnostics::{DiagnosticEvent, DiagnosticsSink, TracingSink};
use crate::error::ValidationResult;
use crate::export::{GeometryFeed, GeometryFrame, ValidationGeometryEntry};
use crate::sequence::{Advance, SequenceSet, SetKind, SetVerdict, UnitError};
use crate::source::SnapshotSource;
use crate::world::World;

/// Where a run stopped; every variant is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    /// The eventually-set was satisfied with no invariant broken.
    Passed { tick: u64, timestamp: f64 },
    /// An always-set unit reported failing; `sequence` and `position` locate it.
    Failed {
        sequence: usize,
        position: usize,
        description: String,
        tick: u64,
        timestamp: f64,
    },
    /// The deadline passed before the milestones were reached.
    TimedOut { ticks: u64, pending: Vec<String> },
    /// Stopped through an [`AbortHandle`].
    Aborted { ticks: u64 },
    /// A check raised an error instead of producing a verdict.
    EvaluationError {
        set: SetKind,
        description: String,
        message: String,
        tick: u64,
        timestamp: f64,
    },
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, ScenarioOutcome::Passed { .. })
    }
}

/// Final result of [`ScenarioRun::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub outcome: ScenarioOutcome,
    pub ticks: u64,
    pub elapsed: Duration,
    pub last_timestamp: Option<f64>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }
}

/// External cancellation for a running scenario.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// One execution of a scenario: fresh units, fresh cursors, one deadline.
pub struct ScenarioRun {
    always: SequenceSet,
    eventually: SequenceSet,
    timeout: Duration,
    snapshot_wait: Duration,
    started: Instant,
    diagnostics: Arc<dyn DiagnosticsSink>,
    geometry: GeometryFeed,
    abort: AbortHandle,
    ticks: u64,
    last_timestamp: Option<f64>,
    outcome: Option<ScenarioOutcome>,
}

impl ScenarioRun {
    /// Build a run that reports through `tracing`.
    pub fn new(config: &ScenarioConfig) -> Self {
        Self::with_diagnostics(config, Arc::new(TracingSink))
    }

    /// Build a run; the deadline starts now.
    pub fn with_diagnostics(
        config: &ScenarioConfig,
        diagnostics: Arc<dyn DiagnosticsSink>,
    ) -> Self {
        diagnostics.record(&DiagnosticEvent::RunStarted {
            always_sequences: config.always.len(),
            eventually_sequences: config.eventually.len(),
            timeout: config.timeout,
        });

        Self {
            always: SequenceSet::from_factories(SetKind::Always, &config.always),
            eventually: SequenceSet::from_factories(SetKind::Eventually, &config.eventually),
            timeout: config.timeout,
            snapshot_wait: config.snapshot_wait,
            started: Instant::now(),
            diagnostics,
            geometry: GeometryFeed::new(),
            abort: AbortHandle::default(),
            ticks: 0,
            last_timestamp: None,
            outcome: None,
        }
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn geometry_feed(&self) -> GeometryFeed {
        self.geometry.clone()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn outcome(&self) -> Option<&ScenarioOutcome> {
        self.outcome.as_ref()
    }

    pub fn always_set(&self) -> &SequenceSet {
        &self.always
    }

    pub fn eventually_set(&self) -> &SequenceSet {
        &self.eventually
    }

    /// Evaluate one snapshot: always-set first, then the eventually-set.
    ///
    /// Returns the terminal outcome once one is reached; later calls return it
    /// again without evaluating anything.
    pub fn process_snapshot(&mut self, world: &World) -> Option<ScenarioOutcome> {
        if self.outcome.is_some() {
            return self.outcome.clone();
        }

        self.ticks += 1;
        self.last_timestamp = Some(world.timestamp);
        let tick = self.ticks;

        let outcome = self.evaluate_tick(world, tick);
        self.publish_geometry(world, tick);

        if let Some(outcome) = &outcome {
            self.outcome = Some(outcome.clone());
        }
        outcome
    }

    fn evaluate_tick(&mut self, world: &World, tick: u64) -> Option<ScenarioOutcome> {
        let always = match self.always.evaluate(world) {
            Ok(evaluation) => evaluation,
            Err(error) => return Some(self.evaluation_error(SetKind::Always, error, world, tick)),
        };
        self.record_advances(SetKind::Always, &always.advances, tick);

        if let SetVerdict::Violated {
            sequence,
            position,
            description,
        } = always.verdict
        {
            self.diagnostics.record(&DiagnosticEvent::InvariantViolated {
                sequence,
                position,
                description: description.clone(),
                tick,
                timestamp: world.timestamp,
            });
            return Some(ScenarioOutcome::Failed {
                sequence,
                position,
                description,
                tick,
                timestamp: world.timestamp,
            });
        }

        let eventually = match self.eventually.evaluate(world) {
            Ok(evaluation) => evaluation,
            Err(error) => {
                return Some(self.evaluation_error(SetKind::Eventually, error, world, tick))
            }
        };
        self.record_advances(SetKind::Eventually, &eventually.advances, tick);

        if eventually.verdict == SetVerdict::Satisfied {
            self.diagnostics.record(&DiagnosticEvent::MilestonesReached {
                tick,
                timestamp: world.timestamp,
            });
            return Some(ScenarioOutcome::Passed {
                tick,
                timestamp: world.timestamp,
            });
        }

        None
    }

    fn record_advances(&self, set: SetKind, advances: &[Advance], tick: u64) {
        for advance in advances {
            self.diagnostics.record(&DiagnosticEvent::SequenceAdvanced {
                set,
                sequence: advance.sequence,
                position: advance.position,
                description: advance.description.clone(),
                tick,
            });
        }
    }

    fn evaluation_error(
        &self,
        set: SetKind,
        error: UnitError,
        world: &World,
        tick: u64,
    ) -> ScenarioOutcome {
        self.diagnostics.record(&DiagnosticEvent::EvaluationFailed {
            set,
            description: error.description.clone(),
            message: error.error.message.clone(),
            tick,
        });
        ScenarioOutcome::EvaluationError {
            set,
            description: error.description,
            message: error.error.message,
            tick,
            timestamp: world.timestamp,
        }
    }

    fn publish_geometry(&self, world: &World, tick: u64) {
        let entries = |set: &SequenceSet| -> Vec<ValidationGeometryEntry> {
            set.active_geometry(world)
                .into_iter()
                .map(|(description, geometry)| ValidationGeometryEntry {
                    description,
                    geometry,
                })
                .collect()
        };
        self.geometry.publish(GeometryFrame {
            tick,
            timestamp: world.timestamp,
            always: entries(&self.always),
            eventually: entries(&self.eventually),
        });
    }

    fn time_out(&self) -> ScenarioOutcome {
        let pending = self.eventually.pending_descriptions();
        self.diagnostics.record(&DiagnosticEvent::TimedOut {
            ticks: self.ticks,
            pending: pending.clone(),
        });
        ScenarioOutcome::TimedOut {
            ticks: self.ticks,
            pending,
        }
    }

    /// Pull snapshots until a terminal outcome, the deadline, or an abort.
    ///
    /// Only a source that can never deliver again is an `Err`.
    pub fn run(mut self, source: &mut dyn SnapshotSource) -> ValidationResult<ScenarioReport> {
        let outcome = loop {
            if let Some(outcome) = &self.outcome {
                break outcome.clone();
            }
            if self.abort.is_aborted() {
                self.diagnostics
                    .record(&DiagnosticEvent::Aborted { ticks: self.ticks });
                break ScenarioOutcome::Aborted { ticks: self.ticks };
            }

            let elapsed = self.started.elapsed();
            if elapsed >= self.timeout {
                break self.time_out();
            }
            let wait = self.snapshot_wait.min(self.timeout - elapsed);

            if let Some(world) = source.next_snapshot(wait)? {
                // A snapshot landing after the deadline does not count.
                if self.started.elapsed() >= self.timeout {
                    break self.time_out();
                }
                if let Some(outcome) = self.process_snapshot(&world) {
                    break outcome;
                }
            }
        };

        Ok(ScenarioReport {
            outcome,
            ticks: self.ticks,
            elapsed: self.started.elapsed(),
            last_timestamp: self.last_timestamp,
        })
    }
}
