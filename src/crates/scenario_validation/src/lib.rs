//! Temporal validation for closed-loop simulated robot soccer scenarios.
//!
//! A scenario pairs a set of invariants ("always") with alternative milestone
//! chains ("eventually") and a wall-clock timeout. Each snapshot from the
//! simulator is checked against the invariants first, then the milestones,
//! until the run passes, fails, times out, or is aborted.
//!
//! Typical usage:
//! ```no_run
//! use std::time::Duration;
//!
//! use scenario_validation::validations::{kicker_always_not_double_touch, BallKicked};
//! use scenario_validation::{
//!     ChannelSource, ScenarioConfig, ScenarioRun, Temporal, ValidationFactory,
//! };
//!
//! let config = ScenarioConfig::default()
//!     .with_always_sequence(vec![ValidationFactory::new(kicker_always_not_double_touch)])
//!     .with_eventually_sequence(vec![ValidationFactory::new(|| {
//!         Temporal::eventually(BallKicked::new())
//!     })])
//!     .with_timeout(Duration::from_secs(10));
//!
//! let (_tx, mut source) = ChannelSource::channel();
//! let report = ScenarioRun::new(&config).run(&mut source).expect("source should stay open");
//! println!("{:?}", report.outcome);
//! ```

mod config;
mod diagnostics;
mod error;
mod export;
pub mod geom;
mod runner;
mod sequence;
mod simulator;
mod source;
mod temporal;
mod validation;
pub mod validations;
pub mod world;

pub use config::{ScenarioConfig, SequenceSpec, SimulatorConfig};
pub use diagnostics::{DiagnosticEvent, DiagnosticsSink, MemorySink, TracingSink};
pub use error::{EvaluationError, ValidationError, ValidationResult};
pub use export::{GeometryFeed, GeometryFrame, ValidationGeometryEntry, SUBSCRIBER_BACKLOG};
pub use runner::{AbortHandle, ScenarioOutcome, ScenarioReport, ScenarioRun};
pub use sequence::{
    Advance, Sequence, SequenceSet, SequenceStep, SetEvaluation, SetKind, SetVerdict, UnitError,
};
pub use simulator::{LogLine, LogStream, SimulatorProcess};
pub use source::{
    ChannelControl, ChannelSource, ControlMessage, RefereeCommand, ReplaySource,
    SimulatorControl, SnapshotSource, Team,
};
pub use temporal::{Polarity, Quantifier, Temporal};
pub use validation::{Validation, ValidationFactory, ValidationGeometry, ValidationStatus};
pub use world::World;
