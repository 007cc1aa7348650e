//! Cursored milestone chains and the two ways of combining them.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;
use crate::validation::{Validation, ValidationFactory, ValidationGeometry, ValidationStatus};
use crate::world::World;

/// Which combination rule a [`SequenceSet`] applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetKind {
    /// Every sequence must hold (AND).
    Always,
    /// Any one sequence completing is enough (OR).
    Eventually,
}

/// A unit that raised an error instead of producing a verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitError {
    pub sequence: usize,
    pub position: usize,
    pub description: String,
    pub error: EvaluationError,
}

/// Result of stepping a single sequence for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceStep {
    /// Nothing left to evaluate.
    Complete,
    /// The active unit was evaluated; `advanced` is set if the cursor moved past it.
    Evaluated {
        position: usize,
        status: ValidationStatus,
        advanced: bool,
    },
}

/// Ordered units, of which only the one under the cursor is evaluated.
pub struct Sequence {
    units: Vec<Box<dyn Validation>>,
    cursor: usize,
}

impl Sequence {
    pub fn new(units: Vec<Box<dyn Validation>>) -> Self {
        Self { units, cursor: 0 }
    }

    pub fn from_factories(factories: &[ValidationFactory]) -> Self {
        Self::new(factories.iter().map(ValidationFactory::build).collect())
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// An empty sequence is complete before any tick.
    pub fn is_complete(&self) -> bool {
        self.cursor >= self.units.len()
    }

    pub fn active(&self) -> Option<&dyn Validation> {
        self.units.get(self.cursor).map(|unit| &**unit)
    }

    /// Evaluate the active unit and move past it if its pass settles it.
    ///
    /// The unit that becomes active is not evaluated until the next tick.
    pub fn step(&mut self, world: &World) -> Result<SequenceStep, EvaluationError> {
        let position = self.cursor;
        let Some(unit) = self.units.get_mut(position) else {
            return Ok(SequenceStep::Complete);
        };

        let status = panic::catch_unwind(AssertUnwindSafe(|| unit.evaluate(world)))
            .map_err(|payload| EvaluationError::new(panic_message(payload.as_ref())))??;

        let advanced = status.is_passing() && !unit.is_invariant();
        if advanced {
            self.cursor += 1;
        }
        Ok(SequenceStep::Evaluated {
            position,
            status,
            advanced,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("validation panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("validation panicked: {message}")
    } else {
        "validation panicked".to_string()
    }
}

/// Combined verdict of a set after a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetVerdict {
    Satisfied,
    Pending,
    Violated {
        sequence: usize,
        position: usize,
        description: String,
    },
}

/// Cursor movement observed during the last evaluation, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub sequence: usize,
    pub position: usize,
    pub description: String,
}

/// Outcome of evaluating every sequence in a set for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SetEvaluation {
    pub verdict: SetVerdict,
    pub advances: Vec<Advance>,
}

pub struct SequenceSet {
    kind: SetKind,
    sequences: Vec<Sequence>,
    violation: Option<SetVerdict>,
}

impl SequenceSet {
    pub fn new(kind: SetKind, sequences: Vec<Sequence>) -> Self {
        Self {
            kind,
            sequences,
            violation: None,
        }
    }

    pub fn from_factories(kind: SetKind, factories: &[Vec<ValidationFactory>]) -> Self {
        Self::new(
            kind,
            factories
                .iter()
                .map(|sequence| Sequence::from_factories(sequence))
                .collect(),
        )
    }

    pub fn kind(&self) -> SetKind {
        self.kind
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    /// Current combined verdict without evaluating anything.
    pub fn verdict(&self) -> SetVerdict {
        if let Some(violation) = &self.violation {
            return violation.clone();
        }
        match self.kind {
            SetKind::Always => SetVerdict::Satisfied,
            SetKind::Eventually => {
                if self.sequences.is_empty() || self.sequences.iter().any(Sequence::is_complete) {
                    SetVerdict::Satisfied
                } else {
                    SetVerdict::Pending
                }
            }
        }
    }

    /// Step every sequence once, then combine.
    ///
    /// All sequences are stepped even after one has decided the set, so
    /// diagnostics and geometry stay current. The first unit error is returned
    /// after the whole set has been stepped.
    pub fn evaluate(&mut self, world: &World) -> Result<SetEvaluation, UnitError> {
        let mut advances = Vec::new();
        let mut first_error = None;

        for (index, sequence) in self.sequences.iter_mut().enumerate() {
            let description = sequence.active().map(|unit| unit.describe());
            match sequence.step(world) {
                Ok(SequenceStep::Complete) => {}
                Ok(SequenceStep::Evaluated {
                    position,
                    status,
                    advanced,
                }) => {
                    let description = description.unwrap_or_default();
                    if advanced {
                        advances.push(Advance {
                            sequence: index,
                            position,
                            description: description.clone(),
                        });
                    }
                    if self.kind == SetKind::Always
                        && status == ValidationStatus::Failing
                        && self.violation.is_none()
                    {
                        self.violation = Some(SetVerdict::Violated {
                            sequence: index,
                            position,
                            description,
                        });
                    }
                }
                Err(error) => {
                    if first_error.is_none() {
                        first_error = Some(UnitError {
                            sequence: index,
                            position: sequence.cursor(),
                            description: description.unwrap_or_default(),
                            error,
                        });
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(SetEvaluation {
                verdict: self.verdict(),
                advances,
            }),
        }
    }

    /// Descriptions of the units each incomplete sequence is waiting on.
    pub fn pending_descriptions(&self) -> Vec<String> {
        self.sequences
            .iter()
            .filter_map(|sequence| sequence.active().map(|unit| unit.describe()))
            .collect()
    }

    /// Geometry of every active, unsettled unit.
    pub fn active_geometry(&self, world: &World) -> Vec<(String, ValidationGeometry)> {
        self.sequences
            .iter()
            .filter_map(Sequence::active)
            .filter(|unit| !unit.is_settled())
            .map(|unit| (unit.describe(), unit.geometry(world)))
            .collect()
    }
}
