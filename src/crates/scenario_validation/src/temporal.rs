//! Temporal quantifiers that lift one check into its four assertion flavours.
//!
//! | constructor          | quantifier | polarity |
//! |----------------------|------------|----------|
//! | [`Temporal::always`]        | always     | as-is    |
//! | [`Temporal::always_not`]    | always     | inverted |
//! | [`Temporal::eventually`]    | eventually | as-is    |
//! | [`Temporal::eventually_not`]| eventually | inverted |
//!
//! `Always` latches the first failing tick; `Eventually` latches the first
//! passing tick. Once latched the wrapped check is no longer queried.

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    Always,
    Eventually,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Affirmative,
    Negated,
}

impl Polarity {
    fn apply(self, status: ValidationStatus) -> ValidationStatus {
        match self {
            Polarity::Affirmative => status,
            Polarity::Negated => status.inverted(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Temporal<V> {
    inner: V,
    quantifier: Quantifier,
    polarity: Polarity,
    latched: Option<ValidationStatus>,
}

impl<V: Validation> Temporal<V> {
    pub fn new(inner: V, quantifier: Quantifier, polarity: Polarity) -> Self {
        Self {
            inner,
            quantifier,
            polarity,
            latched: None,
        }
    }

    pub fn always(inner: V) -> Self {
        Self::new(inner, Quantifier::Always, Polarity::Affirmative)
    }

    pub fn always_not(inner: V) -> Self {
        Self::new(inner, Quantifier::Always, Polarity::Negated)
    }

    pub fn eventually(inner: V) -> Self {
        Self::new(inner, Quantifier::Eventually, Polarity::Affirmative)
    }

    pub fn eventually_not(inner: V) -> Self {
        Self::new(inner, Quantifier::Eventually, Polarity::Negated)
    }

    pub fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn inner(&self) -> &V {
        &self.inner
    }
}

impl<V: Validation> Validation for Temporal<V> {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        if let Some(status) = self.latched {
            return Ok(status);
        }

        let status = self.polarity.apply(self.inner.evaluate(world)?);
        let sticky = match self.quantifier {
            Quantifier::Always => ValidationStatus::Failing,
            Quantifier::Eventually => ValidationStatus::Passing,
        };
        if status == sticky {
            self.latched = Some(status);
        }
        Ok(status)
    }

    fn geometry(&self, world: &World) -> ValidationGeometry {
        self.inner.geometry(world)
    }

    fn describe(&self) -> String {
        let quantifier = match self.quantifier {
            Quantifier::Always => "always",
            Quantifier::Eventually => "eventually",
        };
        match self.polarity {
            Polarity::Affirmative => format!("{quantifier}: {}", self.inner.describe()),
            Polarity::Negated => format!("{quantifier} not: {}", self.inner.describe()),
        }
    }

    fn is_invariant(&self) -> bool {
        self.quantifier == Quantifier::Always
    }

    fn is_settled(&self) -> bool {
        self.latched.is_some()
    }
}
