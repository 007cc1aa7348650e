use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;
use crate::geom::{Circle, Point, Polygon, Segment};
use crate::world::World;

/// Per-tick verdict of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationStatus {
    Passing,
    Failing,
}

impl ValidationStatus {
    pub fn inverted(self) -> Self {
        match self {
            ValidationStatus::Passing => ValidationStatus::Failing,
            ValidationStatus::Failing => ValidationStatus::Passing,
        }
    }

    pub fn is_passing(self) -> bool {
        self == ValidationStatus::Passing
    }
}

/// Shapes a check wants drawn while it is active. Purely diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationGeometry {
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub circles: Vec<Circle>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub polygons: Vec<Polygon>,
}

impl ValidationGeometry {
    pub fn with_point(mut self, point: Point) -> Self {
        self.points.push(point);
        self
    }

    pub fn with_circle(mut self, circle: Circle) -> Self {
        self.circles.push(circle);
        self
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn with_polygon(mut self, polygon: Polygon) -> Self {
        self.polygons.push(polygon);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.circles.is_empty()
            && self.segments.is_empty()
            && self.polygons.is_empty()
    }
}

/// A stateful predicate over world snapshots.
///
/// `evaluate` is called once per tick, in snapshot order, for as long as the
/// unit is the active position of its sequence. Any memory a unit keeps lives
/// in the instance itself; a fresh run always builds fresh instances.
pub trait Validation: Send {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError>;

    /// Region of interest for external visualisation; must not affect `evaluate`.
    fn geometry(&self, world: &World) -> ValidationGeometry;

    fn describe(&self) -> String;

    /// Invariants stay active after a passing tick instead of advancing their sequence.
    fn is_invariant(&self) -> bool {
        false
    }

    /// Whether the verdict is fixed for the rest of the run.
    fn is_settled(&self) -> bool {
        false
    }
}

impl<V: Validation + ?Sized> Validation for Box<V> {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        (**self).evaluate(world)
    }

    fn geometry(&self, world: &World) -> ValidationGeometry {
        (**self).geometry(world)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }

    fn is_invariant(&self) -> bool {
        (**self).is_invariant()
    }

    fn is_settled(&self) -> bool {
        (**self).is_settled()
    }
}

/// Builds a fresh validation unit for every scenario run.
#[derive(Clone)]
pub struct ValidationFactory {
    build: Arc<dyn Fn() -> Box<dyn Validation> + Send + Sync>,
}

impl ValidationFactory {
    pub fn new<V, F>(build: F) -> Self
    where
        V: Validation + 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        Self {
            build: Arc::new(move || Box::new(build()) as Box<dyn Validation>),
        }
    }

    pub fn build(&self) -> Box<dyn Validation> {
        (self.build)()
    }
}

impl fmt::Debug for ValidationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationFactory").finish_non_exhaustive()
    }
}
