#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use scenario_validation::geom::{Point, Vector};
use scenario_validation::world::{BallState, RobotState, World};
use scenario_validation::{EvaluationError, Validation, ValidationGeometry, ValidationStatus};

use ValidationStatus::{Failing, Passing};

/// Check that replays a fixed list of verdicts, then repeats the last one.
#[derive(Debug, Clone)]
pub struct Scripted {
    name: String,
    script: VecDeque<ValidationStatus>,
    last: ValidationStatus,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    pub fn new(name: &str, script: &[ValidationStatus]) -> Self {
        Self {
            name: name.to_string(),
            script: script.iter().copied().collect(),
            last: Failing,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn passing(name: &str) -> Self {
        Self::new(name, &[Passing])
    }

    pub fn failing(name: &str) -> Self {
        Self::new(name, &[Failing])
    }

    /// Share a call counter so tests can see how often the check was evaluated.
    pub fn counting(mut self, calls: Arc<AtomicUsize>) -> Self {
        self.calls = calls;
        self
    }
}

impl Validation for Scripted {
    fn evaluate(&mut self, _world: &World) -> Result<ValidationStatus, EvaluationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.script.pop_front() {
            self.last = status;
        }
        Ok(self.last)
    }

    fn geometry(&self, _world: &World) -> ValidationGeometry {
        ValidationGeometry::default().with_point(Point::new(0.0, 0.0))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Check whose evaluation always errors.
#[derive(Debug, Clone, Default)]
pub struct Broken;

impl Validation for Broken {
    fn evaluate(&mut self, _world: &World) -> Result<ValidationStatus, EvaluationError> {
        Err(EvaluationError::new("ball state unavailable"))
    }

    fn geometry(&self, _world: &World) -> ValidationGeometry {
        ValidationGeometry::default()
    }

    fn describe(&self) -> String {
        "broken check".to_string()
    }
}

/// Check that panics when evaluated.
#[derive(Debug, Clone, Default)]
pub struct Panicking;

impl Validation for Panicking {
    fn evaluate(&mut self, _world: &World) -> Result<ValidationStatus, EvaluationError> {
        panic!("index out of range");
    }

    fn geometry(&self, _world: &World) -> ValidationGeometry {
        ValidationGeometry::default()
    }

    fn describe(&self) -> String {
        "panicking check".to_string()
    }
}

pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Empty world with a stationary ball at `ball`.
pub fn world_at(timestamp: f64, ball: Point) -> World {
    World::new(timestamp, BallState::new(ball, Vector::default()))
}

/// Robot facing +x with its dribbler against a ball at `ball`.
pub fn robot_behind(id: u32, ball: Point) -> RobotState {
    RobotState::stationary(id, Point::new(ball.x - 0.1, ball.y), 0.0)
}

/// Robot well away from `ball`.
pub fn robot_far_from(id: u32, ball: Point) -> RobotState {
    RobotState::stationary(id, Point::new(ball.x - 2.0, ball.y + 2.0), 0.0)
}

/// World at tick `tick` (10 ms ticks) with the given robots and ball.
pub fn tick_world(tick: u64, ball: Point, robots: &[RobotState]) -> World {
    robots
        .iter()
        .fold(world_at(tick as f64 * 0.01, ball), |world, robot| {
            world.with_friendly_robot(*robot)
        })
}
