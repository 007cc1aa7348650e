use crate::error::EvaluationError;
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::World;

/// Speed below which a robot counts as stopped.
pub const DEFAULT_HALT_SPEED_M_PER_S: f64 = 0.05;

/// Passes on ticks where every friendly robot is stopped.
#[derive(Debug, Clone)]
pub struct RobotsHalt {
    max_speed: f64,
}

impl RobotsHalt {
    pub fn new(max_speed: f64) -> Self {
        Self { max_speed }
    }
}

impl Default for RobotsHalt {
    fn default() -> Self {
        Self::new(DEFAULT_HALT_SPEED_M_PER_S)
    }
}

impl Validation for RobotsHalt {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        let halted = world
            .friendly_robots
            .iter()
            .all(|robot| robot.velocity.length() < self.max_speed);
        Ok(if halted {
            ValidationStatus::Passing
        } else {
            ValidationStatus::Failing
        })
    }

    fn geometry(&self, world: &World) -> ValidationGeometry {
        world
            .friendly_robots
            .iter()
            .filter(|robot| robot.velocity.length() >= self.max_speed)
            .fold(ValidationGeometry::default(), |geometry, robot| {
                geometry.with_point(robot.position)
            })
    }

    fn describe(&self) -> String {
        "Checking that all friendly robots have halted".to_string()
    }
}
