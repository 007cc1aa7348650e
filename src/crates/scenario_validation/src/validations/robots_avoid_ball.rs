use crate::error::EvaluationError;
use crate::geom::Circle;
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::{RobotId, World};

/// Fails on any tick where a non-excluded friendly robot is closer to the
/// ball than the minimum distance.
#[derive(Debug, Clone)]
pub struct RobotsAvoidBall {
    min_distance: f64,
    excluded: Vec<RobotId>,
}

impl RobotsAvoidBall {
    pub fn new(min_distance: f64, excluded: Vec<RobotId>) -> Self {
        Self {
            min_distance,
            excluded,
        }
    }
}

impl Validation for RobotsAvoidBall {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        if !(self.min_distance.is_finite() && self.min_distance >= 0.0) {
            return Err(EvaluationError::new(format!(
                "invalid minimum ball distance {}",
                self.min_distance
            )));
        }
        let ball = world.ball.position;
        let intruder = world
            .friendly_robots
            .iter()
            .filter(|robot| !self.excluded.contains(&robot.id))
            .any(|robot| robot.position.distance(ball) < self.min_distance);
        Ok(if intruder {
            ValidationStatus::Failing
        } else {
            ValidationStatus::Passing
        })
    }

    fn geometry(&self, world: &World) -> ValidationGeometry {
        ValidationGeometry::default()
            .with_circle(Circle::new(world.ball.position, self.min_distance))
    }

    fn describe(&self) -> String {
        format!(
            "Checking that robots stay at least {:.2} m from the ball",
            self.min_distance
        )
    }
}
