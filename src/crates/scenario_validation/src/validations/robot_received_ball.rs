use crate::error::EvaluationError;
use crate::geom::Circle;
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::{RobotId, World, DIST_TO_FRONT_OF_ROBOT_METERS};

use super::kicker_double_touch::DEFAULT_TOUCH_TOLERANCE_M;

/// Passes once the given friendly robot has the ball at its dribbler.
#[derive(Debug, Clone)]
pub struct RobotReceivedBall {
    robot: RobotId,
    tolerance: f64,
}

impl RobotReceivedBall {
    pub fn new(robot: RobotId) -> Self {
        Self {
            robot,
            tolerance: DEFAULT_TOUCH_TOLERANCE_M,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

impl Validation for RobotReceivedBall {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        let received = world
            .friendly_robot(self.robot)
            .is_some_and(|robot| robot.is_near_dribbler(world.ball.position, self.tolerance));
        Ok(if received {
            ValidationStatus::Passing
        } else {
            ValidationStatus::Failing
        })
    }

    fn geometry(&self, world: &World) -> ValidationGeometry {
        match world.friendly_robot(self.robot) {
            Some(robot) => ValidationGeometry::default().with_circle(Circle::new(
                robot.position,
                DIST_TO_FRONT_OF_ROBOT_METERS + self.tolerance,
            )),
            None => ValidationGeometry::default(),
        }
    }

    fn describe(&self) -> String {
        format!("Checking that robot {} receives the ball", self.robot)
    }
}
