use crate::error::EvaluationError;
use crate::geom::{Point, Segment};
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::World;

/// Backwards travel tolerated between ticks, to absorb tracking noise.
pub const DEFAULT_BACKWARD_TOLERANCE_M: f64 = 0.01;

/// Fails on any tick where the ball's x position falls more than the
/// tolerance behind the furthest-forward x it has reached, until the ball is
/// scored. Scoring latches the check passing.
#[derive(Debug, Clone)]
pub struct BallAlwaysMovesForward {
    tolerance: f64,
    furthest: Option<Point>,
    scored: bool,
}

impl BallAlwaysMovesForward {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            furthest: None,
            scored: false,
        }
    }
}

impl Default for BallAlwaysMovesForward {
    fn default() -> Self {
        Self::new(DEFAULT_BACKWARD_TOLERANCE_M)
    }
}

impl Validation for BallAlwaysMovesForward {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        if self.scored {
            return Ok(ValidationStatus::Passing);
        }
        let ball = world.ball.position;
        if world.field.enemy_goal().contains(ball) {
            self.scored = true;
            return Ok(ValidationStatus::Passing);
        }

        let furthest = match self.furthest {
            Some(furthest) if furthest.x >= ball.x => furthest,
            _ => {
                self.furthest = Some(ball);
                ball
            }
        };
        Ok(if ball.x < furthest.x - self.tolerance {
            ValidationStatus::Failing
        } else {
            ValidationStatus::Passing
        })
    }

    fn geometry(&self, world: &World) -> ValidationGeometry {
        let ball = world.ball.position;
        let geometry = ValidationGeometry::default().with_point(ball);
        match self.furthest {
            Some(furthest) => geometry.with_segment(Segment::new(furthest, ball)),
            None => geometry,
        }
    }

    fn describe(&self) -> String {
        "Checking that the ball always moves forward until it is scored".to_string()
    }
}
