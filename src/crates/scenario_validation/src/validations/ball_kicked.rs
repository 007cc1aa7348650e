use crate::error::EvaluationError;
use crate::geom::{angle_difference, Segment, Vector};
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::World;

/// Ball speed above which the ball counts as kicked.
pub const DEFAULT_KICK_SPEED_M_PER_S: f64 = 0.5;

/// How far a kick may stray from the requested direction.
pub const DEFAULT_DIRECTION_TOLERANCE_RAD: f64 = 0.35;

/// Passes on any tick where the ball moves at kick speed, optionally along a heading.
#[derive(Debug, Clone)]
pub struct BallKicked {
    min_speed: f64,
    direction: Option<f64>,
    direction_tolerance: f64,
}

impl BallKicked {
    pub fn new() -> Self {
        Self {
            min_speed: DEFAULT_KICK_SPEED_M_PER_S,
            direction: None,
            direction_tolerance: DEFAULT_DIRECTION_TOLERANCE_RAD,
        }
    }

    /// Require the ball to travel along `radians`, within `tolerance`.
    pub fn in_direction(mut self, radians: f64, tolerance: f64) -> Self {
        self.direction = Some(radians);
        self.direction_tolerance = tolerance;
        self
    }

    pub fn with_min_speed(mut self, speed: f64) -> Self {
        self.min_speed = speed;
        self
    }
}

impl Default for BallKicked {
    fn default() -> Self {
        Self::new()
    }
}

impl Validation for BallKicked {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        let velocity = world.ball.velocity;
        if !velocity.length().is_finite() {
            return Err(EvaluationError::new("ball velocity is not finite"));
        }
        if velocity.length() < self.min_speed {
            return Ok(ValidationStatus::Failing);
        }
        let on_heading = self.direction.map_or(true, |direction| {
            angle_difference(velocity.orientation(), direction) <= self.direction_tolerance
        });
        Ok(if on_heading {
            ValidationStatus::Passing
        } else {
            ValidationStatus::Failing
        })
    }

    fn geometry(&self, world: &World) -> ValidationGeometry {
        let ball = world.ball.position;
        let geometry = ValidationGeometry::default().with_point(ball);
        match self.direction {
            Some(direction) => {
                geometry.with_segment(Segment::new(ball, ball + Vector::from_angle(direction)))
            }
            None => geometry,
        }
    }

    fn describe(&self) -> String {
        match self.direction {
            Some(direction) => {
                format!("Checking that the ball is kicked towards {direction:.2} rad")
            }
            None => "Checking that the ball is kicked".to_string(),
        }
    }
}
