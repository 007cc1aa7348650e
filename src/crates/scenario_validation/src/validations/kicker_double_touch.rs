use crate::error::EvaluationError;
use crate::geom::{Circle, Point};
use crate::temporal::Temporal;
use crate::validation::{Validation, ValidationGeometry, ValidationStatus};
use crate::world::{RobotId, World};

/// Ball travel beyond which a second touch by the kicker counts as a double touch.
pub const KICKOFF_DOUBLE_TOUCH_M: f64 = 0.05;

/// Default distance from the dribbler at which a robot is considered touching the ball.
pub const DEFAULT_TOUCH_TOLERANCE_M: f64 = 0.1;

const KICKER_HIGHLIGHT_RADIUS_M: f64 = 0.5;

/// Fails when the robot that first touched the ball touches it again, after
/// the ball has travelled, before any other friendly robot has touched it.
///
/// Once a different robot has touched the ball the check is latched passing.
#[derive(Debug, Clone)]
pub struct KickerDoubleTouch {
    tolerance: f64,
    kick_position: Option<Point>,
    kicker: Option<RobotId>,
    other_robot: Option<RobotId>,
}

impl KickerDoubleTouch {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            kick_position: None,
            kicker: None,
            other_robot: None,
        }
    }

    pub fn kicker(&self) -> Option<RobotId> {
        self.kicker
    }

    pub fn other_robot(&self) -> Option<RobotId> {
        self.other_robot
    }
}

impl Default for KickerDoubleTouch {
    fn default() -> Self {
        Self::new(DEFAULT_TOUCH_TOLERANCE_M)
    }
}

impl Validation for KickerDoubleTouch {
    fn evaluate(&mut self, world: &World) -> Result<ValidationStatus, EvaluationError> {
        let ball = world.ball.position;
        let kick_position = *self.kick_position.get_or_insert(ball);

        if self.other_robot.is_some() {
            return Ok(ValidationStatus::Passing);
        }

        let Some(toucher) = world
            .friendly_robots
            .iter()
            .find(|robot| robot.is_near_dribbler(ball, self.tolerance))
        else {
            return Ok(ValidationStatus::Passing);
        };

        match self.kicker {
            None => self.kicker = Some(toucher.id),
            Some(kicker) if kicker == toucher.id => {
                if ball.distance(kick_position) > KICKOFF_DOUBLE_TOUCH_M {
                    return Ok(ValidationStatus::Failing);
                }
            }
            Some(_) => self.other_robot = Some(toucher.id),
        }
        Ok(ValidationStatus::Passing)
    }

    fn geometry(&self, world: &World) -> ValidationGeometry {
        let ball = world.ball.position;
        let kicker = self
            .kicker
            .and_then(|id| world.friendly_robot(id))
            .or_else(|| {
                world.friendly_robots.iter().min_by(|a, b| {
                    a.position
                        .distance(ball)
                        .total_cmp(&b.position.distance(ball))
                })
            })
            .map_or(ball, |robot| robot.position);

        ValidationGeometry::default().with_circle(Circle::new(kicker, KICKER_HIGHLIGHT_RADIUS_M))
    }

    fn describe(&self) -> String {
        "Checking that the robot kicking the ball is not touching the ball consecutively"
            .to_string()
    }
}

/// The kicker never touches the ball twice in a row.
pub fn kicker_always_not_double_touch() -> Temporal<KickerDoubleTouch> {
    Temporal::always(KickerDoubleTouch::default())
}

/// At some point the kicker touches the ball twice in a row.
pub fn kicker_eventually_double_touch() -> Temporal<KickerDoubleTouch> {
    Temporal::eventually_not(KickerDoubleTouch::default())
}
