//! Concrete checks over world snapshots.
//!
//! Each check reports `Passing`/`Failing` per tick; wrap it with
//! [`Temporal`](crate::temporal::Temporal) to decide how that verdict persists.

mod ball_enters_region;
mod ball_kicked;
mod ball_moves_forward;
mod kicker_double_touch;
mod robot_enters_region;
mod robot_received_ball;
mod robots_avoid_ball;
mod robots_halt;

pub use ball_enters_region::BallEntersRegion;
pub use ball_kicked::{BallKicked, DEFAULT_DIRECTION_TOLERANCE_RAD, DEFAULT_KICK_SPEED_M_PER_S};
pub use ball_moves_forward::{BallAlwaysMovesForward, DEFAULT_BACKWARD_TOLERANCE_M};
pub use kicker_double_touch::{
    kicker_always_not_double_touch, kicker_eventually_double_touch, KickerDoubleTouch,
    DEFAULT_TOUCH_TOLERANCE_M, KICKOFF_DOUBLE_TOUCH_M,
};
pub use robot_enters_region::RobotEntersRegion;
pub use robot_received_ball::RobotReceivedBall;
pub use robots_avoid_ball::RobotsAvoidBall;
pub use robots_halt::{RobotsHalt, DEFAULT_HALT_SPEED_M_PER_S};

use crate::geom::Region;
use crate::validation::ValidationGeometry;

fn region_geometry(regions: &[Region]) -> ValidationGeometry {
    regions
        .iter()
        .fold(ValidationGeometry::default(), |geometry, region| match region {
            Region::Rectangle(rectangle) => geometry.with_polygon(rectangle.to_polygon()),
            Region::Circle(circle) => geometry.with_circle(*circle),
            Region::Polygon(polygon) => geometry.with_polygon(polygon.clone()),
        })
}
