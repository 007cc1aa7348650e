//! Read-only world snapshots emitted by the simulator once per tick.

use serde::{Deserialize, Serialize};

use crate::geom::{angle_difference, Circle, Point, Rectangle, Vector};

/// Distance from a robot's centre to the face of its dribbler.
pub const DIST_TO_FRONT_OF_ROBOT_METERS: f64 = 0.078;
pub const BALL_MAX_RADIUS_METERS: f64 = 0.0215;
pub const ROBOT_MAX_RADIUS_METERS: f64 = 0.09;

/// Half-angle of the cone in front of the dribbler that counts as touching.
const DRIBBLER_CONE_HALF_ANGLE: f64 = std::f64::consts::FRAC_PI_4;

pub type RobotId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub id: RobotId,
    pub position: Point,
    /// Heading in radians, counter-clockwise from +x.
    pub orientation: f64,
    #[serde(default)]
    pub velocity: Vector,
}

impl RobotState {
    pub fn stationary(id: RobotId, position: Point, orientation: f64) -> Self {
        Self {
            id,
            position,
            orientation,
            velocity: Vector::default(),
        }
    }

    /// Whether `point` sits at this robot's dribbler, allowing `tolerance` metres of slack.
    pub fn is_near_dribbler(&self, point: Point, tolerance: f64) -> bool {
        let threshold = DIST_TO_FRONT_OF_ROBOT_METERS + BALL_MAX_RADIUS_METERS + tolerance;
        let to_point = point - self.position;
        if to_point.length() > threshold {
            return false;
        }
        angle_difference(self.orientation, to_point.orientation()) < DRIBBLER_CONE_HALF_ANGLE
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub position: Point,
    #[serde(default)]
    pub velocity: Vector,
}

impl BallState {
    pub const fn new(position: Point, velocity: Vector) -> Self {
        Self { position, velocity }
    }
}

/// Field dimensions; friendly side is negative x, enemy goal sits at positive x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub x_length: f64,
    pub y_length: f64,
    pub center_circle_radius: f64,
    pub goal_y_length: f64,
    pub goal_x_length: f64,
    pub defense_x_length: f64,
    pub defense_y_length: f64,
}

impl Field {
    pub const fn division_b() -> Self {
        Self {
            x_length: 9.0,
            y_length: 6.0,
            center_circle_radius: 0.5,
            goal_y_length: 1.0,
            goal_x_length: 0.18,
            defense_x_length: 1.0,
            defense_y_length: 2.0,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(0.0, 0.0)
    }

    pub fn center_circle(&self) -> Circle {
        Circle::new(self.center(), self.center_circle_radius)
    }

    pub fn friendly_half(&self) -> Rectangle {
        Rectangle::new(
            Point::new(-self.x_length / 2.0, -self.y_length / 2.0),
            Point::new(0.0, self.y_length / 2.0),
        )
    }

    pub fn enemy_half(&self) -> Rectangle {
        Rectangle::new(
            Point::new(0.0, -self.y_length / 2.0),
            Point::new(self.x_length / 2.0, self.y_length / 2.0),
        )
    }

    pub fn enemy_goal_center(&self) -> Point {
        Point::new(self.x_length / 2.0, 0.0)
    }

    /// The net behind the enemy goal line.
    pub fn enemy_goal(&self) -> Rectangle {
        let line = self.x_length / 2.0;
        Rectangle::new(
            Point::new(line, -self.goal_y_length / 2.0),
            Point::new(line + self.goal_x_length, self.goal_y_length / 2.0),
        )
    }

    pub fn enemy_defense_area(&self) -> Rectangle {
        let line = self.x_length / 2.0;
        Rectangle::new(
            Point::new(line - self.defense_x_length, -self.defense_y_length / 2.0),
            Point::new(line, self.defense_y_length / 2.0),
        )
    }

    pub fn friendly_defense_area(&self) -> Rectangle {
        let line = -self.x_length / 2.0;
        Rectangle::new(
            Point::new(line, -self.defense_y_length / 2.0),
            Point::new(line + self.defense_x_length, self.defense_y_length / 2.0),
        )
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::division_b()
    }
}

/// One immutable observation of the simulated world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Simulation time in seconds.
    pub timestamp: f64,
    #[serde(default)]
    pub friendly_robots: Vec<RobotState>,
    #[serde(default)]
    pub enemy_robots: Vec<RobotState>,
    pub ball: BallState,
    #[serde(default)]
    pub field: Field,
}

impl World {
    pub fn new(timestamp: f64, ball: BallState) -> Self {
        Self {
            timestamp,
            friendly_robots: Vec::new(),
            enemy_robots: Vec::new(),
            ball,
            field: Field::default(),
        }
    }

    pub fn with_friendly_robot(mut self, robot: RobotState) -> Self {
        self.friendly_robots.push(robot);
        self
    }

    pub fn with_enemy_robot(mut self, robot: RobotState) -> Self {
        self.enemy_robots.push(robot);
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.field = field;
        self
    }

    pub fn friendly_robot(&self, id: RobotId) -> Option<&RobotState> {
        self.friendly_robots.iter().find(|robot| robot.id == id)
    }
}
