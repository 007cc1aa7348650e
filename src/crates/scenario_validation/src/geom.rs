//! Planar geometry shared by world snapshots, checks, and exported validation geometry.

use std::f64::consts::PI;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A position on the field, in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (*self - other).length()
    }
}

/// A displacement or velocity, in metres (per second).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `radians`.
    pub fn from_angle(radians: f64) -> Self {
        Self::new(radians.cos(), radians.sin())
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Direction in radians, in `(-PI, PI]`.
    pub fn orientation(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Smallest absolute difference between two angles, in `[0, PI]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(2.0 * PI);
    diff.min(2.0 * PI - diff)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub origin: Point,
    pub radius: f64,
}

impl Circle {
    pub const fn new(origin: Point, radius: f64) -> Self {
        Self { origin, radius }
    }

    pub fn contains(&self, point: Point) -> bool {
        self.origin.distance(point) <= self.radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }
}

/// Axis-aligned rectangle spanned by two opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub min: Point,
    pub max: Point,
}

impl Rectangle {
    /// Build from any two opposite corners.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn centre(&self) -> Point {
        Point::new((self.min.x + self.max.x) / 2.0, (self.min.y + self.max.y) / 2.0)
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(vec![
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Even-odd ray cast; points on an edge may land on either side.
    pub fn contains(&self, point: Point) -> bool {
        let count = self.points.len();
        if count < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = count - 1;
        for i in 0..count {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// Area of the field a check cares about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Region {
    Rectangle(Rectangle),
    Circle(Circle),
    Polygon(Polygon),
}

impl Region {
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Region::Rectangle(rectangle) => rectangle.contains(point),
            Region::Circle(circle) => circle.contains(point),
            Region::Polygon(polygon) => polygon.contains(point),
        }
    }
}

impl From<Rectangle> for Region {
    fn from(value: Rectangle) -> Self {
        Region::Rectangle(value)
    }
}

impl From<Circle> for Region {
    fn from(value: Circle) -> Self {
        Region::Circle(value)
    }
}

impl From<Polygon> for Region {
    fn from(value: Polygon) -> Self {
        Region::Polygon(value)
    }
}
