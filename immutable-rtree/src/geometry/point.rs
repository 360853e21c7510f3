use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::{Rectangle, Shape};

/// A 2D point geometry. Its MBR is the degenerate rectangle `(x, y, x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point at the given coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POINT({} {})", self.x, self.y)
    }
}

impl Shape for Point {
    fn mbr(&self) -> Rectangle {
        Rectangle::from_point(self.x, self.y)
    }

    fn distance(&self, rect: &Rectangle) -> f64 {
        rect.distance_to_point(self.x, self.y)
    }

    fn intersects(&self, rect: &Rectangle) -> bool {
        rect.contains_point(self.x, self.y)
    }
}
