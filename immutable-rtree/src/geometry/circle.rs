use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use super::{Rectangle, Shape};

/// A circle geometry. Its MBR is the enclosing square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    /// Creates a new circle.
    ///
    /// # Panics
    ///
    /// Debug builds assert a non-negative radius.
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        debug_assert!(radius >= 0.0, "radius must be non-negative, got {}", radius);
        Self { x, y, radius }
    }
}

impl Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CIRCLE({} {}, {})", self.x, self.y, self.radius)
    }
}

impl Shape for Circle {
    fn mbr(&self) -> Rectangle {
        Rectangle::new(
            self.x - self.radius,
            self.y - self.radius,
            self.x + self.radius,
            self.y + self.radius,
        )
    }

    fn distance(&self, rect: &Rectangle) -> f64 {
        (rect.distance_to_point(self.x, self.y) - self.radius).max(0.0)
    }

    fn intersects(&self, rect: &Rectangle) -> bool {
        rect.distance_to_point(self.x, self.y) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mbr_is_enclosing_square() {
        let circle = Circle::new(1.0, 2.0, 0.5);
        assert_eq!(circle.mbr(), Rectangle::new(0.5, 1.5, 1.5, 2.5));
    }

    #[test]
    fn test_distance_subtracts_radius() {
        let circle = Circle::new(0.0, 0.0, 2.0);
        assert_eq!(circle.distance(&Rectangle::new(3.0, 4.0, 6.0, 6.0)), 3.0);
        // rectangle inside the circle
        assert_eq!(circle.distance(&Rectangle::new(1.0, 1.0, 1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_intersects_uses_true_distance() {
        let circle = Circle::new(0.0, 0.0, 1.0);
        // inside the MBR corner but outside the circle
        assert!(!circle.intersects(&Rectangle::new(0.9, 0.9, 1.0, 1.0)));
        assert!(circle.intersects(&Rectangle::new(0.5, 0.5, 2.0, 2.0)));
    }
}
