use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::hash::Hash;

use super::Shape;

/// An axis-aligned rectangle, the minimum bounding rectangle (MBR) of every
/// node and entry in the tree.
///
/// `Rectangle` is defined by its lower corner `(x1, y1)` and upper corner
/// `(x2, y2)` with `x1 <= x2` and `y1 <= y2`. It is an immutable value; every
/// combining operation returns a new rectangle.
///
/// # Examples
///
/// ```rust
/// use immutable_rtree::Rectangle;
///
/// let a = Rectangle::new(0.0, 0.0, 2.0, 2.0);
/// let b = Rectangle::new(1.0, 1.0, 3.0, 3.0);
///
/// assert_eq!(a.add(&b), Rectangle::new(0.0, 0.0, 3.0, 3.0));
/// assert_eq!(a.intersection_area(&b), 1.0);
/// ```
#[derive(Clone, Copy, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct Rectangle {
    /// Minimum X coordinate
    pub x1: f64,
    /// Minimum Y coordinate
    pub y1: f64,
    /// Maximum X coordinate
    pub x2: f64,
    /// Maximum Y coordinate
    pub y2: f64,
}

impl Eq for Rectangle {}

impl Hash for Rectangle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x1.to_bits().hash(state);
        self.y1.to_bits().hash(state);
        self.x2.to_bits().hash(state);
        self.y2.to_bits().hash(state);
    }
}

impl Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rectangle({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

impl Rectangle {
    /// Creates a new rectangle from its lower and upper corners.
    ///
    /// # Panics
    ///
    /// Debug builds assert `x1 <= x2` and `y1 <= y2`.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Rectangle {
        debug_assert!(x1 <= x2, "x1 ({}) must not exceed x2 ({})", x1, x2);
        debug_assert!(y1 <= y2, "y1 ({}) must not exceed y2 ({})", y1, y2);
        Rectangle { x1, y1, x2, y2 }
    }

    /// Creates the degenerate rectangle covering a single point.
    pub fn from_point(x: f64, y: f64) -> Rectangle {
        Rectangle {
            x1: x,
            y1: y,
            x2: x,
            y2: y,
        }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Returns the area of the rectangle.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns the perimeter, used as the margin metric of R*-tree splits.
    pub fn margin(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    /// Returns the smallest rectangle enclosing both rectangles.
    pub fn add(&self, other: &Rectangle) -> Rectangle {
        Rectangle {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Checks if this rectangle intersects (or touches) another rectangle.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// Checks if this rectangle fully contains another rectangle.
    pub fn contains(&self, other: &Rectangle) -> bool {
        other.x1 >= self.x1 && other.x2 <= self.x2 && other.y1 >= self.y1 && other.y2 <= self.y2
    }

    /// Checks if this rectangle contains a point, boundary included.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Returns the area shared by both rectangles, 0 if they are disjoint.
    pub fn intersection_area(&self, other: &Rectangle) -> f64 {
        if !self.intersects(other) {
            return 0.0;
        }
        let width = self.x2.min(other.x2) - self.x1.max(other.x1);
        let height = self.y2.min(other.y2) - self.y1.max(other.y1);
        width * height
    }

    /// Returns the minimum Euclidean distance between the two rectangles,
    /// 0 when they intersect.
    pub fn distance(&self, other: &Rectangle) -> f64 {
        let dx = gap(self.x1, self.x2, other.x1, other.x2);
        let dy = gap(self.y1, self.y2, other.y1, other.y2);
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the distance from a point to the nearest point of this
    /// rectangle, 0 when the point lies inside.
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        let closest_x = x.clamp(self.x1, self.x2);
        let closest_y = y.clamp(self.y1, self.y2);
        let dx = x - closest_x;
        let dy = y - closest_y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Length of the gap between two intervals on one axis.
fn gap(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    if a2 < b1 {
        b1 - a2
    } else if b2 < a1 {
        a1 - b2
    } else {
        0.0
    }
}

impl Shape for Rectangle {
    fn mbr(&self) -> Rectangle {
        *self
    }

    fn distance(&self, rect: &Rectangle) -> f64 {
        Rectangle::distance(self, rect)
    }

    fn intersects(&self, rect: &Rectangle) -> bool {
        Rectangle::intersects(self, rect)
    }
}
