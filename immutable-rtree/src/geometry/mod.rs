//! Geometry types stored in and queried against the tree.
//!
//! Every geometry exposes the capability set the tree algorithms consume
//! through the [`Shape`] trait: its minimum bounding rectangle, its distance
//! to a rectangle and whether it intersects a rectangle. The built-in
//! variants are collected in the [`Geometry`] enum; callers may store their
//! own `Shape` types instead.

mod circle;
mod point;
mod rectangle;

pub use circle::Circle;
pub use point::Point;
pub use rectangle::Rectangle;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Capability set of anything that can be indexed or used as a query.
///
/// The trait is object safe so search predicates can receive node MBRs and
/// entry geometries through the same `&dyn Shape` parameter.
pub trait Shape {
    /// Minimum bounding rectangle.
    fn mbr(&self) -> Rectangle;

    /// Minimum distance from this shape to `rect`, 0 when they intersect.
    fn distance(&self, rect: &Rectangle) -> f64;

    /// Whether this shape intersects `rect`.
    fn intersects(&self, rect: &Rectangle) -> bool;
}

/// Anything that occupies a bounding rectangle in the tree: entries, nodes
/// and plain rectangles. Selectors and splitters work on this trait only.
pub trait HasMbr {
    fn mbr(&self) -> Rectangle;
}

impl HasMbr for Rectangle {
    fn mbr(&self) -> Rectangle {
        *self
    }
}

/// The built-in geometry variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Rectangle(Rectangle),
    Point(Point),
    Circle(Circle),
}

impl Geometry {
    /// Creates a rectangle geometry.
    pub fn rectangle(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Geometry::Rectangle(Rectangle::new(x1, y1, x2, y2))
    }

    /// Creates a point geometry.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Point::new(x, y))
    }

    /// Creates a circle geometry.
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Geometry::Circle(Circle::new(x, y, radius))
    }

    fn as_shape(&self) -> &dyn Shape {
        match self {
            Geometry::Rectangle(r) => r,
            Geometry::Point(p) => p,
            Geometry::Circle(c) => c,
        }
    }
}

impl Shape for Geometry {
    fn mbr(&self) -> Rectangle {
        self.as_shape().mbr()
    }

    fn distance(&self, rect: &Rectangle) -> f64 {
        self.as_shape().distance(rect)
    }

    fn intersects(&self, rect: &Rectangle) -> bool {
        self.as_shape().intersects(rect)
    }
}

impl From<Rectangle> for Geometry {
    fn from(rect: Rectangle) -> Self {
        Geometry::Rectangle(rect)
    }
}

impl From<Point> for Geometry {
    fn from(point: Point) -> Self {
        Geometry::Point(point)
    }
}

impl From<Circle> for Geometry {
    fn from(circle: Circle) -> Self {
        Geometry::Circle(circle)
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Rectangle(r) => write!(f, "{}", r),
            Geometry::Point(p) => write!(f, "{}", p),
            Geometry::Circle(c) => write!(f, "{}", c),
        }
    }
}

/// Union of the MBRs of a non-empty sequence of shapes, `None` when empty.
pub fn mbr_of<'a, S, I>(shapes: I) -> Option<Rectangle>
where
    S: Shape + ?Sized + 'a,
    I: IntoIterator<Item = &'a S>,
{
    shapes
        .into_iter()
        .map(|shape| shape.mbr())
        .reduce(|acc, mbr| acc.add(&mbr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_dispatch() {
        let rect = Geometry::rectangle(0.0, 0.0, 1.0, 1.0);
        let point = Geometry::point(5.0, 5.0);
        let circle = Geometry::circle(10.0, 10.0, 2.0);

        assert_eq!(rect.mbr(), Rectangle::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(point.mbr(), Rectangle::from_point(5.0, 5.0));
        assert_eq!(circle.mbr(), Rectangle::new(8.0, 8.0, 12.0, 12.0));

        let query = Rectangle::new(4.0, 5.0, 4.0, 5.0);
        assert_eq!(point.distance(&query), 1.0);
        assert!(!circle.intersects(&query));
    }

    #[test]
    fn test_mbr_of() {
        let shapes = vec![
            Geometry::point(1.0, 1.0),
            Geometry::rectangle(2.0, -1.0, 3.0, 0.0),
        ];
        assert_eq!(mbr_of(&shapes), Some(Rectangle::new(1.0, -1.0, 3.0, 1.0)));

        let empty: Vec<Geometry> = Vec::new();
        assert_eq!(mbr_of(&empty), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Geometry::point(1.0, 2.0).to_string(), "POINT(1 2)");
    }
}
