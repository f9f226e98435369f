use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Spans at or below this are treated as zero when mapping between spaces.
pub const DEGENERATE_SPAN: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }

    pub fn manhattan(self, other: Point) -> f32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Point> {
        let len = self.length();
        if len <= DEGENERATE_SPAN || !len.is_finite() {
            return None;
        }
        Some(self / len)
    }

    /// Counter-clockwise perpendicular in screen orientation.
    pub fn perp(self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Point {
    type Output = Point;

    fn div(self, rhs: f32) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

/// Axis-aligned box; `y` grows downward in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn from_center(center: Point, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn x2(&self) -> f32 {
        self.x + self.width
    }

    pub fn y2(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn north(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y)
    }

    pub fn south(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y2())
    }

    pub fn west(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }

    pub fn east(&self) -> Point {
        Point::new(self.x2(), self.y + self.height / 2.0)
    }

    /// Inclusive of the border.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x2() && p.y >= self.y && p.y <= self.y2()
    }

    pub fn padded(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Simulation-space rectangle mapped onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewBox {
    pub bottom_left: Point,
    pub top_right: Point,
}

impl ViewBox {
    pub const ZERO: ViewBox = ViewBox {
        bottom_left: Point::ZERO,
        top_right: Point::ZERO,
    };

    pub const fn new(bottom_left: Point, top_right: Point) -> Self {
        Self {
            bottom_left,
            top_right,
        }
    }

    pub fn span(&self) -> Point {
        self.top_right - self.bottom_left
    }

    pub fn is_degenerate(&self) -> bool {
        let span = self.span();
        span.x.abs() <= DEGENERATE_SPAN || span.y.abs() <= DEGENERATE_SPAN
    }

    /// Largest per-axis distance between the corners of two boxes.
    pub fn max_corner_delta(&self, other: &ViewBox) -> f32 {
        let bl = other.bottom_left - self.bottom_left;
        let tr = other.top_right - self.top_right;
        bl.x.abs().max(bl.y.abs()).max(tr.x.abs()).max(tr.y.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_midpoints() {
        let bbox = BoundingBox::new(0.0, 0.0, 40.0, 20.0);
        assert_eq!(bbox.north(), Point::new(20.0, 0.0));
        assert_eq!(bbox.south(), Point::new(20.0, 20.0));
        assert_eq!(bbox.west(), Point::new(0.0, 10.0));
        assert_eq!(bbox.east(), Point::new(40.0, 10.0));
    }

    #[test]
    fn negative_sizes_clamp_to_zero() {
        let bbox = BoundingBox::new(5.0, 5.0, -3.0, -1.0);
        assert_eq!(bbox.width, 0.0);
        assert_eq!(bbox.height, 0.0);
        assert!(bbox.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn zero_vector_has_no_direction() {
        assert!(Point::ZERO.normalized().is_none());
        let unit = Point::new(3.0, 4.0).normalized().unwrap();
        assert!((unit.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_box_is_degenerate() {
        assert!(ViewBox::ZERO.is_degenerate());
        let view = ViewBox::new(Point::new(-2.0, -2.0), Point::new(2.0, 2.0));
        assert!(!view.is_degenerate());
        assert_eq!(view.span(), Point::new(4.0, 4.0));
    }
}
