use std::f32::consts::FRAC_1_SQRT_2;

use crate::geometry::Point;

/// Wing length used when none (or a non-positive one) is configured.
pub const DEFAULT_WING_LENGTH: f32 = 5.0;

/// Direction assumed when the terminal tangent has no length (points down the screen).
const FALLBACK_TANGENT: Point = Point::new(0.0, 1.0);

// ── Triangle head proportions ───────────────────────────────────────
/// Overall scale applied to the requested head size.
const HEAD_SCALE: f32 = 1.75;
/// Apex distance from the triangle centre, as a fraction of the scaled size.
const HEAD_APEX: f32 = 0.58;
/// Base distance behind the triangle centre.
const HEAD_BASE: f32 = 0.29;
/// Half the base width.
const HEAD_HALF_BASE: f32 = 0.5;

/// Two chevron points flanking a directed connector's tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowWings {
    pub left: Point,
    pub right: Point,
}

/// Builds a chevron at `tip` for a path arriving from `tail`.
///
/// Both wings sit exactly `length` away from the tip, 45 degrees either side of the
/// reversed tangent, so the head size does not depend on the path length.
pub fn arrow_wings(tail: Point, tip: Point, length: f32) -> ArrowWings {
    let dir = (tip - tail).normalized().unwrap_or(FALLBACK_TANGENT);
    let length = if length.is_finite() && length > 0.0 {
        length
    } else {
        DEFAULT_WING_LENGTH
    };
    let back = dir * (-length * FRAC_1_SQRT_2);
    let side = dir.perp() * (length * FRAC_1_SQRT_2);
    ArrowWings {
        left: tip + back + side,
        right: tip + back - side,
    }
}

pub fn label_anchor(start: Point, end: Point) -> Point {
    start.midpoint(end)
}

/// Filled triangle whose apex points along `direction`, sitting just ahead of `tip`.
pub fn triangle_head(tip: Point, direction: Point, size: f32) -> [Point; 3] {
    let dir = direction.normalized().unwrap_or(Point::new(0.0, -1.0));
    let scaled = size * HEAD_SCALE;
    let center = tip + dir * (size / 2.0);
    let apex = center + dir * (scaled * HEAD_APEX);
    let base = center - dir * (scaled * HEAD_BASE);
    let half = dir.perp() * (scaled * HEAD_HALF_BASE);
    [apex, base + half, base - half]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{a} != {b}");
    }

    #[test]
    fn wings_are_symmetric_and_fixed_length() {
        let tail = Point::new(10.0, 3.0);
        let tip = Point::new(90.0, 47.0);
        let wings = arrow_wings(tail, tip, 5.0);
        assert_close(wings.left.distance(tip), 5.0);
        assert_close(wings.right.distance(tip), 5.0);

        let dir = (tip - tail).normalized().unwrap();
        let normal = dir.perp();
        let left = wings.left - tip;
        let right = wings.right - tip;
        // same projection on the tangent, mirrored projection on the normal
        assert_close(left.x * dir.x + left.y * dir.y, right.x * dir.x + right.y * dir.y);
        assert_close(
            left.x * normal.x + left.y * normal.y,
            -(right.x * normal.x + right.y * normal.y),
        );
    }

    #[test]
    fn zero_tangent_does_not_produce_nan() {
        let p = Point::new(4.0, 4.0);
        let wings = arrow_wings(p, p, 5.0);
        assert!(wings.left.is_finite());
        assert!(wings.right.is_finite());
        assert_close(wings.left.distance(p), 5.0);
    }

    #[test]
    fn non_positive_length_uses_default() {
        let wings = arrow_wings(Point::new(0.0, 0.0), Point::new(0.0, 10.0), 0.0);
        assert_close(wings.left.distance(Point::new(0.0, 10.0)), DEFAULT_WING_LENGTH);
    }

    #[test]
    fn triangle_points_forward() {
        let tip = Point::new(0.0, 0.0);
        let head = triangle_head(tip, Point::new(1.0, 0.0), 5.0);
        assert!(head[0].x > head[1].x);
        assert_close(head[1].x, head[2].x);
        assert_close(head[1].y, -head[2].y);
    }
}
