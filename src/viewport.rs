//! Simulation-space to screen-space mapping through an eased view box.

use log::debug;

use crate::engine::LayoutEngine;
use crate::error::{Error, Result};
use crate::geometry::{Point, ViewBox};

/// Fraction denominator used when the configured one is below 1.
const DEFAULT_EASING_DIVISOR: f32 = 10.0;

/// Immutable view of the mapping at one instant.
///
/// Taking one snapshot and using it for both a drag translation and the matching redraw
/// keeps the two in agreement even if the coordinator ticks in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSnapshot {
    pub view: ViewBox,
    pub width: f32,
    pub height: f32,
    /// Number of ticks applied before this snapshot was taken.
    pub version: u64,
}

impl ViewSnapshot {
    pub fn is_degenerate(&self) -> bool {
        self.view.is_degenerate()
    }

    /// Degenerate axes land in the middle of the canvas.
    pub fn to_screen(&self, p: Point) -> Point {
        let span = self.view.span();
        let rel = p - self.view.bottom_left;
        Point::new(
            map_axis(rel.x, span.x, self.width),
            map_axis(rel.y, span.y, self.height),
        )
    }

    /// Degenerate axes map back to the view box origin.
    pub fn from_screen(&self, s: Point) -> Point {
        let span = self.view.span();
        let origin = self.view.bottom_left;
        let x = if span.x.abs() > crate::geometry::DEGENERATE_SPAN {
            (s.x / self.width) * span.x + origin.x
        } else {
            origin.x
        };
        let y = if span.y.abs() > crate::geometry::DEGENERATE_SPAN {
            (s.y / self.height) * span.y + origin.y
        } else {
            origin.y
        };
        Point::new(x, y)
    }
}

fn map_axis(rel: f32, span: f32, extent: f32) -> f32 {
    if span.abs() > crate::geometry::DEGENERATE_SPAN {
        rel / span * extent
    } else {
        extent / 2.0
    }
}

#[derive(Debug, Clone)]
pub struct ViewportCoordinator {
    current: ViewBox,
    target: ViewBox,
    width: f32,
    height: f32,
    easing_divisor: f32,
    ticks: u64,
}

impl ViewportCoordinator {
    /// Starts from the engine's present extent. Both canvas dimensions must be positive.
    pub fn new<E: LayoutEngine + ?Sized>(
        engine: &E,
        width: f32,
        height: f32,
        easing_divisor: f32,
    ) -> Result<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(Error::EmptyCanvas { width, height });
        }
        let easing_divisor = if easing_divisor.is_finite() && easing_divisor >= 1.0 {
            easing_divisor
        } else {
            DEFAULT_EASING_DIVISOR
        };
        Ok(Self {
            current: engine.bounding_box(),
            target: ViewBox::ZERO,
            width,
            height,
            easing_divisor,
            ticks: 0,
        })
    }

    pub fn current(&self) -> ViewBox {
        self.current
    }

    pub fn target(&self) -> ViewBox {
        self.target
    }

    /// Pulls the engine's extent as the new target and moves `current` a fixed fraction
    /// of the remaining distance toward it.
    pub fn tick<E: LayoutEngine + ?Sized>(&mut self, engine: &E) {
        self.target = engine.bounding_box();
        self.current = ease(&self.current, &self.target, self.easing_divisor);
        self.ticks += 1;
        if self.ticks % 60 == 0 {
            debug!(
                "viewport tick {}: remaining delta {:.4}",
                self.ticks,
                self.current.max_corner_delta(&self.target)
            );
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            view: self.current,
            width: self.width,
            height: self.height,
            version: self.ticks,
        }
    }

    pub fn to_screen(&self, p: Point) -> Point {
        self.snapshot().to_screen(p)
    }

    pub fn from_screen(&self, s: Point) -> Point {
        self.snapshot().from_screen(s)
    }
}

fn ease(current: &ViewBox, target: &ViewBox, divisor: f32) -> ViewBox {
    ViewBox {
        bottom_left: current.bottom_left + (target.bottom_left - current.bottom_left) / divisor,
        top_right: current.top_right + (target.top_right - current.top_right) / divisor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PinnedLayout;

    fn fixed_view() -> ViewSnapshot {
        ViewSnapshot {
            view: ViewBox::new(Point::new(-3.0, -2.0), Point::new(5.0, 4.0)),
            width: 800.0,
            height: 600.0,
            version: 0,
        }
    }

    #[test]
    fn round_trips_screen_points() {
        let snap = fixed_view();
        for s in [
            Point::new(0.0, 0.0),
            Point::new(800.0, 600.0),
            Point::new(123.5, 456.25),
            Point::new(799.0, 1.0),
        ] {
            let back = snap.to_screen(snap.from_screen(s));
            assert!((back.x - s.x).abs() < 1e-3, "{back:?} vs {s:?}");
            assert!((back.y - s.y).abs() < 1e-3, "{back:?} vs {s:?}");
        }
    }

    #[test]
    fn round_trips_simulation_points() {
        let snap = fixed_view();
        let p = Point::new(1.25, -0.5);
        let back = snap.from_screen(snap.to_screen(p));
        assert!((back.x - p.x).abs() < 1e-5);
        assert!((back.y - p.y).abs() < 1e-5);
    }

    #[test]
    fn maps_corners_to_canvas_corners() {
        let snap = fixed_view();
        assert_eq!(snap.to_screen(Point::new(-3.0, -2.0)), Point::new(0.0, 0.0));
        assert_eq!(snap.to_screen(Point::new(5.0, 4.0)), Point::new(800.0, 600.0));
    }

    #[test]
    fn degenerate_view_does_not_divide_by_zero() {
        let snap = ViewSnapshot {
            view: ViewBox::ZERO,
            width: 800.0,
            height: 600.0,
            version: 0,
        };
        assert!(snap.is_degenerate());
        assert_eq!(snap.to_screen(Point::new(3.0, 4.0)), Point::new(400.0, 300.0));
        assert_eq!(snap.from_screen(Point::new(10.0, 10.0)), Point::ZERO);
    }

    #[test]
    fn easing_converges_without_overshoot() {
        let mut engine = PinnedLayout::new();
        engine.insert("a", Point::new(0.0, 0.0));
        let mut coordinator = ViewportCoordinator::new(&engine, 400.0, 300.0, 10.0).unwrap();
        engine.insert("b", Point::new(40.0, -25.0));
        let target = engine.bounding_box();

        let coords = |view: ViewBox| {
            [view.bottom_left.x, view.bottom_left.y, view.top_right.x, view.top_right.y]
        };
        let start = coords(coordinator.current());
        let goal = coords(target);
        let mut previous = start;
        assert!(coordinator.current().max_corner_delta(&target) > 1.0);
        for _ in 0..400 {
            coordinator.tick(&engine);
            let current = coords(coordinator.current());
            for axis in 0..4 {
                // each coordinate closes in on its target from the side it started on
                assert!((current[axis] - goal[axis]).abs() <= (previous[axis] - goal[axis]).abs());
                assert!((current[axis] - goal[axis]) * (start[axis] - goal[axis]) >= 0.0);
            }
            previous = current;
        }
        assert!(coordinator.current().max_corner_delta(&target) < 1e-3);
        assert_eq!(coordinator.target(), target);
    }

    #[test]
    fn tick_moves_a_tenth_of_the_way() {
        let mut engine = PinnedLayout::new();
        engine.insert("a", Point::new(0.0, 0.0));
        let mut coordinator = ViewportCoordinator::new(&engine, 400.0, 300.0, 10.0).unwrap();
        let start = coordinator.current();
        engine.insert("b", Point::new(100.0, 0.0));
        let target = engine.bounding_box();
        coordinator.tick(&engine);
        let expected = start.top_right.x + (target.top_right.x - start.top_right.x) / 10.0;
        assert!((coordinator.current().top_right.x - expected).abs() < 1e-4);
        assert_eq!(coordinator.snapshot().version, 1);
    }

    #[test]
    fn rejects_empty_canvas() {
        let engine = PinnedLayout::new();
        let err = ViewportCoordinator::new(&engine, 0.0, 300.0, 10.0).unwrap_err();
        assert!(matches!(err, Error::EmptyCanvas { .. }));
    }
}
