//! Seam to the physics/layout engine.
//!
//! The force simulation itself lives outside this crate. The view only needs the
//! engine's current extent, per-node positions, and a way to write a dragged node back.

use std::collections::BTreeMap;

use crate::geometry::{Point, ViewBox};

/// Smallest extent reported by [`PinnedLayout`], matching springy's initial box.
const MIN_EXTENT: f32 = 2.0;
/// Padding added on every side, as a fraction of the span.
const EXTENT_PADDING_RATIO: f32 = 0.07;

pub trait LayoutEngine {
    /// Current extent of all nodes in simulation space.
    fn bounding_box(&self) -> ViewBox;

    fn position(&self, node: &str) -> Option<Point>;

    /// Moves a node, typically in response to a drag.
    fn set_position(&mut self, node: &str, p: Point);

    /// Advances the simulation by one frame.
    fn step(&mut self) {}
}

/// Engine whose positions only change when the host writes them.
#[derive(Debug, Clone, Default)]
pub struct PinnedLayout {
    positions: BTreeMap<String, Point>,
}

impl PinnedLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, p: Point) {
        self.positions.insert(id.into(), p);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromIterator<(String, Point)> for PinnedLayout {
    fn from_iter<T: IntoIterator<Item = (String, Point)>>(iter: T) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

impl LayoutEngine for PinnedLayout {
    fn bounding_box(&self) -> ViewBox {
        let mut bottom_left = Point::new(-MIN_EXTENT, -MIN_EXTENT);
        let mut top_right = Point::new(MIN_EXTENT, MIN_EXTENT);
        for p in self.positions.values().filter(|p| p.is_finite()) {
            bottom_left.x = bottom_left.x.min(p.x);
            bottom_left.y = bottom_left.y.min(p.y);
            top_right.x = top_right.x.max(p.x);
            top_right.y = top_right.y.max(p.y);
        }
        let padding = (top_right - bottom_left) * EXTENT_PADDING_RATIO;
        ViewBox::new(bottom_left - padding, top_right + padding)
    }

    fn position(&self, node: &str) -> Option<Point> {
        self.positions.get(node).copied()
    }

    fn set_position(&mut self, node: &str, p: Point) {
        if let Some(slot) = self.positions.get_mut(node) {
            *slot = p;
        }
    }
}
