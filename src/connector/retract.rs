//! Centre-to-centre arrows that start and stop just outside both node boxes.

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};

use super::arrow::triangle_head;

/// Step used when the configured one is not a positive finite number.
const DEFAULT_RETRACT_STEP: f32 = 5.0;
/// Line-of-sight direction used when both centroids coincide.
const FALLBACK_DIRECTION: Point = Point::new(0.0, -1.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetractOptions {
    /// Distance moved per retraction step.
    pub step: f32,
    /// Clearance added around the target box so the head does not overlap it.
    pub target_padding: f32,
    pub head_size: f32,
}

impl Default for RetractOptions {
    fn default() -> Self {
        Self {
            step: 5.0,
            target_padding: 5.0,
            head_size: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidArrow {
    pub start: Point,
    pub end: Point,
    pub head: [Point; 3],
}

pub fn retract_arrow(
    source: &BoundingBox,
    target: &BoundingBox,
    opts: &RetractOptions,
) -> CentroidArrow {
    let from = source.center();
    let to = target.center();
    let dir = (to - from).normalized().unwrap_or(FALLBACK_DIRECTION);

    let start = retract(from, dir, source, opts.step);
    let padded = target.padded(opts.target_padding.max(0.0));
    let end = retract(to, dir * -1.0, &padded, opts.step);

    CentroidArrow {
        start,
        end,
        head: triangle_head(end, dir, opts.head_size),
    }
}

/// Walks `from` along `dir` until it leaves `bbox`.
fn retract(from: Point, dir: Point, bbox: &BoundingBox, step: f32) -> Point {
    let step = if step.is_finite() && step > 0.0 {
        step
    } else {
        DEFAULT_RETRACT_STEP
    };
    // exit distance is at most half the diagonal, itself below (w + h) / 2
    let limit = ((bbox.width + bbox.height) / step).ceil() as usize + 2;
    let mut point = from;
    for _ in 0..limit {
        if !bbox.contains(point) {
            break;
        }
        point = point + dir * step;
    }
    point
}
