//! Boundary-to-boundary connector routing.
//!
//! Each box offers four anchors (N, S, W, E midpoints). [`route`] picks the admissible
//! pair with the smallest Manhattan distance and bends a cubic curve between them so the
//! connector leaves and enters each box perpendicular to the side it anchors on.

mod arrow;
pub mod retract;

pub use arrow::{ArrowWings, DEFAULT_WING_LENGTH, arrow_wings, label_anchor, triangle_head};
pub use retract::{CentroidArrow, RetractOptions, retract_arrow};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Point};
use crate::surface::{DrawState, PathData, ShapeStyle, StrokeStyle, Surface, TextStyle};

/// Lower bound for control-point offsets so nearly coincident anchors still curve.
pub const DEFAULT_CONTROL_FLOOR: f32 = 10.0;
/// Stroke width of the background band when the band string omits it.
const DEFAULT_BAND_WIDTH: f32 = 3.0;
const DEFAULT_STROKE: &str = "#000";
const DEFAULT_LABEL_FILL: &str = "#000";
const DEFAULT_LABEL_FONT_SIZE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    North,
    South,
    West,
    East,
}

impl Anchor {
    /// Candidate order within one box.
    pub const ALL: [Anchor; 4] = [Anchor::North, Anchor::South, Anchor::West, Anchor::East];

    pub fn point_on(self, bbox: &BoundingBox, offset: f32) -> Point {
        match self {
            Anchor::North => bbox.north() + Point::new(0.0, -offset),
            Anchor::South => bbox.south() + Point::new(0.0, offset),
            Anchor::West => bbox.west() + Point::new(-offset, 0.0),
            Anchor::East => bbox.east() + Point::new(offset, 0.0),
        }
    }

    /// Offset from an anchor to its control point: outward, perpendicular to the side.
    fn control_offset(self, dx: f32, dy: f32) -> Point {
        match self {
            Anchor::North => Point::new(0.0, -dy),
            Anchor::South => Point::new(0.0, dy),
            Anchor::West => Point::new(-dx, 0.0),
            Anchor::East => Point::new(dx, 0.0),
        }
    }
}

/// One of the eight anchor points considered for a box pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorCandidate {
    pub anchor: Anchor,
    /// 0 for the source box, 1 for the target box.
    pub box_index: usize,
    pub point: Point,
}

/// Anchors of `a` at indices 0..4 and of `b` at 4..8, each in N, S, W, E order.
pub fn anchor_candidates(a: &BoundingBox, b: &BoundingBox, offset: f32) -> [AnchorCandidate; 8] {
    let mut out = [AnchorCandidate {
        anchor: Anchor::North,
        box_index: 0,
        point: Point::ZERO,
    }; 8];
    for (box_index, bbox) in [a, b].into_iter().enumerate() {
        for (slot, anchor) in Anchor::ALL.into_iter().enumerate() {
            out[box_index * 4 + slot] = AnchorCandidate {
                anchor,
                box_index,
                point: anchor.point_on(bbox, offset),
            };
        }
    }
    out
}

/// Whether source candidate `i` (0..4) may connect to target candidate `j` (4..8).
///
/// Same-side pairs always qualify. Each opposite-side pair only qualifies when the two
/// anchors actually face each other; every other pairing is unrestricted.
pub fn is_admissible(candidates: &[AnchorCandidate; 8], i: usize, j: usize) -> bool {
    if i + 4 == j {
        return true;
    }
    let a = candidates[i].point;
    let b = candidates[j].point;
    let east_west = !(i == 3 && j == 6) || a.x < b.x;
    let west_east = !(i == 2 && j == 7) || a.x > b.x;
    let north_south = !(i == 0 && j == 5) || a.y > b.y;
    let south_north = !(i == 1 && j == 4) || a.y < b.y;
    east_west && west_east && north_south && south_north
}

/// Index pair `(i, j)` of the shortest admissible pairing; `(0, 4)` when none qualifies.
pub fn select_anchors(candidates: &[AnchorCandidate; 8]) -> (usize, usize) {
    let mut best: Option<((usize, usize), f32)> = None;
    for i in 0..4 {
        for j in 4..8 {
            if !is_admissible(candidates, i, j) {
                continue;
            }
            let score = candidates[i].point.manhattan(candidates[j].point);
            // strict comparison keeps the first pair on ties and skips NaN scores
            let better = match best {
                None => score.is_finite(),
                Some((_, current)) => score < current,
            };
            if better {
                best = Some(((i, j), score));
            }
        }
    }
    best.map(|(pair, _)| pair).unwrap_or((0, 4))
}

/// Background band drawn under the connector, parsed from `"color|width"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FillBand {
    pub color: String,
    pub width: f32,
}

impl FromStr for FillBand {
    type Err = std::convert::Infallible;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut parts = spec.splitn(2, '|');
        let color = parts.next().unwrap_or_default().trim().to_string();
        let width = parts
            .next()
            .and_then(|w| w.trim().parse::<f32>().ok())
            .filter(|w| w.is_finite() && *w > 0.0)
            .unwrap_or(DEFAULT_BAND_WIDTH);
        Ok(Self { color, width })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub fill: String,
    pub font_size: f32,
    pub font_family: Option<String>,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            fill: DEFAULT_LABEL_FILL.to_string(),
            font_size: DEFAULT_LABEL_FONT_SIZE,
            font_family: None,
        }
    }
}

impl LabelStyle {
    fn text_style(&self) -> TextStyle {
        TextStyle {
            fill: self.fill.clone(),
            font_size: self.font_size,
            font_family: self.font_family.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectorStyle {
    pub directed: bool,
    pub label: Option<String>,
    pub stroke: Option<String>,
    pub fill_band: Option<FillBand>,
    pub label_style: LabelStyle,
    /// Draw a straight segment instead of a curve.
    pub straight: bool,
}

impl ConnectorStyle {
    pub fn stroke_color(&self) -> &str {
        self.stroke.as_deref().unwrap_or(DEFAULT_STROKE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOptions {
    /// Distance of each anchor outside its box edge.
    pub anchor_offset: f32,
    pub control_floor: f32,
    pub wing_length: f32,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            anchor_offset: 0.0,
            control_floor: DEFAULT_CONTROL_FLOOR,
            wing_length: DEFAULT_WING_LENGTH,
        }
    }
}

/// Geometry of one routed connector. Recomputed every frame, never edited in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPath {
    pub anchors: (Anchor, Anchor),
    pub start: Point,
    pub end: Point,
    /// `None` for a straight segment.
    pub controls: Option<(Point, Point)>,
    pub arrow: Option<ArrowWings>,
    pub label_anchor: Option<Point>,
}

impl ConnectorPath {
    /// Point the path arrives from at its end.
    pub fn terminal_tail(&self) -> Point {
        match self.controls {
            Some((_, c2)) => c2,
            None => self.start,
        }
    }

    pub fn to_path_data(&self) -> PathData {
        let mut data = PathData::new().move_to(self.start);
        data = match self.controls {
            Some((c1, c2)) => data.curve_to(c1, c2, self.end),
            None => data.line_to(self.end),
        };
        if let Some(wings) = self.arrow {
            data = data.move_to(wings.left).line_to(self.end).line_to(wings.right);
        }
        data
    }
}

pub fn route(
    a: &BoundingBox,
    b: &BoundingBox,
    style: &ConnectorStyle,
    opts: &RouteOptions,
) -> ConnectorPath {
    let candidates = anchor_candidates(a, b, opts.anchor_offset);
    let (i, j) = select_anchors(&candidates);
    let (from, to) = (candidates[i], candidates[j]);
    let (p1, p4) = (from.point, to.point);

    let controls = if style.straight {
        None
    } else {
        let floor = if opts.control_floor.is_finite() {
            opts.control_floor.max(0.0)
        } else {
            DEFAULT_CONTROL_FLOOR
        };
        let dx = ((p1.x - p4.x).abs() / 2.0).max(floor);
        let dy = ((p1.y - p4.y).abs() / 2.0).max(floor);
        Some((
            p1 + from.anchor.control_offset(dx, dy),
            p4 + to.anchor.control_offset(dx, dy),
        ))
    };

    let mut path = ConnectorPath {
        anchors: (from.anchor, to.anchor),
        start: p1,
        end: p4,
        controls,
        arrow: None,
        label_anchor: style.label.as_ref().map(|_| label_anchor(p1, p4)),
    };
    if style.directed {
        path.arrow = Some(arrow_wings(path.terminal_tail(), p4, opts.wing_length));
    }
    path
}

/// Long-lived drawing handles for one routed edge.
#[derive(Debug, Clone)]
pub struct Connector<H> {
    fg: DrawState<H>,
    bg: DrawState<H>,
    label: DrawState<H>,
    last: Option<ConnectorPath>,
}

impl<H> Default for Connector<H> {
    fn default() -> Self {
        Self {
            fg: DrawState::Uncreated,
            bg: DrawState::Uncreated,
            label: DrawState::Uncreated,
            last: None,
        }
    }
}

impl<H: Copy> Connector<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_path(&self) -> Option<&ConnectorPath> {
        self.last.as_ref()
    }

    pub fn foreground(&self) -> Option<H> {
        self.fg.handle()
    }

    pub fn background(&self) -> Option<H> {
        self.bg.handle()
    }

    pub fn label(&self) -> Option<H> {
        self.label.handle()
    }

    /// Routes between the two boxes and applies the result to this edge's primitives.
    /// A band or label that `style` no longer carries is removed from the surface.
    pub fn draw<S>(
        &mut self,
        surface: &mut S,
        a: &BoundingBox,
        b: &BoundingBox,
        style: &ConnectorStyle,
        opts: &RouteOptions,
    ) -> &ConnectorPath
    where
        S: Surface<Handle = H> + ?Sized,
    {
        let path = route(a, b, style, opts);
        let data = path.to_path_data();

        self.fg.apply(
            surface,
            |s| {
                let stroke = StrokeStyle {
                    color: style.stroke_color().to_string(),
                    width: 1.0,
                    fill: None,
                };
                let handle = s.create_path(&data, &stroke);
                s.send_to_back(handle);
                handle
            },
            |s, handle| s.update_path(handle, &data),
        );

        if let Some(band) = &style.fill_band {
            self.bg.apply(
                surface,
                |s| {
                    let stroke = StrokeStyle {
                        color: band.color.clone(),
                        width: band.width,
                        fill: None,
                    };
                    let handle = s.create_path(&data, &stroke);
                    s.send_to_back(handle);
                    handle
                },
                |s, handle| s.update_path(handle, &data),
            );
        } else {
            self.bg.clear(surface);
        }

        if let (Some(text), Some(at)) = (&style.label, path.label_anchor) {
            let text_style = style.label_style.text_style();
            self.label.apply(
                surface,
                |s| s.create_text(at, text, &text_style),
                |s, handle| {
                    s.move_text(handle, at);
                    s.restyle_text(handle, &text_style);
                },
            );
        } else {
            self.label.clear(surface);
        }

        self.last.insert(path)
    }
}

/// Long-lived drawing handles for one centre-to-centre arrow.
#[derive(Debug, Clone)]
pub struct ArrowConnector<H> {
    line: DrawState<H>,
    head: DrawState<H>,
}

impl<H> Default for ArrowConnector<H> {
    fn default() -> Self {
        Self {
            line: DrawState::Uncreated,
            head: DrawState::Uncreated,
        }
    }
}

impl<H: Copy> ArrowConnector<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self) -> (Option<H>, Option<H>) {
        (self.line.handle(), self.head.handle())
    }

    pub fn draw<S>(
        &mut self,
        surface: &mut S,
        source: &BoundingBox,
        target: &BoundingBox,
        color: &str,
        opts: &RetractOptions,
    ) -> CentroidArrow
    where
        S: Surface<Handle = H> + ?Sized,
    {
        let arrow = retract_arrow(source, target, opts);
        let data = PathData::new().move_to(arrow.start).line_to(arrow.end);

        self.head.apply(
            surface,
            |s| {
                let style = ShapeStyle {
                    fill: color.to_string(),
                    stroke: color.to_string(),
                    stroke_width: 2.0,
                    corner_radius: 0.0,
                };
                let handle = s.create_polygon(&arrow.head, &style);
                s.send_to_back(handle);
                handle
            },
            |s, handle| s.update_polygon(handle, &arrow.head),
        );
        self.line.apply(
            surface,
            |s| {
                let stroke = StrokeStyle {
                    color: color.to_string(),
                    width: 2.0,
                    fill: None,
                };
                let handle = s.create_path(&data, &stroke);
                s.send_to_back(handle);
                handle
            },
            |s, handle| s.update_path(handle, &data),
        );
        arrow
    }
}
