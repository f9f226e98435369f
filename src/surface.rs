//! Drawing-surface seam.
//!
//! The view never talks to a concrete backend. It creates long-lived primitives once and
//! then updates them every frame through the [`Surface`] trait; [`DrawState`] records
//! whether a primitive already exists for a given node or edge.

use std::fmt::{self, Write as _};

use crate::geometry::{BoundingBox, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CurveTo(Point, Point, Point),
}

/// Ordered path commands, serialisable to SVG path data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    pub commands: Vec<PathCommand>,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn curve_to(mut self, c1: Point, c2: Point, end: Point) -> Self {
        self.commands.push(PathCommand::CurveTo(c1, c2, end));
        self
    }

    pub fn is_finite(&self) -> bool {
        self.commands.iter().all(|cmd| match cmd {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p.is_finite(),
            PathCommand::CurveTo(a, b, c) => a.is_finite() && b.is_finite() && c.is_finite(),
        })
    }
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for cmd in &self.commands {
            if !out.is_empty() {
                out.push(' ');
            }
            match cmd {
                PathCommand::MoveTo(p) => write!(out, "M {:.3},{:.3}", p.x, p.y)?,
                PathCommand::LineTo(p) => write!(out, "L {:.3},{:.3}", p.x, p.y)?,
                PathCommand::CurveTo(a, b, c) => write!(
                    out,
                    "C {:.3},{:.3} {:.3},{:.3} {:.3},{:.3}",
                    a.x, a.y, b.x, b.y, c.x, c.y
                )?,
            }
        }
        f.write_str(&out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f32,
    pub fill: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub fill: String,
    pub font_size: f32,
    pub font_family: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f32,
    pub corner_radius: f32,
}

/// Retained-mode drawing backend.
pub trait Surface {
    type Handle: Copy + fmt::Debug;

    fn create_path(&mut self, data: &PathData, stroke: &StrokeStyle) -> Self::Handle;
    fn update_path(&mut self, handle: Self::Handle, data: &PathData);

    fn create_text(&mut self, at: Point, text: &str, style: &TextStyle) -> Self::Handle;
    fn move_text(&mut self, handle: Self::Handle, at: Point);
    fn restyle_text(&mut self, handle: Self::Handle, style: &TextStyle);

    fn create_rect(&mut self, rect: &BoundingBox, style: &ShapeStyle) -> Self::Handle;

    fn create_polygon(&mut self, points: &[Point], style: &ShapeStyle) -> Self::Handle;
    fn update_polygon(&mut self, handle: Self::Handle, points: &[Point]);

    /// Bundles primitives into one unit that moves with [`Surface::translate_group`].
    fn group(&mut self, members: &[Self::Handle]) -> Self::Handle;
    fn translate_group(&mut self, handle: Self::Handle, offset: Point);

    /// Moves a primitive behind everything drawn so far.
    fn send_to_back(&mut self, handle: Self::Handle);

    /// Deletes a primitive; groups take their members with them.
    fn remove(&mut self, handle: Self::Handle);
}

/// Whether a primitive exists yet for a node or edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawState<H> {
    #[default]
    Uncreated,
    Created(H),
}

impl<H: Copy> DrawState<H> {
    pub fn handle(&self) -> Option<H> {
        match self {
            DrawState::Uncreated => None,
            DrawState::Created(handle) => Some(*handle),
        }
    }

    /// Removes the primitive, if any, so the next `apply` creates it afresh.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: Surface<Handle = H> + ?Sized,
    {
        if let DrawState::Created(handle) = *self {
            surface.remove(handle);
            *self = DrawState::Uncreated;
        }
    }

    /// Updates the existing primitive, or creates it on first use.
    pub fn apply<S: ?Sized>(
        &mut self,
        surface: &mut S,
        create: impl FnOnce(&mut S) -> H,
        update: impl FnOnce(&mut S, H),
    ) -> H {
        match *self {
            DrawState::Created(handle) => {
                update(surface, handle);
                handle
            }
            DrawState::Uncreated => {
                let handle = create(surface);
                *self = DrawState::Created(handle);
                handle
            }
        }
    }
}
