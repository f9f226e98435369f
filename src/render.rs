use crate::geometry::{BoundingBox, Point};
use crate::surface::{PathData, ShapeStyle, StrokeStyle, Surface, TextStyle};
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Path { data: PathData, stroke: StrokeStyle },
    Text { at: Point, text: String, style: TextStyle },
    Rect { rect: BoundingBox, style: ShapeStyle },
    Polygon { points: Vec<Point>, style: ShapeStyle },
    Group { members: Vec<ElementId>, offset: Point },
}

/// Retained scene that serialises to SVG.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f32,
    height: f32,
    background: String,
    /// Arena slots; removed elements leave `None` so handles stay stable.
    elements: Vec<Option<Element>>,
    /// Top-level paint order, back to front. Grouped elements are painted by their group.
    order: Vec<ElementId>,
}

impl SvgSurface {
    pub fn new(width: f32, height: f32, background: impl Into<String>) -> Self {
        Self {
            width,
            height,
            background: background.into(),
            elements: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.elements.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)?.as_ref()
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0)?.as_mut()
    }

    pub fn paint_order(&self) -> &[ElementId] {
        &self.order
    }

    fn push(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Some(element));
        self.order.push(id);
        id
    }

    pub fn to_svg(&self) -> String {
        let mut svg = String::new();
        let width = self.width;
        let height = self.height;
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&self.background)
        );
        for id in &self.order {
            self.write_element(&mut svg, *id);
        }
        svg.push_str("</svg>");
        svg
    }

    fn write_element(&self, svg: &mut String, id: ElementId) {
        let Some(element) = self.element(id) else {
            return;
        };
        let _ = match element {
            Element::Path { data, stroke } => write!(
                svg,
                "<path d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                data,
                escape_xml(stroke.fill.as_deref().unwrap_or("none")),
                escape_xml(&stroke.color),
                stroke.width
            ),
            Element::Text { at, text, style } => {
                let family = style
                    .font_family
                    .as_deref()
                    .map(|f| format!(" font-family=\"{}\"", escape_xml(f)))
                    .unwrap_or_default();
                write!(
                    svg,
                    "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\"{} font-size=\"{}\" fill=\"{}\">{}</text>",
                    at.x,
                    at.y,
                    family,
                    style.font_size,
                    escape_xml(&style.fill),
                    escape_xml(text)
                )
            }
            Element::Rect { rect, style } => write!(
                svg,
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{}\" ry=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                style.corner_radius,
                style.corner_radius,
                escape_xml(&style.fill),
                escape_xml(&style.stroke),
                style.stroke_width
            ),
            Element::Polygon { points, style } => {
                let coords = points
                    .iter()
                    .map(|p| format!("{:.3},{:.3}", p.x, p.y))
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(
                    svg,
                    "<polygon points=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
                    coords,
                    escape_xml(&style.fill),
                    escape_xml(&style.stroke),
                    style.stroke_width
                )
            }
            Element::Group { members, offset } => {
                let _ = write!(
                    svg,
                    "<g transform=\"translate({:.2},{:.2})\">",
                    offset.x, offset.y
                );
                for member in members {
                    self.write_element(svg, *member);
                }
                svg.push_str("</g>");
                Ok(())
            }
        };
    }
}

impl Surface for SvgSurface {
    type Handle = ElementId;

    fn create_path(&mut self, data: &PathData, stroke: &StrokeStyle) -> ElementId {
        self.push(Element::Path {
            data: data.clone(),
            stroke: stroke.clone(),
        })
    }

    fn update_path(&mut self, handle: ElementId, new_data: &PathData) {
        if let Some(Element::Path { data, .. }) = self.element_mut(handle) {
            *data = new_data.clone();
        }
    }

    fn create_text(&mut self, at: Point, text: &str, style: &TextStyle) -> ElementId {
        self.push(Element::Text {
            at,
            text: text.to_string(),
            style: style.clone(),
        })
    }

    fn move_text(&mut self, handle: ElementId, to: Point) {
        if let Some(Element::Text { at, .. }) = self.element_mut(handle) {
            *at = to;
        }
    }

    fn restyle_text(&mut self, handle: ElementId, new_style: &TextStyle) {
        if let Some(Element::Text { style, .. }) = self.element_mut(handle) {
            *style = new_style.clone();
        }
    }

    fn create_rect(&mut self, rect: &BoundingBox, style: &ShapeStyle) -> ElementId {
        self.push(Element::Rect {
            rect: *rect,
            style: style.clone(),
        })
    }

    fn create_polygon(&mut self, points: &[Point], style: &ShapeStyle) -> ElementId {
        self.push(Element::Polygon {
            points: points.to_vec(),
            style: style.clone(),
        })
    }

    fn update_polygon(&mut self, handle: ElementId, new_points: &[Point]) {
        if let Some(Element::Polygon { points, .. }) = self.element_mut(handle) {
            *points = new_points.to_vec();
        }
    }

    fn group(&mut self, members: &[ElementId]) -> ElementId {
        self.order.retain(|id| !members.contains(id));
        self.push(Element::Group {
            members: members.to_vec(),
            offset: Point::ZERO,
        })
    }

    fn translate_group(&mut self, handle: ElementId, to: Point) {
        if let Some(Element::Group { offset, .. }) = self.element_mut(handle) {
            *offset = to;
        }
    }

    fn send_to_back(&mut self, handle: ElementId) {
        if let Some(pos) = self.order.iter().position(|id| *id == handle) {
            let id = self.order.remove(pos);
            self.order.insert(0, id);
        }
    }

    fn remove(&mut self, handle: ElementId) {
        let Some(removed) = self.elements.get_mut(handle.0).and_then(Option::take) else {
            return;
        };
        self.order.retain(|id| *id != handle);
        for element in self.elements.iter_mut().flatten() {
            if let Element::Group { members, .. } = element {
                members.retain(|id| *id != handle);
            }
        }
        if let Element::Group { members, .. } = removed {
            for member in members {
                self.remove(member);
            }
        }
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, width: f32, height: f32, font_family: &str) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = font_family
        .split(',')
        .next()
        .map(|f| f.trim().trim_matches('"').to_string())
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| "Inter".to_string());
    opt.default_size = usvg::Size::from_wh(width, height)
        .or_else(|| usvg::Size::from_wh(800.0, 600.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid output size {width}x{height}"))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke() -> StrokeStyle {
        StrokeStyle {
            color: "#000".to_string(),
            width: 1.0,
            fill: None,
        }
    }

    #[test]
    fn send_to_back_reorders_paint() {
        let mut surface = SvgSurface::new(100.0, 100.0, "#fff");
        let a = surface.create_path(&PathData::new().move_to(Point::ZERO), &stroke());
        let b = surface.create_path(&PathData::new().move_to(Point::ZERO), &stroke());
        surface.send_to_back(b);
        assert_eq!(surface.paint_order(), &[b, a]);
    }

    #[test]
    fn grouped_members_render_inside_group() {
        let mut surface = SvgSurface::new(100.0, 100.0, "#fff");
        let style = ShapeStyle {
            fill: "#0A6014".to_string(),
            stroke: "#0A6014".to_string(),
            stroke_width: 1.0,
            corner_radius: 5.0,
        };
        let rect = surface.create_rect(&BoundingBox::new(-10.0, -5.0, 20.0, 10.0), &style);
        let text = surface.create_text(
            Point::ZERO,
            "A & B",
            &TextStyle {
                fill: "#fff".to_string(),
                font_size: 15.0,
                font_family: None,
            },
        );
        let group = surface.group(&[rect, text]);
        surface.translate_group(group, Point::new(40.0, 50.0));
        assert_eq!(surface.paint_order(), &[group]);

        let svg = surface.to_svg();
        assert!(svg.contains("<g transform=\"translate(40.00,50.00)\"><rect"));
        assert!(svg.contains("A &amp; B"));
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn removed_elements_leave_the_scene() {
        let mut surface = SvgSurface::new(100.0, 100.0, "#fff");
        let keep = surface.create_path(&PathData::new().move_to(Point::ZERO), &stroke());
        let drop = surface.create_text(
            Point::ZERO,
            "gone",
            &TextStyle {
                fill: "#000".to_string(),
                font_size: 12.0,
                font_family: None,
            },
        );
        surface.remove(drop);
        surface.remove(drop);
        assert_eq!(surface.len(), 1);
        assert_eq!(surface.paint_order(), &[keep]);
        assert!(surface.element(drop).is_none());
        assert!(!surface.to_svg().contains("gone"));
    }

    #[test]
    fn updates_replace_geometry_in_place() {
        let mut surface = SvgSurface::new(100.0, 100.0, "#fff");
        let path = surface.create_path(&PathData::new().move_to(Point::ZERO), &stroke());
        let moved = PathData::new().move_to(Point::new(3.0, 4.0));
        surface.update_path(path, &moved);
        assert_eq!(surface.len(), 1);
        assert!(matches!(
            surface.element(path),
            Some(Element::Path { data, .. }) if *data == moved
        ));
    }
}
