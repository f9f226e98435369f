//! Per-frame glue between the engine, the viewport and the drawing surface.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use log::{debug, info};

use crate::config::{Config, EdgeMode};
use crate::connector::{ArrowConnector, Connector, ConnectorPath};
use crate::engine::LayoutEngine;
use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, Point};
use crate::ir::Graph;
use crate::render::SvgSurface;
use crate::scheduler::FrameLoop;
use crate::style::{StyleResolver, ThemeResolver};
use crate::surface::{DrawState, Surface};
use crate::text_metrics;
use crate::viewport::{ViewSnapshot, ViewportCoordinator};

#[derive(Debug, Clone)]
struct NodeShape<H> {
    state: DrawState<H>,
    width: f32,
    height: f32,
    /// Screen box as of the last draw.
    bbox: Option<BoundingBox>,
}

#[derive(Debug, Clone)]
enum EdgeDrawing<H> {
    Curve(Connector<H>),
    Arrow(ArrowConnector<H>),
}

/// What one call to [`GraphView::frame`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub nodes_drawn: usize,
    pub edges_drawn: usize,
    /// Edges whose endpoint shapes did not exist yet.
    pub edges_skipped: usize,
    /// The view box had no area, nothing was drawn.
    pub degenerate: bool,
}

pub struct GraphView<E, S: Surface, R = ThemeResolver> {
    config: Config,
    graph: Graph,
    engine: E,
    viewport: ViewportCoordinator,
    surface: S,
    resolver: R,
    nodes: BTreeMap<String, NodeShape<S::Handle>>,
    edges: Vec<EdgeDrawing<S::Handle>>,
}

impl<E: LayoutEngine> GraphView<E, SvgSurface, ThemeResolver> {
    /// View backed by an in-memory SVG scene, styled from the configured theme.
    pub fn svg(config: Config, graph: Graph, engine: E) -> Result<Self> {
        config.validate()?;
        let surface = SvgSurface::new(
            config.canvas.width,
            config.canvas.height,
            config.canvas.background.clone(),
        );
        let resolver = ThemeResolver {
            theme: config.theme.clone(),
            corner_radius: config.node.corner_radius,
            edge_band: config.edge_band.clone(),
        };
        Self::new(config, graph, engine, surface, resolver)
    }
}

impl<E, S, R> GraphView<E, S, R>
where
    E: LayoutEngine,
    S: Surface,
    R: StyleResolver,
{
    pub fn new(config: Config, graph: Graph, engine: E, surface: S, resolver: R) -> Result<Self> {
        config.validate()?;
        graph.validate()?;
        let viewport = ViewportCoordinator::new(
            &engine,
            config.canvas.width,
            config.canvas.height,
            config.viewport.easing_divisor,
        )?;
        let nodes = graph
            .nodes
            .keys()
            .map(|id| {
                let shape = NodeShape {
                    state: DrawState::Uncreated,
                    width: 0.0,
                    height: 0.0,
                    bbox: None,
                };
                (id.clone(), shape)
            })
            .collect();
        let edges = graph
            .edges
            .iter()
            .map(|_| match config.edge_mode {
                EdgeMode::Curve => EdgeDrawing::Curve(Connector::new()),
                EdgeMode::Arrow => EdgeDrawing::Arrow(ArrowConnector::new()),
            })
            .collect();
        info!(
            "graph view ready: {} nodes, {} edges, {}x{} canvas",
            graph.nodes.len(),
            graph.edges.len(),
            config.canvas.width,
            config.canvas.height
        );
        Ok(Self {
            config,
            graph,
            engine,
            viewport,
            surface,
            resolver,
            nodes,
            edges,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn viewport(&self) -> &ViewportCoordinator {
        &self.viewport
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Screen box of a node as of its last draw.
    pub fn node_box(&self, id: &str) -> Option<BoundingBox> {
        self.nodes.get(id).and_then(|shape| shape.bbox)
    }

    pub fn node_handle(&self, id: &str) -> Option<S::Handle> {
        self.nodes.get(id).and_then(|shape| shape.state.handle())
    }

    /// Geometry of the last routed curve for edge `index` (curve mode only).
    pub fn edge_path(&self, index: usize) -> Option<&ConnectorPath> {
        match self.edges.get(index)? {
            EdgeDrawing::Curve(connector) => connector.last_path(),
            EdgeDrawing::Arrow(_) => None,
        }
    }

    /// Steps the engine, eases the viewport and redraws every edge and node.
    pub fn frame(&mut self) -> FrameStats {
        self.engine.step();
        self.viewport.tick(&self.engine);
        let snapshot = self.viewport.snapshot();
        self.draw(&snapshot)
    }

    /// Redraws against an explicit snapshot without advancing anything.
    pub fn draw(&mut self, snapshot: &ViewSnapshot) -> FrameStats {
        let mut stats = FrameStats::default();
        if snapshot.is_degenerate() {
            debug!("view box has no area yet, skipping frame {}", snapshot.version);
            stats.degenerate = true;
            return stats;
        }

        for index in 0..self.edges.len() {
            if self.draw_edge(index) {
                stats.edges_drawn += 1;
            } else {
                stats.edges_skipped += 1;
            }
        }

        let ids: Vec<String> = self.graph.nodes.keys().cloned().collect();
        for id in ids {
            if self.draw_node(&id, snapshot) {
                stats.nodes_drawn += 1;
            }
        }
        stats
    }

    /// Returns false when either endpoint has no shape yet.
    fn draw_edge(&mut self, index: usize) -> bool {
        let edge = &self.graph.edges[index];
        let source = self.nodes.get(&edge.source).and_then(|shape| shape.bbox);
        let target = self.nodes.get(&edge.target).and_then(|shape| shape.bbox);
        let (Some(source), Some(target)) = (source, target) else {
            debug!("edge {} -> {} has no shapes yet", edge.source, edge.target);
            return false;
        };

        match &mut self.edges[index] {
            EdgeDrawing::Curve(connector) => {
                let style = self.resolver.edge_style(edge);
                connector.draw(&mut self.surface, &source, &target, &style, &self.config.route);
            }
            EdgeDrawing::Arrow(connector) => {
                let color = self.resolver.edge_color(edge);
                connector.draw(&mut self.surface, &source, &target, &color, &self.config.retract);
            }
        }
        true
    }

    fn draw_node(&mut self, id: &str, snapshot: &ViewSnapshot) -> bool {
        let Some(position) = self.engine.position(id) else {
            return false;
        };
        let Some(node) = self.graph.nodes.get(id) else {
            return false;
        };
        let Some(shape) = self.nodes.get_mut(id) else {
            return false;
        };

        let screen = snapshot.to_screen(position);
        let center = Point::new(screen.x.floor(), screen.y.floor());
        if !center.is_finite() {
            return false;
        }

        let node_config = &self.config.node;
        let resolver = &self.resolver;
        let (width, height) = (&mut shape.width, &mut shape.height);
        let handle = shape.state.apply(
            &mut self.surface,
            |surface| {
                let style = resolver.node_style(node);
                let family = style.text.font_family.as_deref().unwrap_or("sans-serif");
                *width = text_metrics::label_width(&node.label, style.text.font_size, family)
                    + node_config.padding_x;
                *height = text_metrics::line_height(style.text.font_size) + node_config.padding_y;
                let rect = BoundingBox::from_center(Point::ZERO, *width, *height);
                let body = surface.create_rect(&rect, &style.shape);
                let text = surface.create_text(Point::ZERO, &node.label, &style.text);
                surface.group(&[body, text])
            },
            |_, _| {},
        );
        self.surface.translate_group(handle, center);
        shape.bbox = Some(BoundingBox::from_center(center, shape.width, shape.height));
        true
    }

    /// Drawing handles of edge `index` in curve mode.
    pub fn edge_connector(&self, index: usize) -> Option<&Connector<S::Handle>> {
        match self.edges.get(index)? {
            EdgeDrawing::Curve(connector) => Some(connector),
            EdgeDrawing::Arrow(_) => None,
        }
    }

    /// Drawing handles of edge `index` in arrow mode.
    pub fn edge_arrow(&self, index: usize) -> Option<&ArrowConnector<S::Handle>> {
        match self.edges.get(index)? {
            EdgeDrawing::Arrow(arrow) => Some(arrow),
            EdgeDrawing::Curve(_) => None,
        }
    }

    /// Moves a node to where the pointer is, using the current mapping.
    pub fn drag_to(&mut self, id: &str, screen: Point) -> Result<()> {
        let snapshot = self.viewport.snapshot();
        self.drag_with_snapshot(id, screen, &snapshot)
    }

    /// Moves a node using a mapping captured earlier, e.g. when the drag began.
    pub fn drag_with_snapshot(&mut self, id: &str, screen: Point, snapshot: &ViewSnapshot) -> Result<()> {
        if !self.graph.nodes.contains_key(id) {
            return Err(Error::UnknownNode { id: id.to_string() });
        }
        let p = snapshot.from_screen(screen);
        debug!("drag {id} to screen {:?} -> simulation {:?}", screen, p);
        self.engine.set_position(id, p);
        Ok(())
    }

    /// Renders until the loop is cancelled.
    pub fn animate(&mut self, frames: &mut FrameLoop) {
        frames.run(|_| {
            self.frame();
            ControlFlow::Continue(())
        });
    }

    /// Renders exactly `count` frames back to back.
    pub fn render_frames(&mut self, frames: &mut FrameLoop, count: u64) -> FrameStats {
        let mut last = FrameStats::default();
        frames.run_for(count, |_| {
            last = self.frame();
            ControlFlow::Continue(())
        });
        last
    }
}
