use std::path::Path;

use springview::config::{Config, EdgeMode};
use springview::connector::ConnectorStyle;
use springview::engine::{LayoutEngine, PinnedLayout};
use springview::geometry::{Point, ViewBox};
use springview::ir::{CompanyEntry, Edge, Graph, GraphDocument, Node};
use springview::render::{Element, SvgSurface};
use springview::style::{NodeStyle, StyleResolver};
use springview::surface::{ShapeStyle, TextStyle};
use springview::theme::Theme;
use springview::{Error, GraphView};

fn load_fixture(name: &str) -> (Graph, PinnedLayout) {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    GraphDocument::parse(&input)
        .expect("fixture parse failed")
        .into_parts()
        .expect("fixture graph invalid")
}

fn company_view(mode: EdgeMode) -> GraphView<PinnedLayout, SvgSurface> {
    let (graph, engine) = load_fixture("company.json5");
    let config = Config {
        edge_mode: mode,
        ..Config::default()
    };
    GraphView::svg(config, graph, engine).expect("view should start")
}

#[test]
fn renders_company_fixture() {
    let mut view = company_view(EdgeMode::Curve);
    for _ in 0..30 {
        view.frame();
    }
    let svg = view.surface().to_svg();
    assert!(svg.starts_with("<svg"));
    assert!(svg.ends_with("</svg>"));
    for label in ["Acme Holdings", "Acme North", "Northern Mills", "Advisors", "100%", "80%"] {
        assert!(svg.contains(&format!(">{label}</text>")), "missing label {label}");
    }
    assert!(svg.contains(">Southern Freight &amp; Co</text>"));
    assert_eq!(svg.matches("<path").count(), 5);
    assert_eq!(svg.matches("<g transform").count(), 6);
    assert!(svg.contains("#7c120d"));
}

#[test]
fn edges_paint_behind_nodes() {
    let mut view = company_view(EdgeMode::Curve);
    view.frame();
    view.frame();
    let svg = view.surface().to_svg();
    let last_path = svg.rfind("<path").unwrap();
    let first_group = svg.find("<g transform").unwrap();
    assert!(last_path < first_group);
}

#[test]
fn repeated_frames_never_duplicate_elements() {
    for mode in [EdgeMode::Curve, EdgeMode::Arrow] {
        let mut view = company_view(mode);
        let first = view.frame();
        assert_eq!(first.edges_skipped, 5);
        assert_eq!(first.nodes_drawn, 6);
        let second = view.frame();
        assert_eq!(second.edges_drawn, 5);
        let settled = view.surface().len();
        for _ in 0..50 {
            view.frame();
        }
        assert_eq!(view.surface().len(), settled, "{mode:?}");
    }
}

#[test]
fn arrow_mode_draws_heads() {
    let mut view = company_view(EdgeMode::Arrow);
    view.frame();
    view.frame();
    let svg = view.surface().to_svg();
    assert_eq!(svg.matches("<polygon").count(), 5);
    assert_eq!(svg.matches("<path").count(), 5);
}

#[test]
fn dragged_node_lands_under_the_pointer() {
    let mut view = company_view(EdgeMode::Curve);
    view.frame();
    let snapshot = view.viewport().snapshot();
    let pointer = snapshot.to_screen(Point::new(1.0, 1.0));
    view.drag_to("acme", pointer).unwrap();

    let moved = view.engine().position("acme").unwrap();
    assert!((moved.x - 1.0).abs() < 1e-3);
    assert!((moved.y - 1.0).abs() < 1e-3);

    view.frame();
    let center = view.node_box("acme").unwrap().center();
    assert!((center.x - pointer.x).abs() <= 1.0);
    assert!((center.y - pointer.y).abs() <= 1.0);
}

#[test]
fn unknown_drag_target_is_an_error() {
    let mut view = company_view(EdgeMode::Curve);
    let err = view.drag_to("nobody", Point::ZERO).unwrap_err();
    assert!(matches!(err, Error::UnknownNode { ref id } if id == "nobody"));
}

#[test]
fn zero_canvas_is_rejected() {
    let (graph, engine) = load_fixture("company.json5");
    let mut config = Config::default();
    config.canvas.width = 0.0;
    let result = GraphView::svg(config, graph, engine);
    assert!(matches!(result, Err(Error::EmptyCanvas { .. })));
}

#[test]
fn dangling_edges_are_rejected() {
    let mut graph = Graph::new();
    graph.ensure_node("a", None, None);
    graph.add_edge("a", "ghost", None, true);
    let result = GraphView::svg(Config::default(), graph, PinnedLayout::new());
    assert!(matches!(result, Err(Error::MissingEndpoint { .. })));
}

/// Engine whose nodes spread out a little every step.
struct Expanding {
    inner: PinnedLayout,
    ids: Vec<String>,
    scale: f32,
}

impl LayoutEngine for Expanding {
    fn bounding_box(&self) -> ViewBox {
        self.inner.bounding_box()
    }

    fn position(&self, node: &str) -> Option<Point> {
        self.inner.position(node)
    }

    fn set_position(&mut self, node: &str, p: Point) {
        self.inner.set_position(node, p);
    }

    fn step(&mut self) {
        if self.scale >= 3.0 {
            return;
        }
        self.scale += 0.1;
        for id in &self.ids {
            if let Some(p) = self.inner.position(id) {
                self.inner.set_position(id, p * 1.1);
            }
        }
    }
}

#[test]
fn viewport_follows_a_moving_engine() {
    let (graph, inner) = load_fixture("company.json5");
    let ids = graph.nodes.keys().cloned().collect();
    let engine = Expanding {
        inner,
        ids,
        scale: 1.0,
    };
    let surface = SvgSurface::new(800.0, 600.0, "#fff");
    let mut view = GraphView::new(
        Config::default(),
        graph,
        engine,
        surface,
        springview::style::ThemeResolver::default(),
    )
    .unwrap();

    let start = view.viewport().current();
    for _ in 0..400 {
        view.frame();
    }
    let current = view.viewport().current();
    let target = view.viewport().target();
    assert!(current.span().x > start.span().x);
    assert!(current.max_corner_delta(&target) < 1e-2);
}

struct Flat;

impl StyleResolver for Flat {
    fn node_style(&self, _node: &Node) -> NodeStyle {
        NodeStyle {
            shape: ShapeStyle {
                fill: "#abcdef".to_string(),
                stroke: "#abcdef".to_string(),
                stroke_width: 1.0,
                corner_radius: 0.0,
            },
            text: TextStyle {
                fill: "#ffffff".to_string(),
                font_size: 10.0,
                font_family: None,
            },
        }
    }

    fn edge_style(&self, edge: &Edge) -> ConnectorStyle {
        ConnectorStyle {
            directed: edge.directed,
            stroke: Some("#fedcba".to_string()),
            ..ConnectorStyle::default()
        }
    }

    fn edge_color(&self, _edge: &Edge) -> String {
        "#fedcba".to_string()
    }
}

#[test]
fn injected_resolver_controls_colours() {
    let (graph, engine) = load_fixture("company.json5");
    let surface = SvgSurface::new(800.0, 600.0, "#fff");
    let mut view = GraphView::new(Config::default(), graph, engine, surface, Flat).unwrap();
    view.frame();
    view.frame();
    let svg = view.into_surface().to_svg();
    assert!(svg.contains("#abcdef"));
    assert!(svg.contains("#fedcba"));
    assert!(!svg.contains("#7c120d"));
    assert!(!svg.contains(">100%</text>"));
}

#[test]
fn company_structure_edges_take_company_colours() {
    let structure = [
        CompanyEntry {
            name: "Acme Mills".to_string(),
            relationship: "subsidary".to_string(),
        },
        CompanyEntry {
            name: "Globex".to_string(),
            relationship: "Parent".to_string(),
        },
    ];
    let graph = Graph::from_company_structure("Acme", &structure).unwrap();
    let mut engine = PinnedLayout::new();
    engine.insert("Acme", Point::new(0.0, 0.0));
    engine.insert("Acme Mills", Point::new(-6.0, 4.0));
    engine.insert("Globex", Point::new(6.0, 4.0));
    let config = Config {
        edge_mode: EdgeMode::Arrow,
        ..Config::default()
    };
    let mut view = GraphView::svg(config, graph, engine).unwrap();
    view.frame();
    view.frame();

    let theme = Theme::company();
    for (index, colour) in [(0, &theme.company_color), (1, &theme.parent_company_color)] {
        let (line, head) = view.edge_arrow(index).unwrap().handles();
        match view.surface().element(line.unwrap()) {
            Some(Element::Path { stroke, .. }) => assert_eq!(&stroke.color, colour),
            other => panic!("expected a path, got {other:?}"),
        }
        match view.surface().element(head.unwrap()) {
            Some(Element::Polygon { style, .. }) => assert_eq!(&style.fill, colour),
            other => panic!("expected a polygon, got {other:?}"),
        }
    }
    assert!(!view.surface().to_svg().contains(&theme.other_color));
}
