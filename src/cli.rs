use crate::config::{Config, EdgeMode, load_config};
use crate::ir::GraphDocument;
use crate::render::write_output_svg;
use crate::scheduler::FrameLoop;
use crate::view::GraphView;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "springview", version, about = "Renders a positioned graph to SVG or PNG")]
pub struct Args {
    /// Graph file (JSON5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width, overrides the config file
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height, overrides the config file
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Frames to run before writing the scene
    #[arg(long = "frames", default_value_t = 120)]
    pub frames: u64,

    /// Edge drawing mode
    #[arg(long = "mode", value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ModeArg {
    Curve,
    Arrow,
}

impl From<ModeArg> for EdgeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Curve => EdgeMode::Curve,
            ModeArg::Arrow => EdgeMode::Arrow,
        }
    }
}

pub fn run() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.canvas.width = width;
    }
    if let Some(height) = args.height {
        config.canvas.height = height;
    }
    if let Some(mode) = args.mode {
        config.edge_mode = mode.into();
    }
    config.validate()?;

    let input = read_input(args.input.as_deref())?;
    let svg = render_document(&input, config.clone(), args.frames)?;
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

/// Parses a graph document, runs `frames` frames headlessly and returns the final scene.
pub fn render_document(input: &str, config: Config, frames: u64) -> Result<String> {
    let (graph, engine) = GraphDocument::parse(input)?.into_parts()?;
    let interval = Duration::from_millis(config.viewport.frame_interval_ms);
    let mut view = GraphView::svg(config, graph, engine)?;
    let (mut frame_loop, _handle) = FrameLoop::start(interval);
    let stats = view.render_frames(&mut frame_loop, frames);
    info!(
        "rendered {} frames: {} nodes, {} edges drawn",
        frame_loop.frames(),
        stats.nodes_drawn,
        stats.edges_drawn
    );
    Ok(view.surface().to_svg())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(
        svg,
        output,
        config.canvas.width,
        config.canvas.height,
        &config.theme.font_family,
    )
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the 'png' feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
  nodes: [
    { id: "root", label: "Holding", category: "root", x: 0, y: 0 },
    { id: "sub", label: "Subsidiary", category: "company", x: 4, y: 3 },
  ],
  edges: [{ source: "root", target: "sub", label: "100%" }],
}"#;

    #[test]
    fn png_needs_an_output_path() {
        assert!(ensure_output(&None, "png").is_err());
        let path = PathBuf::from("out.png");
        assert_eq!(ensure_output(&Some(path.clone()), "png").unwrap(), path);
    }

    #[test]
    fn renders_document_to_svg() {
        let svg = render_document(DOC, Config::default(), 10).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Holding"));
        assert!(svg.contains("Subsidiary"));
        assert!(svg.contains(">100%</text>"));
        assert!(svg.contains("<path"));
    }

    #[test]
    fn mode_argument_maps_to_edge_mode() {
        assert_eq!(EdgeMode::from(ModeArg::Arrow), EdgeMode::Arrow);
        assert_eq!(EdgeMode::from(ModeArg::Curve), EdgeMode::Curve);
    }

    #[test]
    fn args_parse_short_flags() {
        let args = Args::parse_from([
            "springview", "-i", "g.json5", "-e", "png", "-o", "g.png", "-w", "640", "--mode", "arrow",
        ]);
        assert_eq!(args.width, Some(640.0));
        assert_eq!(args.height, None);
        assert_eq!(args.frames, 120);
        assert!(matches!(args.output_format, OutputFormat::Png));
        assert!(matches!(args.mode, Some(ModeArg::Arrow)));
    }
}
