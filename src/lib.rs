#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod connector;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod render;
pub mod scheduler;
pub mod style;
pub mod surface;
pub mod text_metrics;
pub mod theme;
pub mod view;
pub mod viewport;

#[cfg(feature = "cli")]
pub use cli::run;
pub use error::{Error, Result};
pub use view::GraphView;
