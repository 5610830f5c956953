//! Classroom coloring engine
//!
//! Tint the paintable regions of an SVG coloring page, with undo, redo,
//! reset and export.
//!
//! # Core Concepts
//!
//! - [`ColoringCanvas`]: one open workspace (regions + history)
//! - [`Regions`]: indexed collection of [`Region`] records, addressed by [`RegionId`]
//! - [`History`]: undo/redo stacks of [`HistoryEntry`]
//! - [`SvgDocument`]: source markup; renders the collection back to SVG
//!
//! # Example
//!
//! ```rust,ignore
//! use classroom_coloring::{ColoringCanvas, ColoringConfig, RegionId};
//!
//! let mut canvas = ColoringCanvas::load(svg, ColoringConfig::new())?.with_title("Farm");
//! canvas.paint(RegionId(0), "#ff0000");
//! canvas.undo();
//! canvas.redo();
//!
//! let image = canvas.export()?;
//! image.save_to(downloads).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod canvas;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod history;
pub mod region;

// Re-exports
pub use canvas::{ColoringCanvas, PaintOutcome};
pub use config::ColoringConfig;
pub use document::SvgDocument;
pub use error::{ExportError, LoadError};
pub use export::{file_name_for, ExportedImage};
pub use history::{History, HistoryEntry};
pub use region::{Color, Region, RegionId, Regions, ShapeKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
