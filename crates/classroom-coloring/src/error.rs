//! Error types for loading and exporting images
//!
//! Paint, undo and redo never fail; only the markup boundaries do.

use std::path::PathBuf;

/// Errors while loading SVG source
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Malformed markup
    #[error("invalid svg markup at byte {position}: {message}")]
    Markup {
        /// Byte offset where the reader stopped
        position: u64,
        /// Reader message
        message: String,
    },

    /// Document contains no `<svg>` element
    #[error("document has no <svg> root")]
    NotSvg,

    /// IO error reading the image
    #[error("io error reading {path}: {source}")]
    Io {
        /// Image path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Errors while exporting the colored image
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Markup could not be rewritten
    #[error("failed to render svg: {0}")]
    Render(String),

    /// IO error writing the file
    #[error("io error writing {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}
