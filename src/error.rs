//! Error types for dispatch-report operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dispatch-report operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed counters JSON (syntax or shape).
    #[error("counters JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally valid JSON that violates a table invariant.
    #[error("invalid dispatch table: {0}")]
    InvalidTable(String),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Invalid dimensions for framebuffer or plot.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Empty data provided where non-empty is required.
    #[error("empty data provided")]
    EmptyData,

    /// Scale domain error (e.g., log of non-positive value).
    #[error("scale domain error: {0}")]
    ScaleDomain(String),

    /// Output filename extension does not name a supported plot format.
    #[error("unsupported plot format {extension:?} (supported: svg, png, pdf)")]
    UnsupportedFormat {
        /// The offending extension, lowercased.
        extension: String,
    },

    /// Interactive window error.
    #[error("window error: {0}")]
    Window(String),
}
