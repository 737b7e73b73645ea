//! # dispatch-report
//!
//! Offline analysis of interpreter bytecode-handler dispatch counters.
//!
//! Reads a precomputed counters table (source handler -> destination
//! handler -> invocation count) and derives either a textual ranking
//! report or a log-color-scaled dispatch heatmap, for performance
//! engineers inspecting interpreter dispatch behavior.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dispatch_report::prelude::*;
//!
//! let table = DispatchTable::from_path("dispatches.json")?;
//!
//! // The ten hottest dispatch pairs
//! for pair in top_pairs(&table, 10) {
//!     println!("{:>12}\t{} -> {}", pair.count, pair.source, pair.destination);
//! }
//!
//! // Render the heatmap
//! DispatchHeatmap::new(CounterMatrix::from_table(&table))
//!     .build()?
//!     .save("dispatches.svg")?;
//! ```
//!
//! One-shot batch model: the table is loaded once, read-only from then on,
//! and every derived ranking or matrix is recomputed from it on demand.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in graphics/visualization code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

// ============================================================================
// Core Modules
// ============================================================================

/// The dispatch counter table and its saturation check.
pub mod table;

/// Ranking engine: top dispatch pairs and per-source totals.
pub mod rank;

/// Dense counter matrix construction for visualization.
pub mod matrix;

// ============================================================================
// Rendering Modules
// ============================================================================

/// Color types for heatmap rendering.
pub mod color;

/// Scale functions for data-to-visual mappings.
pub mod scale;

/// RGBA framebuffer for raster output.
pub mod framebuffer;

/// Raster text for axis labels.
pub mod text;

/// Dispatch heatmap rendering.
pub mod heatmap;

/// Output encoders (PNG, SVG, PDF) and format selection.
pub mod output;

/// Interactive heatmap viewer.
pub mod view;

// ============================================================================
// Command Line
// ============================================================================

/// Command-line surface and report printing.
pub mod cli;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for dispatch-report operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and functions for convenient imports.
///
/// ```rust,ignore
/// use dispatch_report::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Rgba;
    pub use crate::error::{Error, Result};
    pub use crate::framebuffer::Framebuffer;
    pub use crate::heatmap::DispatchHeatmap;
    pub use crate::matrix::CounterMatrix;
    pub use crate::output::{PdfEncoder, PlotFormat, PngEncoder, SvgEncoder};
    pub use crate::rank::{top_bytecodes, top_pairs, DispatchPair, SourceTotal};
    pub use crate::scale::{ColorScale, LogScale, Palette, Scale};
    pub use crate::table::{counter_max, DispatchTable, DEFAULT_COUNTER_MAX};
}
