//! Output encoders (PNG, SVG, PDF) and plot format selection.

mod pdf;
mod png_encoder;
mod svg;

pub use pdf::PdfEncoder;
pub use png_encoder::PngEncoder;
pub use svg::{SvgElement, SvgEncoder, TextAnchor};

use std::path::Path;

use crate::color::Rgba;
use crate::error::{Error, Result};

/// Drawing surface shared by the vector encoders, so the heatmap paints
/// SVG and PDF output through one code path.
pub trait VectorCanvas {
    /// Filled rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgba);

    /// Filled rectangle with an outline, optionally dotted.
    #[allow(clippy::too_many_arguments)]
    fn cell_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgba,
        stroke: Rgba,
        stroke_width: f32,
        dashed: bool,
    );

    /// Straight line.
    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgba, width: f32);

    /// Horizontal text with baseline at `(x, y)`.
    fn label(&mut self, x: f32, y: f32, text: &str, font_size: f32, anchor: TextAnchor);

    /// Text rotated a quarter turn counter-clockwise, reading bottom-to-top.
    fn label_up(&mut self, x: f32, y: f32, text: &str, font_size: f32, anchor: TextAnchor);
}

/// Plot output format, deduced from the output filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotFormat {
    /// Scalable Vector Graphics.
    Svg,
    /// Portable Network Graphics raster.
    Png,
    /// Portable Document Format, single page.
    Pdf,
}

impl PlotFormat {
    /// Deduce the format from a path's extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] when the extension is missing
    /// or names no supported format.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            _ => Err(Error::UnsupportedFormat { extension }),
        }
    }
}
