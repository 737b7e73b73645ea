//! Dispatch heatmap rendering.
//!
//! Turns a [`CounterMatrix`] into a color-mapped grid: column headers on
//! top (rotated), row headers on the left, a logarithmic color scale and a
//! color-bar legend on the right. Counts span many orders of magnitude,
//! so the color domain runs log10 from the smallest nonzero count to the
//! largest; zero cells stay background white.
//!
//! One layout feeds three outputs: a raster framebuffer (PNG and the
//! interactive window) and the two vector encoders (SVG, PDF).

use std::path::Path;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::framebuffer::Framebuffer;
use crate::matrix::CounterMatrix;
use crate::output::{
    PdfEncoder, PlotFormat, PngEncoder, SvgEncoder, TextAnchor, VectorCanvas,
};
use crate::scale::{ColorScale, LogScale, Palette, Scale};
use crate::text;

/// Default shorter-edge size in pixels (30 inches at 100 px/inch).
pub const DEFAULT_SIDE_PX: u32 = 3000;

/// Cell border color.
const GRID_COLOR: Rgba = Rgba::GREY;

/// Builder for rendering a dispatch heatmap.
#[derive(Debug, Clone)]
pub struct DispatchHeatmap {
    /// The dense counter matrix with its axis labels.
    matrix: CounterMatrix,
    /// Target size in pixels of the figure's shorter edge.
    side: u32,
    /// Color palette.
    palette: Palette,
}

/// Pixel geometry shared by the raster and vector paths.
#[derive(Debug, Clone, Copy)]
struct Layout {
    /// Cell side in px.
    cell: u32,
    /// Integer font scale for the 5x7 raster font.
    font: u32,
    /// Grid origin x (left label margin).
    left: u32,
    /// Grid origin y (top label margin).
    top: u32,
    /// Grid side in px.
    grid: u32,
    /// Colorbar strip x origin.
    bar_x: u32,
    /// Colorbar strip width.
    bar_w: u32,
    /// Total figure width.
    width: u32,
    /// Total figure height.
    height: u32,
    /// Margin unit.
    pad: u32,
}

impl DispatchHeatmap {
    /// Create a heatmap builder over a counter matrix.
    #[must_use]
    pub fn new(matrix: CounterMatrix) -> Self {
        Self {
            matrix,
            side: DEFAULT_SIDE_PX,
            palette: Palette::default(),
        }
    }

    /// Set the target shorter-edge size in pixels.
    #[must_use]
    pub fn side(mut self, side: u32) -> Self {
        self.side = side;
        self
    }

    /// Set the color palette.
    #[must_use]
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Validate the builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyData`] for an empty matrix and
    /// [`Error::InvalidDimensions`] for a zero target size.
    pub fn build(self) -> Result<Self> {
        if self.matrix.is_empty() {
            return Err(Error::EmptyData);
        }
        if self.side == 0 {
            return Err(Error::InvalidDimensions { width: self.side, height: self.side });
        }
        Ok(self)
    }

    /// The matrix being rendered.
    #[must_use]
    pub const fn matrix(&self) -> &CounterMatrix {
        &self.matrix
    }

    fn layout(&self) -> Layout {
        let n = self.matrix.size().max(1) as u32;

        // Font scale tracks how much room a cell will get
        let font = (self.side / (n * 12)).clamp(1, 4);
        let pad = 2 + 2 * font;

        let longest = self
            .matrix
            .column_labels()
            .iter()
            .map(|l| text::text_width(l, font))
            .max()
            .unwrap_or(0);

        let left = longest + 2 * pad;
        let top = longest + 2 * pad;

        let cell = ((self.side.saturating_sub(top + pad)) / n).max(1);
        let grid = cell * n;

        let bar_x = left + grid + 2 * pad;
        let bar_w = (grid / 50).clamp(6, 24);
        // Room for "1e19"-style tick labels
        let tick_w = text::text_width("1e19", font) + pad;
        let width = bar_x + bar_w + tick_w + pad;
        let height = top + grid + pad;

        Layout { cell, font, left, top, grid, bar_x, bar_w, width, height, pad }
    }

    /// Log-domain color scale over the nonzero counts, or `None` when the
    /// matrix holds no positive count at all.
    fn scales(&self) -> Option<(LogScale, ColorScale)> {
        let dmin = self.matrix.min_positive()? as f32;
        let dmax = self.matrix.max_value() as f32;
        let log = LogScale::new((dmin, dmax), (0.0, 1.0)).ok()?;
        let colors = self.palette.color_scale((0.0, 1.0))?;
        Some((log, colors))
    }

    fn cell_color(scales: &(LogScale, ColorScale), count: u64) -> Option<Rgba> {
        if count == 0 {
            return None;
        }
        let (log, colors) = scales;
        Some(colors.scale(log.scale(count as f32)))
    }

    /// Powers of ten covered by the color domain, for color-bar ticks.
    fn decade_ticks(&self) -> Vec<u64> {
        let Some(dmin) = self.matrix.min_positive() else {
            return Vec::new();
        };
        let dmax = self.matrix.max_value();

        let mut ticks = Vec::new();
        let mut decade = 1u64;
        loop {
            if decade >= dmin && decade <= dmax {
                ticks.push(decade);
            }
            match decade.checked_mul(10) {
                Some(next) if next <= dmax => decade = next,
                _ => break,
            }
        }
        ticks
    }

    // ------------------------------------------------------------------
    // Raster path
    // ------------------------------------------------------------------

    /// Render to a new framebuffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the computed figure dimensions are invalid.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let layout = self.layout();
        let mut fb = Framebuffer::new(layout.width, layout.height)?;
        fb.clear(Rgba::WHITE);
        self.render(&mut fb, &layout);
        Ok(fb)
    }

    fn render(&self, fb: &mut Framebuffer, layout: &Layout) {
        let n = self.matrix.size();
        let scales = self.scales();

        // Cells
        if let Some(ref scales) = scales {
            for row in 0..n {
                for col in 0..n {
                    if let Some(color) = Self::cell_color(scales, self.matrix.get(row, col)) {
                        fb.fill_rect(
                            layout.left + (col as u32) * layout.cell,
                            layout.top + (row as u32) * layout.cell,
                            layout.cell,
                            layout.cell,
                            color,
                        );
                    }
                }
            }
        }

        // Hairline grid, skipped when cells are too small to keep readable
        if layout.cell >= 4 {
            for i in 0..=n as u32 {
                fb.fill_rect(layout.left + i * layout.cell, layout.top, 1, layout.grid, GRID_COLOR);
                fb.fill_rect(layout.left, layout.top + i * layout.cell, layout.grid, 1, GRID_COLOR);
            }
        }

        self.render_labels(fb, layout);
        if let Some(ref scales) = scales {
            self.render_colorbar(fb, layout, scales);
        }
    }

    fn render_labels(&self, fb: &mut Framebuffer, layout: &Layout) {
        let glyph_h = text::text_height(layout.font);

        for (col, name) in self.matrix.column_labels().iter().enumerate() {
            let x = layout.left + (col as u32) * layout.cell
                + (layout.cell.saturating_sub(glyph_h)) / 2;
            let y = layout.top.saturating_sub(layout.pad);
            text::draw_text_up(fb, x, y, name, layout.font, Rgba::BLACK);
        }

        for (row, name) in self.matrix.row_labels().iter().enumerate() {
            let width = text::text_width(name, layout.font);
            let x = layout.left.saturating_sub(layout.pad + width);
            let y = layout.top + (row as u32) * layout.cell
                + (layout.cell.saturating_sub(glyph_h)) / 2;
            text::draw_text(fb, x, y, name, layout.font, Rgba::BLACK);
        }
    }

    fn render_colorbar(
        &self,
        fb: &mut Framebuffer,
        layout: &Layout,
        scales: &(LogScale, ColorScale),
    ) {
        let (_, colors) = scales;

        // Gradient strip, bottom = domain minimum
        for dy in 0..layout.grid {
            let t = 1.0 - (dy as f32) / (layout.grid.max(1) as f32);
            fb.fill_rect(layout.bar_x, layout.top + dy, layout.bar_w, 1, colors.scale(t));
        }

        let (log, _) = scales;
        for decade in self.decade_ticks() {
            let t = log.scale(decade as f32).clamp(0.0, 1.0);
            let y = layout.top + layout.grid - (t * layout.grid as f32) as u32;
            fb.fill_rect(layout.bar_x + layout.bar_w, y, layout.pad / 2 + 1, 1, Rgba::BLACK);
            text::draw_text(
                fb,
                layout.bar_x + layout.bar_w + layout.pad,
                y.saturating_sub(text::text_height(layout.font) / 2),
                &tick_label(decade),
                layout.font,
                Rgba::BLACK,
            );
        }
    }

    // ------------------------------------------------------------------
    // Vector path
    // ------------------------------------------------------------------

    /// Render to an SVG document.
    #[must_use]
    pub fn to_svg(&self) -> SvgEncoder {
        let layout = self.layout();
        let mut svg = SvgEncoder::new(layout.width, layout.height);
        self.paint_vector(&mut svg, &layout);
        svg
    }

    /// Render to a single-page PDF document.
    #[must_use]
    pub fn to_pdf(&self) -> PdfEncoder {
        let layout = self.layout();
        let mut pdf = PdfEncoder::new(layout.width, layout.height);
        self.paint_vector(&mut pdf, &layout);
        pdf
    }

    fn paint_vector<C: VectorCanvas>(&self, canvas: &mut C, layout: &Layout) {
        let n = self.matrix.size();
        let scales = self.scales();
        let font_size = (text::text_height(layout.font) + layout.font) as f32;
        let cell = layout.cell as f32;
        let hairline = (layout.font as f32) * 0.25;

        // Cells with a dotted grey border, the classic dispatch-grid look
        for row in 0..n {
            for col in 0..n {
                let count = self.matrix.get(row, col);
                let fill = scales
                    .as_ref()
                    .and_then(|s| Self::cell_color(s, count))
                    .unwrap_or(Rgba::WHITE);
                canvas.cell_rect(
                    (layout.left + (col as u32) * layout.cell) as f32,
                    (layout.top + (row as u32) * layout.cell) as f32,
                    cell,
                    cell,
                    fill,
                    GRID_COLOR,
                    hairline,
                    true,
                );
            }
        }

        // Column headers on top, rotated, reading bottom-to-top
        for (col, name) in self.matrix.column_labels().iter().enumerate() {
            let x = (layout.left + (col as u32) * layout.cell) as f32 + (cell + font_size) / 2.0;
            let y = (layout.top - layout.pad) as f32;
            canvas.label_up(x, y, name, font_size, TextAnchor::Start);
        }

        // Row headers on the left, right-aligned against the grid
        for (row, name) in self.matrix.row_labels().iter().enumerate() {
            let x = (layout.left - layout.pad) as f32;
            let y = (layout.top + (row as u32) * layout.cell) as f32 + (cell + font_size) / 2.0;
            canvas.label(x, y, name, font_size, TextAnchor::End);
        }

        if let Some((log, colors)) = scales {
            self.paint_vector_colorbar(canvas, layout, &log, &colors, font_size);
        }
    }

    fn paint_vector_colorbar<C: VectorCanvas>(
        &self,
        canvas: &mut C,
        layout: &Layout,
        log: &LogScale,
        colors: &ColorScale,
        font_size: f32,
    ) {
        // Gradient approximated by a stack of thin rects
        let steps = 64u32;
        let step_h = layout.grid as f32 / steps as f32;
        for i in 0..steps {
            let t = 1.0 - (i as f32 + 0.5) / steps as f32;
            canvas.fill_rect(
                layout.bar_x as f32,
                layout.top as f32 + i as f32 * step_h,
                layout.bar_w as f32,
                step_h + 0.5,
                colors.scale(t),
            );
        }

        let bar_right = (layout.bar_x + layout.bar_w) as f32;
        for decade in self.decade_ticks() {
            let t = log.scale(decade as f32).clamp(0.0, 1.0);
            let y = (layout.top + layout.grid) as f32 - t * layout.grid as f32;
            canvas.stroke_line(
                bar_right,
                y,
                bar_right + (layout.pad / 2) as f32,
                y,
                Rgba::BLACK,
                1.0,
            );
            canvas.label(
                bar_right + layout.pad as f32,
                y + font_size / 3.0,
                &tick_label(decade),
                font_size,
                TextAnchor::Start,
            );
        }
    }

    // ------------------------------------------------------------------
    // File output
    // ------------------------------------------------------------------

    /// Save the heatmap to `path`; the extension picks the format.
    ///
    /// # Errors
    ///
    /// Returns an error for an unsupported extension or a failed write.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        match PlotFormat::from_path(&path)? {
            PlotFormat::Svg => self.to_svg().write_to_file(path),
            PlotFormat::Pdf => self.to_pdf().write_to_file(path),
            PlotFormat::Png => PngEncoder::write_to_file(&self.to_framebuffer()?, path),
        }
    }
}

/// Compact power-of-ten tick label: 1, 10, then 1e2 upward.
fn tick_label(decade: u64) -> String {
    if decade < 100 {
        decade.to_string()
    } else {
        format!("1e{}", decade.ilog10())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::DispatchTable;

    fn heatmap(json: &str) -> DispatchHeatmap {
        let table = DispatchTable::from_json_str(json).unwrap();
        DispatchHeatmap::new(CounterMatrix::from_table(&table))
            .side(400)
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_matrix_rejected() {
        let table = DispatchTable::from_json_str("{}").unwrap();
        let result = DispatchHeatmap::new(CounterMatrix::from_table(&table)).build();
        assert!(matches!(result, Err(Error::EmptyData)));
    }

    #[test]
    fn test_zero_side_rejected() {
        let table = DispatchTable::from_json_str(r#"{"A": {"A": 1}}"#).unwrap();
        let result = DispatchHeatmap::new(CounterMatrix::from_table(&table)).side(0).build();
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_raster_render() {
        let hm = heatmap(r#"{"A": {"A": 1, "B": 20}, "B": {"A": 300}}"#);
        let fb = hm.to_framebuffer().unwrap();
        assert!(fb.width() > 0);
        // Shorter edge tracks the requested side
        assert!(fb.height() <= 400);
    }

    #[test]
    fn test_raster_all_zero_counts() {
        let hm = heatmap(r#"{"A": {"B": 0}, "B": {}}"#);
        let fb = hm.to_framebuffer().unwrap();
        // No positive counts: everything stays background/grid colors
        assert!(fb.pixel_count() > 0);
    }

    #[test]
    fn test_svg_contains_labels_and_cells() {
        let hm = heatmap(r#"{"LdaZero": {"Star": 7}, "Star": {"LdaZero": 3}}"#);
        let svg = hm.to_svg().render();

        assert!(svg.contains("LdaZero"));
        assert!(svg.contains("Star"));
        // 2x2 cells plus background and colorbar rects
        assert!(svg.matches("<rect").count() >= 5);
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_svg_excludes_destination_only_names() {
        let hm = heatmap(r#"{"A": {"Zed": 5, "A": 2}}"#);
        let svg = hm.to_svg().render();
        assert!(!svg.contains("Zed"));
    }

    #[test]
    fn test_pdf_contains_labels() {
        let hm = heatmap(r#"{"Add": {"Sub": 9}, "Sub": {"Add": 2}}"#);
        let pdf = String::from_utf8_lossy(&hm.to_pdf().render()).into_owned();
        assert!(pdf.contains("(Add) Tj"));
        assert!(pdf.contains("(Sub) Tj"));
    }

    #[test]
    fn test_save_by_extension() {
        let hm = heatmap(r#"{"A": {"B": 4}, "B": {"A": 2}}"#);
        let dir = tempfile::tempdir().unwrap();

        for name in ["t.svg", "t.png", "t.pdf"] {
            let path = dir.path().join(name);
            hm.save(&path).unwrap();
            assert!(path.exists());
        }

        assert!(hm.save(dir.path().join("t.gif")).is_err());
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(tick_label(1), "1");
        assert_eq!(tick_label(10), "10");
        assert_eq!(tick_label(100), "1e2");
        assert_eq!(tick_label(1_000_000), "1e6");
    }

    #[test]
    fn test_decade_ticks_span_domain() {
        let hm = heatmap(r#"{"A": {"A": 5, "B": 120000}, "B": {"A": 37}}"#);
        let ticks = hm.decade_ticks();
        assert_eq!(ticks, vec![10, 100, 1000, 10_000, 100_000]);
    }

    #[test]
    fn test_single_count_degenerate_domain() {
        // One distinct nonzero value must still render
        let hm = heatmap(r#"{"A": {"A": 42}}"#);
        assert!(hm.to_framebuffer().is_ok());
        let svg = hm.to_svg().render();
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let hm = heatmap(r#"{"A": {"B": 11}, "B": {"A": 3}}"#);
        assert_eq!(hm.to_svg().render(), hm.to_svg().render());
        assert_eq!(hm.to_framebuffer().unwrap().pixels(), hm.to_framebuffer().unwrap().pixels());
    }
}
