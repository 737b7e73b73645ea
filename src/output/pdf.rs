//! PDF output encoder.
//!
//! Single-page vector PDF assembled by hand: one content stream of fill,
//! stroke and text operators plus a cross-reference table. Coordinates on
//! the encoder API are top-left-origin pixels like the SVG encoder; the
//! content stream flips them into PDF's bottom-left point space and scales
//! 100 px/inch down to 72 pt/inch.

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::TextAnchor;
use crate::color::Rgba;
use crate::error::Result;

/// Pixels per inch of the rendered layout.
const PX_PER_INCH: f32 = 100.0;
/// PDF points per inch.
const PT_PER_INCH: f32 = 72.0;

/// Approximate Helvetica advance per character, in ems.
///
/// Good enough for right- and center-anchoring axis labels; exact metrics
/// would need the AFM tables.
const APPROX_ADVANCE_EM: f32 = 0.52;

/// PDF encoder for single-page vector output.
#[derive(Debug, Clone)]
pub struct PdfEncoder {
    /// Page width in pixels.
    width: u32,
    /// Page height in pixels.
    height: u32,
    /// Content stream operators (inside the q..Q scale wrapper).
    ops: String,
}

impl PdfEncoder {
    /// Create a new encoder for a page of `width` x `height` pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut encoder = Self { width, height, ops: String::with_capacity(4096) };
        // White page background
        let (w, h) = (width as f32, height as f32);
        encoder.set_fill(Rgba::WHITE);
        let _ = writeln!(encoder.ops, "0 0 {w:.2} {h:.2} re f");
        encoder
    }

    fn set_fill(&mut self, color: Rgba) {
        let _ = writeln!(
            self.ops,
            "{:.3} {:.3} {:.3} rg",
            f32::from(color.r) / 255.0,
            f32::from(color.g) / 255.0,
            f32::from(color.b) / 255.0
        );
    }

    fn set_stroke(&mut self, color: Rgba, width: f32) {
        let _ = writeln!(
            self.ops,
            "{:.3} {:.3} {:.3} RG {width:.2} w",
            f32::from(color.r) / 255.0,
            f32::from(color.g) / 255.0,
            f32::from(color.b) / 255.0
        );
    }

    /// Flip a top-left-origin y to PDF space.
    fn flip_y(&self, y: f32) -> f32 {
        self.height as f32 - y
    }

    /// Add a filled rectangle.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgba) {
        self.set_fill(fill);
        let _ = writeln!(
            self.ops,
            "{x:.2} {:.2} {width:.2} {height:.2} re f",
            self.flip_y(y + height)
        );
    }

    /// Add a filled rectangle with an outline, optionally dotted.
    #[allow(clippy::too_many_arguments)]
    pub fn rect_outlined(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgba,
        stroke: Rgba,
        stroke_width: f32,
        dashed: bool,
    ) {
        self.set_fill(fill);
        self.set_stroke(stroke, stroke_width);
        if dashed {
            let _ = writeln!(self.ops, "[{:.2} {:.2}] 0 d", stroke_width, stroke_width * 2.0);
        }
        let _ = writeln!(
            self.ops,
            "{x:.2} {:.2} {width:.2} {height:.2} re B",
            self.flip_y(y + height)
        );
        if dashed {
            let _ = writeln!(self.ops, "[] 0 d");
        }
    }

    /// Add a line.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgba, stroke_width: f32) {
        self.set_stroke(stroke, stroke_width);
        let _ = writeln!(
            self.ops,
            "{x1:.2} {:.2} m {x2:.2} {:.2} l S",
            self.flip_y(y1),
            self.flip_y(y2)
        );
    }

    /// Add horizontal text with its baseline at `(x, y)`.
    pub fn text(&mut self, x: f32, y: f32, text: &str, font_size: f32, anchor: TextAnchor) {
        let x = x - anchor_offset(text, font_size, anchor);
        self.set_fill(Rgba::BLACK);
        let _ = writeln!(
            self.ops,
            "BT /F1 {font_size:.2} Tf {x:.2} {:.2} Td ({}) Tj ET",
            self.flip_y(y),
            escape_pdf(text)
        );
    }

    /// Add text rotated a quarter turn counter-clockwise (reading
    /// bottom-to-top), baseline starting at `(x, y)`.
    pub fn text_up(&mut self, x: f32, y: f32, text: &str, font_size: f32, anchor: TextAnchor) {
        let shift = anchor_offset(text, font_size, anchor);
        self.set_fill(Rgba::BLACK);
        let _ = writeln!(
            self.ops,
            "BT /F1 {font_size:.2} Tf 0 1 -1 0 {x:.2} {:.2} Tm ({}) Tj ET",
            self.flip_y(y) - shift,
            escape_pdf(text)
        );
    }

    /// Assemble the PDF document bytes.
    #[must_use]
    pub fn render(&self) -> Vec<u8> {
        let scale = PT_PER_INCH / PX_PER_INCH;
        let page_w = self.width as f32 * scale;
        let page_h = self.height as f32 * scale;

        let stream = format!("q {scale:.4} 0 0 {scale:.4} 0 0 cm\n{}Q\n", self.ops);

        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {page_w:.2} {page_h:.2}] \
                 /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
            format!("<< /Length {} >>\nstream\n{stream}endstream", stream.len()),
        ];

        let mut out: Vec<u8> = Vec::with_capacity(stream.len() + 1024);
        out.extend_from_slice(b"%PDF-1.4\n");

        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
        }

        let xref_offset = out.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in &offsets {
            let _ = writeln!(xref, "{offset:010} 00000 n ");
        }
        out.extend_from_slice(xref.as_bytes());
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(&self.render())?;
        Ok(())
    }
}

/// Baseline shift that realizes the anchor, in px.
fn anchor_offset(text: &str, font_size: f32, anchor: TextAnchor) -> f32 {
    let advance = text.chars().count() as f32 * font_size * APPROX_ADVANCE_EM;
    match anchor {
        TextAnchor::Start => 0.0,
        TextAnchor::Middle => advance / 2.0,
        TextAnchor::End => advance,
    }
}

/// Escape characters with special meaning inside PDF string literals.
fn escape_pdf(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '(' => escaped.push_str("\\("),
            ')' => escaped.push_str("\\)"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_string(encoder: &PdfEncoder) -> String {
        String::from_utf8_lossy(&encoder.render()).into_owned()
    }

    #[test]
    fn test_pdf_header_and_trailer() {
        let pdf = render_string(&PdfEncoder::new(100, 100));
        assert!(pdf.starts_with("%PDF-1.4"));
        assert!(pdf.contains("/Type /Catalog"));
        assert!(pdf.contains("/BaseFont /Helvetica"));
        assert!(pdf.ends_with("%%EOF\n"));
    }

    #[test]
    fn test_pdf_media_box_is_scaled_to_points() {
        let pdf = render_string(&PdfEncoder::new(100, 200));
        // 100 px at 100 px/inch = 1 inch = 72 pt
        assert!(pdf.contains("/MediaBox [0 0 72.00 144.00]"));
    }

    #[test]
    fn test_pdf_rect_flips_y() {
        let mut encoder = PdfEncoder::new(100, 100);
        encoder.rect(10.0, 20.0, 30.0, 40.0, Rgba::BLACK);
        let pdf = render_string(&encoder);
        // Lower-left corner: y = 100 - (20 + 40) = 40
        assert!(pdf.contains("10.00 40.00 30.00 40.00 re f"));
    }

    #[test]
    fn test_pdf_text_escaping() {
        let mut encoder = PdfEncoder::new(100, 100);
        encoder.text(0.0, 0.0, "a(b)c\\d", 10.0, TextAnchor::Start);
        let pdf = render_string(&encoder);
        assert!(pdf.contains("(a\\(b\\)c\\\\d) Tj"));
    }

    #[test]
    fn test_pdf_rotated_text_matrix() {
        let mut encoder = PdfEncoder::new(100, 100);
        encoder.text_up(5.0, 95.0, "Star", 8.0, TextAnchor::Start);
        let pdf = render_string(&encoder);
        assert!(pdf.contains("0 1 -1 0 5.00"));
    }

    #[test]
    fn test_pdf_stream_length_matches() {
        let mut encoder = PdfEncoder::new(50, 50);
        encoder.line(0.0, 0.0, 50.0, 50.0, Rgba::GREY, 1.0);
        let pdf = render_string(&encoder);

        let length: usize = pdf
            .split("/Length ")
            .nth(1)
            .and_then(|rest| rest.split(' ').next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        let start = pdf.find("stream\n").unwrap() + "stream\n".len();
        let end = pdf.find("endstream").unwrap();
        assert_eq!(end - start, length);
    }

    #[test]
    fn test_pdf_xref_offsets_point_at_objects() {
        let pdf = render_string(&PdfEncoder::new(100, 100));
        let bytes = pdf.as_bytes();

        let xref_at = pdf.find("xref\n").unwrap();
        for (i, line) in pdf[xref_at..].lines().skip(3).take(5).enumerate() {
            let offset: usize = line[..10].parse().unwrap();
            let tag = format!("{} 0 obj", i + 1);
            assert_eq!(&bytes[offset..offset + tag.len()], tag.as_bytes());
        }
    }

    #[test]
    fn test_pdf_write_to_file() {
        let mut encoder = PdfEncoder::new(60, 60);
        encoder.rect(0.0, 0.0, 60.0, 60.0, Rgba::rgb(30, 30, 200));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        encoder.write_to_file(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }
}

impl super::VectorCanvas for PdfEncoder {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgba) {
        self.rect(x, y, width, height, fill);
    }

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
    ) {
        self.rect_outlined(x, y, width, height, fill, stroke, stroke_width, dashed);
    }

    fn stroke_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgba, width: f32) {
        self.line(x1, y1, x2, y2, stroke, width);
    }

    fn label(&mut self, x: f32, y: f32, text: &str, font_size: f32, anchor: TextAnchor) {
        self.text(x, y, text, font_size, anchor);
    }

    fn label_up(&mut self, x: f32, y: f32, text: &str, font_size: f32, anchor: TextAnchor) {
        self.text_up(x, y, text, font_size, anchor);
    }
}
