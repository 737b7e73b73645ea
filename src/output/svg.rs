//! SVG output encoder.
//!
//! Vector output for the dispatch heatmap: filled cell rectangles, grid
//! lines and real text for the axis labels, so the result stays crisp at
//! any zoom and the handler names remain searchable.

use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::color::Rgba;
use crate::error::Result;

/// SVG encoder assembling an element list into a document.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    /// SVG width.
    width: u32,
    /// SVG height.
    height: u32,
    /// Background color (None for transparent).
    background: Option<Rgba>,
    /// SVG elements in paint order.
    elements: Vec<SvgElement>,
}

/// An SVG element.
///
/// Field names match SVG attribute names.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum SvgElement {
    /// Rectangle
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Rgba,
        stroke: Option<Rgba>,
        stroke_width: f32,
        dashed: bool,
    },
    /// Line
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: Rgba,
        stroke_width: f32,
        dashed: bool,
    },
    /// Text, optionally rotated about its anchor point
    Text {
        x: f32,
        y: f32,
        text: String,
        font_size: f32,
        fill: Rgba,
        anchor: TextAnchor,
        rotate: Option<f32>,
    },
}

/// Text anchor position for SVG text alignment.
#[derive(Debug, Clone, Copy, Default)]
#[allow(missing_docs)]
pub enum TextAnchor {
    /// Align text start at position (left-aligned for LTR)
    #[default]
    Start,
    /// Center text at position
    Middle,
    /// Align text end at position (right-aligned for LTR)
    End,
}

impl SvgEncoder {
    /// Create a new SVG encoder with given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Some(Rgba::WHITE),
            elements: Vec::new(),
        }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Add a filled rectangle.
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgba) {
        self.elements.push(SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke: None,
            stroke_width: 0.0,
            dashed: false,
        });
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
        self.elements.push(SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke: Some(stroke),
            stroke_width,
            dashed,
        });
    }

    /// Add a line.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: Rgba, stroke_width: f32) {
        self.elements.push(SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            stroke_width,
            dashed: false,
        });
    }

    /// Add horizontal text.
    pub fn text(&mut self, x: f32, y: f32, text: &str, font_size: f32, anchor: TextAnchor) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            fill: Rgba::BLACK,
            anchor,
            rotate: None,
        });
    }

    /// Add text rotated by `degrees` about `(x, y)`.
    pub fn text_rotated(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        font_size: f32,
        anchor: TextAnchor,
        degrees: f32,
    ) {
        self.elements.push(SvgElement::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            fill: Rgba::BLACK,
            anchor,
            rotate: Some(degrees),
        });
    }

    /// Render to SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096 + self.elements.len() * 96);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(
                svg,
                r#"  <rect width="100%" height="100%" fill="{}"/>"#,
                rgba_to_css(bg)
            );
        }

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

/// Convert RGBA to CSS color string.
fn rgba_to_css(color: Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!(
            "rgba({},{},{},{:.3})",
            color.r,
            color.g,
            color.b,
            f32::from(color.a) / 255.0
        )
    }
}

fn dash_attr(dashed: bool, stroke_width: f32) -> String {
    if dashed {
        format!(r#" stroke-dasharray="{},{}""#, stroke_width, stroke_width * 2.0)
    } else {
        String::new()
    }
}

/// Convert an SVG element to its string representation.
fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
            stroke_width,
            dashed,
        } => {
            let stroke_attr = stroke
                .map(|s| {
                    format!(
                        r#" stroke="{}" stroke-width="{}"{}"#,
                        rgba_to_css(s),
                        stroke_width,
                        dash_attr(*dashed, *stroke_width)
                    )
                })
                .unwrap_or_default();
            format!(
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"{stroke_attr}/>"#,
                rgba_to_css(*fill)
            )
        }
        SvgElement::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            stroke_width,
            dashed,
        } => {
            format!(
                r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}" stroke-width="{stroke_width}"{}/>"#,
                rgba_to_css(*stroke),
                dash_attr(*dashed, *stroke_width)
            )
        }
        SvgElement::Text {
            x,
            y,
            text,
            font_size,
            fill,
            anchor,
            rotate,
        } => {
            let anchor_str = match anchor {
                TextAnchor::Start => "start",
                TextAnchor::Middle => "middle",
                TextAnchor::End => "end",
            };
            let transform = rotate
                .map(|deg| format!(r#" transform="rotate({deg} {x} {y})""#))
                .unwrap_or_default();
            let escaped_text = escape_xml(text);
            format!(
                r#"<text x="{x}" y="{y}" font-size="{font_size}" fill="{}" text-anchor="{anchor_str}" font-family="sans-serif"{transform}>{escaped_text}</text>"#,
                rgba_to_css(*fill)
            )
        }
    }
}

/// Escape XML special characters.
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_skeleton() {
        let encoder = SvgEncoder::new(800, 600);
        let svg = encoder.render();

        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn test_svg_rect() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.rect(10.0, 20.0, 30.0, 40.0, Rgba::rgb(255, 0, 0));
        let svg = encoder.render();

        assert!(svg.contains("<rect"));
        assert!(svg.contains("x=\"10\""));
        assert!(svg.contains("y=\"20\""));
        assert!(svg.contains("width=\"30\""));
        assert!(svg.contains("height=\"40\""));
        assert!(svg.contains("rgb(255,0,0)"));
    }

    #[test]
    fn test_svg_rect_dotted_outline() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.rect_outlined(0.0, 0.0, 10.0, 10.0, Rgba::WHITE, Rgba::GREY, 0.5, true);
        let svg = encoder.render();

        assert!(svg.contains("stroke=\"rgb(128,128,128)\""));
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn test_svg_line() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.line(0.0, 0.0, 100.0, 100.0, Rgba::BLACK, 2.0);
        let svg = encoder.render();

        assert!(svg.contains("<line"));
        assert!(svg.contains("stroke-width=\"2\""));
    }

    #[test]
    fn test_svg_text_anchored() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.text(50.0, 50.0, "LdaSmi", 12.0, TextAnchor::End);
        let svg = encoder.render();

        assert!(svg.contains("LdaSmi"));
        assert!(svg.contains("text-anchor=\"end\""));
        assert!(!svg.contains("transform="));
    }

    #[test]
    fn test_svg_text_rotated() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.text_rotated(30.0, 40.0, "Star", 10.0, TextAnchor::Start, -90.0);
        let svg = encoder.render();

        assert!(svg.contains("rotate(-90 30 40)"));
    }

    #[test]
    fn test_svg_text_escaping() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.text(0.0, 0.0, "a<b&\"c\"", 10.0, TextAnchor::Start);
        let svg = encoder.render();

        assert!(svg.contains("a&lt;b&amp;&quot;c&quot;"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn test_svg_transparent_background() {
        let svg = SvgEncoder::new(100, 100).background(None).render();
        assert_eq!(svg.matches("<rect").count(), 0);
    }

    #[test]
    fn test_svg_write_to_file() {
        let mut encoder = SvgEncoder::new(100, 100);
        encoder.rect(10.0, 10.0, 80.0, 80.0, Rgba::rgb(0, 0, 255));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.svg");
        encoder.write_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("</svg>"));
    }
}

impl super::VectorCanvas for SvgEncoder {
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
        self.text_rotated(x, y, text, font_size, anchor, -90.0);
    }
}
