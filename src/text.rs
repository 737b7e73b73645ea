//! Raster text for axis labels.
//!
//! The vector outputs carry real text elements; raster output (PNG, the
//! interactive window) gets handler names from a built-in 5x7 bitmap font
//! instead. Each glyph is five column bytes, least-significant bit at the
//! top. Covers printable ASCII; anything else renders as a hollow box.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;

/// Horizontal advance per glyph in font units (5 columns + 1 gap).
pub const GLYPH_ADVANCE: u32 = 6;
/// Glyph height in font units.
pub const GLYPH_HEIGHT: u32 = 7;

/// Fallback glyph for characters outside the table.
const REPLACEMENT: [u8; 5] = [0x7F, 0x41, 0x41, 0x41, 0x7F];

/// Column-byte glyphs for ASCII 0x20..=0x7E.
#[rustfmt::skip]
const FONT_5X7: [[u8; 5]; 95] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // '!'
    [0x00, 0x07, 0x00, 0x07, 0x00], // '"'
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // '#'
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // '$'
    [0x23, 0x13, 0x08, 0x64, 0x62], // '%'
    [0x36, 0x49, 0x55, 0x22, 0x50], // '&'
    [0x00, 0x05, 0x03, 0x00, 0x00], // '\''
    [0x00, 0x1C, 0x22, 0x41, 0x00], // '('
    [0x00, 0x41, 0x22, 0x1C, 0x00], // ')'
    [0x14, 0x08, 0x3E, 0x08, 0x14], // '*'
    [0x08, 0x08, 0x3E, 0x08, 0x08], // '+'
    [0x00, 0x50, 0x30, 0x00, 0x00], // ','
    [0x08, 0x08, 0x08, 0x08, 0x08], // '-'
    [0x00, 0x60, 0x60, 0x00, 0x00], // '.'
    [0x20, 0x10, 0x08, 0x04, 0x02], // '/'
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // '0'
    [0x00, 0x42, 0x7F, 0x40, 0x00], // '1'
    [0x42, 0x61, 0x51, 0x49, 0x46], // '2'
    [0x21, 0x41, 0x45, 0x4B, 0x31], // '3'
    [0x18, 0x14, 0x12, 0x7F, 0x10], // '4'
    [0x27, 0x45, 0x45, 0x45, 0x39], // '5'
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // '6'
    [0x01, 0x71, 0x09, 0x05, 0x03], // '7'
    [0x36, 0x49, 0x49, 0x49, 0x36], // '8'
    [0x06, 0x49, 0x49, 0x29, 0x1E], // '9'
    [0x00, 0x36, 0x36, 0x00, 0x00], // ':'
    [0x00, 0x56, 0x36, 0x00, 0x00], // ';'
    [0x08, 0x14, 0x22, 0x41, 0x00], // '<'
    [0x14, 0x14, 0x14, 0x14, 0x14], // '='
    [0x00, 0x41, 0x22, 0x14, 0x08], // '>'
    [0x02, 0x01, 0x51, 0x09, 0x06], // '?'
    [0x32, 0x49, 0x79, 0x41, 0x3E], // '@'
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // 'A'
    [0x7F, 0x49, 0x49, 0x49, 0x36], // 'B'
    [0x3E, 0x41, 0x41, 0x41, 0x22], // 'C'
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // 'D'
    [0x7F, 0x49, 0x49, 0x49, 0x41], // 'E'
    [0x7F, 0x09, 0x09, 0x09, 0x01], // 'F'
    [0x3E, 0x41, 0x49, 0x49, 0x7A], // 'G'
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // 'H'
    [0x00, 0x41, 0x7F, 0x41, 0x00], // 'I'
    [0x20, 0x40, 0x41, 0x3F, 0x01], // 'J'
    [0x7F, 0x08, 0x14, 0x22, 0x41], // 'K'
    [0x7F, 0x40, 0x40, 0x40, 0x40], // 'L'
    [0x7F, 0x02, 0x0C, 0x02, 0x7F], // 'M'
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // 'N'
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // 'O'
    [0x7F, 0x09, 0x09, 0x09, 0x06], // 'P'
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // 'Q'
    [0x7F, 0x09, 0x19, 0x29, 0x46], // 'R'
    [0x46, 0x49, 0x49, 0x49, 0x31], // 'S'
    [0x01, 0x01, 0x7F, 0x01, 0x01], // 'T'
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // 'U'
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // 'V'
    [0x3F, 0x40, 0x38, 0x40, 0x3F], // 'W'
    [0x63, 0x14, 0x08, 0x14, 0x63], // 'X'
    [0x07, 0x08, 0x70, 0x08, 0x07], // 'Y'
    [0x61, 0x51, 0x49, 0x45, 0x43], // 'Z'
    [0x00, 0x7F, 0x41, 0x41, 0x00], // '['
    [0x02, 0x04, 0x08, 0x10, 0x20], // '\\'
    [0x00, 0x41, 0x41, 0x7F, 0x00], // ']'
    [0x04, 0x02, 0x01, 0x02, 0x04], // '^'
    [0x40, 0x40, 0x40, 0x40, 0x40], // '_'
    [0x00, 0x01, 0x02, 0x04, 0x00], // '`'
    [0x20, 0x54, 0x54, 0x54, 0x78], // 'a'
    [0x7F, 0x48, 0x44, 0x44, 0x38], // 'b'
    [0x38, 0x44, 0x44, 0x44, 0x20], // 'c'
    [0x38, 0x44, 0x44, 0x48, 0x7F], // 'd'
    [0x38, 0x54, 0x54, 0x54, 0x18], // 'e'
    [0x08, 0x7E, 0x09, 0x01, 0x02], // 'f'
    [0x0C, 0x52, 0x52, 0x52, 0x3E], // 'g'
    [0x7F, 0x08, 0x04, 0x04, 0x78], // 'h'
    [0x00, 0x44, 0x7D, 0x40, 0x00], // 'i'
    [0x20, 0x40, 0x44, 0x3D, 0x00], // 'j'
    [0x7F, 0x10, 0x28, 0x44, 0x00], // 'k'
    [0x00, 0x41, 0x7F, 0x40, 0x00], // 'l'
    [0x7C, 0x04, 0x18, 0x04, 0x78], // 'm'
    [0x7C, 0x08, 0x04, 0x04, 0x78], // 'n'
    [0x38, 0x44, 0x44, 0x44, 0x38], // 'o'
    [0x7C, 0x14, 0x14, 0x14, 0x08], // 'p'
    [0x08, 0x14, 0x14, 0x18, 0x7C], // 'q'
    [0x7C, 0x08, 0x04, 0x04, 0x08], // 'r'
    [0x48, 0x54, 0x54, 0x54, 0x20], // 's'
    [0x04, 0x3F, 0x44, 0x40, 0x20], // 't'
    [0x3C, 0x40, 0x40, 0x20, 0x7C], // 'u'
    [0x1C, 0x20, 0x40, 0x20, 0x1C], // 'v'
    [0x3C, 0x40, 0x30, 0x40, 0x3C], // 'w'
    [0x44, 0x28, 0x10, 0x28, 0x44], // 'x'
    [0x0C, 0x50, 0x50, 0x50, 0x3C], // 'y'
    [0x44, 0x64, 0x54, 0x4C, 0x44], // 'z'
    [0x00, 0x08, 0x36, 0x41, 0x00], // '{'
    [0x00, 0x00, 0x7F, 0x00, 0x00], // '|'
    [0x00, 0x41, 0x36, 0x08, 0x00], // '}'
    [0x08, 0x08, 0x2A, 0x1C, 0x08], // '~'
];

fn glyph(c: char) -> &'static [u8; 5] {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        &FONT_5X7[(code - 0x20) as usize]
    } else {
        &REPLACEMENT
    }
}

/// Pixel width of `text` at `scale` (integer pixel multiplier).
#[must_use]
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    // No trailing gap after the last glyph
    (chars * GLYPH_ADVANCE - 1) * scale
}

/// Pixel height of a text line at `scale`.
#[must_use]
pub fn text_height(scale: u32) -> u32 {
    GLYPH_HEIGHT * scale
}

/// Draw `text` left-to-right with its top-left corner at `(x, y)`.
pub fn draw_text(fb: &mut Framebuffer, x: u32, y: u32, text: &str, scale: u32, color: Rgba) {
    let scale = scale.max(1);
    for (i, c) in text.chars().enumerate() {
        let origin_x = x + (i as u32) * GLYPH_ADVANCE * scale;
        for (gx, column) in glyph(c).iter().enumerate() {
            for gy in 0..GLYPH_HEIGHT {
                if column >> gy & 1 == 1 {
                    fb.fill_rect(
                        origin_x + (gx as u32) * scale,
                        y + gy * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
    }
}

/// Draw `text` rotated a quarter turn counter-clockwise, reading
/// bottom-to-top, with `(x, y)` at the bottom-left of the run.
pub fn draw_text_up(fb: &mut Framebuffer, x: u32, y: u32, text: &str, scale: u32, color: Rgba) {
    let scale = scale.max(1);
    for (i, c) in text.chars().enumerate() {
        let advance = ((i as u32) * GLYPH_ADVANCE) * scale;
        for (gx, column) in glyph(c).iter().enumerate() {
            for gy in 0..GLYPH_HEIGHT {
                if column >> gy & 1 == 1 {
                    // (gx, gy) in glyph space -> (gy, -gx) after the turn
                    let px = x + gy * scale;
                    if let Some(py) = y.checked_sub(advance + (gx as u32 + 1) * scale) {
                        fb.fill_rect(px, py, scale, scale, color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("AB", 1), 11);
        assert_eq!(text_width("AB", 2), 22);
    }

    #[test]
    fn test_draw_text_marks_pixels() {
        let mut fb = Framebuffer::new(20, 10).unwrap();
        fb.clear(Rgba::WHITE);
        draw_text(&mut fb, 0, 0, "H", 1, Rgba::BLACK);

        // 'H' has full-height outer columns
        let black = (0..7).filter(|&gy| fb.get_pixel(0, gy) == Some(Rgba::BLACK)).count();
        assert_eq!(black, 7);
        // Gap column stays background
        assert_eq!(fb.get_pixel(5, 0), Some(Rgba::WHITE));
    }

    #[test]
    fn test_draw_text_scaled() {
        let mut fb = Framebuffer::new(40, 20).unwrap();
        fb.clear(Rgba::WHITE);
        draw_text(&mut fb, 0, 0, "H", 2, Rgba::BLACK);
        // Each font pixel covers a 2x2 block
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(1, 1), Some(Rgba::BLACK));
    }

    #[test]
    fn test_draw_text_up_stays_in_column() {
        let mut fb = Framebuffer::new(30, 30).unwrap();
        fb.clear(Rgba::WHITE);
        draw_text_up(&mut fb, 10, 29, "Hi", 1, Rgba::BLACK);

        // Rotated glyphs occupy x in [10, 10 + GLYPH_HEIGHT)
        for y in 0..30 {
            for x in 0..10 {
                assert_eq!(fb.get_pixel(x, y), Some(Rgba::WHITE));
            }
            for x in (10 + GLYPH_HEIGHT)..30 {
                assert_eq!(fb.get_pixel(x, y), Some(Rgba::WHITE));
            }
        }
        // And something was drawn
        let drawn = fb
            .to_0rgb_pixels()
            .iter()
            .filter(|&&w| w == 0)
            .count();
        assert!(drawn > 0);
    }

    #[test]
    fn test_non_ascii_renders_replacement() {
        let mut fb = Framebuffer::new(10, 10).unwrap();
        fb.clear(Rgba::WHITE);
        draw_text(&mut fb, 0, 0, "\u{00e9}", 1, Rgba::BLACK);
        // Replacement box has a solid left edge
        assert_eq!(fb.get_pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(fb.get_pixel(0, 6), Some(Rgba::BLACK));
    }

    #[test]
    fn test_clipping_does_not_panic() {
        let mut fb = Framebuffer::new(8, 8).unwrap();
        draw_text(&mut fb, 6, 6, "Wide label", 1, Rgba::BLACK);
        draw_text_up(&mut fb, 6, 2, "Tall", 1, Rgba::BLACK);
    }
}
