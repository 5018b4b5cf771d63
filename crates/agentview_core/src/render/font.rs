//! 3x5 bitmap font for panel text and the legend.

use super::frame::Canvas;
use crate::palette::Rgba;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const TEXT_SCALE: i32 = 2;
pub const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
pub const LINE_ADVANCE: i32 = (GLYPH_HEIGHT + 2) * TEXT_SCALE;
pub const TEXT_HEIGHT: i32 = GLYPH_HEIGHT * TEXT_SCALE;
const FALLBACK_CHAR: char = '?';

// One entry per printable ASCII char starting at ' '. Each row is three bits,
// row 0 in the highest bits, leftmost column in the high bit of its row.
const GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5A00, 0x5F7D, 0x7DDF, 0x52A5, 0x2AAB, 0x2400, //
    0x1491, 0x4494, 0x0AA8, 0x05D0, 0x0014, 0x01C0, 0x0002, 0x12A4, //
    0x7B6F, 0x2C97, 0x73E7, 0x73CF, 0x5BC9, 0x79CF, 0x79EF, 0x7292, //
    0x7BEF, 0x7BCF, 0x0410, 0x0414, 0x1511, 0x0E38, 0x4454, 0x72C2, //
    0x7BE7, 0x2BED, 0x6BAE, 0x7927, 0x6B6E, 0x79A7, 0x79A4, 0x796F, //
    0x5BED, 0x7497, 0x726F, 0x5BAD, 0x4927, 0x5FED, 0x5FFD, 0x7B6F, //
    0x6BA4, 0x7B79, 0x6BAD, 0x79CF, 0x7492, 0x5B6F, 0x5B6A, 0x5BFD, //
    0x5AAD, 0x5A92, 0x72A7, 0x6926, 0x4889, 0x324B, 0x2A00, 0x0007, //
    0x4400, 0x0E7F, 0x49AE, 0x0F27, 0x13EF, 0x0FA7, 0x39A4, 0x0F79, //
    0x49AD, 0x2092, 0x106A, 0x4BAD, 0x4927, 0x0DED, 0x0D6D, 0x0F6F, //
    0x0D74, 0x0F79, 0x0D64, 0x0F8F, 0x2E93, 0x0B6F, 0x0B6A, 0x0B7A, //
    0x0A95, 0x0B79, 0x0E57, 0x3593, 0x2492, 0x64D6, 0x0780,
];

fn glyph_bits(ch: char) -> Option<u16> {
    match ch {
        ' '..='~' => GLYPHS.get(ch as usize - ' ' as usize).copied(),
        _ => None,
    }
}

fn glyph_row(bits: u16, row: i32) -> u16 {
    (bits >> (GLYPH_WIDTH * (GLYPH_HEIGHT - 1 - row))) & 0b111
}

pub fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE
}

/// Draws `text` with its top-left corner at `(x, y)` and returns the x just
/// past the last glyph. Characters outside printable ASCII draw as `?`.
pub fn draw_text(canvas: &mut dyn Canvas, x: i32, y: i32, text: &str, color: Rgba) -> i32 {
    let fallback = glyph_bits(FALLBACK_CHAR).unwrap_or(0);
    let mut cursor = x;
    for ch in text.chars() {
        let bits = glyph_bits(ch).unwrap_or(fallback);
        draw_glyph(canvas, cursor, y, bits, color);
        cursor += GLYPH_ADVANCE;
    }
    cursor
}

fn draw_glyph(canvas: &mut dyn Canvas, x: i32, y: i32, bits: u16, color: Rgba) {
    if bits == 0 {
        return;
    }
    for row in 0..GLYPH_HEIGHT {
        let row_bits = glyph_row(bits, row);
        for col in 0..GLYPH_WIDTH {
            if row_bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            canvas.fill_rect(
                x + col * TEXT_SCALE,
                y + row * TEXT_SCALE,
                TEXT_SCALE,
                TEXT_SCALE,
                color,
            );
        }
    }
}
