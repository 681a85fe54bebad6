//! Text rendering utilities

use crate::document::Color;

/// Context for rendering a text run
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text color (RGB)
    pub color: Color,
}

/// Generate PDF operators (BT, rg, Tf, Td, Tj, ET) for one text run
///
/// # Arguments
/// * `encoded` - Text already encoded as a PDF string, `(...)` or `<...>`
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Baseline Y coordinate in points (PDF coordinates, from bottom)
/// * `ctx` - Font and colour
pub fn generate_text_operators(encoded: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    format!(
        "BT\n{} {} {} rg\n/{} {} Tf\n{x} {y} Td\n{encoded} Tj\nET\n",
        ctx.color.r, ctx.color.g, ctx.color.b, ctx.font_name, ctx.font_size
    )
    .into_bytes()
}

/// Encode text as a WinAnsiEncoding literal string for the standard fonts
///
/// Characters without a WinAnsi code point are replaced by `?`.
pub fn encode_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match win_ansi_code(c) {
            Some(b'(') => out.push_str("\\("),
            Some(b')') => out.push_str("\\)"),
            Some(b'\\') => out.push_str("\\\\"),
            Some(byte) if byte.is_ascii_graphic() || byte == b' ' => out.push(byte as char),
            Some(byte) => out.push_str(&format!("\\{byte:03o}")),
            None => out.push('?'),
        }
    }
    out.push(')');
    out
}

fn win_ansi_code(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => match c {
            '€' => Some(0x80),
            '‚' => Some(0x82),
            '„' => Some(0x84),
            '…' => Some(0x85),
            '‘' => Some(0x91),
            '’' => Some(0x92),
            '“' => Some(0x93),
            '”' => Some(0x94),
            '•' => Some(0x95),
            '–' => Some(0x96),
            '—' => Some(0x97),
            '™' => Some(0x99),
            _ => None,
        },
    }
}
