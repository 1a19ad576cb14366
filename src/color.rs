//! Hex color strings and HSV conversion
//!
//! The shared state stores colors as `#rrggbb` strings (what the picker shows
//! and what presets persist); rendering wants macroquad colors.

use macroquad::prelude::Color;

pub const WHITE_HEX: &str = "#ffffff";

/// Parse `#rrggbb`, `rrggbb` or `#rgb`
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.is_ascii() {
        return None;
    }
    let (r, g, b) = match digits.len() {
        6 => (
            u8::from_str_radix(&digits[0..2], 16).ok()?,
            u8::from_str_radix(&digits[2..4], 16).ok()?,
            u8::from_str_radix(&digits[4..6], 16).ok()?,
        ),
        3 => {
            let expand = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|v| v * 17);
            (expand(0).ok()?, expand(1).ok()?, expand(2).ok()?)
        }
        _ => return None,
    };
    Some(Color::from_rgba(r, g, b, 255))
}

/// Parse a hex color, falling back to white for malformed input
pub fn parse_hex_or_white(hex: &str) -> Color {
    parse_hex(hex).unwrap_or(Color::new(1.0, 1.0, 1.0, 1.0))
}

/// Format as lowercase `#rrggbb` (alpha dropped)
pub fn to_hex(color: Color) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        channel(color.r),
        channel(color.g),
        channel(color.b)
    )
}

/// Hue in [0, 1), saturation and value in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn from_color(color: Color) -> Self {
        let max = color.r.max(color.g).max(color.b);
        let min = color.r.min(color.g).min(color.b);
        let delta = max - min;

        let h = if delta <= f32::EPSILON {
            0.0
        } else if max == color.r {
            ((color.g - color.b) / delta).rem_euclid(6.0) / 6.0
        } else if max == color.g {
            ((color.b - color.r) / delta + 2.0) / 6.0
        } else {
            ((color.r - color.g) / delta + 4.0) / 6.0
        };
        let s = if max <= f32::EPSILON { 0.0 } else { delta / max };

        Self { h, s, v: max }
    }

    pub fn to_color(self) -> Color {
        let h = self.h.rem_euclid(1.0) * 6.0;
        let c = self.v * self.s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = self.v - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Color::new(r + m, g + m, b + m, 1.0)
    }
}
