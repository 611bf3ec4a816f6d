//! RGBA color values used by catalog attributes and draw routines.

use palette::{Hsl, IntoColor, Srgb};

/// Color drawn when a catalog entry is missing a usable color attribute.
pub const FALLBACK_COLOR: Color = Color::rgb(0x7f, 0x8c, 0xff);

/// A straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from RGB and a CSS-style alpha in 0.0-1.0.
    pub fn with_opacity(r: u8, g: u8, b: u8, opacity: f32) -> Self {
        Self::rgba(r, g, b, (opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Parses `#rgb` or `#rrggbb` (the `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return None,
        };
        let value = u32::from_str_radix(&expanded, 16).ok()?;
        Some(Self::rgb(
            ((value >> 16) & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            (value & 0xff) as u8,
        ))
    }

    /// Returns the same color with a different opacity.
    pub fn alpha(self, opacity: f32) -> Self {
        Self::with_opacity(self.r, self.g, self.b, opacity)
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a 0.0-1.0 opacity.
    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Shifts HSL lightness by `amount` (negative darkens), keeping alpha.
    pub fn shade(self, amount: f32) -> Self {
        let rgb = Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        );
        let mut hsl: Hsl = rgb.into_color();
        hsl.lightness = (hsl.lightness + amount).clamp(0.0, 1.0);
        let shaded: Srgb = hsl.into_color();
        Self::rgba(
            (shaded.red.clamp(0.0, 1.0) * 255.0).round() as u8,
            (shaded.green.clamp(0.0, 1.0) * 255.0).round() as u8,
            (shaded.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
            self.a,
        )
    }
}
