use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// Straight (non-premultiplied) RGBA thread color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Palette every new session starts with.
pub const DEFAULT_COLORS: [Color; 5] = [
    Color::rgb(0x00, 0x00, 0x00), // Black
    Color::rgb(0xFF, 0x00, 0x00), // Red
    Color::rgb(0x00, 0xFF, 0x00), // Green
    Color::rgb(0x00, 0x00, 0xFF), // Blue
    Color::rgb(0xFF, 0xFF, 0x00), // Yellow
];

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`. The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Result<Self, PatternError> {
        let normalized = hex.trim().trim_start_matches('#');
        let invalid = || PatternError::InvalidColor {
            value: hex.to_string(),
        };
        if !(normalized.len() == 6 || normalized.len() == 8) || !normalized.is_ascii() {
            return Err(invalid());
        }

        let channel = |idx: usize| {
            u8::from_str_radix(&normalized[idx..idx + 2], 16).map_err(|_| invalid())
        };
        let a = if normalized.len() == 8 { channel(6)? } else { 0xFF };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// `#RRGGBB` for opaque colors, `#RRGGBBAA` otherwise.
    pub fn to_hex(&self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn key(&self) -> String {
        format!("{},{},{},{}", self.r, self.g, self.b, self.a)
    }

    pub fn is_default(&self) -> bool {
        DEFAULT_COLORS.contains(self)
    }

    /// Channels in 0..=1 after compositing over white paper.
    pub fn over_white(&self) -> (f32, f32, f32) {
        let alpha = self.a as f32 / 255.0;
        let blend = |c: u8| (c as f32 / 255.0) * alpha + (1.0 - alpha);
        (blend(self.r), blend(self.g), blend(self.b))
    }
}

impl Default for Color {
    fn default() -> Self {
        DEFAULT_COLORS[0]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
