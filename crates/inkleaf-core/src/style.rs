//! Ink colors and stroke styles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Serializable ink color (RGB8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InkColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl InkColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for InkColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// The quick-pick colors offered next to the pen tools.
pub const PALETTE: [InkColor; 8] = [
    InkColor::new(0x00, 0x00, 0x00),
    InkColor::new(0xFF, 0xFF, 0xFF),
    InkColor::new(0xEF, 0x44, 0x44),
    InkColor::new(0xF9, 0x73, 0x16),
    InkColor::new(0xEA, 0xB3, 0x08),
    InkColor::new(0x22, 0xC5, 0x5E),
    InkColor::new(0x3B, 0x82, 0xF6),
    InkColor::new(0xA8, 0x55, 0xF7),
];

/// Error parsing a hex color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct ParseColorError(String);

impl FromStr for InkColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ParseColorError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for InkColor {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InkColor> for String {
    fn from(color: InkColor) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for InkColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Tag recording which tool laid down a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    Pen,
    Pencil,
    Eraser,
}

/// Paint parameters of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Ink color; ignored for eraser strokes.
    pub color: InkColor,
    /// Line width in internal units.
    pub width: f64,
    /// Opacity in [0, 1].
    pub opacity: f64,
    /// Subtractive stroke that cuts through everything beneath it.
    pub is_eraser: bool,
}

impl StrokeStyle {
    /// Build a style, clamping opacity and guarding against degenerate widths.
    pub fn new(color: InkColor, width: f64, opacity: f64, is_eraser: bool) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 };
        Self {
            color,
            width,
            opacity,
            is_eraser,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#EF4444".parse::<InkColor>(), Ok(InkColor::new(0xEF, 0x44, 0x44)));
        assert_eq!("3b82f6".parse::<InkColor>(), Ok(InkColor::new(0x3B, 0x82, 0xF6)));
        assert!("#12345".parse::<InkColor>().is_err());
        assert!("#GG0000".parse::<InkColor>().is_err());
    }

    #[test]
    fn test_hex_display() {
        assert_eq!(InkColor::new(0xA8, 0x55, 0xF7).to_string(), "#A855F7");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&InkColor::WHITE).unwrap();
        assert_eq!(json, "\"#FFFFFF\"");
        let back: InkColor = serde_json::from_str("\"#000000\"").unwrap();
        assert_eq!(back, InkColor::BLACK);
    }

    #[test]
    fn test_style_clamps_opacity() {
        let style = StrokeStyle::new(InkColor::BLACK, 3.0, 1.7, false);
        assert!((style.opacity - 1.0).abs() < f64::EPSILON);
        let style = StrokeStyle::new(InkColor::BLACK, -2.0, 0.5, false);
        assert!(style.width.abs() < f64::EPSILON);
    }
}
