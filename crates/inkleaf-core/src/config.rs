//! Engine configuration.
//!
//! Every option the host can toggle lives here, including the theme, which
//! is passed in explicitly instead of being sniffed from the environment.

use crate::style::{InkColor, StrokeStyle, StrokeTool};
use crate::viewport::DEFAULT_PAGE_SIZE;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Opacity of pencil ink.
pub const PENCIL_OPACITY: f64 = 0.8;
/// Allowed range of the stroke width control.
pub const STROKE_WIDTH_RANGE: (f64, f64) = (1.0, 20.0);

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Pen,
    Pencil,
    Eraser,
    /// Select and manipulate images; never lays ink.
    Move,
}

/// How the eraser tool removes ink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraserMode {
    /// Paints a subtractive stroke (pixel eraser).
    #[default]
    Standard,
    /// Deletes whole strokes near the pointer.
    Object,
}

/// Decorative paper shown beneath the ink. Never part of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperPattern {
    #[default]
    Blank,
    Ruled,
    Grid,
}

/// Host color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Ink color a fresh session starts with.
    pub fn default_ink(self) -> InkColor {
        match self {
            Theme::Light => InkColor::BLACK,
            Theme::Dark => InkColor::WHITE,
        }
    }
}

/// Distance metric used by the object eraser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EraseHitMode {
    /// Distance to the recorded points only.
    #[default]
    Vertex,
    /// Distance to the polyline segments between recorded points.
    Segment,
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub tool: Tool,
    pub eraser_mode: EraserMode,
    pub paper_pattern: PaperPattern,
    /// Only the stylus may draw when enabled.
    pub palm_rejection: bool,
    pub color: InkColor,
    pub stroke_width: f64,
    pub zoom: f64,
    pub theme: Theme,
    /// Internal resolution of pages without a background.
    pub page_size: Size,
    /// Object eraser reach around the pointer, in internal units.
    pub erase_radius: f64,
    /// Width of pixel-eraser strokes relative to `stroke_width`.
    pub eraser_width_multiplier: f64,
    /// Smallest width/height an image can be resized to.
    pub min_image_size: f64,
    /// Resize handle hit radius in screen pixels.
    pub handle_hit_radius: f64,
    /// Resize handle marker radius in screen pixels.
    pub handle_radius: f64,
    /// Selection outline width in screen pixels.
    pub selection_line_width: f64,
    pub erase_hit_mode: EraseHitMode,
    /// Drop strokes that never moved past their first point.
    pub discard_dot_strokes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tool: Tool::Pen,
            eraser_mode: EraserMode::Standard,
            paper_pattern: PaperPattern::Blank,
            palm_rejection: true,
            color: InkColor::BLACK,
            stroke_width: 3.0,
            zoom: 1.0,
            theme: Theme::Light,
            page_size: DEFAULT_PAGE_SIZE,
            erase_radius: 15.0,
            eraser_width_multiplier: 5.0,
            min_image_size: 20.0,
            handle_hit_radius: 20.0,
            handle_radius: 6.0,
            selection_line_width: 2.0,
            erase_hit_mode: EraseHitMode::Vertex,
            discard_dot_strokes: false,
        }
    }
}

impl EngineConfig {
    /// Default configuration for a theme.
    pub fn for_theme(theme: Theme) -> Self {
        Self {
            theme,
            color: theme.default_ink(),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.normalize();
        Ok(config)
    }

    /// Load a configuration file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Clamp values into their valid ranges.
    ///
    /// Light-theme ink is swapped for the dark default when the theme is dark,
    /// so a session never starts with black ink on dark paper.
    pub fn normalize(&mut self) {
        if self.theme == Theme::Dark && self.color == Theme::Light.default_ink() {
            self.color = Theme::Dark.default_ink();
        }
        self.stroke_width = clamp_or(self.stroke_width, STROKE_WIDTH_RANGE, 3.0);
        self.zoom = clamp_or(
            self.zoom,
            (crate::viewport::MIN_ZOOM, crate::viewport::MAX_ZOOM),
            1.0,
        );
        if !(self.page_size.width >= 1.0 && self.page_size.height >= 1.0) {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self.erase_radius = self.erase_radius.max(0.0);
        self.eraser_width_multiplier = self.eraser_width_multiplier.max(1.0);
        self.min_image_size = self.min_image_size.max(1.0);
    }

    /// Switch theme; black ink follows the theme to stay visible.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.color == self.theme.default_ink() {
            self.color = theme.default_ink();
        }
        self.theme = theme;
    }

    /// Style and tag for a stroke started with the current tool, or `None`
    /// if the tool doesn't lay ink (move tool, object eraser).
    pub fn stroke_style(&self) -> Option<(StrokeTool, StrokeStyle)> {
        match (self.tool, self.eraser_mode) {
            (Tool::Pen, _) => Some((
                StrokeTool::Pen,
                StrokeStyle::new(self.color, self.stroke_width, 1.0, false),
            )),
            (Tool::Pencil, _) => Some((
                StrokeTool::Pencil,
                StrokeStyle::new(self.color, self.stroke_width, PENCIL_OPACITY, false),
            )),
            (Tool::Eraser, EraserMode::Standard) => Some((
                StrokeTool::Eraser,
                StrokeStyle::new(
                    InkColor::BLACK,
                    self.stroke_width * self.eraser_width_multiplier,
                    1.0,
                    true,
                ),
            )),
            (Tool::Eraser, EraserMode::Object) | (Tool::Move, _) => None,
        }
    }

    /// True when the object eraser is the active tool.
    pub fn is_object_eraser(&self) -> bool {
        self.tool == Tool::Eraser && self.eraser_mode == EraserMode::Object
    }
}

fn clamp_or(value: f64, (min, max): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PALETTE;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.tool, Tool::Pen);
        assert!(config.palm_rejection);
        assert!((config.stroke_width - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json() {
        let config =
            EngineConfig::from_json(r##"{ "tool": "eraser", "eraserMode": "object", "color": "#3B82F6" }"##)
                .unwrap();
        assert!(config.is_object_eraser());
        assert_eq!(config.color, InkColor::new(0x3B, 0x82, 0xF6));
        assert_eq!(config.paper_pattern, PaperPattern::Blank);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "tool": "brush" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_normalize_clamps() {
        let config = EngineConfig::from_json(r#"{ "strokeWidth": 90, "zoom": 0.01 }"#).unwrap();
        assert!((config.stroke_width - 20.0).abs() < f64::EPSILON);
        assert!((config.zoom - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_dark_theme_ink() {
        let config = EngineConfig::for_theme(Theme::Dark);
        assert_eq!(config.color, InkColor::WHITE);

        let mut config = EngineConfig::default();
        config.set_theme(Theme::Dark);
        assert_eq!(config.color, InkColor::WHITE);

        // A custom color survives a theme switch.
        let mut config = EngineConfig::default();
        config.color = InkColor::new(0xEF, 0x44, 0x44);
        config.set_theme(Theme::Dark);
        assert_eq!(config.color, InkColor::new(0xEF, 0x44, 0x44));
    }

    #[test]
    fn test_dark_theme_from_json() {
        let config = EngineConfig::from_json(r#"{ "theme": "dark" }"#).unwrap();
        assert_eq!(config.color, InkColor::WHITE);

        let config =
            EngineConfig::from_json(r##"{ "theme": "dark", "color": "#22C55E" }"##).unwrap();
        assert_eq!(config.color, InkColor::new(0x22, 0xC5, 0x5E));

        let config = EngineConfig::from_json(r#"{ "theme": "light" }"#).unwrap();
        assert_eq!(config.color, InkColor::BLACK);
    }

    #[test]
    fn test_palette_holds_both_theme_inks() {
        assert_eq!(PALETTE[0], Theme::Light.default_ink());
        assert_eq!(PALETTE[1], Theme::Dark.default_ink());
        let hex: Vec<String> = PALETTE.iter().map(|c| c.to_hex()).collect();
        assert!(hex.contains(&"#3B82F6".to_string()));
        assert_eq!(hex.len(), 8);
    }

    #[test]
    fn test_stroke_styles() {
        let mut config = EngineConfig::default();
        let (tool, style) = config.stroke_style().unwrap();
        assert_eq!(tool, StrokeTool::Pen);
        assert!((style.opacity - 1.0).abs() < f64::EPSILON);

        config.tool = Tool::Pencil;
        let (_, style) = config.stroke_style().unwrap();
        assert!((style.opacity - PENCIL_OPACITY).abs() < f64::EPSILON);

        config.tool = Tool::Eraser;
        let (tool, style) = config.stroke_style().unwrap();
        assert_eq!(tool, StrokeTool::Eraser);
        assert!(style.is_eraser);
        assert!((style.width - 15.0).abs() < f64::EPSILON);
        assert_eq!(style.color, InkColor::BLACK);

        config.eraser_mode = EraserMode::Object;
        assert!(config.stroke_style().is_none());

        config.tool = Tool::Move;
        assert!(config.stroke_style().is_none());
    }
}
