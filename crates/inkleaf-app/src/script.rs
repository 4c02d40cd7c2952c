//! Replay scripts: a JSON list of pointer events and commands that drive an
//! [`Engine`] headlessly.
//!
//! ```json
//! {
//!   "config": { "tool": "pen", "strokeWidth": 4 },
//!   "steps": [
//!     { "op": "pointer", "phase": "down", "position": { "x": 10, "y": 10 }, "kind": "stylus" },
//!     { "op": "pointer", "phase": "up", "position": { "x": 10, "y": 10 }, "kind": "stylus" },
//!     { "op": "nextPage" }
//!   ]
//! }
//! ```

use crate::engine::{Engine, EngineError};
use inkleaf_core::{
    EngineConfig, EraserMode, ImageDecoder, InkColor, PaperPattern, Placement, PointerEvent,
    Theme, Tool,
};
use kurbo::{Point, Rect};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Where a scripted image insert lands.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum ScriptPlacement {
    /// 300 wide at (100, 100).
    Default,
    Natural { x: f64, y: f64 },
    Exact { x: f64, y: f64, width: f64, height: f64 },
}

impl From<ScriptPlacement> for Placement {
    fn from(placement: ScriptPlacement) -> Self {
        match placement {
            ScriptPlacement::Default => Placement::default(),
            ScriptPlacement::Natural { x, y } => Placement::Natural {
                origin: Point::new(x, y),
            },
            ScriptPlacement::Exact {
                x,
                y,
                width,
                height,
            } => Placement::Exact(Rect::from_origin_size((x, y), (width, height))),
        }
    }
}

fn default_placement() -> ScriptPlacement {
    ScriptPlacement::Default
}

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum Step {
    Pointer(PointerEvent),
    SetTool { tool: Tool },
    SetEraserMode { mode: EraserMode },
    SetColor { color: InkColor },
    SetStrokeWidth { width: f64 },
    SetPalmRejection { enabled: bool },
    SetPaper { pattern: PaperPattern },
    SetTheme { theme: Theme },
    SetLayoutOrigin { x: f64, y: f64 },
    Zoom { value: f64 },
    ZoomIn,
    ZoomOut,
    NextPage,
    PrevPage,
    LoadPage { index: usize },
    InsertImage {
        path: PathBuf,
        #[serde(default = "default_placement")]
        placement: ScriptPlacement,
    },
    Background { path: PathBuf },
    SetOpacity { value: f64 },
    RemoveSelected,
    Save,
}

/// A parsed replay script.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let mut script: Script = serde_json::from_str(json)?;
        if let Some(config) = script.config.as_mut() {
            config.normalize();
        }
        Ok(script)
    }

    pub fn from_path(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Counters reported after a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    /// Image and background loads that produced nothing.
    pub failed_loads: usize,
}

/// Run every step against the engine. Image paths are resolved against
/// `base_dir`. Unreadable or undecodable images are logged and skipped.
pub async fn run_script(
    engine: &mut Engine,
    script: &Script,
    decoder: &dyn ImageDecoder,
    base_dir: &Path,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for step in &script.steps {
        summary.steps += 1;
        let applied = match step {
            Step::Pointer(event) => {
                engine.handle_pointer(*event);
                true
            }
            Step::SetTool { tool } => {
                engine.set_tool(*tool);
                true
            }
            Step::SetEraserMode { mode } => {
                engine.set_eraser_mode(*mode);
                true
            }
            Step::SetColor { color } => {
                engine.set_color(*color);
                true
            }
            Step::SetStrokeWidth { width } => {
                engine.set_stroke_width(*width);
                true
            }
            Step::SetPalmRejection { enabled } => {
                engine.set_palm_rejection(*enabled);
                true
            }
            Step::SetPaper { pattern } => {
                engine.set_paper_pattern(*pattern);
                true
            }
            Step::SetTheme { theme } => {
                engine.set_theme(*theme);
                true
            }
            Step::SetLayoutOrigin { x, y } => {
                engine.set_layout_origin(Point::new(*x, *y));
                true
            }
            Step::Zoom { value } => {
                engine.set_zoom(*value);
                true
            }
            Step::ZoomIn => {
                engine.zoom_in();
                true
            }
            Step::ZoomOut => {
                engine.zoom_out();
                true
            }
            Step::NextPage => {
                engine.next_page();
                true
            }
            Step::PrevPage => {
                engine.prev_page();
                true
            }
            Step::LoadPage { index } => {
                engine.load_page(*index);
                true
            }
            Step::InsertImage { path, placement } => match read_image(base_dir, path) {
                Some(bytes) => {
                    engine
                        .insert_image(decoder, bytes, Placement::from(*placement))
                        .await
                }
                None => false,
            },
            Step::Background { path } => match read_image(base_dir, path) {
                Some(bytes) => engine.load_background(decoder, bytes).await,
                None => false,
            },
            Step::SetOpacity { value } => {
                engine.set_selected_opacity(*value);
                true
            }
            Step::RemoveSelected => {
                engine.remove_selected();
                true
            }
            Step::Save => {
                engine.save();
                true
            }
        };
        if !applied {
            summary.failed_loads += 1;
        }
    }
    summary
}

fn read_image(base_dir: &Path, path: &Path) -> Option<Vec<u8>> {
    let full = base_dir.join(path);
    match std::fs::read(&full) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("Cannot read {}: {}", full.display(), e);
            None
        }
    }
}
