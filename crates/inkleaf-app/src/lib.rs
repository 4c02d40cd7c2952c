//! Inkleaf Application
//!
//! The engine facade tying the core data model to the raster compositor,
//! and the script runner used by the `inkleaf` replay tool.

mod engine;
mod script;

pub use engine::{Engine, EngineError};
pub use script::{ReplayError, ReplaySummary, Script, ScriptPlacement, Step, run_script};
