//! Inkleaf Core Library
//!
//! Platform-agnostic data model and interaction logic for the Inkleaf
//! annotation canvas: strokes, placed images, pages, pointer routing and
//! snapshot persistence.

pub mod config;
pub mod image;
pub mod input;
pub mod notebook;
pub mod raster;
pub mod router;
pub mod storage;
pub mod stroke;
pub mod style;
pub mod viewport;

pub use config::{ConfigError, EngineConfig, EraseHitMode, EraserMode, PaperPattern, Theme, Tool};
pub use image::{Corner, ImageObject, ImageStore, Placement, resize_rect};
pub use input::{PointerEvent, PointerKind, PointerPhase};
pub use notebook::{DecodeTarget, DecodeTicket, Notebook, Page, PageId, StaleReason};
pub use raster::{BoxFuture, DecodeError, ImageDecoder, Raster};
pub use router::{GestureState, Paint, Response, Router};
pub use storage::{FileSink, MemorySink, Snapshot, SnapshotSink, StorageError, StorageResult};
pub use stroke::{Stroke, StrokeHandle, StrokeStore};
pub use style::{InkColor, PALETTE, StrokeStyle, StrokeTool};
pub use viewport::Viewport;
