//! Inkleaf Render Library
//!
//! CPU rasterization for Inkleaf pages using tiny-skia, plus image decoding
//! and PNG snapshot encoding.

mod compositor;
mod decode;
pub mod paper;
mod snapshot;
mod surface;

pub use compositor::{Compositor, SELECTION_COLOR, Scene, SelectionMetrics, SelectionStyle};
pub use decode::{ImageCrateDecoder, decode_bytes};
pub use paper::compose_display;
pub use snapshot::{demultiplied_rgba, encode_png, take_snapshot};
pub use surface::{Surface, pixel_size};

use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} surface")]
    SurfaceAlloc { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;
