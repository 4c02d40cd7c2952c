//! Decoded raster handles and the asynchronous decoder seam.

use kurbo::Size;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Image decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported image format")]
    UnsupportedFormat,
    #[error("Malformed image data: {0}")]
    Malformed(String),
    #[error("Image has no pixels")]
    Empty,
}

/// An immutable, shared, premultiplied RGBA8 raster.
///
/// Cloning is cheap: clones share the same pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    inner: Arc<RasterData>,
}

#[derive(PartialEq, Eq)]
struct RasterData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// Wrap premultiplied RGBA8 pixels.
    ///
    /// Returns `None` if either dimension is zero or the buffer length
    /// doesn't match `width * height * 4`.
    pub fn from_premultiplied(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if width == 0 || height == 0 || pixels.len() != expected {
            return None;
        }
        Some(Self {
            inner: Arc::new(RasterData {
                width,
                height,
                pixels,
            }),
        })
    }

    /// Wrap straight (non-premultiplied) RGBA8 pixels.
    pub fn from_rgba(width: u32, height: u32, mut pixels: Vec<u8>) -> Option<Self> {
        for px in pixels.chunks_exact_mut(4) {
            let a = px[3] as u16;
            if a != 255 {
                px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
                px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
                px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
            }
        }
        Self::from_premultiplied(width, height, pixels)
    }

    /// A raster filled with one opaque color.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Option<Self> {
        let count = (width as usize).checked_mul(height as usize)?;
        let pixels = [rgb[0], rgb[1], rgb[2], 255].repeat(count);
        Self::from_premultiplied(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Natural size in internal units.
    pub fn size(&self) -> Size {
        Size::new(self.inner.width as f64, self.inner.height as f64)
    }

    /// Premultiplied RGBA8 pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.inner.pixels
    }

    /// True if both handles share the same buffer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .finish_non_exhaustive()
    }
}

/// Turns encoded image bytes into a [`Raster`].
///
/// Decoding is a single-shot future; the caller decides whether the result
/// is still wanted when it resolves.
pub trait ImageDecoder {
    fn decode(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<Raster, DecodeError>>;
}
