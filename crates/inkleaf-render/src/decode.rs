//! Image decoding with the `image` crate (PNG, JPEG, WebP).

use inkleaf_core::{BoxFuture, DecodeError, ImageDecoder, Raster};

/// Decode encoded bytes into a premultiplied raster.
pub fn decode_bytes(bytes: &[u8]) -> Result<Raster, DecodeError> {
    let image = image::load_from_memory(bytes).map_err(|e| match e {
        image::ImageError::Unsupported(_) => DecodeError::UnsupportedFormat,
        other => DecodeError::Malformed(other.to_string()),
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty);
    }
    Raster::from_rgba(width, height, rgba.into_raw()).ok_or(DecodeError::Empty)
}

/// [`ImageDecoder`] backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageCrateDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: Vec<u8>) -> BoxFuture<'_, Result<Raster, DecodeError>> {
        Box::pin(async move { decode_bytes(&bytes) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::encode_png;

    #[test]
    fn test_decodes_png() {
        let rgba = [255, 0, 0, 255, 0, 255, 0, 128];
        let png = encode_png(&rgba, 2, 1).unwrap();

        let raster = pollster::block_on(ImageCrateDecoder::new().decode(png)).unwrap();
        assert_eq!((raster.width(), raster.height()), (2, 1));
        // Second pixel is premultiplied.
        assert_eq!(raster.pixels(), &[255, 0, 0, 255, 0, 128, 0, 128]);
    }

    #[test]
    fn test_rejects_garbage() {
        let result = pollster::block_on(ImageCrateDecoder::new().decode(b"not an image".to_vec()));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_truncated_png() {
        let png = encode_png(&[0; 16], 2, 2).unwrap();
        assert!(decode_bytes(&png[..png.len() / 2]).is_err());
    }
}
