//! PNG snapshots of the surface.

use crate::RenderError;
use crate::surface::Surface;
use inkleaf_core::Snapshot;

/// Encode straight RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()?;
    }
    Ok(png_data)
}

/// Straight-alpha copy of the surface pixels.
pub fn demultiplied_rgba(surface: &Surface) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(surface.data().len());
    for pixel in surface.pixmap().pixels() {
        let c = pixel.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    rgba
}

/// Read back the full-resolution surface and encode it for the sink.
pub fn take_snapshot(surface: &Surface, page_index: usize) -> Result<Snapshot, RenderError> {
    let rgba = demultiplied_rgba(surface);
    let png = encode_png(&rgba, surface.width(), surface.height())?;
    log::debug!(
        "Snapshot of page {}: {}x{}, {} bytes",
        page_index,
        surface.width(),
        surface.height(),
        png.len()
    );
    Ok(Snapshot {
        page_index,
        width: surface.width(),
        height: surface.height(),
        png,
    })
}
