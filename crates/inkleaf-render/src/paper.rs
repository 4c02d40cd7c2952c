//! Decorative paper shown beneath the ink.
//!
//! The paper is composed only for display. Snapshots read the ink surface
//! directly and never include it.

use crate::RenderError;
use crate::surface::Surface;
use inkleaf_core::{PaperPattern, Theme};
use tiny_skia::{Color, Paint, Pixmap, PixmapPaint, Rect, Transform};

/// Ruled line pitch, in screen pixels.
pub const RULED_SPACING: f64 = 30.0;
/// Grid cell size, in screen pixels.
pub const GRID_SPACING: f64 = 20.0;

fn paper_color(theme: Theme) -> Color {
    match theme {
        Theme::Light => Color::WHITE,
        Theme::Dark => Color::from_rgba8(0x09, 0x09, 0x0B, 255),
    }
}

fn line_paint(theme: Theme) -> Paint<'static> {
    let mut paint = Paint::default();
    match theme {
        Theme::Light => paint.set_color_rgba8(0, 0, 0, 26),
        Theme::Dark => paint.set_color_rgba8(255, 255, 255, 26),
    }
    paint.anti_alias = true;
    paint
}

/// Compose paper and ink for display.
///
/// Line pitch and thickness are given in screen pixels and divided by
/// `zoom`, so the pattern looks the same at every zoom level.
pub fn compose_display(
    surface: &Surface,
    pattern: PaperPattern,
    theme: Theme,
    zoom: f64,
) -> Result<Pixmap, RenderError> {
    let (width, height) = (surface.width(), surface.height());
    let mut frame =
        Pixmap::new(width, height).ok_or(RenderError::SurfaceAlloc { width, height })?;
    frame.fill(paper_color(theme));

    let zoom = if zoom > 0.0 { zoom } else { 1.0 };
    let thickness = (1.0 / zoom) as f32;
    let paint = line_paint(theme);
    let (w, h) = (width as f32, height as f32);

    let mut rows = |spacing: f64| {
        let step = spacing / zoom;
        let mut y = 0.0;
        while y < height as f64 {
            if let Some(rect) = Rect::from_xywh(0.0, y as f32, w, thickness) {
                frame.fill_rect(rect, &paint, Transform::identity(), None);
            }
            y += step;
        }
    };
    match pattern {
        PaperPattern::Blank => {}
        PaperPattern::Ruled => rows(RULED_SPACING),
        PaperPattern::Grid => {
            rows(GRID_SPACING);
            let step = GRID_SPACING / zoom;
            let mut x = 0.0;
            while x < width as f64 {
                if let Some(rect) = Rect::from_xywh(x as f32, 0.0, thickness, h) {
                    frame.fill_rect(rect, &paint, Transform::identity(), None);
                }
                x += step;
            }
        }
    }

    frame.draw_pixmap(
        0,
        0,
        surface.pixmap().as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(frame)
}
