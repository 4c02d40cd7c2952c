//! Raster surface backed by a tiny-skia pixmap.

use crate::RenderError;
use inkleaf_core::{InkColor, Raster, StrokeStyle};
use kurbo::{Point, Rect, Size};
use tiny_skia::{
    BlendMode, Color, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, PixmapRef, Stroke, Transform,
};

/// Pixel dimensions for an internal size (at least 1x1).
pub fn pixel_size(size: Size) -> (u32, u32) {
    let dim = |v: f64| {
        if v.is_finite() {
            v.round().clamp(1.0, u32::MAX as f64) as u32
        } else {
            1
        }
    };
    (dim(size.width), dim(size.height))
}

/// The canvas' full-resolution pixel buffer.
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(size: Size) -> Result<Self, RenderError> {
        let (width, height) = pixel_size(size);
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceAlloc { width, height })?;
        Ok(Self { pixmap })
    }

    /// Match a new internal size. Contents are discarded if the size changes.
    pub fn resize(&mut self, size: Size) -> Result<bool, RenderError> {
        let (width, height) = pixel_size(size);
        if width == self.width() && height == self.height() {
            return Ok(false);
        }
        *self = Self::new(size)?;
        Ok(true)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Premultiplied RGBA8 pixels.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Premultiplied RGBA8 value at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.pixel(x, y)?;
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Draw a raster scaled into `rect`.
    pub fn draw_raster(&mut self, raster: &Raster, rect: Rect, opacity: f64) {
        let Some(source) = PixmapRef::from_bytes(raster.pixels(), raster.width(), raster.height())
        else {
            log::warn!("Skipping raster with inconsistent buffer: {:?}", raster);
            return;
        };
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return;
        }
        let transform = Transform::from_row(
            (rect.width() / raster.width() as f64) as f32,
            0.0,
            0.0,
            (rect.height() / raster.height() as f64) as f32,
            rect.x0 as f32,
            rect.y0 as f32,
        );
        let paint = PixmapPaint {
            opacity: opacity.clamp(0.0, 1.0) as f32,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Bilinear,
        };
        self.pixmap.draw_pixmap(0, 0, source, &paint, transform, None);
    }

    /// Paint the first point of a stroke: a disc one line-width across.
    pub fn paint_dot(&mut self, center: Point, style: &StrokeStyle) {
        if style.width <= 0.0 {
            return;
        }
        let Some(path) =
            PathBuilder::from_circle(center.x as f32, center.y as f32, (style.width / 2.0) as f32)
        else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &ink_paint(style),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }

    /// Paint one stroke segment with round caps and joins.
    pub fn paint_segment(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        if from == to {
            self.paint_dot(to, style);
            return;
        }
        if style.width <= 0.0 {
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        let Some(path) = pb.finish() else {
            return;
        };
        let stroke = Stroke {
            width: style.width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &ink_paint(style), &stroke, Transform::identity(), None);
    }

    /// Replay a whole stroke exactly as it was painted live: the first point
    /// as a dot, then one segment per new point.
    pub fn paint_stroke(&mut self, points: &[Point], style: &StrokeStyle) {
        let Some(first) = points.first() else {
            return;
        };
        self.paint_dot(*first, style);
        for pair in points.windows(2) {
            self.paint_segment(pair[0], pair[1], style);
        }
    }

    /// Stroke a rectangle outline.
    pub fn outline_rect(&mut self, rect: Rect, color: InkColor, width: f64) {
        let Some(r) = tiny_skia::Rect::from_ltrb(
            rect.x0 as f32,
            rect.y0 as f32,
            rect.x1 as f32,
            rect.y1 as f32,
        ) else {
            return;
        };
        let path = PathBuilder::from_rect(r);
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &solid_paint(color, 255),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    /// A filled, outlined disc.
    pub fn disc(&mut self, center: Point, radius: f64, fill: InkColor, outline: InkColor, width: f64) {
        let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32)
        else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &solid_paint(fill, 255),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
        let stroke = Stroke {
            width: width as f32,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &solid_paint(outline, 255),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

fn solid_paint(color: InkColor, alpha: u8) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, alpha);
    paint.anti_alias = true;
    paint
}

/// Paint for a stroke. Built per call so blend state never carries over.
fn ink_paint(style: &StrokeStyle) -> Paint<'static> {
    if style.is_eraser {
        let mut paint = solid_paint(InkColor::BLACK, 255);
        paint.blend_mode = BlendMode::DestinationOut;
        return paint;
    }
    let alpha = (style.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    solid_paint(style.color, alpha)
}
