//! Full-page compositing and incremental stroke painting.
//!
//! A full render and the live, point-by-point painting of the same strokes
//! must produce identical bytes. Both paths therefore go through
//! [`Surface::paint_dot`] and [`Surface::paint_segment`] with the same
//! arguments in the same order.

use crate::surface::Surface;
use inkleaf_core::{EngineConfig, ImageObject, InkColor, Page, Paint, Raster, StrokeStore};
use kurbo::Rect;

/// Selection outline and handle color (#00CED1).
pub const SELECTION_COLOR: InkColor = InkColor::new(0x00, 0xCE, 0xD1);

/// Selection overlay sizes, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStyle {
    pub color: InkColor,
    pub line_width: f64,
    pub handle_radius: f64,
}

impl Default for SelectionStyle {
    fn default() -> Self {
        Self {
            color: SELECTION_COLOR,
            line_width: 2.0,
            handle_radius: 6.0,
        }
    }
}

/// Selection overlay sizes converted to internal units for one zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionMetrics {
    pub line_width: f64,
    pub handle_radius: f64,
}

impl SelectionStyle {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            color: SELECTION_COLOR,
            line_width: config.selection_line_width,
            handle_radius: config.handle_radius,
        }
    }

    /// Sizes divided by zoom so the overlay keeps its on-screen size.
    pub fn metrics(&self, zoom: f64) -> SelectionMetrics {
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        SelectionMetrics {
            line_width: self.line_width / zoom,
            handle_radius: self.handle_radius / zoom,
        }
    }
}

/// Everything a full render depends on.
#[derive(Clone, Copy)]
pub struct Scene<'a> {
    pub background: Option<&'a Raster>,
    pub images: &'a [ImageObject],
    pub strokes: &'a StrokeStore,
    pub selected: Option<usize>,
    pub zoom: f64,
}

impl<'a> Scene<'a> {
    /// The scene of a notebook page.
    pub fn from_page(page: &'a Page, zoom: f64) -> Self {
        Self {
            background: page.background(),
            images: page.images.images(),
            strokes: &page.strokes,
            selected: page.images.selected(),
            zoom,
        }
    }
}

/// Deterministic page renderer.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    selection: SelectionStyle,
}

impl Compositor {
    pub fn new(selection: SelectionStyle) -> Self {
        Self { selection }
    }

    pub fn selection_style(&self) -> &SelectionStyle {
        &self.selection
    }

    pub fn set_selection_style(&mut self, selection: SelectionStyle) {
        self.selection = selection;
    }

    /// Redraw the whole surface from the scene.
    pub fn render(&self, surface: &mut Surface, scene: &Scene<'_>) {
        surface.clear();

        if let Some(background) = scene.background {
            let rect = Rect::from_origin_size((0.0, 0.0), background.size());
            surface.draw_raster(background, rect, 1.0);
        }

        for (index, image) in scene.images.iter().enumerate() {
            surface.draw_raster(image.raster(), image.as_rect(), image.opacity);
            if scene.selected == Some(index) {
                self.draw_selection(surface, image, scene.zoom);
            }
        }

        for stroke in scene.strokes.iter_paint_order() {
            surface.paint_stroke(stroke.points(), stroke.style());
        }
    }

    /// Apply one incremental paint on top of the current contents.
    pub fn paint(&self, surface: &mut Surface, paint: &Paint) {
        match paint {
            Paint::Dot { center, style } => surface.paint_dot(*center, style),
            Paint::Segment { from, to, style } => surface.paint_segment(*from, *to, style),
        }
    }

    fn draw_selection(&self, surface: &mut Surface, image: &ImageObject, zoom: f64) {
        let metrics = self.selection.metrics(zoom);
        surface.outline_rect(image.as_rect(), self.selection.color, metrics.line_width);
        for (_, position) in image.handles() {
            surface.disc(
                position,
                metrics.handle_radius,
                InkColor::WHITE,
                self.selection.color,
                metrics.line_width,
            );
        }
    }
}
