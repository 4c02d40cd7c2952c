//! Placed raster images and their resize handles.

use crate::raster::Raster;
use kurbo::{Point, Rect, Size, Vec2};

/// Default top-left corner of an inserted image.
pub const DEFAULT_IMAGE_ORIGIN: Point = Point::new(100.0, 100.0);
/// Default display width of an inserted image.
pub const DEFAULT_IMAGE_WIDTH: f64 = 300.0;

/// Corner positions of the resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All corners, in hit-test order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Position of this corner on `rect`.
    pub fn position(self, rect: Rect) -> Point {
        match self {
            Corner::TopLeft => Point::new(rect.x0, rect.y0),
            Corner::TopRight => Point::new(rect.x1, rect.y0),
            Corner::BottomLeft => Point::new(rect.x0, rect.y1),
            Corner::BottomRight => Point::new(rect.x1, rect.y1),
        }
    }
}

/// Resize `origin` by dragging `corner` by `delta`, without aspect lock.
///
/// Width and height never drop below `min_size`. The opposite edge is not
/// pinned when the floor kicks in: a top-left drag past the far edge still
/// moves the origin.
pub fn resize_rect(origin: Rect, corner: Corner, delta: Vec2, min_size: f64) -> Rect {
    let (mut x, mut y) = (origin.x0, origin.y0);
    let (mut w, mut h) = (origin.width(), origin.height());
    match corner {
        Corner::BottomRight => {
            w += delta.x;
            h += delta.y;
        }
        Corner::BottomLeft => {
            x += delta.x;
            w -= delta.x;
            h += delta.y;
        }
        Corner::TopRight => {
            y += delta.y;
            w += delta.x;
            h -= delta.y;
        }
        Corner::TopLeft => {
            x += delta.x;
            y += delta.y;
            w -= delta.x;
            h -= delta.y;
        }
    }
    Rect::from_origin_size((x, y), (w.max(min_size), h.max(min_size)))
}

/// Where a newly decoded image lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Scale to a display width, keeping the aspect ratio.
    FitWidth { origin: Point, width: f64 },
    /// Keep the decoded pixel size.
    Natural { origin: Point },
    /// Explicit geometry.
    Exact(Rect),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::FitWidth {
            origin: DEFAULT_IMAGE_ORIGIN,
            width: DEFAULT_IMAGE_WIDTH,
        }
    }
}

impl Placement {
    /// Geometry for an image of natural size `natural`, floored at `min_size`.
    pub fn resolve(self, natural: Size, min_size: f64) -> Rect {
        let (origin, size) = match self {
            Placement::FitWidth { origin, width } => {
                let height = if natural.width > 0.0 {
                    width * natural.height / natural.width
                } else {
                    width
                };
                (origin, Size::new(width, height))
            }
            Placement::Natural { origin } => (origin, natural),
            Placement::Exact(rect) => (rect.origin(), rect.size()),
        };
        Rect::from_origin_size(
            origin,
            (size.width.max(min_size), size.height.max(min_size)),
        )
    }
}

/// A raster placed on the page.
#[derive(Debug, Clone)]
pub struct ImageObject {
    raster: Raster,
    /// Top-left corner position.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Opacity in [0, 1].
    pub opacity: f64,
}

impl ImageObject {
    pub fn new(raster: Raster, rect: Rect) -> Self {
        Self {
            raster,
            position: rect.origin(),
            width: rect.width(),
            height: rect.height(),
            opacity: 1.0,
        }
    }

    /// The decoded pixels, shared read-only.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Get the bounding rectangle.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    fn set_rect(&mut self, rect: Rect) {
        self.position = rect.origin();
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Edges count as inside.
    pub fn hit_test(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.height
    }

    /// Handle positions, derived from the current geometry.
    pub fn handles(&self) -> [(Corner, Point); 4] {
        let rect = self.as_rect();
        Corner::ALL.map(|corner| (corner, corner.position(rect)))
    }

    /// The first handle strictly within `radius` of `point`.
    pub fn handle_at(&self, point: Point, radius: f64) -> Option<Corner> {
        self.handles()
            .into_iter()
            .find(|(_, pos)| pos.distance(point) < radius)
            .map(|(corner, _)| corner)
    }
}

/// Ordered image list (back-to-front) with at most one selected entry.
#[derive(Debug, Clone, Default)]
pub struct ImageStore {
    images: Vec<ImageObject>,
    selected: Option<usize>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an image on top of the stack and select it.
    pub fn add(&mut self, raster: Raster, placement: Placement, min_size: f64) -> usize {
        let rect = placement.resolve(raster.size(), min_size);
        self.images.push(ImageObject::new(raster, rect));
        let index = self.images.len() - 1;
        self.selected = Some(index);
        index
    }

    pub fn images(&self) -> &[ImageObject] {
        &self.images
    }

    pub fn get(&self, index: usize) -> Option<&ImageObject> {
        self.images.get(index)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_image(&self) -> Option<&ImageObject> {
        self.selected.and_then(|i| self.images.get(i))
    }

    /// Select an index or clear the selection. Out-of-range indices are
    /// ignored. Returns true if the selection changed.
    pub fn select(&mut self, index: Option<usize>) -> bool {
        if let Some(i) = index {
            if i >= self.images.len() {
                return false;
            }
        }
        let changed = self.selected != index;
        self.selected = index;
        changed
    }

    /// Index of the topmost image containing `point`.
    pub fn topmost_at(&self, point: Point) -> Option<usize> {
        self.images.iter().rposition(|image| image.hit_test(point))
    }

    /// Resize handle of the selected image within `radius` of `point`.
    pub fn handle_at(&self, point: Point, radius: f64) -> Option<Corner> {
        self.selected_image()?.handle_at(point, radius)
    }

    /// Translate the selected image.
    pub fn move_selected(&mut self, delta: Vec2) -> bool {
        let Some(image) = self.selected_mut() else {
            return false;
        };
        image.position += delta;
        true
    }

    /// Resize the selected image from its current geometry.
    pub fn resize_selected(&mut self, corner: Corner, delta: Vec2, min_size: f64) -> bool {
        let Some(image) = self.selected_mut() else {
            return false;
        };
        let rect = resize_rect(image.as_rect(), corner, delta, min_size);
        image.set_rect(rect);
        true
    }

    /// Replace the selected image's geometry.
    pub fn set_selected_rect(&mut self, rect: Rect) -> bool {
        let Some(image) = self.selected_mut() else {
            return false;
        };
        image.set_rect(rect);
        true
    }

    /// Set an image's opacity, clamped to [0, 1]. Non-finite values are ignored.
    pub fn set_opacity(&mut self, index: usize, opacity: f64) -> bool {
        if !opacity.is_finite() {
            return false;
        }
        match self.images.get_mut(index) {
            Some(image) => {
                image.opacity = opacity.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    /// Remove an image, keeping the selection pointed at the same object.
    pub fn remove(&mut self, index: usize) -> Option<ImageObject> {
        if index >= self.images.len() {
            return None;
        }
        let removed = self.images.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        Some(removed)
    }

    pub fn remove_selected(&mut self) -> Option<ImageObject> {
        self.remove(self.selected?)
    }

    fn selected_mut(&mut self) -> Option<&mut ImageObject> {
        self.selected.and_then(|i| self.images.get_mut(i))
    }
}
