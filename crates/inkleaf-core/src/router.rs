//! Interaction router: turns one pointer stream into draw, erase, select,
//! drag and resize gestures.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Resizing   (down within the handle radius of the selected image)
//! Idle -> Dragging   (down on an image with a pointer allowed to select)
//! Idle -> Drawing    (down with an inking tool, or the object eraser)
//!
//! Any -> Idle        (up/leave - finalizes the gesture)
//! ```
//!
//! Points handed to the router are already in internal canvas space.

use crate::config::{EngineConfig, Tool};
use crate::image::{Corner, resize_rect};
use crate::input::PointerKind;
use crate::notebook::Page;
use crate::stroke::{CommitOutcome, StrokeHandle};
use crate::style::StrokeStyle;
use kurbo::{Point, Rect, Vec2};

/// Gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Laying ink, or sweeping the object eraser when `stroke` is `None`.
    Drawing {
        stroke: Option<StrokeHandle>,
        /// Object eraser removed at least one stroke during this gesture.
        erased: bool,
    },
    /// Moving the selected image.
    Dragging {
        /// Pointer position relative to the image's top-left corner.
        offset: Vec2,
    },
    /// Resizing the selected image from one corner.
    Resizing {
        corner: Corner,
        start: Point,
        /// Geometry when the gesture began.
        origin: Rect,
    },
}

/// Paint that can be applied to the current surface without a redraw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Dot { center: Point, style: StrokeStyle },
    Segment { from: Point, to: Point, style: StrokeStyle },
}

/// What the host must do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Response {
    /// Recomposite the whole page.
    pub redraw: bool,
    /// Incremental paint. Never set together with `redraw`, which already
    /// includes it.
    pub paint: Option<Paint>,
    /// Snapshot the page and hand it to the sink.
    pub save: bool,
}

impl Response {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    pub fn paint(paint: Paint) -> Self {
        Self {
            paint: Some(paint),
            ..Self::default()
        }
    }

    fn with_redraw(mut self, redraw: bool) -> Self {
        if redraw {
            self.redraw = true;
            self.paint = None;
        }
        self
    }

    fn with_save(mut self) -> Self {
        self.save = true;
        self
    }
}

/// Pointer gesture state machine.
#[derive(Debug, Clone, Default)]
pub struct Router {
    state: GestureState,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Classify a pointer-down.
    pub fn pointer_down(
        &mut self,
        page: &mut Page,
        config: &EngineConfig,
        zoom: f64,
        point: Point,
        kind: PointerKind,
    ) -> Response {
        if !self.is_idle() {
            // A second down without an up: close the old gesture first.
            let closed = self.pointer_up(page, config);
            let mut opened = self.pointer_down(page, config, zoom, point, kind);
            opened.save |= closed.save;
            return opened.with_redraw(closed.redraw);
        }

        let hit_radius = config.handle_hit_radius / zoom;
        if let Some(corner) = page.images.handle_at(point, hit_radius) {
            if let Some(image) = page.images.selected_image() {
                log::debug!("Resize from {corner:?}");
                self.state = GestureState::Resizing {
                    corner,
                    start: point,
                    origin: image.as_rect(),
                };
                return Response::none();
            }
        }

        let can_select = !kind.is_stylus() || config.tool == Tool::Move;
        if can_select && config.tool != Tool::Eraser {
            if let Some(index) = page.images.topmost_at(point) {
                page.images.select(Some(index));
                if let Some(image) = page.images.get(index) {
                    log::debug!("Drag image {index}");
                    self.state = GestureState::Dragging {
                        offset: point - image.position,
                    };
                }
                return Response::redraw();
            }
        }

        let mut redraw = false;
        if can_select && page.images.selected().is_some() {
            page.images.select(None);
            redraw = true;
        }

        if config.palm_rejection && !kind.is_stylus() {
            return Response::none().with_redraw(redraw);
        }

        if config.is_object_eraser() {
            let removed = page
                .strokes
                .erase_at(point, config.erase_radius, config.erase_hit_mode);
            self.state = GestureState::Drawing {
                stroke: None,
                erased: removed > 0,
            };
            return Response::none().with_redraw(redraw || removed > 0);
        }

        let Some((tool, style)) = config.stroke_style() else {
            return Response::none().with_redraw(redraw);
        };
        let handle = page.strokes.begin_stroke(tool, style, point);
        self.state = GestureState::Drawing {
            stroke: Some(handle),
            erased: false,
        };
        Response::paint(Paint::Dot {
            center: point,
            style,
        })
        .with_redraw(redraw)
    }

    /// Continue the current gesture.
    pub fn pointer_move(&mut self, page: &mut Page, config: &EngineConfig, point: Point) -> Response {
        match self.state {
            GestureState::Idle => Response::none(),
            GestureState::Resizing {
                corner,
                start,
                origin,
            } => {
                let rect = resize_rect(origin, corner, point - start, config.min_image_size);
                page.images.set_selected_rect(rect);
                Response::redraw()
            }
            GestureState::Dragging { offset } => {
                let Some(image) = page.images.selected_image() else {
                    return Response::none();
                };
                let delta = (point - offset) - image.position;
                page.images.move_selected(delta);
                Response::redraw()
            }
            GestureState::Drawing {
                stroke: Some(handle),
                ..
            } => {
                let Some(from) = page.strokes.extend_stroke(handle, point) else {
                    return Response::none();
                };
                let Some(style) = page.strokes.current().map(|s| *s.style()) else {
                    return Response::none();
                };
                Response::paint(Paint::Segment {
                    from,
                    to: point,
                    style,
                })
            }
            GestureState::Drawing {
                stroke: None,
                erased,
            } => {
                let removed = page
                    .strokes
                    .erase_at(point, config.erase_radius, config.erase_hit_mode);
                self.state = GestureState::Drawing {
                    stroke: None,
                    erased: erased || removed > 0,
                };
                if removed > 0 {
                    Response::redraw()
                } else {
                    Response::none()
                }
            }
        }
    }

    /// Finish the current gesture (pointer up or leave).
    pub fn pointer_up(&mut self, page: &mut Page, config: &EngineConfig) -> Response {
        let state = std::mem::take(&mut self.state);
        match state {
            GestureState::Idle => Response::none(),
            GestureState::Resizing { .. } | GestureState::Dragging { .. } => {
                Response::redraw().with_save()
            }
            GestureState::Drawing {
                stroke: Some(handle),
                ..
            } => match page.strokes.commit_stroke(handle, config.discard_dot_strokes) {
                CommitOutcome::Committed(index) => {
                    log::debug!("Committed stroke {index}");
                    Response::none().with_save()
                }
                CommitOutcome::Discarded => Response::redraw(),
                CommitOutcome::Stale => Response::none(),
            },
            GestureState::Drawing {
                stroke: None,
                erased,
            } => {
                if erased {
                    Response::none().with_save()
                } else {
                    Response::none()
                }
            }
        }
    }

    /// Abandon gesture tracking without touching the page.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }
}
