//! Ink strokes and the per-page stroke log.

use crate::config::EraseHitMode;
use crate::style::{StrokeStyle, StrokeTool};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A recorded ink stroke (series of points in internal space).
///
/// Strokes are immutable once committed to a [`StrokeStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
    tool: StrokeTool,
    style: StrokeStyle,
}

impl Stroke {
    /// Create a stroke seeded with its first point.
    pub fn new(tool: StrokeTool, style: StrokeStyle, first: Point) -> Self {
        Self {
            points: vec![first],
            tool,
            style,
        }
    }

    /// Create from existing points. Returns `None` for an empty point list.
    pub fn from_points(tool: StrokeTool, style: StrokeStyle, points: Vec<Point>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self { points, tool, style })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn tool(&self) -> StrokeTool {
        self.tool
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn is_eraser(&self) -> bool {
        self.style.is_eraser
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a stroke built through `new` or `from_points`.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the points, not including the line width.
    pub fn bounds(&self) -> Rect {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(*first, *first), |rect, p| {
            rect.union_pt(*p)
        })
    }

    /// Whether `point` is within `radius` of the stroke's inked area.
    ///
    /// In [`EraseHitMode::Vertex`] only recorded points count, so fast
    /// strokes with sparse samples can be missed between points.
    pub fn hit_test(&self, point: Point, radius: f64, mode: EraseHitMode) -> bool {
        let reach = radius + self.style.width / 2.0;
        match mode {
            EraseHitMode::Vertex => self.points.iter().any(|p| p.distance(point) < reach),
            EraseHitMode::Segment => {
                if self.points.len() == 1 {
                    return self.points[0].distance(point) < reach;
                }
                point_to_polyline_dist(point, &self.points) < reach
            }
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Generational handle to the in-progress stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrokeHandle(u64);

/// Result of committing the in-progress stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Appended to the log at this index.
    Committed(usize),
    /// Seed-only stroke dropped by policy.
    Discarded,
    /// The handle did not refer to the open stroke.
    Stale,
}

/// Ordered log of committed strokes plus at most one open stroke.
#[derive(Debug, Clone, Default)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
    current: Option<(StrokeHandle, Stroke)>,
    next_handle: u64,
}

impl StrokeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new stroke seeded with `first`.
    ///
    /// Any stroke still open is committed first so no ink is lost.
    pub fn begin_stroke(&mut self, tool: StrokeTool, style: StrokeStyle, first: Point) -> StrokeHandle {
        if let Some((handle, _)) = self.current {
            self.commit_stroke(handle, false);
        }
        let handle = StrokeHandle(self.next_handle);
        self.next_handle += 1;
        self.current = Some((handle, Stroke::new(tool, style, first)));
        handle
    }

    /// Append a point to the open stroke. Returns the previous last point
    /// (the start of the new segment), or `None` for a stale handle.
    pub fn extend_stroke(&mut self, handle: StrokeHandle, point: Point) -> Option<Point> {
        match &mut self.current {
            Some((open, stroke)) if *open == handle => {
                let prev = stroke.points.last().copied();
                stroke.points.push(point);
                prev
            }
            _ => None,
        }
    }

    /// Move the open stroke into the log.
    pub fn commit_stroke(&mut self, handle: StrokeHandle, discard_dots: bool) -> CommitOutcome {
        match self.current.take() {
            Some((open, stroke)) if open == handle => {
                if discard_dots && stroke.len() < 2 {
                    return CommitOutcome::Discarded;
                }
                self.strokes.push(stroke);
                CommitOutcome::Committed(self.strokes.len() - 1)
            }
            other => {
                self.current = other;
                CommitOutcome::Stale
            }
        }
    }

    /// Remove every non-eraser stroke hit at `point`. Returns the number removed.
    pub fn erase_at(&mut self, point: Point, radius: f64, mode: EraseHitMode) -> usize {
        let before = self.strokes.len();
        self.strokes
            .retain(|stroke| stroke.is_eraser() || !stroke.hit_test(point, radius, mode));
        before - self.strokes.len()
    }

    /// Committed strokes in log order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The open stroke, if any.
    pub fn current(&self) -> Option<&Stroke> {
        self.current.as_ref().map(|(_, stroke)| stroke)
    }

    pub fn current_handle(&self) -> Option<StrokeHandle> {
        self.current.as_ref().map(|(handle, _)| *handle)
    }

    /// Committed strokes followed by the open stroke: the paint order.
    pub fn iter_paint_order(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().chain(self.current())
    }

    /// Number of committed strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.current.is_none()
    }
}
