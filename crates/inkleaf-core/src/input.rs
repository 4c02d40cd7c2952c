//! Pointer input as delivered by the host.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[serde(alias = "pen")]
    Stylus,
    Touch,
    Mouse,
}

impl PointerKind {
    pub fn is_stylus(self) -> bool {
        self == PointerKind::Stylus
    }
}

/// Pointer event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

/// A pointer event in device (CSS pixel) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Point,
    pub kind: PointerKind,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, position: Point, kind: PointerKind) -> Self {
        Self {
            phase,
            position,
            kind,
        }
    }

    pub fn down(position: Point, kind: PointerKind) -> Self {
        Self::new(PointerPhase::Down, position, kind)
    }

    pub fn moved(position: Point, kind: PointerKind) -> Self {
        Self::new(PointerPhase::Move, position, kind)
    }

    pub fn up(position: Point, kind: PointerKind) -> Self {
        Self::new(PointerPhase::Up, position, kind)
    }
}
