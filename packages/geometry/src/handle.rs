//! Resize handles and their delta formulas

use crate::{Geometry, GeometryError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Affordance a geometry session was started from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Right,
    Bottom,
    Left,
    /// Drag without resizing
    Move,
}

/// Horizontal edge a handle drags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    Left,
    Right,
    None,
}

/// Vertical edge a handle drags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Top,
    Bottom,
    None,
}

impl Handle {
    pub const ALL: [Handle; 9] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
        Handle::Top,
        Handle::Right,
        Handle::Bottom,
        Handle::Left,
        Handle::Move,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Handle::TopLeft => "top-left",
            Handle::TopRight => "top-right",
            Handle::BottomLeft => "bottom-left",
            Handle::BottomRight => "bottom-right",
            Handle::Top => "top",
            Handle::Right => "right",
            Handle::Bottom => "bottom",
            Handle::Left => "left",
            Handle::Move => "move",
        }
    }

    pub fn is_resize(self) -> bool {
        self != Handle::Move
    }

    fn edges(self) -> (Horizontal, Vertical) {
        match self {
            Handle::TopLeft => (Horizontal::Left, Vertical::Top),
            Handle::TopRight => (Horizontal::Right, Vertical::Top),
            Handle::BottomLeft => (Horizontal::Left, Vertical::Bottom),
            Handle::BottomRight => (Horizontal::Right, Vertical::Bottom),
            Handle::Top => (Horizontal::None, Vertical::Top),
            Handle::Right => (Horizontal::Right, Vertical::None),
            Handle::Bottom => (Horizontal::None, Vertical::Bottom),
            Handle::Left => (Horizontal::Left, Vertical::None),
            Handle::Move => (Horizontal::None, Vertical::None),
        }
    }

    /// Geometry implied by dragging this handle by `(dx, dy)` from `start`.
    ///
    /// Sizes are clamped to `min_size`. Dragging the top or left edge moves
    /// the origin by however much the size actually shrank, so the opposite
    /// edge stays put even when clamping kicks in.
    pub fn apply(self, start: &Geometry, dx: f64, dy: f64, min_size: f64) -> Geometry {
        if self == Handle::Move {
            return Geometry {
                x: start.x + dx,
                y: start.y + dy,
                ..*start
            };
        }

        let mut next = *start;
        let (horizontal, vertical) = self.edges();

        match horizontal {
            Horizontal::Right => {
                next.width = (start.width + dx).max(min_size);
            }
            Horizontal::Left => {
                next.width = (start.width - dx).max(min_size);
                next.x = start.x + (start.width - next.width);
            }
            Horizontal::None => {}
        }

        match vertical {
            Vertical::Bottom => {
                next.height = (start.height + dy).max(min_size);
            }
            Vertical::Top => {
                next.height = (start.height - dy).max(min_size);
                next.y = start.y + (start.height - next.height);
            }
            Vertical::None => {}
        }

        next
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handle {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| GeometryError::UnknownHandle(s.to_string()))
    }
}
