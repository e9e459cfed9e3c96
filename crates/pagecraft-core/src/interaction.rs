//! Drag and resize sessions.
//!
//! The pointer baseline of a gesture lives here rather than on the component,
//! so nothing ephemeral leaks into the interchange format.

use crate::component::{Component, ComponentId, MIN_COMPONENT_SIZE};
use crate::snap::snap_to_grid;
use kurbo::{Point, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    /// Translate the component.
    Move,
    /// Drag the bottom-right corner.
    Resize,
}

/// State of an in-progress drag on one component. Points are in canvas
/// coordinates.
#[derive(Debug, Clone)]
pub struct Gesture {
    pub kind: GestureKind,
    pub component_id: ComponentId,
    /// Pointer position when the gesture began.
    pub start_point: Point,
    /// Latest pointer position.
    pub current_point: Point,
    /// Component as it was before the gesture.
    pub original: Component,
}

impl Gesture {
    pub fn new(kind: GestureKind, start_point: Point, original: Component) -> Self {
        Self {
            kind,
            component_id: original.id(),
            start_point,
            current_point: start_point,
            original,
        }
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// The component as the gesture currently shapes it. With a grid, the
    /// moved position or resized extent snaps to it.
    pub fn apply(&self, grid: Option<f64>) -> Component {
        let delta = self.delta();
        let snap = |value: f64| match grid {
            Some(size) => snap_to_grid(value, size, true),
            None => value,
        };

        let mut component = self.original.clone();
        match self.kind {
            GestureKind::Move => {
                component.x = snap(self.original.x + delta.x);
                component.y = snap(self.original.y + delta.y);
            }
            GestureKind::Resize => {
                component.width = snap(self.original.width + delta.x).max(MIN_COMPONENT_SIZE);
                component.height = snap(self.original.height + delta.y).max(MIN_COMPONENT_SIZE);
            }
        }
        component
    }
}
