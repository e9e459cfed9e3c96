//! PageCraft Core Library
//!
//! Platform-agnostic geometry and state engine for the PageCraft layout
//! editor: viewport transform, alignment and distribution, and undo/redo
//! over the component collection.

pub mod align;
pub mod component;
pub mod config;
pub mod distribute;
pub mod document;
pub mod editor;
pub mod history;
pub mod interaction;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod units;
pub mod viewport;

pub use align::{Alignment, align};
pub use component::{Axis, Component, ComponentId, ComponentKind, ComponentPatch, MIN_COMPONENT_SIZE};
pub use config::{ConfigError, EditorConfig};
pub use distribute::{Distribution, distribute};
pub use document::{Document, ImportError, ListField};
pub use editor::{Editor, EditorEvent, SubscriptionId};
pub use history::{ComponentChange, History, HistoryEntry, HistoryKind, HistoryStep};
pub use interaction::{Gesture, GestureKind};
pub use selection::Selection;
pub use snap::{SnapResult, SNAP_THRESHOLD, snap_to_grid, snap_to_guides};
pub use units::Unit;
pub use viewport::{PageFormat, Viewport, ZoomConfig, RULER_SIZE};
