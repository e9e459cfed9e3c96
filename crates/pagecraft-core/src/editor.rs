//! The editor: owns the document, selection, viewport and active gesture,
//! and notifies subscribers after every change.

use crate::align::{Alignment, align};
use crate::component::{Component, ComponentId, ComponentKind, ComponentPatch};
use crate::config::EditorConfig;
use crate::distribute::{Distribution, distribute};
use crate::document::{Document, ImportError, ListField};
use crate::history::{ComponentChange, HistoryKind, HistoryStep};
use crate::interaction::{Gesture, GestureKind};
use crate::selection::Selection;
use crate::snap::{SnapGuides, components_in_selection_box};
use crate::viewport::{PageFormat, Viewport};
use kurbo::{Point, Rect, Size, Vec2};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// Notification sent to subscribers after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// The component collection changed (including live gesture frames).
    ComponentsChanged,
    SelectionChanged,
    ViewportChanged,
    /// Undo/redo availability after a recorded change, undo or redo.
    HistoryChanged { can_undo: bool, can_redo: bool },
}

/// Subscription handle for unsubscribing from events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", &self.0.to_string()[..8])
    }
}

type Listener = Box<dyn FnMut(&EditorEvent)>;

/// Layout editor state.
///
/// All mutations go through here so that history, selection pruning and
/// notifications stay consistent. An active drag or resize is committed
/// before any other mutation runs.
pub struct Editor {
    document: Document,
    selection: Selection,
    viewport: Viewport,
    gesture: Option<Gesture>,
    config: EditorConfig,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("components", &self.document.len())
            .field("selection", &self.selection)
            .field("viewport", &self.viewport)
            .field("gesture", &self.gesture.as_ref().map(|g| (g.kind, g.component_id)))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let mut document = Document::with_history_capacity(config.history_capacity);
        document.set_duplicate_offset(config.duplicate_offset);
        Self {
            document,
            selection: Selection::new(),
            viewport: Viewport::with_config(config.zoom, config.ruler_size),
            gesture: None,
            config,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Current components, back to front.
    pub fn components(&self) -> &[Component] {
        self.document.components()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        self.document.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.document.can_redo()
    }

    // --- Subscriptions ---

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.listeners.push((id, Box::new(listener)));
        log::debug!("Subscription {} added", id);
        id
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        let removed = self.listeners.len() != before;
        if removed {
            log::debug!("Subscription {} removed", id);
        }
        removed
    }

    fn emit(&mut self, event: EditorEvent) {
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }

    /// Notify after a history-recording change.
    fn committed(&mut self) {
        self.emit(EditorEvent::ComponentsChanged);
        self.emit(EditorEvent::HistoryChanged {
            can_undo: self.document.can_undo(),
            can_redo: self.document.can_redo(),
        });
    }

    /// Drop selected ids whose component no longer exists.
    fn prune_selection(&mut self) {
        let document = &self.document;
        if self.selection.retain(|id| document.contains(id)) {
            self.emit(EditorEvent::SelectionChanged);
        }
    }

    // --- Component mutations ---

    pub fn add(&mut self, kind: ComponentKind) -> ComponentId {
        self.end_gesture();
        let id = self.document.add(kind);
        self.committed();
        id
    }

    pub fn update(&mut self, id: ComponentId, patch: &ComponentPatch) -> bool {
        self.end_gesture();
        let changed = self.document.update(id, patch);
        if changed {
            self.committed();
        }
        changed
    }

    pub fn delete(&mut self, id: ComponentId) -> Option<Component> {
        self.end_gesture();
        let removed = self.document.delete(id)?;
        self.committed();
        self.prune_selection();
        Some(removed)
    }

    /// Delete every selected component, one history entry each.
    pub fn delete_selected(&mut self) -> usize {
        self.end_gesture();
        let ids = self.selection.ids().to_vec();
        let removed = ids
            .into_iter()
            .filter(|&id| self.document.delete(id).is_some())
            .count();
        if removed > 0 {
            self.committed();
        }
        self.selection.clear();
        self.emit(EditorEvent::SelectionChanged);
        removed
    }

    pub fn duplicate(&mut self, id: ComponentId, overrides: &ComponentPatch) -> Option<ComponentId> {
        self.end_gesture();
        let copy = self.document.duplicate(id, overrides)?;
        self.committed();
        Some(copy)
    }

    pub fn clear(&mut self) {
        self.end_gesture();
        self.document.clear();
        self.committed();
        self.prune_selection();
    }

    pub fn import_value(&mut self, value: Value) -> Result<usize, ImportError> {
        self.end_gesture();
        let count = self.document.import_value(value)?;
        self.committed();
        self.prune_selection();
        Ok(count)
    }

    pub fn import_json(&mut self, json: &str) -> Result<usize, ImportError> {
        self.end_gesture();
        let count = self.document.import_json(json)?;
        self.committed();
        self.prune_selection();
        Ok(count)
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        self.document.export_json()
    }

    pub fn add_list_item(&mut self, id: ComponentId, field: ListField) -> bool {
        self.end_gesture();
        let changed = self.document.add_list_item(id, field);
        if changed {
            self.committed();
        }
        changed
    }

    pub fn update_list_item(
        &mut self,
        id: ComponentId,
        field: ListField,
        index: usize,
        value: impl Into<String>,
    ) -> bool {
        self.end_gesture();
        let changed = self.document.update_list_item(id, field, index, value);
        if changed {
            self.committed();
        }
        changed
    }

    pub fn remove_list_item(&mut self, id: ComponentId, field: ListField, index: usize) -> bool {
        self.end_gesture();
        let changed = self.document.remove_list_item(id, field, index);
        if changed {
            self.committed();
        }
        changed
    }

    fn apply_changes(&mut self, changes: Vec<ComponentChange>) -> bool {
        let changed = self.document.update_many(changes);
        if changed {
            self.committed();
        }
        changed
    }

    /// Align the selection to its primary as one undo step.
    pub fn align_selected(&mut self, alignment: Alignment) -> bool {
        self.end_gesture();
        let changes = align(self.document.components(), &self.selection, alignment);
        self.apply_changes(changes)
    }

    /// Space the selection evenly as one undo step.
    pub fn distribute_selected(&mut self, distribution: Distribution) -> bool {
        self.end_gesture();
        let changes = distribute(self.document.components(), &self.selection, distribution);
        self.apply_changes(changes)
    }

    // --- History ---

    pub fn undo(&mut self) -> Option<HistoryStep> {
        self.end_gesture();
        let step = self.document.undo()?;
        self.committed();
        self.prune_selection();
        Some(step)
    }

    /// Redo the last undone change. Redoing an add selects the component.
    pub fn redo(&mut self) -> Option<HistoryStep> {
        self.end_gesture();
        let step = self.document.redo()?;
        self.committed();
        match (step.kind, step.component_id) {
            (HistoryKind::Add, Some(id)) => {
                self.selection.select(id);
                self.emit(EditorEvent::SelectionChanged);
            }
            _ => self.prune_selection(),
        }
        Some(step)
    }

    // --- Selection ---

    /// Select a single component. Unknown ids are ignored.
    pub fn select(&mut self, id: ComponentId) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.selection.select(id);
        self.emit(EditorEvent::SelectionChanged);
        true
    }

    pub fn add_to_selection(&mut self, id: ComponentId) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.selection.add(id);
        self.emit(EditorEvent::SelectionChanged);
        true
    }

    pub fn toggle_selection(&mut self, id: ComponentId) -> bool {
        if !self.document.contains(id) {
            return false;
        }
        self.selection.toggle(id);
        self.emit(EditorEvent::SelectionChanged);
        true
    }

    pub fn deselect(&mut self, id: ComponentId) {
        if self.selection.contains(id) {
            self.selection.deselect(id);
            self.emit(EditorEvent::SelectionChanged);
        }
    }

    pub fn set_primary(&mut self, id: ComponentId) -> bool {
        let changed = self.selection.set_primary(id);
        if changed {
            self.emit(EditorEvent::SelectionChanged);
        }
        changed
    }

    /// Select every component; the first becomes primary.
    pub fn select_all(&mut self) {
        let ids: Vec<_> = self.document.components().iter().map(Component::id).collect();
        self.selection.select_all(ids);
        self.emit(EditorEvent::SelectionChanged);
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit(EditorEvent::SelectionChanged);
        }
    }

    /// Select the components whose centres fall inside a marquee given in
    /// screen coordinates. Returns how many were selected.
    pub fn select_in_box(&mut self, screen_rect: Rect) -> usize {
        let canvas_rect = Rect::from_points(
            self.viewport.screen_to_canvas(Point::new(screen_rect.x0, screen_rect.y0)),
            self.viewport.screen_to_canvas(Point::new(screen_rect.x1, screen_rect.y1)),
        );
        let ids = components_in_selection_box(self.document.components(), canvas_rect);
        let count = ids.len();
        self.selection.select_all(ids);
        self.emit(EditorEvent::SelectionChanged);
        count
    }

    // --- Viewport ---

    fn viewport_changed(&mut self, before: &Viewport) -> bool {
        let changed = self.viewport != *before;
        if changed {
            self.emit(EditorEvent::ViewportChanged);
        }
        changed
    }

    fn with_viewport(&mut self, change: impl FnOnce(&mut Viewport)) -> bool {
        let before = self.viewport.clone();
        change(&mut self.viewport);
        self.viewport_changed(&before)
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        self.with_viewport(|v| v.set_scale(scale))
    }

    pub fn set_offset(&mut self, offset: Vec2) -> bool {
        self.with_viewport(|v| v.set_offset(offset))
    }

    pub fn set_transform(&mut self, scale: f64, offset: Vec2) -> bool {
        self.with_viewport(|v| v.set_transform(scale, offset))
    }

    pub fn pan(&mut self, delta: Vec2) -> bool {
        self.with_viewport(|v| v.pan(delta))
    }

    pub fn zoom_in(&mut self) -> bool {
        self.with_viewport(Viewport::zoom_in_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.with_viewport(Viewport::zoom_out_step)
    }

    /// Zoom around a screen point. See [`Viewport::adjust_zoom`].
    pub fn adjust_zoom(&mut self, delta: f64, pointer: Point) -> bool {
        self.with_viewport(|v| {
            v.adjust_zoom(delta, pointer);
        })
    }

    pub fn reset_zoom(&mut self, viewport_size: Size) -> bool {
        self.with_viewport(|v| v.reset_zoom(viewport_size))
    }

    pub fn set_page_format(&mut self, format: PageFormat) -> bool {
        self.with_viewport(|v| v.set_page_format(format))
    }

    pub fn set_custom_size(&mut self, width: f64, height: f64) -> bool {
        self.with_viewport(|v| {
            v.set_custom_size(width, height);
        })
    }

    // --- Gestures ---

    fn begin_gesture(&mut self, kind: GestureKind, id: ComponentId, pointer: Point) -> bool {
        self.end_gesture();
        let Some(component) = self.document.get(id) else {
            return false;
        };
        if component.locked {
            log::debug!("Component {} is locked; ignoring {:?}", id, kind);
            return false;
        }
        let start = self.viewport.screen_to_canvas(pointer);
        self.gesture = Some(Gesture::new(kind, start, component.clone()));
        true
    }

    /// Start dragging a component from a screen point.
    pub fn begin_move(&mut self, id: ComponentId, pointer: Point) -> bool {
        self.begin_gesture(GestureKind::Move, id, pointer)
    }

    /// Start resizing a component from its bottom-right corner.
    pub fn begin_resize(&mut self, id: ComponentId, pointer: Point) -> bool {
        self.begin_gesture(GestureKind::Resize, id, pointer)
    }

    /// Update the active gesture. Frames are not recorded in history.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let grid = self.config.grid_size();
        let Some(gesture) = self.gesture.as_mut() else {
            return false;
        };
        gesture.current_point = self.viewport.screen_to_canvas(pointer);
        let mut frame = gesture.apply(grid);
        if self.config.snap_to_guides && gesture.kind == GestureKind::Move {
            let guides = SnapGuides::from_components(self.document.components(), Some(frame.id()));
            let shift = guides.snap_bounds(frame.bounds(), self.viewport.scale());
            frame.x += shift.x;
            frame.y += shift.y;
        }
        let moved = self.document.preview(frame);
        if moved {
            self.emit(EditorEvent::ComponentsChanged);
        }
        moved
    }

    /// Commit the active gesture as a single update entry. Returns true if
    /// the component actually changed.
    pub fn end_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        let Some(current) = self.document.get(gesture.component_id).cloned() else {
            return false;
        };
        // Rewind the preview frames so the entry reverts to the original
        self.document.preview(gesture.original.clone());
        self.apply_changes(vec![ComponentChange {
            previous: gesture.original,
            current,
        }])
    }

    /// Abandon the active gesture, restoring the component.
    pub fn cancel_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        let restored = self.document.preview(gesture.original);
        if restored {
            self.emit(EditorEvent::ComponentsChanged);
        }
        restored
    }
}
