//! The component collection and its mutation API.
//!
//! `Document` is the only write path to the collection. Every committed
//! mutation records exactly one history entry; requests for missing ids or
//! out-of-range indices are silent no-ops.

use crate::component::{Component, ComponentId, ComponentKind, ComponentPatch};
use crate::history::{ComponentChange, History, HistoryEntry, HistoryStep};
use kurbo::Rect;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// Default offset applied to duplicates, in canvas units.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Errors raised while importing a design.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to parse design: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid design format: {0}")]
    InvalidFormat(String),
}

/// Validate a JSON payload and turn it into a component list.
///
/// The payload must be an array of components with unique ids and
/// positive, finite geometry.
pub fn parse_components(value: Value) -> Result<Vec<Component>, ImportError> {
    if !value.is_array() {
        return Err(ImportError::InvalidFormat(
            "expected an array of components".to_string(),
        ));
    }
    let components: Vec<Component> = serde_json::from_value(value)?;

    let mut ids = HashSet::with_capacity(components.len());
    for component in &components {
        if !ids.insert(component.id()) {
            return Err(ImportError::InvalidFormat(format!(
                "duplicate component id {}",
                component.id()
            )));
        }
        if !component.has_valid_geometry() {
            return Err(ImportError::InvalidFormat(format!(
                "component {} has invalid geometry",
                component.id()
            )));
        }
    }
    Ok(components)
}

/// A string list on a component that can be edited item by item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    Options,
    Rows,
    Columns,
}

impl ListField {
    /// Options exist on every component; rows and columns only on matrices.
    pub fn applies_to(self, kind: ComponentKind) -> bool {
        match self {
            ListField::Options => true,
            ListField::Rows | ListField::Columns => kind.is_matrix(),
        }
    }

    /// Default text for the item at 1-based position `n`.
    fn item_label(self, n: usize) -> String {
        match self {
            ListField::Options => format!("Option {}", n),
            ListField::Rows => format!("Row {}", n),
            ListField::Columns => format!("Column {}", n),
        }
    }

    fn items(self, component: &mut Component) -> &mut Vec<String> {
        match self {
            ListField::Options => &mut component.options,
            ListField::Rows => &mut component.rows,
            ListField::Columns => &mut component.columns,
        }
    }
}

enum ListEdit {
    Add,
    Update(usize, String),
    Remove(usize),
}

/// Ordered collection of components (back to front) with undo history.
#[derive(Debug, Clone)]
pub struct Document {
    components: Vec<Component>,
    history: History,
    duplicate_offset: f64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::with_history_capacity(crate::history::DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            components: Vec::new(),
            history: History::with_capacity(capacity),
            duplicate_offset: DUPLICATE_OFFSET,
        }
    }

    pub fn set_duplicate_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.duplicate_offset = offset;
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn get(&self, id: ComponentId) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.get(id).is_some()
    }

    fn index_of(&self, id: ComponentId) -> Option<usize> {
        self.components.iter().position(|c| c.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Get the bounding box of all components.
    pub fn bounds(&self) -> Option<Rect> {
        self.components
            .iter()
            .map(Component::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    /// Append a component of the given kind with its defaults.
    pub fn add(&mut self, kind: ComponentKind) -> ComponentId {
        self.push(Component::new(kind))
    }

    fn push(&mut self, component: Component) -> ComponentId {
        let id = component.id();
        self.components.push(component.clone());
        self.history.record(HistoryEntry::Add {
            component,
            snapshot: self.components.clone(),
        });
        log::debug!("Added component {}", id);
        id
    }

    /// Merge a patch into a component. Returns false if the component is
    /// missing or the patch changes nothing.
    pub fn update(&mut self, id: ComponentId, patch: &ComponentPatch) -> bool {
        let Some(previous) = self.get(id) else {
            log::debug!("Update of missing component {} ignored", id);
            return false;
        };
        let mut current = previous.clone();
        current.apply(patch);
        if current == *previous {
            return false;
        }
        let change = ComponentChange {
            previous: previous.clone(),
            current,
        };
        self.update_many(vec![change])
    }

    /// Write a batch of changed components as one history entry.
    ///
    /// Undo restores each component as it was in the collection, whatever
    /// the caller passed as `previous`. Repeated ids collapse into one
    /// change ending at the last `current`. Changes for missing components,
    /// no-op changes and changes with invalid geometry are skipped. Returns
    /// true if anything was committed.
    pub fn update_many(&mut self, changes: Vec<ComponentChange>) -> bool {
        let mut committed: Vec<ComponentChange> = Vec::with_capacity(changes.len());
        for change in changes {
            let ComponentChange { current, .. } = change;
            let id = current.id();
            if !current.has_valid_geometry() {
                log::warn!("Rejecting update of {} with invalid geometry", id);
                continue;
            }
            let Some(slot) = self.components.iter_mut().find(|c| c.id() == id) else {
                log::debug!("Update of missing component {} ignored", id);
                continue;
            };
            if *slot == current {
                continue;
            }
            let previous = std::mem::replace(slot, current.clone());
            match committed.iter_mut().find(|c| c.id() == id) {
                Some(existing) => existing.current = current,
                None => committed.push(ComponentChange { previous, current }),
            }
        }
        committed.retain(|change| change.previous != change.current);

        if committed.is_empty() {
            return false;
        }
        log::debug!("Updated {} component(s)", committed.len());
        self.history.record(HistoryEntry::Update {
            changes: committed,
            snapshot: self.components.clone(),
        });
        true
    }

    /// Replace a component without recording history. Used for live
    /// gesture frames that are committed later as a single update.
    pub fn preview(&mut self, component: Component) -> bool {
        if !component.has_valid_geometry() {
            return false;
        }
        match self.components.iter_mut().find(|c| c.id() == component.id()) {
            Some(slot) => {
                *slot = component;
                true
            }
            None => false,
        }
    }

    /// Remove a component, returning it.
    pub fn delete(&mut self, id: ComponentId) -> Option<Component> {
        let Some(index) = self.index_of(id) else {
            log::debug!("Delete of missing component {} ignored", id);
            return None;
        };
        let component = self.components.remove(index);
        self.history.record(HistoryEntry::Delete {
            component: component.clone(),
            index,
            snapshot: self.components.clone(),
        });
        log::debug!("Deleted component {} at index {}", id, index);
        Some(component)
    }

    /// Append a copy under a new id, offset by the duplicate offset unless
    /// `overrides` says otherwise.
    pub fn duplicate(&mut self, id: ComponentId, overrides: &ComponentPatch) -> Option<ComponentId> {
        let Some(source) = self.get(id) else {
            log::debug!("Duplicate of missing component {} ignored", id);
            return None;
        };
        let mut copy = source.clone_with_new_id();
        copy.x += self.duplicate_offset;
        copy.y += self.duplicate_offset;
        copy.apply(overrides);
        Some(self.push(copy))
    }

    /// Remove every component.
    pub fn clear(&mut self) {
        let previous = std::mem::take(&mut self.components);
        log::debug!("Cleared {} component(s)", previous.len());
        self.history.record(HistoryEntry::Clear { previous });
    }

    /// Replace the collection with a validated payload. On failure nothing
    /// changes. Returns the number of imported components.
    pub fn import_value(&mut self, value: Value) -> Result<usize, ImportError> {
        let components = parse_components(value).inspect_err(|e| {
            log::error!("Import rejected: {}", e);
        })?;
        let count = components.len();
        let previous = std::mem::replace(&mut self.components, components);
        self.history.record(HistoryEntry::Import {
            previous,
            snapshot: self.components.clone(),
        });
        log::info!("Imported {} component(s)", count);
        Ok(count)
    }

    /// Parse and import a JSON design.
    pub fn import_json(&mut self, json: &str) -> Result<usize, ImportError> {
        let value: Value = serde_json::from_str(json).inspect_err(|e| {
            log::error!("Import rejected: {}", e);
        })?;
        self.import_value(value)
    }

    /// Serialize the collection to pretty JSON.
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.components)
    }

    fn edit_list(&mut self, id: ComponentId, field: ListField, edit: ListEdit) -> bool {
        let Some(previous) = self.get(id) else {
            return false;
        };
        if !field.applies_to(previous.kind) {
            log::debug!("{:?} do not apply to {} component {}", field, previous.kind, id);
            return false;
        }

        let mut current = previous.clone();
        let items = field.items(&mut current);
        match edit {
            ListEdit::Add => {
                let label = field.item_label(items.len() + 1);
                items.push(label);
            }
            ListEdit::Update(index, value) => match items.get_mut(index) {
                Some(item) => *item = value,
                None => return false,
            },
            ListEdit::Remove(index) => {
                if index >= items.len() {
                    return false;
                }
                items.remove(index);
            }
        }

        let change = ComponentChange {
            previous: previous.clone(),
            current,
        };
        self.update_many(vec![change])
    }

    /// Append a default item ("Option 3", "Row 3", ...) to a list.
    pub fn add_list_item(&mut self, id: ComponentId, field: ListField) -> bool {
        self.edit_list(id, field, ListEdit::Add)
    }

    pub fn update_list_item(
        &mut self,
        id: ComponentId,
        field: ListField,
        index: usize,
        value: impl Into<String>,
    ) -> bool {
        self.edit_list(id, field, ListEdit::Update(index, value.into()))
    }

    pub fn remove_list_item(&mut self, id: ComponentId, field: ListField, index: usize) -> bool {
        self.edit_list(id, field, ListEdit::Remove(index))
    }

    pub fn add_option(&mut self, id: ComponentId) -> bool {
        self.add_list_item(id, ListField::Options)
    }

    pub fn update_option(&mut self, id: ComponentId, index: usize, value: impl Into<String>) -> bool {
        self.update_list_item(id, ListField::Options, index, value)
    }

    pub fn remove_option(&mut self, id: ComponentId, index: usize) -> bool {
        self.remove_list_item(id, ListField::Options, index)
    }

    pub fn add_row(&mut self, id: ComponentId) -> bool {
        self.add_list_item(id, ListField::Rows)
    }

    pub fn update_row(&mut self, id: ComponentId, index: usize, value: impl Into<String>) -> bool {
        self.update_list_item(id, ListField::Rows, index, value)
    }

    pub fn remove_row(&mut self, id: ComponentId, index: usize) -> bool {
        self.remove_list_item(id, ListField::Rows, index)
    }

    pub fn add_column(&mut self, id: ComponentId) -> bool {
        self.add_list_item(id, ListField::Columns)
    }

    pub fn update_column(&mut self, id: ComponentId, index: usize, value: impl Into<String>) -> bool {
        self.update_list_item(id, ListField::Columns, index, value)
    }

    pub fn remove_column(&mut self, id: ComponentId, index: usize) -> bool {
        self.remove_list_item(id, ListField::Columns, index)
    }

    /// Revert the newest history entry.
    pub fn undo(&mut self) -> Option<HistoryStep> {
        let entry = self.history.undo()?;
        entry.revert(&mut self.components);
        let step = HistoryStep::from(entry);
        log::debug!("Undo {:?}", step.kind);
        Some(step)
    }

    /// Reapply the newest undone entry.
    pub fn redo(&mut self) -> Option<HistoryStep> {
        let entry = self.history.redo()?;
        entry.reapply(&mut self.components);
        let step = HistoryStep::from(entry);
        log::debug!("Redo {:?}", step.kind);
        Some(step)
    }
}
