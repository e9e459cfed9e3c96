//! Linear undo/redo history over the component collection.
//!
//! Every entry carries enough to go both ways: `revert` rebuilds the state
//! before the mutation and `reapply` restores the snapshot taken after it.

use crate::component::{Component, ComponentId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of undo entries kept by default.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// What kind of mutation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Add,
    Update,
    Delete,
    Clear,
    Import,
}

/// One component before and after an update.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentChange {
    pub previous: Component,
    pub current: Component,
}

impl ComponentChange {
    pub fn id(&self) -> ComponentId {
        self.current.id()
    }
}

/// A recorded mutation. `snapshot` is the collection right after it.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Add {
        component: Component,
        snapshot: Vec<Component>,
    },
    /// One or more components changed in place, e.g. by a single alignment.
    Update {
        changes: Vec<ComponentChange>,
        snapshot: Vec<Component>,
    },
    Delete {
        component: Component,
        /// Position the component occupied, so undo restores z-order.
        index: usize,
        snapshot: Vec<Component>,
    },
    Clear {
        previous: Vec<Component>,
    },
    Import {
        previous: Vec<Component>,
        snapshot: Vec<Component>,
    },
}

impl HistoryEntry {
    pub fn kind(&self) -> HistoryKind {
        match self {
            HistoryEntry::Add { .. } => HistoryKind::Add,
            HistoryEntry::Update { .. } => HistoryKind::Update,
            HistoryEntry::Delete { .. } => HistoryKind::Delete,
            HistoryEntry::Clear { .. } => HistoryKind::Clear,
            HistoryEntry::Import { .. } => HistoryKind::Import,
        }
    }

    /// The affected component for single-component entries. Batched updates
    /// report their first component.
    pub fn component_id(&self) -> Option<ComponentId> {
        match self {
            HistoryEntry::Add { component, .. } | HistoryEntry::Delete { component, .. } => {
                Some(component.id())
            }
            HistoryEntry::Update { changes, .. } => changes.first().map(ComponentChange::id),
            HistoryEntry::Clear { .. } | HistoryEntry::Import { .. } => None,
        }
    }

    /// Collection state after the mutation.
    pub fn snapshot(&self) -> &[Component] {
        match self {
            HistoryEntry::Add { snapshot, .. }
            | HistoryEntry::Update { snapshot, .. }
            | HistoryEntry::Delete { snapshot, .. }
            | HistoryEntry::Import { snapshot, .. } => snapshot,
            HistoryEntry::Clear { .. } => &[],
        }
    }

    /// Undo this entry against the current collection.
    pub fn revert(&self, components: &mut Vec<Component>) {
        match self {
            HistoryEntry::Add { component, .. } => {
                components.retain(|c| c.id() != component.id());
            }
            HistoryEntry::Update { changes, .. } => {
                for change in changes {
                    if let Some(slot) = components.iter_mut().find(|c| c.id() == change.id()) {
                        *slot = change.previous.clone();
                    }
                }
            }
            HistoryEntry::Delete {
                component, index, ..
            } => {
                let index = (*index).min(components.len());
                components.insert(index, component.clone());
            }
            HistoryEntry::Clear { previous } | HistoryEntry::Import { previous, .. } => {
                components.clone_from(previous);
            }
        }
    }

    /// Redo this entry by restoring its snapshot.
    pub fn reapply(&self, components: &mut Vec<Component>) {
        components.clear();
        components.extend_from_slice(self.snapshot());
    }
}

/// Result of an undo or redo, for callers that react to what happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStep {
    pub kind: HistoryKind,
    pub component_id: Option<ComponentId>,
}

impl From<&HistoryEntry> for HistoryStep {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            kind: entry.kind(),
            component_id: entry.component_id(),
        }
    }
}

/// Bounded undo stack plus redo stack.
///
/// The oldest undo entry is evicted once `capacity` is exceeded. Recording a
/// new entry always clears the redo stack.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(capacity.saturating_add(1)),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
    }

    /// Move the newest entry to the redo stack and return it for reverting.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.undo_stack.pop_back()?;
        self.redo_stack.push(entry);
        self.redo_stack.last()
    }

    /// Move the newest undone entry back to the undo stack and return it for
    /// reapplying.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push_back(entry);
        self.undo_stack.back()
    }

    /// The entry the next undo would revert.
    pub fn peek(&self) -> Option<&HistoryEntry> {
        self.undo_stack.back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;

    fn add_entry(components: &mut Vec<Component>) -> HistoryEntry {
        let component = Component::new(ComponentKind::Text);
        components.push(component.clone());
        HistoryEntry::Add {
            component,
            snapshot: components.clone(),
        }
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut components = Vec::new();
        let mut history = History::with_capacity(3);
        let entries: Vec<_> = (0..5).map(|_| add_entry(&mut components)).collect();
        for entry in &entries {
            history.record(entry.clone());
        }

        assert_eq!(history.undo_count(), 3);
        for expected in entries.iter().rev().take(3) {
            assert_eq!(history.undo(), Some(expected));
        }
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut components = Vec::new();
        let mut history = History::new();
        history.record(add_entry(&mut components));
        history.record(add_entry(&mut components));

        history.undo();
        assert!(history.can_redo());

        history.record(add_entry(&mut components));
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_redo_move_between_stacks() {
        let mut components = Vec::new();
        let mut history = History::new();
        let entry = add_entry(&mut components);
        history.record(entry.clone());

        assert_eq!(history.undo(), Some(&entry));
        assert_eq!((history.undo_count(), history.redo_count()), (0, 1));
        assert_eq!(history.redo(), Some(&entry));
        assert_eq!((history.undo_count(), history.redo_count()), (1, 0));
        assert_eq!(history.peek(), Some(&entry));
    }

    #[test]
    fn test_delete_revert_restores_index() {
        let components: Vec<_> = (0..3).map(|_| Component::new(ComponentKind::Input)).collect();
        let mut after = components.clone();
        let removed = after.remove(1);
        let entry = HistoryEntry::Delete {
            component: removed,
            index: 1,
            snapshot: after.clone(),
        };

        let mut state = after;
        entry.revert(&mut state);
        assert_eq!(state, components);

        entry.reapply(&mut state);
        assert_eq!(state, entry.snapshot());
    }

    #[test]
    fn test_update_revert_restores_in_place() {
        let mut state: Vec<_> = (0..2).map(|_| Component::new(ComponentKind::Text)).collect();
        let before = state.clone();
        let previous = state[1].clone();
        state[1].x = 400.0;
        let entry = HistoryEntry::Update {
            changes: vec![ComponentChange {
                previous,
                current: state[1].clone(),
            }],
            snapshot: state.clone(),
        };

        assert_eq!(entry.kind(), HistoryKind::Update);
        assert_eq!(entry.component_id(), Some(state[1].id()));
        entry.revert(&mut state);
        assert_eq!(state, before);
    }

    #[test]
    fn test_clear_entry_round_trip() {
        let previous: Vec<_> = (0..2).map(|_| Component::new(ComponentKind::Title)).collect();
        let entry = HistoryEntry::Clear {
            previous: previous.clone(),
        };
        let mut state = Vec::new();

        entry.revert(&mut state);
        assert_eq!(state, previous);
        entry.reapply(&mut state);
        assert!(state.is_empty());
        assert_eq!(HistoryStep::from(&entry).component_id, None);
    }
}
