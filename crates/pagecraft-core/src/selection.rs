//! Ordered selection set with a primary (anchor) component.

use crate::component::{Component, ComponentId};

/// The selected component ids, in the order they were selected.
///
/// When `primary` is set it is always one of `ids`. Ids may go stale when
/// their component is removed; consumers resolve against the current
/// collection and skip them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ComponentId>,
    primary: Option<ComponentId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ComponentId] {
        &self.ids
    }

    pub fn primary(&self) -> Option<ComponentId> {
        self.primary
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.ids.contains(&id)
    }

    /// Replace the selection with a single component, which becomes primary.
    pub fn select(&mut self, id: ComponentId) {
        self.ids.clear();
        self.ids.push(id);
        self.primary = Some(id);
    }

    /// Add a component. The first added component becomes primary.
    pub fn add(&mut self, id: ComponentId) {
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
        if self.primary.is_none() {
            self.primary = Some(id);
        }
    }

    /// Add the component if absent, remove it otherwise.
    pub fn toggle(&mut self, id: ComponentId) {
        if self.contains(id) {
            self.deselect(id);
        } else {
            self.add(id);
        }
    }

    /// Remove a component. Removing the primary promotes the next one in
    /// selection order.
    pub fn deselect(&mut self, id: ComponentId) {
        self.ids.retain(|&selected| selected != id);
        if self.primary == Some(id) {
            self.primary = self.ids.first().copied();
        }
    }

    /// Make an already selected component the primary. Returns false if it
    /// is not selected.
    pub fn set_primary(&mut self, id: ComponentId) -> bool {
        if self.contains(id) {
            self.primary = Some(id);
            true
        } else {
            false
        }
    }

    /// Replace the selection with the given ids; the first becomes primary.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = ComponentId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
        self.primary = self.ids.first().copied();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.primary = None;
    }

    /// Drop ids not accepted by `keep`. A dropped primary is cleared rather
    /// than promoted. Returns true if anything was removed.
    pub fn retain(&mut self, mut keep: impl FnMut(ComponentId) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|&id| keep(id));
        if self.primary.is_some_and(|primary| !self.ids.contains(&primary)) {
            self.primary = None;
        }
        self.ids.len() != before
    }

    /// Selected components present in `components`, in selection order.
    pub fn resolve<'a>(&self, components: &'a [Component]) -> Vec<&'a Component> {
        self.ids
            .iter()
            .filter_map(|id| components.iter().find(|c| c.id() == *id))
            .collect()
    }

    /// The primary component, if set and still present.
    pub fn resolve_primary<'a>(&self, components: &'a [Component]) -> Option<&'a Component> {
        let primary = self.primary?;
        components.iter().find(|c| c.id() == primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use uuid::Uuid;

    #[test]
    fn test_select_replaces() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.add(a);
        selection.select(b);
        assert_eq!(selection.ids(), &[b]);
        assert_eq!(selection.primary(), Some(b));
    }

    #[test]
    fn test_add_keeps_first_as_primary() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.add(a);
        selection.add(b);
        selection.add(a);
        assert_eq!(selection.ids(), &[a, b]);
        assert_eq!(selection.primary(), Some(a));
    }

    #[test]
    fn test_deselect_primary_promotes_next() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.select_all([a, b, c]);
        selection.deselect(a);
        assert_eq!(selection.primary(), Some(b));

        selection.toggle(b);
        selection.toggle(c);
        assert!(selection.is_empty());
        assert_eq!(selection.primary(), None);
    }

    #[test]
    fn test_set_primary_requires_membership() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.select(a);
        assert!(!selection.set_primary(b));
        selection.add(b);
        assert!(selection.set_primary(b));
        assert_eq!(selection.primary(), Some(b));
    }

    #[test]
    fn test_retain_clears_stale_primary() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::new();
        selection.select_all([a, b]);
        assert!(selection.retain(|id| id == b));
        assert_eq!(selection.ids(), &[b]);
        assert_eq!(selection.primary(), None);
        assert!(!selection.retain(|_| true));
    }

    #[test]
    fn test_resolve_skips_stale_ids() {
        let first = Component::new(ComponentKind::Text);
        let second = Component::new(ComponentKind::Input);
        let components = vec![first.clone(), second.clone()];

        let mut selection = Selection::new();
        selection.select_all([second.id(), Uuid::new_v4(), first.id()]);

        let resolved: Vec<_> = selection.resolve(&components).iter().map(|c| c.id()).collect();
        assert_eq!(resolved, vec![second.id(), first.id()]);
        assert_eq!(selection.resolve_primary(&components).map(|c| c.id()), Some(second.id()));
    }
}
