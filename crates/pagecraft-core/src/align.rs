//! Alignment of selected components against a primary component.

use crate::component::{Axis, Component};
use crate::history::ComponentChange;
use crate::selection::Selection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Edge or centre line to align on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

impl Alignment {
    pub fn axis(self) -> Axis {
        match self {
            Alignment::Left | Alignment::Center | Alignment::Right => Axis::X,
            Alignment::Top | Alignment::Middle | Alignment::Bottom => Axis::Y,
        }
    }

    /// Fraction of the extent the aligned line sits at: 0 leading, 0.5
    /// centre, 1 trailing.
    fn fraction(self) -> f64 {
        match self {
            Alignment::Left | Alignment::Top => 0.0,
            Alignment::Center | Alignment::Middle => 0.5,
            Alignment::Right | Alignment::Bottom => 1.0,
        }
    }

    /// Coordinate of the aligned line on a component.
    pub fn target(self, component: &Component) -> f64 {
        let axis = self.axis();
        axis.position(component) + axis.size(component) * self.fraction()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Left => write!(f, "left"),
            Alignment::Center => write!(f, "center"),
            Alignment::Right => write!(f, "right"),
            Alignment::Top => write!(f, "top"),
            Alignment::Middle => write!(f, "middle"),
            Alignment::Bottom => write!(f, "bottom"),
        }
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Alignment::Left),
            "center" => Ok(Alignment::Center),
            "right" => Ok(Alignment::Right),
            "top" => Ok(Alignment::Top),
            "middle" => Ok(Alignment::Middle),
            "bottom" => Ok(Alignment::Bottom),
            _ => Err(format!("Unknown alignment: {}", s)),
        }
    }
}

/// Compute the moves that align the selection to its primary.
///
/// Members resolve in selection order and stale ids are skipped. The primary
/// is the selection's primary if it resolves, otherwise the first resolved
/// member. Only the aligned axis changes and results are rounded to whole
/// canvas units, so aligning twice moves nothing the second time. Members
/// already in place produce no change.
pub fn align(
    components: &[Component],
    selection: &Selection,
    alignment: Alignment,
) -> Vec<ComponentChange> {
    let members = selection.resolve(components);
    if members.len() <= 1 {
        return Vec::new();
    }

    let primary = match selection.resolve_primary(components) {
        Some(primary) => primary,
        None => members[0],
    };
    let axis = alignment.axis();
    let target = alignment.target(primary);

    let mut changes = Vec::new();
    for member in members {
        if member.id() == primary.id() {
            continue;
        }

        let new_position = (target - axis.size(member) * alignment.fraction()).round();
        if (new_position - axis.position(member)).abs() < f64::EPSILON {
            continue;
        }

        let mut current = member.clone();
        axis.set_position(&mut current, new_position);
        changes.push(ComponentChange {
            previous: member.clone(),
            current,
        });
    }

    log::debug!(
        "Align {} to {}: {} component(s) move",
        alignment,
        primary.id(),
        changes.len()
    );
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;
    use kurbo::Point;

    fn component(x: f64, y: f64, width: f64, height: f64) -> Component {
        Component::with_geometry(ComponentKind::Text, Point::new(x, y), width, height)
    }

    fn apply(components: &mut [Component], changes: &[ComponentChange]) {
        for change in changes {
            if let Some(slot) = components.iter_mut().find(|c| c.id() == change.id()) {
                *slot = change.current.clone();
            }
        }
    }

    fn select(components: &[Component]) -> Selection {
        let mut selection = Selection::new();
        selection.select_all(components.iter().map(Component::id));
        selection
    }

    #[test]
    fn test_align_left_scenario() {
        let a = component(0.0, 0.0, 100.0, 50.0);
        let b = component(50.0, 0.0, 100.0, 50.0);
        let mut components = vec![a.clone(), b.clone()];
        let mut selection = select(&components);
        assert!(selection.set_primary(a.id()));

        let changes = align(&components, &selection, Alignment::Left);
        apply(&mut components, &changes);
        assert_eq!(components[0], a);
        assert!((components[1].x - 0.0).abs() < f64::EPSILON);
        assert!((components[1].y - b.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_align_center() {
        let a = component(100.0, 50.0, 200.0, 100.0);
        let b = component(300.0, 200.0, 100.0, 80.0);
        let components = vec![a.clone(), b.clone()];

        let changes = align(&components, &select(&components), Alignment::Center);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id(), b.id());
        assert!((changes[0].current.x - 150.0).abs() < f64::EPSILON);
        assert!((changes[0].current.y - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_align_all_edges() {
        let a = component(100.0, 50.0, 200.0, 100.0);
        let b = component(10.0, 400.0, 50.0, 30.0);
        let components = vec![a, b];
        let selection = select(&components);

        let expected = [
            (Alignment::Left, 100.0),
            (Alignment::Right, 250.0),
            (Alignment::Top, 50.0),
            (Alignment::Middle, 85.0),
            (Alignment::Bottom, 120.0),
        ];
        for (alignment, position) in expected {
            let changes = align(&components, &selection, alignment);
            let moved = alignment.axis().position(&changes[0].current);
            assert!((moved - position).abs() < f64::EPSILON, "{}: {}", alignment, moved);
        }
    }

    #[test]
    fn test_align_is_idempotent() {
        let mut components = vec![
            component(13.0, 7.0, 101.0, 33.0),
            component(250.5, 90.0, 47.0, 61.0),
            component(-40.0, 300.0, 80.0, 20.0),
        ];
        let selection = select(&components);

        for alignment in [
            Alignment::Left,
            Alignment::Center,
            Alignment::Right,
            Alignment::Top,
            Alignment::Middle,
            Alignment::Bottom,
        ] {
            let changes = align(&components, &selection, alignment);
            apply(&mut components, &changes);
            assert!(align(&components, &selection, alignment).is_empty());
        }
    }

    #[test]
    fn test_primary_never_moves() {
        let components = vec![
            component(0.0, 0.0, 100.0, 50.0),
            component(500.0, 500.0, 60.0, 60.0),
            component(250.0, 125.0, 30.0, 90.0),
        ];
        let mut selection = select(&components);
        selection.set_primary(components[1].id());

        let changes = align(&components, &selection, Alignment::Bottom);
        assert_eq!(changes.len(), 2);
        assert!(changes.iter().all(|c| c.id() != components[1].id()));
        assert!(changes.iter().all(|c| (c.current.y + c.current.height - 560.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_stale_primary_falls_back_to_first() {
        let components = vec![component(10.0, 0.0, 10.0, 10.0), component(90.0, 0.0, 10.0, 10.0)];
        let mut selection = Selection::new();
        selection.add(uuid::Uuid::new_v4());
        selection.add(components[1].id());
        selection.add(components[0].id());

        let changes = align(&components, &selection, Alignment::Left);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id(), components[0].id());
        assert!((changes[0].current.x - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_selection_is_noop() {
        let components = vec![component(0.0, 0.0, 10.0, 10.0), component(50.0, 0.0, 10.0, 10.0)];
        let mut selection = Selection::new();
        selection.select(components[0].id());
        assert!(align(&components, &selection, Alignment::Right).is_empty());
        assert!(align(&components, &Selection::new(), Alignment::Right).is_empty());
    }

    #[test]
    fn test_alignment_parse() {
        assert_eq!("Middle".parse::<Alignment>(), Ok(Alignment::Middle));
        assert_eq!(Alignment::Middle.axis(), Axis::Y);
        assert!("justify".parse::<Alignment>().is_err());
    }
}
