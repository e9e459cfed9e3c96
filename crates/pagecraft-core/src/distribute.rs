//! Even spacing of three or more selected components along one axis.

use crate::component::{Axis, Component};
use crate::history::ComponentChange;
use crate::selection::Selection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    Horizontal,
    Vertical,
}

impl Distribution {
    pub fn axis(self) -> Axis {
        match self {
            Distribution::Horizontal => Axis::X,
            Distribution::Vertical => Axis::Y,
        }
    }
}

/// Compute the moves that give the selection equal gaps.
///
/// Members are stably sorted by leading coordinate. The first and last keep
/// their positions; the slack between them (never negative) is split into
/// `n - 1` equal gaps and interior members are packed along a float cursor,
/// each rounded to whole canvas units.
pub fn distribute(
    components: &[Component],
    selection: &Selection,
    distribution: Distribution,
) -> Vec<ComponentChange> {
    let mut members = selection.resolve(components);
    if members.len() < 3 {
        return Vec::new();
    }

    let axis = distribution.axis();
    members.sort_by(|a, b| axis.position(a).total_cmp(&axis.position(b)));

    let first = members[0];
    let last = members[members.len() - 1];
    let range = axis.position(last) + axis.size(last) - axis.position(first);
    let total_size: f64 = members.iter().map(|c| axis.size(c)).sum();
    let slack = (range - total_size).max(0.0);
    let gap = slack / (members.len() - 1) as f64;

    let mut changes = Vec::new();
    let mut cursor = axis.position(first) + axis.size(first) + gap;
    for member in &members[1..members.len() - 1] {
        let new_position = cursor.round();
        cursor += axis.size(member) + gap;

        if (new_position - axis.position(member)).abs() < f64::EPSILON {
            continue;
        }
        let mut current = (*member).clone();
        axis.set_position(&mut current, new_position);
        changes.push(ComponentChange {
            previous: (*member).clone(),
            current,
        });
    }

    log::debug!(
        "Distribute {:?} across {} component(s), gap {:.2}: {} move",
        distribution,
        members.len(),
        gap,
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
        Component::with_geometry(ComponentKind::Input, Point::new(x, y), width, height)
    }

    fn select(components: &[Component]) -> Selection {
        let mut selection = Selection::new();
        selection.select_all(components.iter().map(Component::id));
        selection
    }

    fn apply(components: &mut [Component], changes: &[ComponentChange]) {
        for change in changes {
            if let Some(slot) = components.iter_mut().find(|c| c.id() == change.id()) {
                *slot = change.current.clone();
            }
        }
    }

    #[test]
    fn test_distribute_scenario() {
        let mut components = vec![
            component(0.0, 0.0, 100.0, 40.0),
            component(120.0, 0.0, 100.0, 40.0),
            component(500.0, 0.0, 100.0, 40.0),
        ];
        let selection = select(&components);

        let changes = distribute(&components, &selection, Distribution::Horizontal);
        apply(&mut components, &changes);
        assert!((components[0].x - 0.0).abs() < f64::EPSILON);
        assert!((components[1].x - 250.0).abs() < f64::EPSILON);
        assert!((components[2].x - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_distribute_horizontal() {
        let components = vec![
            component(0.0, 0.0, 50.0, 10.0),
            component(60.0, 0.0, 50.0, 10.0),
            component(300.0, 0.0, 50.0, 10.0),
        ];

        let changes = distribute(&components, &select(&components), Distribution::Horizontal);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id(), components[1].id());
        assert!((changes[0].current.x - 150.0).abs() < f64::EPSILON);
        assert!((changes[0].current.y - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_endpoints_fixed_and_gaps_equal() {
        // Unsorted selection with mixed sizes
        let mut components = vec![
            component(0.0, 400.0, 10.0, 40.0),
            component(0.0, 0.0, 10.0, 30.0),
            component(0.0, 35.0, 10.0, 70.0),
            component(0.0, 700.0, 10.0, 25.0),
            component(0.0, 90.0, 10.0, 10.0),
        ];
        let first = components[1].clone();
        let last = components[3].clone();
        let selection = select(&components);

        let changes = distribute(&components, &selection, Distribution::Vertical);
        assert!(changes.iter().all(|c| c.id() != first.id() && c.id() != last.id()));
        apply(&mut components, &changes);

        let mut sorted = components.clone();
        sorted.sort_by(|a, b| a.y.total_cmp(&b.y));
        assert_eq!(sorted[0], first);
        assert_eq!(sorted[4], last);

        let gaps: Vec<f64> = sorted.windows(2).map(|w| w[1].y - (w[0].y + w[0].height)).collect();
        for gap in &gaps {
            assert!((gap - gaps[0]).abs() <= 1.0, "{:?}", gaps);
        }
    }

    #[test]
    fn test_overlapping_input_never_negative_gap() {
        let components = vec![
            component(0.0, 0.0, 100.0, 10.0),
            component(10.0, 0.0, 100.0, 10.0),
            component(20.0, 0.0, 100.0, 10.0),
        ];

        let changes = distribute(&components, &select(&components), Distribution::Horizontal);
        assert_eq!(changes.len(), 1);
        assert!((changes[0].current.x - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fewer_than_three_is_noop() {
        let components = vec![component(0.0, 0.0, 10.0, 10.0), component(90.0, 0.0, 10.0, 10.0)];
        assert!(distribute(&components, &select(&components), Distribution::Horizontal).is_empty());
    }

    #[test]
    fn test_already_distributed_is_noop() {
        let components = vec![
            component(0.0, 0.0, 20.0, 10.0),
            component(40.0, 0.0, 20.0, 10.0),
            component(80.0, 0.0, 20.0, 10.0),
        ];
        assert!(distribute(&components, &select(&components), Distribution::Horizontal).is_empty());
    }
}
