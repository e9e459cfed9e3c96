//! Snap functionality for aligning positions to the grid and to guides, plus
//! the hit queries used by marquee selection and culling.

use crate::component::{Component, ComponentId};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Size, Vec2};

/// Distance (in screen pixels) within which a value snaps to a guide.
pub const SNAP_THRESHOLD: f64 = 5.0;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Round a value to the nearest grid line.
///
/// Returns the value unchanged when snapping is off, the grid is not
/// positive, or the value is not finite.
pub fn snap_to_grid(value: f64, grid_size: f64, enabled: bool) -> f64 {
    if !enabled || !grid_size.is_finite() || grid_size <= 0.0 || !value.is_finite() {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap a point to the nearest grid intersection.
pub fn snap_point_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if !grid_size.is_finite() || grid_size <= 0.0 || !point.is_finite() {
        return SnapResult::none(point);
    }
    SnapResult {
        point: Point::new(
            snap_to_grid(point.x, grid_size, true),
            snap_to_grid(point.y, grid_size, true),
        ),
        snapped_x: true,
        snapped_y: true,
    }
}

/// Snap a canvas value to the first guide closer than `threshold` screen
/// pixels at the given scale.
pub fn snap_to_guides(value: f64, guides: &[f64], threshold: f64, scale: f64, enabled: bool) -> f64 {
    if !enabled || !value.is_finite() {
        return value;
    }
    guides
        .iter()
        .copied()
        .find(|guide| (value - guide).abs() * scale < threshold)
        .unwrap_or(value)
}

/// Guide lines derived from component edges and centres.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapGuides {
    /// X coordinates of vertical guide lines.
    pub vertical: Vec<f64>,
    /// Y coordinates of horizontal guide lines.
    pub horizontal: Vec<f64>,
}

impl SnapGuides {
    /// Collect edge and centre lines of every component except `exclude`.
    pub fn from_components(components: &[Component], exclude: Option<ComponentId>) -> Self {
        let mut guides = Self::default();
        for component in components.iter().filter(|c| Some(c.id()) != exclude) {
            let bounds = component.bounds();
            let center = bounds.center();
            guides.vertical.extend([bounds.x0, center.x, bounds.x1]);
            guides.horizontal.extend([bounds.y0, center.y, bounds.y1]);
        }
        guides
    }

    /// Offset that brings the nearest edge or centre of `bounds` onto a
    /// guide, per axis. Zero on an axis with no guide within the threshold.
    pub fn snap_bounds(&self, bounds: Rect, scale: f64) -> Vec2 {
        let center = bounds.center();
        Vec2::new(
            nearest_shift(&[bounds.x0, center.x, bounds.x1], &self.vertical, scale),
            nearest_shift(&[bounds.y0, center.y, bounds.y1], &self.horizontal, scale),
        )
    }

    /// Snap a point to these guides, each axis independently.
    pub fn snap(&self, point: Point, scale: f64) -> SnapResult {
        let x = snap_to_guides(point.x, &self.vertical, SNAP_THRESHOLD, scale, true);
        let y = snap_to_guides(point.y, &self.horizontal, SNAP_THRESHOLD, scale, true);
        SnapResult {
            point: Point::new(x, y),
            snapped_x: x != point.x,
            snapped_y: y != point.y,
        }
    }
}

fn nearest_shift(candidates: &[f64], guides: &[f64], scale: f64) -> f64 {
    candidates
        .iter()
        .flat_map(|&value| guides.iter().map(move |&guide| guide - value))
        .filter(|shift| shift.abs() * scale < SNAP_THRESHOLD)
        .min_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0)
}

/// Whether any part of the component is visible in a viewport of the given
/// screen size.
pub fn is_component_in_viewport(component: &Component, viewport: &Viewport, size: Size) -> bool {
    let screen = viewport.transform().transform_rect_bbox(component.bounds());
    !(screen.x1 < 0.0 || screen.x0 > size.width || screen.y1 < 0.0 || screen.y0 > size.height)
}

/// Ids of components whose centre lies inside the box (canvas coordinates,
/// any corner order), in collection order.
pub fn components_in_selection_box(components: &[Component], selection_box: Rect) -> Vec<ComponentId> {
    let selection_box = selection_box.abs();
    components
        .iter()
        .filter(|c| {
            let center = c.center();
            center.x >= selection_box.x0
                && center.x <= selection_box.x1
                && center.y >= selection_box.y0
                && center.y <= selection_box.y1
        })
        .map(Component::id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentKind;

    fn component(x: f64, y: f64, width: f64, height: f64) -> Component {
        Component::with_geometry(ComponentKind::Text, Point::new(x, y), width, height)
    }

    #[test]
    fn test_snap_to_grid() {
        assert!((snap_to_grid(23.0, 20.0, true) - 20.0).abs() < f64::EPSILON);
        assert!((snap_to_grid(31.0, 20.0, true) - 40.0).abs() < f64::EPSILON);
        assert!((snap_to_grid(23.0, 20.0, false) - 23.0).abs() < f64::EPSILON);
        assert!((snap_to_grid(23.0, 0.0, true) - 23.0).abs() < f64::EPSILON);
        assert!(snap_to_grid(f64::NAN, 20.0, true).is_nan());
    }

    #[test]
    fn test_snap_point_to_grid() {
        let result = snap_point_to_grid(Point::new(23.0, 47.0), 10.0);
        assert_eq!(result.point, Point::new(20.0, 50.0));
        assert!(result.is_snapped());
        assert!(!snap_point_to_grid(Point::new(23.0, 47.0), -1.0).is_snapped());
    }

    #[test]
    fn test_snap_to_guides_uses_screen_threshold() {
        let guides = [100.0, 200.0];
        assert!((snap_to_guides(103.0, &guides, SNAP_THRESHOLD, 1.0, true) - 100.0).abs() < f64::EPSILON);
        // 3 canvas units are 6 screen pixels at 2x zoom
        assert!((snap_to_guides(103.0, &guides, SNAP_THRESHOLD, 2.0, true) - 103.0).abs() < f64::EPSILON);
        assert!((snap_to_guides(103.0, &guides, SNAP_THRESHOLD, 1.0, false) - 103.0).abs() < f64::EPSILON);
        assert!((snap_to_guides(103.0, &[], SNAP_THRESHOLD, 1.0, true) - 103.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_guides_from_components() {
        let a = component(0.0, 0.0, 100.0, 50.0);
        let b = component(300.0, 300.0, 20.0, 20.0);
        let guides = SnapGuides::from_components(&[a.clone(), b], Some(a.id()));
        assert_eq!(guides.vertical, vec![300.0, 310.0, 320.0]);

        let result = guides.snap(Point::new(308.0, 100.0), 1.0);
        assert_eq!(result.point, Point::new(310.0, 100.0));
        assert!(result.snapped_x && !result.snapped_y);
    }

    #[test]
    fn test_snap_bounds_picks_nearest_edge() {
        let anchor = component(0.0, 0.0, 100.0, 50.0);
        let guides = SnapGuides::from_components(&[anchor], None);

        // Left edge 3 away from x=100
        let shift = guides.snap_bounds(Rect::new(103.0, 200.0, 203.0, 250.0), 1.0);
        assert_eq!(shift, Vec2::new(-3.0, 0.0));

        // Centre 1 above y=25 beats bottom 2 below y=50 and top 4 below y=0
        let shift = guides.snap_bounds(Rect::new(400.0, 4.0, 420.0, 48.0), 1.0);
        assert_eq!(shift, Vec2::new(0.0, -1.0));

        // Already on a guide
        let shift = guides.snap_bounds(Rect::new(400.0, 4.0, 420.0, 50.0), 1.0);
        assert_eq!(shift, Vec2::ZERO);

        // Out of reach once zoomed in
        let shift = guides.snap_bounds(Rect::new(103.0, 200.0, 203.0, 250.0), 2.0);
        assert_eq!(shift, Vec2::ZERO);
    }

    #[test]
    fn test_component_in_viewport() {
        let mut viewport = Viewport::new();
        let size = Size::new(800.0, 600.0);
        let c = component(100.0, 100.0, 50.0, 50.0);
        assert!(is_component_in_viewport(&c, &viewport, size));

        viewport.set_offset(Vec2::new(-1000.0, 0.0));
        assert!(!is_component_in_viewport(&c, &viewport, size));

        viewport.set_transform(0.5, Vec2::new(-70.0, 0.0));
        assert!(is_component_in_viewport(&c, &viewport, size));
    }

    #[test]
    fn test_selection_box_uses_centres() {
        let inside = component(10.0, 10.0, 20.0, 20.0);
        let straddling = component(80.0, 10.0, 100.0, 20.0);
        let components = vec![inside.clone(), straddling];

        // Corners given in reverse order
        let ids = components_in_selection_box(&components, Rect::new(100.0, 100.0, 0.0, 0.0));
        assert_eq!(ids, vec![inside.id()]);
    }
}
