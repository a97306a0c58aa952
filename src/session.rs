//! Drawing-session state machine.
//!
//! One tagged union covers both interaction modes, so "drawing a polygon
//! while also adding a point" is unrepresentable. Transitions are entirely
//! user-driven; there is no terminal state. The session never touches the
//! data store itself: finishing hands the accumulated geometry back to the
//! caller, which decides where it goes.

use crate::log::debug;
use crate::types::LatLng;

/// Minimum vertices before a polygon can be materialized.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Transient interaction state for the two drawing modes.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DrawingSession {
    #[default]
    Idle,
    /// Collecting polygon vertices, one per map click.
    DrawingPolygon { vertices: Vec<LatLng> },
    /// Waiting for a click to place a point, then for the host to collect
    /// its name and value.
    AddingPoint { pending: Option<LatLng> },
}

/// What a map click did, so the engine can react.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickOutcome {
    /// Click outside any drawing mode; nothing captured.
    Ignored,
    /// A vertex was appended to the in-progress polygon.
    VertexAdded,
    /// A pending point coordinate was captured; the host must now collect
    /// a name and value from the operator.
    PointPending(LatLng),
}

impl DrawingSession {
    pub fn new() -> DrawingSession {
        DrawingSession::Idle
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, DrawingSession::Idle)
    }

    /// Vertices accumulated so far, if a polygon is being drawn.
    pub fn vertices(&self) -> &[LatLng] {
        match self {
            DrawingSession::DrawingPolygon { vertices } => vertices,
            _ => &[],
        }
    }

    /// Whether `finish_polygon` would currently materialize anything.
    pub fn can_finish_polygon(&self) -> bool {
        self.vertices().len() >= MIN_POLYGON_VERTICES
    }

    /// Enter polygon-drawing mode, discarding any leftover state from either
    /// mode. The vertex list always starts empty.
    pub fn begin_polygon(&mut self) {
        *self = DrawingSession::DrawingPolygon {
            vertices: Vec::new(),
        };
    }

    /// Enter point-adding mode, discarding any leftover state from either
    /// mode.
    pub fn begin_add_point(&mut self) {
        *self = DrawingSession::AddingPoint { pending: None };
    }

    /// A click on the map, already converted to geographic degrees.
    pub fn map_click(&mut self, pos: LatLng) -> ClickOutcome {
        match self {
            DrawingSession::Idle => ClickOutcome::Ignored,
            DrawingSession::DrawingPolygon { vertices } => {
                vertices.push(pos);
                debug!(count = vertices.len(), "polygon vertex added");
                ClickOutcome::VertexAdded
            }
            DrawingSession::AddingPoint { pending } => {
                *pending = Some(pos);
                ClickOutcome::PointPending(pos)
            }
        }
    }

    /// Complete the in-progress polygon. With fewer than
    /// [`MIN_POLYGON_VERTICES`] accumulated this is a no-op: the session
    /// stays in drawing mode and nothing is materialized.
    pub fn finish_polygon(&mut self) -> Option<Vec<LatLng>> {
        if !self.can_finish_polygon() {
            return None;
        }
        match std::mem::take(self) {
            DrawingSession::DrawingPolygon { vertices } => Some(vertices),
            _ => unreachable!("can_finish_polygon implies DrawingPolygon"),
        }
    }

    /// The operator confirmed the pending point's details. `raw_value` is
    /// whatever was typed; non-numeric input coerces to 0 rather than
    /// rejecting the confirmation. Returns the coordinate and parsed value,
    /// or `None` if no point was pending.
    pub fn confirm_point(&mut self, raw_value: &str) -> Option<(LatLng, f64)> {
        match self {
            DrawingSession::AddingPoint {
                pending: Some(pos),
            } => {
                let value = raw_value.trim().parse::<f64>().unwrap_or(0.0);
                let pos = *pos;
                *self = DrawingSession::Idle;
                Some((pos, value))
            }
            _ => None,
        }
    }

    /// Abandon whatever is in progress: vertices, pending coordinate, all of
    /// it. Valid from any state.
    pub fn cancel(&mut self) {
        *self = DrawingSession::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng)
    }

    #[test]
    fn clicks_while_idle_are_ignored() {
        let mut s = DrawingSession::new();
        assert_eq!(s.map_click(p(1.0, 2.0)), ClickOutcome::Ignored);
        assert!(s.is_idle());
    }

    #[test]
    fn polygon_accumulates_vertices() {
        let mut s = DrawingSession::new();
        s.begin_polygon();
        s.map_click(p(0.0, 0.0));
        s.map_click(p(0.0, 1.0));
        assert_eq!(s.vertices().len(), 2);
        assert!(!s.can_finish_polygon());
        s.map_click(p(1.0, 1.0));
        assert!(s.can_finish_polygon());
    }

    #[test]
    fn finish_below_three_vertices_is_a_noop() {
        let mut s = DrawingSession::new();
        s.begin_polygon();
        s.map_click(p(0.0, 0.0));
        s.map_click(p(0.0, 1.0));
        assert_eq!(s.finish_polygon(), None);
        // still drawing; only an explicit cancel leaves the state
        assert!(!s.is_idle());
        assert_eq!(s.vertices().len(), 2);
        s.cancel();
        assert!(s.is_idle());
    }

    #[test]
    fn finish_returns_vertices_and_resets() {
        let mut s = DrawingSession::new();
        s.begin_polygon();
        for v in [p(0.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), p(1.0, 0.0)] {
            s.map_click(v);
        }
        let vertices = s.finish_polygon().unwrap();
        assert_eq!(vertices.len(), 4);
        assert!(s.is_idle());
    }

    #[test]
    fn restarting_polygon_clears_old_vertices() {
        let mut s = DrawingSession::new();
        s.begin_polygon();
        s.map_click(p(0.0, 0.0));
        s.begin_polygon();
        assert!(s.vertices().is_empty());
    }

    #[test]
    fn modes_are_mutually_exclusive() {
        let mut s = DrawingSession::new();
        s.begin_polygon();
        s.map_click(p(0.0, 0.0));
        // switching modes drops the half-drawn polygon
        s.begin_add_point();
        assert!(s.vertices().is_empty());
        assert_eq!(s, DrawingSession::AddingPoint { pending: None });

        s.map_click(p(3.0, 4.0));
        // and switching back drops the pending point
        s.begin_polygon();
        assert_eq!(s.confirm_point("5"), None);
    }

    #[test]
    fn point_click_captures_pending_coordinate() {
        let mut s = DrawingSession::new();
        s.begin_add_point();
        assert_eq!(
            s.map_click(p(3.0, 4.0)),
            ClickOutcome::PointPending(p(3.0, 4.0))
        );
        // a second click before confirmation re-captures
        assert_eq!(
            s.map_click(p(5.0, 6.0)),
            ClickOutcome::PointPending(p(5.0, 6.0))
        );
    }

    #[test]
    fn confirm_parses_value() {
        let mut s = DrawingSession::new();
        s.begin_add_point();
        s.map_click(p(3.0, 4.0));
        let (pos, value) = s.confirm_point(" 87.5 ").unwrap();
        assert_eq!(pos, p(3.0, 4.0));
        assert_eq!(value, 87.5);
        assert!(s.is_idle());
    }

    #[test]
    fn confirm_coerces_non_numeric_to_zero() {
        let mut s = DrawingSession::new();
        s.begin_add_point();
        s.map_click(p(3.0, 4.0));
        let (_, value) = s.confirm_point("not a number").unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn confirm_without_pending_click_does_nothing() {
        let mut s = DrawingSession::new();
        s.begin_add_point();
        assert_eq!(s.confirm_point("42"), None);
        // still waiting for a click
        assert!(!s.is_idle());
    }

    #[test]
    fn cancel_discards_pending_point() {
        let mut s = DrawingSession::new();
        s.begin_add_point();
        s.map_click(p(3.0, 4.0));
        s.cancel();
        assert!(s.is_idle());
        assert_eq!(s.confirm_point("42"), None);
    }
}
