//! The shared dataset: imported/placed points and drawn regions.
//!
//! The store is append-only. The engine adds entries and reads them back;
//! nothing in this crate deletes or edits an entry once stored. Discarding
//! data means discarding the whole store.

use crate::log::debug;
use crate::types::{LatLng, PointId, PolygonId};

/// A geolocated measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub id: PointId,
    pub position: LatLng,
    pub name: String,
    /// Raw imported or entered measurement.
    pub value: f64,
    /// Optional override of `value`. Consumers must read through
    /// [`GeoPoint::effective_value`], never `value` directly.
    pub derived_value: Option<f64>,
}

impl GeoPoint {
    /// The value every display and analytics consumer must use.
    #[inline]
    pub fn effective_value(&self) -> f64 {
        self.derived_value.unwrap_or(self.value)
    }
}

/// A drawn region of interest. Vertex order defines the boundary traversal;
/// either winding direction classifies containment identically.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoPolygon {
    pub id: PolygonId,
    pub name: String,
    pub vertices: Vec<LatLng>,
}

/// Normalized import record, the only shape the ingestion collaborator may
/// hand over.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCandidate {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub value: f64,
}

/// Owns the point and polygon lists.
#[derive(Clone, Debug, Default)]
pub struct MapStore {
    points: Vec<GeoPoint>,
    polygons: Vec<GeoPolygon>,
    next_point_id: u32,
    next_polygon_id: u32,
}

impl MapStore {
    pub fn new() -> MapStore {
        MapStore::default()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn polygons(&self) -> &[GeoPolygon] {
        &self.polygons
    }

    /// Append a point. `derived_value` set means analytics and display read
    /// it instead of `value`.
    pub fn add_point(
        &mut self,
        position: LatLng,
        name: impl Into<String>,
        value: f64,
        derived_value: Option<f64>,
    ) -> PointId {
        let id = PointId(self.next_point_id);
        self.next_point_id += 1;
        self.points.push(GeoPoint {
            id,
            position,
            name: name.into(),
            value,
            derived_value,
        });
        id
    }

    /// Append a polygon, auto-named sequentially (`Region 1`, `Region 2`...).
    /// Refuses anything below three vertices: an under-drawn session is
    /// discarded by its caller, never persisted.
    pub fn add_polygon(&mut self, vertices: Vec<LatLng>) -> Option<PolygonId> {
        if vertices.len() < crate::session::MIN_POLYGON_VERTICES {
            return None;
        }
        let id = PolygonId(self.next_polygon_id);
        self.next_polygon_id += 1;
        self.polygons.push(GeoPolygon {
            id,
            name: format!("Region {}", self.polygons.len() + 1),
            vertices,
        });
        Some(id)
    }

    /// Bulk-import normalized records. Records whose latitude and longitude
    /// are both exactly 0 carry the "missing coordinate" sentinel and are
    /// dropped silently, as are non-finite coordinates. Returns how many
    /// points were retained.
    pub fn ingest(&mut self, candidates: impl IntoIterator<Item = PointCandidate>) -> usize {
        let mut retained = 0;
        for c in candidates {
            let Ok(position) = LatLng::try_new(c.latitude, c.longitude) else {
                continue;
            };
            if position.is_null_island() {
                continue;
            }
            self.add_point(position, c.name, c.value, None);
            retained += 1;
        }
        debug!(retained, "ingest complete");
        retained
    }
}
