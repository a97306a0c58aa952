//! Spatial and statistical summaries over the stored dataset.
//!
//! Everything here is a pure function of the current point and polygon
//! lists. Values are always read through [`GeoPoint::effective_value`].
//!
//! Containment uses even-odd ray casting on a flat lat/lng plane. The planar
//! coordinates are `lat * 10, lng * 10`: a fixed equal-axis rescale that does
//! not change containment topology. Results are pinned by tests, so keep the
//! scale as is.

use std::fmt;

use crate::store::{GeoPoint, GeoPolygon, MapStore};
use crate::types::{LatLng, PolygonId};

/// Equal rescale applied to both axes before ray casting.
const PLANAR_SCALE: f64 = 10.0;

/// Even-odd ray-casting containment test over an ordered vertex list.
/// Winding direction does not matter. Fewer than three vertices never
/// contain anything.
pub fn point_in_polygon(pos: LatLng, vertices: &[LatLng]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let px = pos.lat * PLANAR_SCALE;
    let py = pos.lng * PLANAR_SCALE;

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i].lat * PLANAR_SCALE, vertices[i].lng * PLANAR_SCALE);
        let (xj, yj) = (vertices[j].lat * PLANAR_SCALE, vertices[j].lng * PLANAR_SCALE);
        let crosses = (yi > py) != (yj > py);
        if crosses && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Aggregate over the points a single polygon contains.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonSummary {
    pub id: PolygonId,
    pub name: String,
    pub count: usize,
    pub sum: f64,
    /// Arithmetic mean of contained effective values; 0 when empty.
    pub mean: f64,
}

/// Classify every point against one polygon and aggregate.
pub fn polygon_summary(polygon: &GeoPolygon, points: &[GeoPoint]) -> PolygonSummary {
    let contained: Vec<f64> = points
        .iter()
        .filter(|p| point_in_polygon(p.position, &polygon.vertices))
        .map(GeoPoint::effective_value)
        .collect();
    let count = contained.len();
    let sum: f64 = contained.iter().sum();
    PolygonSummary {
        id: polygon.id,
        name: polygon.name.clone(),
        count,
        sum,
        mean: if count == 0 { 0.0 } else { sum / count as f64 },
    }
}

/// Whole-dataset statistics over effective values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    /// Population standard deviation (mean of squared deviations, rooted).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

/// `None` when the point list is empty: an empty dataset has no statistics,
/// not zero-valued ones.
pub fn global_stats(points: &[GeoPoint]) -> Option<GlobalStats> {
    if points.is_empty() {
        return None;
    }
    let values: Vec<f64> = points.iter().map(GeoPoint::effective_value).collect();
    let count = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    Some(GlobalStats {
        count,
        sum,
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    })
}

/// Fixed three-bucket histogram over effective values. Values below 0 or at
/// or above 100 fall in no bucket at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueBuckets {
    /// `[0, 80)`
    pub low: usize,
    /// `[80, 90)`
    pub mid: usize,
    /// `[90, 100)`
    pub high: usize,
}

pub fn value_buckets(points: &[GeoPoint]) -> ValueBuckets {
    let mut buckets = ValueBuckets::default();
    for v in points.iter().map(GeoPoint::effective_value) {
        if (0.0..80.0).contains(&v) {
            buckets.low += 1;
        } else if (80.0..90.0).contains(&v) {
            buckets.mid += 1;
        } else if (90.0..100.0).contains(&v) {
            buckets.high += 1;
        }
    }
    buckets
}

/// Everything the reporting collaborator consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsReport {
    pub polygons: Vec<PolygonSummary>,
    pub global: Option<GlobalStats>,
    pub buckets: ValueBuckets,
}

/// Run the full analytics pass over the current dataset.
pub fn analyze(store: &MapStore) -> AnalyticsReport {
    AnalyticsReport {
        polygons: store
            .polygons()
            .iter()
            .map(|poly| polygon_summary(poly, store.points()))
            .collect(),
        global: global_stats(store.points()),
        buckets: value_buckets(store.points()),
    }
}

/// Plain-text rendering for hosts without a chart layer.
impl fmt::Display for AnalyticsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.global {
            None => writeln!(f, "no data")?,
            Some(g) => {
                writeln!(f, "points: {}", g.count)?;
                writeln!(
                    f,
                    "sum: {:.2}  mean: {:.2}  std: {:.2}  min: {:.2}  max: {:.2}",
                    g.sum, g.mean, g.std_dev, g.min, g.max
                )?;
            }
        }
        writeln!(
            f,
            "buckets: [0,80): {}  [80,90): {}  [90,100): {}",
            self.buckets.low, self.buckets.mid, self.buckets.high
        )?;
        for p in &self.polygons {
            writeln!(
                f,
                "{}: {} points, sum {:.2}, mean {:.2}",
                p.name, p.count, p.sum, p.mean
            )?;
        }
        Ok(())
    }
}
