//! Strongly-typed coordinate primitives for geocanvas.
//!
//! Design goals:
//! - No raw `f64` zoom factors or geographic coordinates in domain logic
//! - Illegal states unrepresentable (clamped zoom, validated coordinates)
//! - Screen/world-pixel math goes through `glam::DVec2`

use std::fmt;

use thiserror::Error;

/// Raster tiles are 256x256 px throughout the web-map pyramid.
pub const TILE_SIZE: f64 = 256.0;

/// Error type for invalid numeric values
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericError {
    /// Value is NaN
    #[error("value is NaN")]
    NaN,
    /// Value is infinite
    #[error("value is infinite")]
    Infinite,
}

/// A geographic coordinate in degrees.
///
/// Latitude/longitude are deliberately kept as a domain newtype rather than a
/// bare vector so they cannot be mixed up with screen or tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Create a LatLng (unchecked). Use `try_new` for user-provided values.
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> LatLng {
        LatLng { lat, lng }
    }

    /// Create a LatLng with validation (rejects NaN/infinite components)
    pub fn try_new(lat: f64, lng: f64) -> Result<LatLng, NumericError> {
        for v in [lat, lng] {
            if v.is_nan() {
                return Err(NumericError::NaN);
            }
            if v.is_infinite() {
                return Err(NumericError::Infinite);
            }
        }
        Ok(LatLng { lat, lng })
    }

    /// The (0, 0) sentinel used by tabular imports for "missing coordinate".
    #[inline]
    pub fn is_null_island(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// Check that both components are finite (not NaN or infinite)
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

/// Continuous display-scale multiplier, always within `[0.1, 20]`.
///
/// The tile-grid zoom level (integer, used only for tile addressing) is
/// derived from this in [`crate::projection`]; the two are different axes.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ZoomFactor(f64);

impl ZoomFactor {
    pub const MIN: f64 = 0.1;
    pub const MAX: f64 = 20.0;

    /// Multiplicative step used by zoom_in/zoom_out.
    const STEP: f64 = 1.5;

    /// Create a zoom factor, clamping into `[0.1, 20]`. NaN falls back to 1.
    pub fn new(raw: f64) -> ZoomFactor {
        if raw.is_nan() {
            ZoomFactor(1.0)
        } else {
            ZoomFactor(raw.clamp(Self::MIN, Self::MAX))
        }
    }

    /// Get the raw multiplier (use sparingly, prefer typed operations)
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// One zoom step in: x1.5, saturating at the upper clamp.
    #[inline]
    pub fn zoomed_in(self) -> ZoomFactor {
        ZoomFactor::new(self.0 * Self::STEP)
    }

    /// One zoom step out: /1.5, saturating at the lower clamp.
    #[inline]
    pub fn zoomed_out(self) -> ZoomFactor {
        ZoomFactor::new(self.0 / Self::STEP)
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        ZoomFactor(1.0)
    }
}

impl fmt::Display for ZoomFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer tile address in the standard web-map pyramid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: i64, y: i64, z: u8) -> TileCoord {
        TileCoord { x, y, z }
    }

    /// Number of tiles along one axis at this zoom level.
    #[inline]
    pub fn axis_len(self) -> i64 {
        1i64 << self.z
    }

    /// Whether the address lies inside the pyramid at its zoom level.
    /// Out-of-range addresses are skipped by the renderer, never fetched.
    pub fn in_range(self) -> bool {
        let n = self.axis_len();
        self.x >= 0 && self.x < n && self.y >= 0 && self.y < n
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Identifier for a stored data point (sequential, never reused).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub u32);

/// Identifier for a stored polygon (sequential, never reused).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonId(pub u32);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== LatLng tests ====================

    #[test]
    fn latlng_try_new_valid() {
        assert!(LatLng::try_new(40.7, -74.0).is_ok());
        assert!(LatLng::try_new(0.0, 0.0).is_ok());
        assert!(LatLng::try_new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn latlng_try_new_rejects_nan() {
        assert_eq!(LatLng::try_new(f64::NAN, 0.0), Err(NumericError::NaN));
        assert_eq!(LatLng::try_new(0.0, f64::NAN), Err(NumericError::NaN));
    }

    #[test]
    fn latlng_try_new_rejects_infinity() {
        assert_eq!(
            LatLng::try_new(f64::INFINITY, 0.0),
            Err(NumericError::Infinite)
        );
        assert_eq!(
            LatLng::try_new(0.0, f64::NEG_INFINITY),
            Err(NumericError::Infinite)
        );
    }

    #[test]
    fn latlng_null_island() {
        assert!(LatLng::new(0.0, 0.0).is_null_island());
        assert!(!LatLng::new(0.0, 1.0).is_null_island());
        assert!(!LatLng::new(1.0, 0.0).is_null_island());
    }

    // ==================== ZoomFactor tests ====================

    #[test]
    fn zoom_factor_clamps_on_construction() {
        assert_eq!(ZoomFactor::new(0.01).raw(), 0.1);
        assert_eq!(ZoomFactor::new(100.0).raw(), 20.0);
        assert_eq!(ZoomFactor::new(3.0).raw(), 3.0);
    }

    #[test]
    fn zoom_factor_nan_falls_back_to_one() {
        assert_eq!(ZoomFactor::new(f64::NAN).raw(), 1.0);
    }

    #[test]
    fn zoom_in_out_are_inverse_away_from_clamp() {
        let z = ZoomFactor::new(2.0);
        let round_trip = z.zoomed_in().zoomed_out();
        assert!((round_trip.raw() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zoom_saturates_at_bounds() {
        let top = ZoomFactor::new(20.0);
        assert_eq!(top.zoomed_in().raw(), 20.0);
        // once saturated, zooming out loses the pre-clamp excess
        assert!(top.zoomed_in().zoomed_out().raw() < 20.0);

        let bottom = ZoomFactor::new(0.1);
        assert_eq!(bottom.zoomed_out().raw(), 0.1);
    }

    // ==================== TileCoord tests ====================

    #[test]
    fn tile_coord_range() {
        assert!(TileCoord::new(0, 0, 1).in_range());
        assert!(TileCoord::new(1, 1, 1).in_range());
        assert!(!TileCoord::new(2, 0, 1).in_range());
        assert!(!TileCoord::new(0, -1, 1).in_range());
        assert!(!TileCoord::new(-3, 5, 4).in_range());
    }

    #[test]
    fn tile_coord_axis_len() {
        assert_eq!(TileCoord::new(0, 0, 0).axis_len(), 1);
        assert_eq!(TileCoord::new(0, 0, 10).axis_len(), 1024);
    }

    #[test]
    fn tile_coord_display() {
        assert_eq!(TileCoord::new(3, 5, 7).to_string(), "7/3/5");
    }
}
