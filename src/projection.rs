//! Coordinate transforms between geographic, tile, world-pixel, and screen
//! space.
//!
//! The pipeline is the standard Web-Mercator slippy-map one: geographic
//! degrees map onto a square pyramid of 256 px tiles, `2^z` tiles per axis at
//! integer tile zoom `z`. "World pixels" are tile-fractional coordinates
//! scaled by [`TILE_SIZE`]; the screen is a window into world space positioned
//! by the viewport's pan offset and scaled by its continuous zoom factor.
//!
//! Two distinct integer tile zooms are derived from the one continuous zoom
//! factor:
//!
//! - [`fine_tile_zoom`] (`round(zf + 10)`) anchors the screen<->geo pipeline,
//!   giving pointer conversions fine-grained resolution;
//! - [`coarse_tile_zoom`] (`round(zf + 8)`) picks which raster tiles the
//!   renderer fetches, two pyramid levels cheaper.
//!
//! The two offsets are load-bearing: collapsing them into one derivation
//! shifts either pointer accuracy or tile density.

use std::f64::consts::PI;

use glam::DVec2;

use crate::types::{LatLng, TILE_SIZE, TileCoord, ZoomFactor};

/// Bias added to the zoom factor for the screen<->geo tile zoom.
const FINE_ZOOM_BIAS: f64 = 10.0;
/// Bias added to the zoom factor for the tile-fetch zoom.
const COARSE_ZOOM_BIAS: f64 = 8.0;
/// Tile zooms are clamped to the pyramid levels the tile source serves.
const MIN_TILE_ZOOM: f64 = 1.0;
const MAX_TILE_ZOOM: f64 = 18.0;

fn derive_tile_zoom(zoom: ZoomFactor, bias: f64) -> u8 {
    (zoom.raw() + bias).round().clamp(MIN_TILE_ZOOM, MAX_TILE_ZOOM) as u8
}

/// Integer tile zoom used for screen<->geo conversion.
pub fn fine_tile_zoom(zoom: ZoomFactor) -> u8 {
    derive_tile_zoom(zoom, FINE_ZOOM_BIAS)
}

/// Integer tile zoom used for selecting which raster tiles to fetch.
pub fn coarse_tile_zoom(zoom: ZoomFactor) -> u8 {
    derive_tile_zoom(zoom, COARSE_ZOOM_BIAS)
}

/// Map a geographic coordinate to the integer tile containing it.
pub fn geo_to_tile(pos: LatLng, tile_z: u8) -> TileCoord {
    let frac = geo_to_tile_frac(pos, tile_z);
    TileCoord::new(frac.x.floor() as i64, frac.y.floor() as i64, tile_z)
}

/// Map a geographic coordinate to fractional tile coordinates.
pub fn geo_to_tile_frac(pos: LatLng, tile_z: u8) -> DVec2 {
    let n = (1u64 << tile_z) as f64;
    let lat_rad = pos.lat.to_radians();
    let x = (pos.lng + 180.0) / 360.0 * n;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;
    DVec2::new(x, y)
}

/// Map (possibly fractional) tile coordinates back to geographic degrees.
///
/// Inverse of [`geo_to_tile_frac`]; with integer inputs it yields the
/// north-west corner of the tile.
pub fn tile_to_geo(x: f64, y: f64, tile_z: u8) -> LatLng {
    let n = (1u64 << tile_z) as f64;
    let lng = x / n * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Projection of world space onto the screen for one frozen viewport
/// configuration.
///
/// Pure and deterministic: the same `(pan, zoom, screen size)` triple always
/// produces the same mapping, which is what makes the screen<->geo round trip
/// exact between viewport changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projector {
    /// Pan offset in world pixels (at scale 1, before the zoom multiplier).
    pub pan: DVec2,
    /// Continuous display-scale multiplier.
    pub zoom: ZoomFactor,
    /// Viewport size in screen pixels.
    pub screen_size: DVec2,
}

impl Projector {
    pub fn new(pan: DVec2, zoom: ZoomFactor, screen_size: DVec2) -> Projector {
        Projector {
            pan,
            zoom,
            screen_size,
        }
    }

    /// Screen position of the viewport center.
    #[inline]
    fn center(&self) -> DVec2 {
        self.screen_size / 2.0
    }

    /// Map a pointer position to geographic degrees.
    pub fn screen_to_geo(&self, screen: DVec2) -> LatLng {
        let world = self.pan + (screen - self.center()) / self.zoom.raw();
        let tile_z = fine_tile_zoom(self.zoom);
        tile_to_geo(world.x / TILE_SIZE, world.y / TILE_SIZE, tile_z)
    }

    /// Map a geographic coordinate to its screen position. Exact inverse of
    /// [`Projector::screen_to_geo`] for an unchanged viewport.
    pub fn geo_to_screen(&self, pos: LatLng) -> DVec2 {
        let tile_z = fine_tile_zoom(self.zoom);
        let world = geo_to_tile_frac(pos, tile_z) * TILE_SIZE;
        (world - self.pan) * self.zoom.raw() + self.center()
    }

    /// Screen rectangle (top-left corner and size) a tile paints into, under
    /// this projection. Stale async arrivals are placed with the *current*
    /// projector, so a tile fetched for an older viewport may land shifted.
    pub fn tile_screen_rect(&self, tile: TileCoord) -> (DVec2, DVec2) {
        let nw = tile_to_geo(tile.x as f64, tile.y as f64, tile.z);
        let se = tile_to_geo((tile.x + 1) as f64, (tile.y + 1) as f64, tile.z);
        let top_left = self.geo_to_screen(nw);
        let bottom_right = self.geo_to_screen(se);
        (top_left, bottom_right - top_left)
    }
}
