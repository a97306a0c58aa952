//! Raster tile fetching and placement.
//!
//! The layer itself performs no I/O. `refresh` turns a viewport into a list
//! of fetch requests (URL per tile) for the host to run; the host feeds
//! completions back through `tile_loaded`/`tile_failed`. Fetches are
//! fire-and-forget: nothing is cancelled when the viewport moves on, and a
//! stale completion is simply placed at whatever rectangle the *current*
//! projection computes for its address. Failures and out-of-pyramid addresses
//! degrade to a blank tile, never an error.

use std::collections::HashSet;

use glam::DVec2;
use thiserror::Error;

use crate::log::debug;
use crate::projection::{Projector, coarse_tile_zoom, geo_to_tile_frac};
use crate::types::TileCoord;
use crate::viewport::Viewport;

/// Extra ring of tiles fetched around the visible rectangle.
const FETCH_MARGIN: i64 = 1;

/// Errors constructing a tile URL template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template is missing one of the `{z}`/`{x}`/`{y}` placeholders.
    #[error("tile URL template is missing the {{{0}}} placeholder")]
    MissingPlaceholder(&'static str),
}

/// URL template for an external slippy-map tile source, e.g.
/// `https://tile.example.org/{z}/{x}/{y}.png`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileUrlTemplate {
    template: String,
}

impl TileUrlTemplate {
    pub fn new(template: impl Into<String>) -> Result<TileUrlTemplate, TemplateError> {
        let template = template.into();
        for key in ["z", "x", "y"] {
            if !template.contains(&format!("{{{key}}}")) {
                return Err(TemplateError::MissingPlaceholder(key));
            }
        }
        Ok(TileUrlTemplate { template })
    }

    /// Substitute a tile address into the template.
    pub fn url_for(&self, tile: TileCoord) -> String {
        self.template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

/// One fetch the host must issue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileRequest {
    pub tile: TileCoord,
    pub url: String,
}

/// One loaded tile the host must paint, at its screen rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePaint {
    pub tile: TileCoord,
    /// Top-left corner in screen pixels.
    pub origin: DVec2,
    /// Width/height in screen pixels.
    pub size: DVec2,
}

/// Result of a viewport change: repaint the background, then fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileRefresh {
    /// A full viewport change always clears before the new tiles arrive;
    /// incremental loads between refreshes paint additively.
    pub clear_background: bool,
    pub requests: Vec<TileRequest>,
}

/// Computes the visible tile grid and tracks which fetches are in flight.
#[derive(Clone, Debug)]
pub struct TileLayer {
    template: TileUrlTemplate,
    in_flight: HashSet<TileCoord>,
}

impl TileLayer {
    pub fn new(template: TileUrlTemplate) -> TileLayer {
        TileLayer {
            template,
            in_flight: HashSet::new(),
        }
    }

    /// Number of fetches issued but not yet resolved.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Recompute the tile grid for the current viewport and return the
    /// fetches to issue. Tiles already in flight are not re-requested;
    /// addresses outside the pyramid are skipped silently.
    pub fn refresh(&mut self, viewport: &Viewport) -> TileRefresh {
        let proj = viewport.projector();
        let z = coarse_tile_zoom(viewport.zoom());

        // Visible rectangle corners, through the screen->geo pipeline and
        // into fractional tile coordinates at the fetch zoom.
        let nw = geo_to_tile_frac(proj.screen_to_geo(DVec2::ZERO), z);
        let se = geo_to_tile_frac(proj.screen_to_geo(viewport.size()), z);

        let x0 = nw.x.min(se.x).floor() as i64 - FETCH_MARGIN;
        let x1 = nw.x.max(se.x).floor() as i64 + FETCH_MARGIN;
        let y0 = nw.y.min(se.y).floor() as i64 - FETCH_MARGIN;
        let y1 = nw.y.max(se.y).floor() as i64 + FETCH_MARGIN;

        let mut requests = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let tile = TileCoord::new(x, y, z);
                if !tile.in_range() {
                    continue;
                }
                if !self.in_flight.insert(tile) {
                    continue;
                }
                requests.push(TileRequest {
                    tile,
                    url: self.template.url_for(tile),
                });
            }
        }
        debug!(
            zoom = z,
            count = requests.len(),
            "tile refresh"
        );
        TileRefresh {
            clear_background: true,
            requests,
        }
    }

    /// An async fetch resolved. Returns the paint placement under the current
    /// projection, or `None` for tiles that were never requested.
    pub fn tile_loaded(&mut self, tile: TileCoord, proj: &Projector) -> Option<TilePaint> {
        if !self.in_flight.remove(&tile) {
            return None;
        }
        let (origin, size) = proj.tile_screen_rect(tile);
        Some(TilePaint { tile, origin, size })
    }

    /// An async fetch failed. The tile renders as blank background; nothing
    /// is retried or reported.
    pub fn tile_failed(&mut self, tile: TileCoord) {
        self.in_flight.remove(&tile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZoomFactor;
    use glam::dvec2;

    fn template() -> TileUrlTemplate {
        TileUrlTemplate::new("https://tile.example.org/{z}/{x}/{y}.png").unwrap()
    }

    /// Viewport centered on the middle of the world at zoom factor 1
    /// (fine tile zoom 11: world is 2048 * 256 px across).
    fn centered_viewport() -> Viewport {
        Viewport::new(dvec2(800.0, 600.0)).with_pan(dvec2(262144.0, 262144.0))
    }

    // ==================== template ====================

    #[test]
    fn template_requires_all_placeholders() {
        assert_eq!(
            TileUrlTemplate::new("https://a/{x}/{y}.png"),
            Err(TemplateError::MissingPlaceholder("z"))
        );
        assert_eq!(
            TileUrlTemplate::new("https://a/{z}/{x}.png"),
            Err(TemplateError::MissingPlaceholder("y"))
        );
        assert!(TileUrlTemplate::new("https://a/{z}/{x}/{y}.png").is_ok());
    }

    #[test]
    fn template_substitutes_address() {
        let url = template().url_for(TileCoord::new(301, 385, 10));
        assert_eq!(url, "https://tile.example.org/10/301/385.png");
    }

    // ==================== grid selection ====================

    #[test]
    fn refresh_covers_visible_rect_plus_margin() {
        let vp = centered_viewport();
        let mut layer = TileLayer::new(template());
        let refresh = layer.refresh(&vp);

        assert!(refresh.clear_background);
        // coarse zoom 9: visible rect spans tiles 255..=256 on both axes,
        // margin widens that to 254..=257
        assert_eq!(refresh.requests.len(), 16);
        let coords: Vec<_> = refresh.requests.iter().map(|r| r.tile).collect();
        assert!(coords.contains(&TileCoord::new(255, 255, 9)));
        assert!(coords.contains(&TileCoord::new(254, 254, 9)));
        assert!(coords.contains(&TileCoord::new(257, 257, 9)));
        assert!(!coords.contains(&TileCoord::new(253, 255, 9)));
    }

    #[test]
    fn refresh_skips_out_of_range_addresses() {
        // north-west corner of the world: negative tile addresses fall away
        let vp = Viewport::new(dvec2(800.0, 600.0)).with_pan(dvec2(0.0, 0.0));
        let mut layer = TileLayer::new(template());
        let refresh = layer.refresh(&vp);

        assert!(!refresh.requests.is_empty());
        assert!(refresh.requests.iter().all(|r| r.tile.in_range()));
        assert_eq!(refresh.requests.len(), 4); // only the 2x2 corner survives
    }

    #[test]
    fn refresh_does_not_rerequest_in_flight_tiles() {
        let vp = centered_viewport();
        let mut layer = TileLayer::new(template());
        let first = layer.refresh(&vp);
        assert!(!first.requests.is_empty());

        let second = layer.refresh(&vp);
        assert!(second.requests.is_empty());
        assert_eq!(layer.in_flight_count(), first.requests.len());
    }

    // ==================== completions ====================

    #[test]
    fn loaded_tile_paints_at_current_projection() {
        let vp = centered_viewport();
        let mut layer = TileLayer::new(template());
        let refresh = layer.refresh(&vp);
        let tile = refresh.requests[0].tile;

        let paint = layer.tile_loaded(tile, &vp.projector()).unwrap();
        assert_eq!(paint.tile, tile);
        assert!(paint.size.x > 0.0 && paint.size.y > 0.0);
        assert_eq!(layer.in_flight_count(), refresh.requests.len() - 1);
    }

    #[test]
    fn stale_arrival_uses_newer_viewport_rect() {
        let mut vp = centered_viewport();
        let mut layer = TileLayer::new(template());
        let refresh = layer.refresh(&vp);
        let tile = refresh.requests[0].tile;
        let rect_before = vp.projector().tile_screen_rect(tile);

        // the viewport pans before the fetch resolves
        vp.pointer_down(dvec2(0.0, 0.0));
        vp.pointer_move(dvec2(-50.0, -30.0));
        vp.pointer_up();

        let paint = layer.tile_loaded(tile, &vp.projector()).unwrap();
        assert_ne!((paint.origin, paint.size), rect_before);
        assert_eq!((paint.origin, paint.size), vp.projector().tile_screen_rect(tile));
    }

    #[test]
    fn unrequested_tile_completion_is_ignored() {
        let vp = centered_viewport();
        let mut layer = TileLayer::new(template());
        assert!(
            layer
                .tile_loaded(TileCoord::new(1, 1, 9), &vp.projector())
                .is_none()
        );
    }

    #[test]
    fn failed_fetch_is_swallowed() {
        let vp = centered_viewport();
        let mut layer = TileLayer::new(template());
        let refresh = layer.refresh(&vp);
        let tile = refresh.requests[0].tile;

        layer.tile_failed(tile);
        assert_eq!(layer.in_flight_count(), refresh.requests.len() - 1);
        // a late duplicate completion for the failed tile is also ignored
        assert!(layer.tile_loaded(tile, &vp.projector()).is_none());
    }
}
