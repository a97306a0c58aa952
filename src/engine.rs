//! Single-threaded event dispatch over the whole canvas.
//!
//! `MapEngine` is the one owned state object: viewport, tile layer, drawing
//! session, and dataset, mutated only from the caller's thread in event
//! order. It performs no I/O and blocks on nothing: every mutating call
//! returns the effects the host must carry out (tile fetches to issue, tiles
//! to paint, a point-details prompt to show).
//!
//! Nothing in the event path is fatal. Bad input rows are filtered,
//! non-numeric point values coerce to zero, tile failures vanish, and a
//! premature finish is a no-op: everything degrades to "nothing happened".

use glam::DVec2;

use crate::analytics::{AnalyticsReport, analyze};
use crate::session::{ClickOutcome, DrawingSession};
use crate::store::{MapStore, PointCandidate};
use crate::tiles::{TileLayer, TilePaint, TileRefresh, TileUrlTemplate};
use crate::types::{LatLng, PointId, PolygonId, TileCoord};
use crate::viewport::Viewport;

pub struct MapEngine {
    viewport: Viewport,
    tiles: TileLayer,
    session: DrawingSession,
    store: MapStore,
}

impl MapEngine {
    pub fn new(template: TileUrlTemplate, screen_size: DVec2) -> MapEngine {
        MapEngine {
            viewport: Viewport::new(screen_size),
            tiles: TileLayer::new(template),
            session: DrawingSession::new(),
            store: MapStore::new(),
        }
    }

    /// Start over a given world-pixel position instead of the pyramid origin.
    pub fn with_pan(mut self, pan: DVec2) -> MapEngine {
        self.viewport = self.viewport.with_pan(pan);
        self
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    /// Pointer position in geographic degrees under the current viewport.
    pub fn screen_to_geo(&self, screen: DVec2) -> LatLng {
        self.viewport.projector().screen_to_geo(screen)
    }

    /// Compute the current tile grid and the fetches to issue. Used for the
    /// initial paint; afterwards the pan/zoom handlers hand back refreshes
    /// as they happen.
    pub fn refresh_tiles(&mut self) -> TileRefresh {
        self.tiles.refresh(&self.viewport)
    }

    // ---------------------------------------------------------------- pan/zoom

    /// Pointer pressed. Starts a pan only while no drawing session is
    /// active; a press mid-drawing belongs to the drawing interaction.
    pub fn pointer_down(&mut self, pos: DVec2) {
        if self.session.is_idle() {
            self.viewport.pointer_down(pos);
        }
    }

    /// Pointer moved. While panning this shifts the map and invalidates the
    /// tile paint, so the host gets a fresh fetch list.
    pub fn pointer_move(&mut self, pos: DVec2) -> Option<TileRefresh> {
        if self.viewport.pointer_move(pos) {
            Some(self.tiles.refresh(&self.viewport))
        } else {
            None
        }
    }

    pub fn pointer_up(&mut self) {
        self.viewport.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.viewport.pointer_leave();
    }

    /// Zoom one step in, anchored at the viewport center. Returns the tile
    /// refresh when the factor actually changed (not saturated at the clamp).
    pub fn zoom_in(&mut self) -> Option<TileRefresh> {
        self.viewport
            .zoom_in()
            .then(|| self.tiles.refresh(&self.viewport))
    }

    /// Zoom one step out; same contract as [`MapEngine::zoom_in`].
    pub fn zoom_out(&mut self) -> Option<TileRefresh> {
        self.viewport
            .zoom_out()
            .then(|| self.tiles.refresh(&self.viewport))
    }

    // ------------------------------------------------------------ tile results

    /// An async tile fetch resolved; place it under the current projection.
    /// Stale completions from an older viewport paint wherever the address
    /// currently lands.
    pub fn tile_loaded(&mut self, tile: TileCoord) -> Option<TilePaint> {
        self.tiles.tile_loaded(tile, &self.viewport.projector())
    }

    /// An async tile fetch failed; the tile stays blank.
    pub fn tile_failed(&mut self, tile: TileCoord) {
        self.tiles.tile_failed(tile);
    }

    // ---------------------------------------------------------------- drawing

    pub fn begin_polygon(&mut self) {
        self.session.begin_polygon();
    }

    pub fn begin_add_point(&mut self) {
        self.session.begin_add_point();
    }

    /// A click on the map canvas. Ignored while the map is being panned;
    /// otherwise projected to geographic degrees and routed to the drawing
    /// session. A [`ClickOutcome::PointPending`] result means the host must
    /// present the point-naming collaborator.
    pub fn map_click(&mut self, screen: DVec2) -> ClickOutcome {
        if self.viewport.is_panning() {
            return ClickOutcome::Ignored;
        }
        let pos = self.screen_to_geo(screen);
        self.session.map_click(pos)
    }

    /// Materialize the in-progress polygon into the dataset. A no-op below
    /// three vertices.
    pub fn finish_polygon(&mut self) -> Option<PolygonId> {
        let vertices = self.session.finish_polygon()?;
        self.store.add_polygon(vertices)
    }

    /// The naming collaborator confirmed the pending point. The entered
    /// number (0 if unparseable) becomes both the raw and the derived value.
    pub fn confirm_point(&mut self, name: &str, raw_value: &str) -> Option<PointId> {
        let (pos, value) = self.session.confirm_point(raw_value)?;
        Some(self.store.add_point(pos, name, value, Some(value)))
    }

    /// The naming collaborator was dismissed; drop the pending coordinate.
    pub fn cancel_point(&mut self) {
        self.session.cancel();
    }

    /// Abandon any in-progress drawing, from either mode.
    pub fn cancel_drawing(&mut self) {
        self.session.cancel();
    }

    // ------------------------------------------------------------ data & report

    /// Bulk-import normalized records from the ingestion collaborator.
    /// Returns how many were retained after sentinel filtering.
    pub fn ingest(&mut self, candidates: impl IntoIterator<Item = PointCandidate>) -> usize {
        self.store.ingest(candidates)
    }

    /// Run the analytics pass for the reporting collaborator.
    pub fn report(&self) -> AnalyticsReport {
        analyze(&self.store)
    }
}
