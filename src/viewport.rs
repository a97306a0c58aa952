//! Pan/zoom state for the visible map window.
//!
//! Two-state pointer machine: `Idle` until a pointer goes down, `Panning`
//! while it is held. Every pan or zoom mutation bumps a generation counter;
//! the engine uses a generation change as the signal to repaint the basemap
//! and issue fresh tile fetches.

use glam::DVec2;

use crate::log::trace;
use crate::projection::Projector;
use crate::types::ZoomFactor;

/// Pointer-drag state. Panning remembers the last pointer position so each
/// move event applies only its own delta.
#[derive(Clone, Copy, Debug, PartialEq)]
enum PanState {
    Idle,
    Panning { last: DVec2 },
}

/// Owns the pan offset and zoom factor, and turns pointer/scroll gestures
/// into projection parameters.
#[derive(Clone, Debug)]
pub struct Viewport {
    /// Pan offset in world pixels (unscaled by the zoom factor).
    pan: DVec2,
    zoom: ZoomFactor,
    /// Screen size in pixels.
    size: DVec2,
    pan_state: PanState,
    /// Bumped on every pan/zoom change; identifies a tile-paint configuration.
    generation: u64,
}

impl Viewport {
    pub fn new(size: DVec2) -> Viewport {
        Viewport {
            pan: DVec2::ZERO,
            zoom: ZoomFactor::default(),
            size,
            pan_state: PanState::Idle,
            generation: 0,
        }
    }

    /// Place the viewport center over a world-pixel position.
    pub fn with_pan(mut self, pan: DVec2) -> Viewport {
        self.pan = pan;
        self
    }

    pub fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    pub fn pan(&self) -> DVec2 {
        self.pan
    }

    pub fn size(&self) -> DVec2 {
        self.size
    }

    /// Current tile-paint generation. Changes whenever pan or zoom does.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.pan_state, PanState::Panning { .. })
    }

    /// Snapshot the current projection parameters.
    pub fn projector(&self) -> Projector {
        Projector::new(self.pan, self.zoom, self.size)
    }

    /// Pointer pressed: start panning. Returns true if the state changed.
    pub fn pointer_down(&mut self, pos: DVec2) -> bool {
        match self.pan_state {
            PanState::Idle => {
                self.pan_state = PanState::Panning { last: pos };
                true
            }
            PanState::Panning { .. } => false,
        }
    }

    /// Pointer moved: while panning, shift the pan offset against the drag.
    /// The delta is divided by the zoom factor so perceived pan speed is
    /// constant across zoom levels. Returns true if the viewport changed.
    pub fn pointer_move(&mut self, pos: DVec2) -> bool {
        match self.pan_state {
            PanState::Panning { last } => {
                let delta = pos - last;
                self.pan -= delta / self.zoom.raw();
                self.pan_state = PanState::Panning { last: pos };
                self.touch();
                true
            }
            PanState::Idle => false,
        }
    }

    /// Pointer released: stop panning.
    pub fn pointer_up(&mut self) {
        self.pan_state = PanState::Idle;
    }

    /// Pointer left the canvas: treated like a release.
    pub fn pointer_leave(&mut self) {
        self.pan_state = PanState::Idle;
    }

    /// Zoom one step in, anchored at the viewport center.
    /// Returns true if the zoom factor actually changed (false at the clamp).
    pub fn zoom_in(&mut self) -> bool {
        self.apply_zoom(self.zoom.zoomed_in())
    }

    /// Zoom one step out, anchored at the viewport center.
    pub fn zoom_out(&mut self) -> bool {
        self.apply_zoom(self.zoom.zoomed_out())
    }

    fn apply_zoom(&mut self, next: ZoomFactor) -> bool {
        if next == self.zoom {
            return false;
        }
        self.zoom = next;
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.generation += 1;
        trace!(generation = self.generation, "viewport changed");
    }
}
