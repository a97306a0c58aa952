//! geocanvas: an interactive geospatial canvas engine.
//!
//! The crate covers the algorithmic core of a satellite-basemap tool: the
//! coordinate math between geographic degrees, slippy-map tiles, and screen
//! pixels under continuous pan/zoom; the interaction state machines for
//! panning, freehand polygon drawing, and point placement; and the spatial
//! analytics (point-in-polygon classification and aggregate statistics) a
//! results view consumes.
//!
//! It is deliberately host-agnostic and I/O-free. [`MapEngine`] serializes
//! events on the caller's thread and answers with the effects to perform:
//! tile URLs to fetch, screen rectangles to paint, prompts to show. File
//! import, dialogs, and chart rendering live in the host.
//!
//! ```
//! use geocanvas::{MapEngine, TileUrlTemplate, PointCandidate};
//! use glam::dvec2;
//!
//! let template = TileUrlTemplate::new("https://tile.example.org/{z}/{x}/{y}.png")?;
//! let mut engine = MapEngine::new(template, dvec2(800.0, 600.0));
//!
//! // fetch and paint the initial basemap
//! for request in engine.refresh_tiles().requests {
//!     // hand request.url to the host's image loader...
//! }
//!
//! engine.ingest([PointCandidate {
//!     latitude: 40.7,
//!     longitude: -74.0,
//!     name: "NYC".into(),
//!     value: 87.0,
//! }]);
//! let report = engine.report();
//! assert_eq!(report.global.unwrap().count, 1);
//! # Ok::<(), geocanvas::TemplateError>(())
//! ```

pub mod analytics;
pub mod engine;
pub mod log;
pub mod projection;
pub mod session;
pub mod store;
pub mod tiles;
pub mod types;
pub mod viewport;

pub use analytics::{
    AnalyticsReport, GlobalStats, PolygonSummary, ValueBuckets, analyze, point_in_polygon,
};
pub use engine::MapEngine;
pub use projection::Projector;
pub use session::{ClickOutcome, DrawingSession, MIN_POLYGON_VERTICES};
pub use store::{GeoPoint, GeoPolygon, MapStore, PointCandidate};
pub use tiles::{TemplateError, TilePaint, TileRefresh, TileRequest, TileUrlTemplate};
pub use types::{LatLng, NumericError, PointId, PolygonId, TILE_SIZE, TileCoord, ZoomFactor};
pub use viewport::Viewport;
