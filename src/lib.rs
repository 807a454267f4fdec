//! Anchored label overlays for slippy map views.
//!
//! A [`Label`] tracks a geographic anchor on a [`HostView`], sits to the left
//! or right of it, follows pan, zoom and drag, and republishes pointer events
//! on its own channel. [`MapView`] and [`Scene`] provide an in-memory host.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod label;
pub mod render;
pub mod scenario;
pub mod scene;
pub mod text_metrics;
pub mod view;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, Direction, Environment, LabelOptions, load_config, parse_config};
pub use error::{ConfigError, ScenarioError};
pub use geo::{LatLng, Point};
pub use label::{
    EventEmitter, Label, LabelEvent, LabelSource, ListenerId, Placement, Side, compute_position,
};
pub use scene::Scene;
pub use view::{
    HostView, MapView, OverlayId, PointerEvent, PointerEventKind, RetainedNode, ViewEvent,
    ViewEventKind, ViewNode,
};
