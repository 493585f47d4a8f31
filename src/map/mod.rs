//! Map construction and the owned map handle.
//!
//! `controller` turns fetched credentials into a configured [`MapView`];
//! `view` is the handle itself (center, zoom, controls, markers, the
//! one-shot loaded flag); `marker` plots accident records onto it.

pub mod auth;
pub mod controller;
pub mod marker;
pub mod view;

pub use controller::initialize_map;
pub use marker::{render_accidents, Marker, Popup};
pub use view::{ControlPosition, MapControl, MapView, ViewBounds};
