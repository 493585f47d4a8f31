//! The owned map handle.
//!
//! One `MapView` exists per load cycle, owned by the application state.
//! It carries the style descriptor URL and auth options it was created
//! with, the current center and zoom, the controls and markers added to
//! it, and a one-shot loaded flag that fires after the first rendered
//! frame.

use anyhow::Result;
use ratatui::layout::Rect;
use tracing::debug;

use crate::map::auth::MapAuthOptions;
use crate::map::marker::Marker;

/// Zoom limits supported by the style sources
const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 22.0;

/// Visible longitude span at zoom 0. Every zoom step halves it, which
/// puts the default zoom of 4 at 90 degrees, framing the continental US.
const ZOOM_ZERO_LNG_SPAN: f64 = 1440.0;

/// Panning moves the center by this fraction of the visible span
const PAN_DIVISOR: f64 = 8.0;

/// Latitude clamp for panning, past which the projection degenerates
const MAX_PAN_LAT: f64 = 85.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub style_url: String,
    pub center: (f64, f64),
    pub zoom: f64,
    pub auth: MapAuthOptions,
}

/// Controls attached to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapControl {
    Navigation(ControlPosition),
}

// Allow dead code: only the top-left corner is used today
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// The visible lng/lat window, ready for canvas bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
}

#[derive(Debug)]
pub struct MapView {
    style_url: String,
    auth: MapAuthOptions,
    center: (f64, f64),
    zoom: f64,
    controls: Vec<MapControl>,
    markers: Vec<Marker>,
    loaded: bool,
}

impl MapView {
    pub fn new(config: MapConfig) -> Result<Self> {
        let (lng, lat) = config.center;
        if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
            anyhow::bail!("map center out of range: ({}, {})", lng, lat);
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&config.zoom) {
            anyhow::bail!("map zoom out of range: {}", config.zoom);
        }

        Ok(Self {
            style_url: config.style_url,
            auth: config.auth,
            center: config.center,
            zoom: config.zoom,
            controls: Vec::new(),
            markers: Vec::new(),
            loaded: false,
        })
    }

    pub fn style_url(&self) -> &str {
        &self.style_url
    }

    pub fn auth(&self) -> &MapAuthOptions {
        &self.auth
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn center(&self) -> (f64, f64) {
        self.center
    }

    pub fn add_control(&mut self, control: MapControl) {
        self.controls.push(control);
    }

    pub fn controls(&self) -> &[MapControl] {
        &self.controls
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// First call after construction returns true; the application
    /// reacts to that single firing by starting the accident load.
    pub fn mark_loaded(&mut self) -> bool {
        if self.loaded {
            return false;
        }
        self.loaded = true;
        debug!("Map finished loading");
        true
    }

    fn lng_span(&self) -> f64 {
        (ZOOM_ZERO_LNG_SPAN / 2f64.powf(self.zoom)).min(360.0)
    }

    /// The lng/lat window visible in a panel of the given cell size.
    /// Braille cells hold 2x4 dots, so the latitude span follows the
    /// dot aspect rather than the cell aspect.
    pub fn bounds(&self, width: u16, height: u16) -> ViewBounds {
        let lng_span = self.lng_span();
        let dots_wide = f64::from(width.max(1)) * 2.0;
        let dots_high = f64::from(height.max(1)) * 4.0;
        let lat_span = (lng_span * dots_high / dots_wide).min(180.0);

        let (lng, lat) = self.center;
        ViewBounds {
            x: clamped_axis(lng, lng_span, 180.0),
            y: clamped_axis(lat, lat_span, 90.0),
        }
    }

    /// Move the center by one pan step per axis. `dx` is +1 for east,
    /// `dy` +1 for north.
    pub fn pan(&mut self, dx: i8, dy: i8) {
        let step = self.lng_span() / PAN_DIVISOR;
        let (lng, lat) = self.center;
        self.center = (
            (lng + f64::from(dx) * step).clamp(-180.0, 180.0),
            (lat + f64::from(dy) * step / 2.0).clamp(-MAX_PAN_LAT, MAX_PAN_LAT),
        );
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1.0).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 1.0).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Bring a coordinate into view by recentering on it.
    pub fn center_on(&mut self, lng: f64, lat: f64) {
        self.center = (
            lng.clamp(-180.0, 180.0),
            lat.clamp(-MAX_PAN_LAT, MAX_PAN_LAT),
        );
    }
}

/// A window of `span` centered on `center`, shifted and trimmed to stay
/// inside `[-limit, limit]`.
fn clamped_axis(center: f64, span: f64, limit: f64) -> [f64; 2] {
    let span = span.min(2.0 * limit);
    let mut lo = center - span / 2.0;
    if lo < -limit {
        lo = -limit;
    }
    if lo + span > limit {
        lo = limit - span;
    }
    [lo, lo + span]
}

/// Map a coordinate to a cell within `area`, or None when it falls
/// outside the visible bounds.
pub fn project(lng: f64, lat: f64, bounds: &ViewBounds, area: Rect) -> Option<(u16, u16)> {
    let [x0, x1] = bounds.x;
    let [y0, y1] = bounds.y;
    if area.width == 0 || area.height == 0 || x1 <= x0 || y1 <= y0 {
        return None;
    }
    if !(x0..=x1).contains(&lng) || !(y0..=y1).contains(&lat) {
        return None;
    }

    let fx = (lng - x0) / (x1 - x0);
    let fy = (y1 - lat) / (y1 - y0);
    let col = area.x + (fx * f64::from(area.width - 1)).round() as u16;
    let row = area.y + (fy * f64::from(area.height - 1)).round() as u16;
    Some((col, row))
}

// ============================================================================
// Tests
// ============================================================================
