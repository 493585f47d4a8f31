//! Application state management for the avalanche map.
//!
//! This module contains the core `App` struct that owns the map handle,
//! the plotted accident records, the error banner, and the background
//! load coordination.

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::accidents::AccidentDataSource;
use crate::api::ApiClient;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::AppError;
use crate::map::{self, MapView, Marker};
use crate::models::{AccidentRecord, AwsCredentials};
use crate::ui::banner::{self, ErrorBanner};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background load message channel.
/// A load cycle sends two messages (credentials, then accidents), so 32
/// leaves ample headroom even across rapid reloads.
const CHANNEL_BUFFER_SIZE: usize = 32;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Quitting,
}

// ============================================================================
// Background Load Results
// ============================================================================

/// Results sent through an MPSC channel from background load tasks back
/// to the main application.
///
/// Each message carries the generation counter of the load cycle that
/// produced it. A reload bumps the counter instead of cancelling
/// in-flight tasks, so results from a superseded cycle are recognized
/// and dropped on receipt.
enum LoadEvent {
    /// Map bootstrap credentials fetched, or the failure that stopped it
    Credentials {
        generation: u64,
        result: Result<AwsCredentials, AppError>,
    },
    /// Accident records loaded from cache or backend
    Accidents {
        generation: u64,
        result: Result<Vec<AccidentRecord>, AppError>,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    api: ApiClient,
    source: AccidentDataSource,

    // UI state
    pub state: AppState,
    pub map: Option<MapView>,
    pub accidents: Vec<AccidentRecord>,
    pub banner: Option<ErrorBanner>,
    pub status_message: Option<String>,
    pub selection: usize,
    pub popup_open: bool,
    pub cache_expiry: Option<DateTime<Utc>>,

    // Load plumbing
    viewport_width_px: u16,
    generation: u64,
    load_rx: Option<mpsc::Receiver<LoadEvent>>,
    load_tx: mpsc::Sender<LoadEvent>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, viewport_width_px: u16) -> Result<Self> {
        debug!(backend = %config.backend_url, viewport_width_px, "App::new() starting");

        let api = ApiClient::new(config.backend_url.clone())?;
        let store = CacheStore::new(config.cache_dir()?)?;
        let source = AccidentDataSource::new(store);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            api,
            source,

            state: AppState::Normal,
            map: None,
            accidents: Vec::new(),
            banner: None,
            status_message: None,
            selection: 0,
            popup_open: false,
            cache_expiry: None,

            viewport_width_px,
            generation: 0,
            load_rx: Some(rx),
            load_tx: tx,
        })
    }

    // =========================================================================
    // Background Loading
    // =========================================================================

    /// Kick off a load cycle. Credentials are fetched in the background;
    /// the accident load follows once the map reports itself loaded.
    pub fn start_load(&mut self) {
        self.status_message = Some("Loading map...".to_string());

        let api = self.api.clone();
        let tx = self.load_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let result = api.fetch_credentials().await;
            Self::send_event(&tx, LoadEvent::Credentials { generation, result }).await;
        });
    }

    fn start_accidents_load(&mut self) {
        self.status_message = Some("Loading accident data...".to_string());

        let api = self.api.clone();
        let source = self.source.clone();
        let tx = self.load_tx.clone();
        let generation = self.generation;

        tokio::spawn(async move {
            let result = source.load(&api).await;
            Self::send_event(&tx, LoadEvent::Accidents { generation, result }).await;
        });
    }

    /// Helper to send load events, logging any channel errors
    async fn send_event(tx: &mpsc::Sender<LoadEvent>, event: LoadEvent) {
        if tx.send(event).await.is_err() {
            error!("Failed to send load event - channel closed");
        }
    }

    /// Called after each rendered frame. The first frame drawn with a
    /// map present marks it loaded and triggers the accident load, the
    /// same handoff the map's load event performs in a browser.
    pub fn notify_frame_drawn(&mut self) {
        let fired = match self.map.as_mut() {
            Some(map) => map.mark_loaded(),
            None => false,
        };
        if fired {
            self.start_accidents_load();
        }
    }

    /// Check for completed background tasks and process results
    pub fn process_events(&mut self) {
        // Collect all pending results first to avoid borrow conflicts
        let events: Vec<LoadEvent> = match self.load_rx.as_mut() {
            Some(rx) => {
                let mut events = Vec::new();
                while let Ok(event) = rx.try_recv() {
                    events.push(event);
                }
                events
            }
            None => Vec::new(),
        };

        for event in events {
            self.handle_event(event);
        }
    }

    /// Process a single load result from a background task.
    fn handle_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Credentials { generation, result } => {
                if generation != self.generation {
                    debug!(generation, "Dropping credentials result from a superseded load");
                    return;
                }
                match result {
                    Ok(creds) => match map::initialize_map(&creds, self.viewport_width_px) {
                        Ok(view) => self.map = Some(view),
                        Err(e) => self.report_error(&e),
                    },
                    Err(e) => self.report_error(&e),
                }
            }
            LoadEvent::Accidents { generation, result } => {
                if generation != self.generation {
                    debug!(generation, "Dropping accidents result from a superseded load");
                    return;
                }
                match result {
                    Ok(records) => self.plot_accidents(records),
                    Err(e) => self.report_error(&e),
                }
            }
        }
    }

    /// Put the loaded records on the map, one marker per plottable
    /// record, and surface any per-marker failures.
    fn plot_accidents(&mut self, records: Vec<AccidentRecord>) {
        let failures = map::render_accidents(self.map.as_mut(), &records);

        self.accidents = records;
        self.cache_expiry = self.source.cached_expiry();
        self.selection = 0;
        self.popup_open = false;
        self.status_message = None;

        info!(
            records = self.accidents.len(),
            failures = failures.len(),
            "Accident records plotted"
        );
        for failure in &failures {
            self.report_error(failure);
        }
    }

    /// Route a failure into the banner as its user-facing message.
    fn report_error(&mut self, err: &AppError) {
        error!(error = %err, "Surfacing failure to the banner");
        banner::present(&mut self.banner, err.user_message());
        self.status_message = None;
    }

    /// Drop the current load cycle and start over. In-flight tasks from
    /// the old cycle keep running, but their generation no longer
    /// matches and their results are ignored on arrival.
    pub fn reload(&mut self) {
        info!("Reloading map and accident data");
        self.generation += 1;
        self.map = None;
        self.accidents.clear();
        self.banner = None;
        self.selection = 0;
        self.popup_open = false;
        self.start_load();
    }

    // =========================================================================
    // Marker Selection
    // =========================================================================

    /// The marker the selection currently points at, if any.
    pub fn selected_marker(&self) -> Option<&Marker> {
        self.map
            .as_ref()
            .and_then(|map| map.markers().get(self.selection))
    }

    pub fn select_next_marker(&mut self) {
        let count = self.marker_count();
        if count == 0 {
            return;
        }
        self.selection = (self.selection + 1) % count;
        self.focus_selection();
    }

    pub fn select_prev_marker(&mut self) {
        let count = self.marker_count();
        if count == 0 {
            return;
        }
        self.selection = (self.selection + count - 1) % count;
        self.focus_selection();
    }

    pub fn toggle_popup(&mut self) {
        if self.selected_marker().is_some() {
            self.popup_open = !self.popup_open;
        }
    }

    pub fn close_popup(&mut self) {
        self.popup_open = false;
    }

    fn marker_count(&self) -> usize {
        self.map.as_ref().map(|map| map.markers().len()).unwrap_or(0)
    }

    /// Keep the selected marker in view while cycling.
    fn focus_selection(&mut self) {
        let target = self.selected_marker().map(|marker| marker.coordinates());
        if let (Some(map), Some((lng, lat))) = (self.map.as_mut(), target) {
            map.center_on(lng, lat);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
