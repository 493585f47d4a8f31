//! Avalanche Accident Map - a terminal map of US avalanche accidents.
//!
//! This application fetches map credentials and accident reports from the
//! avalanche backend, caches the reports on disk, and plots them as
//! markers on a keyboard-driven map of the United States.

mod accidents;
mod api;
mod app;
mod cache;
mod config;
mod error;
mod map;
mod models;
mod ui;
mod utils;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use config::Config;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Assumed pixel width of one terminal cell when the backend reports
/// no pixel size
const FALLBACK_CELL_WIDTH_PX: u16 = 8;

/// Viewport width assumed when the terminal reports nothing at all
const FALLBACK_VIEWPORT_WIDTH_PX: u16 = 1024;

/// Initialize the tracing subscriber for logging.
///
/// The screen belongs to the map, so log lines go to a file in the
/// cache directory rather than stderr. Use the RUST_LOG env var to
/// control the log level (e.g. RUST_LOG=debug).
fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let cache_dir = config.cache_dir().ok()?;
    let file = tracing_appender::rolling::never(cache_dir, "avymap.log");
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

/// Estimate the viewport width in pixels, which picks the initial zoom.
/// Terminals that report a pixel size are believed; otherwise the column
/// count is scaled by a nominal cell width.
fn viewport_width_px() -> u16 {
    if let Ok(size) = terminal::window_size() {
        if size.width > 0 {
            return size.width;
        }
    }
    match terminal::size() {
        Ok((cols, _)) if cols > 0 => cols.saturating_mul(FALLBACK_CELL_WIDTH_PX),
        _ => FALLBACK_VIEWPORT_WIDTH_PX,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load();
    let _log_guard = init_tracing(&config);
    info!(backend = %config.backend_url, "Avalanche map starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and kick off the credential fetch
    let mut app = App::new(config, viewport_width_px())?;
    app.start_load();

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Avalanche map shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // The first frame drawn with a map present finishes map setup
        // and hands off to the accident load
        app.notify_frame_drawn();

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Check for completed background loads
        app.process_events();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
