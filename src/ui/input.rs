//! Keyboard input handling for the TUI.
//!
//! This module translates keyboard events into application state
//! changes: panning and zooming the map, cycling through accident
//! markers, and driving the reload and help actions.

use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            app.state = AppState::Normal;
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quitting;
            return true;
        }
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('r') => app.reload(),

        KeyCode::Tab | KeyCode::Char('n') => app.select_next_marker(),
        KeyCode::BackTab | KeyCode::Char('p') => app.select_prev_marker(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_popup(),
        KeyCode::Esc => app.close_popup(),

        KeyCode::Left => pan(app, -1, 0),
        KeyCode::Right => pan(app, 1, 0),
        KeyCode::Up => pan(app, 0, 1),
        KeyCode::Down => pan(app, 0, -1),

        KeyCode::Char('+') | KeyCode::Char('=') => zoom(app, true),
        KeyCode::Char('-') | KeyCode::Char('_') => zoom(app, false),

        _ => {}
    }

    false
}

fn pan(app: &mut App, dx: i8, dy: i8) {
    if let Some(map) = app.map.as_mut() {
        map.pan(dx, dy);
    }
}

fn zoom(app: &mut App, zoom_in: bool) {
    if let Some(map) = app.map.as_mut() {
        if zoom_in {
            map.zoom_in();
        } else {
            map.zoom_out();
        }
    }
}
