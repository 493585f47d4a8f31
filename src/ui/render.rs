use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map as WorldMap, MapResolution, Points},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};

use crate::app::{App, AppState};
use crate::map::view;
use crate::map::{ControlPosition, MapControl, MapView, Marker, ViewBounds};
use crate::utils::truncate;

use super::banner;
use super::styles;

/// Widest text column a popup will show before truncation
const POPUP_MAX_WIDTH: u16 = 44;

/// Terminal rows standing in for the pixel offset the web map applies
/// between a marker and its popup
const PX_PER_ROW: u16 = 16;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Map panel
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_map_panel(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    // The banner paints last so no widget can draw over a failure notice.
    if let Some(ref notice) = app.banner {
        let area = frame.area();
        banner::render_banner(frame, notice, area);
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  Avalanche Accident Map";
    let help_hint = "[?] Help";
    let title_len = title.len();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_map_panel(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.map.as_ref() {
        Some(map) => format!(" United States [zoom {:.0}] ", map.zoom()),
        None => " United States ".to_string(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(Span::styled(title, styles::title_style()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let Some(map) = app.map.as_ref() else {
        render_map_placeholder(frame, app, inner);
        return;
    };

    let bounds = map.bounds(inner.width, inner.height);
    let points: Vec<(f64, f64)> = map.markers().iter().map(|m| m.coordinates()).collect();
    let selected = app.selected_marker().map(|m| m.coordinates());

    let canvas = Canvas::default()
        .marker(symbols::Marker::Braille)
        .x_bounds(bounds.x)
        .y_bounds(bounds.y)
        .paint(|ctx| {
            ctx.draw(&WorldMap {
                color: styles::TERRAIN,
                resolution: MapResolution::High,
            });
            ctx.draw(&Points {
                coords: &points,
                color: styles::MARKER,
            });
            if let Some((lng, lat)) = selected {
                ctx.print(lng, lat, Span::styled("◆", styles::selected_marker_style()));
            }
        });
    frame.render_widget(canvas, inner);

    render_nav_control(frame, map, inner);

    if app.popup_open {
        if let Some(marker) = app.selected_marker() {
            render_popup(frame, marker, &bounds, inner);
        }
    }
}

fn render_map_placeholder(frame: &mut Frame, app: &App, inner: Rect) {
    let message = if app.banner.is_some() {
        "Map unavailable."
    } else {
        "Initializing map..."
    };

    let message_area = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
    let paragraph = Paragraph::new(Line::from(Span::styled(message, styles::muted_style())))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, message_area);
}

/// Zoom control pinned to the corner the map placed it in.
fn render_nav_control(frame: &mut Frame, map: &MapView, inner: Rect) {
    const NAV_WIDTH: u16 = 3;
    const NAV_HEIGHT: u16 = 4;

    if inner.width < NAV_WIDTH + 2 || inner.height < NAV_HEIGHT + 2 {
        return;
    }

    for control in map.controls() {
        let MapControl::Navigation(position) = control;
        let area = corner_rect(*position, inner, NAV_WIDTH, NAV_HEIGHT);

        let lines = vec![
            Line::from(Span::styled("+", styles::help_key_style())),
            Line::from(Span::styled("-", styles::help_key_style())),
        ];

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(styles::muted_style()),
            ),
            area,
        );
    }
}

fn render_popup(frame: &mut Frame, marker: &Marker, bounds: &ViewBounds, inner: Rect) {
    let Some(popup) = marker.popup() else {
        return;
    };
    let (lng, lat) = marker.coordinates();
    let Some((col, row)) = view::project(lng, lat, bounds, inner) else {
        return;
    };

    let text_width = usize::from(POPUP_MAX_WIDTH.min(inner.width.saturating_sub(2)).max(1));
    let mut lines = vec![Line::from(Span::styled(
        truncate(&popup.heading, text_width),
        styles::popup_heading_style(),
    ))];
    for text in &popup.lines {
        if !text.is_empty() {
            lines.push(Line::from(truncate(text, text_width)));
        }
    }

    let content_width = lines.iter().map(Line::width).max().unwrap_or(1) as u16;
    let width = (content_width + 2).min(inner.width);
    let height = (lines.len() as u16 + 2).min(inner.height);
    let area = popup_rect(col, row, popup.offset, width, height, inner);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        ),
        area,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r]eload | [?] help | [q]uit";

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if app.accidents.is_empty() {
        " No accident records ".to_string()
    } else {
        match app.cache_expiry {
            Some(expiry) => format!(
                " {} accidents | data refreshes {} ",
                app.accidents.len(),
                expiry.format("%b %d")
            ),
            None => format!(" {} accidents ", app.accidents.len()),
        }
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 19, frame.area());

    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled(
            "           Avalanche Accident Map",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("                version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Map", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  Arrows    ", styles::help_key_style()),
            Span::styled("Pan the map", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  +/-       ", styles::help_key_style()),
            Span::styled("Zoom in / out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Tab, n    ", styles::help_key_style()),
            Span::styled("Next accident", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Shift+Tab ", styles::help_key_style()),
            Span::styled("Previous accident (also p)", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", styles::help_key_style()),
            Span::styled("Open / close accident details", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Esc       ", styles::help_key_style()),
            Span::styled("Close details", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  r         ", styles::help_key_style()),
            Span::styled("Reload map and data", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ?         ", styles::help_key_style()),
            Span::styled("Toggle this help", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

/// Anchor a `width` x `height` box in the given corner of `r`.
fn corner_rect(position: ControlPosition, r: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    let x = match position {
        ControlPosition::TopLeft | ControlPosition::BottomLeft => r.x,
        ControlPosition::TopRight | ControlPosition::BottomRight => r.x + r.width - width,
    };
    let y = match position {
        ControlPosition::TopLeft | ControlPosition::TopRight => r.y,
        ControlPosition::BottomLeft | ControlPosition::BottomRight => r.y + r.height - height,
    };
    Rect::new(x, y, width, height)
}

/// Place the popup box above its marker, offset the way the web map
/// offsets popups in pixels, and keep it inside the panel.
fn popup_rect(col: u16, row: u16, offset_px: u16, width: u16, height: u16, inner: Rect) -> Rect {
    let offset_rows = offset_px.div_ceil(PX_PER_ROW);
    let x = col
        .saturating_sub(width / 2)
        .min(inner.right().saturating_sub(width))
        .max(inner.x);
    let y = row
        .saturating_sub(offset_rows)
        .saturating_sub(height)
        .max(inner.y);
    Rect::new(x, y, width, height)
}

fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

// ============================================================================
// Tests
// ============================================================================
