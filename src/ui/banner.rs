//! The single error banner.
//!
//! No banner exists until the first failure. `present` creates it on
//! demand and every later failure replaces the message in the same
//! slot, so the screen never stacks notices.

use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

use super::styles;

/// Rows the banner band occupies at the top of the frame
const BANNER_HEIGHT: u16 = 1;

/// A failure notice pinned to the top of the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    message: String,
}

impl ErrorBanner {
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Show `message` in the banner slot, creating the banner on the first
/// failure and reusing it afterwards.
pub fn present(slot: &mut Option<ErrorBanner>, message: &str) {
    match slot {
        Some(banner) => banner.message = message.to_string(),
        None => {
            *slot = Some(ErrorBanner {
                message: message.to_string(),
            });
        }
    }
}

/// Draw the banner as a full-width band across the top of `area`.
pub fn render_banner(frame: &mut Frame, banner: &ErrorBanner, area: Rect) {
    if area.height == 0 || area.width == 0 {
        return;
    }

    let band = Rect {
        height: BANNER_HEIGHT.min(area.height),
        ..area
    };

    frame.render_widget(Clear, band);
    let line = Line::from(format!(" {}", banner.message()));
    frame.render_widget(Paragraph::new(line).style(styles::banner_style()), band);
}

// ============================================================================
// Tests
// ============================================================================
