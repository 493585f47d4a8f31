//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, the map canvas, and overlays
//! - `input`: Keyboard event handling
//! - `banner`: The single error banner
//! - `styles`: Color schemes and text styling

pub mod banner;
pub mod input;
pub mod render;
pub mod styles;
