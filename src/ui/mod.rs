//! Immediate-mode UI library for the configurator panels
//!
//! Design principles:
//! - Immediate mode (no retained state, rebuilt each frame)
//! - Simple rectangle-based layout
//! - Macroquad integration for rendering

mod input;
mod rect;
mod text_input;
mod theme;
mod widgets;

pub use input::*;
pub use rect::*;
pub use text_input::*;
pub use theme::*;
pub use widgets::*;
