//! UI Theme - Shared colors and styling constants

use macroquad::prelude::Color;

// =============================================================================
// Base UI Colors
// =============================================================================

/// Viewport clear color
pub const VIEWPORT_BG: Color = Color::new(0.86, 0.87, 0.89, 1.0);

/// Sidebar background
pub const BG_COLOR: Color = Color::new(0.11, 0.11, 0.13, 1.0);

/// Section header / status bar background
pub const HEADER_COLOR: Color = Color::new(0.15, 0.15, 0.18, 1.0);

pub const TEXT_COLOR: Color = Color::new(0.8, 0.8, 0.85, 1.0);

/// Dimmed/secondary text
pub const TEXT_DIM: Color = Color::new(0.4, 0.4, 0.45, 1.0);

/// Accent color (cyan like MuseScore)
pub const ACCENT_COLOR: Color = Color::new(0.0, 0.75, 0.9, 1.0);

pub const ERROR_COLOR: Color = Color::new(0.95, 0.4, 0.35, 1.0);

// =============================================================================
// Widgets
// =============================================================================

pub const BUTTON_BG: Color = Color::new(0.2, 0.2, 0.23, 1.0);
pub const BUTTON_HOVER: Color = Color::new(0.27, 0.27, 0.31, 1.0);
pub const BUTTON_PRESSED: Color = Color::new(0.23, 0.31, 0.39, 1.0);

pub const TRACK_COLOR: Color = Color::new(0.16, 0.16, 0.18, 1.0);

/// Highlighted/selected row
pub const ROW_HIGHLIGHT: Color = Color::new(0.2, 0.25, 0.3, 1.0);

pub const INPUT_BG: Color = Color::new(0.12, 0.12, 0.14, 1.0);

// =============================================================================
// Font Sizes & Metrics
// =============================================================================

pub const FONT_SIZE_HEADER: f32 = 14.0;
pub const FONT_SIZE_CONTENT: f32 = 12.0;
pub const FONT_SIZE_SMALL: f32 = 10.0;

pub const ROW_HEIGHT: f32 = 20.0;
pub const ROW_GAP: f32 = 4.0;
pub const SIDEBAR_WIDTH: f32 = 300.0;
pub const STATUS_BAR_HEIGHT: f32 = 22.0;
