//! Shared colors and sizes

use macroquad::prelude::Color;

pub const BG_COLOR: Color = Color::new(0.07, 0.08, 0.10, 1.0);
pub const PANEL_COLOR: Color = Color::new(0.11, 0.11, 0.13, 0.94);
pub const HEADER_COLOR: Color = Color::new(0.15, 0.15, 0.18, 1.0);
pub const BORDER_COLOR: Color = Color::new(0.31, 0.31, 0.31, 1.0);

pub const TEXT_COLOR: Color = Color::new(0.8, 0.8, 0.85, 1.0);
pub const TEXT_DIM: Color = Color::new(0.45, 0.45, 0.5, 1.0);

/// Accent for active buttons and slider fill
pub const ACCENT_COLOR: Color = Color::new(0.0, 0.75, 0.9, 1.0);
pub const BUTTON_HOVER: Color = Color::new(0.2, 0.2, 0.24, 1.0);
pub const BUTTON_PRESSED: Color = Color::new(0.24, 0.24, 0.28, 1.0);

pub const ROW_SELECTED: Color = Color::new(0.2, 0.25, 0.3, 1.0);

pub const LOG_INFO: Color = Color::new(0.75, 0.78, 0.8, 1.0);
pub const LOG_WARN: Color = Color::new(0.95, 0.8, 0.35, 1.0);
pub const LOG_ERROR: Color = Color::new(0.95, 0.4, 0.4, 1.0);

pub const FONT_SIZE_HEADER: f32 = 16.0;
pub const FONT_SIZE_CONTENT: f32 = 14.0;
pub const ROW_HEIGHT: f32 = 20.0;
pub const HEADER_HEIGHT: f32 = 22.0;
