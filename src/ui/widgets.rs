//! Basic UI widgets

use macroquad::prelude::*;

use super::theme::*;
use super::{Rect, UiContext};

/// Left-to-right toolbar layout helper
pub struct Toolbar {
    rect: Rect,
    cursor_x: f32,
    spacing: f32,
}

impl Toolbar {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            cursor_x: rect.x + 6.0,
            spacing: 4.0,
        }
    }

    pub fn separator(&mut self) {
        self.cursor_x += self.spacing * 2.0;
        draw_line(
            self.cursor_x,
            self.rect.y + 4.0,
            self.cursor_x,
            self.rect.bottom() - 4.0,
            1.0,
            BORDER_COLOR,
        );
        self.cursor_x += self.spacing * 2.0;
    }

    pub fn label(&mut self, text: &str, color: Color) {
        let dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
        let text_y = (self.rect.y + (self.rect.h + dims.height) * 0.5).round();
        draw_text(text, self.cursor_x.round(), text_y, FONT_SIZE_CONTENT, color);
        self.cursor_x += dims.width + self.spacing;
    }

    /// Text button sized to its label
    pub fn button(&mut self, ctx: &mut UiContext, text: &str, active: bool, tooltip: &str) -> bool {
        let dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
        let rect = Rect::new(
            self.cursor_x.round(),
            (self.rect.y + 3.0).round(),
            (dims.width + 14.0).round(),
            (self.rect.h - 6.0).round(),
        );
        self.cursor_x += rect.w + self.spacing;
        let clicked = text_button(ctx, rect, text, active);
        if !tooltip.is_empty() && ctx.mouse.inside(&rect) {
            ctx.set_tooltip(tooltip, ctx.mouse.x, ctx.mouse.y);
        }
        clicked
    }
}

/// Filled rect with a 1px border
pub fn draw_frame(rect: Rect, fill: Color) {
    draw_rectangle(rect.x, rect.y, rect.w, rect.h, fill);
    draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 1.0, BORDER_COLOR);
}

/// Panel with a title strip; returns the content rect
pub fn draw_titled_panel(rect: Rect, title: &str) -> Rect {
    draw_frame(rect, PANEL_COLOR);
    let header = rect.slice_top(HEADER_HEIGHT);
    draw_rectangle(header.x, header.y, header.w, header.h, HEADER_COLOR);
    draw_text(title, header.x + 6.0, header.y + 15.0, FONT_SIZE_HEADER, WHITE);
    rect.remaining_after_top(HEADER_HEIGHT).pad(4.0)
}

/// Text clipped with an ellipsis to fit `max_width`
pub fn fit_text(text: &str, max_width: f32, font_size: f32) -> String {
    if measure_text(text, None, font_size as u16, 1.0).width <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if measure_text(&format!("{}...", out), None, font_size as u16, 1.0).width > max_width {
            out.pop();
            break;
        }
    }
    out.push_str("...");
    out
}

pub fn draw_label(rect: Rect, text: &str, color: Color) {
    let text = fit_text(text, rect.w, FONT_SIZE_CONTENT);
    draw_text(&text, rect.x.round(), (rect.y + rect.h * 0.5 + 5.0).round(), FONT_SIZE_CONTENT, color);
}

/// Flat text button, returns true if clicked
pub fn text_button(ctx: &mut UiContext, rect: Rect, text: &str, active: bool) -> bool {
    let id = ctx.next_id();
    let hovered = ctx.mouse.inside(&rect);
    if hovered {
        ctx.set_hot(id);
    }

    let bg = if active {
        ACCENT_COLOR
    } else if ctx.mouse.clicking(&rect) {
        BUTTON_PRESSED
    } else if hovered {
        BUTTON_HOVER
    } else {
        HEADER_COLOR
    };
    draw_frame(rect, bg);

    let dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
    let color = if active { BLACK } else { TEXT_COLOR };
    draw_text(
        text,
        (rect.x + (rect.w - dims.width) * 0.5).round(),
        (rect.y + (rect.h + dims.height) * 0.5).round(),
        FONT_SIZE_CONTENT,
        color,
    );
    ctx.mouse.clicked(&rect)
}

/// Fraction of `rect`'s width at `x`, in [0, 1]
pub fn slider_fraction(rect: &Rect, x: f32) -> f32 {
    if rect.w <= 0.0 {
        return 0.0;
    }
    ((x - rect.x) / rect.w).clamp(0.0, 1.0)
}

/// Horizontal slider. Returns the raw (unclamped, unrounded) value under the
/// mouse while it is being dragged.
pub fn slider(ctx: &mut UiContext, rect: Rect, value: f32, min: f32, max: f32, text: &str) -> Option<f32> {
    let id = ctx.next_id();
    let hovered = ctx.mouse.inside(&rect);
    if hovered {
        ctx.set_hot(id);
        if ctx.mouse.left_pressed {
            ctx.start_drag(id);
        }
    }

    let t = if max > min { ((value - min) / (max - min)).clamp(0.0, 1.0) } else { 0.0 };
    draw_frame(rect, HEADER_COLOR);
    draw_rectangle(rect.x + 1.0, rect.y + 1.0, (rect.w - 2.0) * t, rect.h - 2.0, Color::new(0.0, 0.45, 0.55, 1.0));
    let dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
    draw_text(
        text,
        (rect.x + (rect.w - dims.width) * 0.5).round(),
        (rect.y + (rect.h + dims.height) * 0.5).round(),
        FONT_SIZE_CONTENT,
        TEXT_COLOR,
    );

    if ctx.is_dragging(id) {
        Some(min + slider_fraction(&rect, ctx.mouse.x) * (max - min))
    } else {
        None
    }
}

/// `[-] value [+]`. Returns the new raw value when a side button is clicked.
pub fn stepper(ctx: &mut UiContext, rect: Rect, value: f32, step: f32, text: &str) -> Option<f32> {
    let button_w = rect.h;
    let minus = Rect::new(rect.x, rect.y, button_w, rect.h);
    let plus = Rect::new(rect.right() - button_w, rect.y, button_w, rect.h);
    let middle = Rect::new(minus.right(), rect.y, (rect.w - button_w * 2.0).max(0.0), rect.h);

    let mut result = None;
    if text_button(ctx, minus, "-", false) {
        result = Some(value - step);
    }
    draw_frame(middle, BG_COLOR);
    let dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
    draw_text(
        text,
        (middle.x + (middle.w - dims.width) * 0.5).round(),
        (middle.y + (middle.h + dims.height) * 0.5).round(),
        FONT_SIZE_CONTENT,
        TEXT_COLOR,
    );
    if text_button(ctx, plus, "+", false) {
        result = Some(value + step);
    }
    result
}

pub fn draw_tooltip(ctx: &UiContext) {
    if let Some((text, x, y)) = ctx.tooltip() {
        let dims = measure_text(text, None, FONT_SIZE_CONTENT as u16, 1.0);
        let rect = Rect::new(x + 12.0, y + 14.0, dims.width + 10.0, 20.0);
        draw_frame(rect, Color::new(0.05, 0.05, 0.06, 0.95));
        draw_text(text, rect.x + 5.0, rect.y + 14.0, FONT_SIZE_CONTENT, TEXT_COLOR);
    }
}
