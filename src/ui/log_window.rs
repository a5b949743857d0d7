//! Floating log window
//!
//! Shows the log store's latest snapshot with a category filter. The window
//! can be dragged by its title bar and resized from the bottom-right corner;
//! its layout is persisted as JSON under [`LAYOUT_KEY`] whenever a drag or
//! resize ends or the window is toggled.

use std::sync::{Arc, Mutex};

use macroquad::prelude::*;
use serde::{Deserialize, Serialize};

use crate::log_store::{self, LogLevel, SharedLogStore, Snapshot, Unsubscribe};
use crate::storage::PrefsBackend;
use super::theme::*;
use super::widgets::{draw_frame, draw_label, fit_text, text_button};
use super::{Rect, UiContext};

pub const LAYOUT_KEY: &str = "simview.log-window";

pub const MIN_WIDTH: f32 = 240.0;
pub const MIN_HEIGHT: f32 = 120.0;
const RESIZE_HANDLE: f32 = 12.0;
/// Part of the title bar that must stay on screen
const KEEP_VISIBLE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogWindowLayout {
    pub open: bool,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for LogWindowLayout {
    fn default() -> Self {
        Self {
            open: false,
            left: 24.0,
            top: 64.0,
            width: 560.0,
            height: 260.0,
        }
    }
}

fn number_field(object: &serde_json::Map<String, serde_json::Value>, name: &str, min: f32) -> Option<f32> {
    let value = object.get(name)?.as_f64()? as f32;
    (value.is_finite() && value >= min).then_some(value)
}

impl LogWindowLayout {
    /// Parse persisted JSON. Missing or invalid fields take the value from
    /// `defaults`; input that isn't a JSON object is discarded entirely.
    pub fn from_json(json: &str, defaults: &LogWindowLayout) -> LogWindowLayout {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("discarding malformed log window layout: {}", e);
                return *defaults;
            }
        };
        let Some(object) = value.as_object() else {
            log::warn!("discarding log window layout: expected an object");
            return *defaults;
        };

        LogWindowLayout {
            open: object.get("open").and_then(|v| v.as_bool()).unwrap_or(defaults.open),
            left: number_field(object, "left", f32::MIN).unwrap_or(defaults.left),
            top: number_field(object, "top", f32::MIN).unwrap_or(defaults.top),
            width: number_field(object, "width", MIN_WIDTH).unwrap_or(defaults.width),
            height: number_field(object, "height", MIN_HEIGHT).unwrap_or(defaults.height),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn load(prefs: &dyn PrefsBackend, defaults: &LogWindowLayout) -> LogWindowLayout {
        match prefs.get(LAYOUT_KEY) {
            Ok(Some(json)) => Self::from_json(&json, defaults),
            Ok(None) => *defaults,
            Err(e) => {
                log::warn!("could not read log window layout: {}", e);
                *defaults
            }
        }
    }

    pub fn save(&self, prefs: &mut dyn PrefsBackend) {
        let result = self
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| prefs.set(LAYOUT_KEY, &json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            log_store::report_rejection("saving log window layout", &e);
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }

    /// Keep the title bar reachable on a screen of the given size
    pub fn clamped_to(&self, screen_w: f32, screen_h: f32) -> LogWindowLayout {
        let width = self.width.max(MIN_WIDTH);
        let height = self.height.max(MIN_HEIGHT);
        LogWindowLayout {
            open: self.open,
            left: self.left.clamp(KEEP_VISIBLE - width, (screen_w - KEEP_VISIBLE).max(0.0)),
            top: self.top.clamp(0.0, (screen_h - HEADER_HEIGHT).max(0.0)),
            width,
            height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Move { grab_dx: f32, grab_dy: f32 },
    Resize { grab_dx: f32, grab_dy: f32 },
}

/// What the window did this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowResponse {
    /// Layout settled (drag/resize ended, or toggled) and should be saved
    pub layout_changed: bool,
}

pub struct LogWindow {
    pub layout: LogWindowLayout,
    inbox: Arc<Mutex<Option<Snapshot>>>,
    snapshot: Snapshot,
    subscription: Option<Unsubscribe>,
    filter: Option<String>,
    gesture: Option<Gesture>,
    /// Rows scrolled up from the newest record
    scroll_back: usize,
}

impl LogWindow {
    pub fn new(layout: LogWindowLayout) -> Self {
        Self {
            layout,
            inbox: Arc::default(),
            snapshot: Arc::from(Vec::new()),
            subscription: None,
            filter: None,
            gesture: None,
            scroll_back: 0,
        }
    }

    /// Start receiving snapshots from `store`
    pub fn attach(&mut self, store: &SharedLogStore) {
        self.detach();
        let inbox = self.inbox.clone();
        let handle = log_store::subscribe(
            store,
            Box::new(move |snapshot| {
                if let Ok(mut slot) = inbox.lock() {
                    *slot = Some(snapshot.clone());
                }
            }),
        );
        self.subscription = Some(handle);
    }

    pub fn detach(&mut self) {
        if let Some(handle) = self.subscription.take() {
            handle.unsubscribe();
        }
    }

    /// Pull the newest delivered snapshot, if any
    fn sync(&mut self) {
        let latest = match self.inbox.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(snapshot) = latest {
            self.snapshot = snapshot;
        }
    }

    pub fn toggle(&mut self) -> WindowResponse {
        self.layout.open = !self.layout.open;
        self.gesture = None;
        WindowResponse { layout_changed: true }
    }

    pub fn set_filter(&mut self, category: Option<String>) {
        self.filter = category;
        self.scroll_back = 0;
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Records passing the current filter, oldest first
    pub fn visible_records(&self) -> Vec<&log_store::LogRecord> {
        self.snapshot
            .iter()
            .filter(|r| self.filter.as_deref().map_or(true, |c| r.category == c))
            .collect()
    }

    /// Move/resize gestures. Split out from drawing so it can run headless.
    pub fn handle_input(&mut self, ctx: &mut UiContext, screen_w: f32, screen_h: f32) -> WindowResponse {
        let mut response = WindowResponse::default();
        if !self.layout.open {
            return response;
        }
        let rect = self.layout.rect();
        let title = rect.slice_top(HEADER_HEIGHT);
        let handle = rect.corner_handle(RESIZE_HANDLE);
        let mouse = ctx.mouse;

        if self.gesture.is_none() && mouse.left_pressed {
            if mouse.inside(&handle) {
                self.gesture = Some(Gesture::Resize {
                    grab_dx: rect.right() - mouse.x,
                    grab_dy: rect.bottom() - mouse.y,
                });
            } else if mouse.inside(&title) && !mouse.inside(&self.close_button_rect()) {
                self.gesture = Some(Gesture::Move {
                    grab_dx: mouse.x - rect.x,
                    grab_dy: mouse.y - rect.y,
                });
            }
        }

        match self.gesture {
            Some(_) if !mouse.left_down => {
                self.gesture = None;
                self.layout = self.layout.clamped_to(screen_w, screen_h);
                response.layout_changed = true;
            }
            Some(Gesture::Move { grab_dx, grab_dy }) => {
                self.layout.left = mouse.x - grab_dx;
                self.layout.top = mouse.y - grab_dy;
                self.layout = self.layout.clamped_to(screen_w, screen_h);
            }
            Some(Gesture::Resize { grab_dx, grab_dy }) => {
                self.layout.width = (mouse.x + grab_dx - self.layout.left).max(MIN_WIDTH);
                self.layout.height = (mouse.y + grab_dy - self.layout.top).max(MIN_HEIGHT);
            }
            None => {}
        }

        if self.gesture.is_some() {
            let id = ctx.next_id();
            ctx.start_drag(id);
        }
        if mouse.inside(&self.layout.rect()) {
            ctx.block(self.layout.rect());
            if mouse.scroll > 0.0 {
                self.scroll_back += 3;
            } else if mouse.scroll < 0.0 {
                self.scroll_back = self.scroll_back.saturating_sub(3);
            }
        }
        response
    }

    fn close_button_rect(&self) -> Rect {
        let rect = self.layout.rect();
        Rect::new(rect.right() - HEADER_HEIGHT, rect.y, HEADER_HEIGHT, HEADER_HEIGHT)
    }

    /// Input plus drawing for one frame
    pub fn update(&mut self, ctx: &mut UiContext, categories: &[String]) -> WindowResponse {
        self.sync();
        let mut response = self.handle_input(ctx, screen_width(), screen_height());
        if !self.layout.open {
            return response;
        }

        let rect = self.layout.rect();
        draw_frame(rect, PANEL_COLOR);
        let title = rect.slice_top(HEADER_HEIGHT);
        draw_rectangle(title.x, title.y, title.w, title.h, HEADER_COLOR);
        draw_text(
            &format!("Log ({} records)", self.snapshot.len()),
            title.x + 6.0,
            title.y + 15.0,
            FONT_SIZE_HEADER,
            WHITE,
        );
        if text_button(ctx, self.close_button_rect().pad(2.0), "x", false) {
            response = self.toggle();
            return response;
        }

        // Category chips
        let body = rect.remaining_after_top(HEADER_HEIGHT).pad(4.0);
        let chips = body.slice_top(ROW_HEIGHT);
        let mut x = chips.x;
        let mut choices: Vec<Option<&str>> = vec![None];
        choices.extend(categories.iter().map(|c| Some(c.as_str())));
        for choice in choices {
            let label = choice.unwrap_or("all");
            let w = measure_text(label, None, FONT_SIZE_CONTENT as u16, 1.0).width + 12.0;
            if x + w > chips.right() {
                break;
            }
            let active = self.filter.as_deref() == choice;
            if text_button(ctx, Rect::new(x, chips.y, w, chips.h), label, active) {
                self.set_filter(choice.map(str::to_string));
            }
            x += w + 4.0;
        }

        // Newest at the bottom
        let list = body.remaining_after_top(ROW_HEIGHT + 4.0);
        let rows: Vec<Rect> = list.rows(ROW_HEIGHT - 4.0).collect();
        let max_back = self.visible_records().len().saturating_sub(rows.len());
        self.scroll_back = self.scroll_back.min(max_back);
        let visible = self.visible_records();
        let end = visible.len() - self.scroll_back;
        let start = end.saturating_sub(rows.len());
        for (row, record) in rows.iter().zip(&visible[start..end]) {
            let color = match record.level {
                LogLevel::Info => LOG_INFO,
                LogLevel::Warn => LOG_WARN,
                LogLevel::Error => LOG_ERROR,
            };
            let mut text = format!("{:>7.2} [{}] {}", record.timestamp, record.category, record.message);
            if let Some(data) = &record.data {
                text.push_str(&format!(" ({})", data));
            }
            draw_label(*row, &fit_text(&text, row.w, FONT_SIZE_CONTENT), color);
        }
        if visible.is_empty() {
            draw_label(list.slice_top(ROW_HEIGHT), "no records", TEXT_DIM);
        }

        let handle = rect.corner_handle(RESIZE_HANDLE);
        draw_triangle(
            vec2(handle.right(), handle.y),
            vec2(handle.right(), handle.bottom()),
            vec2(handle.x, handle.bottom()),
            BORDER_COLOR,
        );
        response
    }
}

impl Drop for LogWindow {
    fn drop(&mut self) {
        self.detach();
    }
}
