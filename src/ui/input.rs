//! Per-frame input state for UI interaction

use macroquad::prelude::{is_mouse_button_down, is_mouse_button_pressed, is_mouse_button_released, mouse_position, mouse_wheel, MouseButton};

use super::Rect;

/// Mouse button state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub left_down: bool,
    pub right_down: bool,
    pub left_pressed: bool,  // Just pressed this frame
    pub left_released: bool, // Just released this frame
    pub scroll: f32,         // Scroll wheel delta
}

impl MouseState {
    /// Sample macroquad's input for this frame
    pub fn capture() -> Self {
        let (x, y) = mouse_position();
        Self {
            x,
            y,
            left_down: is_mouse_button_down(MouseButton::Left),
            right_down: is_mouse_button_down(MouseButton::Right),
            left_pressed: is_mouse_button_pressed(MouseButton::Left),
            left_released: is_mouse_button_released(MouseButton::Left),
            scroll: mouse_wheel().1,
        }
    }

    pub fn inside(&self, rect: &Rect) -> bool {
        rect.contains(self.x, self.y)
    }

    pub fn clicking(&self, rect: &Rect) -> bool {
        self.left_down && rect.contains(self.x, self.y)
    }

    pub fn clicked(&self, rect: &Rect) -> bool {
        self.left_pressed && rect.contains(self.x, self.y)
    }
}

/// UI context passed through the frame
#[derive(Debug, Default)]
pub struct UiContext {
    pub mouse: MouseState,
    /// Widget currently being dragged
    pub dragging: Option<u64>,
    pub hot: Option<u64>,
    tooltip: Option<(String, f32, f32)>,
    /// Panels the mouse is over this frame; the 3D view ignores input under them
    blockers: Vec<Rect>,
    id_counter: u64,
}

impl UiContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        self.id_counter += 1;
        self.id_counter
    }

    /// Reset at start of frame (call before UI code)
    pub fn begin_frame(&mut self, mouse: MouseState) {
        self.mouse = mouse;
        self.hot = None;
        self.tooltip = None;
        self.blockers.clear();
        self.id_counter = 0;

        if !self.mouse.left_down {
            self.dragging = None;
        }
    }

    pub fn is_dragging(&self, id: u64) -> bool {
        self.dragging == Some(id)
    }

    pub fn start_drag(&mut self, id: u64) {
        self.dragging = Some(id);
    }

    pub fn set_hot(&mut self, id: u64) {
        if self.dragging.is_none() || self.dragging == Some(id) {
            self.hot = Some(id);
        }
    }

    pub fn is_hot(&self, id: u64) -> bool {
        self.hot == Some(id)
    }

    pub fn set_tooltip(&mut self, text: &str, x: f32, y: f32) {
        self.tooltip = Some((text.to_string(), x, y));
    }

    pub fn tooltip(&self) -> Option<(&str, f32, f32)> {
        self.tooltip.as_ref().map(|(t, x, y)| (t.as_str(), *x, *y))
    }

    /// Register a panel rect that owns the mouse while it hovers it
    pub fn block(&mut self, rect: Rect) {
        self.blockers.push(rect);
    }

    /// Whether the mouse is over a UI panel or a widget drag is active
    pub fn mouse_over_ui(&self) -> bool {
        self.dragging.is_some() || self.blockers.iter().any(|r| self.mouse.inside(r))
    }
}
