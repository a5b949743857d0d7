//! Immediate-mode UI for the viewer
//!
//! - Toolbar across the top for segment selection
//! - Properties panel for the selected object
//! - Floating log window with persisted layout
//!
//! Everything is rebuilt each frame from a [`UiContext`]; panels register
//! their rects so camera input can ignore the mouse while it is over them.

mod rect;
mod widgets;
mod input;
mod theme;
pub mod properties;
pub mod log_window;

pub use rect::*;
pub use widgets::*;
pub use input::*;
pub use theme::*;
pub use properties::{PanelAction, PropertiesPanel, SceneFacade};
pub use log_window::{LogWindow, LogWindowLayout};
