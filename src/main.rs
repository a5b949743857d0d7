//! simview: interactive 3D viewer for procedural simulation segments
//!
//! Segments are built from blueprints of parameterized assets, animated on a
//! fixed tick and drawn with a small set of procedural meshes:
//! - Orbit camera (right-drag rotate, shift+right-drag pan, wheel zoom)
//! - Properties panel for editing the selected object live
//! - Log window fed by the in-memory log store

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod asset;
mod camera;
mod config;
mod geometry;
mod gpu;
mod log_store;
mod renderer;
mod segment;
mod sim;
mod storage;
mod ui;

use macroquad::prelude::*;

use app::AppState;
use camera::OrbitCamera;
use config::ViewerConfig;
use gpu::MiniquadContext;
use log_store::{LogOptions, LogStore};
use renderer::SceneRenderer;
use ui::{
    draw_tooltip, properties, LogWindow, LogWindowLayout, MouseState, PropertiesPanel, Rect,
    SceneFacade, Toolbar, UiContext,
};

const TOOLBAR_HEIGHT: f32 = 32.0;
const PANEL_WIDTH: f32 = 300.0;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("simview v{}", VERSION),
        window_width: 1600,
        window_height: 900,
        window_resizable: true,
        high_dpi: true,
        sample_count: 4,
        ..Default::default()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> ViewerConfig {
    ViewerConfig::load_or_default(std::path::Path::new(config::CONFIG_FILE))
}

#[cfg(target_arch = "wasm32")]
fn load_config() -> ViewerConfig {
    ViewerConfig::default()
}

fn shift_held() -> bool {
    is_key_down(KeyCode::LeftShift) || is_key_down(KeyCode::RightShift)
}

#[macroquad::main(window_conf)]
async fn main() {
    // Crash logging first, so the store's panic hook chains onto it
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    let store = LogStore::new(Box::new(get_time)).into_shared();
    log_store::init_global_hooks(&store);
    log_store::lock(&store).log("boot", format!("simview v{}", VERSION), LogOptions::default());

    let config = load_config();
    let mut prefs = storage::platform_prefs(config.prefs_dir.as_deref());
    log::info!("preferences: {}", prefs.label());

    let mut app = match AppState::load(&config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("could not build segments: {}", e);
            return;
        }
    };

    let mut gfx = MiniquadContext::new();
    let mut renderer = match SceneRenderer::new(&mut gfx) {
        Ok(renderer) => renderer,
        Err(e) => {
            log::error!("could not create renderer: {}", e);
            return;
        }
    };

    let mut camera = OrbitCamera::default();
    let mut ui_ctx = UiContext::new();
    let mut panel = PropertiesPanel::new();
    let mut log_window = LogWindow::new(LogWindowLayout::load(prefs.as_ref(), &config.log_window));
    log_window.attach(&store);
    let mut render_error_reported = false;

    prevent_quit();
    log::info!("=== simview ===");

    loop {
        if is_quit_requested() {
            break;
        }
        clear_background(ui::BG_COLOR);

        let sw = screen_width();
        let sh = screen_height();
        let toolbar_rect = Rect::new(0.0, 0.0, sw, TOOLBAR_HEIGHT);
        let panel_rect = Rect::new(sw - PANEL_WIDTH, TOOLBAR_HEIGHT, PANEL_WIDTH, sh - TOOLBAR_HEIGHT);

        ui_ctx.begin_frame(MouseState::capture());
        ui_ctx.block(toolbar_rect);
        ui_ctx.block(panel_rect);
        if log_window.layout.open {
            ui_ctx.block(log_window.layout.rect());
        }

        camera.handle_input(&ui_ctx.mouse, shift_held(), ui_ctx.mouse_over_ui());
        app.advance(get_frame_time() as f64);

        // 3D scene
        gfx.begin_frame();
        let segment = app.active_segment();
        let result = renderer.draw_scene(
            &mut gfx,
            camera.view_proj(sw / sh.max(1.0)),
            &segment.objects,
            app.states(),
            &segment.ghosts,
        );
        gfx.end_frame();
        match result {
            Ok(_) => render_error_reported = false,
            Err(e) if !render_error_reported => {
                log::error!("draw failed: {}", e);
                render_error_reported = true;
            }
            Err(_) => {}
        }

        // Toolbar
        draw_rectangle(toolbar_rect.x, toolbar_rect.y, toolbar_rect.w, toolbar_rect.h, ui::HEADER_COLOR);
        let mut toolbar = Toolbar::new(toolbar_rect);
        toolbar.label("Segment", ui::TEXT_DIM);
        let mut switch_to = None;
        for (i, segment) in app.segments().iter().enumerate() {
            if toolbar.button(&mut ui_ctx, &segment.name, i == app.active_index(), &segment.id) {
                switch_to = Some(i);
            }
        }
        toolbar.separator();
        if toolbar.button(&mut ui_ctx, "Log", log_window.layout.open, "Show or hide the log window")
            && log_window.toggle().layout_changed
        {
            log_window.layout.save(prefs.as_mut());
        }
        toolbar.separator();
        toolbar.label(
            &format!("{} objects  tick {}  {} fps", app.objects().len(), app.tick_index(), get_fps()),
            ui::TEXT_DIM,
        );

        if let Some(index) = switch_to {
            if index != app.active_index() && app.select_segment(index) {
                camera = OrbitCamera::default();
                let segment = app.active_segment();
                log_store::lock(&store).log(
                    "segment",
                    format!("showing '{}'", segment.name),
                    LogOptions::default().with_data(segment.id.clone()),
                );
            }
        }

        // Properties
        for action in panel.draw(&mut ui_ctx, panel_rect, &app) {
            if let Some((category, message)) = app.describe(&action) {
                log_store::lock(&store).log(category, message, LogOptions::default());
            }
            properties::dispatch(&mut app, action);
        }

        // Log window
        let categories: Vec<String> = log_store::lock(&store).categories().iter().cloned().collect();
        if log_window.update(&mut ui_ctx, &categories).layout_changed {
            log_window.layout.save(prefs.as_mut());
        }

        draw_tooltip(&ui_ctx);
        next_frame().await;
    }

    log_window.layout.save(prefs.as_mut());
    log_window.detach();
    renderer.dispose(&mut gfx);
    let (buffers, programs) = gfx.live_counts();
    if buffers + programs > 0 {
        log::warn!("{} buffers and {} programs still live at exit", buffers, programs);
    }
    log::info!("bye");
}
