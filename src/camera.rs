//! Orbit camera
//!
//! World is Z-up: grid planes and dexel columns stand on XY. Right-drag
//! rotates around the target, shift+right-drag pans, the wheel zooms.

use macroquad::math::{Mat4, Vec3};

use crate::ui::MouseState;

const ELEVATION_LIMIT: f32 = 1.4;
const MIN_DISTANCE: f32 = 1.0;
const MAX_DISTANCE: f32 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Angle around Z (radians)
    pub azimuth: f32,
    /// Angle above the XY plane (radians)
    pub elevation: f32,
    pub fov_y: f32,
    captured: bool,
    last_mouse: (f32, f32),
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 14.0,
            azimuth: 0.8,
            elevation: 0.5,
            fov_y: 45f32.to_radians(),
            captured: false,
            last_mouse: (0.0, 0.0),
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> Vec3 {
        let (sa, ca) = self.azimuth.sin_cos();
        let (se, ce) = self.elevation.sin_cos();
        self.target + Vec3::new(ce * ca, ce * sa, se) * self.distance
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Z)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh_gl(self.fov_y, aspect.max(1e-3), 0.05, 500.0);
        proj * self.view()
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * 0.005;
        self.elevation = (self.elevation + dy * 0.005).clamp(-ELEVATION_LIMIT, ELEVATION_LIMIT);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Z).normalize_or_zero();
        let up = right.cross(forward);
        let speed = self.distance * 0.002;
        self.target += -right * dx * speed + up * dy * speed;
    }

    pub fn zoom(&mut self, scroll: f32) {
        let factor = if scroll > 0.0 { 0.9 } else { 1.0 / 0.9 };
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Apply one frame of mouse input. `over_ui` blocks new drags and zoom.
    pub fn handle_input(&mut self, mouse: &MouseState, shift_held: bool, over_ui: bool) {
        if mouse.right_down && (self.captured || !over_ui) {
            if self.captured {
                let dx = mouse.x - self.last_mouse.0;
                let dy = mouse.y - self.last_mouse.1;
                if shift_held {
                    self.pan(dx, dy);
                } else {
                    self.rotate(dx, dy);
                }
            }
            self.captured = true;
        } else if !mouse.right_down {
            self.captured = false;
        }
        self.last_mouse = (mouse.x, mouse.y);

        if mouse.scroll != 0.0 && !over_ui {
            self.zoom(mouse.scroll);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_is_distance_from_target() {
        let cam = OrbitCamera { target: Vec3::new(1.0, 2.0, 3.0), ..Default::default() };
        assert!(((cam.eye() - cam.target).length() - cam.distance).abs() < 1e-4);
    }

    #[test]
    fn test_elevation_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.rotate(0.0, 10_000.0);
        assert_eq!(cam.elevation, ELEVATION_LIMIT);
        cam.rotate(0.0, -100_000.0);
        assert_eq!(cam.elevation, -ELEVATION_LIMIT);
    }

    #[test]
    fn test_zoom_bounds() {
        let mut cam = OrbitCamera::default();
        for _ in 0..200 {
            cam.zoom(1.0);
        }
        assert_eq!(cam.distance, MIN_DISTANCE);
        for _ in 0..200 {
            cam.zoom(-1.0);
        }
        assert_eq!(cam.distance, MAX_DISTANCE);
    }

    #[test]
    fn test_right_drag_rotates_after_capture() {
        let mut cam = OrbitCamera::default();
        let start = cam.azimuth;
        let mut mouse = MouseState { x: 100.0, y: 100.0, right_down: true, ..Default::default() };
        cam.handle_input(&mouse, false, false);
        assert_eq!(cam.azimuth, start);
        mouse.x = 120.0;
        cam.handle_input(&mouse, false, false);
        assert!(cam.azimuth != start);
    }

    #[test]
    fn test_drag_cannot_start_over_ui() {
        let mut cam = OrbitCamera::default();
        let start = cam.azimuth;
        let mut mouse = MouseState { x: 0.0, y: 0.0, right_down: true, ..Default::default() };
        cam.handle_input(&mouse, false, true);
        mouse.x = 50.0;
        cam.handle_input(&mouse, false, true);
        assert_eq!(cam.azimuth, start);
    }
}
