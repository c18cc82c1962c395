use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::Camera;
use crate::controls::OrbitControls;

/// Pixels per wheel line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// Pointer gesture currently in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drag {
    Rotate,
    Pan,
}

/// Bridges winit pointer events to orbit controls
///
/// Left drag orbits, right drag pans, the wheel dollies. Motion accumulates
/// between frames and is handed to the controls by `apply`.
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    drag: Option<Drag>,
    cursor: Option<(f32, f32)>,
    rotate_delta: (f32, f32),
    pan_delta: (f32, f32),
    wheel_lines: f32,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a winit event; returns true if it was a pointer event
    pub fn process_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let drag = match button {
                    MouseButton::Left => Drag::Rotate,
                    MouseButton::Right => Drag::Pan,
                    _ => return false,
                };
                self.button(drag, *state == ElementState::Pressed);
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = None;
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                self.wheel(lines);
                true
            }
            _ => false,
        }
    }

    pub fn button(&mut self, drag: Drag, pressed: bool) {
        if pressed {
            self.drag = Some(drag);
        } else if self.drag == Some(drag) {
            self.drag = None;
        }
    }

    pub fn cursor_moved(&mut self, x: f32, y: f32) {
        if let (Some((old_x, old_y)), Some(drag)) = (self.cursor, self.drag) {
            let delta = match drag {
                Drag::Rotate => &mut self.rotate_delta,
                Drag::Pan => &mut self.pan_delta,
            };
            delta.0 += x - old_x;
            delta.1 += y - old_y;
        }
        self.cursor = Some((x, y));
    }

    pub fn wheel(&mut self, lines: f32) {
        self.wheel_lines += lines;
    }

    /// Hand accumulated motion to the controls and reset it
    pub fn apply(&mut self, controls: &mut OrbitControls, camera: &Camera, viewport_height: u32) {
        let (rx, ry) = std::mem::take(&mut self.rotate_delta);
        if rx != 0.0 || ry != 0.0 {
            controls.rotate_by_pixels(rx, ry, viewport_height);
        }

        let (px, py) = std::mem::take(&mut self.pan_delta);
        if px != 0.0 || py != 0.0 {
            controls.pan_by_pixels(px, py, viewport_height, camera);
        }

        let lines = std::mem::take(&mut self.wheel_lines);
        controls.zoom_by_wheel(lines);
    }
}
