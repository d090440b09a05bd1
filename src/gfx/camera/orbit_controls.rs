use cgmath::*;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::ModifiersState,
};

use super::perspective_camera::PerspectiveCamera;
use crate::animation::CameraControl;
use crate::config::ControlsConfig;

/// Zoom factor applied per wheel notch at zoom speed 1
const ZOOM_STEP: f32 = 0.95;
/// Wheel pixels that count as one notch
const PIXELS_PER_NOTCH: f32 = 100.0;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
}

/// Orbiting camera interaction: drag to rotate, shift/right drag to pan,
/// wheel to zoom
///
/// Input is accumulated between frames and applied in
/// [`CameraControl::advance`]. With damping enabled only a fraction of the
/// pending rotation and pan is applied per frame, so the camera glides to rest
/// after the pointer is released.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    viewport_height: f32,
    yaw_delta: f32,
    pitch_delta: f32,
    /// Pending pan in screen pixels, converted to world units on advance
    pan_pixels: Vector2<f32>,
    /// World-space pan still to be applied
    pan_offset: Vector3<f32>,
    scale: f32,

    drag: Option<DragMode>,
    cursor: Option<PhysicalPosition<f64>>,
    modifiers: ModifiersState,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig, viewport_height: f32) -> Self {
        Self {
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            viewport_height: viewport_height.max(1.0),
            yaw_delta: 0.0,
            pitch_delta: 0.0,
            pan_pixels: Vector2::zero(),
            pan_offset: Vector3::zero(),
            scale: 1.0,
            drag: None,
            cursor: None,
            modifiers: ModifiersState::empty(),
        }
    }

    /// Height of the surface in pixels; rotation is scaled so a full-height
    /// drag turns the camera once around
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height.max(1.0);
    }

    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// True while rotation, pan or zoom is still being applied
    pub fn is_moving(&self) -> bool {
        const REST: f32 = 1e-6;
        self.yaw_delta.abs() > REST
            || self.pitch_delta.abs() > REST
            || self.pan_pixels.magnitude2() > REST
            || self.pan_offset.magnitude2() > REST
            || (self.scale - 1.0).abs() > REST
    }

    pub fn pointer_down(&mut self, button: MouseButton) {
        self.drag = match button {
            MouseButton::Left if self.modifiers.shift_key() => Some(DragMode::Pan),
            MouseButton::Left => Some(DragMode::Rotate),
            MouseButton::Right | MouseButton::Middle => Some(DragMode::Pan),
            _ => self.drag,
        };
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        let previous = self.cursor.replace(position);
        let (Some(mode), Some(previous)) = (self.drag, previous) else {
            return;
        };

        let dx = (position.x - previous.x) as f32;
        let dy = (position.y - previous.y) as f32;
        match mode {
            DragMode::Rotate => self.rotate_by_pixels(dx, dy),
            DragMode::Pan => self.pan_by_pixels(dx, dy),
        }
    }

    pub fn rotate_by_pixels(&mut self, dx: f32, dy: f32) {
        let per_pixel = std::f32::consts::TAU / self.viewport_height * self.rotate_speed;
        self.yaw_delta -= dx * per_pixel;
        self.pitch_delta += dy * per_pixel;
    }

    pub fn pan_by_pixels(&mut self, dx: f32, dy: f32) {
        self.pan_pixels += Vector2::new(dx, dy) * self.pan_speed;
    }

    /// Positive notches move the camera closer
    pub fn zoom_by_notches(&mut self, notches: f32) {
        self.scale *= ZOOM_STEP.powf(self.zoom_speed * notches);
    }

    pub fn wheel(&mut self, delta: MouseScrollDelta) {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => y as f32 / PIXELS_PER_NOTCH,
        };
        self.zoom_by_notches(notches);
    }

    /// Feeds a window event; returns true when the event was used
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_modifiers(modifiers.state());
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                match state {
                    ElementState::Pressed => self.pointer_down(*button),
                    ElementState::Released => self.pointer_up(),
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(*position);
                self.drag.is_some()
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.pointer_up();
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.wheel(*delta);
                true
            }
            _ => false,
        }
    }

    fn step_fraction(&self) -> f32 {
        if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        }
    }
}

impl CameraControl for OrbitControls {
    fn advance(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - camera.target;
        let mut distance = offset.magnitude();
        if distance <= f32::EPSILON {
            distance = self.min_distance.max(f32::EPSILON);
        }
        let mut yaw = offset.x.atan2(offset.z);
        let mut pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();

        // Screen-space pan becomes world-space once we know the view
        if self.pan_pixels != Vector2::zero() {
            let forward = (-offset).normalize();
            let right = forward.cross(camera.up).normalize();
            let up = right.cross(forward);
            let world_per_pixel =
                2.0 * distance * (camera.fovy / 2.0).tan() / self.viewport_height;
            self.pan_offset += (-right * self.pan_pixels.x + up * self.pan_pixels.y) * world_per_pixel;
            self.pan_pixels = Vector2::zero();
        }

        let step = self.step_fraction();
        yaw += self.yaw_delta * step;
        pitch = (pitch + self.pitch_delta * step).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        distance = (distance * self.scale).clamp(self.min_distance, self.max_distance);
        camera.target += self.pan_offset * step;

        camera.position = camera.target
            + Vector3::new(
                distance * yaw.sin() * pitch.cos(),
                distance * pitch.sin(),
                distance * yaw.cos() * pitch.cos(),
            );

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.yaw_delta *= keep;
            self.pitch_delta *= keep;
            self.pan_offset *= keep;
        } else {
            self.yaw_delta = 0.0;
            self.pitch_delta = 0.0;
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;
    }
}
