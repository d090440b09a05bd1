//! Explicitly owned scene state shared by the animator and the host.

use crate::config::SceneConfig;
use crate::gfx::camera::PerspectiveCamera;
use crate::gfx::scene::{haunted_house, Scene};
use crate::viewport::{SurfaceSize, Viewport};

/// Scene, camera and viewport owned together
///
/// The application holds exactly one context and lends it to the animator each
/// frame; nothing in the crate reaches the scene through globals.
pub struct SceneContext {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    viewport: Viewport,
}

impl SceneContext {
    pub fn new(scene: Scene, mut camera: PerspectiveCamera, viewport: Viewport) -> Self {
        camera.set_aspect(viewport.aspect());
        Self {
            scene,
            camera,
            viewport,
        }
    }

    /// Builds the haunted house scene and its camera from configuration
    pub fn from_config(config: &SceneConfig, viewport: Viewport) -> Self {
        let scene = haunted_house::build(config);
        let camera = PerspectiveCamera::from_config(&config.camera, viewport.aspect());
        Self::new(scene, camera, viewport)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Handles a resize notification with logical dimensions
    ///
    /// Updates the camera aspect and returns the new surface size when it
    /// differs from the previous one. Repeating the same notification is a
    /// no-op.
    pub fn resize(&mut self, width: f64, height: f64, scale_factor: f64) -> Option<SurfaceSize> {
        let previous = self.viewport.surface_size();
        if !self.viewport.resize(width, height, scale_factor) {
            return None;
        }

        self.camera.set_aspect(self.viewport.aspect());
        let size = self.viewport.surface_size();
        log::debug!(
            "Viewport resized to {}x{} @{}x, surface {}x{}",
            self.viewport.width(),
            self.viewport.height(),
            self.viewport.pixel_ratio(),
            size.width,
            size.height
        );

        (size != previous).then_some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn context() -> SceneContext {
        SceneContext::from_config(&SceneConfig::default(), Viewport::new(800.0, 600.0, 1.0))
    }

    #[test]
    fn test_initial_aspect_matches_viewport() {
        let context = context();
        assert_abs_diff_eq!(context.camera.aspect, 800.0 / 600.0);
    }

    #[test]
    fn test_resize_sets_camera_aspect() {
        let mut context = context();
        for (w, h) in [(1920.0, 1080.0), (300.0, 900.0), (1.0, 1.0), (4096.0, 17.0)] {
            context.resize(w, h, 1.0);
            assert_abs_diff_eq!(context.camera.aspect, (w / h) as f32, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_resize_is_idempotent() {
        let mut context = context();
        let size = context.resize(1024.0, 768.0, 1.5).unwrap();
        assert_eq!(
            size,
            SurfaceSize {
                width: 1536,
                height: 1152
            }
        );
        let aspect = context.camera.aspect;

        assert_eq!(context.resize(1024.0, 768.0, 1.5), None);
        assert_eq!(context.camera.aspect, aspect);
        assert_eq!(context.viewport().surface_size(), size);
    }

    #[test]
    fn test_scale_change_above_cap_keeps_surface() {
        let mut context = context();
        assert!(context.resize(800.0, 600.0, 2.0).is_some());
        // Pixel ratio is already capped at 2
        assert_eq!(context.resize(800.0, 600.0, 3.0), None);
    }
}
