//! Windowed host for the haunted house
//!
//! Wires winit's event loop to the [`SceneAnimator`]: `RedrawRequested` runs
//! one animation cycle and the cycle re-arms itself through
//! [`Window::request_redraw`].

use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    animation::{FrameEvent, FrameRenderer, FrameScheduler, SceneAnimator},
    config::{DebugParams, SceneConfig},
    context::SceneContext,
    error::{AppError, RenderError},
    gfx::{camera::PerspectiveCamera, scene::Scene, OrbitControls, RenderEngine},
    ui::{debug_panel, UiManager},
    viewport::Viewport,
};

/// Host options that are not part of the scene
#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    /// Whether the debug panel is visible at startup
    pub show_panel: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self { show_panel: true }
    }
}

pub struct HauntedHouseApp {
    config: SceneConfig,
    options: AppOptions,
}

impl HauntedHouseApp {
    pub fn new(config: SceneConfig, options: AppOptions) -> Self {
        Self { config, options }
    }

    /// Opens the window and runs until it is closed
    ///
    /// Returns the first fatal error, if any, after the event loop has exited.
    pub fn run(self) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        // Frames are requested by the animator, not by the event loop
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut state = AppState::new(self.config, self.options);
        event_loop.run_app(&mut state)?;

        match state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Schedules the next cycle on the window's next refresh
struct WindowScheduler<'a>(&'a Window);

impl FrameScheduler for WindowScheduler<'_> {
    fn request_next_frame(&self) {
        self.0.request_redraw();
    }
}

/// Debug panel drawn on top of the scene
struct Overlay<'a> {
    ui: &'a mut UiManager,
    window: &'a Window,
    params: &'a mut DebugParams,
    frame: Option<FrameEvent>,
}

/// Renders through the engine, optionally with the debug panel
struct WindowRenderer<'a> {
    engine: &'a mut RenderEngine,
    overlay: Option<Overlay<'a>>,
}

impl FrameRenderer for WindowRenderer<'_> {
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        let Self { engine, overlay } = self;

        let Some(overlay) = overlay.as_mut() else {
            return engine.render_frame(
                scene,
                camera,
                None::<fn(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView)>,
            );
        };

        let stats = scene.get_statistics();
        let draw_overlay = |device: &wgpu::Device,
                            queue: &wgpu::Queue,
                            encoder: &mut wgpu::CommandEncoder,
                            view: &wgpu::TextureView| {
            let Overlay {
                ui,
                window,
                params,
                frame,
            } = overlay;
            ui.draw(device, queue, encoder, window, view, |imgui_ui| {
                if debug_panel(imgui_ui, params, *frame, &stats) {
                    log::trace!("Debug parameters changed: {:?}", params);
                }
            });
        };
        engine.render_frame(scene, camera, Some(draw_overlay))
    }
}

/// Everything that exists only while the window is open
/// Feeds an event to the UI and reports whether it swallowed the input
///
/// ImGui sees every event, even while hidden, so its button and modifier
/// state stays in step with the window. Only a visible panel captures input.
fn ui_captures(panel_visible: bool, feed: impl FnOnce() -> bool) -> bool {
    let wants_input = feed();
    panel_visible && wants_input
}

struct Graphics {
    window: Arc<Window>,
    engine: RenderEngine,
    ui: UiManager,
    controls: OrbitControls,
    context: SceneContext,
}

struct AppState {
    config: SceneConfig,
    options: AppOptions,
    animator: SceneAnimator,
    params: Option<DebugParams>,
    graphics: Option<Graphics>,
    error: Option<AppError>,
}

impl AppState {
    fn new(config: SceneConfig, options: AppOptions) -> Self {
        Self {
            config,
            options,
            animator: SceneAnimator::new(),
            params: None,
            graphics: None,
            error: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_config = &self.config.window;
        let window = event_loop.create_window(
            WindowAttributes::default()
                .with_title(window_config.title.clone())
                .with_inner_size(LogicalSize::new(window_config.width, window_config.height)),
        )?;
        let window = Arc::new(window);

        let physical = window.inner_size();
        let viewport = Viewport::from_physical(physical, window.scale_factor());
        let mut context = SceneContext::from_config(&self.config, viewport);

        let engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            viewport.surface_size(),
            &self.config.shadows,
        ))?;
        engine.init_scene(&mut context.scene);

        let ui = UiManager::new(
            engine.device(),
            engine.queue(),
            engine.surface_format(),
            &window,
        );
        let controls = OrbitControls::new(&self.config.controls, physical.height as f32);

        let stats = context.scene.get_statistics();
        log::info!(
            "Scene ready: {} objects, {} triangles, {} point lights",
            stats.object_count,
            stats.total_triangles,
            stats.point_light_count
        );

        self.params = Some(DebugParams::from_scene(&context.scene));
        self.animator.start(&WindowScheduler(&window));
        self.graphics = Some(Graphics {
            window,
            engine,
            ui,
            controls,
            context,
        });
        Ok(())
    }

    /// Stops the loop and remembers the first fatal error
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.animator.stop_token().stop();
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        log::info!("Stop requested, shutting down");
        self.animator.stop_token().stop();
        event_loop.exit();
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };
        if size.width == 0 || size.height == 0 {
            return;
        }

        let logical = size.to_logical::<f64>(scale_factor);
        if let Some(surface_size) =
            graphics
                .context
                .resize(logical.width, logical.height, scale_factor)
        {
            graphics.engine.resize(surface_size);
        }
        graphics.controls.set_viewport_height(size.height as f32);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(graphics), Some(params)) = (self.graphics.as_mut(), self.params.as_mut()) else {
            return;
        };

        params.apply(&mut graphics.context.scene);
        graphics.context.scene.sync_gpu(graphics.engine.queue());

        let Graphics {
            window,
            engine,
            ui,
            controls,
            context,
        } = graphics;
        let window: &Window = window;

        let overlay = self.options.show_panel.then(|| Overlay {
            ui,
            window,
            params,
            frame: self.animator.last_frame(),
        });
        let mut renderer = WindowRenderer { engine, overlay };

        let result = self
            .animator
            .tick(context, controls, &mut renderer, &WindowScheduler(window));

        if let Err(e) = result {
            self.fail(event_loop, e.into());
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        // Handle UI input first
        let captured = ui_captures(self.options.show_panel, || {
            graphics
                .ui
                .handle_window_event(&graphics.window, window_id, &event)
        });
        if captured {
            return;
        }
        graphics.controls.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => self.shut_down(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Escape => self.shut_down(event_loop),
                KeyCode::KeyH => {
                    self.options.show_panel = !self.options.show_panel;
                    log::debug!("Debug panel visible: {}", self.options.show_panel);
                }
                _ => {}
            },
            WindowEvent::Resized(size) => {
                let scale_factor = graphics.window.scale_factor();
                self.resize(size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = graphics.window.inner_size();
                self.resize(size, scale_factor);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => (),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_hidden_panel_still_sees_events() {
        let fed = Cell::new(0);
        let feed = || {
            fed.set(fed.get() + 1);
            true
        };

        assert!(!ui_captures(false, feed));
        assert!(!ui_captures(false, || {
            fed.set(fed.get() + 1);
            false
        }));
        assert_eq!(fed.get(), 2);
    }

    #[test]
    fn test_visible_panel_captures_wanted_input() {
        assert!(ui_captures(true, || true));
        assert!(!ui_captures(true, || false));
    }
}
