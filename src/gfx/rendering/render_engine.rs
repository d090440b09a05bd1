//! WGPU-based rendering engine for the haunted house
//!
//! Owns the surface, device and queue, and draws a [`Scene`] in two passes: a
//! depth-only pass from the moon into the shadow map, then the forward pass
//! into the swapchain image. An optional callback draws the UI overlay on top.

use std::sync::Arc;
use wgpu::{Device, TextureFormat};

use crate::config::ShadowConfig;
use crate::error::RenderError;
use crate::gfx::{
    camera::PerspectiveCamera,
    resources::{GlobalBindings, GlobalUBO, GlobalUniform, TextureResource},
    scene::{object::DrawMesh, Scene},
};
use crate::viewport::SurfaceSize;
use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const SHADOW_PIPELINE: &str = "Shadow";
const FORWARD_PIPELINE: &str = "Forward";

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    object_layout: BindGroupLayoutWithDesc,

    // Shadow mapping resources
    shadow_map: TextureResource,
    shadow_bind_group: wgpu::BindGroup,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Prefers an sRGB surface format so the linear colours written by the
    /// shaders are encoded on store. When shadows are disabled the shadow map
    /// shrinks to a single texel and the depth pass is skipped.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: SurfaceSize,
        shadows: &ShadowConfig,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        if !format.is_srgb() {
            log::warn!("No sRGB surface format available, colours will look dark ({:?})", format);
        }

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let shadow_size = if shadows.enabled {
            shadows.map_size
        } else {
            1
        };
        let shadow_map = TextureResource::create_shadow_map(&device, shadow_size);

        let shadow_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::depth_texture_2d())
            .next_binding_fragment(binding_types::sampler(
                wgpu::SamplerBindingType::Comparison,
            ))
            .create(&device, "Shadow Map Layout");
        let shadow_bind_group = BindGroupBuilder::new(&shadow_layout)
            .texture(&shadow_map.view)
            .sampler(&shadow_map.sampler)
            .create(&device, "Shadow Map Bind Group");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);

        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(&device, "Object Bind Group Layout");

        // Wrap device and queue in Arc for pipeline manager
        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("scene", include_str!("scene.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow.wgsl"));

        // No culling: the plane and the walls are seen from both sides
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default()
                .with_label("SHADOW")
                .with_shader("shadow")
                .with_vertex_only()
                .with_cull_mode(None)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_depth_bias(2, 2.0)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    object_layout.layout.clone(),
                ]),
        );

        pipeline_manager.register_pipeline(
            FORWARD_PIPELINE,
            PipelineConfig::default()
                .with_label("FORWARD")
                .with_shader("scene")
                .with_cull_mode(None)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })])
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    object_layout.layout.clone(),
                    shadow_layout.layout,
                ]),
        );

        pipeline_manager
            .create_all_pipelines()
            .map_err(RenderError::Pipeline)?;

        let stats = pipeline_manager.get_stats();
        log::debug!(
            "Render engine ready: {:?} {}x{}, shadow map {}, {} pipelines from {} shaders",
            format,
            config.width,
            config.height,
            shadow_size,
            stats.total_pipelines,
            stats.loaded_shaders
        );

        Ok(RenderEngine {
            device: device_handle,
            config,
            format,
            surface,
            queue: queue_handle,
            depth_texture,
            pipeline_manager,
            global_bindings,
            global_ubo,
            object_layout,
            shadow_map,
            shadow_bind_group,
        })
    }

    /// Uploads meshes and creates per-object uniforms for every scene object
    pub fn init_scene(&self, scene: &mut Scene) {
        scene.init_gpu_resources(&self.device, &self.object_layout);
    }

    /// Renders a frame with an optional UI overlay
    ///
    /// A lost or outdated surface is reconfigured and the frame retried once;
    /// any other surface error is returned.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        camera: &PerspectiveCamera,
        ui_callback: Option<F>,
    ) -> Result<(), RenderError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture()?
            }
            Err(e) => return Err(e.into()),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.global_ubo
            .update_content(&self.queue, GlobalUniform::new(scene, camera));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: Moon shadow map
        if scene.moon.cast_shadow {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(shadow_pipeline) = self.pipeline_manager.get_pipeline(SHADOW_PIPELINE) {
                shadow_pass.set_pipeline(shadow_pipeline);
                shadow_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

                for object in scene.objects.iter().filter(|o| o.visible && o.cast_shadow) {
                    let (Some(bind_group), Some(mesh)) =
                        (object.bind_group(), scene.mesh(object.mesh))
                    else {
                        continue;
                    };
                    shadow_pass.set_bind_group(1, bind_group, &[]);
                    shadow_pass.draw_mesh(mesh);
                }
            }
        }

        // PASS 2: Forward rendering with shadows and fog
        {
            let [r, g, b] = scene.background().to_linear();
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(FORWARD_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                render_pass.set_bind_group(2, &self.shadow_bind_group, &[]);

                for object in scene.objects.iter().filter(|o| o.visible) {
                    let (Some(bind_group), Some(mesh)) =
                        (object.bind_group(), scene.mesh(object.mesh))
                    else {
                        log::trace!("Skipping '{}' - no GPU resources", object.name);
                        continue;
                    };
                    render_pass.set_bind_group(1, bind_group, &[]);
                    render_pass.draw_mesh(mesh);
                }
            }
        }

        // PASS 3: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and recreates the depth buffer
    ///
    /// Zero sizes and repeats of the current size are ignored. The shadow
    /// map has a fixed resolution and is left alone.
    pub fn resize(&mut self, size: SurfaceSize) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if size == self.surface_size() {
            return;
        }

        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Current surface dimensions in device pixels
    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.config.width,
            height: self.config.height,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Surface texture format, needed by the UI renderer
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}
