//! wgpu rendering.
//!
//! [`Renderer`] owns the surface, device and the two [`PointCloud`]s (shell
//! and core). Each frame it derives a uniform block per formation from the
//! [`FrameContext`], re-uploads the hue-rotated core colors and draws both
//! clouds in one additive pass into an offscreen target, which
//! [`BloomPass`] resolves to the surface. [`NoiseProbe`] runs the shader's
//! noise on a headless device so it can be compared with the CPU kernels.

mod bloom;
mod pipeline;
mod point_cloud;
mod probe;

use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

pub use bloom::{bloom_extent, BloomPass, SCENE_FORMAT};
pub use pipeline::{create_point_pipeline, create_uniform_layout, vertex_layouts, ADDITIVE_BLEND};
pub use point_cloud::PointCloud;
pub use probe::{NoiseProbe, ProbeSample};

use crate::error::GpuError;
use crate::scene::Scene;
use crate::shading::{FrameContext, ShaderUniforms, ViewState};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Surface, device and the GPU side of the scene.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    uniform_layout: wgpu::BindGroupLayout,
    pipeline: wgpu::RenderPipeline,
    bloom: BloomPass,
    shell: PointCloud,
    core: PointCloud,
    generation: u64,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, scene: &Scene) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_layout = create_uniform_layout(&device);
        let pipeline = create_point_pipeline(&device, SCENE_FORMAT, &uniform_layout);
        let bloom = BloomPass::new(
            &device,
            &queue,
            config.format,
            config.width,
            config.height,
            scene.config().bloom_params(),
        );

        let shell = PointCloud::new(&device, &uniform_layout, Arc::clone(scene.shell()));
        let core = PointCloud::new(&device, &uniform_layout, Arc::clone(scene.core()));

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_layout,
            pipeline,
            bloom,
            shell,
            core,
            generation: scene.generation(),
        })
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.bloom
                .resize(&self.device, &self.queue, new_size.width, new_size.height);
        }
    }

    /// Reconfigure the surface at its current size after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Rebuild point clouds for formations the scene has replaced.
    ///
    /// New buffers are created before the old ones are dropped.
    fn sync_formations(&mut self, scene: &Scene) {
        if self.generation == scene.generation() {
            return;
        }
        if !self.shell.holds(scene.shell()) {
            self.shell = PointCloud::new(&self.device, &self.uniform_layout, Arc::clone(scene.shell()));
        }
        if !self.core.holds(scene.core()) {
            self.core = PointCloud::new(&self.device, &self.uniform_layout, Arc::clone(scene.core()));
        }
        log::debug!("point clouds rebuilt for generation {}", scene.generation());
        self.generation = scene.generation();
    }

    /// Upload this frame's state and draw both formations.
    pub fn render(
        &mut self,
        scene: &Scene,
        frame: &FrameContext,
        view: &ViewState,
    ) -> Result<(), wgpu::SurfaceError> {
        if !view.has_area() {
            return Ok(());
        }
        self.sync_formations(scene);

        let params = scene.shading_params();
        let shell_uniforms = ShaderUniforms::new(frame, view, scene.shell_model(frame.time), &params);
        let core_uniforms = ShaderUniforms::new(frame, view, scene.core_model(frame.time), &params)
            .without_interaction();
        self.shell.write_uniforms(&self.queue, &shell_uniforms);
        self.core.write_uniforms(&self.queue, &core_uniforms);
        self.core.write_colors(&self.queue, scene.core_colors());

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.bloom.scene_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            self.shell.draw(&mut render_pass);
            self.core.draw(&mut render_pass);
        }

        self.bloom.encode(&mut encoder, &surface_view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
