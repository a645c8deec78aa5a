//! Offscreen scene target and the bloom passes that resolve it to the surface.

use glam::Vec2;

use crate::shading::{bloom_shader, BloomParams, BloomUniforms};

/// Format of the offscreen scene and the bloom scratch targets.
pub const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Size of the half-resolution bloom targets for a surface size.
pub fn bloom_extent(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

struct RenderTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, label: &str, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SCENE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Size-dependent textures and the bind groups that read them.
struct Targets {
    scene: RenderTarget,
    /// Thresholded highlights, then the fully blurred result.
    bright: RenderTarget,
    /// Horizontal blur output.
    scratch: RenderTarget,
    threshold_group: wgpu::BindGroup,
    horizontal_group: wgpu::BindGroup,
    vertical_group: wgpu::BindGroup,
    composite_group: wgpu::BindGroup,
}

/// Buffers holding one [`BloomUniforms`] per distinct stage setup.
struct StageUniforms {
    /// Threshold and composite.
    shared: wgpu::Buffer,
    horizontal: wgpu::Buffer,
    vertical: wgpu::Buffer,
}

/// GPU resources for bloom.
pub struct BloomPass {
    params: BloomParams,
    width: u32,
    height: u32,
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    threshold_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    uniforms: StageUniforms,
    targets: Targets,
}

impl BloomPass {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        params: BloomParams,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Bloom Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let layout = create_bloom_layout(device);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(bloom_shader().into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Bloom Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });
        let threshold_pipeline = create_stage_pipeline(
            device,
            &pipeline_layout,
            &shader,
            "fs_threshold",
            SCENE_FORMAT,
        );
        let blur_pipeline =
            create_stage_pipeline(device, &pipeline_layout, &shader, "fs_blur", SCENE_FORMAT);
        let composite_pipeline = create_stage_pipeline(
            device,
            &pipeline_layout,
            &shader,
            "fs_composite",
            surface_format,
        );

        let uniform_buffer = |label: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: std::mem::size_of::<BloomUniforms>() as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let uniforms = StageUniforms {
            shared: uniform_buffer("Bloom Uniforms"),
            horizontal: uniform_buffer("Bloom Horizontal Uniforms"),
            vertical: uniform_buffer("Bloom Vertical Uniforms"),
        };

        let targets = create_targets(device, &layout, &sampler, &uniforms, width, height);

        let bloom = Self {
            params,
            width,
            height,
            layout,
            sampler,
            threshold_pipeline,
            blur_pipeline,
            composite_pipeline,
            uniforms,
            targets,
        };
        bloom.write_uniforms(queue);
        log::debug!(
            "bloom strength {} radius {} threshold {}",
            params.strength,
            params.radius,
            params.threshold
        );
        bloom
    }

    /// Where the point pass draws.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.targets.scene.view
    }

    /// Recreate the size-dependent textures after a surface resize.
    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        self.targets = create_targets(
            device,
            &self.layout,
            &self.sampler,
            &self.uniforms,
            width,
            height,
        );
        self.write_uniforms(queue);
    }

    fn write_uniforms(&self, queue: &wgpu::Queue) {
        let (w, h) = bloom_extent(self.width, self.height);
        let texel = Vec2::new(1.0 / w as f32, 1.0 / h as f32);
        let write = |buffer: &wgpu::Buffer, direction: Vec2| {
            let block = BloomUniforms::new(&self.params, texel, direction);
            queue.write_buffer(buffer, 0, bytemuck::bytes_of(&block));
        };
        write(&self.uniforms.shared, Vec2::ZERO);
        write(&self.uniforms.horizontal, Vec2::X);
        write(&self.uniforms.vertical, Vec2::Y);
    }

    /// Record the bloom stages and the composite into `target`.
    ///
    /// With zero strength only the composite runs, which copies the scene.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let t = &self.targets;
        if self.params.is_active() {
            fullscreen_pass(
                encoder,
                "Bloom Threshold Pass",
                &t.bright.view,
                &self.threshold_pipeline,
                &t.threshold_group,
            );
            fullscreen_pass(
                encoder,
                "Bloom Horizontal Pass",
                &t.scratch.view,
                &self.blur_pipeline,
                &t.horizontal_group,
            );
            fullscreen_pass(
                encoder,
                "Bloom Vertical Pass",
                &t.bright.view,
                &self.blur_pipeline,
                &t.vertical_group,
            );
        }
        fullscreen_pass(
            encoder,
            "Bloom Composite Pass",
            target,
            &self.composite_pipeline,
            &t.composite_group,
        );
    }
}

fn create_bloom_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    };

    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("Bloom Bind Group Layout"),
        entries: &[
            texture_entry(0),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<BloomUniforms>() as u64
                    ),
                },
                count: None,
            },
            texture_entry(3),
        ],
    })
}

fn create_stage_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    fragment_entry: &str,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(fragment_entry),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fragment_entry),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_targets(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    uniforms: &StageUniforms,
    width: u32,
    height: u32,
) -> Targets {
    let (half_w, half_h) = bloom_extent(width, height);
    let scene = RenderTarget::new(device, "Scene Texture", width, height);
    let bright = RenderTarget::new(device, "Bloom Bright Texture", half_w, half_h);
    let scratch = RenderTarget::new(device, "Bloom Scratch Texture", half_w, half_h);

    // Binding 3 is only read by the composite; other stages bind the scene
    // there so no group samples its own render target.
    let group = |label: &str,
                 source: &wgpu::TextureView,
                 buffer: &wgpu::Buffer,
                 glow: &wgpu::TextureView| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(source),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(glow),
                },
            ],
        })
    };

    let threshold_group = group(
        "Bloom Threshold Bind Group",
        &scene.view,
        &uniforms.shared,
        &scene.view,
    );
    let horizontal_group = group(
        "Bloom Horizontal Bind Group",
        &bright.view,
        &uniforms.horizontal,
        &scene.view,
    );
    let vertical_group = group(
        "Bloom Vertical Bind Group",
        &scratch.view,
        &uniforms.vertical,
        &scene.view,
    );
    let composite_group = group(
        "Bloom Composite Bind Group",
        &scene.view,
        &uniforms.shared,
        &bright.view,
    );

    Targets {
        scene,
        bright,
        scratch,
        threshold_group,
        horizontal_group,
        vertical_group,
        composite_group,
    }
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    target: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
