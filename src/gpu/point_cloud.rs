//! GPU buffers for one formation.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::geometry::{Formation, FormationKind};
use crate::shading::ShaderUniforms;

/// Vertex, color and uniform buffers plus the bind group for one formation.
///
/// Vertex data is uploaded once. Colors and uniforms are rewritten through
/// the queue whenever they change.
pub struct PointCloud {
    formation: Arc<Formation>,
    vertex_buffer: wgpu::Buffer,
    color_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PointCloud {
    pub fn new(
        device: &wgpu::Device,
        uniform_layout: &wgpu::BindGroupLayout,
        formation: Arc<Formation>,
    ) -> Self {
        let name = formation.kind().name();
        log::debug!("uploading {} {} particles", formation.count(), name);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(formation.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let color_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Color Buffer", name)),
            contents: bytemuck::cast_slice(formation.colors()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{} Uniform Buffer", name)),
            size: std::mem::size_of::<ShaderUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Uniform Bind Group", name)),
            layout: uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            formation,
            vertex_buffer,
            color_buffer,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn kind(&self) -> FormationKind {
        self.formation.kind()
    }

    /// Whether this cloud was built from `formation`.
    pub fn holds(&self, formation: &Arc<Formation>) -> bool {
        Arc::ptr_eq(&self.formation, formation)
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &ShaderUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Replace the color stream. Extra entries beyond the particle count are
    /// ignored.
    pub fn write_colors(&self, queue: &wgpu::Queue, colors: &[[f32; 3]]) {
        let n = colors.len().min(self.formation.count() as usize);
        queue.write_buffer(&self.color_buffer, 0, bytemuck::cast_slice(&colors[..n]));
    }

    /// Record the instanced draw. The pipeline must already be set.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.color_buffer.slice(..));
        pass.draw(0..6, 0..self.formation.count());
    }
}
