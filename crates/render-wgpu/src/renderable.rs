use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use simteach_geom::MeshLike;
use wgpu::util::DeviceExt;

use crate::gpu::OPENGL_TO_WGPU_MATRIX;
use crate::{Primitive, RenderError, ShaderProgram};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct MeshUniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl MeshUniforms {
    /// `projection` uses OpenGL depth; it is remapped here.
    fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            projection: (OPENGL_TO_WGPU_MATRIX * projection).to_cols_array_2d(),
        }
    }
}

/// Which buffers a shape needs re-uploaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingUploads {
    pub positions: bool,
    pub colours: bool,
}

impl PendingUploads {
    pub fn of(shape: &dyn MeshLike) -> Self {
        Self {
            positions: shape.positions_stale(),
            colours: shape.colours_stale(),
        }
    }

    pub fn any(self) -> bool {
        self.positions || self.colours
    }
}

/// GPU copy of one [`MeshLike`]: vertex, colour and index buffers plus its
/// own uniform block.
///
/// Buffer sizes are fixed at creation, matching the fixed-size geometry
/// buffers.
pub struct MeshRenderable {
    positions: wgpu::Buffer,
    colours: wgpu::Buffer,
    indices: wgpu::Buffer,
    vertex_count: usize,
    index_count: usize,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl MeshRenderable {
    /// Upload `shape` and clear its stale flags.
    pub fn new(
        device: &wgpu::Device,
        program: &ShaderProgram,
        shape: &mut dyn MeshLike,
    ) -> Result<Self, RenderError> {
        let vertex_count = shape.vertex_count();
        let index_count = shape.indices().len();
        if vertex_count == 0 || index_count == 0 {
            return Err(RenderError::EmptyMesh);
        }

        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_positions"),
            contents: bytemuck::cast_slice(&shape.positions_f32()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let colours = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_colours"),
            contents: bytemuck::cast_slice(shape.colours()),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_indices"),
            contents: bytemuck::cast_slice(shape.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        shape.mark_positions_clean();
        shape.mark_colours_clean();

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_uniforms"),
            contents: bytemuck::bytes_of(&MeshUniforms::new(
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                Mat4::IDENTITY,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_uniform_bind_group"),
            layout: program.bind_group_layout(),
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        tracing::debug!(vertex_count, index_count, "mesh renderable created");
        Ok(Self {
            positions,
            colours,
            indices,
            vertex_count,
            index_count,
            uniform_buffer,
            bind_group,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Re-upload whatever `shape` marks stale, then clear those flags.
    pub fn upload(
        &self,
        queue: &wgpu::Queue,
        shape: &mut dyn MeshLike,
    ) -> Result<PendingUploads, RenderError> {
        if shape.vertex_count() != self.vertex_count {
            return Err(RenderError::VertexCountChanged {
                expected: self.vertex_count,
                actual: shape.vertex_count(),
            });
        }
        let pending = PendingUploads::of(shape);
        if pending.positions {
            queue.write_buffer(&self.positions, 0, bytemuck::cast_slice(&shape.positions_f32()));
            shape.mark_positions_clean();
        }
        if pending.colours {
            queue.write_buffer(&self.colours, 0, bytemuck::cast_slice(shape.colours()));
            shape.mark_colours_clean();
        }
        if pending.any() {
            tracing::trace!(?pending, "mesh buffers uploaded");
        }
        Ok(pending)
    }

    /// Bind, upload stale buffers and issue one indexed draw call.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        queue: &wgpu::Queue,
        shape: &mut dyn MeshLike,
        view: Mat4,
        projection: Mat4,
        program: &ShaderProgram,
        primitive: Primitive,
    ) -> Result<(), RenderError> {
        self.upload(queue, shape)?;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&MeshUniforms::new(Mat4::IDENTITY, view, projection)),
        );

        let count = primitive.usable_indices(self.index_count) as u32;
        if count == 0 {
            return Ok(());
        }
        pass.set_pipeline(program.pipeline(primitive));
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.positions.slice(..));
        pass.set_vertex_buffer(1, self.colours.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..count, 0, 0..1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec3, Vec4};
    use simteach_geom::{Cube3D, Mesh3D};

    #[test]
    fn pending_uploads_follow_stale_flags() {
        let mut mesh = Mesh3D::square(2.0);
        assert_eq!(
            PendingUploads::of(&mesh),
            PendingUploads {
                positions: true,
                colours: true,
            }
        );
        mesh.mark_positions_clean();
        mesh.mark_colours_clean();
        assert!(!PendingUploads::of(&mesh).any());

        mesh.set_vertex(0, DVec3::ONE).unwrap();
        assert_eq!(
            PendingUploads::of(&mesh),
            PendingUploads {
                positions: true,
                colours: false,
            }
        );
    }

    #[test]
    fn cube_rotation_requests_position_upload_only() {
        let mut cube = Cube3D::default();
        cube.mark_positions_clean();
        cube.mark_colours_clean();
        cube.set_rotation(glam::DMat3::from_rotation_y(0.2));
        let pending = PendingUploads::of(&cube);
        assert!(pending.positions);
        assert!(!pending.colours);
    }

    #[test]
    fn uniforms_remap_projection_depth() {
        let u = MeshUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY);
        let projection = Mat4::from_cols_array_2d(&u.projection);
        let near = projection * Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert_eq!(near.z, 0.0);
        assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn uniform_block_is_three_matrices() {
        assert_eq!(std::mem::size_of::<MeshUniforms>(), 3 * 64);
    }
}
