use crate::gpu::DEPTH_FORMAT;
use crate::shaders;

/// How a mesh's index list is assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Triangles,
    Lines,
    Points,
}

impl Primitive {
    pub const ALL: [Primitive; 3] = [Self::Triangles, Self::Lines, Self::Points];

    pub fn topology(self) -> wgpu::PrimitiveTopology {
        match self {
            Self::Triangles => wgpu::PrimitiveTopology::TriangleList,
            Self::Lines => wgpu::PrimitiveTopology::LineList,
            Self::Points => wgpu::PrimitiveTopology::PointList,
        }
    }

    /// Indices consumed per primitive.
    pub fn arity(self) -> usize {
        match self {
            Self::Triangles => 3,
            Self::Lines => 2,
            Self::Points => 1,
        }
    }

    /// Largest index count usable with this primitive; a trailing partial
    /// primitive is dropped.
    pub fn usable_indices(self, index_count: usize) -> usize {
        index_count - index_count % self.arity()
    }

    fn index(self) -> usize {
        match self {
            Self::Triangles => 0,
            Self::Lines => 1,
            Self::Points => 2,
        }
    }
}

/// The mesh shader compiled into one render pipeline per [`Primitive`].
pub struct ShaderProgram {
    pipelines: [wgpu::RenderPipeline; 3],
    bind_group_layout: wgpu::BindGroupLayout,
}

impl ShaderProgram {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        let pipelines = Primitive::ALL.map(|primitive| {
            create_pipeline(device, &pipeline_layout, &shader, surface_format, primitive)
        });
        tracing::debug!(?surface_format, "mesh pipelines created");

        Self {
            pipelines,
            bind_group_layout,
        }
    }

    pub fn pipeline(&self, primitive: Primitive) -> &wgpu::RenderPipeline {
        &self.pipelines[primitive.index()]
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    primitive: Primitive,
) -> wgpu::RenderPipeline {
    let label = match primitive {
        Primitive::Triangles => "mesh_triangles_pipeline",
        Primitive::Lines => "mesh_lines_pipeline",
        Primitive::Points => "mesh_points_pipeline",
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: 3 * std::mem::size_of::<f32>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                },
                wgpu::VertexBufferLayout {
                    array_stride: 3 * std::mem::size_of::<f32>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![1 => Float32x3],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: primitive.topology(),
            // Meshes mix windings (the square is clockwise), so nothing is culled.
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}
