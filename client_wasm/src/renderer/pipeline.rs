use super::resources::{InstanceData, LineVertex, DEPTH_FORMAT};
use super::shaders::{BACKDROP_SHADER, LINE_SHADER, MESH_SHADER};
use crate::mesh::Vertex;
use wgpu::*;

pub struct PipelineState {
    pub mesh_pipeline: RenderPipeline,
    pub line_pipeline: RenderPipeline,
    pub backdrop_pipeline: RenderPipeline,
    pub camera_layout: BindGroupLayout,
}

const MESH_VERTEX_ATTRIBS: [VertexAttribute; 2] = vertex_attr_array![0 => Float32x3, 1 => Float32x3];

fn depth_state(write: bool, compare: CompareFunction) -> DepthStencilState {
    DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: compare,
        stencil: StencilState::default(),
        bias: DepthBiasState::default(),
    }
}

fn primitive(topology: PrimitiveTopology) -> PrimitiveState {
    PrimitiveState {
        topology,
        strip_index_format: None,
        front_face: FrontFace::Ccw,
        cull_mode: None,
        unclipped_depth: false,
        polygon_mode: PolygonMode::Fill,
        conservative: false,
    }
}

pub fn create_pipelines(device: &Device, format: TextureFormat) -> PipelineState {
    // 1. Camera Bind Group Layout, shared by every pipeline
    let camera_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("Camera Bind Group Layout"),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility: ShaderStages::VERTEX_FRAGMENT,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    });

    let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("Cabinet Pipeline Layout"),
        bind_group_layouts: &[&camera_layout],
        push_constant_ranges: &[],
    });

    let blended_target = [Some(ColorTargetState {
        format,
        blend: Some(BlendState::ALPHA_BLENDING),
        write_mask: ColorWrites::ALL,
    })];

    // 2. Lit, instanced meshes
    let mesh_shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Mesh Shader"),
        source: ShaderSource::Wgsl(MESH_SHADER.into()),
    });
    let mesh_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Mesh Pipeline"),
        layout: Some(&layout),
        vertex: VertexState {
            module: &mesh_shader,
            entry_point: Some("vs_main"),
            buffers: &[
                VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: VertexStepMode::Vertex,
                    attributes: &MESH_VERTEX_ATTRIBS,
                },
                VertexBufferLayout {
                    array_stride: std::mem::size_of::<InstanceData>() as u64,
                    step_mode: VertexStepMode::Instance,
                    attributes: &InstanceData::ATTRIBS,
                },
            ],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &mesh_shader,
            entry_point: Some("fs_main"),
            targets: &blended_target,
            compilation_options: Default::default(),
        }),
        primitive: primitive(PrimitiveTopology::TriangleList),
        depth_stencil: Some(depth_state(true, CompareFunction::Less)),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    // 3. Rope, boundary, goal icon and grid
    let line_shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Line Shader"),
        source: ShaderSource::Wgsl(LINE_SHADER.into()),
    });
    let line_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Line Pipeline"),
        layout: Some(&layout),
        vertex: VertexState {
            module: &line_shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as u64,
                step_mode: VertexStepMode::Vertex,
                attributes: &LineVertex::ATTRIBS,
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &line_shader,
            entry_point: Some("fs_main"),
            targets: &blended_target,
            compilation_options: Default::default(),
        }),
        primitive: primitive(PrimitiveTopology::LineList),
        depth_stencil: Some(depth_state(true, CompareFunction::LessEqual)),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    // 4. Inset backdrop
    let backdrop_shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("Backdrop Shader"),
        source: ShaderSource::Wgsl(BACKDROP_SHADER.into()),
    });
    let backdrop_pipeline = device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("Backdrop Pipeline"),
        layout: Some(&layout),
        vertex: VertexState {
            module: &backdrop_shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &backdrop_shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: primitive(PrimitiveTopology::TriangleList),
        depth_stencil: Some(depth_state(false, CompareFunction::Always)),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    PipelineState {
        mesh_pipeline,
        line_pipeline,
        backdrop_pipeline,
        camera_layout,
    }
}
