use crate::camera::CameraUniform;
use game_core::render::{FramePlan, MeshKind};
use game_core::Layer;
use std::ops::Range;
use wgpu::*;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth24Plus;
pub const MAX_PASSES: usize = 2;

/// Per-instance data (matches shader InstanceInput).
/// Must use `repr(C)` and `bytemuck` to safely cast to raw bytes for the GPU buffer.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceData {
    pub const ATTRIBS: [VertexAttribute; 5] = vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl LineVertex {
    pub const ATTRIBS: [VertexAttribute; 2] = vertex_attr_array![0 => Float32x3, 1 => Float32x4];
}

/// Vertex buffer that grows to fit whatever is written to it
pub struct GrowableBuffer {
    pub buffer: Buffer,
    capacity: u64,
    label: &'static str,
}

impl GrowableBuffer {
    pub fn new(device: &Device, label: &'static str, capacity: u64) -> Self {
        Self {
            buffer: create_vertex_buffer(device, label, capacity),
            capacity,
            label,
        }
    }

    pub fn write(&mut self, device: &Device, queue: &Queue, bytes: &[u8]) {
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            self.buffer = create_vertex_buffer(device, self.label, self.capacity);
        }
        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

fn create_vertex_buffer(device: &Device, label: &str, size: u64) -> Buffer {
    device.create_buffer(&BufferDescriptor {
        label: Some(label),
        size: size.max(256),
        usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Uniform buffer and bind group for one render pass
pub struct CameraSlot {
    pub buffer: Buffer,
    pub bind_group: BindGroup,
}

pub fn create_camera_slot(device: &Device, layout: &BindGroupLayout, index: usize) -> CameraSlot {
    let buffer = device.create_buffer(&BufferDescriptor {
        label: Some(&format!("Camera Buffer {index}")),
        size: std::mem::size_of::<CameraUniform>() as u64,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some(&format!("Camera Bind Group {index}")),
        layout,
        entries: &[BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    CameraSlot { buffer, bind_group }
}

pub fn create_depth_view(device: &Device, config: &SurfaceConfiguration) -> TextureView {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("Depth Texture"),
        size: Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&TextureViewDescriptor::default())
}

/// Instance ranges for one mesh, split by layer
#[derive(Debug, Clone, Default)]
pub struct MeshBatch {
    pub world: Range<u32>,
    pub minimap: Range<u32>,
}

impl MeshBatch {
    /// Instances a pass should draw; the minimap range follows the world
    /// range, so an inset pass draws both in one call
    pub fn range(&self, minimap_layer: bool) -> Range<u32> {
        if minimap_layer {
            self.world.start..self.minimap.end
        } else {
            self.world.clone()
        }
    }
}

/// Plan flattened into upload order
#[derive(Default)]
pub struct FrameBatches {
    pub instances: Vec<InstanceData>,
    pub cube: MeshBatch,
    pub sphere: MeshBatch,
    pub line_vertices: Vec<LineVertex>,
    pub lines: MeshBatch,
}

impl FrameBatches {
    pub fn build(plan: &FramePlan) -> Self {
        let mut batches = Self::default();
        batches.cube = batches.push_mesh_batch(plan, MeshKind::Cube);
        batches.sphere = batches.push_mesh_batch(plan, MeshKind::Sphere);

        batches.push_lines(plan, Layer::World);
        let mid = batches.line_vertices.len() as u32;
        batches.push_lines(plan, Layer::Minimap);
        let end = batches.line_vertices.len() as u32;
        batches.lines = MeshBatch {
            world: 0..mid,
            minimap: mid..end,
        };
        batches
    }

    fn push_mesh_batch(&mut self, plan: &FramePlan, kind: MeshKind) -> MeshBatch {
        let start = self.instances.len() as u32;
        self.push_meshes(plan, kind, Layer::World);
        let mid = self.instances.len() as u32;
        self.push_meshes(plan, kind, Layer::Minimap);
        MeshBatch {
            world: start..mid,
            minimap: mid..self.instances.len() as u32,
        }
    }

    fn push_meshes(&mut self, plan: &FramePlan, kind: MeshKind, layer: Layer) {
        self.instances.extend(
            plan.meshes
                .iter()
                .filter(|m| m.mesh == kind && m.layer == layer)
                .map(|m| InstanceData {
                    model: m.model.to_cols_array_2d(),
                    color: m.color,
                }),
        );
    }

    fn push_lines(&mut self, plan: &FramePlan, layer: Layer) {
        for line in plan.lines.iter().filter(|l| l.layer == layer) {
            for (a, b) in line.segments() {
                self.line_vertices.push(LineVertex {
                    position: a.to_array(),
                    color: line.color,
                });
                self.line_vertices.push(LineVertex {
                    position: b.to_array(),
                    color: line.color,
                });
            }
        }
    }
}
