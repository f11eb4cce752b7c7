pub mod draw;
pub mod init;
pub mod pipeline;
pub mod resources;
pub mod shaders;

use crate::mesh::{create_cube, create_sphere, Mesh};
use game_core::render::{FramePlan, Renderer};
use resources::{CameraSlot, GrowableBuffer, MAX_PASSES};
use web_sys::HtmlCanvasElement;
use wgpu::*;

const SPHERE_SEGMENTS: u32 = 16;

pub struct WgpuRenderer {
    pub device: Device,
    pub queue: Queue,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,

    // Pipelines
    pub mesh_pipeline: RenderPipeline,
    pub line_pipeline: RenderPipeline,
    pub backdrop_pipeline: RenderPipeline,

    // Resources
    pub cameras: Vec<CameraSlot>,
    pub depth_view: TextureView,
    pub instances: GrowableBuffer,
    pub line_vertices: GrowableBuffer,
    pub cube: Mesh,
    pub sphere: Mesh,
}

impl WgpuRenderer {
    pub async fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = init::init_wgpu(canvas).await?;
        let pipes = pipeline::create_pipelines(&ctx.device, ctx.config.format);

        let cameras = (0..MAX_PASSES)
            .map(|index| resources::create_camera_slot(&ctx.device, &pipes.camera_layout, index))
            .collect();
        let depth_view = resources::create_depth_view(&ctx.device, &ctx.config);
        let instances = GrowableBuffer::new(&ctx.device, "Instance Buffer", 64 * 1024);
        let line_vertices = GrowableBuffer::new(&ctx.device, "Line Vertex Buffer", 16 * 1024);

        let (cube_vertices, cube_indices) = create_cube();
        let cube = Mesh::new(&ctx.device, &ctx.queue, &cube_vertices, &cube_indices);
        let (sphere_vertices, sphere_indices) = create_sphere(SPHERE_SEGMENTS);
        let sphere = Mesh::new(&ctx.device, &ctx.queue, &sphere_vertices, &sphere_indices);

        Ok(Self {
            device: ctx.device,
            queue: ctx.queue,
            surface: ctx.surface,
            surface_config: ctx.config,
            mesh_pipeline: pipes.mesh_pipeline,
            line_pipeline: pipes.line_pipeline,
            backdrop_pipeline: pipes.backdrop_pipeline,
            cameras,
            depth_view,
            instances,
            line_vertices,
            cube,
            sphere,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

impl Renderer for WgpuRenderer {
    type Error = String;

    fn render(&mut self, plan: &FramePlan) -> Result<(), String> {
        draw::draw_frame(self, plan)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size() {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = resources::create_depth_view(&self.device, &self.surface_config);
    }
}
