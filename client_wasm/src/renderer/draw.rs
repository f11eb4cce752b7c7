use super::resources::{FrameBatches, MeshBatch};
use super::WgpuRenderer;
use crate::camera::CameraUniform;
use crate::mesh::Mesh;
use game_core::render::{FramePlan, RenderPass as PlannedPass, Viewport};
use wgpu::*;

pub fn draw_frame(renderer: &mut WgpuRenderer, plan: &FramePlan) -> Result<(), String> {
    let output = match renderer.surface.get_current_texture() {
        Ok(output) => output,
        Err(SurfaceError::Lost | SurfaceError::Outdated) => {
            renderer.surface.configure(&renderer.device, &renderer.surface_config);
            return Ok(());
        }
        Err(e) => return Err(format!("Failed to get current texture: {:?}", e)),
    };
    let view = output.texture.create_view(&TextureViewDescriptor::default());

    let batches = FrameBatches::build(plan);
    upload(renderer, plan, &batches);

    let mut encoder = renderer.device.create_command_encoder(&CommandEncoderDescriptor {
        label: Some("Render Encoder"),
    });
    let (width, height) = renderer.size();
    for (index, planned) in plan.passes.iter().enumerate().take(renderer.cameras.len()) {
        let Some(viewport) = clamp_to_target(planned.viewport, width, height) else {
            continue;
        };
        let first = index == 0;
        let load = match (first, planned.clear) {
            (true, Some([r, g, b, a])) => LoadOp::Clear(Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }),
            _ => LoadOp::Load,
        };
        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some(planned.label),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: Operations {
                    load,
                    store: StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &renderer.depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_viewport(
            viewport.x as f32,
            viewport.y as f32,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            1.0,
        );
        if let Some(scissor) = planned.scissor.and_then(|s| clamp_to_target(s, width, height)) {
            pass.set_scissor_rect(scissor.x, scissor.y, scissor.width, scissor.height);
        }
        pass.set_bind_group(0, &renderer.cameras[index].bind_group, &[]);

        // Insets cannot clear just their rectangle, so paint the backdrop
        if !first && planned.clear.is_some() {
            pass.set_pipeline(&renderer.backdrop_pipeline);
            pass.draw(0..3, 0..1);
        }

        draw_pass(renderer, &mut pass, planned, &batches);
    }

    renderer.queue.submit(std::iter::once(encoder.finish()));
    output.present();
    Ok(())
}

fn upload(renderer: &mut WgpuRenderer, plan: &FramePlan, batches: &FrameBatches) {
    for (slot, planned) in renderer.cameras.iter().zip(&plan.passes) {
        let uniform = CameraUniform::for_pass(planned);
        renderer.queue.write_buffer(&slot.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
    renderer.instances.write(
        &renderer.device,
        &renderer.queue,
        bytemuck::cast_slice(&batches.instances),
    );
    renderer.line_vertices.write(
        &renderer.device,
        &renderer.queue,
        bytemuck::cast_slice(&batches.line_vertices),
    );
}

fn draw_pass(renderer: &WgpuRenderer, pass: &mut RenderPass<'_>, planned: &PlannedPass, batches: &FrameBatches) {
    let inset = planned.minimap_layer;

    pass.set_pipeline(&renderer.mesh_pipeline);
    pass.set_vertex_buffer(1, renderer.instances.buffer.slice(..));
    draw_mesh(pass, &renderer.cube, &batches.cube, inset);
    draw_mesh(pass, &renderer.sphere, &batches.sphere, inset);

    let lines = batches.lines.range(inset);
    if !lines.is_empty() {
        pass.set_pipeline(&renderer.line_pipeline);
        pass.set_vertex_buffer(0, renderer.line_vertices.buffer.slice(..));
        pass.draw(lines, 0..1);
    }
}

fn draw_mesh(pass: &mut RenderPass<'_>, mesh: &Mesh, batch: &MeshBatch, inset: bool) {
    let instances = batch.range(inset);
    if instances.is_empty() {
        return;
    }
    pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
    pass.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint16);
    pass.draw_indexed(0..mesh.index_count, 0, instances);
}

/// Scissor and viewport rectangles must sit inside the surface
fn clamp_to_target(rect: Viewport, width: u32, height: u32) -> Option<Viewport> {
    if rect.x >= width || rect.y >= height {
        return None;
    }
    let clamped = Viewport {
        x: rect.x,
        y: rect.y,
        width: rect.width.min(width - rect.x),
        height: rect.height.min(height - rect.y),
    };
    (clamped.width > 0 && clamped.height > 0).then_some(clamped)
}
