//! Camera uniform upload

use game_core::render::{RenderPass, AMBIENT_LIGHT, SUN_INTENSITY, SUN_POSITION};

/// Camera and light data (matches WGSL struct, 256-byte aligned)
#[repr(C, align(256))]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4], // 64 bytes
    sun_dir: [f32; 4],        // xyz direction towards the light, w intensity
    ambient: [f32; 4],        // x ambient, yzw unused
    backdrop: [f32; 4],       // linear rgba behind an inset pass
    _padding: [f32; 36],      // 144 bytes to reach 256
}

impl CameraUniform {
    pub fn for_pass(pass: &RenderPass) -> Self {
        let sun = SUN_POSITION.normalize();
        Self {
            view_proj: pass.view_proj().to_cols_array_2d(),
            sun_dir: [sun.x, sun.y, sun.z, SUN_INTENSITY],
            ambient: [AMBIENT_LIGHT, 0.0, 0.0, 0.0],
            backdrop: pass.clear.unwrap_or([0.0; 4]),
            _padding: [0.0; 36],
        }
    }
}
