//! GPU uniform blocks.
//!
//! Every block is `#[repr(C)]` + [`Pod`] and laid out without implicit padding
//! (16-byte members first, explicit `_pad` fields where std140 needs them), so
//! it can be uploaded with [`bytemuck::bytes_of`].

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::resources::SSAO_KERNEL_SIZE;

/// Per-frame camera and resolution data, bound at set 0 by every pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct EngineUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    pub inverse_projection: Mat4,
    pub inverse_view: Mat4,
    pub eye_position: Vec3,
    pub _pad0: f32,
    /// Allocated target size.
    pub framebuffer_resolution: Vec2,
    /// Size actually rendered this frame.
    pub render_resolution: Vec2,
    /// `render_resolution / framebuffer_resolution`.
    pub render_scale: Vec2,
    pub time: f32,
    pub _pad1: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SsaoUniforms {
    pub kernel: [Vec4; SSAO_KERNEL_SIZE],
    pub radius: f32,
    pub bias: f32,
    pub _pad: [f32; 2],
}

/// Which bloom shader path a dispatch takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BloomStage {
    Filter = 0,
    Downsample = 1,
    Upsample = 2,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct BloomUniforms {
    pub in_reciprocal_image_size: Vec2,
    pub out_reciprocal_image_size: Vec2,
    pub threshold_filter: Vec4,
    pub stage: u32,
    pub level_of_detail: f32,
    pub filter_radius: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PostProcessUniforms {
    pub vignette_color: Vec4,
    pub vignette_radius: f32,
    pub vignette_softness: f32,
    pub grain_amount: f32,
    pub grain_pixel_size: f32,
    pub chromatic_distortion_red: Vec2,
    pub chromatic_distortion_green: Vec2,
    pub chromatic_distortion_blue: Vec2,
    pub panini_strength: f32,
    pub is_animated: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DebugUniforms {
    pub render_mode: u32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub _pad: f32,
}

/// View-projection used by the depth-only shadow draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ShadowMapUniforms {
    pub light_view_projection: Mat4,
}

// ============================================================================
// Per-light Uniforms
// ============================================================================

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PointLightUniforms {
    pub color: Vec3,
    pub attenuation_radius: f32,
    pub position: Vec3,
    pub intensity: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SpotLightUniforms {
    /// Biased (texture-space) shadow matrix.
    pub shadow_matrix: Mat4,
    pub color: Vec3,
    pub attenuation_radius: f32,
    pub position: Vec3,
    pub intensity: f32,
    pub direction: Vec3,
    pub inner_angle_cos: f32,
    pub outer_angle_cos: f32,
    pub shadow_resolution: f32,
    pub _pad: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DirectionalLightUniforms {
    /// Biased (texture-space) shadow matrix.
    pub shadow_matrix: Mat4,
    pub color: Vec3,
    pub source_radius: f32,
    pub direction: Vec3,
    pub intensity: f32,
    pub shadow_resolution: f32,
    pub _pad: [f32; 3],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sizes_are_16_byte_multiples() {
        let sizes = [
            ("engine", size_of::<EngineUniforms>()),
            ("ssao", size_of::<SsaoUniforms>()),
            ("bloom", size_of::<BloomUniforms>()),
            ("post", size_of::<PostProcessUniforms>()),
            ("debug", size_of::<DebugUniforms>()),
            ("shadow", size_of::<ShadowMapUniforms>()),
            ("point", size_of::<PointLightUniforms>()),
            ("spot", size_of::<SpotLightUniforms>()),
            ("directional", size_of::<DirectionalLightUniforms>()),
        ];
        for (name, size) in sizes {
            assert_eq!(size % 16, 0, "{name} uniforms are {size} bytes");
        }
    }

    #[test]
    fn engine_uniform_layout() {
        assert_eq!(size_of::<EngineUniforms>(), 304);
        assert_eq!(size_of::<BloomUniforms>(), 48);
        assert_eq!(size_of::<SpotLightUniforms>(), 128);
    }
}
