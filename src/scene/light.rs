use glam::{Mat4, Vec3};

use crate::renderer::core::{
    BufferId, DescriptorSetId, FramebufferId, ImageId, RenderPassId, ResourceScope,
};

/// Smallest shadow-map edge the renderer allocates.
pub const MIN_SHADOW_RESOLUTION: u32 = 8;
/// Largest shadow-map edge the renderer allocates.
pub const MAX_SHADOW_RESOLUTION: u32 = 16192;

/// Clamps a requested shadow-map edge into the supported range.
#[inline]
#[must_use]
pub fn clamp_shadow_resolution(requested: u32) -> u32 {
    requested.clamp(MIN_SHADOW_RESOLUTION, MAX_SHADOW_RESOLUTION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightKind {
    Point,
    Spot,
    Directional,
}

impl LightKind {
    /// Point-light shadows are not implemented.
    #[must_use]
    pub const fn casts_shadows(self) -> bool {
        matches!(self, Self::Spot | Self::Directional)
    }
}

// ============================================================================
// GPU Resources
// ============================================================================

/// Depth-only render target a shadow-casting light renders into.
#[derive(Debug)]
pub struct ShadowMapResources {
    pub render_pass: RenderPassId,
    pub depth_target: ImageId,
    pub framebuffer: FramebufferId,
    /// Holds the light's view-projection for the depth-only draw.
    pub uniform_buffer: BufferId,
    /// Bound at index 0 while the shadow map is rendered.
    pub descriptor_set: DescriptorSetId,
    /// Edge length currently allocated.
    pub resolution: u32,
}

/// GPU objects owned by one light component.
///
/// Created by [`DeferredRenderer::create_light_resources`](crate::DeferredRenderer::create_light_resources).
/// Dropping the value releases everything.
#[derive(Debug)]
pub struct LightGpuResources {
    pub kind: LightKind,
    /// Per-light lighting uniform.
    pub uniform_buffer: BufferId,
    /// Binding 0: lighting uniform. Binding 1 (shadowed kinds): shadow map.
    pub descriptor_set: DescriptorSetId,
    pub shadow: Option<ShadowMapResources>,
    _scope: ResourceScope,
}

impl LightGpuResources {
    pub(crate) fn new(
        kind: LightKind,
        uniform_buffer: BufferId,
        descriptor_set: DescriptorSetId,
        shadow: Option<ShadowMapResources>,
        scope: ResourceScope,
    ) -> Self {
        Self {
            kind,
            uniform_buffer,
            descriptor_set,
            shadow,
            _scope: scope,
        }
    }
}

// ============================================================================
// Light Components
// ============================================================================

#[derive(Debug)]
pub struct PointLight {
    pub color: Vec3,
    pub intensity: f32,
    pub attenuation_radius: f32,
    pub gpu: Option<LightGpuResources>,
}

impl PointLight {
    #[must_use]
    pub fn new(color: Vec3, intensity: f32, attenuation_radius: f32) -> Self {
        Self {
            color,
            intensity,
            attenuation_radius,
            gpu: None,
        }
    }
}

#[derive(Debug)]
pub struct SpotLight {
    pub color: Vec3,
    pub intensity: f32,
    pub attenuation_radius: f32,
    /// Full-intensity half angle, radians.
    pub inner_angle: f32,
    /// Cut-off half angle, radians.
    pub outer_angle: f32,
    /// Requested shadow-map edge; clamped when applied.
    pub shadow_resolution: u32,
    /// Light-space projection × view from the last shadow pass.
    pub shadow_matrix: Mat4,
    pub gpu: Option<LightGpuResources>,
}

impl SpotLight {
    #[must_use]
    pub fn new(
        color: Vec3,
        intensity: f32,
        attenuation_radius: f32,
        inner_angle: f32,
        outer_angle: f32,
    ) -> Self {
        Self {
            color,
            intensity,
            attenuation_radius,
            inner_angle,
            outer_angle,
            shadow_resolution: 1024,
            shadow_matrix: Mat4::IDENTITY,
            gpu: None,
        }
    }
}

#[derive(Debug)]
pub struct DirectionalLight {
    pub color: Vec3,
    pub intensity: f32,
    /// Angular source size used for soft shadow filtering.
    pub source_radius: f32,
    pub shadow_resolution: u32,
    pub shadow_matrix: Mat4,
    pub gpu: Option<LightGpuResources>,
}

impl DirectionalLight {
    #[must_use]
    pub fn new(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            source_radius: 0.0,
            shadow_resolution: 2048,
            shadow_matrix: Mat4::IDENTITY,
            gpu: None,
        }
    }
}
