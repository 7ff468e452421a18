//! Scene components consumed by the renderer.
//!
//! The entity store lives outside this crate. The renderer sees it through
//! [`SceneView`]: read-only visits over environment maps, and visits over
//! lights that hand out the light component mutably (the renderer writes the
//! shadow matrix and resizes the light's own GPU objects, nothing else).

pub mod environment;
pub mod light;

use glam::{Mat4, Vec3};

pub use environment::EnvironmentMap;
pub use light::{
    DirectionalLight, LightGpuResources, LightKind, PointLight, ShadowMapResources, SpotLight,
    clamp_shadow_resolution,
};

/// World-space placement of a light entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub position: Vec3,
    /// Unit vector the entity faces (-Z in local space).
    pub forward: Vec3,
    /// Unit up vector (+Y in local space).
    pub up: Vec3,
}

impl WorldTransform {
    #[must_use]
    pub fn from_matrix(world: &Mat4) -> Self {
        Self {
            position: world.w_axis.truncate(),
            forward: world.transform_vector3(Vec3::NEG_Z).normalize_or(Vec3::NEG_Z),
            up: world.transform_vector3(Vec3::Y).normalize_or(Vec3::Y),
        }
    }
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self::from_matrix(&Mat4::IDENTITY)
    }
}

/// Component iteration over the scene being rendered.
pub trait SceneView {
    fn visit_environment_maps(&self, visit: &mut dyn FnMut(&EnvironmentMap));
    fn visit_point_lights(&mut self, visit: &mut dyn FnMut(&WorldTransform, &mut PointLight));
    fn visit_spot_lights(&mut self, visit: &mut dyn FnMut(&WorldTransform, &mut SpotLight));
    fn visit_directional_lights(
        &mut self,
        visit: &mut dyn FnMut(&WorldTransform, &mut DirectionalLight),
    );
}
