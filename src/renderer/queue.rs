//! Render-queue service contract.
//!
//! Scene geometry is not drawn by the renderer itself. Each geometry-bearing
//! pass hands a [`RenderPassKey`] to the external [`RenderQueue`] service, which
//! draws the matching meshes into whatever scope is currently open.

use glam::Mat4;

use crate::renderer::core::{CommandRecorder, DescriptorSetId, RenderArea};
use crate::scene::SceneView;

/// Which subset of scene geometry a queue submission draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderPassKey {
    /// Depth-only casters into a shadow map.
    ShadowMap,
    /// Opaque geometry into the G-buffer.
    Opaque,
    /// Forward-shaded unlit geometry.
    Unlit,
    Sky,
    Transparent,
}

/// Camera data a queue submission culls and sorts against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderViewData {
    pub projection: Mat4,
    pub view: Mat4,
    pub render_area: RenderArea,
}

/// Counters returned by one queue submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GeometryRenderStats {
    pub draw_calls: u32,
    pub triangles: u64,
    pub objects_culled: u32,
}

pub trait RenderQueue {
    fn render_queue(
        &self,
        recorder: &mut dyn CommandRecorder,
        view: &RenderViewData,
        scene: &dyn SceneView,
        pass: RenderPassKey,
    ) -> GeometryRenderStats;

    /// Selects the set bound at index 0 for subsequent queue draws.
    fn set_engine_descriptor_set(&self, set: DescriptorSetId);
}
