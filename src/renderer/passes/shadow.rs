//! Shadow Map Pass
//!
//! Runs in two phases so the scene is only borrowed mutably while lights are
//! updated:
//!
//! 1. **Prepare**: visit every spot and directional light, compute its
//!    light-space matrices, store the shadow matrix on the component, lazily
//!    resize its depth target and upload the depth-only uniform.
//! 2. **Record**: one depth-only scope per prepared light, drawn by the render
//!    queue with [`RenderPassKey::ShadowMap`].
//!
//! The lighting uniforms later use `SHADOW_BIAS × shadow matrix`, which maps
//! clip space to shadow-map texture space.

use glam::{Mat4, Vec3};
use smallvec::SmallVec;

use super::{PassContext, begin_scope};
use crate::errors::{RenderError, Result};
use crate::renderer::barriers;
use crate::renderer::core::{
    BindingWrite, CommandRecorder, DescriptorResource, DescriptorSetId, Extent2D, GraphicsCore,
    ImageId, PipelineStages, RenderAttachment,
};
use crate::renderer::queue::{RenderPassKey, RenderViewData};
use crate::renderer::uniforms::ShadowMapUniforms;
use crate::scene::{LightGpuResources, SceneView, WorldTransform, clamp_shadow_resolution};

/// Clip space `[-1, 1]` to texture space `[0, 1]` on X and Y.
pub const SHADOW_BIAS: Mat4 = Mat4::from_cols_array(&[
    0.5, 0.0, 0.0, 0.0, //
    0.0, 0.5, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.5, 0.5, 0.0, 1.0,
]);

pub const SPOT_NEAR_PLANE: f32 = 0.1;

/// Half-extent of the fixed orthographic box used for directional lights.
pub const DIRECTIONAL_HALF_EXTENT: f32 = 40.0;
/// Distance from the origin at which directional shadows are rendered from.
pub const DIRECTIONAL_DISTANCE: f32 = 100.0;
pub const DIRECTIONAL_FAR_PLANE: f32 = 160.0;

/// Light-space camera of one shadow map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightViewProjection {
    pub projection: Mat4,
    pub view: Mat4,
}

impl LightViewProjection {
    /// Unbiased projection × view.
    #[inline]
    #[must_use]
    pub fn shadow_matrix(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// `up`, or X when `up` is (nearly) parallel to `direction`.
fn stable_up(direction: Vec3, up: Vec3) -> Vec3 {
    if direction.cross(up).length_squared() < 1e-6 {
        Vec3::X
    } else {
        up
    }
}

/// Perspective view from the light along its forward axis, covering the
/// full cone (`2 × outer_angle`) out to the attenuation radius.
#[must_use]
pub fn spot_light_view_projection(
    transform: &WorldTransform,
    outer_angle: f32,
    attenuation_radius: f32,
) -> LightViewProjection {
    let forward = transform.forward;
    LightViewProjection {
        projection: Mat4::perspective_rh(
            2.0 * outer_angle,
            1.0,
            SPOT_NEAR_PLANE,
            attenuation_radius,
        ),
        view: Mat4::look_at_rh(
            transform.position,
            transform.position + forward,
            stable_up(forward, transform.up),
        ),
    }
}

/// Orthographic view looking at the origin from `-forward × 100`.
#[must_use]
pub fn directional_light_view_projection(transform: &WorldTransform) -> LightViewProjection {
    let forward = transform.forward;
    let h = DIRECTIONAL_HALF_EXTENT;
    LightViewProjection {
        projection: Mat4::orthographic_rh(-h, h, -h, h, 0.0, DIRECTIONAL_FAR_PLANE),
        view: Mat4::look_at_rh(
            forward * -DIRECTIONAL_DISTANCE,
            Vec3::ZERO,
            stable_up(forward, transform.up),
        ),
    }
}

// ============================================================================
// Prepare
// ============================================================================

struct ShadowJob {
    depth_target: ImageId,
    descriptor_set: DescriptorSetId,
    resolution: u32,
    camera: LightViewProjection,
}

/// Applies a shadow-resolution change and uploads the light's depth-only
/// uniform. Returns `None` for lights without a shadow map.
fn prepare_shadow_map(
    gpu: &dyn GraphicsCore,
    resources: &mut LightGpuResources,
    requested_resolution: u32,
    camera: LightViewProjection,
) -> Result<Option<ShadowJob>> {
    let Some(shadow) = resources.shadow.as_mut() else {
        return Ok(None);
    };

    let resolution = clamp_shadow_resolution(requested_resolution);
    if shadow.resolution != resolution {
        log::info!(
            "Resizing shadow map {}px -> {resolution}px (requested {requested_resolution})",
            shadow.resolution
        );
        // In-flight frames may still sample the old storage.
        gpu.wait_until_idle();
        let extent = Extent2D::new(resolution, resolution);
        gpu.resize_image(shadow.depth_target, extent)?;
        gpu.resize_framebuffer(shadow.framebuffer, extent)?;
        gpu.change_bindings(
            resources.descriptor_set,
            &[BindingWrite::new(
                1,
                DescriptorResource::SampledImage(shadow.depth_target),
            )],
        );
        shadow.resolution = resolution;
    }

    let uniforms = ShadowMapUniforms {
        light_view_projection: camera.shadow_matrix(),
    };
    gpu.upload_buffer(shadow.uniform_buffer, bytemuck::bytes_of(&uniforms));

    Ok(Some(ShadowJob {
        depth_target: shadow.depth_target,
        descriptor_set: shadow.descriptor_set,
        resolution,
        camera,
    }))
}

fn prepare(ctx: &PassContext<'_>, scene: &mut dyn SceneView) -> Result<Vec<ShadowJob>> {
    let mut jobs = Vec::new();
    let mut failure: Option<RenderError> = None;
    let adjusted = |mut camera: LightViewProjection| {
        ctx.gpu.adjust_perspective(&mut camera.projection);
        camera
    };

    scene.visit_spot_lights(&mut |transform, light| {
        let camera = adjusted(spot_light_view_projection(
            transform,
            light.outer_angle,
            light.attenuation_radius,
        ));
        light.shadow_matrix = camera.shadow_matrix();
        let Some(resources) = light.gpu.as_mut() else {
            log::warn!("Spot light has no GPU resources; shadow skipped");
            return;
        };
        match prepare_shadow_map(ctx.gpu, resources, light.shadow_resolution, camera) {
            Ok(job) => jobs.extend(job),
            Err(err) => failure = failure.take().or(Some(err)),
        }
    });

    scene.visit_directional_lights(&mut |transform, light| {
        let camera = adjusted(directional_light_view_projection(transform));
        light.shadow_matrix = camera.shadow_matrix();
        let Some(resources) = light.gpu.as_mut() else {
            log::warn!("Directional light has no GPU resources; shadow skipped");
            return;
        };
        match prepare_shadow_map(ctx.gpu, resources, light.shadow_resolution, camera) {
            Ok(job) => jobs.extend(job),
            Err(err) => failure = failure.take().or(Some(err)),
        }
    });

    match failure {
        Some(err) => Err(err),
        None => Ok(jobs),
    }
}

// ============================================================================
// Record
// ============================================================================

/// Renders every shadow map. Returns the depth targets left in the
/// depth-attachment layout, which the geometry pass makes readable.
pub(crate) fn record(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    scene: &mut dyn SceneView,
) -> Result<SmallVec<[ImageId; 8]>> {
    let jobs = prepare(ctx, scene)?;
    let mut rendered = SmallVec::new();
    if jobs.is_empty() {
        return Ok(rendered);
    }

    recorder.begin_debug_label("Shadow Maps", [0.3, 0.3, 0.3, 1.0]);
    for job in &jobs {
        let extent = Extent2D::new(job.resolution, job.resolution);
        // Shadow maps outlive frame sets; the previous frame's lighting may
        // still be sampling this one.
        recorder.pipeline_barrier(
            PipelineStages::FRAGMENT_SHADER,
            PipelineStages::EARLY_FRAGMENT_TESTS | PipelineStages::LATE_FRAGMENT_TESTS,
            &[barriers::sampled_depth_to_attachment_discard(job.depth_target)],
        );

        ctx.queue.set_engine_descriptor_set(job.descriptor_set);
        begin_scope(
            recorder,
            "Shadow Map Pass",
            extent.into(),
            &[],
            Some(RenderAttachment::cleared_depth(job.depth_target)),
        );
        let view = RenderViewData {
            projection: job.camera.projection,
            view: job.camera.view,
            render_area: extent.into(),
        };
        ctx.queue
            .render_queue(recorder, &view, &*scene, RenderPassKey::ShadowMap);
        recorder.end_rendering();
        rendered.push(job.depth_target);
    }
    recorder.end_debug_label();
    Ok(rendered)
}
