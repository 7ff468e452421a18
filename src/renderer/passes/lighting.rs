//! Lighting and forward passes.
//!
//! ```text
//! Lighting Pass (lit HDR cleared, depth sampled read-only)
//!   ├─ image-based lighting   [engine, gbuffer, ambient occlusion]
//!   ├─ point lights           [engine, gbuffer, light]   additive
//!   ├─ spot lights            [engine, gbuffer, light]   additive
//!   └─ directional lights     [engine, gbuffer, light]   additive
//! Forward Pass (lit HDR loaded, depth loaded + writable)
//!   └─ unlit, sky, transparent queues
//! ```

use super::shadow::SHADOW_BIAS;
use super::{PassContext, begin_scope, draw_quad};
use crate::renderer::barriers;
use crate::renderer::core::{
    AssetRef, CommandRecorder, DescriptorSetId, GraphicsPipelineId, PipelineStages, RenderAttachment,
};
use crate::renderer::frame::FrameResourceSet;
use crate::renderer::queue::{GeometryRenderStats, RenderPassKey};
use crate::renderer::settings::RenderMode;
use crate::renderer::uniforms::{DirectionalLightUniforms, PointLightUniforms, SpotLightUniforms};
use crate::scene::{SceneView, clamp_shadow_resolution};

const LIT_CLEAR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

pub(crate) fn record_lighting(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    scene: &mut dyn SceneView,
    frame: &mut FrameResourceSet,
) {
    let lit_hdr = frame.images.lit_hdr;
    recorder.pipeline_barrier(
        PipelineStages::TOP_OF_PIPE,
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[barriers::to_color_attachment(lit_hdr)],
    );
    begin_scope(
        recorder,
        "Lighting Pass",
        ctx.render_area(),
        &[RenderAttachment::cleared_color(lit_hdr, LIT_CLEAR)],
        None,
    );

    if ctx.mode == RenderMode::Default {
        recorder.bind_vertex_array(ctx.shared.quad);
        image_based_lighting(ctx, recorder, scene, frame);
        let base = [frame.sets.engine, frame.sets.gbuffer];
        point_lights(ctx, recorder, scene, base);
        spot_lights(ctx, recorder, scene, base);
        directional_lights(ctx, recorder, scene, base);
    }

    recorder.end_rendering();
}

fn image_based_lighting(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    scene: &dyn SceneView,
    frame: &mut FrameResourceSet,
) {
    let mut specular = None;
    scene.visit_environment_maps(&mut |environment| {
        if specular.is_none() {
            specular = environment.specular;
        }
    });
    let Some(specular) = specular else {
        // The previous map may be destroyed once the scene drops it.
        if frame.environment_map.update(ctx.gpu, ctx.shared.black_texture) {
            log::debug!("Frame set {}: environment map released", frame.index());
        }
        return;
    };

    let Some(pipeline) = ctx.quad_pipeline(ctx.resolved.image_based_lighting) else {
        log::debug!("Image-based lighting pipeline unavailable; skipped");
        return;
    };

    if frame.environment_map.update(ctx.gpu, specular) {
        log::debug!("Frame set {}: environment map rebound", frame.index());
    }
    if let Some(lut) = ctx.assets.texture(ctx.resolved.brdf_lut) {
        frame.brdf_lut.update(ctx.gpu, lut);
    }

    recorder.begin_debug_label("Image Based Lighting", [0.6, 0.8, 1.0, 1.0]);
    recorder.bind_graphics_pipeline(pipeline);
    draw_quad(
        recorder,
        pipeline,
        &[
            frame.sets.engine,
            frame.sets.gbuffer,
            frame.sets.ambient_occlusion,
        ],
    );
    recorder.end_debug_label();
}

fn light_pipeline(
    ctx: &PassContext<'_>,
    asset: AssetRef,
    name: &str,
) -> Option<GraphicsPipelineId> {
    let pipeline = ctx.quad_pipeline(asset);
    if pipeline.is_none() {
        log::debug!("{name} pipeline unavailable; skipped");
    }
    pipeline
}

fn draw_light(
    recorder: &mut dyn CommandRecorder,
    pipeline: GraphicsPipelineId,
    [engine, gbuffer]: [DescriptorSetId; 2],
    light: DescriptorSetId,
) {
    draw_quad(recorder, pipeline, &[engine, gbuffer, light]);
}

fn point_lights(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    scene: &mut dyn SceneView,
    base: [DescriptorSetId; 2],
) {
    let Some(pipeline) = light_pipeline(ctx, ctx.resolved.point_light, "Point light") else {
        return;
    };
    recorder.begin_debug_label("Point Lighting", [1.0, 1.0, 0.8, 1.0]);
    recorder.bind_graphics_pipeline(pipeline);
    scene.visit_point_lights(&mut |transform, light| {
        let Some(resources) = light.gpu.as_ref() else {
            log::warn!("Point light has no GPU resources; skipped");
            return;
        };
        let uniforms = PointLightUniforms {
            color: light.color,
            attenuation_radius: light.attenuation_radius,
            position: transform.position,
            intensity: light.intensity,
        };
        ctx.gpu
            .upload_buffer(resources.uniform_buffer, bytemuck::bytes_of(&uniforms));
        draw_light(recorder, pipeline, base, resources.descriptor_set);
    });
    recorder.end_debug_label();
}

fn spot_lights(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    scene: &mut dyn SceneView,
    base: [DescriptorSetId; 2],
) {
    let Some(pipeline) = light_pipeline(ctx, ctx.resolved.spot_light, "Spot light") else {
        return;
    };
    recorder.begin_debug_label("Spot Lighting", [1.0, 0.9, 0.6, 1.0]);
    recorder.bind_graphics_pipeline(pipeline);
    scene.visit_spot_lights(&mut |transform, light| {
        let Some(resources) = light.gpu.as_ref() else {
            log::warn!("Spot light has no GPU resources; skipped");
            return;
        };
        let uniforms = SpotLightUniforms {
            shadow_matrix: SHADOW_BIAS * light.shadow_matrix,
            color: light.color,
            attenuation_radius: light.attenuation_radius,
            position: transform.position,
            intensity: light.intensity,
            direction: transform.forward,
            inner_angle_cos: light.inner_angle.cos(),
            outer_angle_cos: light.outer_angle.cos(),
            shadow_resolution: clamp_shadow_resolution(light.shadow_resolution) as f32,
            _pad: [0.0; 2],
        };
        ctx.gpu
            .upload_buffer(resources.uniform_buffer, bytemuck::bytes_of(&uniforms));
        draw_light(recorder, pipeline, base, resources.descriptor_set);
    });
    recorder.end_debug_label();
}

fn directional_lights(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    scene: &mut dyn SceneView,
    base: [DescriptorSetId; 2],
) {
    let Some(pipeline) =
        light_pipeline(ctx, ctx.resolved.directional_light, "Directional light")
    else {
        return;
    };
    recorder.begin_debug_label("Directional Lighting", [1.0, 1.0, 1.0, 1.0]);
    recorder.bind_graphics_pipeline(pipeline);
    scene.visit_directional_lights(&mut |transform, light| {
        let Some(resources) = light.gpu.as_ref() else {
            log::warn!("Directional light has no GPU resources; skipped");
            return;
        };
        let uniforms = DirectionalLightUniforms {
            shadow_matrix: SHADOW_BIAS * light.shadow_matrix,
            color: light.color,
            source_radius: light.source_radius,
            direction: transform.forward,
            intensity: light.intensity,
            shadow_resolution: clamp_shadow_resolution(light.shadow_resolution) as f32,
            _pad: [0.0; 3],
        };
        ctx.gpu
            .upload_buffer(resources.uniform_buffer, bytemuck::bytes_of(&uniforms));
        draw_light(recorder, pipeline, base, resources.descriptor_set);
    });
    recorder.end_debug_label();
}

// ============================================================================
// Forward Pass
// ============================================================================

/// Forward-shaded geometry on top of the lit image, sharing the G-buffer
/// depth. Leaves lit HDR and depth shader-readable.
pub(crate) fn record_forward(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    scene: &dyn SceneView,
    frame: &mut FrameResourceSet,
) {
    let lit_hdr = frame.images.lit_hdr;
    let depth = frame.images.gbuffer.depth;

    recorder.pipeline_barrier(
        PipelineStages::FRAGMENT_SHADER,
        PipelineStages::EARLY_FRAGMENT_TESTS | PipelineStages::LATE_FRAGMENT_TESTS,
        &[barriers::depth_read_only_to_attachment(depth)],
    );
    begin_scope(
        recorder,
        "Forward Pass",
        ctx.render_area(),
        &[RenderAttachment::loaded_color(lit_hdr)],
        Some(RenderAttachment::loaded_depth(depth)),
    );

    let stats = &mut frame.stats;
    stats.unlit = ctx
        .queue
        .render_queue(recorder, &ctx.view, scene, RenderPassKey::Unlit);
    if ctx.mode == RenderMode::Default {
        stats.sky = ctx
            .queue
            .render_queue(recorder, &ctx.view, scene, RenderPassKey::Sky);
        stats.transparent =
            ctx.queue
                .render_queue(recorder, &ctx.view, scene, RenderPassKey::Transparent);
    } else {
        stats.sky = GeometryRenderStats::default();
        stats.transparent = GeometryRenderStats::default();
    }
    recorder.end_rendering();

    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT | PipelineStages::LATE_FRAGMENT_TESTS,
        PipelineStages::FRAGMENT_SHADER | PipelineStages::COMPUTE_SHADER,
        &[
            barriers::color_attachment_to_sampled(lit_hdr),
            barriers::depth_attachment_to_read_only(depth),
        ],
    );
}
