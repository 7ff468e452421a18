//! Post-Process Chain
//!
//! ```text
//! lit HDR ─▶ [SSR] ─▶ [DOF] ─▶ bloom ─▶ Tonemap Pass ─▶ output
//! ```
//!
//! SSR and DOF run only when their targets were allocated
//! ([`PostProcessFeatures`](crate::renderer::settings::PostProcessFeatures))
//! and their pipelines are available. The tonemap pass samples the bloom
//! output when bloom ran this frame and the black fallback otherwise.

use super::{PassContext, begin_scope, draw_quad, scaled_extent};
use crate::renderer::barriers;
use crate::renderer::bloom::BloomChain;
use crate::renderer::core::{
    CommandRecorder, DescriptorSetId, PipelineStages, RenderArea, RenderAttachment,
};
use crate::renderer::frame::{FrameResourceSet, ReflectionTargets};
use crate::renderer::uniforms::PostProcessUniforms;
use crate::resources::PostProcessSettings;

const TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

pub(crate) fn record(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    frame: &mut FrameResourceSet,
    chain: &BloomChain,
    settings: &PostProcessSettings,
    output: &RenderAttachment,
) {
    if let Some(reflections) = frame.reflections.as_ref() {
        screen_space_reflections(ctx, recorder, frame.sets.engine, reflections);
    }
    depth_of_field(ctx, recorder, frame);

    let bloom_ran = match ctx.compute_pipeline(ctx.resolved.bloom) {
        Some(pipeline) => frame
            .bloom
            .record(chain, recorder, pipeline, ctx.render_extent),
        None => {
            log::debug!("Bloom pipeline unavailable; skipped");
            false
        }
    };
    let bloom_source = bloom_ran
        .then(|| frame.bloom.output())
        .flatten()
        .unwrap_or(ctx.shared.black_texture);
    frame.tonemap_bloom.update(ctx.gpu, bloom_source);

    tonemap(ctx, recorder, frame, settings, output);
}

fn screen_space_reflections(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    engine: DescriptorSetId,
    reflections: &ReflectionTargets,
) {
    let Some(pipeline) = ctx.compute_pipeline(ctx.resolved.screen_space_reflections) else {
        log::debug!("Screen-space reflection pipeline unavailable; skipped");
        return;
    };

    recorder.begin_debug_label("Screen Space Reflections", [0.5, 0.7, 1.0, 1.0]);
    recorder.pipeline_barrier(
        PipelineStages::FRAGMENT_SHADER,
        PipelineStages::COMPUTE_SHADER,
        &[barriers::to_storage(reflections.output)],
    );
    recorder.bind_compute_pipeline(pipeline);
    recorder.bind_compute_descriptor_sets(pipeline, 0, &[engine, reflections.set]);
    let (x, y) = ctx.render_extent.workgroups_4x4();
    recorder.dispatch(x, y, 1);
    recorder.pipeline_barrier(
        PipelineStages::COMPUTE_SHADER,
        PipelineStages::FRAGMENT_SHADER,
        &[barriers::storage_to_sampled(reflections.output)],
    );
    recorder.end_debug_label();
}

fn depth_of_field(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    frame: &FrameResourceSet,
) {
    let Some(dof) = frame.depth_of_field.as_ref() else {
        return;
    };
    let r = ctx.resolved;
    let (Some(separation), Some(blur), Some(combination)) = (
        ctx.quad_pipeline(r.dof_separation),
        ctx.quad_pipeline(r.dof_blur),
        ctx.quad_pipeline(r.dof_combination),
    ) else {
        log::debug!("Depth-of-field pipelines unavailable; skipped");
        return;
    };

    let engine = frame.sets.engine;
    let lit_hdr = frame.images.lit_hdr;
    let half: RenderArea = scaled_extent(ctx.render_extent, 1).into();
    let quarter: RenderArea = scaled_extent(ctx.render_extent, 2).into();

    recorder.begin_debug_label("Depth of Field", [0.7, 0.5, 1.0, 1.0]);

    // Split into near and far fields.
    recorder.pipeline_barrier(
        PipelineStages::TOP_OF_PIPE,
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[
            barriers::to_color_attachment(dof.near),
            barriers::to_color_attachment(dof.far),
        ],
    );
    begin_scope(
        recorder,
        "DOF Separation Pass",
        half,
        &[
            RenderAttachment::cleared_color(dof.near, TRANSPARENT),
            RenderAttachment::cleared_color(dof.far, TRANSPARENT),
        ],
        None,
    );
    recorder.bind_vertex_array(ctx.shared.quad);
    recorder.bind_graphics_pipeline(separation);
    draw_quad(recorder, separation, &[engine, dof.source_set]);
    recorder.end_rendering();

    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        PipelineStages::FRAGMENT_SHADER | PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[
            barriers::color_attachment_to_sampled(dof.near),
            barriers::color_attachment_to_sampled(dof.far),
            barriers::to_color_attachment(dof.near_blurred),
            barriers::to_color_attachment(dof.far_blurred),
        ],
    );
    for (label, target, set) in [
        ("DOF Blur Near Pass", dof.near_blurred, dof.near_blur_set),
        ("DOF Blur Far Pass", dof.far_blurred, dof.far_blur_set),
    ] {
        begin_scope(
            recorder,
            label,
            quarter,
            &[RenderAttachment::cleared_color(target, TRANSPARENT)],
            None,
        );
        recorder.bind_vertex_array(ctx.shared.quad);
        recorder.bind_graphics_pipeline(blur);
        draw_quad(recorder, blur, &[engine, set]);
        recorder.end_rendering();
    }

    // Blend the blurred fields back over the lit image.
    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT | PipelineStages::FRAGMENT_SHADER,
        PipelineStages::FRAGMENT_SHADER | PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[
            barriers::color_attachment_to_sampled(dof.near_blurred),
            barriers::color_attachment_to_sampled(dof.far_blurred),
            barriers::sampled_to_color_attachment(lit_hdr),
        ],
    );
    begin_scope(
        recorder,
        "DOF Combination Pass",
        ctx.render_area(),
        &[RenderAttachment::loaded_color(lit_hdr)],
        None,
    );
    recorder.bind_vertex_array(ctx.shared.quad);
    recorder.bind_graphics_pipeline(combination);
    draw_quad(recorder, combination, &[engine, dof.combine_set]);
    recorder.end_rendering();
    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        PipelineStages::FRAGMENT_SHADER | PipelineStages::COMPUTE_SHADER,
        &[barriers::color_attachment_to_sampled(lit_hdr)],
    );

    recorder.end_debug_label();
}

fn post_process_uniforms(settings: &PostProcessSettings) -> PostProcessUniforms {
    PostProcessUniforms {
        vignette_color: settings.vignette_color,
        vignette_radius: settings.vignette_radius(),
        vignette_softness: settings.vignette_softness(),
        grain_amount: settings.grain_amount(),
        grain_pixel_size: settings.grain_pixel_size(),
        chromatic_distortion_red: settings.chromatic_distortion_red,
        chromatic_distortion_green: settings.chromatic_distortion_green,
        chromatic_distortion_blue: settings.chromatic_distortion_blue,
        panini_strength: settings.panini_strength(),
        is_animated: u32::from(settings.animated),
    }
}

fn tonemap(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    frame: &FrameResourceSet,
    settings: &PostProcessSettings,
    output: &RenderAttachment,
) {
    recorder.pipeline_barrier(
        PipelineStages::TOP_OF_PIPE,
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[barriers::to_color_attachment(output.image)],
    );

    match ctx.quad_pipeline(ctx.resolved.tonemap) {
        Some(pipeline) => {
            ctx.gpu.upload_buffer(
                frame.uniforms.tonemap,
                bytemuck::bytes_of(&post_process_uniforms(settings)),
            );
            begin_scope(recorder, "Tonemap Pass", ctx.render_area(), &[*output], None);
            recorder.bind_vertex_array(ctx.shared.quad);
            recorder.bind_graphics_pipeline(pipeline);
            draw_quad(
                recorder,
                pipeline,
                &[frame.sets.engine, frame.sets.gbuffer, frame.sets.tonemap],
            );
            recorder.end_rendering();
        }
        None => log::debug!("Tonemap pipeline unavailable; skipped"),
    }

    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        PipelineStages::FRAGMENT_SHADER,
        &[barriers::color_attachment_to_sampled(output.image)],
    );
}
