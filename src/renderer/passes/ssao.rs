//! Screen-space ambient occlusion at half resolution, then a separate blur.
//!
//! When occlusion is not computed this frame (render mode or a missing
//! pipeline) the blurred target is cleared to full visibility instead, so the
//! lighting and debug passes never sample stale data.

use super::{PassContext, begin_scope, draw_quad, scaled_extent};
use crate::renderer::barriers;
use crate::renderer::core::{CommandRecorder, PipelineStages, RenderArea, RenderAttachment};
use crate::renderer::frame::FrameResourceSet;

const UNOCCLUDED: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Records SSAO + blur, or the clear fallback. Returns `true` when occlusion
/// was computed.
pub(crate) fn record(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    frame: &FrameResourceSet,
) -> bool {
    let area: RenderArea = scaled_extent(ctx.render_extent, 1).into();
    let pipelines = (
        ctx.quad_pipeline(ctx.resolved.ssao),
        ctx.quad_pipeline(ctx.resolved.ssao_blur),
    );
    let (Some(ssao), Some(blur)) = pipelines else {
        log::debug!("SSAO pipelines unavailable; clearing ambient occlusion");
        clear(recorder, frame, area);
        return false;
    };
    if !ctx.mode.renders_ssao() {
        clear(recorder, frame, area);
        return false;
    }

    let raw = frame.images.ambient_occlusion;
    let blurred = frame.images.blurred_ambient_occlusion;
    let sets = &frame.sets;

    recorder.pipeline_barrier(
        PipelineStages::TOP_OF_PIPE,
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[barriers::to_color_attachment(raw)],
    );
    begin_scope(
        recorder,
        "SSAO Pass",
        area,
        &[RenderAttachment::cleared_color(raw, UNOCCLUDED)],
        None,
    );
    recorder.bind_vertex_array(ctx.shared.quad);
    recorder.bind_graphics_pipeline(ssao);
    draw_quad(
        recorder,
        ssao,
        &[sets.engine, sets.ssao_gbuffer, ctx.shared.ssao_input_set],
    );
    recorder.end_rendering();

    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        PipelineStages::FRAGMENT_SHADER | PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[
            barriers::color_attachment_to_sampled(raw),
            barriers::to_color_attachment(blurred),
        ],
    );
    begin_scope(
        recorder,
        "SSAO Blur Pass",
        area,
        &[RenderAttachment::cleared_color(blurred, UNOCCLUDED)],
        None,
    );
    recorder.bind_vertex_array(ctx.shared.quad);
    recorder.bind_graphics_pipeline(blur);
    draw_quad(recorder, blur, &[sets.engine, sets.ssao_blur_input]);
    recorder.end_rendering();

    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        PipelineStages::FRAGMENT_SHADER,
        &[barriers::color_attachment_to_sampled(blurred)],
    );
    true
}

fn clear(recorder: &mut dyn CommandRecorder, frame: &FrameResourceSet, area: RenderArea) {
    let blurred = frame.images.blurred_ambient_occlusion;
    recorder.pipeline_barrier(
        PipelineStages::TOP_OF_PIPE,
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[barriers::to_color_attachment(blurred)],
    );
    begin_scope(
        recorder,
        "SSAO Clear",
        area,
        &[RenderAttachment::cleared_color(blurred, UNOCCLUDED)],
        None,
    );
    recorder.end_rendering();
    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        PipelineStages::FRAGMENT_SHADER,
        &[barriers::color_attachment_to_sampled(blurred)],
    );
}
