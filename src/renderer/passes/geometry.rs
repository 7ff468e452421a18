//! G-Buffer pass: opaque geometry into albedo, normal, specular-roughness and
//! depth at the render extent.

use super::{PassContext, begin_scope};
use crate::renderer::barriers;
use crate::renderer::core::{CommandRecorder, ImageBarrier, ImageId, PipelineStages, RenderAttachment};
use crate::renderer::frame::FrameResourceSet;
use crate::renderer::queue::RenderPassKey;
use crate::scene::SceneView;

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 0.0];

pub(crate) fn record(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    scene: &dyn SceneView,
    frame: &mut FrameResourceSet,
    shadow_maps: &[ImageId],
) {
    let gbuffer = frame.images.gbuffer;
    let colors = gbuffer.colors();

    let mut to_write: Vec<ImageBarrier> =
        colors.iter().copied().map(barriers::to_color_attachment).collect();
    to_write.push(barriers::to_depth_attachment(gbuffer.depth));
    recorder.pipeline_barrier(
        PipelineStages::TOP_OF_PIPE,
        PipelineStages::COLOR_ATTACHMENT_OUTPUT | PipelineStages::EARLY_FRAGMENT_TESTS,
        &to_write,
    );

    let attachments = colors.map(|image| RenderAttachment::cleared_color(image, CLEAR_COLOR));
    begin_scope(
        recorder,
        "Geometry Pass",
        ctx.render_area(),
        &attachments,
        Some(RenderAttachment::cleared_depth(gbuffer.depth)),
    );
    frame.stats.opaque = ctx
        .queue
        .render_queue(recorder, &ctx.view, scene, RenderPassKey::Opaque);
    recorder.end_rendering();

    let mut to_read: Vec<ImageBarrier> = colors
        .iter()
        .copied()
        .map(barriers::color_attachment_to_sampled)
        .collect();
    to_read.push(barriers::depth_attachment_to_read_only(gbuffer.depth));
    to_read.extend(
        shadow_maps
            .iter()
            .copied()
            .map(barriers::depth_attachment_to_read_only),
    );
    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT | PipelineStages::LATE_FRAGMENT_TESTS,
        PipelineStages::FRAGMENT_SHADER,
        &to_read,
    );
}
