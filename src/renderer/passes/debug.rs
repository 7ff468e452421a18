//! Debug visualization: one full-screen draw of a G-buffer channel, selected
//! by the render mode, straight into the output attachment.

use glam::Mat4;

use super::{PassContext, begin_scope, draw_quad};
use crate::renderer::barriers;
use crate::renderer::core::{CommandRecorder, PipelineStages, RenderAttachment};
use crate::renderer::frame::FrameResourceSet;
use crate::renderer::uniforms::DebugUniforms;

/// Near and far planes of a perspective projection with a `[0, 1]` depth
/// range.
#[must_use]
pub fn clip_planes(projection: &Mat4) -> (f32, f32) {
    let a = projection.z_axis.z;
    let b = projection.w_axis.z;
    (b / a, b / (a + 1.0))
}

pub(crate) fn record(
    ctx: &PassContext<'_>,
    recorder: &mut dyn CommandRecorder,
    frame: &FrameResourceSet,
    output: &RenderAttachment,
) {
    recorder.pipeline_barrier(
        PipelineStages::TOP_OF_PIPE,
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        &[barriers::to_color_attachment(output.image)],
    );

    if let Some(pipeline) = ctx.quad_pipeline(ctx.resolved.debug) {
        let (near_plane, far_plane) = clip_planes(&ctx.view.projection);
        let uniforms = DebugUniforms {
            render_mode: u32::from(ctx.mode.index()),
            near_plane,
            far_plane,
            _pad: 0.0,
        };
        ctx.gpu
            .upload_buffer(frame.uniforms.debug, bytemuck::bytes_of(&uniforms));

        begin_scope(recorder, "Debug Pass", ctx.render_area(), &[*output], None);
        recorder.bind_vertex_array(ctx.shared.quad);
        recorder.bind_graphics_pipeline(pipeline);
        draw_quad(recorder, pipeline, &[frame.sets.engine, frame.sets.debug]);
        recorder.end_rendering();
    } else {
        log::debug!("Debug pipeline unavailable; skipped");
    }

    recorder.pipeline_barrier(
        PipelineStages::COLOR_ATTACHMENT_OUTPUT,
        PipelineStages::FRAGMENT_SHADER,
        &[barriers::color_attachment_to_sampled(output.image)],
    );
}
