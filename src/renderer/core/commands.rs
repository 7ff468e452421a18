//! The command-recorder contract.
//!
//! Passes record into a [`CommandRecorder`]; submission and frame pacing stay
//! with the caller. The recorder performs no implicit synchronization, every
//! hazard is resolved by a barrier the renderer records itself.

use super::handles::{ComputePipelineId, DescriptorSetId, GraphicsPipelineId, VertexArrayId};
use super::types::{ImageBarrier, PipelineStages, RenderArea, RenderingInfo};

pub trait CommandRecorder {
    // === Render Scopes ===
    fn begin_rendering(&mut self, info: &RenderingInfo<'_>);
    fn end_rendering(&mut self);
    fn set_viewport(&mut self, area: RenderArea);
    fn set_scissor(&mut self, area: RenderArea);

    // === Graphics ===
    fn bind_vertex_array(&mut self, vertex_array: VertexArrayId);
    fn bind_graphics_pipeline(&mut self, pipeline: GraphicsPipelineId);
    fn bind_graphics_descriptor_sets(
        &mut self,
        pipeline: GraphicsPipelineId,
        first_set: u32,
        sets: &[DescriptorSetId],
    );
    fn draw_indexed(
        &mut self,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
        instance_count: u32,
    );

    // === Compute ===
    fn bind_compute_pipeline(&mut self, pipeline: ComputePipelineId);
    fn bind_compute_descriptor_sets(
        &mut self,
        pipeline: ComputePipelineId,
        first_set: u32,
        sets: &[DescriptorSetId],
    );
    fn dispatch(&mut self, x: u32, y: u32, z: u32);

    // === Synchronization ===
    fn pipeline_barrier(
        &mut self,
        src_stages: PipelineStages,
        dst_stages: PipelineStages,
        barriers: &[ImageBarrier],
    );

    // === Debug Labels ===
    fn begin_debug_label(&mut self, label: &str, color: [f32; 4]);
    fn end_debug_label(&mut self);
}
