//! Frame passes.
//!
//! Each submodule records one stage of the frame into a [`CommandRecorder`].
//! Passes are free functions over a [`PassContext`] plus the frame set they
//! render with. They look up their pipelines every frame and skip themselves
//! when one is missing.
//!
//! ```text
//! shadow ─▶ geometry ─▶ ssao ─▶ lighting ─▶ forward ─┬─▶ post_process ─▶ output
//!                                                     └─▶ debug ─────────▶ output
//! ```

pub mod debug;
pub mod geometry;
pub mod lighting;
pub mod post_process;
pub mod shadow;
pub mod ssao;

use crate::renderer::core::{
    AssetRef, CommandRecorder, ComputePipelineId, DescriptorSetId, Extent2D, GraphicsCore,
    GraphicsPipelineId, RenderArea, RenderAttachment, RenderingInfo,
};
use crate::renderer::pipeline::{AssetLibrary, QUAD_INDEX_COUNT, QUAD_VERTEX_LAYOUT, ResolvedAssets};
use crate::renderer::queue::{RenderQueue, RenderViewData};
use crate::renderer::settings::RenderMode;
use crate::renderer::shared::SharedResources;

/// Everything a pass reads besides its frame set.
pub(crate) struct PassContext<'a> {
    pub gpu: &'a dyn GraphicsCore,
    pub queue: &'a dyn RenderQueue,
    pub assets: &'a dyn AssetLibrary,
    pub resolved: &'a ResolvedAssets,
    pub shared: &'a SharedResources,
    pub mode: RenderMode,
    /// Size rendered this frame.
    pub render_extent: Extent2D,
    pub view: RenderViewData,
}

impl PassContext<'_> {
    /// Screen-space graphics pipeline for the full-screen quad.
    pub fn quad_pipeline(&self, asset: AssetRef) -> Option<GraphicsPipelineId> {
        self.assets.graphics_pipeline(asset, &QUAD_VERTEX_LAYOUT)
    }

    pub fn compute_pipeline(&self, asset: AssetRef) -> Option<ComputePipelineId> {
        self.assets.compute_pipeline(asset)
    }

    #[must_use]
    pub fn render_area(&self) -> RenderArea {
        self.render_extent.into()
    }
}

/// Opens a render scope covering `area` and sets a matching viewport.
pub(crate) fn begin_scope(
    recorder: &mut dyn CommandRecorder,
    label: &str,
    area: RenderArea,
    color_attachments: &[RenderAttachment],
    depth_attachment: Option<RenderAttachment>,
) {
    recorder.begin_rendering(&RenderingInfo {
        label,
        area,
        color_attachments,
        depth_attachment,
    });
    recorder.set_viewport(area);
    recorder.set_scissor(area);
}

/// Binds `sets` from index 0 and draws the full-screen quad.
pub(crate) fn draw_quad(
    recorder: &mut dyn CommandRecorder,
    pipeline: GraphicsPipelineId,
    sets: &[DescriptorSetId],
) {
    recorder.bind_graphics_descriptor_sets(pipeline, 0, sets);
    recorder.draw_indexed(QUAD_INDEX_COUNT, 0, 0, 1);
}

/// Extent scaled down by `2^halvings`, never below 1×1.
pub(crate) fn scaled_extent(extent: Extent2D, halvings: u32) -> Extent2D {
    let mut e = extent;
    for _ in 0..halvings {
        e = e.half();
    }
    e.max(Extent2D::new(1, 1))
}
