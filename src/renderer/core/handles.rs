//! GPU object handles.
//!
//! Every object the renderer talks about is named by a small `Copy` key minted
//! by the collaborator that owns it (the graphics core for images, buffers and
//! descriptor sets; the asset library for pipelines and asset references).
//! Keys are generational, so a handle to a deleted object never aliases a
//! newer one.

use slotmap::new_key_type;

new_key_type! {
    /// A GPU image (render target, depth target or sampled texture).
    pub struct ImageId;
    /// A GPU buffer (uniform, vertex or index data).
    pub struct BufferId;
    /// A texture sampler.
    pub struct SamplerId;
    /// A descriptor set layout.
    pub struct DescriptorSetLayoutId;
    /// A bound group of buffers, images and samplers.
    pub struct DescriptorSetId;
    /// A render pass object (used by shadow-map framebuffers).
    pub struct RenderPassId;
    /// A framebuffer wrapping one or more images.
    pub struct FramebufferId;
    /// A vertex + index buffer pair with its vertex layout.
    pub struct VertexArrayId;
    /// A compiled graphics pipeline.
    pub struct GraphicsPipelineId;
    /// A compiled compute pipeline.
    pub struct ComputePipelineId;
    /// A logical asset reference resolved from an address string.
    pub struct AssetRef;
}
