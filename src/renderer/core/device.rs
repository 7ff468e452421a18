//! The graphics-core contract.
//!
//! The renderer never talks to a GPU API directly. Everything it allocates goes
//! through [`GraphicsCore`], which a backend implements on top of its device.
//! All methods take `&self`: backends are expected to use interior mutability
//! the same way `wgpu::Device` does, so one core can be shared (via `Arc`)
//! between the renderer, light components and the rest of the engine.

use glam::Mat4;

use super::handles::{
    BufferId, DescriptorSetId, DescriptorSetLayoutId, FramebufferId, ImageId, RenderPassId,
    SamplerId, VertexArrayId,
};
use super::types::{
    BindingWrite, BufferDesc, DescriptorSetDesc, DescriptorSetLayoutDesc, Extent2D,
    FramebufferDesc, ImageDesc, RenderPassDesc, SamplerDesc, VertexArrayDesc,
};
use crate::errors::Result;

pub trait GraphicsCore {
    // === Images ===
    fn create_image(&self, desc: &ImageDesc<'_>) -> Result<ImageId>;
    /// Replaces the storage behind `image` while keeping the handle valid.
    /// The new storage starts in an undefined layout.
    fn resize_image(&self, image: ImageId, extent: Extent2D) -> Result<()>;
    fn delete_image(&self, image: ImageId);

    // === Buffers ===
    fn create_buffer(&self, desc: &BufferDesc<'_>) -> Result<BufferId>;
    fn upload_buffer(&self, buffer: BufferId, data: &[u8]);
    fn delete_buffer(&self, buffer: BufferId);

    // === Samplers ===
    fn create_sampler(&self, desc: &SamplerDesc) -> Result<SamplerId>;
    fn delete_sampler(&self, sampler: SamplerId);

    // === Descriptor Sets ===
    fn create_descriptor_set_layout(
        &self,
        desc: &DescriptorSetLayoutDesc<'_>,
    ) -> Result<DescriptorSetLayoutId>;
    fn delete_descriptor_set_layout(&self, layout: DescriptorSetLayoutId);
    fn create_descriptor_set(&self, desc: &DescriptorSetDesc<'_>) -> Result<DescriptorSetId>;
    /// Rewrites the listed bindings of an existing set; others are untouched.
    fn change_bindings(&self, set: DescriptorSetId, writes: &[BindingWrite]);
    fn delete_descriptor_set(&self, set: DescriptorSetId);

    // === Render Passes & Framebuffers ===
    fn create_render_pass(&self, desc: &RenderPassDesc<'_>) -> Result<RenderPassId>;
    fn delete_render_pass(&self, render_pass: RenderPassId);
    fn create_framebuffer(&self, desc: &FramebufferDesc<'_>) -> Result<FramebufferId>;
    fn resize_framebuffer(&self, framebuffer: FramebufferId, extent: Extent2D) -> Result<()>;
    fn delete_framebuffer(&self, framebuffer: FramebufferId);

    // === Geometry ===
    fn create_vertex_array(&self, desc: &VertexArrayDesc<'_>) -> Result<VertexArrayId>;
    fn delete_vertex_array(&self, vertex_array: VertexArrayId);

    // === Synchronization ===
    /// Blocks until all submitted GPU work has completed.
    fn wait_until_idle(&self);

    /// Applies backend clip-space conventions (e.g. a Y flip) to a projection.
    fn adjust_perspective(&self, _projection: &mut Mat4) {}
}
