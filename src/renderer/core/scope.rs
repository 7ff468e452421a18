//! Scoped ownership of GPU objects.
//!
//! A [`ResourceScope`] creates objects through the graphics core and remembers
//! every handle it handed out. Dropping the scope deletes them in reverse
//! creation order, so descriptor sets go before the images they reference and
//! teardown never needs hand-matched delete calls.
//!
//! ```text
//! FrameResourceSet ──owns──▶ ResourceScope ──▶ [image, image, buffer, set, set]
//!                                                        ▲ released last-to-first
//! ```

use std::sync::Arc;

use super::device::GraphicsCore;
use super::handles::{
    BufferId, DescriptorSetId, DescriptorSetLayoutId, FramebufferId, ImageId, RenderPassId,
    SamplerId, VertexArrayId,
};
use super::types::{
    BufferDesc, DescriptorSetDesc, DescriptorSetLayoutDesc, FramebufferDesc, ImageDesc,
    RenderPassDesc, SamplerDesc, VertexArrayDesc,
};
use crate::errors::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnedObject {
    Image(ImageId),
    Buffer(BufferId),
    Sampler(SamplerId),
    DescriptorSetLayout(DescriptorSetLayoutId),
    DescriptorSet(DescriptorSetId),
    RenderPass(RenderPassId),
    Framebuffer(FramebufferId),
    VertexArray(VertexArrayId),
}

/// Owns a group of GPU objects with a shared lifetime.
pub struct ResourceScope {
    gpu: Arc<dyn GraphicsCore>,
    owned: Vec<OwnedObject>,
}

impl ResourceScope {
    #[must_use]
    pub fn new(gpu: Arc<dyn GraphicsCore>) -> Self {
        Self {
            gpu,
            owned: Vec::new(),
        }
    }

    /// The graphics core objects are created on.
    #[inline]
    #[must_use]
    pub fn gpu(&self) -> &Arc<dyn GraphicsCore> {
        &self.gpu
    }

    /// Number of live objects owned by the scope.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.owned.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    pub fn image(&mut self, desc: &ImageDesc<'_>) -> Result<ImageId> {
        let id = self.gpu.create_image(desc)?;
        self.owned.push(OwnedObject::Image(id));
        Ok(id)
    }

    pub fn buffer(&mut self, desc: &BufferDesc<'_>) -> Result<BufferId> {
        let id = self.gpu.create_buffer(desc)?;
        self.owned.push(OwnedObject::Buffer(id));
        Ok(id)
    }

    pub fn sampler(&mut self, desc: &SamplerDesc) -> Result<SamplerId> {
        let id = self.gpu.create_sampler(desc)?;
        self.owned.push(OwnedObject::Sampler(id));
        Ok(id)
    }

    pub fn descriptor_set_layout(
        &mut self,
        desc: &DescriptorSetLayoutDesc<'_>,
    ) -> Result<DescriptorSetLayoutId> {
        let id = self.gpu.create_descriptor_set_layout(desc)?;
        self.owned.push(OwnedObject::DescriptorSetLayout(id));
        Ok(id)
    }

    pub fn descriptor_set(&mut self, desc: &DescriptorSetDesc<'_>) -> Result<DescriptorSetId> {
        let id = self.gpu.create_descriptor_set(desc)?;
        self.owned.push(OwnedObject::DescriptorSet(id));
        Ok(id)
    }

    pub fn render_pass(&mut self, desc: &RenderPassDesc<'_>) -> Result<RenderPassId> {
        let id = self.gpu.create_render_pass(desc)?;
        self.owned.push(OwnedObject::RenderPass(id));
        Ok(id)
    }

    pub fn framebuffer(&mut self, desc: &FramebufferDesc<'_>) -> Result<FramebufferId> {
        let id = self.gpu.create_framebuffer(desc)?;
        self.owned.push(OwnedObject::Framebuffer(id));
        Ok(id)
    }

    pub fn vertex_array(&mut self, desc: &VertexArrayDesc<'_>) -> Result<VertexArrayId> {
        let id = self.gpu.create_vertex_array(desc)?;
        self.owned.push(OwnedObject::VertexArray(id));
        Ok(id)
    }

    /// Deletes every owned object, newest first.
    pub fn release(&mut self) {
        for object in self.owned.drain(..).rev() {
            match object {
                OwnedObject::Image(id) => self.gpu.delete_image(id),
                OwnedObject::Buffer(id) => self.gpu.delete_buffer(id),
                OwnedObject::Sampler(id) => self.gpu.delete_sampler(id),
                OwnedObject::DescriptorSetLayout(id) => self.gpu.delete_descriptor_set_layout(id),
                OwnedObject::DescriptorSet(id) => self.gpu.delete_descriptor_set(id),
                OwnedObject::RenderPass(id) => self.gpu.delete_render_pass(id),
                OwnedObject::Framebuffer(id) => self.gpu.delete_framebuffer(id),
                OwnedObject::VertexArray(id) => self.gpu.delete_vertex_array(id),
            }
        }
    }
}

impl Drop for ResourceScope {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ResourceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceScope")
            .field("owned", &self.owned.len())
            .finish()
    }
}
