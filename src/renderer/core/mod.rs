//! Graphics backend contracts.
//!
//! Provides:
//! - [`GraphicsCore`]: object factories, resize and the blocking idle-wait
//! - [`CommandRecorder`]: render scopes, binds, draws, dispatches and barriers
//! - [`ResourceScope`]: scoped ownership of everything the renderer creates
//! - Handle types and the descriptors passed across the contracts

pub mod commands;
pub mod device;
pub mod handles;
pub mod scope;
pub mod types;

pub use commands::CommandRecorder;
pub use device::GraphicsCore;
pub use handles::{
    AssetRef, BufferId, ComputePipelineId, DescriptorSetId, DescriptorSetLayoutId, FramebufferId,
    GraphicsPipelineId, ImageId, RenderPassId, SamplerId, VertexArrayId,
};
pub use scope::ResourceScope;
pub use types::*;
