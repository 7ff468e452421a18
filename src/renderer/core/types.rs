//! Descriptors and command payloads shared by the graphics-core and
//! command-recorder contracts.

use bitflags::bitflags;
use smallvec::SmallVec;

use super::handles::{BufferId, DescriptorSetLayoutId, ImageId, RenderPassId, SamplerId};

// ============================================================================
// Extents & Areas
// ============================================================================

/// A 2D size in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Integer half size, as used by the half-resolution SSAO and DOF targets.
    #[inline]
    #[must_use]
    pub const fn half(self) -> Self {
        Self::new(self.width / 2, self.height / 2)
    }

    /// Half size rounded up, as used by mip chains.
    #[inline]
    #[must_use]
    pub const fn half_ceil(self) -> Self {
        Self::new(self.width.div_ceil(2), self.height.div_ceil(2))
    }

    /// Component-wise maximum.
    #[inline]
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// `true` when both dimensions fit inside `other`.
    #[inline]
    #[must_use]
    pub const fn fits_within(self, other: Self) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Work-group counts for a 4×4 thread tile covering this extent.
    #[inline]
    #[must_use]
    pub const fn workgroups_4x4(self) -> (u32, u32) {
        (self.width.div_ceil(4), self.height.div_ceil(4))
    }

    #[inline]
    #[must_use]
    pub fn as_vec2(self) -> glam::Vec2 {
        glam::Vec2::new(self.width as f32, self.height as f32)
    }
}

/// The region of an attachment covered by a render scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderArea {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl From<Extent2D> for RenderArea {
    fn from(extent: Extent2D) -> Self {
        Self {
            x: 0,
            y: 0,
            width: extent.width,
            height: extent.height,
        }
    }
}

// ============================================================================
// Resource Descriptors
// ============================================================================

/// Describes an image to be created by the graphics core.
#[derive(Debug, Clone)]
pub struct ImageDesc<'a> {
    pub label: &'a str,
    pub extent: Extent2D,
    pub format: wgpu::TextureFormat,
    pub usage: wgpu::TextureUsages,
    /// Texel data uploaded at creation. Images created with data start in a
    /// shader-readable layout, all others start undefined.
    pub initial_data: Option<&'a [u8]>,
}

/// Describes a buffer to be created by the graphics core.
#[derive(Debug, Clone)]
pub struct BufferDesc<'a> {
    pub label: &'a str,
    pub usage: wgpu::BufferUsages,
    pub size: u64,
    pub contents: Option<&'a [u8]>,
}

impl<'a> BufferDesc<'a> {
    /// A CPU-updated uniform buffer of `size` bytes.
    #[must_use]
    pub fn uniform(label: &'a str, size: usize) -> Self {
        Self {
            label,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            size: size as u64,
            contents: None,
        }
    }

    /// A buffer initialised with `contents`.
    #[must_use]
    pub fn with_contents(label: &'a str, usage: wgpu::BufferUsages, contents: &'a [u8]) -> Self {
        Self {
            label,
            usage,
            size: contents.len() as u64,
            contents: Some(contents),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDesc {
    pub label: &'static str,
    pub filter: wgpu::FilterMode,
    pub address_mode: wgpu::AddressMode,
}

/// The kind of resource a layout binding accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    UniformBuffer,
    Sampler,
    SampledImage,
    StorageImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutBinding {
    pub binding: u32,
    pub kind: BindingKind,
    pub stages: wgpu::ShaderStages,
}

impl LayoutBinding {
    #[must_use]
    pub const fn new(binding: u32, kind: BindingKind, stages: wgpu::ShaderStages) -> Self {
        Self {
            binding,
            kind,
            stages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DescriptorSetLayoutDesc<'a> {
    pub label: &'a str,
    pub bindings: &'a [LayoutBinding],
}

/// A resource bound into a descriptor set slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorResource {
    UniformBuffer(BufferId),
    Sampler(SamplerId),
    SampledImage(ImageId),
    StorageImage(ImageId),
}

impl DescriptorResource {
    /// The image referenced by this resource, if any.
    #[must_use]
    pub fn image(self) -> Option<ImageId> {
        match self {
            Self::SampledImage(image) | Self::StorageImage(image) => Some(image),
            Self::UniformBuffer(_) | Self::Sampler(_) => None,
        }
    }
}

/// One binding write: `resource` goes into slot `binding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingWrite {
    pub binding: u32,
    pub resource: DescriptorResource,
}

impl BindingWrite {
    #[inline]
    #[must_use]
    pub const fn new(binding: u32, resource: DescriptorResource) -> Self {
        Self { binding, resource }
    }
}

/// Inline storage for the binding lists built by the renderer (no set has
/// more than seven bindings).
pub type BindingWrites = SmallVec<[BindingWrite; 8]>;

#[derive(Debug, Clone)]
pub struct DescriptorSetDesc<'a> {
    pub label: &'a str,
    pub layout: DescriptorSetLayoutId,
    pub bindings: &'a [BindingWrite],
}

/// A depth-only (or color) render pass used by shadow-map framebuffers.
#[derive(Debug, Clone)]
pub struct RenderPassDesc<'a> {
    pub label: &'a str,
    pub color_formats: &'a [wgpu::TextureFormat],
    pub depth_format: Option<wgpu::TextureFormat>,
}

#[derive(Debug, Clone)]
pub struct FramebufferDesc<'a> {
    pub label: &'a str,
    pub render_pass: RenderPassId,
    pub extent: Extent2D,
    pub attachments: &'a [ImageId],
}

/// Vertex input layout a pipeline is specialised for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexInputLayout {
    pub array_stride: u64,
    pub attributes: &'static [wgpu::VertexAttribute],
}

#[derive(Debug, Clone)]
pub struct VertexArrayDesc<'a> {
    pub label: &'a str,
    pub layout: VertexInputLayout,
    pub vertices: &'a [u8],
    pub indices: &'a [u8],
    pub index_format: wgpu::IndexFormat,
}

// ============================================================================
// Synchronization
// ============================================================================

/// Image layouts tracked by barriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    /// Contents are discarded on transition.
    Undefined,
    /// Read/write storage access from compute.
    General,
    ColorAttachment,
    DepthAttachment,
    /// Depth readable by shaders, also usable as a read-only depth attachment.
    DepthReadOnly,
    ShaderReadOnly,
}

impl ImageLayout {
    /// Layouts in which a sampled-image binding may be read.
    #[must_use]
    pub const fn is_shader_readable(self) -> bool {
        matches!(self, Self::ShaderReadOnly | Self::DepthReadOnly | Self::General)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageAspect {
    Color,
    Depth,
}

bitflags! {
    /// Pipeline stages on either side of a barrier.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PipelineStages: u32 {
        const TOP_OF_PIPE             = 1 << 0;
        const EARLY_FRAGMENT_TESTS    = 1 << 1;
        const LATE_FRAGMENT_TESTS     = 1 << 2;
        const FRAGMENT_SHADER         = 1 << 3;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 4;
        const COMPUTE_SHADER          = 1 << 5;
        const BOTTOM_OF_PIPE          = 1 << 6;
    }
}

bitflags! {
    /// Memory access kinds made visible or available by a barrier.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u32 {
        const SHADER_READ                    = 1 << 0;
        const SHADER_WRITE                   = 1 << 1;
        const COLOR_ATTACHMENT_WRITE         = 1 << 2;
        const DEPTH_STENCIL_ATTACHMENT_READ  = 1 << 3;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 4;
    }
}

/// A layout transition for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageBarrier {
    pub image: ImageId,
    pub aspect: ImageAspect,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
    pub src_access: AccessFlags,
    pub dst_access: AccessFlags,
}

// ============================================================================
// Render Scopes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    Color([f32; 4]),
    DepthStencil { depth: f32, stencil: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOp {
    Clear(ClearValue),
    Load,
}

/// An image attached to a render scope, in the layout it is used with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderAttachment {
    pub image: ImageId,
    pub layout: ImageLayout,
    pub load: LoadOp,
    pub store: wgpu::StoreOp,
}

impl RenderAttachment {
    /// Color attachment cleared to `color`.
    #[must_use]
    pub const fn cleared_color(image: ImageId, color: [f32; 4]) -> Self {
        Self {
            image,
            layout: ImageLayout::ColorAttachment,
            load: LoadOp::Clear(ClearValue::Color(color)),
            store: wgpu::StoreOp::Store,
        }
    }

    /// Color attachment keeping its previous contents.
    #[must_use]
    pub const fn loaded_color(image: ImageId) -> Self {
        Self {
            image,
            layout: ImageLayout::ColorAttachment,
            load: LoadOp::Load,
            store: wgpu::StoreOp::Store,
        }
    }

    /// Depth attachment cleared to the far plane.
    #[must_use]
    pub const fn cleared_depth(image: ImageId) -> Self {
        Self {
            image,
            layout: ImageLayout::DepthAttachment,
            load: LoadOp::Clear(ClearValue::DepthStencil {
                depth: 1.0,
                stencil: 0,
            }),
            store: wgpu::StoreOp::Store,
        }
    }

    /// Writable depth attachment keeping its previous contents.
    #[must_use]
    pub const fn loaded_depth(image: ImageId) -> Self {
        Self {
            image,
            layout: ImageLayout::DepthAttachment,
            load: LoadOp::Load,
            store: wgpu::StoreOp::Store,
        }
    }
}

/// Parameters of one render scope.
#[derive(Debug, Clone)]
pub struct RenderingInfo<'a> {
    pub label: &'a str,
    pub area: RenderArea,
    pub color_attachments: &'a [RenderAttachment],
    pub depth_attachment: Option<RenderAttachment>,
}
