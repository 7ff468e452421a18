//! Image barrier presets.
//!
//! Each helper describes one transition the frame pipeline performs. Writers
//! always transition from `Undefined` because every pass fully overwrites its
//! target, which keeps the preset independent of the previous frame's layout.

use crate::renderer::core::{AccessFlags, ImageAspect, ImageBarrier, ImageId, ImageLayout};

fn barrier(
    image: ImageId,
    aspect: ImageAspect,
    (old_layout, src_access): (ImageLayout, AccessFlags),
    (new_layout, dst_access): (ImageLayout, AccessFlags),
) -> ImageBarrier {
    ImageBarrier {
        image,
        aspect,
        old_layout,
        new_layout,
        src_access,
        dst_access,
    }
}

// === Color ===

#[must_use]
pub fn to_color_attachment(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Color,
        (ImageLayout::Undefined, AccessFlags::empty()),
        (ImageLayout::ColorAttachment, AccessFlags::COLOR_ATTACHMENT_WRITE),
    )
}

#[must_use]
pub fn color_attachment_to_sampled(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Color,
        (ImageLayout::ColorAttachment, AccessFlags::COLOR_ATTACHMENT_WRITE),
        (ImageLayout::ShaderReadOnly, AccessFlags::SHADER_READ),
    )
}

/// Re-opens a sampled color target for blending on top of its contents.
#[must_use]
pub fn sampled_to_color_attachment(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Color,
        (ImageLayout::ShaderReadOnly, AccessFlags::SHADER_READ),
        (ImageLayout::ColorAttachment, AccessFlags::COLOR_ATTACHMENT_WRITE),
    )
}

// === Depth ===

#[must_use]
pub fn to_depth_attachment(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Depth,
        (ImageLayout::Undefined, AccessFlags::empty()),
        (
            ImageLayout::DepthAttachment,
            AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ),
    )
}

#[must_use]
pub fn depth_attachment_to_read_only(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Depth,
        (
            ImageLayout::DepthAttachment,
            AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ),
        (ImageLayout::DepthReadOnly, AccessFlags::SHADER_READ),
    )
}

/// Reopens a depth target sampled by an earlier pass, possibly of another
/// in-flight frame, for a full overwrite. Pair with `FRAGMENT_SHADER` as the
/// source stage so the write waits for those reads.
#[must_use]
pub fn sampled_depth_to_attachment_discard(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Depth,
        (ImageLayout::Undefined, AccessFlags::SHADER_READ),
        (
            ImageLayout::DepthAttachment,
            AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ),
    )
}

/// Makes a sampled depth buffer writable again while keeping its contents.
#[must_use]
pub fn depth_read_only_to_attachment(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Depth,
        (ImageLayout::DepthReadOnly, AccessFlags::SHADER_READ),
        (
            ImageLayout::DepthAttachment,
            AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ | AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
        ),
    )
}

// === Storage (compute) ===

#[must_use]
pub fn to_storage(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Color,
        (ImageLayout::Undefined, AccessFlags::SHADER_READ),
        (ImageLayout::General, AccessFlags::SHADER_WRITE),
    )
}

#[must_use]
pub fn storage_to_sampled(image: ImageId) -> ImageBarrier {
    barrier(
        image,
        ImageAspect::Color,
        (ImageLayout::General, AccessFlags::SHADER_WRITE),
        (ImageLayout::ShaderReadOnly, AccessFlags::SHADER_READ),
    )
}
