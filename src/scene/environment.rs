//! Environment - image-based lighting source.

use crate::renderer::core::ImageId;

/// An environment map component.
///
/// The prefiltered specular image may still be loading, in which case the
/// component is skipped by image-based lighting.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvironmentMap {
    /// Prefiltered specular cubemap.
    pub specular: Option<ImageId>,
}

impl EnvironmentMap {
    #[must_use]
    pub fn new(specular: Option<ImageId>) -> Self {
        Self { specular }
    }
}
