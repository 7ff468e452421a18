//! Renderer Settings & Render Modes
//!
//! [`RendererSettings`] is the single configuration object handed to
//! [`DeferredRenderer::new`](crate::DeferredRenderer::new). It serializes with
//! serde and every field has a default, so partial JSON/TOML documents work.
//!
//! ```rust,ignore
//! use deferred_renderer::{RendererSettings, PostProcessFeatures};
//!
//! let settings = RendererSettings {
//!     width: 1280,
//!     height: 720,
//!     features: PostProcessFeatures { depth_of_field: true, ..Default::default() },
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{RenderError, Result};
use crate::renderer::pipeline::PipelineAddresses;
use crate::resources::{BloomSettings, PostProcessSettings, SsaoSettings};

// ---------------------------------------------------------------------------
// RendererSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// Number of frame resource sets, one per swap-chain image.
    ///
    /// Default: `2`
    pub frames_in_flight: u32,
    /// Initial render width in pixels.
    pub width: u32,
    /// Initial render height in pixels.
    pub height: u32,
    /// Keep oversized allocations when shrinking, so growing back within them
    /// only rewrites uniforms and descriptors.
    ///
    /// When disabled every size change recreates the targets at exactly the
    /// requested size.
    ///
    /// Default: `true`
    pub fast_resize: bool,
    pub features: PostProcessFeatures,
    pub bloom: BloomSettings,
    pub ssao: SsaoSettings,
    pub post_process: PostProcessSettings,
    pub pipelines: PipelineAddresses,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            width: 1280,
            height: 720,
            fast_resize: true,
            features: PostProcessFeatures::default(),
            bloom: BloomSettings::default(),
            ssao: SsaoSettings::default(),
            post_process: PostProcessSettings::default(),
            pipelines: PipelineAddresses::default(),
        }
    }
}

impl RendererSettings {
    pub fn validate(&self) -> Result<()> {
        if self.frames_in_flight == 0 {
            return Err(RenderError::InvalidSettings(
                "frames_in_flight must be at least 1".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidSettings(format!(
                "initial extent must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Optional post-process effects, all off unless requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostProcessFeatures {
    pub screen_space_reflections: bool,
    pub depth_of_field: bool,
}

// ---------------------------------------------------------------------------
// RenderMode
// ---------------------------------------------------------------------------

/// Which image the renderer produces.
///
/// [`Default`](RenderMode::Default) runs the full lit pipeline; every other
/// mode replaces post-processing with a single debug visualization draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u16)]
pub enum RenderMode {
    #[default]
    Default,
    Position,
    PositionMod,
    ViewPosition,
    ViewPositionMod,
    Depth,
    DepthMod,
    Normal,
    ViewNormal,
    Albedo,
    Specular,
    Roughness,
    AmbientOcclusion,
}

impl RenderMode {
    /// Every mode, in discriminant order.
    pub const ALL: [RenderMode; 13] = [
        Self::Default,
        Self::Position,
        Self::PositionMod,
        Self::ViewPosition,
        Self::ViewPositionMod,
        Self::Depth,
        Self::DepthMod,
        Self::Normal,
        Self::ViewNormal,
        Self::Albedo,
        Self::Specular,
        Self::Roughness,
        Self::AmbientOcclusion,
    ];

    /// Display name shown in mode pickers.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Position => "World Position",
            Self::PositionMod => "World Position (Modulus)",
            Self::ViewPosition => "View Position",
            Self::ViewPositionMod => "View Position (Modulus)",
            Self::Depth => "Depth",
            Self::DepthMod => "Depth (Modulus)",
            Self::Normal => "Normals",
            Self::ViewNormal => "View Normals",
            Self::Albedo => "Albedo",
            Self::Specular => "Specular",
            Self::Roughness => "Roughness",
            Self::AmbientOcclusion => "Ambient Occlusion",
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> u16 {
        self as u16
    }

    #[inline]
    #[must_use]
    pub const fn renders_shadows(self) -> bool {
        matches!(self, Self::Default)
    }

    #[inline]
    #[must_use]
    pub const fn renders_ssao(self) -> bool {
        matches!(self, Self::Default | Self::AmbientOcclusion)
    }

    #[inline]
    #[must_use]
    pub const fn is_debug_view(self) -> bool {
        !matches!(self, Self::Default)
    }
}

impl TryFrom<u16> for RenderMode {
    type Error = RenderError;

    fn try_from(value: u16) -> Result<Self> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(RenderError::InvalidRenderMode(value))
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_mode_indices_match_table_order() {
        for (i, mode) in RenderMode::ALL.iter().enumerate() {
            assert_eq!(usize::from(mode.index()), i);
            assert_eq!(RenderMode::try_from(i as u16).ok(), Some(*mode));
        }
    }

    #[test]
    fn out_of_range_render_mode_is_rejected() {
        assert!(matches!(
            RenderMode::try_from(13),
            Err(RenderError::InvalidRenderMode(13))
        ));
    }

    #[test]
    fn validate_rejects_zero_frames_and_extent() {
        let mut settings = RendererSettings::default();
        assert!(settings.validate().is_ok());
        settings.frames_in_flight = 0;
        assert!(settings.validate().is_err());
        settings.frames_in_flight = 1;
        settings.height = 0;
        assert!(settings.validate().is_err());
    }
}
