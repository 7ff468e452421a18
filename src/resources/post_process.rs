//! Tonemap composite parameters.
//!
//! Vignette, film grain, chromatic aberration and panini projection applied by
//! the final full-screen tonemap draw.

use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "UncheckedPostProcessSettings")]
pub struct PostProcessSettings {
    /// Color the frame fades to at its edges (alpha = opacity).
    pub vignette_color: Vec4,
    /// Normalized distance from the center where darkening starts.
    vignette_radius: f32,
    vignette_softness: f32,
    grain_amount: f32,
    /// Screen pixels per grain cell.
    grain_pixel_size: f32,
    /// Per-channel UV offsets for chromatic aberration.
    pub chromatic_distortion_red: Vec2,
    pub chromatic_distortion_green: Vec2,
    pub chromatic_distortion_blue: Vec2,
    /// Panini projection strength, `0` disables it.
    panini_strength: f32,
    /// Whether grain is re-seeded every frame.
    pub animated: bool,
}

impl Default for PostProcessSettings {
    fn default() -> Self {
        Self {
            vignette_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            vignette_radius: 0.75,
            vignette_softness: 0.8,
            grain_amount: 0.0007,
            grain_pixel_size: 1.0,
            chromatic_distortion_red: Vec2::splat(0.00045),
            chromatic_distortion_green: Vec2::splat(0.0003),
            chromatic_distortion_blue: Vec2::splat(-0.0003),
            panini_strength: 0.0,
            animated: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct UncheckedPostProcessSettings {
    vignette_color: Vec4,
    vignette_radius: f32,
    vignette_softness: f32,
    grain_amount: f32,
    grain_pixel_size: f32,
    chromatic_distortion_red: Vec2,
    chromatic_distortion_green: Vec2,
    chromatic_distortion_blue: Vec2,
    panini_strength: f32,
    animated: bool,
}

impl Default for UncheckedPostProcessSettings {
    fn default() -> Self {
        let d = PostProcessSettings::default();
        Self {
            vignette_color: d.vignette_color,
            vignette_radius: d.vignette_radius,
            vignette_softness: d.vignette_softness,
            grain_amount: d.grain_amount,
            grain_pixel_size: d.grain_pixel_size,
            chromatic_distortion_red: d.chromatic_distortion_red,
            chromatic_distortion_green: d.chromatic_distortion_green,
            chromatic_distortion_blue: d.chromatic_distortion_blue,
            panini_strength: d.panini_strength,
            animated: d.animated,
        }
    }
}

impl From<UncheckedPostProcessSettings> for PostProcessSettings {
    fn from(raw: UncheckedPostProcessSettings) -> Self {
        let mut settings = Self {
            vignette_color: raw.vignette_color,
            chromatic_distortion_red: raw.chromatic_distortion_red,
            chromatic_distortion_green: raw.chromatic_distortion_green,
            chromatic_distortion_blue: raw.chromatic_distortion_blue,
            animated: raw.animated,
            ..Self::default()
        };
        settings.set_vignette(raw.vignette_radius, raw.vignette_softness);
        settings.set_grain(raw.grain_amount, raw.grain_pixel_size);
        settings.set_panini_strength(raw.panini_strength);
        settings
    }
}

impl PostProcessSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Radius and softness are clamped to `0..=1`.
    pub fn set_vignette(&mut self, radius: f32, softness: f32) {
        self.vignette_radius = radius.clamp(0.0, 1.0);
        self.vignette_softness = softness.clamp(0.0, 1.0);
    }

    #[inline]
    #[must_use]
    pub fn vignette_radius(&self) -> f32 {
        self.vignette_radius
    }

    #[inline]
    #[must_use]
    pub fn vignette_softness(&self) -> f32 {
        self.vignette_softness
    }

    pub fn set_grain(&mut self, amount: f32, pixel_size: f32) {
        self.grain_amount = amount.max(0.0);
        self.grain_pixel_size = pixel_size.max(1.0);
    }

    #[inline]
    #[must_use]
    pub fn grain_amount(&self) -> f32 {
        self.grain_amount
    }

    #[inline]
    #[must_use]
    pub fn grain_pixel_size(&self) -> f32 {
        self.grain_pixel_size
    }

    /// Clamped to `0..=1`.
    pub fn set_panini_strength(&mut self, strength: f32) {
        self.panini_strength = strength.clamp(0.0, 1.0);
    }

    #[inline]
    #[must_use]
    pub fn panini_strength(&self) -> f32 {
        self.panini_strength
    }
}
