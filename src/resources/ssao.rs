//! SSAO (Screen Space Ambient Occlusion) Configuration
//!
//! Settings plus the CPU-side generators for the sample kernel and the tiling
//! rotation noise consumed by the SSAO pass.
//!
//! # Algorithm
//!
//! 1. A hemisphere kernel of [`SSAO_KERNEL_SIZE`] samples oriented along +Z
//!    (tangent space), scaled quadratically by index so most samples cluster
//!    near the origin
//! 2. A 4×4 rotation noise tile (`Rg8Snorm`, repeat addressing) that rotates
//!    the kernel per pixel
//! 3. A separate blur pass that smooths the raw half-resolution occlusion

use glam::{Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

/// Number of hemisphere samples in the kernel.
pub const SSAO_KERNEL_SIZE: usize = 64;
/// Edge length of the square noise tile.
pub const SSAO_NOISE_DIM: u32 = 4;

// ============================================================================
// SsaoSettings
// ============================================================================

/// Screen-space ambient occlusion parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "UncheckedSsaoSettings")]
pub struct SsaoSettings {
    /// Sampling radius in view-space units.
    ///
    /// Default: `0.1`
    radius: f32,
    /// Depth bias that prevents self-occlusion.
    ///
    /// Default: `0.025`
    bias: f32,
}

impl Default for SsaoSettings {
    fn default() -> Self {
        Self {
            radius: 0.1,
            bias: 0.025,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct UncheckedSsaoSettings {
    radius: f32,
    bias: f32,
}

impl Default for UncheckedSsaoSettings {
    fn default() -> Self {
        let SsaoSettings { radius, bias } = SsaoSettings::default();
        Self { radius, bias }
    }
}

impl From<UncheckedSsaoSettings> for SsaoSettings {
    fn from(raw: UncheckedSsaoSettings) -> Self {
        let mut settings = Self::default();
        settings.set_radius(raw.radius);
        settings.set_bias(raw.bias);
        settings
    }
}

impl SsaoSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.001);
    }

    #[inline]
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias.max(0.0);
    }

    #[inline]
    #[must_use]
    pub fn bias(&self) -> f32 {
        self.bias
    }
}

// ============================================================================
// Kernel & Noise Generation
// ============================================================================

/// Generates the hemisphere sample kernel.
///
/// Every sample lies inside the unit hemisphere (`‖s‖ ≤ 1`, `s.z ≥ 0`).
/// Uses a fixed seed so the kernel is stable across runs.
#[must_use]
pub fn generate_ssao_kernel() -> [Vec4; SSAO_KERNEL_SIZE] {
    let mut rng = StdRng::seed_from_u64(42);
    let mut kernel = [Vec4::ZERO; SSAO_KERNEL_SIZE];

    for (i, slot) in kernel.iter_mut().enumerate() {
        let mut sample = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(0.01..1.0),
        )
        .normalize();

        sample *= rng.random_range(0.0..1.0f32);

        // Cluster samples near the origin.
        let t = i as f32 / SSAO_KERNEL_SIZE as f32;
        sample *= lerp(0.1, 1.0, t * t);

        *slot = sample.extend(0.0);
    }
    kernel
}

/// Generates the 4×4 rotation noise tile as `Rg8Snorm` texels.
///
/// Each texel is a unit rotation vector in the tangent plane.
#[must_use]
pub fn generate_ssao_noise() -> Vec<[i8; 2]> {
    let mut rng = StdRng::seed_from_u64(12345);
    (0..SSAO_NOISE_DIM * SSAO_NOISE_DIM)
        .map(|_| {
            let xy = Vec2::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0))
                .normalize_or(Vec2::X);
            [to_snorm8(xy.x), to_snorm8(xy.y)]
        })
        .collect()
}

fn to_snorm8(v: f32) -> i8 {
    (v.clamp(-1.0, 1.0) * 127.0).round() as i8
}

fn lerp(a: f32, b: f32, f: f32) -> f32 {
    a + f * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_samples_stay_inside_unit_hemisphere() {
        for (i, s) in generate_ssao_kernel().iter().enumerate() {
            let v = s.truncate();
            assert!(v.length() <= 1.0 + 1e-6, "sample {i} too long: {v}");
            assert!(v.z >= 0.0, "sample {i} below the surface: {v}");
            assert!(s.w.abs() < f32::EPSILON);
        }
    }

    #[test]
    fn kernel_clusters_toward_origin() {
        let kernel = generate_ssao_kernel();
        let half = SSAO_KERNEL_SIZE / 2;
        let inner: f32 = kernel[..half].iter().map(|s| s.length()).sum();
        let outer: f32 = kernel[half..].iter().map(|s| s.length()).sum();
        assert!(
            inner < outer,
            "first half should average shorter samples ({inner} vs {outer})"
        );
    }

    #[test]
    fn noise_tile_has_sixteen_unit_vectors() {
        let noise = generate_ssao_noise();
        assert_eq!(noise.len(), 16);
        for texel in noise {
            let v = Vec2::new(f32::from(texel[0]), f32::from(texel[1])) / 127.0;
            assert!((v.length() - 1.0).abs() < 0.02, "noise texel {v} not unit");
        }
    }

    #[test]
    fn settings_setters_clamp() {
        let mut settings = SsaoSettings::new();
        settings.set_bias(-1.0);
        settings.set_radius(0.0);
        assert!(settings.bias().abs() < f32::EPSILON);
        assert!(settings.radius() > 0.0);
    }
}
