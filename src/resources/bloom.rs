//! Bloom Post-Processing Configuration
//!
//! Pure data: the soft-threshold curve applied by the filter stage and the
//! tent radius used while upsampling. The mip chain itself lives in
//! [`renderer::bloom`](crate::renderer::bloom).

use glam::Vec4;
use serde::{Deserialize, Serialize};

/// Guards the knee reciprocal when the knee is zero.
const KNEE_EPSILON: f32 = 1e-5;

/// Deserialized documents pass through the clamping setters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "UncheckedBloomSettings")]
pub struct BloomSettings {
    /// Luminance above which pixels contribute to bloom.
    ///
    /// Default: `1.0`
    threshold: f32,
    /// Width of the soft transition below the threshold, as a fraction of it.
    ///
    /// Default: `0.5`
    soft_knee: f32,
    /// Tent filter radius used by the upsample stages (UV units).
    ///
    /// Default: `0.005`
    filter_radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            soft_knee: 0.5,
            filter_radius: 0.005,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct UncheckedBloomSettings {
    threshold: f32,
    soft_knee: f32,
    filter_radius: f32,
}

impl Default for UncheckedBloomSettings {
    fn default() -> Self {
        let BloomSettings {
            threshold,
            soft_knee,
            filter_radius,
        } = BloomSettings::default();
        Self {
            threshold,
            soft_knee,
            filter_radius,
        }
    }
}

impl From<UncheckedBloomSettings> for BloomSettings {
    fn from(raw: UncheckedBloomSettings) -> Self {
        let mut settings = Self::default();
        settings.set_threshold(raw.threshold);
        settings.set_soft_knee(raw.soft_knee);
        settings.set_filter_radius(raw.filter_radius);
        settings
    }
}

impl BloomSettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.max(0.0);
    }

    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Clamped to `0..=1`.
    pub fn set_soft_knee(&mut self, soft_knee: f32) {
        self.soft_knee = soft_knee.clamp(0.0, 1.0);
    }

    #[inline]
    #[must_use]
    pub fn soft_knee(&self) -> f32 {
        self.soft_knee
    }

    pub fn set_filter_radius(&mut self, radius: f32) {
        self.filter_radius = radius.max(0.0);
    }

    #[inline]
    #[must_use]
    pub fn filter_radius(&self) -> f32 {
        self.filter_radius
    }

    /// Knee width in luminance units.
    #[inline]
    #[must_use]
    pub fn knee(&self) -> f32 {
        self.threshold * self.soft_knee
    }

    /// Packed curve for the filter stage:
    /// `(threshold, threshold - knee, 2 * knee, 0.25 / (knee + ε))`.
    #[must_use]
    pub fn threshold_filter(&self) -> Vec4 {
        let knee = self.knee();
        Vec4::new(
            self.threshold,
            self.threshold - knee,
            2.0 * knee,
            0.25 / (knee + KNEE_EPSILON),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_filter() {
        let f = BloomSettings::default().threshold_filter();
        assert!((f.x - 1.0).abs() < 1e-6);
        assert!((f.y - 0.5).abs() < 1e-6);
        assert!((f.z - 1.0).abs() < 1e-6);
        assert!((f.w - 0.25 / (0.5 + KNEE_EPSILON)).abs() < 1e-6);
    }

    #[test]
    fn zero_knee_stays_finite() {
        let mut settings = BloomSettings::default();
        settings.set_soft_knee(0.0);
        let f = settings.threshold_filter();
        assert!(f.w.is_finite());
        assert!((f.y - f.x).abs() < 1e-6);
    }
}
