//! Audio-reactive lighting model.
//!
//! Pure per-frame transforms from the current loudness scalar to amplified
//! light intensities and an object pulse scale. No state is kept between
//! frames; everything is recomputed from the inputs and the configuration.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Hand-tuned aesthetic parameters of the reactive lighting.
///
/// The defaults are not derived from first principles; they are kept exactly
/// as tuned. Color amplification and pulse scaling use separate exponents and
/// gains on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Exponent applied to loudness before color amplification.
    pub exponent: f32,
    /// Gain for the ambient channel.
    pub ambient_gain: f32,
    /// Gain for the diffuse channel.
    pub diffuse_gain: f32,
    /// Gain for the specular channel.
    pub specular_gain: f32,
    /// Exponent applied to loudness for the pulse scale.
    pub pulse_exponent: f32,
    /// Gain for the pulse scale.
    pub pulse_gain: f32,
    /// Base ambient light color (RGBA).
    pub ambient_base: [f32; 4],
    /// Base diffuse light color (RGBA).
    pub diffuse_base: [f32; 4],
    /// Base specular light color (RGBA).
    pub specular_base: [f32; 4],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            exponent: 2.5,
            ambient_gain: 0.5,
            diffuse_gain: 1.5,
            specular_gain: 5.0,
            pulse_exponent: 2.0,
            pulse_gain: 0.5,
            ambient_base: [1.0, 1.0, 1.0, 1.0],
            diffuse_base: [0.9, 0.9, 0.5, 1.0],
            specular_base: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Per-frame light intensities and placement handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightLevels {
    /// Amplified ambient color (RGBA).
    pub ambient: [f32; 4],
    /// Amplified diffuse color (RGBA).
    pub diffuse: [f32; 4],
    /// Amplified specular color (RGBA).
    pub specular: [f32; 4],
    /// World-space light position for the current frame.
    pub position: Vec3,
}

impl LightingConfig {
    /// Computes amplified light levels for the given loudness and animation
    /// angle.
    ///
    /// Loudness below zero is treated as silence; the estimator never
    /// produces such a value, but this stays total for any input. At
    /// loudness 0 the output equals the base colors exactly.
    pub fn light_levels(&self, loudness: f32, angle: f32) -> LightLevels {
        let boost = loudness.max(0.0).powf(self.exponent);
        LightLevels {
            ambient: amplify(self.ambient_base, self.ambient_gain, boost),
            diffuse: amplify(self.diffuse_base, self.diffuse_gain, boost),
            specular: amplify(self.specular_base, self.specular_gain, boost),
            position: light_position(angle),
        }
    }

    /// Scale factor for the pulsing object: `1 + gain * L^pulse_exponent`.
    pub fn pulse_scale(&self, loudness: f32) -> f32 {
        1.0 + self.pulse_gain * loudness.max(0.0).powf(self.pulse_exponent)
    }
}

/// Amplifies the RGB components of `base` by `1 + gain * boost`; alpha is
/// passed through unchanged.
fn amplify(base: [f32; 4], gain: f32, boost: f32) -> [f32; 4] {
    let factor = 1.0 + gain * boost;
    [base[0] * factor, base[1] * factor, base[2] * factor, base[3]]
}

/// Light orbit: a slow circle of radius 6 at height 3.5.
fn light_position(angle: f32) -> Vec3 {
    Vec3::new(
        6.0 * (angle / 200.0).sin(),
        3.5,
        -6.0 * (angle / 200.0).cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_identity() {
        let config = LightingConfig::default();
        let levels = config.light_levels(0.0, 0.0);
        assert_eq!(levels.ambient, config.ambient_base);
        assert_eq!(levels.diffuse, config.diffuse_base);
        assert_eq!(levels.specular, config.specular_base);
        assert_eq!(config.pulse_scale(0.0), 1.0);
    }

    #[test]
    fn test_full_loudness_ambient() {
        // At L = 1 with the default gain 0.5 every ambient channel scales by
        // exactly 1.5.
        let config = LightingConfig::default();
        let levels = config.light_levels(1.0, 0.0);
        assert_eq!(levels.ambient, [1.5, 1.5, 1.5, 1.0]);
    }

    #[test]
    fn test_alpha_passes_through() {
        let config = LightingConfig::default();
        let levels = config.light_levels(0.8, 0.0);
        assert_eq!(levels.ambient[3], 1.0);
        assert_eq!(levels.diffuse[3], 1.0);
        assert_eq!(levels.specular[3], 1.0);
    }

    #[test]
    fn test_negative_loudness_treated_as_silence() {
        let config = LightingConfig::default();
        let levels = config.light_levels(-2.0, 0.0);
        assert_eq!(levels.ambient, config.ambient_base);
        assert_eq!(config.pulse_scale(-2.0), 1.0);
    }

    #[test]
    fn test_amplification_never_dims() {
        let config = LightingConfig::default();
        for step in 0..=10 {
            let l = step as f32 / 10.0;
            let levels = config.light_levels(l, 0.0);
            for c in 0..3 {
                assert!(levels.diffuse[c] >= config.diffuse_base[c]);
                assert!(levels.specular[c] >= config.specular_base[c]);
            }
        }
    }

    #[test]
    fn test_pulse_scale_at_full_loudness() {
        let config = LightingConfig::default();
        assert_eq!(config.pulse_scale(1.0), 1.5);
    }

    #[test]
    fn test_light_orbit_radius() {
        for angle in [0.0f32, 150.0, 628.0, 5000.0] {
            let pos = light_position(angle);
            let radial = (pos.x * pos.x + pos.z * pos.z).sqrt();
            assert!((radial - 6.0).abs() < 1e-3, "radial was {radial}");
            assert_eq!(pos.y, 3.5);
        }
    }
}
