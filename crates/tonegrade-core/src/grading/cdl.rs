//! ASC CDL v1.2 (slope/offset/power/saturation).
//!
//! # Formula
//! For each channel `c` in `{R, G, B}`:
//! ```text
//!   o[c] = in[c] × slope[c] + offset[c]
//!   v[c] = pow(clamp(o[c]), power[c])
//!   luma = dot(v, [0.2126, 0.7152, 0.0722])
//!   out  = clamp(luma + saturation × (v − luma))
//! ```
//!
//! `clamp` depends on [`ClampMode`]: `Lower` only floors at zero so HDR
//! values pass through; `Unit` clamps to `[0, 1]` for display-range data.
//!
//! ```text
//!   Input ──→ ×Slope ──→ +Offset ──→ clamp ──→ ^Power ──→ Saturation ──→ clamp ──→ Output
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::transform::params::CdlParams;

/// Rec. 709 luminance weights.
pub const LUMA_REC709: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Smallest exponent the power step will use.
///
/// `pow(0, 0)` and `pow(0, negative)` are undefined, so power components at
/// or below zero evaluate as this floor instead.
pub const MIN_POWER: f32 = 1e-4;

/// Clamping policy of a CDL placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClampMode {
    /// Floor at zero only. Used on the scene-referred signal.
    Lower,
    /// Clamp to `[0, 1]`. Used on tone-mapped or log-encoded signals.
    Unit,
}

impl ClampMode {
    #[inline]
    fn apply(self, v: Vec3) -> Vec3 {
        match self {
            Self::Lower => v.max(Vec3::ZERO),
            Self::Unit => v.clamp(Vec3::ZERO, Vec3::ONE),
        }
    }
}

/// Rec. 709 luma of a linear RGB triplet.
#[inline]
pub fn luma(rgb: [f32; 3]) -> f32 {
    Vec3::from_array(rgb).dot(Vec3::from_array(LUMA_REC709))
}

/// Apply the ASC CDL transform to one RGB pixel.
pub fn apply_cdl(rgb: [f32; 3], params: &CdlParams, mode: ClampMode) -> [f32; 3] {
    apply_cdl_vec(Vec3::from_array(rgb), params, mode).to_array()
}

/// [`apply_cdl`] on a `Vec3`, for callers already working in glam types.
pub fn apply_cdl_vec(rgb: Vec3, params: &CdlParams, mode: ClampMode) -> Vec3 {
    let slope = Vec3::from_array(params.slope);
    let offset = Vec3::from_array(params.offset);
    let power = Vec3::from_array(params.power).max(Vec3::splat(MIN_POWER));

    let o = mode.apply(rgb * slope + offset);
    let v = Vec3::new(o.x.powf(power.x), o.y.powf(power.y), o.z.powf(power.z));

    let luma = v.dot(Vec3::from_array(LUMA_REC709));
    mode.apply(Vec3::splat(luma) + params.saturation * (v - Vec3::splat(luma)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn assert_rgb_eq(result: [f32; 3], expected: [f32; 3], eps: f32) {
        for i in 0..3 {
            assert!(
                (result[i] - expected[i]).abs() < eps,
                "channel {i}: {:.8} vs {:.8}",
                result[i],
                expected[i]
            );
        }
    }

    #[test]
    fn test_cdl_identity_is_passthrough() {
        let rgb = [0.5, 0.3, 0.7];
        for mode in [ClampMode::Lower, ClampMode::Unit] {
            let result = apply_cdl(rgb, &CdlParams::IDENTITY, mode);
            assert_rgb_eq(result, rgb, EPSILON);
        }
    }

    #[test]
    fn test_cdl_lower_mode_keeps_hdr_values() {
        let rgb = [4.0, 2.5, 1.2];
        let result = apply_cdl(rgb, &CdlParams::IDENTITY, ClampMode::Lower);
        assert_rgb_eq(result, rgb, 1e-5);
    }

    #[test]
    fn test_cdl_unit_mode_clamps_hdr_values() {
        let result = apply_cdl([4.0, 0.5, 1.2], &CdlParams::IDENTITY, ClampMode::Unit);
        assert_rgb_eq(result, [1.0, 0.5, 1.0], EPSILON);
    }

    #[test]
    fn test_cdl_slope_red_channel() {
        let params = CdlParams {
            slope: [2.0, 1.0, 1.0],
            ..CdlParams::IDENTITY
        };
        let result = apply_cdl([0.3, 0.3, 0.3], &params, ClampMode::Unit);
        assert_rgb_eq(result, [0.6, 0.3, 0.3], EPSILON);
        let l = luma(result);
        assert!((l - 0.36378).abs() < 1e-5, "luma {l}");
    }

    #[test]
    fn test_cdl_offset_then_power() {
        let params = CdlParams {
            offset: [0.1, 0.1, 0.1],
            power: [2.0, 2.0, 2.0],
            ..CdlParams::IDENTITY
        };
        let result = apply_cdl([0.5, 0.5, 0.5], &params, ClampMode::Lower);
        assert_rgb_eq(result, [0.36, 0.36, 0.36], 1e-6);
    }

    #[test]
    fn test_cdl_saturation_zero_gives_luma() {
        let rgb = [0.8, 0.4, 0.2];
        let params = CdlParams {
            saturation: 0.0,
            ..CdlParams::IDENTITY
        };
        let expected = luma(rgb);
        for mode in [ClampMode::Lower, ClampMode::Unit] {
            let result = apply_cdl(rgb, &params, mode);
            assert_rgb_eq(result, [expected; 3], 1e-6);
        }
    }

    #[test]
    fn test_cdl_saturation_above_one_spreads_chroma() {
        let rgb = [0.6, 0.4, 0.3];
        let params = CdlParams {
            saturation: 2.0,
            ..CdlParams::IDENTITY
        };
        let result = apply_cdl(rgb, &params, ClampMode::Lower);
        assert!(result[0] - result[2] > rgb[0] - rgb[2]);
    }

    #[test]
    fn test_cdl_negative_clamped_to_zero() {
        let params = CdlParams {
            offset: [-0.5, -0.5, -0.5],
            ..CdlParams::IDENTITY
        };
        let result = apply_cdl([0.1, 0.1, 0.1], &params, ClampMode::Lower);
        for c in result {
            assert!(c >= 0.0, "output should never be negative");
        }
    }

    #[test]
    fn test_cdl_zero_power_is_defined() {
        let params = CdlParams {
            power: [0.0, -1.0, 0.0],
            ..CdlParams::IDENTITY
        };
        let result = apply_cdl([0.0, 0.0, 0.5], &params, ClampMode::Lower);
        for c in result {
            assert!(c.is_finite(), "power floor must keep output finite");
        }
        assert!(result[0].abs() < EPSILON);
    }
}
