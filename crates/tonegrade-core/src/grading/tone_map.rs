//! Tone-mapping operators: scene-referred linear sRGB in, display-referred out.
//!
//! Every operator is a pure function of the input color, the exposure
//! multiplier, and (for AgX) the look CDL. Every output lands in `[0, 1]`.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::color_management::color_space::{
    ACES_INPUT, ACES_OUTPUT, AGX_INSET, AGX_OUTSET, LINEAR_SRGB_TO_REC2020,
    REC2020_TO_LINEAR_SRGB,
};
use crate::color_management::transfer::{Gamma22Transfer, TransferFunction};
use crate::error::GradeError;
use crate::grading::cdl::{ClampMode, apply_cdl_vec};
use crate::transform::params::{CdlParams, ToneMapParams};

/// The closed set of tone-mapping operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneMapOperator {
    /// Filament/Blender AgX with an embedded look CDL.
    AgX,
    /// Narkowicz-style fitted ACES RRT+ODT, brightened for a lit viewing room.
    AcesFilmic,
    /// Khronos PBR Neutral.
    Neutral,
    /// Simple Reinhard `c / (1 + c)`.
    Reinhard,
    /// Hejl/Burgess-Dawson optimized filmic curve.
    Cineon,
    /// Exposure only.
    Linear,
}

impl ToneMapOperator {
    /// Label shown on the control surface.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AgX => "AgX",
            Self::AcesFilmic => "ACES Filmic",
            Self::Neutral => "Commerce",
            Self::Reinhard => "Reinhard",
            Self::Cineon => "Cineon",
            Self::Linear => "None",
        }
    }

    /// GPU-compatible integer for the shader uniform.
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::AgX => 0,
            Self::AcesFilmic => 1,
            Self::Neutral => 2,
            Self::Reinhard => 3,
            Self::Cineon => 4,
            Self::Linear => 5,
        }
    }

    /// Whether this operator applies the tone-map stage's look CDL.
    pub const fn uses_look(&self) -> bool {
        matches!(self, Self::AgX)
    }

    /// Operators in control-surface order.
    pub fn all() -> &'static [Self] {
        const ALL: [ToneMapOperator; 6] = [
            ToneMapOperator::AgX,
            ToneMapOperator::AcesFilmic,
            ToneMapOperator::Neutral,
            ToneMapOperator::Reinhard,
            ToneMapOperator::Cineon,
            ToneMapOperator::Linear,
        ];
        &ALL
    }
}

impl fmt::Display for ToneMapOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ToneMapOperator {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "agx" => Ok(Self::AgX),
            "aces" | "aces filmic" | "acesfilmic" => Ok(Self::AcesFilmic),
            "neutral" | "commerce" => Ok(Self::Neutral),
            "reinhard" => Ok(Self::Reinhard),
            "cineon" => Ok(Self::Cineon),
            "linear" | "none" => Ok(Self::Linear),
            other => Err(GradeError::Config(format!("unknown tone-map operator `{other}`"))),
        }
    }
}

/// Apply the selected operator. `look` is only read by AgX.
pub fn apply_tone_map(rgb: [f32; 3], params: &ToneMapParams, look: &CdlParams) -> [f32; 3] {
    let color = Vec3::from_array(rgb);
    let exposure = params.exposure_multiplier();
    let out = match params.operator {
        ToneMapOperator::AgX => agx(color, exposure, look),
        ToneMapOperator::AcesFilmic => aces_filmic(color, exposure),
        ToneMapOperator::Neutral => neutral(color, exposure),
        ToneMapOperator::Reinhard => reinhard(color, exposure),
        ToneMapOperator::Cineon => cineon(color, exposure),
        ToneMapOperator::Linear => linear(color, exposure),
    };
    out.to_array()
}

#[inline]
fn saturate(v: Vec3) -> Vec3 {
    v.clamp(Vec3::ZERO, Vec3::ONE)
}

/// `saturate(e × c)`.
pub fn linear(color: Vec3, exposure: f32) -> Vec3 {
    saturate(color * exposure)
}

/// `saturate(c / (1 + c))` after exposure.
pub fn reinhard(color: Vec3, exposure: f32) -> Vec3 {
    let c = color * exposure;
    saturate(c / (Vec3::ONE + c))
}

/// Optimized filmic operator by Jim Hejl and Richard Burgess-Dawson.
///
/// The curve has the display gamma baked in; the trailing `pow 2.2` returns
/// it to linear.
pub fn cineon(color: Vec3, exposure: f32) -> Vec3 {
    let c = (color * exposure - Vec3::splat(0.004)).max(Vec3::ZERO);
    let curve = (c * (6.2 * c + Vec3::splat(0.5))) / (c * (6.2 * c + Vec3::splat(1.7)) + Vec3::splat(0.06));
    curve.powf(2.2)
}

/// Scale applied on top of exposure to compensate for a brighter viewing
/// environment. Fixed calibration value.
const ACES_EXPOSURE_BIAS: f32 = 1.0 / 0.6;

fn rrt_and_odt_fit(v: Vec3) -> Vec3 {
    let a = v * (v + Vec3::splat(0.0245786)) - Vec3::splat(0.000090537);
    let b = v * (0.983729 * v + Vec3::splat(0.432951)) + Vec3::splat(0.238081);
    a / b
}

/// Fitted ACES RRT+ODT.
pub fn aces_filmic(color: Vec3, exposure: f32) -> Vec3 {
    let c = color * (exposure * ACES_EXPOSURE_BIAS);
    let c = ACES_INPUT.apply_vec(c);
    let c = rrt_and_odt_fit(c);
    saturate(ACES_OUTPUT.apply_vec(c))
}

const NEUTRAL_START_COMPRESSION: f32 = 0.8 - 0.04;
const NEUTRAL_DESATURATION: f32 = 0.15;

/// Khronos PBR Neutral: toe offset, then a desaturating shoulder above 0.76.
pub fn neutral(color: Vec3, exposure: f32) -> Vec3 {
    let mut c = color * exposure;

    let x = c.min_element();
    let offset = if x < 0.08 { x - 6.25 * x * x } else { 0.04 };
    c -= Vec3::splat(offset);

    let peak = c.max_element();
    if peak < NEUTRAL_START_COMPRESSION {
        return c;
    }

    let d = 1.0 - NEUTRAL_START_COMPRESSION;
    let new_peak = 1.0 - d * d / (peak + d - NEUTRAL_START_COMPRESSION);
    c *= new_peak / peak;

    let g = 1.0 - 1.0 / (NEUTRAL_DESATURATION * (peak - new_peak) + 1.0);
    c.lerp(Vec3::splat(new_peak), g)
}

/// log2(2^-10 × 0.18)
const AGX_MIN_EV: f32 = -12.47393;
/// log2(2^6.5 × 0.18)
const AGX_MAX_EV: f32 = 4.026069;

/// Degree-6 polynomial fit of the AgX default contrast sigmoid.
fn agx_contrast_approx(x: Vec3) -> Vec3 {
    let x2 = x * x;
    let x4 = x2 * x2;

    15.5 * x4 * x2 - 40.14 * x4 * x + 31.96 * x4 - 6.868 * x2 * x + 0.4298 * x2 + 0.1191 * x
        - Vec3::splat(0.00232)
}

/// AgX in Rec. 2020 primaries. Inputs and outputs are linear sRGB.
///
/// The look CDL is applied in the log/sigmoid domain, between the contrast
/// curve and the outset matrix, with unit clamping.
pub fn agx(color: Vec3, exposure: f32, look: &CdlParams) -> Vec3 {
    let c = LINEAR_SRGB_TO_REC2020.apply_vec(color * exposure);
    let c = AGX_INSET.apply_vec(c);

    // log2 encode; floor keeps zero and negatives out of log2
    let c = c.max(Vec3::splat(1e-10));
    let c = Vec3::new(c.x.log2(), c.y.log2(), c.z.log2());
    let c = saturate((c - Vec3::splat(AGX_MIN_EV)) / (AGX_MAX_EV - AGX_MIN_EV));

    let c = agx_contrast_approx(c);
    let c = apply_cdl_vec(c, look, ClampMode::Unit);
    let c = AGX_OUTSET.apply_vec(c);

    let c = Vec3::from_array(Gamma22Transfer.decode_rgb(c.to_array()));
    saturate(REC2020_TO_LINEAR_SRGB.apply_vec(c))
}
