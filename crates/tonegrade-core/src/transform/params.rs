//! Plain parameter structs consumed by the per-pixel transform.
//!
//! These are the values the pipeline evaluates against. The interactive
//! control state (wheels, masters) lives in [`crate::grading::wheels`] and is
//! flattened into these structs when a snapshot is taken.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result, ensure_finite, ensure_finite3};
use crate::grading::tone_map::ToneMapOperator;

/// ASC CDL v1.2 parameters.
///
/// Identity: slope `[1, 1, 1]`, offset `[0, 0, 0]`, power `[1, 1, 1]`,
/// saturation `1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdlParams {
    /// Per-channel multiplier applied first.
    pub slope: [f32; 3],
    /// Per-channel addend applied after slope.
    pub offset: [f32; 3],
    /// Per-channel exponent applied after offset.
    pub power: [f32; 3],
    /// Chroma scale around Rec. 709 luma.
    pub saturation: f32,
}

impl CdlParams {
    /// The no-op CDL.
    pub const IDENTITY: Self = Self {
        slope: [1.0, 1.0, 1.0],
        offset: [0.0, 0.0, 0.0],
        power: [1.0, 1.0, 1.0],
        saturation: 1.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Reject any non-finite component.
    pub fn validate(&self) -> Result<()> {
        ensure_finite3("slope", self.slope)?;
        ensure_finite3("offset", self.offset)?;
        ensure_finite3("power", self.power)?;
        ensure_finite("saturation", self.saturation)?;
        Ok(())
    }

    /// Read one of the three vector fields.
    pub fn field(&self, field: CdlField) -> [f32; 3] {
        match field {
            CdlField::Slope => self.slope,
            CdlField::Offset => self.offset,
            CdlField::Power => self.power,
        }
    }
}

impl Default for CdlParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Tone-map stage parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneMapParams {
    /// Active operator.
    pub operator: ToneMapOperator,
    /// Exposure in stops (EV). Converted to `2^stops` before use.
    pub exposure: f32,
}

impl ToneMapParams {
    /// Linear multiplier for the stored exposure stops.
    pub fn exposure_multiplier(&self) -> f32 {
        self.exposure.exp2()
    }

    pub fn validate(&self) -> Result<()> {
        ensure_finite("exposure", self.exposure)?;
        Ok(())
    }
}

impl Default for ToneMapParams {
    fn default() -> Self {
        Self {
            operator: ToneMapOperator::AgX,
            exposure: 0.0,
        }
    }
}

/// Addresses one of the three CDL parameter instances owned by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageId {
    /// CDL on the scene-referred signal, before tone mapping. Lower clamp only.
    PreCdl,
    /// CDL embedded in the tone-map operator (the AgX look step).
    ToneMapLook,
    /// CDL on the display-referred signal, after tone mapping.
    PostCdl,
}

impl StageId {
    /// Human-readable label for UI panels.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PreCdl => "Pre-transform CDL (Linear)",
            Self::ToneMapLook => "Pre-transform CDL (Log)",
            Self::PostCdl => "Post-transform CDL",
        }
    }

    /// Stages in evaluation order.
    pub fn all() -> &'static [Self] {
        const ALL: [StageId; 3] = [StageId::PreCdl, StageId::ToneMapLook, StageId::PostCdl];
        &ALL
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StageId {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre-cdl" | "pre" => Ok(Self::PreCdl),
            "tone-map-look" | "look" => Ok(Self::ToneMapLook),
            "post-cdl" | "post" => Ok(Self::PostCdl),
            other => Err(GradeError::Config(format!("unknown stage `{other}`"))),
        }
    }
}

/// The three vector-valued CDL fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CdlField {
    Slope,
    Offset,
    Power,
}

impl CdlField {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Slope => "slope",
            Self::Offset => "offset",
            Self::Power => "power",
        }
    }

    /// Per-channel identity value of this field.
    pub const fn identity(&self) -> f32 {
        match self {
            Self::Slope | Self::Power => 1.0,
            Self::Offset => 0.0,
        }
    }

    pub fn all() -> &'static [Self] {
        const ALL: [CdlField; 3] = [CdlField::Slope, CdlField::Offset, CdlField::Power];
        &ALL
    }
}

/// Everything one frame is evaluated against.
///
/// Taken once per frame by the host; every pixel of that frame reads this
/// copy, so updates made mid-frame only land on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub pre_cdl: CdlParams,
    pub tone_map: ToneMapParams,
    /// CDL applied inside the tone-map operator (AgX only).
    pub look_cdl: CdlParams,
    pub post_cdl: CdlParams,
}

impl PipelineSnapshot {
    /// CDL parameters for one stage.
    pub fn cdl(&self, stage: StageId) -> &CdlParams {
        match stage {
            StageId::PreCdl => &self.pre_cdl,
            StageId::ToneMapLook => &self.look_cdl,
            StageId::PostCdl => &self.post_cdl,
        }
    }
}
