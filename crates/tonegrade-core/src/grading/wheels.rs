//! Wheel-driven CDL controls.
//!
//! Each vector CDL field (slope, offset, power) is edited through a
//! [`ChannelControl`]: an absolute per-channel value, an optional uniform
//! master, and a transient wheel that is folded in on commit.
//!
//! # Adjustment modes
//! ```text
//!   Nudge:          effective = rgb + wheel              (master unused)
//!   MasterMultiply: effective = rgb × master × wheel     (slope, power; identity 1)
//!                   effective = rgb + master + wheel     (offset; identity 0)
//!   MasterAdd:      effective = rgb + master + wheel     (identity 0)
//! ```
//! Offset has an additive master in every mode; its identity is zero, so a
//! multiplicative master could never move it.
//!
//! Effective values are clamped into the control's [`ParamRange`].
//!
//! On commit the wheel is folded into the base and reset to its identity:
//! `Nudge` folds into `rgb` (storing the clamped result), the master modes
//! fold into `master`. A fold that would overflow is rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result, ensure_finite, ensure_finite3};
use crate::grading::tone_map::ToneMapOperator;
use crate::transform::params::{CdlField, CdlParams, ToneMapParams};

/// How the wheel and master combine with the per-channel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentMode {
    /// Plain absolute vector; the wheel nudges all channels additively.
    #[default]
    Nudge,
    /// `[R, G, B, Master]` with a multiplicative master and wheel
    /// (additive for offset).
    MasterMultiply,
    /// `[R, G, B, Master]` with an additive master and wheel.
    MasterAdd,
}

impl AdjustmentMode {
    /// Whether master and wheel scale `field` rather than shift it.
    pub const fn multiplies(&self, field: CdlField) -> bool {
        matches!(self, Self::MasterMultiply) && !matches!(field, CdlField::Offset)
    }

    /// Identity value of the wheel (and master) for `field` under this mode.
    pub const fn wheel_identity(&self, field: CdlField) -> f32 {
        if self.multiplies(field) { 1.0 } else { 0.0 }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Nudge => "nudge",
            Self::MasterMultiply => "master-multiply",
            Self::MasterAdd => "master-add",
        }
    }
}

impl fmt::Display for AdjustmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AdjustmentMode {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nudge" => Ok(Self::Nudge),
            "master-multiply" | "multiply" => Ok(Self::MasterMultiply),
            "master-add" | "add" => Ok(Self::MasterAdd),
            other => Err(GradeError::Config(format!("unknown adjustment mode `{other}`"))),
        }
    }
}

/// Inclusive bounds for an effective channel value.
///
/// Deserialization rejects inverted or NaN bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds")]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
}

#[derive(Deserialize)]
struct RangeBounds {
    min: f32,
    max: f32,
}

impl TryFrom<RangeBounds> for ParamRange {
    type Error = GradeError;

    fn try_from(b: RangeBounds) -> Result<Self> {
        Self::try_new(b.min, b.max)
    }
}

impl ParamRange {
    /// Unchecked constructor for known-good constants; see [`Self::try_new`].
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range from untrusted bounds.
    pub fn try_new(min: f32, max: f32) -> Result<Self> {
        let range = Self { min, max };
        if !range.is_ordered() {
            return Err(GradeError::Config(format!("range [{min}, {max}] is not ordered")));
        }
        Ok(range)
    }

    /// Unbounded range.
    pub const UNBOUNDED: Self = Self::new(f32::NEG_INFINITY, f32::INFINITY);

    /// Both bounds are numbers and `min <= max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Clamp into the range. Never panics; NaN maps to `min`.
    #[inline]
    pub fn clamp(&self, v: f32) -> f32 {
        v.max(self.min).min(self.max)
    }
}

/// One vector CDL field edited as `{base, wheel}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelControl {
    /// Per-channel absolute values.
    pub rgb: [f32; 3],
    /// Uniform master component. Unused by [`AdjustmentMode::Nudge`].
    pub master: f32,
    /// Transient wheel value, folded into the base on commit.
    pub wheel: f32,
    field: CdlField,
    mode: AdjustmentMode,
    range: ParamRange,
}

impl ChannelControl {
    /// Control at the identity of `field`.
    pub fn new(field: CdlField, mode: AdjustmentMode, range: ParamRange) -> Self {
        let identity = mode.wheel_identity(field);
        Self {
            rgb: [field.identity(); 3],
            master: identity,
            wheel: identity,
            field,
            mode,
            range,
        }
    }

    fn combine(&self, amount: f32) -> [f32; 3] {
        if self.mode.multiplies(self.field) {
            self.rgb.map(|c| c * amount)
        } else {
            self.rgb.map(|c| c + amount)
        }
    }

    fn wheel_identity(&self) -> f32 {
        self.mode.wheel_identity(self.field)
    }

    pub fn field(&self) -> CdlField {
        self.field
    }

    pub fn mode(&self) -> AdjustmentMode {
        self.mode
    }

    pub fn range(&self) -> ParamRange {
        self.range
    }

    /// Switch adjustment mode, keeping the current value.
    ///
    /// Any pending wheel is committed first; the master is folded into the
    /// per-channel values and restarts at the new mode's identity. On error
    /// the control is unchanged.
    pub fn set_mode(&mut self, mode: AdjustmentMode) -> Result<()> {
        if mode == self.mode {
            return Ok(());
        }
        let mut next = *self;
        next.commit()?;
        let base = ensure_finite3(self.field.label(), next.base())?;
        next.mode = mode;
        next.load(base);
        *self = next;
        Ok(())
    }

    /// Base value with the master folded in, excluding the wheel.
    pub fn base(&self) -> [f32; 3] {
        match self.mode {
            AdjustmentMode::Nudge => self.rgb,
            AdjustmentMode::MasterMultiply | AdjustmentMode::MasterAdd => self.combine(self.master),
        }
    }

    /// Value fed to the transform: base, master, and wheel combined, then range-clamped.
    pub fn effective(&self) -> [f32; 3] {
        let amount = match self.mode {
            AdjustmentMode::Nudge => self.wheel,
            _ if self.mode.multiplies(self.field) => self.master * self.wheel,
            _ => self.master + self.wheel,
        };
        self.combine(amount).map(|c| self.range.clamp(c))
    }

    /// Replace the per-channel values.
    pub fn set_rgb(&mut self, rgb: [f32; 3]) -> Result<()> {
        self.rgb = ensure_finite3("channel", rgb)?;
        Ok(())
    }

    /// Replace the master component.
    pub fn set_master(&mut self, master: f32) -> Result<()> {
        self.master = ensure_finite("master", master)?;
        Ok(())
    }

    /// Replace the transient wheel value (absolute, relative to drag start).
    pub fn set_wheel(&mut self, wheel: f32) -> Result<()> {
        self.wheel = ensure_finite("wheel", wheel)?;
        Ok(())
    }

    /// Fold the wheel into the base and reset it to identity.
    ///
    /// A fold that overflows is rejected and the control keeps its wheel.
    pub fn commit(&mut self) -> Result<()> {
        match self.mode {
            AdjustmentMode::Nudge => {
                self.rgb = ensure_finite3("channel", self.effective())?;
            }
            _ => {
                let master = if self.mode.multiplies(self.field) {
                    self.master * self.wheel
                } else {
                    self.master + self.wheel
                };
                self.master = ensure_finite("master", master)?;
            }
        }
        self.wheel = self.wheel_identity();
        Ok(())
    }

    /// Overwrite with an absolute value, dropping master and wheel.
    pub fn load(&mut self, rgb: [f32; 3]) {
        self.rgb = rgb;
        self.master = self.wheel_identity();
        self.wheel = self.wheel_identity();
    }

    /// Back to the field's identity.
    pub fn reset(&mut self) {
        self.load([self.field.identity(); 3]);
    }

    /// Whether a wheel drag is in progress.
    pub fn has_pending_wheel(&self) -> bool {
        self.wheel != self.wheel_identity()
    }
}

/// Interactive state of one CDL stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdlControls {
    pub slope: ChannelControl,
    pub offset: ChannelControl,
    pub power: ChannelControl,
    pub saturation: f32,
}

impl CdlControls {
    /// Identity controls with per-field ranges.
    pub fn new(mode: AdjustmentMode, ranges: [ParamRange; 3]) -> Self {
        let [slope, offset, power] = ranges;
        Self {
            slope: ChannelControl::new(CdlField::Slope, mode, slope),
            offset: ChannelControl::new(CdlField::Offset, mode, offset),
            power: ChannelControl::new(CdlField::Power, mode, power),
            saturation: 1.0,
        }
    }

    pub fn field(&self, field: CdlField) -> &ChannelControl {
        match field {
            CdlField::Slope => &self.slope,
            CdlField::Offset => &self.offset,
            CdlField::Power => &self.power,
        }
    }

    pub fn field_mut(&mut self, field: CdlField) -> &mut ChannelControl {
        match field {
            CdlField::Slope => &mut self.slope,
            CdlField::Offset => &mut self.offset,
            CdlField::Power => &mut self.power,
        }
    }

    /// Switch every field to `mode`, keeping current values. All or nothing.
    pub fn set_mode(&mut self, mode: AdjustmentMode) -> Result<()> {
        let mut next = *self;
        for &field in CdlField::all() {
            next.field_mut(field).set_mode(mode)?;
        }
        *self = next;
        Ok(())
    }

    pub fn set_saturation(&mut self, saturation: f32) -> Result<()> {
        self.saturation = ensure_finite("saturation", saturation)?;
        Ok(())
    }

    /// Commit every pending wheel. All or nothing.
    pub fn commit_all(&mut self) -> Result<()> {
        let mut next = *self;
        for &field in CdlField::all() {
            next.field_mut(field).commit()?;
        }
        *self = next;
        Ok(())
    }

    /// Overwrite from plain parameters; wheels and masters return to identity.
    pub fn load(&mut self, params: &CdlParams) -> Result<()> {
        params.validate()?;
        self.slope.load(params.slope);
        self.offset.load(params.offset);
        self.power.load(params.power);
        self.saturation = params.saturation;
        Ok(())
    }

    pub fn reset(&mut self) {
        for &field in CdlField::all() {
            self.field_mut(field).reset();
        }
        self.saturation = 1.0;
    }

    /// Flatten to the values the transform reads, wheels included.
    pub fn to_params(&self) -> CdlParams {
        CdlParams {
            slope: self.slope.effective(),
            offset: self.offset.effective(),
            power: self.power.effective(),
            saturation: self.saturation,
        }
    }
}

/// Interactive state of the tone-map stage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ToneMapControls {
    pub params: ToneMapParams,
}

impl ToneMapControls {
    pub fn set_operator(&mut self, operator: ToneMapOperator) {
        self.params.operator = operator;
    }

    /// Exposure in stops.
    pub fn set_exposure(&mut self, stops: f32) -> Result<()> {
        self.params.exposure = ensure_finite("exposure", stops)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.params = ToneMapParams::default();
    }
}
