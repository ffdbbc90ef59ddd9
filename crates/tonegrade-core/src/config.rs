//! Pipeline configuration.
//!
//! Defaults cover the usual control-surface ranges. A host may load the whole
//! struct from JSON, or start from [`PipelineConfig::from_env`], which reads
//! the adjustment mode from the `TONEGRADE_ADJUSTMENT_MODE` environment
//! variable. [`Default`] never consults the environment.

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};
use crate::grading::wheels::{AdjustmentMode, ParamRange};
use crate::transform::params::{CdlField, StageId};

/// Environment variable overriding [`PipelineConfig::adjustment_mode`].
pub const ADJUSTMENT_MODE_ENV: &str = "TONEGRADE_ADJUSTMENT_MODE";

const DEFAULT_SLOPE_RANGE: ParamRange = ParamRange::new(0.0, 10.0);
const DEFAULT_OFFSET_RANGE: ParamRange = ParamRange::new(-5.0, 5.0);
const DEFAULT_POWER_RANGE: ParamRange = ParamRange::new(0.0, 5.0);

/// Construction-time settings for a [`crate::GradingPipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Wheel encoding used by every CDL stage.
    pub adjustment_mode: AdjustmentMode,
    /// Bounds for wheel-adjusted slope values.
    pub slope_range: ParamRange,
    /// Bounds for wheel-adjusted offset values.
    pub offset_range: ParamRange,
    /// Bounds for wheel-adjusted power values.
    pub power_range: ParamRange,
    /// Stage a preset targets when the caller does not name one.
    pub preset_stage: StageId,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            adjustment_mode: AdjustmentMode::default(),
            slope_range: DEFAULT_SLOPE_RANGE,
            offset_range: DEFAULT_OFFSET_RANGE,
            power_range: DEFAULT_POWER_RANGE,
            preset_stage: StageId::ToneMapLook,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON config; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GradeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus the `TONEGRADE_ADJUSTMENT_MODE` override, if set.
    ///
    /// An unparseable override is an error rather than a silent fallback.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        match std::env::var(ADJUSTMENT_MODE_ENV) {
            Ok(raw) => config.apply_mode_override(&raw)?,
            Err(std::env::VarError::NotPresent) => {}
            Err(e) => {
                tracing::warn!("rejected {ADJUSTMENT_MODE_ENV}: {e}");
                return Err(GradeError::Config(format!("{ADJUSTMENT_MODE_ENV}: {e}")));
            }
        }
        Ok(config)
    }

    /// Apply a textual adjustment-mode override (`nudge`, `master-multiply`,
    /// `master-add`). On error the config is unchanged.
    pub fn apply_mode_override(&mut self, raw: &str) -> Result<()> {
        match raw.parse::<AdjustmentMode>() {
            Ok(mode) => {
                tracing::debug!(%mode, "adjustment mode override applied");
                self.adjustment_mode = mode;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("rejected {ADJUSTMENT_MODE_ENV}={raw:?}: {e}");
                Err(e)
            }
        }
    }

    /// Ranges must be ordered.
    pub fn validate(&self) -> Result<()> {
        for &field in CdlField::all() {
            let range = self.range(field);
            if !range.is_ordered() {
                return Err(GradeError::Config(format!(
                    "{} range [{}, {}] is not ordered",
                    field.label(),
                    range.min,
                    range.max
                )));
            }
        }
        Ok(())
    }

    /// Range for one CDL field.
    pub fn range(&self, field: CdlField) -> ParamRange {
        match field {
            CdlField::Slope => self.slope_range,
            CdlField::Offset => self.offset_range,
            CdlField::Power => self.power_range,
        }
    }

    /// Slope, offset, power ranges in field order.
    pub fn ranges(&self) -> [ParamRange; 3] {
        [self.slope_range, self.offset_range, self.power_range]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ranges_match_control_surface() {
        let config = PipelineConfig::default();
        assert_eq!(config.slope_range, ParamRange::new(0.0, 10.0));
        assert_eq!(config.offset_range, ParamRange::new(-5.0, 5.0));
        assert_eq!(config.power_range, ParamRange::new(0.0, 5.0));
        assert_eq!(config.preset_stage, StageId::ToneMapLook);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            PipelineConfig::from_json(r#"{ "adjustment_mode": "master-multiply" }"#).unwrap();
        assert_eq!(config.adjustment_mode, AdjustmentMode::MasterMultiply);
        assert_eq!(config.power_range, ParamRange::new(0.0, 5.0));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let json = r#"{ "slope_range": { "min": 2.0, "max": 1.0 } }"#;
        assert!(matches!(
            PipelineConfig::from_json(json),
            Err(GradeError::Config(_))
        ));
    }

    #[test]
    fn test_default_ignores_environment() {
        assert_eq!(PipelineConfig::default().adjustment_mode, AdjustmentMode::Nudge);
    }

    #[test]
    fn test_mode_override_accepts_known_value() {
        let mut config = PipelineConfig::default();
        config.apply_mode_override("master-add").unwrap();
        assert_eq!(config.adjustment_mode, AdjustmentMode::MasterAdd);
        config.apply_mode_override(" Multiply ").unwrap();
        assert_eq!(config.adjustment_mode, AdjustmentMode::MasterMultiply);
    }

    #[test]
    fn test_mode_override_rejects_unknown_value() {
        let mut config = PipelineConfig::default();
        let err = config.apply_mode_override("spinny").unwrap_err();
        assert!(matches!(err, GradeError::Config(ref msg) if msg.contains("spinny")));
        assert_eq!(config.adjustment_mode, AdjustmentMode::Nudge);
    }

    #[test]
    fn test_struct_literal_with_inverted_range_fails_validate() {
        let config = PipelineConfig {
            power_range: ParamRange::new(3.0, 1.0),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(GradeError::Config(_))));
    }

    #[test]
    fn test_plain_deserialize_rejects_inverted_range() {
        let json = r#"{ "power_range": { "min": 3.0, "max": 1.0 } }"#;
        assert!(serde_json::from_str::<PipelineConfig>(json).is_err());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(PipelineConfig::from_json("{ not json").is_err());
    }
}
