//! Named parameter bundles for the CDL stages.
//!
//! Two kinds exist: direct CDL bundles, where every unset field falls back to
//! identity, and "primary" contrast/saturation bundles, expanded into CDL as
//! a contrast about mid-gray:
//!
//! ```text
//!   slope  = contrast
//!   offset = (1 − contrast) / 2      (0.5 maps to 0.5)
//!   power  = 1
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GradeError, Result};
use crate::transform::params::CdlParams;

/// Pivot preserved by primary contrast expansion.
pub const CONTRAST_PIVOT: f32 = 0.5;

/// A preset definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Preset {
    Cdl {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slope: Option<[f32; 3]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<[f32; 3]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        power: Option<[f32; 3]>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        saturation: Option<f32>,
    },
    Primary {
        contrast: f32,
        saturation: f32,
    },
}

impl Preset {
    /// Expand to the CDL parameters the preset stands for.
    pub fn to_cdl(&self) -> CdlParams {
        match *self {
            Self::Cdl {
                slope,
                offset,
                power,
                saturation,
            } => CdlParams {
                slope: slope.unwrap_or(CdlParams::IDENTITY.slope),
                offset: offset.unwrap_or(CdlParams::IDENTITY.offset),
                power: power.unwrap_or(CdlParams::IDENTITY.power),
                saturation: saturation.unwrap_or(CdlParams::IDENTITY.saturation),
            },
            Self::Primary {
                contrast,
                saturation,
            } => CdlParams {
                slope: [contrast; 3],
                offset: [CONTRAST_PIVOT * (1.0 - contrast); 3],
                power: CdlParams::IDENTITY.power,
                saturation,
            },
        }
    }
}

/// A preset with its lookup name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPreset {
    pub name: String,
    #[serde(flatten)]
    pub preset: Preset,
}

const fn primary(contrast: f32) -> Preset {
    Preset::Primary {
        contrast,
        saturation: 1.0,
    }
}

const BUILTIN: [(&str, Preset); 10] = [
    ("Very High Contrast", primary(1.6)),
    ("High Contrast", primary(1.4)),
    ("Medium High Contrast", primary(1.2)),
    ("Base Contrast", primary(1.0)),
    ("Medium Low Contrast", primary(0.9)),
    ("Low Contrast", primary(0.8)),
    ("Very Low Contrast", primary(0.6)),
    (
        "Punchy",
        Preset::Cdl {
            slope: None,
            offset: None,
            power: Some([1.35, 1.35, 1.35]),
            saturation: Some(1.4),
        },
    ),
    (
        "Golden",
        Preset::Cdl {
            slope: Some([1.0, 0.9, 0.5]),
            offset: None,
            power: Some([0.8, 0.8, 0.8]),
            saturation: Some(1.3),
        },
    ),
    (
        "Greyscale",
        Preset::Cdl {
            slope: None,
            offset: None,
            power: None,
            saturation: Some(0.0),
        },
    ),
];

/// Immutable lookup table of presets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PresetCatalog {
    presets: Vec<NamedPreset>,
}

impl PresetCatalog {
    /// The catalog shipped with the pipeline.
    pub fn builtin() -> Self {
        Self {
            presets: BUILTIN
                .iter()
                .map(|(name, preset)| NamedPreset {
                    name: (*name).to_string(),
                    preset: *preset,
                })
                .collect(),
        }
    }

    /// Parse a host catalog: `{ "presets": [{ "name": ..., "kind": ..., ... }] }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        for entry in &catalog.presets {
            entry.preset.to_cdl().validate()?;
        }
        Ok(catalog)
    }

    /// Look up a preset by exact name.
    pub fn get(&self, name: &str) -> Result<&Preset> {
        self.presets
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.preset)
            .ok_or_else(|| GradeError::UnknownPreset(name.to_string()))
    }

    /// Preset names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Add entries from `other`; same-named entries are replaced in place.
    pub fn merge(&mut self, other: PresetCatalog) {
        for entry in other.presets {
            match self.presets.iter_mut().find(|p| p.name == entry.name) {
                Some(existing) => existing.preset = entry.preset,
                None => self.presets.push(entry),
            }
        }
    }
}
