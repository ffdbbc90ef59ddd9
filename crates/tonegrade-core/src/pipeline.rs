//! Stage-owning grading pipeline and its control-surface contract.
//!
//! [`GradingPipeline`] is the single source of truth for grading state. The
//! host feeds it [`ControlEvent`]s (or calls the setters directly) and takes a
//! [`PipelineSnapshot`] once per frame for evaluation.

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::grading::tone_map::ToneMapOperator;
use crate::grading::wheels::{AdjustmentMode, CdlControls, ToneMapControls};
use crate::presets::PresetCatalog;
use crate::transform::params::{CdlField, CdlParams, PipelineSnapshot, StageId, ToneMapParams};

/// Discrete parameter-update events from the control surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ControlEvent {
    /// Set the per-channel values of a CDL field.
    SetChannel {
        stage: StageId,
        field: CdlField,
        rgb: [f32; 3],
    },
    /// Set the uniform master of a CDL field.
    SetMaster {
        stage: StageId,
        field: CdlField,
        value: f32,
    },
    /// Wheel drag in progress.
    SetWheel {
        stage: StageId,
        field: CdlField,
        value: f32,
    },
    /// Wheel released: fold the transient into the base.
    Commit { stage: StageId, field: CdlField },
    SetSaturation { stage: StageId, value: f32 },
    SetOperator { operator: ToneMapOperator },
    /// Exposure in stops.
    SetExposure { stops: f32 },
    /// Apply a named preset; `stage` defaults to the configured preset stage.
    ApplyPreset {
        name: String,
        #[serde(default)]
        stage: Option<StageId>,
    },
    ResetStage { stage: StageId },
    /// Reset every stage to identity.
    ResetAll,
}

/// Pre CDL → tone map (with look CDL) → post CDL.
#[derive(Debug, Clone)]
pub struct GradingPipeline {
    config: PipelineConfig,
    catalog: PresetCatalog,
    pre_cdl: CdlControls,
    tone_map: ToneMapControls,
    look_cdl: CdlControls,
    post_cdl: CdlControls,
}

impl Default for GradingPipeline {
    fn default() -> Self {
        // Default ranges are ordered constants.
        Self::from_validated(PipelineConfig::default(), PresetCatalog::builtin())
    }
}

impl GradingPipeline {
    /// Identity pipeline with the built-in preset catalog.
    ///
    /// Fails if `config` carries an inverted or NaN range.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_catalog(config, PresetCatalog::builtin())
    }

    pub fn with_catalog(config: PipelineConfig, catalog: PresetCatalog) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_validated(config, catalog))
    }

    fn from_validated(config: PipelineConfig, catalog: PresetCatalog) -> Self {
        let cdl = CdlControls::new(config.adjustment_mode, config.ranges());
        tracing::debug!(mode = %config.adjustment_mode, "grading pipeline created");
        Self {
            config,
            catalog,
            pre_cdl: cdl,
            tone_map: ToneMapControls::default(),
            look_cdl: cdl,
            post_cdl: cdl,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    /// Replace or extend the preset catalog.
    pub fn catalog_mut(&mut self) -> &mut PresetCatalog {
        &mut self.catalog
    }

    /// Interactive state of one CDL stage.
    pub fn cdl(&self, stage: StageId) -> &CdlControls {
        match stage {
            StageId::PreCdl => &self.pre_cdl,
            StageId::ToneMapLook => &self.look_cdl,
            StageId::PostCdl => &self.post_cdl,
        }
    }

    pub fn cdl_mut(&mut self, stage: StageId) -> &mut CdlControls {
        match stage {
            StageId::PreCdl => &mut self.pre_cdl,
            StageId::ToneMapLook => &mut self.look_cdl,
            StageId::PostCdl => &mut self.post_cdl,
        }
    }

    pub fn tone_map(&self) -> &ToneMapParams {
        &self.tone_map.params
    }

    /// Effective values of every stage, wheels included.
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            pre_cdl: self.pre_cdl.to_params(),
            tone_map: self.tone_map.params,
            look_cdl: self.look_cdl.to_params(),
            post_cdl: self.post_cdl.to_params(),
        }
    }

    pub fn set_channel(&mut self, stage: StageId, field: CdlField, rgb: [f32; 3]) -> Result<()> {
        self.cdl_mut(stage).field_mut(field).set_rgb(rgb)?;
        tracing::debug!(%stage, field = field.label(), ?rgb, "channel set");
        Ok(())
    }

    pub fn set_master(&mut self, stage: StageId, field: CdlField, value: f32) -> Result<()> {
        self.cdl_mut(stage).field_mut(field).set_master(value)?;
        tracing::debug!(%stage, field = field.label(), value, "master set");
        Ok(())
    }

    pub fn set_wheel(&mut self, stage: StageId, field: CdlField, value: f32) -> Result<()> {
        self.cdl_mut(stage).field_mut(field).set_wheel(value)?;
        // Fires at drag rate, so one level below the other updates.
        tracing::trace!(%stage, field = field.label(), value, "wheel set");
        Ok(())
    }

    pub fn commit(&mut self, stage: StageId, field: CdlField) -> Result<()> {
        let control = self.cdl_mut(stage).field_mut(field);
        control.commit()?;
        tracing::debug!(%stage, field = field.label(), base = ?control.base(), "wheel committed");
        Ok(())
    }

    pub fn set_saturation(&mut self, stage: StageId, value: f32) -> Result<()> {
        self.cdl_mut(stage).set_saturation(value)?;
        tracing::debug!(%stage, value, "saturation set");
        Ok(())
    }

    /// Switch operator. CDL stages are untouched.
    pub fn set_operator(&mut self, operator: ToneMapOperator) {
        self.tone_map.set_operator(operator);
        tracing::debug!(%operator, "tone-map operator set");
    }

    pub fn set_exposure(&mut self, stops: f32) -> Result<()> {
        self.tone_map.set_exposure(stops)?;
        tracing::debug!(stops, "exposure set");
        Ok(())
    }

    /// Overwrite a CDL stage from plain parameters.
    pub fn load_cdl(&mut self, stage: StageId, params: &CdlParams) -> Result<()> {
        self.cdl_mut(stage).load(params)
    }

    /// Switch every CDL stage to a different wheel encoding, keeping values.
    ///
    /// Either every stage switches or none does.
    pub fn set_adjustment_mode(&mut self, mode: AdjustmentMode) -> Result<()> {
        let mut stages = [self.pre_cdl, self.look_cdl, self.post_cdl];
        for stage in &mut stages {
            stage.set_mode(mode)?;
        }
        [self.pre_cdl, self.look_cdl, self.post_cdl] = stages;
        self.config.adjustment_mode = mode;
        tracing::debug!(%mode, "adjustment mode set");
        Ok(())
    }

    /// Apply a named preset to `stage`.
    ///
    /// Unknown names leave every stage unchanged.
    pub fn apply_preset(&mut self, name: &str, stage: StageId) -> Result<()> {
        let params = self.catalog.get(name)?.to_cdl();
        self.cdl_mut(stage).load(&params)?;
        tracing::info!(preset = name, %stage, "preset applied");
        Ok(())
    }

    pub fn reset_stage(&mut self, stage: StageId) {
        self.cdl_mut(stage).reset();
        tracing::info!(%stage, "stage reset");
    }

    pub fn reset_all(&mut self) {
        for &stage in StageId::all() {
            self.cdl_mut(stage).reset();
        }
        self.tone_map.reset();
        tracing::info!("all stages reset");
    }

    /// Dispatch one control event. Errors leave the state unchanged.
    pub fn handle(&mut self, event: &ControlEvent) -> Result<()> {
        let result = match event {
            ControlEvent::SetChannel { stage, field, rgb } => self.set_channel(*stage, *field, *rgb),
            ControlEvent::SetMaster {
                stage,
                field,
                value,
            } => self.set_master(*stage, *field, *value),
            ControlEvent::SetWheel {
                stage,
                field,
                value,
            } => self.set_wheel(*stage, *field, *value),
            ControlEvent::Commit { stage, field } => self.commit(*stage, *field),
            ControlEvent::SetSaturation { stage, value } => self.set_saturation(*stage, *value),
            ControlEvent::SetOperator { operator } => {
                self.set_operator(*operator);
                Ok(())
            }
            ControlEvent::SetExposure { stops } => self.set_exposure(*stops),
            ControlEvent::ApplyPreset { name, stage } => {
                let stage = stage.unwrap_or(self.config.preset_stage);
                self.apply_preset(name, stage)
            }
            ControlEvent::ResetStage { stage } => {
                self.reset_stage(*stage);
                Ok(())
            }
            ControlEvent::ResetAll => {
                self.reset_all();
                Ok(())
            }
        };
        if let Err(ref e) = result {
            tracing::warn!("rejected {event:?}: {e}");
        }
        result
    }
}
