//! Tonegrade Core: CPU reference for a display grading chain.
//!
//! ```text
//!   linear RGB ─► pre CDL (lower clamp) ─► tone map (+ AgX look CDL)
//!              ─► post CDL (unit clamp) ─► sRGB OETF ─► display RGB
//! ```
//!
//! Parameters live in a [`GradingPipeline`] edited through [`ControlEvent`]s;
//! rendering reads an immutable [`PipelineSnapshot`]. No GPU or framework
//! dependencies.

pub mod color_management;
pub mod config;
pub mod error;
pub mod grading;
pub mod image;
pub mod pipeline;
pub mod presets;
pub mod session;
pub mod transform;

// Re-exports for convenience.
pub use config::PipelineConfig;
pub use error::{GradeError, Result};
pub use grading::cdl::{ClampMode, apply_cdl};
pub use grading::tone_map::{ToneMapOperator, apply_tone_map};
pub use grading::wheels::AdjustmentMode;
pub use self::image::GradingImage;
pub use pipeline::{ControlEvent, GradingPipeline};
pub use presets::{Preset, PresetCatalog};
pub use session::{FrameSnapshot, SharedPipeline};
pub use transform::evaluate::{evaluate_pixel, evaluate_transform, process_image};
pub use transform::params::{CdlField, CdlParams, PipelineSnapshot, StageId, ToneMapParams};
pub use transform::uniforms::FrameUniforms;
