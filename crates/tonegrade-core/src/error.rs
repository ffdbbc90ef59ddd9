//! Error type shared by every fallible operation in the grading core.

/// Errors reported to the caller of a parameter update or image operation.
///
/// None of these are fatal to the pipeline: a failed update leaves the
/// previous value in effect.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    #[error("invalid value for {field}: {value}")]
    InvalidParameter { field: &'static str, value: f32 },
    #[error("pixel buffer holds {len} pixels, expected {width}x{height}")]
    DimensionMismatch { width: u32, height: u32, len: usize },
    #[error("malformed preset catalog: {0}")]
    Catalog(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GradeError>;

/// Reject non-finite scalars before they reach the pipeline.
pub(crate) fn ensure_finite(field: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GradeError::InvalidParameter { field, value })
    }
}

/// Component-wise [`ensure_finite`]; reports the first offending component.
pub(crate) fn ensure_finite3(field: &'static str, value: [f32; 3]) -> Result<[f32; 3]> {
    for v in value {
        ensure_finite(field, v)?;
    }
    Ok(value)
}
