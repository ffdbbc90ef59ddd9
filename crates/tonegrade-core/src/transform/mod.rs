//! Transform pipeline: parameter definitions, evaluation, and GPU uniform layout.

pub mod evaluate;
pub mod params;
pub mod uniforms;
