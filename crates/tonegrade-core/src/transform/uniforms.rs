//! std140-compatible packing of a [`PipelineSnapshot`] for shader substrates.
//!
//! Every vector is padded to a `vec4`, so the struct can be uploaded as a
//! uniform buffer with `bytemuck::bytes_of`.

use bytemuck::{Pod, Zeroable};

use crate::transform::params::{CdlParams, PipelineSnapshot};

/// One CDL stage as three `vec4`s; `.w` of the first carries saturation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CdlUniform {
    /// `slope.xyz`, saturation in `.w`.
    pub slope_saturation: [f32; 4],
    /// `offset.xyz`, `.w` unused.
    pub offset: [f32; 4],
    /// `power.xyz`, `.w` unused.
    pub power: [f32; 4],
}

impl From<&CdlParams> for CdlUniform {
    fn from(p: &CdlParams) -> Self {
        Self {
            slope_saturation: [p.slope[0], p.slope[1], p.slope[2], p.saturation],
            offset: [p.offset[0], p.offset[1], p.offset[2], 0.0],
            power: [p.power[0], p.power[1], p.power[2], 0.0],
        }
    }
}

/// Full frame uniform block.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub pre_cdl: CdlUniform,
    pub look_cdl: CdlUniform,
    pub post_cdl: CdlUniform,
    /// Linear exposure multiplier (`2^stops`).
    pub exposure: f32,
    /// [`crate::ToneMapOperator::to_u32`].
    pub operator: u32,
    pub _pad: [u32; 2],
}

impl From<&PipelineSnapshot> for FrameUniforms {
    fn from(s: &PipelineSnapshot) -> Self {
        Self {
            pre_cdl: (&s.pre_cdl).into(),
            look_cdl: (&s.look_cdl).into(),
            post_cdl: (&s.post_cdl).into(),
            exposure: s.tone_map.exposure_multiplier(),
            operator: s.tone_map.operator.to_u32(),
            _pad: [0; 2],
        }
    }
}

impl FrameUniforms {
    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
