//! Transfer function (OETF/EOTF) implementations.
//!
//! Transfer functions convert between non-linear (encoded) and linear light values.

/// A transfer function that converts between linear and non-linear encodings.
pub trait TransferFunction: Send + Sync {
    /// Convert from non-linear (encoded) to linear light.
    fn to_linear(&self, encoded: f32) -> f32;

    /// Convert from linear light to non-linear (encoded).
    fn to_encoded(&self, linear: f32) -> f32;

    /// Encode each channel of an RGB triplet.
    fn encode_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| self.to_encoded(c))
    }

    /// Decode each channel of an RGB triplet.
    fn decode_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| self.to_linear(c))
    }
}

// ---------------------------------------------------------------------------
// sRGB (IEC 61966-2-1)
// ---------------------------------------------------------------------------

/// sRGB transfer function per IEC 61966-2-1. Used as the final display encode.
///
/// ```text
/// to_linear:   V <= 0.04045 → V / 12.92
///              V >  0.04045 → ((V + 0.055) / 1.055) ^ 2.4
///
/// from_linear: L <= 0.0031308 → L × 12.92
///              L >  0.0031308 → 1.055 × L^(1/2.4) − 0.055
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SrgbTransfer;

impl TransferFunction for SrgbTransfer {
    fn to_linear(&self, encoded: f32) -> f32 {
        if encoded <= 0.04045 {
            encoded / 12.92
        } else {
            ((encoded + 0.055) / 1.055).powf(2.4)
        }
    }

    fn to_encoded(&self, linear: f32) -> f32 {
        if linear <= 0.0031308 {
            linear * 12.92
        } else {
            1.055 * linear.powf(1.0 / 2.4) - 0.055
        }
    }
}

// ---------------------------------------------------------------------------
// Pure gamma 2.2
// ---------------------------------------------------------------------------

/// Pure power-law 2.2 curve. AgX linearizes its display encoding with it.
///
/// Negative inputs are clamped to zero before the power.
#[derive(Debug, Clone, Copy)]
pub struct Gamma22Transfer;

impl Gamma22Transfer {
    const GAMMA: f32 = 2.2;
}

impl TransferFunction for Gamma22Transfer {
    fn to_linear(&self, encoded: f32) -> f32 {
        encoded.max(0.0).powf(Self::GAMMA)
    }

    fn to_encoded(&self, linear: f32) -> f32 {
        linear.max(0.0).powf(1.0 / Self::GAMMA)
    }
}
