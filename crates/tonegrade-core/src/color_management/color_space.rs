//! Linear gamut conversion matrices.
//!
//! Every constant below is written column by column, matching the layout of
//! the shader matrices the operators were fitted against.

use glam::{Mat3, Vec3};

/// A 3x3 color matrix for linear color space conversions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub Mat3);

impl ColorMatrix {
    /// Returns the identity matrix (no-op transform).
    pub const fn identity() -> Self {
        Self(Mat3::IDENTITY)
    }

    /// Build a matrix from its three columns.
    pub const fn from_cols(x: [f32; 3], y: [f32; 3], z: [f32; 3]) -> Self {
        Self(Mat3::from_cols(
            Vec3::from_array(x),
            Vec3::from_array(y),
            Vec3::from_array(z),
        ))
    }

    /// Apply this matrix to an RGB triplet.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.apply_vec(Vec3::from_array(rgb)).to_array()
    }

    /// Apply this matrix to a `Vec3`.
    #[inline]
    pub fn apply_vec(&self, rgb: Vec3) -> Vec3 {
        self.0 * rgb
    }
}

/// Linear sRGB (Rec. 709 primaries) to linear Rec. 2020 (ITU-R BT.2407).
pub const LINEAR_SRGB_TO_REC2020: ColorMatrix = ColorMatrix::from_cols(
    [0.6274, 0.0691, 0.0164],
    [0.3293, 0.9195, 0.0880],
    [0.0433, 0.0113, 0.8956],
);

/// Linear Rec. 2020 to linear sRGB (ITU-R BT.2407).
pub const REC2020_TO_LINEAR_SRGB: ColorMatrix = ColorMatrix::from_cols(
    [1.6605, -0.1246, -0.0182],
    [-0.5876, 1.1329, -0.1006],
    [-0.0728, -0.0083, 1.1187],
);

/// sRGB → XYZ → D65_2_D60 → AP1 → RRT_SAT, for the fitted ACES curve.
pub const ACES_INPUT: ColorMatrix = ColorMatrix::from_cols(
    [0.59719, 0.07600, 0.02840],
    [0.35458, 0.90834, 0.13383],
    [0.04823, 0.01566, 0.83777],
);

/// ODT_SAT → XYZ → D60_2_D65 → sRGB.
pub const ACES_OUTPUT: ColorMatrix = ColorMatrix::from_cols(
    [1.60475, -0.10208, -0.00327],
    [-0.53108, 1.10813, -0.07276],
    [-0.07367, -0.00605, 1.07602],
);

/// AgX inset matrix (Rec. 2020 primaries).
pub const AGX_INSET: ColorMatrix = ColorMatrix::from_cols(
    [0.856627153315983, 0.137318972929847, 0.11189821299995],
    [0.0951212405381588, 0.761241990602591, 0.0767994186031903],
    [0.0482516061458583, 0.101439036467562, 0.811302368396859],
);

/// AgX outset matrix, the explicit inverse of the inset used for display.
pub const AGX_OUTSET: ColorMatrix = ColorMatrix::from_cols(
    [1.1271005818144368, -0.1413297634984383, -0.14132976349843826],
    [-0.11060664309660323, 1.157823702216272, -0.11060664309660294],
    [-0.016493938717834573, -0.016493938717834257, 1.2519364065950405],
);
