//! Core transform evaluation: the full stage chain per pixel and per image.

use rayon::prelude::*;

use crate::color_management::transfer::{SrgbTransfer, TransferFunction};
use crate::grading::cdl::{ClampMode, apply_cdl};
use crate::grading::tone_map::apply_tone_map;
use crate::image::GradingImage;
use crate::transform::params::PipelineSnapshot;

/// Clamp policy of the pre-tone-map CDL.
pub const PRE_CDL_CLAMP: ClampMode = ClampMode::Lower;
/// Clamp policy of the post-tone-map CDL.
pub const POST_CDL_CLAMP: ClampMode = ClampMode::Unit;

/// Pre CDL, tone map (with its embedded look), post CDL. Output is linear.
///
/// The stage order is fixed:
/// 1. Pre CDL on the scene-referred signal (lower clamp only)
/// 2. Tone map; AgX applies the look CDL between its sigmoid and outset
/// 3. Post CDL on the display-referred signal (unit clamp)
pub fn evaluate_linear(rgb: [f32; 3], snapshot: &PipelineSnapshot) -> [f32; 3] {
    let rgb = apply_cdl(rgb, &snapshot.pre_cdl, PRE_CDL_CLAMP);
    let rgb = apply_tone_map(rgb, &snapshot.tone_map, &snapshot.look_cdl);
    apply_cdl(rgb, &snapshot.post_cdl, POST_CDL_CLAMP)
}

/// The full chain including the final sRGB display encode.
pub fn evaluate_transform(rgb: [f32; 3], snapshot: &PipelineSnapshot) -> [f32; 3] {
    SrgbTransfer.encode_rgb(evaluate_linear(rgb, snapshot))
}

/// One RGBA pixel; alpha passes through unchanged.
#[inline]
pub fn evaluate_pixel(rgba: [f32; 4], snapshot: &PipelineSnapshot) -> [f32; 4] {
    let [r, g, b] = evaluate_transform([rgba[0], rgba[1], rgba[2]], snapshot);
    [r, g, b, rgba[3]]
}

/// Evaluate a whole image against one snapshot.
///
/// Pixels are independent, so the work is split across the rayon pool.
pub fn process_image(image: &GradingImage, snapshot: &PipelineSnapshot) -> GradingImage {
    let pixels = image
        .pixels
        .par_iter()
        .map(|&px| evaluate_pixel(px, snapshot))
        .collect();
    GradingImage {
        width: image.width,
        height: image.height,
        pixels,
    }
}

/// In-place variant of [`process_image`].
pub fn process_image_in_place(image: &mut GradingImage, snapshot: &PipelineSnapshot) {
    image
        .pixels
        .par_iter_mut()
        .for_each(|px| *px = evaluate_pixel(*px, snapshot));
}
