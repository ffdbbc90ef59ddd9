//! Color management: fixed gamut matrices and the transfer functions the operators use.

pub mod color_space;
pub mod transfer;
