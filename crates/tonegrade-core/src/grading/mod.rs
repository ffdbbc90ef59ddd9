//! Grading operators: CDL, tone mapping, and the wheel controls that drive them.

pub mod cdl;
pub mod tone_map;
pub mod wheels;
