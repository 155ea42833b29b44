//! Synthetic input data for demos and end-to-end tests.

pub mod synth;

pub use synth::*;
