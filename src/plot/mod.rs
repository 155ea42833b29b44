//! Presentation of averaged curves and fits.
//!
//! - terminal plots (`ascii`)
//! - four-panel SVG figure (`svg`)

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
