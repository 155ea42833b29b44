//! Curve fitting.
//!
//! Responsibilities:
//!
//! - generic Levenberg–Marquardt minimization (`levenberg`)
//! - the power-law exponent fit and its variance estimate (`power_law`)

pub mod levenberg;
pub mod power_law;

pub use levenberg::*;
pub use power_law::*;
