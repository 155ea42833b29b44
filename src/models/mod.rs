//! Power-law scaling model `value = N^a`.
//!
//! Implemented as small, pure functions so that fitting and plotting code can
//! share them.

pub mod model;

pub use model::*;
