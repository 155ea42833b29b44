//! Input/output helpers.
//!
//! - trial-file ingest (`trials`)
//! - series exports (CSV) (`export`)
//! - fit JSON render/read (`fitfile`)
//! - all-or-nothing output files (`output`)

pub mod export;
pub mod fitfile;
pub mod output;
pub mod trials;

pub use export::*;
pub use fitfile::*;
pub use output::*;
pub use trials::*;
