//! `perc-scaling` library crate.
//!
//! The binary (`perc`) is a thin wrapper around this library so that:
//!
//! - the load → average → slice → fit pipeline is testable without spawning processes
//! - each stage can be reused on its own (e.g., from a notebook or another tool)

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod slice;
