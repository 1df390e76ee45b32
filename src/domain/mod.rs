//! Domain definitions: lattice model and run configuration.

pub mod config;
pub mod lattice;

pub use config::{BoundaryMode, RunConfig};
