//! lbm-cavity - Distributed D2Q9 Lattice Boltzmann solver
//!
//! Lid-driven cavity flow on a rectangular lattice split over a 2D grid of
//! ranks. Each rank streams and collides its own block and trades one ghost
//! layer per side with its neighbors every step.
//!
//! Architecture:
//! - core/       - errors, precision, safety macros
//! - domain/     - lattice constants, run configuration
//! - spatial/    - partitioning and the SoA distribution field
//! - systems/    - equilibrium, collision, streaming, walls
//! - comm/       - topology, transport, halo exchange
//! - io/         - npy output and snapshot gathering
//! - simulation/ - per-rank time loop and the launcher

// Utils with safety macros (must be first for macro export!)
#[macro_use]
pub mod core;
pub mod comm;
pub mod domain;
pub mod io;
pub mod simulation;
pub mod spatial;
pub mod systems;

pub use crate::core::{CommError, LbmError, Precision, Real, Result};
pub use comm::{CartTopology, Direction, LocalEndpoint, ThreadGroup, Transport};
pub use domain::{BoundaryMode, RunConfig};
pub use io::{GatherWriter, MemorySink, NpySink, SnapshotSink};
pub use simulation::{run, run_group, PerfStats, RankReport, Simulation};
#[cfg(feature = "mpi")]
pub use comm::MpiTransport;
#[cfg(feature = "mpi")]
pub use simulation::run_mpi;
pub use spatial::{DistributionField, LocalGeometry, MomentKind, Moments};

/// Crate version
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
