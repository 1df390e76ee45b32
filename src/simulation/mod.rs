//! Simulation - one rank's subdomain and its time loop
//!
//! Each rank owns a `Simulation` over its local array (ghost layers included)
//! and runs the same step sequence as every other rank:
//!   communicate -> stream_and_bounce_back -> collide
//! The halo exchange and the snapshot gather are the only points where ranks
//! wait on each other.

use crate::comm::topology::CartTopology;
use crate::comm::transport::Transport;
use crate::core::{Real, Result};
use crate::domain::config::RunConfig;
use crate::io::snapshot::SnapshotWriter;
use crate::spatial::{DistributionField, LocalGeometry, Moments};
use crate::systems::WallSet;

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "step/step.rs"]
mod step;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
pub mod launch;

pub use launch::{run, run_group, RankReport};
#[cfg(feature = "mpi")]
pub use launch::run_mpi;
pub use perf_stats::PerfStats;

use perf_timer::PerfTimer;

/// Progress is logged every this many steps on rank 0
const PROGRESS_EVERY: usize = 10;

pub struct Simulation<T: Real, C: Transport> {
    transport: C,
    topology: CartTopology,
    geometry: LocalGeometry,
    walls: WallSet,

    field: DistributionField<T>,
    /// Moments of the last collision
    moments: Moments<T>,

    // Settings
    omega: T,
    lid_velocity: T,

    // State
    steps_done: usize,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl<T: Real, C: Transport> Simulation<T, C> {
    /// Set up this rank's subdomain at rest. Fails when the transport's group
    /// size does not match the process grid of `config`.
    pub fn new(config: &RunConfig, transport: C) -> Result<Self> {
        init::create_simulation(config, transport)
    }

    pub fn topology(&self) -> &CartTopology { &self.topology }

    pub fn geometry(&self) -> &LocalGeometry { &self.geometry }

    pub fn walls(&self) -> WallSet { self.walls }

    pub fn field(&self) -> &DistributionField<T> { &self.field }

    pub fn moments(&self) -> &Moments<T> { &self.moments }

    pub fn transport(&self) -> &C { &self.transport }

    pub fn steps_done(&self) -> usize { self.steps_done }

    /// Enable or disable per-phase timings (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    pub fn reset_perf_stats(&mut self) {
        settings::reset_perf_stats(self);
    }

    pub fn set_lid_velocity(&mut self, u0: f64) {
        settings::set_lid_velocity(self, u0);
    }

    pub fn lid_velocity(&self) -> f64 {
        settings::get_lid_velocity(self)
    }

    /// One lattice update: ghost exchange, streaming with walls, collision
    pub fn step(&mut self) -> Result<()> {
        step::step(self)
    }

    /// Run `steps` updates, writing ux/uy every `dump_freq` steps and once
    /// more after the last step
    pub fn run<W: SnapshotWriter<T>>(&mut self, steps: usize, dump_freq: usize, writer: &mut W) -> Result<()> {
        step::run(self, steps, dump_freq, writer)
    }

    /// Collective write of ux and uy under `step`
    pub fn write_velocity<W: SnapshotWriter<T>>(&mut self, writer: &mut W, step: usize) -> Result<()> {
        step::write_velocity(self, writer, step)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
