//! Process group launchers: one named thread per rank over the in-process
//! transport, or (with the `mpi` feature) this process's rank under `mpirun`.

use std::thread;

use serde::Serialize;
use tracing::error;

use crate::comm::local::{LocalEndpoint, ThreadGroup};
use crate::comm::topology::Rank;
use crate::comm::transport::Transport;
use crate::core::{LbmError, Precision, Real, Result};
use crate::domain::config::RunConfig;
use crate::io::snapshot::{GatherWriter, NpySink, SnapshotSink};

use super::{PerfStats, Simulation};

/// What a rank hands back after a successful run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankReport {
    pub rank: Rank,
    pub coords: (usize, usize),
    pub local_shape: (usize, usize),
    pub owned_shape: (usize, usize),
    pub steps: usize,
    /// Present when perf metrics were enabled
    pub perf: Option<PerfStats>,
}

fn run_rank<T: Real, C: Transport, S: SnapshotSink<T>>(
    config: &RunConfig,
    transport: C,
    sink: S,
) -> Result<RankReport> {
    let mut sim = Simulation::<T, C>::new(config, transport)?;
    sim.enable_perf_metrics(config.perf);

    let mut writer = GatherWriter::new(*sim.geometry(), sink);
    sim.run(config.steps, config.dump_freq, &mut writer)?;

    Ok(RankReport {
        rank: sim.topology().rank(),
        coords: sim.topology().coords(),
        local_shape: sim.geometry().local_shape(),
        owned_shape: sim.geometry().owned_shape(),
        steps: sim.steps_done(),
        perf: config.perf.then(|| sim.get_perf_stats()),
    })
}

/// Run `config` on `config.launched_ranks()` threads. Every rank gets a clone
/// of `sink`; only rank 0 writes to it. Reports come back ordered by rank.
pub fn run_group<T: Real, S: SnapshotSink<T> + Clone>(config: &RunConfig, sink: S) -> Result<Vec<RankReport>> {
    config.validate()?;
    let size = config.launched_ranks();
    if size != config.process_count() {
        let e = LbmError::ProcessCountMismatch { ndx: config.ndx, ndy: config.ndy, size };
        error!("{e}");
        return Err(e);
    }

    let endpoints = ThreadGroup::endpoints(size);
    thread::scope(|s| -> Result<Vec<RankReport>> {
        let mut handles = Vec::with_capacity(size);
        for endpoint in endpoints {
            let rank = endpoint.rank();
            let sink = sink.clone();
            let handle = thread::Builder::new()
                .name(format!("rank-{rank}"))
                .spawn_scoped(s, move || run_rank::<T, LocalEndpoint, S>(config, endpoint, sink))?;
            handles.push((rank, handle));
        }

        let mut reports = Vec::with_capacity(size);
        let mut first_error = None;
        for (rank, handle) in handles {
            match handle.join() {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => {
                    error!(rank, "rank failed: {e}");
                    first_error.get_or_insert(e);
                }
                Err(_) => {
                    error!(rank, "rank panicked");
                    first_error.get_or_insert(LbmError::RankPanicked(rank));
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    })
}

/// Run with `.npy` output into `config.output_dir`, in the configured precision
pub fn run(config: &RunConfig) -> Result<Vec<RankReport>> {
    let sink = NpySink::create(&config.output_dir)?;
    match config.precision {
        Precision::Float32 => run_group::<f32, _>(config, sink),
        Precision::Float64 => run_group::<f64, _>(config, sink),
    }
}

/// Run this process's rank of an `mpirun` launch with `.npy` output. Every
/// process calls this once; the world size must be `ndx * ndy`.
#[cfg(feature = "mpi")]
pub fn run_mpi(config: &RunConfig) -> Result<RankReport> {
    use crate::comm::mpi_transport::MpiTransport;

    config.validate()?;
    let transport = MpiTransport::initialize((config.ndx, config.ndy)).inspect_err(|e| error!("{e}"))?;
    let sink = NpySink::create(&config.output_dir)?;
    match config.precision {
        Precision::Float32 => run_rank::<f32, _, _>(config, transport, sink),
        Precision::Float64 => run_rank::<f64, _, _>(config, transport, sink),
    }
}
