//! Command line launcher
//!
//! ```text
//! lbm-cavity NDX NDY NX NY DTYPE [--steps N] [--dump-freq N] [--omega W] ...
//! lbm-cavity --config run.json [overrides]
//! mpirun -n 4 lbm-cavity 2 2 NX NY DTYPE --mpi   # with the `mpi` feature
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use lbm_cavity::{BoundaryMode, Precision, RankReport, Result, RunConfig};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Processes along x
    #[arg(required_unless_present = "config")]
    ndx: Option<usize>,
    /// Processes along y
    #[arg(required_unless_present = "config")]
    ndy: Option<usize>,
    /// Lattice cells along x
    #[arg(required_unless_present = "config")]
    nx: Option<usize>,
    /// Lattice cells along y
    #[arg(required_unless_present = "config")]
    ny: Option<usize>,
    /// float32 or float64
    #[arg(required_unless_present = "config")]
    dtype: Option<Precision>,

    /// JSON run configuration; positional arguments and flags override it
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(short, long)]
    steps: Option<usize>,
    /// Write ux/uy every N steps
    #[arg(short, long, value_name = "N")]
    dump_freq: Option<usize>,
    /// BGK relaxation rate
    #[arg(short, long)]
    omega: Option<f64>,
    /// Tangential speed of the lid
    #[arg(short = 'u', long, value_name = "U0")]
    lid_velocity: Option<f64>,
    /// Drop the side walls (periodic in x, needs NDX = 1)
    #[arg(long)]
    couette: bool,
    #[arg(short = 'O', long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Ranks to launch, defaults to NDX * NDY
    #[arg(short, long)]
    ranks: Option<usize>,
    /// Collect per-phase timings and log them at the end
    #[arg(long)]
    perf: bool,
    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
    /// Run as one rank of an mpirun launch instead of spawning threads
    #[cfg(feature = "mpi")]
    #[arg(long)]
    mpi: bool,
}

impl Args {
    #[cfg(feature = "mpi")]
    fn use_mpi(&self) -> bool {
        self.mpi
    }

    #[cfg(not(feature = "mpi"))]
    fn use_mpi(&self) -> bool {
        false
    }

    fn into_config(self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_json_file(path)?,
            None => RunConfig::new(0, 0, 0, 0),
        };

        if let Some(v) = self.ndx { config.ndx = v; }
        if let Some(v) = self.ndy { config.ndy = v; }
        if let Some(v) = self.nx { config.nx = v; }
        if let Some(v) = self.ny { config.ny = v; }
        if let Some(v) = self.dtype { config.precision = v; }
        if let Some(v) = self.steps { config.steps = v; }
        if let Some(v) = self.dump_freq { config.dump_freq = v; }
        if let Some(v) = self.omega { config.omega = v; }
        if let Some(v) = self.lid_velocity { config.lid_velocity = v; }
        if let Some(v) = self.output_dir { config.output_dir = v; }
        if self.ranks.is_some() {
            config.ranks = self.ranks;
        }
        if self.couette {
            config.boundary = BoundaryMode::Couette;
        }
        config.perf |= self.perf;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "mpi")]
fn launch(config: &RunConfig, use_mpi: bool) -> Result<Vec<RankReport>> {
    if use_mpi {
        lbm_cavity::run_mpi(config).map(|report| vec![report])
    } else {
        lbm_cavity::run(config)
    }
}

#[cfg(not(feature = "mpi"))]
fn launch(config: &RunConfig, _use_mpi: bool) -> Result<Vec<RankReport>> {
    lbm_cavity::run(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .with_thread_names(true)
        .init();

    info!("lbm-cavity {}", lbm_cavity::version());

    let use_mpi = args.use_mpi();
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match launch(&config, use_mpi) {
        Ok(reports) => {
            for report in reports.iter().filter(|r| r.perf.is_some()) {
                match serde_json::to_string(report) {
                    Ok(json) => info!("perf {json}"),
                    Err(e) => error!("cannot serialize perf report: {e}"),
                }
            }
            info!("done, snapshots in {}", config.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
