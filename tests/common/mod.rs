#![allow(dead_code)]

use lbm_cavity::{run_group, MemorySink, RunConfig};

/// Run `config` on its own process grid, keeping every snapshot in memory
pub fn run_in_memory(config: &RunConfig) -> MemorySink<f64> {
    let sink = MemorySink::new();
    run_group::<f64, _>(config, sink.clone()).unwrap();
    sink
}

pub fn config(dims: (usize, usize), grid: (usize, usize), steps: usize, dump_freq: usize) -> RunConfig {
    let mut config = RunConfig::new(dims.0, dims.1, grid.0, grid.1);
    config.steps = steps;
    config.dump_freq = dump_freq;
    config
}
