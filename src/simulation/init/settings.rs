use crate::comm::transport::Transport;
use crate::core::Real;

use super::perf_stats::PerfStats;
use super::Simulation;

pub(super) fn enable_perf_metrics<T: Real, C: Transport>(sim: &mut Simulation<T, C>, enabled: bool) {
    sim.perf_enabled = enabled;
    if enabled {
        sim.perf_stats.cells = sim.field.cells() as u64;
    }
}

pub(super) fn get_perf_stats<T: Real, C: Transport>(sim: &Simulation<T, C>) -> PerfStats {
    sim.perf_stats.clone()
}

pub(super) fn reset_perf_stats<T: Real, C: Transport>(sim: &mut Simulation<T, C>) {
    sim.perf_stats.reset();
    if sim.perf_enabled {
        sim.perf_stats.cells = sim.field.cells() as u64;
    }
}

pub(super) fn set_lid_velocity<T: Real, C: Transport>(sim: &mut Simulation<T, C>, u0: f64) {
    sim.lid_velocity = T::from_f64(u0);
}

pub(super) fn get_lid_velocity<T: Real, C: Transport>(sim: &Simulation<T, C>) -> f64 {
    sim.lid_velocity.to_f64()
}
