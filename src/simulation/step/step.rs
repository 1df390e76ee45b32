use tracing::{debug, info};

use crate::comm::halo::communicate;
use crate::comm::transport::Transport;
use crate::core::{Real, Result};
use crate::io::snapshot::SnapshotWriter;
use crate::spatial::MomentKind;
use crate::systems::{collide_into, stream_and_bounce_back};

use super::{PerfTimer, Simulation, PROGRESS_EVERY};

pub(super) fn step<T: Real, C: Transport>(sim: &mut Simulation<T, C>) -> Result<()> {
    let perf_on = sim.perf_enabled;
    let step_start = if perf_on { Some(PerfTimer::start()) } else { None };

    // === HALO EXCHANGE ===
    if perf_on {
        let t0 = PerfTimer::start();
        communicate(&mut sim.field, &sim.topology, &sim.transport)?;
        sim.perf_stats.communicate_ms += t0.elapsed_ms();
    } else {
        communicate(&mut sim.field, &sim.topology, &sim.transport)?;
    }

    // === STREAMING + WALLS ===
    if perf_on {
        let t0 = PerfTimer::start();
        stream_and_bounce_back(&mut sim.field, sim.walls, sim.lid_velocity);
        sim.perf_stats.stream_ms += t0.elapsed_ms();
    } else {
        stream_and_bounce_back(&mut sim.field, sim.walls, sim.lid_velocity);
    }

    // === COLLISION ===
    if perf_on {
        let t0 = PerfTimer::start();
        collide_into(&mut sim.field, sim.omega, &mut sim.moments);
        sim.perf_stats.collide_ms += t0.elapsed_ms();
    } else {
        collide_into(&mut sim.field, sim.omega, &mut sim.moments);
    }

    sim.steps_done += 1;
    if let Some(t0) = step_start {
        sim.perf_stats.last_step_ms = t0.elapsed_ms();
        sim.perf_stats.steps += 1;
    }
    Ok(())
}

pub(super) fn write_velocity<T: Real, C: Transport, W: SnapshotWriter<T>>(
    sim: &mut Simulation<T, C>,
    writer: &mut W,
    step: usize,
) -> Result<()> {
    let t0 = sim.perf_enabled.then(PerfTimer::start);

    writer.write(&sim.transport, MomentKind::VelocityX, step, &sim.moments)?;
    writer.write(&sim.transport, MomentKind::VelocityY, step, &sim.moments)?;

    if let Some(t0) = t0 {
        sim.perf_stats.snapshot_ms += t0.elapsed_ms();
    }
    if sim.topology.is_root() {
        info!(step, "wrote ux/uy");
    }
    Ok(())
}

pub(super) fn run<T: Real, C: Transport, W: SnapshotWriter<T>>(
    sim: &mut Simulation<T, C>,
    steps: usize,
    dump_freq: usize,
    writer: &mut W,
) -> Result<()> {
    let root = sim.topology.is_root();
    // validated configs never carry 0; treat it as "only the final write"
    let dump_freq = if dump_freq == 0 { usize::MAX } else { dump_freq };

    for i in 0..steps {
        if root && i % PROGRESS_EVERY == 0 {
            debug!("=== Step {i}/{steps} ===");
        }

        step(sim)?;

        if i % dump_freq == 0 {
            write_velocity(sim, writer, i)?;
        }
    }

    // the last step is persisted even when it is off the dump schedule
    if steps > 0 {
        write_velocity(sim, writer, steps - 1)?;
    }
    Ok(())
}
