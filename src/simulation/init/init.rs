use tracing::{debug, error, info};

use crate::comm::topology::CartTopology;
use crate::comm::transport::Transport;
use crate::core::{Real, Result};
use crate::domain::config::RunConfig;
use crate::spatial::{DistributionField, LocalGeometry, Moments};
use crate::systems::{compute_moments, fill_rest_state, WallSet};

use super::perf_stats::PerfStats;
use super::Simulation;

pub(super) fn create_simulation<T: Real, C: Transport>(
    config: &RunConfig,
    transport: C,
) -> Result<Simulation<T, C>> {
    config.validate()?;

    let (rank, size) = (transport.rank(), transport.size());
    let topology = match CartTopology::new((config.ndx, config.ndy), rank, size) {
        Ok(topology) => topology,
        Err(e) => {
            if rank == 0 {
                error!("{e}");
            }
            return Err(e);
        }
    };
    let geometry = LocalGeometry::new((config.nx, config.ny), &topology);
    let walls = WallSet::from_topology(&topology, config.boundary);

    let (nx, ny) = geometry.local_shape();
    let mut field = DistributionField::new(nx, ny);
    fill_rest_state(&mut field);
    let mut moments = Moments::new(nx, ny);
    compute_moments(&field, &mut moments);

    if topology.is_root() {
        info!(
            "{size} ranks on a {}x{} process grid, lattice {}x{}, {}, omega {}, lid velocity {}, {:?} walls",
            config.ndx,
            config.ndy,
            config.nx,
            config.ny,
            T::PRECISION,
            config.omega,
            config.lid_velocity,
            config.boundary,
        );
    }
    let (px, py) = topology.coords();
    debug!(
        rank,
        px,
        py,
        "local grid {nx}x{ny}, owned {:?}, offset {:?}",
        geometry.owned_shape(),
        geometry.global_offset()
    );

    Ok(Simulation {
        transport,
        topology,
        geometry,
        walls,
        field,
        moments,
        omega: T::from_f64(config.omega),
        lid_velocity: T::from_f64(config.lid_velocity),
        steps_done: 0,
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    })
}
