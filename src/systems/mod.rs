//! Per-step kernels of the lattice Boltzmann update.
//!
//! Order inside one step: streaming with boundaries, then collision.

pub mod boundary;
pub mod collision;
pub mod equilibrium;
pub mod streaming;

pub use boundary::{stream_and_bounce_back, WallSet};
pub use collision::{collide, collide_into, compute_moments};
pub use equilibrium::{equilibrium_cell, equilibrium_channel, fill_equilibrium, fill_rest_state};
pub use streaming::stream;
