//! Process group plumbing: topology, message transport, ghost exchange.

pub mod halo;
pub mod local;
#[cfg(feature = "mpi")]
pub mod mpi_transport;
pub mod topology;
pub mod transport;

pub use halo::communicate;
pub use local::{LocalEndpoint, ThreadGroup};
#[cfg(feature = "mpi")]
pub use mpi_transport::MpiTransport;
pub use topology::{CartTopology, Direction, Rank};
pub use transport::{Tag, Transport};
