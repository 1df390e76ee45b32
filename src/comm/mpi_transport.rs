//! MPI process group: one OS process per rank, launched by `mpirun`
//!
//! Ranks come from a non-periodic Cartesian communicator over the
//! `ndx x ndy` process grid, created without reordering so that its row-major
//! ranks line up with [`CartTopology`].

use ::mpi::environment::Universe;
use ::mpi::topology::CartesianCommunicator;
use ::mpi::traits::*;

use crate::core::{CommError, LbmError, Result};

use super::topology::{CartTopology, Direction, Rank};
use super::transport::{Tag, Transport};

pub struct MpiTransport {
    comm: CartesianCommunicator,
    rank: Rank,
    size: usize,
    // finalizes MPI on drop; declared last so `comm` is freed first
    _universe: Universe,
}

impl MpiTransport {
    /// Initialize MPI and lay the world out as a `dims.0 x dims.1` grid.
    /// Fails when the world size does not match the grid.
    pub fn initialize(dims: (usize, usize)) -> Result<Self> {
        let universe = ::mpi::initialize()
            .ok_or_else(|| CommError::Mpi("already initialized".into()))?;
        let world = universe.world();
        let size = world.size() as usize;
        let (ndx, ndy) = dims;
        if ndx * ndy != size {
            return Err(LbmError::ProcessCountMismatch { ndx, ndy, size });
        }

        let comm = world
            .create_cartesian_communicator(&[ndx as i32, ndy as i32], &[false, false], false)
            .ok_or_else(|| CommError::Mpi("rank left out of the Cartesian grid".into()))?;
        let rank = comm.rank() as usize;

        let transport = Self { comm, rank, size, _universe: universe };
        transport.check_layout(&CartTopology::new(dims, rank, size)?)?;
        Ok(transport)
    }

    /// Process-grid coordinates as MPI reports them
    pub fn coords(&self) -> (usize, usize) {
        let c = self.comm.rank_to_coordinates(self.comm.rank());
        (c[0] as usize, c[1] as usize)
    }

    /// Neighbor as MPI reports it
    pub fn neighbor(&self, dir: Direction) -> Option<Rank> {
        let (low, high) = match dir {
            Direction::Left | Direction::Right => self.comm.shift(0, 1),
            Direction::Down | Direction::Up => self.comm.shift(1, 1),
        };
        let r = match dir {
            Direction::Left | Direction::Down => low,
            Direction::Right | Direction::Up => high,
        };
        r.map(|r| r as Rank)
    }

    fn check_layout(&self, topology: &CartTopology) -> Result<()> {
        if self.coords() != topology.coords() {
            return Err(CommError::Mpi(format!(
                "rank {} sits at {:?}, expected {:?}",
                self.rank,
                self.coords(),
                topology.coords()
            ))
            .into());
        }
        for dir in Direction::ALL {
            if self.neighbor(dir) != topology.neighbor(dir) {
                return Err(CommError::Mpi(format!("rank {} disagrees on its {dir:?} neighbor", self.rank)).into());
            }
        }
        Ok(())
    }

    fn peer(&self, rank: Rank) -> std::result::Result<i32, CommError> {
        if rank >= self.size {
            return Err(CommError::NoSuchRank { rank, size: self.size });
        }
        Ok(rank as i32)
    }
}

impl Transport for MpiTransport {
    fn rank(&self) -> Rank { self.rank }

    fn size(&self) -> usize { self.size }

    /// Standard-mode send. Only the root gather uses it, where the receiver
    /// drains ranks in order, so it cannot deadlock.
    fn send(&self, dest: Rank, tag: Tag, payload: Vec<u8>) -> std::result::Result<(), CommError> {
        let dest = self.peer(dest)?;
        self.comm.process_at_rank(dest).send_with_tag(&payload[..], i32::from(tag));
        Ok(())
    }

    fn recv(&self, source: Rank, tag: Tag) -> std::result::Result<Vec<u8>, CommError> {
        let source = self.peer(source)?;
        let (payload, _) = self.comm.process_at_rank(source).receive_vec_with_tag::<u8>(i32::from(tag));
        Ok(payload)
    }

    /// Nonblocking send, blocking receive, then wait on the send
    fn sendrecv(
        &self,
        payload: Vec<u8>,
        dest: Option<Rank>,
        source: Option<Rank>,
        tag: Tag,
    ) -> std::result::Result<Option<Vec<u8>>, CommError> {
        let dest = dest.map(|d| self.peer(d)).transpose()?;
        let source = source.map(|s| self.peer(s)).transpose()?;
        let tag = i32::from(tag);

        let received = ::mpi::request::scope(|scope| {
            let request = dest.map(|d| {
                self.comm.process_at_rank(d).immediate_send_with_tag(scope, &payload[..], tag)
            });
            let received = source.map(|s| self.comm.process_at_rank(s).receive_vec_with_tag::<u8>(tag).0);
            if let Some(request) = request {
                request.wait();
            }
            received
        });
        Ok(received)
    }
}
