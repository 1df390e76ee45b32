//! 2D Cartesian process topology (non-periodic)
//!
//! Ranks are laid out row-major over the process grid: `rank = px * ndy + py`.
//! Neighbors across the global boundary do not exist.

use crate::core::{LbmError, Result};

pub type Rank = usize;

/// Cardinal direction of a neighbor. x grows to the right, y grows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Right, Direction::Down, Direction::Up];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Up => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartTopology {
    rank: Rank,
    size: usize,
    dims: (usize, usize),
    coords: (usize, usize),
    neighbors: [Option<Rank>; 4],
}

impl CartTopology {
    /// Place `rank` of a group of `size` on a `dims.0 x dims.1` process grid.
    /// Fails when the grid does not hold exactly `size` processes.
    pub fn new(dims: (usize, usize), rank: Rank, size: usize) -> Result<Self> {
        let (ndx, ndy) = dims;
        if ndx * ndy != size {
            return Err(LbmError::ProcessCountMismatch { ndx, ndy, size });
        }
        if rank >= size {
            return Err(LbmError::InvalidConfig(format!(
                "rank {rank} is outside a group of {size}"
            )));
        }

        let coords = (rank / ndy, rank % ndy);
        let (px, py) = coords;
        let at = |x: usize, y: usize| x * ndy + y;

        let mut neighbors = [None; 4];
        if px > 0 {
            neighbors[Direction::Left.slot()] = Some(at(px - 1, py));
        }
        if px + 1 < ndx {
            neighbors[Direction::Right.slot()] = Some(at(px + 1, py));
        }
        if py > 0 {
            neighbors[Direction::Down.slot()] = Some(at(px, py - 1));
        }
        if py + 1 < ndy {
            neighbors[Direction::Up.slot()] = Some(at(px, py + 1));
        }

        Ok(Self { rank, size, dims, coords, neighbors })
    }

    /// Single-rank topology covering the whole domain
    pub fn serial() -> Self {
        Self {
            rank: 0,
            size: 1,
            dims: (1, 1),
            coords: (0, 0),
            neighbors: [None; 4],
        }
    }

    #[inline]
    pub fn rank(&self) -> Rank { self.rank }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    #[inline]
    pub fn dims(&self) -> (usize, usize) { self.dims }

    #[inline]
    pub fn coords(&self) -> (usize, usize) { self.coords }

    #[inline]
    pub fn neighbor(&self, dir: Direction) -> Option<Rank> {
        self.neighbors[dir.slot()]
    }

    #[inline]
    pub fn has_neighbor(&self, dir: Direction) -> bool {
        self.neighbor(dir).is_some()
    }

    pub fn is_root(&self) -> bool {
        self.rank == 0
    }
}
