//! Error types for the solver.

use thiserror::Error;

/// Failures of the point-to-point transport. All of them are fatal for the
/// whole process group.
#[derive(Debug, Error)]
pub enum CommError {
    #[error("rank {rank} is gone (channel disconnected)")]
    PeerDisconnected { rank: usize },

    #[error("rank {rank} does not exist in a group of {size}")]
    NoSuchRank { rank: usize, size: usize },

    #[error("message from rank {source_rank} carried tag {found:?}, expected {expected:?}")]
    TagMismatch {
        source_rank: usize,
        expected: u16,
        found: u16,
    },

    #[error("message from rank {source_rank} has {found} bytes, expected {expected}")]
    SizeMismatch {
        source_rank: usize,
        expected: usize,
        found: usize,
    },

    #[error("MPI: {0}")]
    Mpi(String),
}

#[derive(Debug, Error)]
pub enum LbmError {
    #[error("process grid {ndx}x{ndy} needs {} processes, but {size} were launched", ndx * ndy)]
    ProcessCountMismatch { ndx: usize, ndy: usize, size: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("communication failure: {0}")]
    Comm(#[from] CommError),

    #[error("snapshot assembly failed: {0}")]
    Snapshot(String),

    #[error("rank {0} panicked")]
    RankPanicked(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LbmError>;
