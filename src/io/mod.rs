//! Output of macroscopic fields.

pub mod npy;
pub mod snapshot;

pub use npy::{read_npy, write_npy};
pub use snapshot::{GatherWriter, MemorySink, NpySink, Snapshot, SnapshotSink, SnapshotWriter};
