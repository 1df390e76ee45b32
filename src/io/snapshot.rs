//! Collective snapshots of macroscopic fields
//!
//! Every rank ships its owned block to rank 0, which assembles the global
//! `(nx, ny)` array and hands it to a [`SnapshotSink`]. Blocks are framed as
//! four native-endian u64 (x offset, y offset, width, height) followed by the
//! values.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ndarray::{s, Array2};
use tracing::debug;

use crate::comm::transport::{decode_into, encode, Transport, TAG_GATHER};
use crate::core::{LbmError, Real, Result};
use crate::spatial::{LocalGeometry, MomentKind, Moments};

use super::npy::write_npy;

const FRAME_HEADER: usize = 4 * std::mem::size_of::<u64>();

/// Destination of assembled global fields
pub trait SnapshotSink<T: Real>: Send {
    fn accept(&mut self, field: &str, step: usize, data: Array2<T>) -> Result<()>;
}

/// Collective writer for one macroscopic field at a time. Every rank must call
/// [`SnapshotWriter::write`] for the same (field, step) sequence.
pub trait SnapshotWriter<T: Real> {
    fn write<C: Transport>(
        &mut self,
        transport: &C,
        kind: MomentKind,
        step: usize,
        moments: &Moments<T>,
    ) -> Result<()>;
}

pub struct GatherWriter<T: Real, S: SnapshotSink<T>> {
    geometry: LocalGeometry,
    sink: S,
    _marker: PhantomData<T>,
}

impl<T: Real, S: SnapshotSink<T>> GatherWriter<T, S> {
    pub fn new(geometry: LocalGeometry, sink: S) -> Self {
        Self { geometry, sink, _marker: PhantomData }
    }

    fn frame(&self, block: &Array2<T>) -> Vec<u8> {
        let (ox, oy) = self.geometry.global_offset();
        let (w, h) = block.dim();
        let header = [ox as u64, oy as u64, w as u64, h as u64];
        let mut payload: Vec<u8> = Vec::with_capacity(FRAME_HEADER + w * h * std::mem::size_of::<T>());
        payload.extend_from_slice(bytemuck::cast_slice::<u64, u8>(&header));
        match block.as_slice() {
            Some(values) => payload.extend_from_slice(&encode(values)),
            None => payload.extend_from_slice(&encode(&block.iter().copied().collect::<Vec<_>>())),
        }
        payload
    }

    fn place(&self, global: &mut Array2<T>, payload: &[u8], source: usize) -> Result<()> {
        if payload.len() < FRAME_HEADER {
            return Err(LbmError::Snapshot(format!("truncated block from rank {source}")));
        }
        let header: [u64; 4] = bytemuck::pod_read_unaligned(&payload[..FRAME_HEADER]);
        let [ox, oy, w, h] = header.map(|v| v as usize);
        let (gx, gy) = global.dim();
        if ox + w > gx || oy + h > gy {
            return Err(LbmError::Snapshot(format!(
                "block {w}x{h} at ({ox}, {oy}) from rank {source} exceeds {gx}x{gy}"
            )));
        }

        let mut values = vec![T::ZERO; w * h];
        decode_into(&payload[FRAME_HEADER..], &mut values, source)?;
        let block = Array2::from_shape_vec((w, h), values)
            .map_err(|e| LbmError::Snapshot(e.to_string()))?;
        global.slice_mut(s![ox..ox + w, oy..oy + h]).assign(&block);
        Ok(())
    }
}

impl<T: Real, S: SnapshotSink<T>> SnapshotWriter<T> for GatherWriter<T, S> {
    fn write<C: Transport>(
        &mut self,
        transport: &C,
        kind: MomentKind,
        step: usize,
        moments: &Moments<T>,
    ) -> Result<()> {
        let block = moments.owned(kind, &self.geometry);

        if transport.rank() != 0 {
            transport.send(0, TAG_GATHER, self.frame(&block))?;
            return Ok(());
        }

        let mut global = Array2::from_elem(self.geometry.global, T::ZERO);
        let own = self.frame(&block);
        self.place(&mut global, &own, 0)?;
        for source in 1..transport.size() {
            let payload = transport.recv(source, TAG_GATHER)?;
            self.place(&mut global, &payload, source)?;
        }

        debug!(field = kind.name(), step, "snapshot assembled");
        self.sink.accept(kind.name(), step, global)
    }
}

/// Writes `<field>_<step>.npy` into a directory
#[derive(Debug, Clone)]
pub struct NpySink {
    dir: PathBuf,
}

impl NpySink {
    /// Creates the directory if needed
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, field: &str, step: usize) -> PathBuf {
        self.dir.join(format!("{field}_{step}.npy"))
    }
}

impl<T: Real> SnapshotSink<T> for NpySink {
    fn accept(&mut self, field: &str, step: usize, data: Array2<T>) -> Result<()> {
        write_npy(self.path_for(field, step), &data)
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub field: String,
    pub step: usize,
    pub data: Array2<T>,
}

/// Keeps every snapshot in memory; clones share storage
#[derive(Debug, Clone)]
pub struct MemorySink<T> {
    snapshots: Arc<Mutex<Vec<Snapshot<T>>>>,
}

impl<T: Real> Default for MemorySink<T> {
    fn default() -> Self {
        Self { snapshots: Arc::new(Mutex::new(Vec::new())) }
    }
}

impl<T: Real> MemorySink<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// All snapshots in the order they were written
    pub fn snapshots(&self) -> Vec<Snapshot<T>> {
        match self.snapshots.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// (field, step) keys in write order
    pub fn keys(&self) -> Vec<(String, usize)> {
        self.snapshots().into_iter().map(|s| (s.field, s.step)).collect()
    }

    /// Most recent snapshot of `field` at `step`
    pub fn get(&self, field: &str, step: usize) -> Option<Array2<T>> {
        self.snapshots()
            .into_iter()
            .rev()
            .find(|s| s.field == field && s.step == step)
            .map(|s| s.data)
    }
}

impl<T: Real> SnapshotSink<T> for MemorySink<T> {
    fn accept(&mut self, field: &str, step: usize, data: Array2<T>) -> Result<()> {
        let mut guard = self
            .snapshots
            .lock()
            .map_err(|_| LbmError::Snapshot("snapshot store poisoned".into()))?;
        guard.push(Snapshot { field: field.to_string(), step, data });
        Ok(())
    }
}
