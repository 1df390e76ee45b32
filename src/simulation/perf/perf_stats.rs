use serde::Serialize;

/// Cumulative per-rank phase timings. All zeros while perf metrics are off.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfStats {
    pub(super) steps: u64,
    /// Local cells, ghosts included
    pub(super) cells: u64,
    pub(super) last_step_ms: f64,
    pub(super) communicate_ms: f64,
    pub(super) stream_ms: f64,
    pub(super) collide_ms: f64,
    pub(super) snapshot_ms: f64,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }

    pub fn steps(&self) -> u64 { self.steps }
    pub fn cells(&self) -> u64 { self.cells }
    pub fn last_step_ms(&self) -> f64 { self.last_step_ms }
    pub fn communicate_ms(&self) -> f64 { self.communicate_ms }
    pub fn stream_ms(&self) -> f64 { self.stream_ms }
    pub fn collide_ms(&self) -> f64 { self.collide_ms }
    pub fn snapshot_ms(&self) -> f64 { self.snapshot_ms }

    /// Time inside the step kernels, snapshots excluded
    pub fn compute_ms(&self) -> f64 {
        self.communicate_ms + self.stream_ms + self.collide_ms
    }

    /// Million lattice updates per second over the timed steps
    pub fn mlups(&self) -> f64 {
        let ms = self.compute_ms();
        if ms <= 0.0 {
            return 0.0;
        }
        (self.cells * self.steps) as f64 / (ms * 1e3)
    }
}
