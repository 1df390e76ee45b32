//! Run configuration
//!
//! Loaded from JSON (`RunConfig::from_json_str` / `from_json_file`) and/or built
//! by the command line launcher. Every field except the two grid shapes has a
//! default matching the reference cavity run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{LbmError, Precision, Result};

pub const DEFAULT_STEPS: usize = 100_000;
pub const DEFAULT_DUMP_FREQ: usize = 10_000;
pub const DEFAULT_OMEGA: f64 = 1.7;
pub const DEFAULT_LID_VELOCITY: f64 = 0.1;

/// Which physical walls exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Walls on all four sides, the northern one sliding
    #[default]
    Cavity,
    /// No side walls: the x axis is periodic, so shear flow between the
    /// resting bottom wall and the sliding lid
    Couette,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Process grid (ndx, ndy)
    pub ndx: usize,
    pub ndy: usize,
    /// Global lattice (nx, ny)
    pub nx: usize,
    pub ny: usize,
    #[serde(default)]
    pub precision: Precision,
    #[serde(default = "default_steps")]
    pub steps: usize,
    #[serde(default = "default_dump_freq")]
    pub dump_freq: usize,
    #[serde(default = "default_omega")]
    pub omega: f64,
    #[serde(default = "default_lid_velocity")]
    pub lid_velocity: f64,
    #[serde(default)]
    pub boundary: BoundaryMode,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub perf: bool,
    /// Ranks to launch; `None` launches exactly `ndx * ndy`
    #[serde(default)]
    pub ranks: Option<usize>,
}

fn default_steps() -> usize { DEFAULT_STEPS }
fn default_dump_freq() -> usize { DEFAULT_DUMP_FREQ }
fn default_omega() -> f64 { DEFAULT_OMEGA }
fn default_lid_velocity() -> f64 { DEFAULT_LID_VELOCITY }
fn default_output_dir() -> PathBuf { PathBuf::from(".") }

impl RunConfig {
    pub fn new(ndx: usize, ndy: usize, nx: usize, ny: usize) -> Self {
        Self {
            ndx,
            ndy,
            nx,
            ny,
            precision: Precision::default(),
            steps: DEFAULT_STEPS,
            dump_freq: DEFAULT_DUMP_FREQ,
            omega: DEFAULT_OMEGA,
            lid_velocity: DEFAULT_LID_VELOCITY,
            boundary: BoundaryMode::default(),
            output_dir: default_output_dir(),
            perf: false,
            ranks: None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn process_count(&self) -> usize {
        self.ndx * self.ndy
    }

    pub fn launched_ranks(&self) -> usize {
        self.ranks.unwrap_or_else(|| self.process_count())
    }

    /// Shape checks. The process-count precondition is checked separately,
    /// against the number of ranks actually launched.
    pub fn validate(&self) -> Result<()> {
        if self.ndx == 0 || self.ndy == 0 {
            return Err(LbmError::InvalidConfig(format!(
                "process grid {}x{} has an empty axis",
                self.ndx, self.ndy
            )));
        }
        if self.nx < self.ndx || self.ny < self.ndy {
            return Err(LbmError::InvalidConfig(format!(
                "cannot split a {}x{} lattice over {}x{} processes",
                self.nx, self.ny, self.ndx, self.ndy
            )));
        }
        if self.dump_freq == 0 {
            return Err(LbmError::InvalidConfig("dump frequency must be positive".to_string()));
        }
        if !(self.omega > 0.0 && self.omega < 2.0) {
            return Err(LbmError::InvalidConfig(format!(
                "relaxation rate {} is outside (0, 2)",
                self.omega
            )));
        }
        if self.boundary == BoundaryMode::Couette && self.ndx != 1 {
            return Err(LbmError::InvalidConfig(
                "couette mode wraps the x axis locally and needs ndx = 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_fills_defaults() {
        let config = RunConfig::from_json_str(r#"{"ndx": 2, "ndy": 1, "nx": 64, "ny": 32}"#).unwrap();
        assert_eq!(config.steps, DEFAULT_STEPS);
        assert_eq!(config.dump_freq, DEFAULT_DUMP_FREQ);
        assert_eq!(config.omega, DEFAULT_OMEGA);
        assert_eq!(config.precision, Precision::Float64);
        assert_eq!(config.boundary, BoundaryMode::Cavity);
        assert_eq!(config.process_count(), 2);
        assert_eq!(config.launched_ranks(), 2);
    }

    #[test]
    fn json_accepts_overrides() {
        let config = RunConfig::from_json_str(
            r#"{"ndx": 1, "ndy": 1, "nx": 8, "ny": 8, "precision": "float32",
                "steps": 10, "dumpFreq": 5, "boundary": "couette", "lidVelocity": 0.05}"#,
        )
        .unwrap();
        assert_eq!(config.precision, Precision::Float32);
        assert_eq!(config.steps, 10);
        assert_eq!(config.dump_freq, 5);
        assert_eq!(config.boundary, BoundaryMode::Couette);
        assert_eq!(config.lid_velocity, 0.05);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        assert!(RunConfig::new(0, 1, 8, 8).validate().is_err());
        assert!(RunConfig::new(4, 1, 3, 8).validate().is_err());

        let mut config = RunConfig::new(1, 1, 8, 8);
        config.omega = 2.0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::new(2, 1, 8, 8);
        config.boundary = BoundaryMode::Couette;
        assert!(config.validate().is_err());

        let mut config = RunConfig::new(1, 1, 8, 8);
        config.dump_freq = 0;
        assert!(config.validate().is_err());
    }
}
