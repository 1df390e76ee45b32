//! Floating point abstraction. The whole engine is generic over `Real` so the
//! launcher can pick single or double precision at startup.

use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::LbmError;

pub trait Real:
    Copy
    + Send
    + Sync
    + Default
    + Debug
    + Display
    + PartialOrd
    + bytemuck::Pod
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + 'static
{
    const ZERO: Self;
    const ONE: Self;
    /// NPY type code without the byte-order prefix (`f4`, `f8`).
    const NPY_KIND: &'static str;
    const PRECISION: Precision;

    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
    fn abs(self) -> Self;
    fn is_finite(self) -> bool;
}

impl Real for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const NPY_KIND: &'static str = "f4";
    const PRECISION: Precision = Precision::Float32;

    #[inline]
    fn from_f64(v: f64) -> Self { v as f32 }
    #[inline]
    fn to_f64(self) -> f64 { self as f64 }
    #[inline]
    fn abs(self) -> Self { f32::abs(self) }
    #[inline]
    fn is_finite(self) -> bool { f32::is_finite(self) }
}

impl Real for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const NPY_KIND: &'static str = "f8";
    const PRECISION: Precision = Precision::Float64;

    #[inline]
    fn from_f64(v: f64) -> Self { v }
    #[inline]
    fn to_f64(self) -> f64 { self }
    #[inline]
    fn abs(self) -> Self { f64::abs(self) }
    #[inline]
    fn is_finite(self) -> bool { f64::is_finite(self) }
}

/// Numeric precision selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[serde(alias = "f32", alias = "float")]
    Float32,
    #[default]
    #[serde(alias = "f64", alias = "double")]
    Float64,
}

impl Precision {
    pub fn name(self) -> &'static str {
        match self {
            Precision::Float32 => "float32",
            Precision::Float64 => "float64",
        }
    }
}

impl Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Precision {
    type Err = LbmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "float32" | "f32" | "f4" | "float" | "single" => Ok(Precision::Float32),
            "float64" | "f64" | "f8" | "d" | "double" => Ok(Precision::Float64),
            other => Err(LbmError::InvalidConfig(format!("unknown precision '{other}'"))),
        }
    }
}
