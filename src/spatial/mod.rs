//! Spatial layout: how the lattice is split over ranks and stored per rank.

pub mod field;
pub mod partition;

pub use field::{DistributionField, MomentKind, Moments};
pub use partition::{AxisSpan, LocalGeometry};
