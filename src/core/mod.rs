//! Core building blocks shared by every layer of the solver.
//!
//! - `safety`  - checked-in-debug / unchecked-in-release indexing macros
//! - `error`   - crate error types
//! - `real`    - floating point abstraction used for precision selection

// Macros first so the rest of the crate can use them
#[macro_use]
#[path = "utils/safety.rs"]
pub mod safety;
pub mod error;
pub mod real;

pub use error::{CommError, LbmError, Result};
pub use real::{Precision, Real};
