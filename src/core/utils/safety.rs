//! Zero-cost indexing macros for the hot lattice loops.
//!
//! Debug builds keep normal bounds-checked indexing so an off-by-one in a ghost
//! layer panics with a useful message; release builds use unchecked access.
//!
//! ```rust
//! use lbm_cavity::fast;
//!
//! let plane = vec![0.25f64, 0.5, 0.75];
//! let value = *fast!(plane, [1]);
//! assert_eq!(value, 0.5);
//!
//! let mut moments = vec![0.0f64; 3];
//! fast!(moments, [2] = 1.0);
//! assert_eq!(moments[2], 1.0);
//! ```

/// Index a slice: bounds-checked in debug, `get_unchecked` in release.
///
/// Read form: `fast!(slice, [index])` yields a reference.
/// Write form: `fast!(slice, [index] = value)`.
#[macro_export]
macro_rules! fast {
    ($slice:expr, [$index:expr]) => {{
        #[cfg(debug_assertions)]
        {
            &$slice[$index]
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe { $slice.get_unchecked($index) }
        }
    }};

    ($slice:expr, [$index:expr] = $val:expr) => {{
        #[cfg(debug_assertions)]
        {
            $slice[$index] = $val;
        }
        #[cfg(not(debug_assertions))]
        {
            unsafe {
                *$slice.get_unchecked_mut($index) = $val;
            }
        }
    }};
}
