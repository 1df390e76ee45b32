//! Equilibrium distribution
//!
//! f_i = w_i rho (1 + 3 c_i.u + 9/2 (c_i.u)^2 - 3/2 |u|^2)
//!
//! Written out per channel so no multiplication with a zero velocity
//! component is ever performed.

use crate::core::Real;
use crate::domain::lattice::{Q, W_AXIS, W_DIAG, W_REST};
use crate::spatial::DistributionField;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[inline(always)]
fn term<T: Real>(w: T, rho: T, cu: T, uu: T, three: T, four_half: T, three_half: T) -> T {
    w * rho * (T::ONE + three * cu + four_half * cu * cu - three_half * uu)
}

/// Equilibrium occupation of channel `i` for one cell
#[inline]
pub fn equilibrium_channel<T: Real>(i: usize, rho: T, ux: T, uy: T) -> T {
    let three = T::from_f64(3.0);
    let four_half = T::from_f64(4.5);
    let three_half = T::from_f64(1.5);
    let uu = ux * ux + uy * uy;
    let (w, cu) = match i {
        0 => return T::from_f64(W_REST) * rho * (T::ONE - three_half * uu),
        1 => (W_AXIS, ux),
        2 => (W_AXIS, uy),
        3 => (W_AXIS, -ux),
        4 => (W_AXIS, -uy),
        5 => (W_DIAG, ux + uy),
        6 => (W_DIAG, -ux + uy),
        7 => (W_DIAG, -ux - uy),
        _ => (W_DIAG, ux - uy),
    };
    term(T::from_f64(w), rho, cu, uu, three, four_half, three_half)
}

/// All 9 equilibrium occupations for one cell
#[inline]
pub fn equilibrium_cell<T: Real>(rho: T, ux: T, uy: T) -> [T; Q] {
    let mut out = [T::ZERO; Q];
    for (i, v) in out.iter_mut().enumerate() {
        *v = equilibrium_channel(i, rho, ux, uy);
    }
    out
}

/// Overwrite every cell of `field` with the equilibrium of the given
/// macroscopic fields (flat, x-major, one value per cell)
pub fn fill_equilibrium<T: Real>(field: &mut DistributionField<T>, rho: &[T], ux: &[T], uy: &[T]) {
    let cells = field.cells();
    debug_assert!(rho.len() == cells && ux.len() == cells && uy.len() == cells);

    #[cfg(feature = "parallel")]
    {
        field.data.par_chunks_mut(cells).enumerate().for_each(|(i, plane)| {
            for (k, v) in plane.iter_mut().enumerate() {
                *v = equilibrium_channel(i, rho[k], ux[k], uy[k]);
            }
        });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, plane) in field.data.chunks_mut(cells).enumerate() {
            for (k, v) in plane.iter_mut().enumerate() {
                *v = equilibrium_channel(i, rho[k], ux[k], uy[k]);
            }
        }
    }
}

/// Quiescent fluid: rho = 1, u = 0 everywhere
pub fn fill_rest_state<T: Real>(field: &mut DistributionField<T>) {
    let cells = field.cells();
    let rho = vec![T::ONE; cells];
    let zero = vec![T::ZERO; cells];
    fill_equilibrium(field, &rho, &zero, &zero);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lattice::{C, W};
    use approx::assert_relative_eq;

    #[test]
    fn rest_state_equals_weights() {
        let feq = equilibrium_cell(1.0f64, 0.0, 0.0);
        assert_eq!(feq, W);
        assert_relative_eq!(feq.iter().sum::<f64>(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn zeroth_moment_is_density() {
        for &(rho, ux, uy) in &[(1.0, 0.05, -0.02), (0.7, -0.1, 0.1), (1.3, 0.0, 0.08), (2.0, 0.12, 0.03)] {
            let feq = equilibrium_cell::<f64>(rho, ux, uy);
            assert_relative_eq!(feq.iter().sum::<f64>(), rho, epsilon = 1e-13);
        }
    }

    #[test]
    fn first_moment_is_momentum() {
        let (rho, ux, uy) = (1.1f64, 0.04, -0.07);
        let feq = equilibrium_cell(rho, ux, uy);
        let jx: f64 = (0..Q).map(|i| feq[i] * C[i][0] as f64).sum();
        let jy: f64 = (0..Q).map(|i| feq[i] * C[i][1] as f64).sum();
        assert_relative_eq!(jx, rho * ux, epsilon = 1e-14);
        assert_relative_eq!(jy, rho * uy, epsilon = 1e-14);
    }

    #[test]
    fn matches_generic_formula() {
        let (rho, ux, uy) = (0.9f64, -0.03, 0.06);
        let uu = ux * ux + uy * uy;
        for i in 0..Q {
            let cu = C[i][0] as f64 * ux + C[i][1] as f64 * uy;
            let expected = W[i] * rho * (1.0 + 3.0 * cu + 4.5 * cu * cu - 1.5 * uu);
            assert_relative_eq!(equilibrium_channel(i, rho, ux, uy), expected, epsilon = 1e-15);
        }
    }

    #[test]
    fn fill_rest_state_sets_every_cell() {
        let mut f = DistributionField::<f32>::new(4, 3);
        fill_rest_state(&mut f);
        for x in 0..4 {
            for y in 0..3 {
                assert_relative_eq!(f.density_at(x, y), 1.0, epsilon = 1e-6);
                assert_eq!(f.get(5, x, y), (1.0f64 / 36.0) as f32);
            }
        }
    }
}
