//! BGK collision: relax every cell toward its local equilibrium
//!
//! f <- f + omega (f_eq(rho, u) - f)
//!
//! The moments are computed first and handed back to the caller, who needs
//! them for snapshots anyway.

use crate::core::Real;
use crate::domain::lattice::{CH_E, CH_N, CH_NE, CH_NW, CH_S, CH_SE, CH_SW, CH_W, Q};
use crate::spatial::{DistributionField, Moments};

use super::equilibrium::equilibrium_channel;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Density and velocity of cell `k` from the SoA planes
#[inline(always)]
fn cell_moments<T: Real>(data: &[T], cells: usize, k: usize) -> (T, T, T) {
    let f = |i: usize| *fast!(data, [i * cells + k]);
    let mut rho = T::ZERO;
    for i in 0..Q {
        rho += f(i);
    }
    let ux = (f(CH_E) - f(CH_W) + f(CH_NE) - f(CH_NW) - f(CH_SW) + f(CH_SE)) / rho;
    let uy = (f(CH_N) - f(CH_S) + f(CH_NE) + f(CH_NW) - f(CH_SW) - f(CH_SE)) / rho;
    (rho, ux, uy)
}

/// Compute rho, ux, uy for every cell of `field` into `moments`
pub fn compute_moments<T: Real>(field: &DistributionField<T>, moments: &mut Moments<T>) {
    let cells = field.cells();
    debug_assert_eq!(moments.rho.len(), cells);
    let data = &field.data;

    #[cfg(feature = "parallel")]
    {
        moments
            .rho
            .par_iter_mut()
            .zip(moments.ux.par_iter_mut())
            .zip(moments.uy.par_iter_mut())
            .enumerate()
            .for_each(|(k, ((rho, ux), uy))| {
                (*rho, *ux, *uy) = cell_moments(data, cells, k);
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for k in 0..cells {
            let (rho, ux, uy) = cell_moments(data, cells, k);
            fast!(moments.rho, [k] = rho);
            fast!(moments.ux, [k] = ux);
            fast!(moments.uy, [k] = uy);
        }
    }
}

/// Collide in place, writing the pre-collision moments into `moments`
pub fn collide_into<T: Real>(field: &mut DistributionField<T>, omega: T, moments: &mut Moments<T>) {
    compute_moments(field, moments);

    let cells = field.cells();
    let (rho, ux, uy) = (&moments.rho, &moments.ux, &moments.uy);

    #[cfg(feature = "parallel")]
    {
        field.data.par_chunks_mut(cells).enumerate().for_each(|(i, plane)| {
            relax_plane(i, plane, omega, rho, ux, uy);
        });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, plane) in field.data.chunks_mut(cells).enumerate() {
            relax_plane(i, plane, omega, rho, ux, uy);
        }
    }
}

/// Collide in place and return the moments
pub fn collide<T: Real>(field: &mut DistributionField<T>, omega: T) -> Moments<T> {
    let mut moments = Moments::new(field.nx(), field.ny());
    collide_into(field, omega, &mut moments);
    moments
}

#[inline]
fn relax_plane<T: Real>(i: usize, plane: &mut [T], omega: T, rho: &[T], ux: &[T], uy: &[T]) {
    for (k, f) in plane.iter_mut().enumerate() {
        let feq = equilibrium_channel(i, *fast!(rho, [k]), *fast!(ux, [k]), *fast!(uy, [k]));
        *f += omega * (feq - *f);
    }
}
