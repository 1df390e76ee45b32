//! Streaming: move every channel one cell along its velocity
//!
//! Each channel plane is rolled circularly over the local array. Cells next to
//! a physical wall come out wrong and are fixed by the boundary pass; cells
//! next to a ghost layer pick up the neighbor's data.

use crate::core::Real;
use crate::domain::lattice::velocity;
#[cfg(not(feature = "parallel"))]
use crate::domain::lattice::Q;
use crate::spatial::DistributionField;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Roll one x-major `nx * ny` plane by (dx, dy) with wrap-around:
/// `dst[(x + dx) % nx][(y + dy) % ny] = src[x][y]`
pub fn roll_channel<T: Real>(dst: &mut [T], src: &[T], nx: usize, ny: usize, dx: i32, dy: i32) {
    debug_assert!(dst.len() == nx * ny && src.len() == nx * ny);
    if nx == 0 || ny == 0 {
        return;
    }
    let sx = dx.rem_euclid(nx as i32) as usize;
    let sy = dy.rem_euclid(ny as i32) as usize;

    for x in 0..nx {
        let tx = (x + sx) % nx;
        let from = &src[x * ny..(x + 1) * ny];
        let to = &mut dst[tx * ny..(tx + 1) * ny];
        // y shift is a rotation of one contiguous column
        to[sy..].copy_from_slice(&from[..ny - sy]);
        to[..sy].copy_from_slice(&from[ny - sy..]);
    }
}

/// Stream all moving channels in place. The rest channel is untouched.
pub fn stream<T: Real>(field: &mut DistributionField<T>) {
    let (nx, ny, cells) = (field.nx(), field.ny(), field.cells());
    let DistributionField { data, scratch, .. } = field;
    scratch.copy_from_slice(data);

    #[cfg(feature = "parallel")]
    {
        data.par_chunks_mut(cells)
            .zip(scratch.par_chunks(cells))
            .enumerate()
            .skip(1)
            .for_each(|(i, (plane, src))| {
                let (dx, dy) = velocity(i);
                roll_channel(plane, src, nx, ny, dx, dy);
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for i in 1..Q {
            let (dx, dy) = velocity(i);
            let range = i * cells..(i + 1) * cells;
            roll_channel(&mut data[range.clone()], &scratch[range], nx, ny, dx, dy);
        }
    }
}
