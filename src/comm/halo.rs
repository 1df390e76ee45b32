//! Ghost layer exchange
//!
//! Four shifts, x first:
//!   1. column 1      -> left,  column nx-1 <- right
//!   2. column nx-2   -> right, column 0    <- left
//!   3. row 1         -> down,  row ny-1    <- up
//!   4. row ny-2      -> up,    row 0       <- down
//! Every layer carries all 9 channels over the full local extent, so the y
//! shifts forward the corner values received during the x shifts.

use crate::core::{CommError, Real};
use crate::domain::lattice::Q;
use crate::spatial::DistributionField;

use super::topology::{CartTopology, Direction};
use super::transport::{
    decode_into, encode, Tag, Transport, TAG_HALO_DOWN, TAG_HALO_LEFT, TAG_HALO_RIGHT, TAG_HALO_UP,
};

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// One directed shift: send layer `send_at` to `dest`, overwrite layer
/// `recv_at` with what arrives from `source`
fn shift<T: Real, C: Transport>(
    field: &mut DistributionField<T>,
    transport: &C,
    axis: Axis,
    (dest, send_at): (Option<usize>, usize),
    (source, recv_at): (Option<usize>, usize),
    tag: Tag,
) -> Result<(), CommError> {
    let payload = match (dest, axis) {
        (None, _) => Vec::new(),
        (Some(_), Axis::X) => encode(&field.column(send_at)),
        (Some(_), Axis::Y) => encode(&field.row(send_at)),
    };

    let Some(received) = transport.sendrecv(payload, dest, source, tag)? else {
        return Ok(());
    };
    let source = source.unwrap_or_default();

    match axis {
        Axis::X => {
            let mut layer = vec![T::ZERO; Q * field.ny()];
            decode_into(&received, &mut layer, source)?;
            field.set_column(recv_at, &layer);
        }
        Axis::Y => {
            let mut layer = vec![T::ZERO; Q * field.nx()];
            decode_into(&received, &mut layer, source)?;
            field.set_row(recv_at, &layer);
        }
    }
    Ok(())
}

/// Refresh every ghost layer of `field` from the neighboring ranks.
/// A no-op on a rank without neighbors.
pub fn communicate<T: Real, C: Transport>(
    field: &mut DistributionField<T>,
    topology: &CartTopology,
    transport: &C,
) -> Result<(), CommError> {
    let (lx, ly) = (field.nx() - 1, field.ny() - 1);
    let left = topology.neighbor(Direction::Left);
    let right = topology.neighbor(Direction::Right);
    let down = topology.neighbor(Direction::Down);
    let up = topology.neighbor(Direction::Up);

    shift(field, transport, Axis::X, (left, 1), (right, lx), TAG_HALO_LEFT)?;
    shift(field, transport, Axis::X, (right, lx.saturating_sub(1)), (left, 0), TAG_HALO_RIGHT)?;
    shift(field, transport, Axis::Y, (down, 1), (up, ly), TAG_HALO_DOWN)?;
    shift(field, transport, Axis::Y, (up, ly.saturating_sub(1)), (down, 0), TAG_HALO_UP)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::local::ThreadGroup;
    use crate::spatial::LocalGeometry;
    use std::thread;

    fn value(i: usize, gx: usize, gy: usize) -> f64 {
        (i * 10_000 + gx * 100 + gy) as f64
    }

    /// Fill owned cells by global coordinate, ghosts with -1, exchange, then
    /// check that every local cell holds the value of its global coordinate.
    fn check_exchange(global: (usize, usize), dims: (usize, usize)) {
        let size = dims.0 * dims.1;
        let endpoints = ThreadGroup::endpoints(size);
        thread::scope(|s| {
            let handles: Vec<_> = endpoints
                .into_iter()
                .map(|ep| {
                    s.spawn(move || {
                        let topology = CartTopology::new(dims, ep.rank(), size).unwrap();
                        let geometry = LocalGeometry::new(global, &topology);
                        let (nx, ny) = geometry.local_shape();
                        let (ox, oy) = geometry.global_offset();
                        let to_global = |x: usize, y: usize| {
                            (x + ox - geometry.x.owned_start, y + oy - geometry.y.owned_start)
                        };

                        let mut field = DistributionField::<f64>::new(nx, ny);
                        for i in 0..Q {
                            for x in 0..nx {
                                for y in 0..ny {
                                    let owned = geometry.owned_x().contains(&x)
                                        && geometry.owned_y().contains(&y);
                                    let (gx, gy) = to_global(x, y);
                                    field.set(i, x, y, if owned { value(i, gx, gy) } else { -1.0 });
                                }
                            }
                        }

                        communicate(&mut field, &topology, &ep).unwrap();

                        for i in 0..Q {
                            for x in 0..nx {
                                for y in 0..ny {
                                    let (gx, gy) = to_global(x, y);
                                    assert_eq!(
                                        field.get(i, x, y),
                                        value(i, gx, gy),
                                        "rank {} channel {i} local ({x}, {y})",
                                        ep.rank()
                                    );
                                }
                            }
                        }
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
        });
    }

    #[test]
    fn exchange_along_x() {
        check_exchange((7, 3), (2, 1));
    }

    #[test]
    fn exchange_along_y() {
        check_exchange((3, 8), (1, 2));
    }

    #[test]
    fn exchange_fills_diagonal_corners() {
        check_exchange((9, 10), (3, 2));
    }

    #[test]
    fn single_rank_is_untouched() {
        let ep = ThreadGroup::single();
        let mut field = DistributionField::<f32>::new(3, 3);
        field.set(4, 1, 1, 2.5);
        let before = field.data.clone();
        communicate(&mut field, &CartTopology::serial(), &ep).unwrap();
        assert_eq!(field.data, before);
    }
}
