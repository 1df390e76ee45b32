//! Streaming with wall physics at the physical edges of the domain
//!
//! No-slip walls use bounce-back: a channel that would have left through the
//! wall comes back in the opposite channel at the same cell. The northern wall
//! slides east at `u0` and adds momentum to the two diagonals it reflects.
//!
//! Only edges without a neighboring rank are walls. Edges that face another
//! rank get their incoming values from the ghost layer during streaming.

use crate::comm::topology::{CartTopology, Direction};
use crate::core::Real;
use crate::domain::config::BoundaryMode;
use crate::domain::lattice::{CH_E, CH_N, CH_NE, CH_NW, CH_REST, CH_S, CH_SE, CH_SW, CH_W, W};
use crate::spatial::DistributionField;

use super::streaming::stream;

/// Which edges of the local array are physical walls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallSet {
    pub left: bool,
    pub right: bool,
    pub bottom: bool,
    /// The sliding lid
    pub top: bool,
}

impl WallSet {
    pub const ALL: WallSet = WallSet { left: true, right: true, bottom: true, top: true };
    pub const NONE: WallSet = WallSet { left: false, right: false, bottom: false, top: false };

    /// A wall wherever the rank has no neighbor. Couette mode drops the side
    /// walls so the x axis stays periodic.
    pub fn from_topology(topology: &CartTopology, mode: BoundaryMode) -> Self {
        let side_walls = mode == BoundaryMode::Cavity;
        Self {
            left: side_walls && !topology.has_neighbor(Direction::Left),
            right: side_walls && !topology.has_neighbor(Direction::Right),
            bottom: !topology.has_neighbor(Direction::Down),
            top: !topology.has_neighbor(Direction::Up),
        }
    }

    pub fn any(&self) -> bool {
        self.left || self.right || self.bottom || self.top
    }
}

/// Pre-stream copy of one boundary layer, packed as [channel][position]
struct Layer<T> {
    len: usize,
    values: Vec<T>,
}

impl<T: Real> Layer<T> {
    #[inline]
    fn at(&self, i: usize, pos: usize) -> T {
        *fast!(self.values, [i * self.len + pos])
    }
}

/// Stream, then apply bounce-back on every wall in `walls`; the top wall
/// moves with tangential velocity `u0`.
pub fn stream_and_bounce_back<T: Real>(field: &mut DistributionField<T>, walls: WallSet, u0: T) {
    let (nx, ny) = (field.nx(), field.ny());
    let (lx, ly) = (nx - 1, ny - 1);

    let bottom = Layer { len: nx, values: field.row(0) };
    let top = Layer { len: nx, values: field.row(ly) };
    let left = Layer { len: ny, values: field.column(0) };
    let right = Layer { len: ny, values: field.column(lx) };

    stream(field);

    if walls.bottom {
        for x in 0..nx {
            field.set(CH_N, x, 0, bottom.at(CH_S, x));
            field.set(CH_NE, x, 0, bottom.at(CH_SW, x));
            field.set(CH_NW, x, 0, bottom.at(CH_SE, x));
        }
    }

    if walls.left {
        for y in 0..ny {
            field.set(CH_E, 0, y, left.at(CH_W, y));
            field.set(CH_NE, 0, y, left.at(CH_SW, y));
            field.set(CH_SE, 0, y, left.at(CH_NW, y));
        }
    }

    if walls.right {
        for y in 0..ny {
            field.set(CH_W, lx, y, right.at(CH_E, y));
            field.set(CH_NW, lx, y, right.at(CH_SE, y));
            field.set(CH_SW, lx, y, right.at(CH_NE, y));
        }
    }

    if walls.top {
        let six = T::from_f64(6.0);
        let lid_se = six * T::from_f64(W[CH_SE]) * u0;
        let lid_sw = six * T::from_f64(W[CH_SW]) * u0;
        for x in 0..nx {
            // density at the wall, from the reflected and the arriving channels;
            // side walls have already replaced the x-wrapped values at the corners
            let rho_wall = top.at(CH_NW, x)
                + top.at(CH_N, x)
                + top.at(CH_NE, x)
                + field.get(CH_NW, x, ly)
                + field.get(CH_N, x, ly)
                + field.get(CH_NE, x, ly)
                + field.get(CH_W, x, ly)
                + field.get(CH_REST, x, ly)
                + field.get(CH_E, x, ly);
            field.set(CH_S, x, ly, top.at(CH_N, x));
            field.set(CH_SE, x, ly, top.at(CH_NW, x) + lid_se * rho_wall);
            field.set(CH_SW, x, ly, top.at(CH_NE, x) - lid_sw * rho_wall);
        }
    }

    // Corner cells touch two walls; rebuild them from the snapshots directly
    if walls.bottom && walls.left {
        field.set(CH_N, 0, 0, bottom.at(CH_S, 0));
        field.set(CH_E, 0, 0, bottom.at(CH_W, 0));
        field.set(CH_NE, 0, 0, bottom.at(CH_SW, 0));
    }
    if walls.bottom && walls.right {
        field.set(CH_N, lx, 0, bottom.at(CH_S, lx));
        field.set(CH_W, lx, 0, bottom.at(CH_E, lx));
        field.set(CH_NW, lx, 0, bottom.at(CH_SE, lx));
    }
    if walls.top && walls.left {
        field.set(CH_S, 0, ly, top.at(CH_N, 0));
        field.set(CH_E, 0, ly, top.at(CH_W, 0));
        field.set(CH_SE, 0, ly, top.at(CH_NW, 0));
    }
    if walls.top && walls.right {
        field.set(CH_S, lx, ly, top.at(CH_N, lx));
        field.set(CH_W, lx, ly, top.at(CH_E, lx));
        field.set(CH_SW, lx, ly, top.at(CH_NE, lx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lattice::{C, Q};
    use crate::systems::collision::collide;
    use crate::systems::equilibrium::fill_rest_state;
    use approx::assert_relative_eq;

    fn rest(nx: usize, ny: usize) -> DistributionField<f64> {
        let mut f = DistributionField::new(nx, ny);
        fill_rest_state(&mut f);
        f
    }

    fn momentum_x(field: &DistributionField<f64>) -> f64 {
        (0..Q).map(|i| C[i][0] as f64 * field.channel(i).iter().sum::<f64>()).sum()
    }

    #[test]
    fn resting_fluid_stays_at_rest() {
        let mut f = rest(6, 5);
        let initial = f.data.clone();
        for _ in 0..25 {
            stream_and_bounce_back(&mut f, WallSet::ALL, 0.0);
            let m = collide(&mut f, 1.7);
            for k in 0..f.cells() {
                assert_relative_eq!(m.rho[k], 1.0, epsilon = 1e-12);
                assert_relative_eq!(m.ux[k], 0.0, epsilon = 1e-12);
                assert_relative_eq!(m.uy[k], 0.0, epsilon = 1e-12);
            }
        }
        for (a, b) in f.data.iter().zip(&initial) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn walls_conserve_mass() {
        let mut f = rest(5, 4);
        // perturb an interior and a wall cell
        f.set(CH_NE, 2, 2, 0.2);
        f.set(CH_S, 1, 0, 0.3);
        f.set(CH_E, 4, 1, 0.25);
        let before: f64 = f.data.iter().sum();
        stream_and_bounce_back(&mut f, WallSet::ALL, 0.0);
        let after: f64 = f.data.iter().sum();
        assert_relative_eq!(before, after, epsilon = 1e-12);
    }

    #[test]
    fn bottom_wall_reflects_southward_channels() {
        let mut f = DistributionField::<f64>::new(4, 4);
        f.set(CH_S, 1, 0, 1.0);
        f.set(CH_SW, 2, 0, 2.0);
        f.set(CH_SE, 2, 0, 3.0);
        stream_and_bounce_back(&mut f, WallSet { bottom: true, ..WallSet::NONE }, 0.0);
        assert_eq!(f.get(CH_N, 1, 0), 1.0);
        assert_eq!(f.get(CH_NE, 2, 0), 2.0);
        assert_eq!(f.get(CH_NW, 2, 0), 3.0);
    }

    #[test]
    fn missing_walls_leave_plain_streaming() {
        let mut a = rest(4, 3);
        a.set(CH_E, 3, 1, 0.5);
        a.set(CH_N, 2, 2, 0.7);
        let mut b = a.clone();
        stream_and_bounce_back(&mut a, WallSet::NONE, 0.1);
        stream(&mut b);
        assert_eq!(a.data, b.data);
    }

    #[test]
    fn sliding_lid_pushes_fluid_east() {
        let mut f = rest(8, 8);
        assert_relative_eq!(momentum_x(&f), 0.0, epsilon = 1e-14);
        stream_and_bounce_back(&mut f, WallSet::ALL, 0.1);
        assert!(momentum_x(&f) > 0.0);

        // lid term: 6 w rho u0 with rho = 1 on a resting lid row, away from corners
        let expected = (1.0 / 36.0) + 6.0 * (1.0 / 36.0) * 1.0 * 0.1;
        assert_relative_eq!(f.get(CH_SE, 3, 7), expected, epsilon = 1e-14);
    }

    #[test]
    fn corners_use_pure_bounce_back() {
        let mut f = rest(4, 4);
        stream_and_bounce_back(&mut f, WallSet::ALL, 0.1);
        // top corners are rebuilt without the lid term
        assert_relative_eq!(f.get(CH_SE, 0, 3), 1.0 / 36.0, epsilon = 1e-15);
        assert_relative_eq!(f.get(CH_SW, 3, 3), 1.0 / 36.0, epsilon = 1e-15);
    }

    #[test]
    fn lid_corners_ignore_the_far_column() {
        let (nx, ny) = (5, 4);
        let (lx, ly) = (nx - 1, ny - 1);
        let reference = {
            let mut f = rest(nx, ny);
            stream_and_bounce_back(&mut f, WallSet::ALL, 0.1);
            f
        };

        // values that a plain roll would carry across the x boundary into the top corners
        let mut into_left = rest(nx, ny);
        into_left.set(CH_E, lx, ly, 0.4);
        into_left.set(CH_NE, lx, ly - 1, 0.3);
        stream_and_bounce_back(&mut into_left, WallSet::ALL, 0.1);
        assert_eq!(into_left.get(CH_SW, 0, ly), reference.get(CH_SW, 0, ly));

        let mut into_right = rest(nx, ny);
        into_right.set(CH_W, 0, ly, 0.4);
        into_right.set(CH_NW, 0, ly - 1, 0.3);
        stream_and_bounce_back(&mut into_right, WallSet::ALL, 0.1);
        assert_eq!(into_right.get(CH_SE, lx, ly), reference.get(CH_SE, lx, ly));
    }

    #[test]
    fn wall_set_follows_topology() {
        let t = CartTopology::new((2, 1), 0, 2).unwrap();
        let walls = WallSet::from_topology(&t, BoundaryMode::Cavity);
        assert_eq!(walls, WallSet { left: true, right: false, bottom: true, top: true });

        let couette = WallSet::from_topology(&CartTopology::serial(), BoundaryMode::Couette);
        assert_eq!(couette, WallSet { left: false, right: false, bottom: true, top: true });
        assert!(couette.any());
    }
}
