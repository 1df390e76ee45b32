//! Distribution field - Structure of Arrays storage for the 9 channels
//!
//! Layout: one contiguous plane per channel, x-major inside a plane:
//!   data[i * cells + x * ny + y]
//! A column (fixed x) of one channel is contiguous; a row (fixed y) is strided.

use ndarray::Array2;

use crate::core::Real;
use crate::domain::lattice::Q;

use super::partition::LocalGeometry;

#[derive(Clone)]
pub struct DistributionField<T: Real> {
    nx: usize,
    ny: usize,
    cells: usize,
    pub data: Vec<T>,
    /// Streaming target, same size as `data`
    pub(crate) scratch: Vec<T>,
}

impl<T: Real> DistributionField<T> {
    pub fn new(nx: usize, ny: usize) -> Self {
        let cells = nx * ny;
        Self {
            nx,
            ny,
            cells,
            data: vec![T::ZERO; Q * cells],
            scratch: vec![T::ZERO; Q * cells],
        }
    }

    // === Dimensions ===
    #[inline]
    pub fn nx(&self) -> usize { self.nx }

    #[inline]
    pub fn ny(&self) -> usize { self.ny }

    #[inline]
    pub fn cells(&self) -> usize { self.cells }

    // === Index conversion ===
    #[inline]
    pub fn cell(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.nx && y < self.ny, "cell ({x}, {y}) outside {}x{}", self.nx, self.ny);
        x * self.ny + y
    }

    #[inline]
    pub fn index(&self, i: usize, x: usize, y: usize) -> usize {
        i * self.cells + self.cell(x, y)
    }

    #[inline]
    pub fn get(&self, i: usize, x: usize, y: usize) -> T {
        *fast!(self.data, [self.index(i, x, y)])
    }

    #[inline]
    pub fn set(&mut self, i: usize, x: usize, y: usize, value: T) {
        let idx = self.index(i, x, y);
        fast!(self.data, [idx] = value);
    }

    #[inline]
    pub fn channel(&self, i: usize) -> &[T] {
        &self.data[i * self.cells..(i + 1) * self.cells]
    }

    #[inline]
    pub fn channel_mut(&mut self, i: usize) -> &mut [T] {
        let cells = self.cells;
        &mut self.data[i * cells..(i + 1) * cells]
    }

    /// Sum of all channels at a cell
    pub fn density_at(&self, x: usize, y: usize) -> T {
        let k = self.cell(x, y);
        let mut rho = T::ZERO;
        for i in 0..Q {
            rho += *fast!(self.data, [i * self.cells + k]);
        }
        rho
    }

    // === Layer copies (boundary snapshots and halo buffers) ===

    /// All channels of column `x`, packed as [i][y]
    pub fn column(&self, x: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(Q * self.ny);
        for i in 0..Q {
            let start = self.index(i, x, 0);
            out.extend_from_slice(&self.data[start..start + self.ny]);
        }
        out
    }

    pub fn set_column(&mut self, x: usize, packed: &[T]) {
        debug_assert_eq!(packed.len(), Q * self.ny);
        let ny = self.ny;
        for i in 0..Q {
            let start = self.index(i, x, 0);
            self.data[start..start + ny].copy_from_slice(&packed[i * ny..(i + 1) * ny]);
        }
    }

    /// All channels of row `y`, packed as [i][x]
    pub fn row(&self, y: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(Q * self.nx);
        for i in 0..Q {
            for x in 0..self.nx {
                out.push(self.get(i, x, y));
            }
        }
        out
    }

    pub fn set_row(&mut self, y: usize, packed: &[T]) {
        debug_assert_eq!(packed.len(), Q * self.nx);
        let nx = self.nx;
        for i in 0..Q {
            for x in 0..nx {
                self.set(i, x, y, packed[i * nx + x]);
            }
        }
    }
}

/// Macroscopic fields derived by the collision step
#[derive(Debug, Clone)]
pub struct Moments<T: Real> {
    nx: usize,
    ny: usize,
    pub rho: Vec<T>,
    pub ux: Vec<T>,
    pub uy: Vec<T>,
}

/// Selector for one macroscopic field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentKind {
    Density,
    VelocityX,
    VelocityY,
}

impl MomentKind {
    pub fn name(self) -> &'static str {
        match self {
            MomentKind::Density => "rho",
            MomentKind::VelocityX => "ux",
            MomentKind::VelocityY => "uy",
        }
    }
}

impl<T: Real> Moments<T> {
    pub fn new(nx: usize, ny: usize) -> Self {
        let cells = nx * ny;
        Self {
            nx,
            ny,
            rho: vec![T::ZERO; cells],
            ux: vec![T::ZERO; cells],
            uy: vec![T::ZERO; cells],
        }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    pub fn values(&self, kind: MomentKind) -> &[T] {
        match kind {
            MomentKind::Density => &self.rho,
            MomentKind::VelocityX => &self.ux,
            MomentKind::VelocityY => &self.uy,
        }
    }

    #[inline]
    pub fn at(&self, kind: MomentKind, x: usize, y: usize) -> T {
        self.values(kind)[x * self.ny + y]
    }

    /// Whole local array (ghosts included) as a 2D array indexed [[x, y]]
    pub fn to_array(&self, kind: MomentKind) -> Array2<T> {
        let values = self.values(kind);
        let ny = self.ny;
        Array2::from_shape_fn((self.nx, self.ny), |(x, y)| values[x * ny + y])
    }

    /// Owned (non-ghost) region as a 2D array indexed [[x, y]]
    pub fn owned(&self, kind: MomentKind, geometry: &LocalGeometry) -> Array2<T> {
        let values = self.values(kind);
        let ny = self.ny;
        let (x0, y0) = (geometry.x.owned_start, geometry.y.owned_start);
        Array2::from_shape_fn(geometry.owned_shape(), |(x, y)| values[(x0 + x) * ny + (y0 + y)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comm::topology::CartTopology;

    fn numbered(nx: usize, ny: usize) -> DistributionField<f64> {
        let mut f = DistributionField::new(nx, ny);
        for (k, v) in f.data.iter_mut().enumerate() {
            *v = k as f64;
        }
        f
    }

    #[test]
    fn index_is_channel_then_x_then_y() {
        let f = numbered(3, 4);
        assert_eq!(f.index(0, 0, 1), 1);
        assert_eq!(f.index(0, 1, 0), 4);
        assert_eq!(f.index(2, 0, 0), 24);
        assert_eq!(f.get(2, 1, 3), (24 + 4 + 3) as f64);
    }

    #[test]
    fn column_and_row_packing() {
        let f = numbered(3, 4);
        let col = f.column(1);
        assert_eq!(col.len(), Q * 4);
        assert_eq!(&col[0..4], &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(col[4], f.get(1, 1, 0));

        let row = f.row(2);
        assert_eq!(row.len(), Q * 3);
        assert_eq!(&row[0..3], &[2.0, 6.0, 10.0]);

        let mut g = DistributionField::<f64>::new(3, 4);
        g.set_column(1, &col);
        g.set_row(2, &row);
        for i in 0..Q {
            for y in 0..4 {
                assert_eq!(g.get(i, 1, y), f.get(i, 1, y));
            }
            for x in 0..3 {
                assert_eq!(g.get(i, x, 2), f.get(i, x, 2));
            }
        }
    }

    #[test]
    fn owned_slice_drops_ghosts() {
        // middle rank of three along x has ghosts on both sides
        let t = CartTopology::new((3, 1), 1, 3).unwrap();
        let geometry = LocalGeometry::new((9, 2), &t);
        let (nx, ny) = geometry.local_shape();
        assert_eq!((nx, ny), (5, 2));

        let mut m = Moments::<f64>::new(nx, ny);
        for x in 0..nx {
            for y in 0..ny {
                m.ux[x * ny + y] = (10 * x + y) as f64;
            }
        }
        let owned = m.owned(MomentKind::VelocityX, &geometry);
        assert_eq!(owned.dim(), (3, 2));
        assert_eq!(owned[[0, 0]], 10.0);
        assert_eq!(owned[[2, 1]], 31.0);
        assert_eq!(m.to_array(MomentKind::VelocityX)[[4, 1]], 41.0);
    }
}
