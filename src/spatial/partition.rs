//! Grid partitioner: local array geometry of one rank
//!
//! Along each axis a rank owns `global / parts` cells; the last rank along the
//! axis also takes the remainder, so owned extents always add up to the
//! global extent. Every side with a neighbor adds one ghost cell.

use std::ops::Range;

use crate::comm::topology::{CartTopology, Direction};

/// Partition of one axis for one rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisSpan {
    /// Cells this rank is authoritative for
    pub owned: usize,
    /// Array extent including ghost cells
    pub local: usize,
    /// Local index of the first owned cell (1 when there is a low-side ghost)
    pub owned_start: usize,
    /// Global index of the first owned cell
    pub global_offset: usize,
    pub low_ghost: bool,
    pub high_ghost: bool,
}

impl AxisSpan {
    pub fn split(global: usize, parts: usize, coord: usize, has_low: bool, has_high: bool) -> Self {
        let base = global / parts;
        let owned = if has_high {
            base
        } else {
            global - base * (parts - 1)
        };
        let local = owned + usize::from(has_low) + usize::from(has_high);

        Self {
            owned,
            local,
            owned_start: usize::from(has_low),
            global_offset: coord * base,
            low_ghost: has_low,
            high_ghost: has_high,
        }
    }

    #[inline]
    pub fn owned_range(&self) -> Range<usize> {
        self.owned_start..self.owned_start + self.owned
    }

    #[inline]
    pub fn global_range(&self) -> Range<usize> {
        self.global_offset..self.global_offset + self.owned
    }
}

/// Local geometry of one rank's subdomain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalGeometry {
    pub global: (usize, usize),
    pub x: AxisSpan,
    pub y: AxisSpan,
}

impl LocalGeometry {
    pub fn new(global: (usize, usize), topology: &CartTopology) -> Self {
        let (ndx, ndy) = topology.dims();
        let (px, py) = topology.coords();
        let x = AxisSpan::split(
            global.0,
            ndx,
            px,
            topology.has_neighbor(Direction::Left),
            topology.has_neighbor(Direction::Right),
        );
        let y = AxisSpan::split(
            global.1,
            ndy,
            py,
            topology.has_neighbor(Direction::Down),
            topology.has_neighbor(Direction::Up),
        );
        Self { global, x, y }
    }

    /// Local array size including ghosts
    #[inline]
    pub fn local_shape(&self) -> (usize, usize) {
        (self.x.local, self.y.local)
    }

    #[inline]
    pub fn owned_shape(&self) -> (usize, usize) {
        (self.x.owned, self.y.owned)
    }

    #[inline]
    pub fn owned_x(&self) -> Range<usize> {
        self.x.owned_range()
    }

    #[inline]
    pub fn owned_y(&self) -> Range<usize> {
        self.y.owned_range()
    }

    #[inline]
    pub fn global_offset(&self) -> (usize, usize) {
        (self.x.global_offset, self.y.global_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(global: usize, parts: usize) -> Vec<AxisSpan> {
        (0..parts)
            .map(|c| AxisSpan::split(global, parts, c, c > 0, c + 1 < parts))
            .collect()
    }

    #[test]
    fn owned_extents_sum_to_global() {
        for global in 1..40 {
            for parts in 1..=global.min(7) {
                let total: usize = spans(global, parts).iter().map(|s| s.owned).sum();
                assert_eq!(total, global, "global={global} parts={parts}");
            }
        }
    }

    #[test]
    fn remainder_goes_to_last_rank() {
        let owned: Vec<usize> = spans(10, 3).iter().map(|s| s.owned).collect();
        assert_eq!(owned, vec![3, 3, 4]);
    }

    #[test]
    fn ghost_cells_follow_neighbors() {
        let s = spans(12, 3);
        // edge, interior, edge
        assert_eq!(s[0].local, 5);
        assert_eq!(s[1].local, 6);
        assert_eq!(s[2].local, 5);
        assert_eq!(AxisSpan::split(12, 1, 0, false, false).local, 12);
    }

    #[test]
    fn owned_range_skips_ghosts() {
        let s = spans(12, 3);
        assert_eq!(s[0].owned_range(), 0..4);
        assert_eq!(s[1].owned_range(), 1..5);
        assert_eq!(s[2].owned_range(), 1..5);
    }

    #[test]
    fn global_ranges_tile_the_axis() {
        let s = spans(10, 3);
        assert_eq!(s[0].global_range(), 0..3);
        assert_eq!(s[1].global_range(), 3..6);
        assert_eq!(s[2].global_range(), 6..10);
    }

    #[test]
    fn geometry_from_topology() {
        let t = CartTopology::new((2, 2), 3, 4).unwrap();
        let g = LocalGeometry::new((9, 7), &t);
        assert_eq!(g.owned_shape(), (5, 4));
        assert_eq!(g.local_shape(), (6, 5));
        assert_eq!(g.owned_x(), 1..6);
        assert_eq!(g.owned_y(), 1..5);
        assert_eq!(g.global_offset(), (4, 3));

        let serial = LocalGeometry::new((9, 7), &CartTopology::serial());
        assert_eq!(serial.local_shape(), (9, 7));
        assert_eq!(serial.owned_x(), 0..9);
    }
}
