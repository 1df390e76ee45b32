//! D2Q9 lattice constants
//!
//! Channel numbering: 0 = rest, then E, N, W, S, NE, NW, SW, SE.
//! x grows to the east, y grows to the north (the lid is the northern wall).

pub type ChannelId = usize;

/// Number of channels
pub const Q: usize = 9;

pub const CH_REST: ChannelId = 0;
pub const CH_E: ChannelId = 1;
pub const CH_N: ChannelId = 2;
pub const CH_W: ChannelId = 3;
pub const CH_S: ChannelId = 4;
pub const CH_NE: ChannelId = 5;
pub const CH_NW: ChannelId = 6;
pub const CH_SW: ChannelId = 7;
pub const CH_SE: ChannelId = 8;

/// Channel velocities (cx, cy)
pub const C: [[i32; 2]; Q] = [
    [0, 0],
    [1, 0],
    [0, 1],
    [-1, 0],
    [0, -1],
    [1, 1],
    [-1, 1],
    [-1, -1],
    [1, -1],
];

pub const W_REST: f64 = 4.0 / 9.0;
pub const W_AXIS: f64 = 1.0 / 9.0;
pub const W_DIAG: f64 = 1.0 / 36.0;

/// Channel weights
pub const W: [f64; Q] = [
    W_REST, W_AXIS, W_AXIS, W_AXIS, W_AXIS, W_DIAG, W_DIAG, W_DIAG, W_DIAG,
];

/// Channel pointing the other way (bounce-back partner)
pub const OPPOSITE: [ChannelId; Q] = [
    CH_REST, CH_W, CH_S, CH_E, CH_N, CH_SW, CH_SE, CH_NE, CH_NW,
];

#[inline]
pub fn velocity(i: ChannelId) -> (i32, i32) {
    (C[i][0], C[i][1])
}
