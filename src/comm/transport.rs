//! Point-to-point message passing between ranks
//!
//! Contract for implementations:
//! - `send` is buffered: it never waits for the receiver.
//! - Messages between one (source, destination) pair arrive in send order.
//! - `recv` blocks until the next message from `source` is available.
//!
//! Buffered sends are what make the default `sendrecv` deadlock free: two
//! ranks that exchange in opposite directions both post their send before
//! waiting. A transport whose `send` can block overrides `sendrecv`.

use crate::core::{CommError, Real};

use super::topology::Rank;

/// Message tag. Checked on receipt to catch ranks that fell out of lockstep.
pub type Tag = u16;

pub const TAG_HALO_LEFT: Tag = 1;
pub const TAG_HALO_RIGHT: Tag = 2;
pub const TAG_HALO_DOWN: Tag = 3;
pub const TAG_HALO_UP: Tag = 4;
pub const TAG_GATHER: Tag = 16;

pub trait Transport {
    fn rank(&self) -> Rank;

    fn size(&self) -> usize;

    fn send(&self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), CommError>;

    fn recv(&self, source: Rank, tag: Tag) -> Result<Vec<u8>, CommError>;

    /// Combined send and receive. Either side may be absent (no partner in
    /// that direction); the call is then a plain send, a plain receive, or a
    /// no-op.
    fn sendrecv(
        &self,
        payload: Vec<u8>,
        dest: Option<Rank>,
        source: Option<Rank>,
        tag: Tag,
    ) -> Result<Option<Vec<u8>>, CommError> {
        if let Some(dest) = dest {
            self.send(dest, tag, payload)?;
        }
        match source {
            Some(source) => self.recv(source, tag).map(Some),
            None => Ok(None),
        }
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn rank(&self) -> Rank { (**self).rank() }

    fn size(&self) -> usize { (**self).size() }

    fn send(&self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), CommError> {
        (**self).send(dest, tag, payload)
    }

    fn recv(&self, source: Rank, tag: Tag) -> Result<Vec<u8>, CommError> {
        (**self).recv(source, tag)
    }
}

/// Serialize a slice of reals into a message payload
pub fn encode<T: Real>(values: &[T]) -> Vec<u8> {
    bytemuck::cast_slice(values).to_vec()
}

/// Decode a payload into `out`, which must have exactly the sent length
pub fn decode_into<T: Real>(payload: &[u8], out: &mut [T], source: Rank) -> Result<(), CommError> {
    let dst: &mut [u8] = bytemuck::cast_slice_mut(out);
    if dst.len() != payload.len() {
        return Err(CommError::SizeMismatch {
            source_rank: source,
            expected: dst.len(),
            found: payload.len(),
        });
    }
    dst.copy_from_slice(payload);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_preserves_bits() {
        let values = [1.5f64, -0.25, f64::MIN_POSITIVE, 1e300];
        let payload = encode(&values);
        assert_eq!(payload.len(), 32);

        let mut out = [0.0f64; 4];
        decode_into(&payload, &mut out, 0).unwrap();
        assert_eq!(out, values);
    }

    #[test]
    fn decode_rejects_wrong_length() {
        let payload = encode(&[1.0f32, 2.0]);
        let mut out = [0.0f32; 3];
        let err = decode_into(&payload, &mut out, 7).unwrap_err();
        assert!(matches!(err, CommError::SizeMismatch { source_rank: 7, expected: 12, found: 8 }));
    }
}
