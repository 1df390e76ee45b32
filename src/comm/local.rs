//! In-process process group: every rank is a thread, every ordered rank pair
//! gets its own unbounded channel.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::core::CommError;

use super::topology::Rank;
use super::transport::{Tag, Transport};

struct Envelope {
    tag: Tag,
    payload: Vec<u8>,
}

/// One rank's view of the group. Owned by exactly one thread.
pub struct LocalEndpoint {
    rank: Rank,
    size: usize,
    // outboxes[dest], inboxes[source]
    outboxes: Vec<Sender<Envelope>>,
    inboxes: Vec<Receiver<Envelope>>,
}

pub struct ThreadGroup;

impl ThreadGroup {
    /// Build `size` connected endpoints, index = rank
    pub fn endpoints(size: usize) -> Vec<LocalEndpoint> {
        let mut senders: Vec<Vec<Option<Sender<Envelope>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        let mut receivers: Vec<Vec<Option<Receiver<Envelope>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();

        for src in 0..size {
            for dst in 0..size {
                let (tx, rx) = unbounded();
                senders[src][dst] = Some(tx);
                receivers[dst][src] = Some(rx);
            }
        }

        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(rank, (outboxes, inboxes))| LocalEndpoint {
                rank,
                size,
                outboxes: outboxes.into_iter().flatten().collect(),
                inboxes: inboxes.into_iter().flatten().collect(),
            })
            .collect()
    }

    /// Group of one, for serial runs
    pub fn single() -> LocalEndpoint {
        let mut endpoints = Self::endpoints(1);
        endpoints.remove(0)
    }
}

impl LocalEndpoint {
    fn check_rank(&self, rank: Rank) -> Result<(), CommError> {
        if rank >= self.size {
            return Err(CommError::NoSuchRank { rank, size: self.size });
        }
        Ok(())
    }
}

impl Transport for LocalEndpoint {
    fn rank(&self) -> Rank { self.rank }

    fn size(&self) -> usize { self.size }

    fn send(&self, dest: Rank, tag: Tag, payload: Vec<u8>) -> Result<(), CommError> {
        self.check_rank(dest)?;
        self.outboxes[dest]
            .send(Envelope { tag, payload })
            .map_err(|_| CommError::PeerDisconnected { rank: dest })
    }

    fn recv(&self, source: Rank, tag: Tag) -> Result<Vec<u8>, CommError> {
        self.check_rank(source)?;
        let envelope = self.inboxes[source]
            .recv()
            .map_err(|_| CommError::PeerDisconnected { rank: source })?;
        if envelope.tag != tag {
            return Err(CommError::TagMismatch {
                source_rank: source,
                expected: tag,
                found: envelope.tag,
            });
        }
        Ok(envelope.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn paired_sendrecv_does_not_deadlock() {
        let endpoints = ThreadGroup::endpoints(2);
        let results: Vec<Vec<u8>> = thread::scope(|s| {
            let handles: Vec<_> = endpoints
                .into_iter()
                .map(|ep| {
                    s.spawn(move || {
                        let other = 1 - ep.rank();
                        ep.sendrecv(vec![ep.rank() as u8; 3], Some(other), Some(other), 9)
                            .unwrap()
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results[0], vec![1, 1, 1]);
        assert_eq!(results[1], vec![0, 0, 0]);
    }

    #[test]
    fn messages_from_one_source_keep_order() {
        let endpoints = ThreadGroup::endpoints(2);
        endpoints[0].send(1, 5, vec![1]).unwrap();
        endpoints[0].send(1, 5, vec![2]).unwrap();
        assert_eq!(endpoints[1].recv(0, 5).unwrap(), vec![1]);
        assert_eq!(endpoints[1].recv(0, 5).unwrap(), vec![2]);
    }

    #[test]
    fn tag_mismatch_is_reported() {
        let endpoints = ThreadGroup::endpoints(2);
        endpoints[1].send(0, 3, vec![]).unwrap();
        let err = endpoints[0].recv(1, 4).unwrap_err();
        assert!(matches!(err, CommError::TagMismatch { source_rank: 1, expected: 4, found: 3 }));
    }

    #[test]
    fn dropped_peer_is_reported() {
        let mut endpoints = ThreadGroup::endpoints(2);
        let survivor = endpoints.remove(0);
        drop(endpoints);
        assert!(matches!(survivor.recv(1, 1), Err(CommError::PeerDisconnected { rank: 1 })));
        assert!(matches!(survivor.send(1, 1, vec![]), Err(CommError::PeerDisconnected { rank: 1 })));
    }

    #[test]
    fn unknown_rank_is_rejected() {
        let ep = ThreadGroup::single();
        assert!(matches!(ep.send(3, 1, vec![]), Err(CommError::NoSuchRank { rank: 3, size: 1 })));
    }
}
