//! Point-to-point transports carrying halo slabs between partitions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use splitwave_core::{Axis, FieldName, FieldVector, Rank, Side, TransportError};

/// Identifies one halo message.
///
/// Every partition issues exchanges for a field in the same order, so the
/// per-field sequence number lines up across partitions. `travel` is the
/// direction the slab moves along `axis`: a slab sent across the high face
/// travels [`Side::High`] and lands in the receiver's low guard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag {
    /// Field the slab belongs to.
    pub field: FieldName,
    /// Per-field exchange sequence number.
    pub sequence: u64,
    /// Axis normal to the exchanged faces.
    pub axis: Axis,
    /// Direction of travel along `axis`.
    pub travel: Side,
}

/// A message-passing fabric as seen from one partition.
///
/// `probe` is synchronous and must not block; `send` must not block on
/// the receiver; `recv` blocks until the matching message arrives.
/// Messages from one peer with different tags may be received in any
/// order.
pub trait Transport: Send + Sync + 'static {
    /// This partition's rank.
    fn rank(&self) -> Rank;

    /// Check that `peer` is known and reachable.
    fn probe(&self, peer: Rank) -> Result<(), TransportError>;

    /// Post `payload` to `peer` under `tag`.
    fn send(&self, peer: Rank, tag: Tag, payload: Vec<FieldVector>) -> Result<(), TransportError>;

    /// Receive the message from `peer` carrying `tag`.
    fn recv(&self, peer: Rank, tag: &Tag) -> Result<Vec<FieldVector>, TransportError>;
}

struct Envelope {
    from: Rank,
    tag: Tag,
    payload: Vec<FieldVector>,
}

/// Builder for a set of in-process endpoints, one per rank.
pub struct LocalFabric {
    senders: Vec<Sender<Envelope>>,
    receivers: Vec<Receiver<Envelope>>,
    alive: Arc<[AtomicBool]>,
}

impl LocalFabric {
    /// Create a fabric connecting `rank_count` ranks.
    pub fn new(rank_count: usize) -> Self {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..rank_count)
            .map(|_| crossbeam_channel::unbounded())
            .unzip();
        Self {
            senders,
            receivers,
            alive: (0..rank_count).map(|_| AtomicBool::new(true)).collect(),
        }
    }

    /// Number of ranks in the fabric.
    pub fn rank_count(&self) -> usize {
        self.senders.len()
    }

    /// Split the fabric into its endpoints, indexed by rank.
    pub fn into_endpoints(self) -> Vec<LocalEndpoint> {
        let Self {
            senders,
            receivers,
            alive,
        } = self;
        receivers
            .into_iter()
            .enumerate()
            .map(|(r, inbox)| LocalEndpoint {
                rank: Rank(r as u32),
                peers: senders.clone(),
                inbox: Mutex::new(Inbox {
                    receiver: inbox,
                    stash: Vec::new(),
                }),
                alive: Arc::clone(&alive),
            })
            .collect()
    }
}

impl std::fmt::Debug for LocalFabric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFabric")
            .field("rank_count", &self.rank_count())
            .finish()
    }
}

struct Inbox {
    receiver: Receiver<Envelope>,
    stash: Vec<Envelope>,
}

/// One rank's connection to a [`LocalFabric`].
///
/// Messages that arrive before they are asked for are stashed until a
/// matching `recv`. Dropping the endpoint marks its rank unreachable.
pub struct LocalEndpoint {
    rank: Rank,
    peers: Vec<Sender<Envelope>>,
    inbox: Mutex<Inbox>,
    alive: Arc<[AtomicBool]>,
}

impl LocalEndpoint {
    fn peer(&self, peer: Rank) -> Result<&Sender<Envelope>, TransportError> {
        self.peers
            .get(peer.index())
            .ok_or(TransportError::UnknownPeer { peer })
    }
}

impl Transport for LocalEndpoint {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn probe(&self, peer: Rank) -> Result<(), TransportError> {
        self.peer(peer)?;
        if self.alive[peer.index()].load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(TransportError::Disconnected { peer })
        }
    }

    fn send(&self, peer: Rank, tag: Tag, payload: Vec<FieldVector>) -> Result<(), TransportError> {
        let envelope = Envelope {
            from: self.rank,
            tag,
            payload,
        };
        self.peer(peer)?
            .send(envelope)
            .map_err(|_| TransportError::Disconnected { peer })
    }

    fn recv(&self, peer: Rank, tag: &Tag) -> Result<Vec<FieldVector>, TransportError> {
        self.peer(peer)?;
        // The lock is held while blocking so that concurrent receivers
        // never miss a message another receiver pulled off the channel.
        let mut inbox = self.inbox.lock();
        let matches = |e: &Envelope| e.from == peer && e.tag == *tag;
        if let Some(at) = inbox.stash.iter().position(matches) {
            return Ok(inbox.stash.swap_remove(at).payload);
        }
        loop {
            let envelope = inbox
                .receiver
                .recv()
                .map_err(|_| TransportError::Disconnected { peer })?;
            if matches(&envelope) {
                return Ok(envelope.payload);
            }
            inbox.stash.push(envelope);
        }
    }
}

impl Drop for LocalEndpoint {
    fn drop(&mut self) {
        self.alive[self.rank.index()].store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for LocalEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEndpoint")
            .field("rank", &self.rank)
            .field("ranks", &self.peers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitwave_core::FIELD_E;

    fn tag(sequence: u64, travel: Side) -> Tag {
        Tag {
            field: FIELD_E,
            sequence,
            axis: Axis::X,
            travel,
        }
    }

    #[test]
    fn message_reaches_peer() {
        let eps = LocalFabric::new(2).into_endpoints();
        eps[0].send(Rank(1), tag(0, Side::High), vec![[1.0; 3]]).unwrap();
        let got = eps[1].recv(Rank(0), &tag(0, Side::High)).unwrap();
        assert_eq!(got, vec![[1.0; 3]]);
    }

    #[test]
    fn out_of_order_tags_are_matched() {
        let eps = LocalFabric::new(2).into_endpoints();
        eps[0].send(Rank(1), tag(0, Side::Low), vec![[1.0; 3]]).unwrap();
        eps[0].send(Rank(1), tag(0, Side::High), vec![[2.0; 3]]).unwrap();
        assert_eq!(eps[1].recv(Rank(0), &tag(0, Side::High)).unwrap(), vec![[2.0; 3]]);
        assert_eq!(eps[1].recv(Rank(0), &tag(0, Side::Low)).unwrap(), vec![[1.0; 3]]);
    }

    #[test]
    fn rank_can_message_itself() {
        let eps = LocalFabric::new(1).into_endpoints();
        eps[0].send(Rank(0), tag(3, Side::High), vec![[4.0; 3]]).unwrap();
        assert_eq!(eps[0].recv(Rank(0), &tag(3, Side::High)).unwrap(), vec![[4.0; 3]]);
    }

    #[test]
    fn unknown_peer_rejected() {
        let eps = LocalFabric::new(2).into_endpoints();
        assert_eq!(
            eps[0].probe(Rank(5)),
            Err(TransportError::UnknownPeer { peer: Rank(5) })
        );
    }

    #[test]
    fn dropped_endpoint_is_disconnected() {
        let mut eps = LocalFabric::new(2).into_endpoints();
        let gone = eps.pop().unwrap();
        drop(gone);
        assert_eq!(
            eps[0].probe(Rank(1)),
            Err(TransportError::Disconnected { peer: Rank(1) })
        );
        assert_eq!(
            eps[0].send(Rank(1), tag(0, Side::High), Vec::new()),
            Err(TransportError::Disconnected { peer: Rank(1) })
        );
    }
}
