//! Asynchronous guard-cell exchange.
//!
//! One exchange refreshes every guard face of a field that has a
//! neighbour. Axes are handled in order x, y, z; within an axis both
//! slabs are posted before either is received. Slabs span the full buffer
//! on the transverse axes, so guards filled by an earlier axis are
//! forwarded by later ones and edge and corner guards end up consistent.

use std::sync::Arc;

use smallvec::SmallVec;
use splitwave_core::{Axis, ConfigError, Face, Rank, Side, TransportError};
use splitwave_event::{DeviceQueue, Event};
use splitwave_grid::Region;
use tracing::{debug, info};

use crate::field::Field;
use crate::topology::Topology;
use crate::transport::{Tag, Transport};

#[derive(Clone, Copy, Debug)]
struct FacePlan {
    face: Face,
    peer: Rank,
    send: Region,
    guard: Region,
}

/// Keeps guard cells of distributed fields up to date.
///
/// Transfers run on the communication queue, never on the caller's
/// thread.
pub struct HaloExchange {
    topology: Topology,
    transport: Arc<dyn Transport>,
    queue: DeviceQueue,
}

impl HaloExchange {
    /// Bind a partition's topology to its transport endpoint.
    ///
    /// Fails with [`ConfigError::InvalidDecomposition`] if the endpoint
    /// belongs to a different rank.
    pub fn new(
        topology: Topology,
        transport: Arc<dyn Transport>,
        queue: DeviceQueue,
    ) -> Result<Self, ConfigError> {
        if transport.rank() != topology.rank() {
            return Err(ConfigError::InvalidDecomposition {
                reason: format!(
                    "transport endpoint is rank {}, topology expects rank {}",
                    transport.rank(),
                    topology.rank()
                ),
            });
        }
        info!(
            rank = %topology.rank(),
            ranks = topology.decomposition().rank_count(),
            queue = queue.name(),
            "halo exchange ready"
        );
        Ok(Self {
            topology,
            transport,
            queue,
        })
    }

    /// This partition's topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Refresh the guard cells of `field` once `depends_on` completes.
    ///
    /// Returns without blocking. Every neighbour is probed first, so an
    /// unreachable peer fails here rather than inside the transfer. If
    /// no guard face has a neighbour, nothing is submitted and the
    /// returned event is already complete.
    pub fn async_communication(
        &self,
        field: &Arc<Field>,
        depends_on: &Event,
    ) -> Result<Event, TransportError> {
        let sequence = field.next_sequence();
        let layout = *field.buffer().layout();
        let mut plan: SmallVec<[FacePlan; 6]> = SmallVec::new();
        for axis in Axis::ALL {
            for face in Side::BOTH.map(|side| Face::new(axis, side)) {
                let (Some(peer), Some(send), Some(guard)) = (
                    self.topology.neighbor(face),
                    layout.send_region(face),
                    layout.guard_region(face),
                ) else {
                    continue;
                };
                plan.push(FacePlan {
                    face,
                    peer,
                    send,
                    guard,
                });
            }
        }
        if plan.is_empty() {
            return Ok(Event::completed());
        }
        for p in &plan {
            self.transport.probe(p.peer)?;
        }

        debug!(
            field = %field.name(),
            sequence,
            faces = plan.len(),
            "issuing halo exchange"
        );
        let field = Arc::clone(field);
        let transport = Arc::clone(&self.transport);
        Ok(self.queue.submit("halo-exchange", depends_on, move || {
            let tag = |axis: Axis, travel: Side| Tag {
                field: field.name().clone(),
                sequence,
                axis,
                travel,
            };
            for axis in Axis::ALL {
                let faces = plan.iter().filter(|p| p.face.axis == axis);
                for p in faces.clone() {
                    let slab = field.buffer().pack(&p.send);
                    transport.send(p.peer, tag(axis, p.face.side), slab)?;
                }
                for p in faces {
                    let slab = transport.recv(p.peer, &tag(axis, p.face.side.opposite()))?;
                    field.buffer().unpack(&p.guard, &slab)?;
                }
            }
            Ok(())
        }))
    }
}

impl std::fmt::Debug for HaloExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HaloExchange")
            .field("topology", &self.topology)
            .field("queue", &self.queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{Boundary, Decomposition};
    use crate::transport::LocalFabric;
    use splitwave_core::{Size3, FIELD_E};
    use splitwave_grid::GridLayout;

    fn exchange_for(decomposition: Decomposition) -> HaloExchange {
        let endpoint = LocalFabric::new(1).into_endpoints().remove(0);
        HaloExchange::new(
            Topology::new(splitwave_core::Rank(0), decomposition).unwrap(),
            Arc::new(endpoint),
            DeviceQueue::spawn("comm-test").unwrap(),
        )
        .unwrap()
    }

    fn field() -> Arc<Field> {
        let layout = GridLayout::new(Size3::new(4, 3, 1), Size3::new(1, 1, 0)).unwrap();
        Arc::new(Field::new(FIELD_E, layout))
    }

    #[test]
    fn open_single_partition_is_a_no_op() {
        let halo = exchange_for(Decomposition::single());
        let f = field();
        let ev = halo.async_communication(&f, &Event::completed()).unwrap();
        assert!(ev.is_complete());
        assert_eq!(ev.width(), 0);
    }

    #[test]
    fn periodic_single_partition_wraps_onto_itself() {
        let d = Decomposition::new(
            Size3::splat(1),
            [Boundary::Periodic, Boundary::Periodic, Boundary::Open],
        )
        .unwrap();
        let halo = exchange_for(d);
        let f = field();
        f.buffer()
            .fill_interior_with(|[x, y, _]| [x as f32, y as f32, 0.0]);
        halo.async_communication(&f, &Event::completed())
            .unwrap()
            .wait()
            .unwrap();
        let b = f.buffer();
        // Low x guard mirrors interior x = 3 (buffer x = 4).
        assert_eq!(b.read_cell([0, 2, 0]), [3.0, 1.0, 0.0]);
        // High x guard mirrors interior x = 0.
        assert_eq!(b.read_cell([5, 1, 0]), [0.0, 0.0, 0.0]);
        // Corner guard filled through the y pass: interior (3, 2).
        assert_eq!(b.read_cell([0, 0, 0]), [3.0, 2.0, 0.0]);
        assert_eq!(f.exchanges_issued(), 1);
    }

    #[test]
    fn mismatched_rank_rejected() {
        let endpoint = LocalFabric::new(2).into_endpoints().remove(1);
        let err = HaloExchange::new(
            Topology::single(),
            Arc::new(endpoint),
            DeviceQueue::spawn("comm-mismatch").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDecomposition { .. }));
    }
}
