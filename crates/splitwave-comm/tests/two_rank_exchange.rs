//! Halo exchange between two partitions driven from separate threads.

use std::sync::Arc;
use std::thread;

use splitwave_comm::{Boundary, Decomposition, Field, HaloExchange, LocalFabric, Topology, Transport};
use splitwave_core::{Rank, Size3, TransportError, FIELD_E};
use splitwave_event::{DeviceQueue, Event};
use splitwave_grid::GridLayout;

const GLOBAL: Size3 = Size3::new(8, 3, 1);

fn run_rank(
    endpoint: Arc<dyn Transport>,
    decomposition: Decomposition,
) -> Result<Arc<Field>, TransportError> {
    let rank = endpoint.rank();
    let interior = decomposition.local_extent(GLOBAL, rank).unwrap();
    let origin = decomposition.local_origin(GLOBAL, rank).unwrap();
    let layout = GridLayout::new(interior, Size3::new(2, 1, 0)).unwrap();
    let field = Arc::new(Field::new(FIELD_E, layout));
    field
        .buffer()
        .fill_interior_with(|[x, y, _]| [(origin[0] + x) as f32, y as f32, rank.0 as f32]);

    let queue = DeviceQueue::spawn(format!("comm-{}", rank.0)).unwrap();
    let halo = HaloExchange::new(Topology::new(rank, decomposition).unwrap(), endpoint, queue).unwrap();
    halo.async_communication(&field, &Event::completed())?.wait()?;
    Ok(field)
}

#[test]
fn open_boundary_exchanges_only_shared_face() {
    let d = Decomposition::new(Size3::new(2, 1, 1), [Boundary::Open; 3]).unwrap();
    let handles: Vec<_> = LocalFabric::new(2)
        .into_endpoints()
        .into_iter()
        .map(|ep| {
            let ep: Arc<dyn Transport> = Arc::new(ep);
            thread::spawn(move || run_rank(ep, d))
        })
        .collect();
    let fields: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    // Rank 0 owns global x 0..4; its high guard (buffer x 6, 7) mirrors
    // rank 1's first two columns, global x 4 and 5.
    let r0 = fields[0].buffer();
    assert_eq!(r0.read_cell([6, 1, 0]), [4.0, 0.0, 1.0]);
    assert_eq!(r0.read_cell([7, 1, 0]), [5.0, 0.0, 1.0]);
    // Open low face untouched.
    assert_eq!(r0.read_cell([0, 1, 0]), [0.0; 3]);

    // Rank 1's low guard mirrors rank 0's last two columns.
    let r1 = fields[1].buffer();
    assert_eq!(r1.read_cell([0, 2, 0]), [2.0, 1.0, 0.0]);
    assert_eq!(r1.read_cell([1, 2, 0]), [3.0, 1.0, 0.0]);
    assert_eq!(r1.read_cell([7, 2, 0]), [0.0; 3]);
}

#[test]
fn periodic_boundary_wraps_between_ranks() {
    let d = Decomposition::new(
        Size3::new(2, 1, 1),
        [Boundary::Periodic, Boundary::Open, Boundary::Open],
    )
    .unwrap();
    let handles: Vec<_> = LocalFabric::new(2)
        .into_endpoints()
        .into_iter()
        .map(|ep| {
            let ep: Arc<dyn Transport> = Arc::new(ep);
            thread::spawn(move || run_rank(ep, d))
        })
        .collect();
    let fields: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    // Rank 0's low guard wraps to rank 1's last columns, global x 6, 7.
    let r0 = fields[0].buffer();
    assert_eq!(r0.read_cell([0, 1, 0]), [6.0, 0.0, 1.0]);
    assert_eq!(r0.read_cell([1, 1, 0]), [7.0, 0.0, 1.0]);
    // Rank 1's high guard wraps to global x 0, 1.
    let r1 = fields[1].buffer();
    assert_eq!(r1.read_cell([6, 1, 0]), [0.0, 0.0, 0.0]);
    assert_eq!(r1.read_cell([7, 1, 0]), [1.0, 0.0, 0.0]);
}
