//! Partition fixtures and a non-distributed reference update.

use std::sync::Arc;

use splitwave_comm::{Boundary, Decomposition, Field, HaloExchange, LocalFabric, Topology, Transport};
use splitwave_core::{Axis, FieldVector, Rank, Size3, TransportError, FIELD_B, FIELD_E};
use splitwave_event::{DeviceQueue, Transaction};
use splitwave_grid::GridLayout;
use splitwave_solver::{DataConnector, SolverContext};

/// Deterministic, irregular initial values for E and B at `index`.
pub fn sample_fields([x, y, z]: [usize; 3]) -> (FieldVector, FieldVector) {
    let h = |k: usize| ((x * 7 + y * 13 + z * 29 + k * 5) % 17) as f32 * 0.125 - 1.0;
    ([h(0), h(1), h(2)], [h(3), h(4), h(5)])
}

/// Everything one rank needs to run the solver: registry with E and B,
/// compute queue, halo exchange and transaction.
pub struct Partition {
    pub registry: DataConnector,
    pub transaction: Transaction,
    pub queue: DeviceQueue,
    pub halo: HaloExchange,
    pub e: Arc<Field>,
    pub b: Arc<Field>,
}

impl Partition {
    pub fn new(
        interior: Size3,
        guard: Size3,
        topology: Topology,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let layout = GridLayout::new(interior, guard).expect("valid partition layout");
        let registry = DataConnector::new();
        let e = registry
            .register(Field::new(FIELD_E, layout))
            .expect("register E");
        let b = registry
            .register(Field::new(FIELD_B, layout))
            .expect("register B");
        let rank = topology.rank().0;
        let queue = DeviceQueue::spawn(format!("compute-{rank}")).expect("compute queue");
        let comm = DeviceQueue::spawn(format!("comm-{rank}")).expect("comm queue");
        let halo = HaloExchange::new(topology, transport, comm).expect("halo exchange");
        Self {
            registry,
            transaction: Transaction::new(),
            queue,
            halo,
            e,
            b,
        }
    }

    /// A lone partition with the given outer boundaries, wired to a
    /// one-rank [`LocalFabric`].
    pub fn single(interior: Size3, guard: Size3, boundaries: [Boundary; 3]) -> Self {
        let decomposition =
            Decomposition::new(Size3::splat(1), boundaries).expect("single decomposition");
        let topology = Topology::new(Rank(0), decomposition).expect("rank 0");
        let endpoint = LocalFabric::new(1).into_endpoints().remove(0);
        Self::new(interior, guard, topology, Arc::new(endpoint))
    }

    /// Borrow the partition as a solver context.
    pub fn context(&mut self) -> SolverContext<'_> {
        SolverContext {
            registry: &self.registry,
            transaction: &mut self.transaction,
            queue: &self.queue,
            halo: &self.halo,
        }
    }

    /// Initialise the interiors of E and B from local coordinates.
    pub fn fill(&self, mut f: impl FnMut([usize; 3]) -> (FieldVector, FieldVector)) {
        let interior = self.e.buffer().layout().interior();
        let values: Vec<_> = interior.indices().map(&mut f).collect();
        let mut it = values.iter();
        self.e
            .buffer()
            .fill_interior_with(|_| it.next().map(|v| v.0).unwrap_or_default());
        let mut it = values.iter();
        self.b
            .buffer()
            .fill_interior_with(|_| it.next().map(|v| v.1).unwrap_or_default());
    }

    /// Wait for all submitted work.
    pub fn synchronize(&mut self) -> Result<(), TransportError> {
        self.transaction.synchronize()
    }

    /// Interior copies of E and B, x fastest.
    pub fn snapshot(&self) -> (Vec<FieldVector>, Vec<FieldVector>) {
        (
            self.e.buffer().interior_to_vec(),
            self.b.buffer().interior_to_vec(),
        )
    }
}

/// Plain-array split update of a whole, undecomposed grid.
///
/// Cells outside the grid read as zero on open axes and wrap on periodic
/// axes. The arithmetic matches the characteristic stencil operation for
/// operation, so results compare bit-exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceGrid {
    pub extent: Size3,
    pub periodic: [bool; 3],
    pub e: Vec<FieldVector>,
    pub b: Vec<FieldVector>,
}

impl ReferenceGrid {
    pub fn new(extent: Size3, periodic: [bool; 3]) -> Self {
        let n = extent.product();
        Self {
            extent,
            periodic,
            e: vec![[0.0; 3]; n],
            b: vec![[0.0; 3]; n],
        }
    }

    pub fn fill(&mut self, mut f: impl FnMut([usize; 3]) -> (FieldVector, FieldVector)) {
        for index in self.extent.indices() {
            let at = self.extent.linear(index);
            (self.e[at], self.b[at]) = f(index);
        }
    }

    /// Apply one sweep per axis, in the given order.
    pub fn step(&mut self, axes: &[Axis]) {
        for &axis in axes {
            self.sweep(axis);
        }
    }

    fn neighbour(&self, index: [usize; 3], axis: Axis, delta: isize) -> Option<usize> {
        let a = axis.index();
        let n = self.extent.0[a] as isize;
        let mut i = index[a] as isize + delta;
        if i < 0 || i >= n {
            if !self.periodic[a] {
                return None;
            }
            i = i.rem_euclid(n);
        }
        let mut moved = index;
        moved[a] = i as usize;
        Some(self.extent.linear(moved))
    }

    fn sweep(&mut self, axis: Axis) {
        let a = axis.index();
        let (p, q) = ((a + 1) % 3, (a + 2) % 3);
        let (e0, b0) = (self.e.clone(), self.b.clone());
        let at = |i: Option<usize>, v: &[FieldVector]| i.map_or([0.0; 3], |i| v[i]);
        for index in self.extent.indices() {
            let here = self.extent.linear(index);
            let l = self.neighbour(index, axis, -1);
            let r = self.neighbour(index, axis, 1);
            let (el, bl) = (at(l, &e0), at(l, &b0));
            let (er, br) = (at(r, &e0), at(r, &b0));

            let a_plus = bl[q] + el[p];
            let a_minus = br[q] - er[p];
            let c_plus = bl[p] - el[q];
            let c_minus = br[p] + er[q];
            self.b[here][q] = 0.5 * (a_plus + a_minus);
            self.e[here][p] = 0.5 * (a_plus - a_minus);
            self.b[here][p] = 0.5 * (c_plus + c_minus);
            self.e[here][q] = 0.5 * (c_minus - c_plus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn periodic_reference_shifts_right_wave() {
        let mut grid = ReferenceGrid::new(Size3::new(4, 1, 1), [true; 3]);
        grid.fill(|[x, _, _]| {
            let v = x as f32;
            ([0.0, v, 0.0], [0.0, 0.0, v])
        });
        grid.step(&[Axis::X]);
        let ey: Vec<f32> = grid.e.iter().map(|c| c[1]).collect();
        assert_eq!(ey, vec![3.0, 0.0, 1.0, 2.0]);
    }
}
