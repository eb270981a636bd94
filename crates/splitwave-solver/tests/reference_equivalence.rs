//! Integration test: solver output against the plain-array reference.
//!
//! A single partition runs the full state machine (sweeps on the compute
//! queue, guard exchanges on the comm queue) and must agree bit for bit
//! with [`ReferenceGrid`], which applies the same update to a flat array
//! with no guards and no queues.

use std::sync::Arc;

use proptest::prelude::*;
use splitwave_comm::Boundary;
use splitwave_core::Size3;
use splitwave_solver::{CharacteristicStencil, DirSplitting, SolverConfig, SplittingPattern};
use splitwave_test_utils::fixtures::sample_fields;
use splitwave_test_utils::{Partition, ReferenceGrid};

fn boundaries(periodic: [bool; 3]) -> [Boundary; 3] {
    periodic.map(|p| if p { Boundary::Periodic } else { Boundary::Open })
}

fn guard_for(dims: usize) -> Size3 {
    if dims == 2 {
        Size3::new(1, 1, 0)
    } else {
        Size3::splat(1)
    }
}

fn assert_matches_reference(
    extent: Size3,
    dims: usize,
    periodic: [bool; 3],
    pattern: SplittingPattern,
    steps: u32,
) {
    let mut config = SolverConfig::for_cell_width(1.0, dims);
    config.pattern = pattern;
    config.block = Size3::new(3, 2, 2);
    let solver = DirSplitting::new(config, Arc::new(CharacteristicStencil)).unwrap();

    let mut partition = Partition::single(extent, guard_for(dims), boundaries(periodic));
    partition.fill(sample_fields);
    let mut reference = ReferenceGrid::new(extent, periodic);
    reference.fill(sample_fields);

    solver
        .update_after_current(&mut partition.context(), 0)
        .unwrap();
    for step in 0..steps {
        solver
            .update_before_current(&mut partition.context(), step)
            .unwrap();
        reference.step(&pattern.axes(step, dims));
    }
    partition.synchronize().unwrap();

    let (e, b) = partition.snapshot();
    assert_eq!(e, reference.e, "E diverged after {steps} steps");
    assert_eq!(b, reference.b, "B diverged after {steps} steps");
}

// ── Open boundaries ──────────────────────────────────────────────────

#[test]
fn open_3d_sequential() {
    assert_matches_reference(
        Size3::new(7, 5, 4),
        3,
        [false; 3],
        SplittingPattern::Sequential,
        5,
    );
}

#[test]
fn open_3d_symmetric() {
    assert_matches_reference(
        Size3::new(5, 6, 3),
        3,
        [false; 3],
        SplittingPattern::Symmetric,
        4,
    );
}

#[test]
fn open_2d_sequential() {
    assert_matches_reference(
        Size3::new(9, 6, 1),
        2,
        [false; 3],
        SplittingPattern::Sequential,
        6,
    );
}

// ── Periodic boundaries ──────────────────────────────────────────────

#[test]
fn periodic_3d_sequential() {
    assert_matches_reference(
        Size3::new(6, 4, 5),
        3,
        [true; 3],
        SplittingPattern::Sequential,
        7,
    );
}

#[test]
fn periodic_2d_symmetric() {
    assert_matches_reference(
        Size3::new(8, 5, 1),
        2,
        [true, true, false],
        SplittingPattern::Symmetric,
        5,
    );
}

#[test]
fn mixed_boundaries_3d() {
    assert_matches_reference(
        Size3::new(6, 5, 4),
        3,
        [true, false, true],
        SplittingPattern::Sequential,
        4,
    );
}

// ── Property tests ───────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn any_small_grid_matches_reference(
        nx in 2usize..7,
        ny in 2usize..6,
        nz in 2usize..5,
        periodic in any::<[bool; 3]>(),
        symmetric in any::<bool>(),
        steps in 1u32..4,
    ) {
        let pattern = if symmetric {
            SplittingPattern::Symmetric
        } else {
            SplittingPattern::Sequential
        };
        assert_matches_reference(Size3::new(nx, ny, nz), 3, periodic, pattern, steps);
    }
}
