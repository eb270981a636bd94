//! Integration test: sweep order, line coverage and state sequence.

use std::sync::Arc;

use splitwave_comm::Boundary;
use splitwave_core::{Axis, Size3};
use splitwave_solver::{
    DirSplitting, InjectionWindow, PlaneSource, SolverConfig, SolverState, SplittingPattern,
};
use splitwave_test_utils::{Partition, RecordingStencil};

fn recording_solver(dims: usize, pattern: SplittingPattern) -> (DirSplitting, Arc<RecordingStencil>) {
    let mut config = SolverConfig::for_cell_width(1.0, dims);
    config.pattern = pattern;
    config.block = Size3::new(2, 2, 4);
    let stencil = Arc::new(RecordingStencil::new());
    let solver = DirSplitting::new(config, stencil.clone()).unwrap();
    (solver, stencil)
}

#[test]
fn sequential_sweeps_cover_every_line_once() {
    let (solver, stencil) = recording_solver(3, SplittingPattern::Sequential);
    let mut partition = Partition::single(Size3::new(4, 5, 6), Size3::splat(1), [Boundary::Open; 3]);

    let report = solver
        .update_before_current(&mut partition.context(), 0)
        .unwrap();
    partition.synchronize().unwrap();

    assert_eq!(report.sweep_axes().as_slice(), &Axis::ALL);
    // X lines have length 4 and there are 5 * 6 of them, and so on.
    assert_eq!(stencil.runs(), vec![(4, 30), (5, 24), (6, 20)]);
}

#[test]
fn symmetric_pattern_reverses_odd_steps() {
    let (solver, stencil) = recording_solver(3, SplittingPattern::Symmetric);
    let mut partition = Partition::single(Size3::new(4, 5, 6), Size3::splat(1), [Boundary::Open; 3]);

    let even = solver
        .update_before_current(&mut partition.context(), 0)
        .unwrap();
    let odd = solver
        .update_before_current(&mut partition.context(), 1)
        .unwrap();
    partition.synchronize().unwrap();

    assert_eq!(even.sweep_axes().as_slice(), &[Axis::X, Axis::Y, Axis::Z]);
    assert_eq!(odd.sweep_axes().as_slice(), &[Axis::Z, Axis::Y, Axis::X]);
    assert_eq!(
        stencil.runs(),
        vec![(4, 30), (5, 24), (6, 20), (6, 20), (5, 24), (4, 30)]
    );
}

#[test]
fn two_dimensional_grid_skips_z() {
    let (solver, stencil) = recording_solver(2, SplittingPattern::Sequential);
    let mut partition =
        Partition::single(Size3::new(4, 5, 1), Size3::new(1, 1, 0), [Boundary::Open; 3]);

    let report = solver
        .update_before_current(&mut partition.context(), 0)
        .unwrap();
    partition.synchronize().unwrap();

    assert_eq!(report.sweep_axes().as_slice(), &[Axis::X, Axis::Y]);
    assert_eq!(stencil.runs(), vec![(4, 5), (5, 4)]);
}

#[test]
fn state_sequence_without_source() {
    let (solver, _) = recording_solver(3, SplittingPattern::Sequential);
    let mut partition = Partition::single(Size3::splat(3), Size3::splat(1), [Boundary::Open; 3]);

    let report = solver
        .update_before_current(&mut partition.context(), 4)
        .unwrap();
    partition.synchronize().unwrap();

    assert_eq!(report.step, 4);
    assert_eq!(
        report.states.as_slice(),
        &[
            SolverState::Sweep(Axis::X),
            SolverState::Exchange(Axis::X),
            SolverState::Sweep(Axis::Y),
            SolverState::Exchange(Axis::Y),
            SolverState::Sweep(Axis::Z),
            SolverState::Exchange(Axis::Z),
            SolverState::Idle,
        ]
    );
    assert!(!report.injected());
}

#[test]
fn source_runs_between_last_sweep_and_its_exchange() {
    let mut config = SolverConfig::for_cell_width(1.0, 3);
    config.injection = InjectionWindow {
        init_time: 10.0 * config.dt,
    };
    let solver = DirSplitting::new(config, Arc::new(RecordingStencil::new()))
        .unwrap()
        .with_source(Arc::new(PlaneSource {
            normal: Axis::X,
            index: 0,
            polarization: [0.0, 1.0, 0.0],
            amplitude: 1.0,
            period: 8.0,
        }));
    let mut partition = Partition::single(Size3::splat(3), Size3::splat(1), [Boundary::Open; 3]);

    let report = solver
        .update_before_current(&mut partition.context(), 1)
        .unwrap();
    partition.synchronize().unwrap();

    assert!(report.injected());
    assert_eq!(
        &report.states[4..],
        &[
            SolverState::Sweep(Axis::Z),
            SolverState::Source,
            SolverState::Exchange(Axis::Z),
            SolverState::Idle,
        ]
    );
}

#[test]
fn each_step_issues_one_exchange_per_field_and_axis() {
    let (solver, _) = recording_solver(3, SplittingPattern::Sequential);
    let mut partition = Partition::single(Size3::splat(3), Size3::splat(1), [Boundary::Periodic; 3]);

    solver
        .update_after_current(&mut partition.context(), 0)
        .unwrap();
    for step in 0..2 {
        solver
            .update_before_current(&mut partition.context(), step)
            .unwrap();
    }
    partition.synchronize().unwrap();

    // One priming exchange plus three per step.
    assert_eq!(partition.e.exchanges_issued(), 7);
    assert_eq!(partition.b.exchanges_issued(), 7);
}
