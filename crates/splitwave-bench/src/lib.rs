//! Benchmark profiles and utilities for the splitwave solver.
//!
//! Provides pre-built [`Profile`]s for benchmarks and examples:
//!
//! - [`reference_profile`]: 32x32x32 periodic cube (32K cells)
//! - [`stress_profile`]: 64x64x64 periodic cube (~262K cells)
//! - [`sheet_profile`]: 256x256 2-D sheet with open edges
//! - [`gaussian_pulse`]: a right-moving pulse to initialise E and B
//! - [`field_energy`]: total field energy for sanity checks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use splitwave_comm::Boundary;
use splitwave_core::{FieldVector, Size3};
use splitwave_solver::{SolverConfig, SplittingPattern};

/// Grid extent, boundaries and solver configuration for one benchmark.
#[derive(Clone, Debug)]
pub struct Profile {
    pub name: &'static str,
    pub extent: Size3,
    pub guard: Size3,
    pub boundaries: [Boundary; 3],
    pub config: SolverConfig,
}

/// 32x32x32 periodic cube, symmetric splitting.
pub fn reference_profile() -> Profile {
    cube("reference_32", 32)
}

/// 64x64x64 periodic cube, symmetric splitting.
pub fn stress_profile() -> Profile {
    cube("stress_64", 64)
}

/// 256x256 open 2-D sheet, sequential splitting.
pub fn sheet_profile() -> Profile {
    Profile {
        name: "sheet_256",
        extent: Size3::new(256, 256, 1),
        guard: Size3::new(1, 1, 0),
        boundaries: [Boundary::Open; 3],
        config: SolverConfig::for_cell_width(1.0e-6, 2),
    }
}

fn cube(name: &'static str, n: usize) -> Profile {
    let mut config = SolverConfig::for_cell_width(1.0e-6, 3);
    config.pattern = SplittingPattern::Symmetric;
    Profile {
        name,
        extent: Size3::splat(n),
        guard: Size3::splat(1),
        boundaries: [Boundary::Periodic; 3],
        config,
    }
}

/// A Gaussian pulse in Ey = c·Bz centred on the x midplane, travelling
/// toward +x.
pub fn gaussian_pulse(extent: Size3, width: f32) -> impl Fn([usize; 3]) -> (FieldVector, FieldVector) {
    let centre = extent.x() as f32 / 2.0;
    move |[x, _, _]| {
        let d = (x as f32 - centre) / width;
        let v = (-d * d).exp();
        ([0.0, v, 0.0], [0.0, 0.0, v])
    }
}

/// `0.5 * Σ (|E|² + |cB|²)` over the given cells.
pub fn field_energy(e: &[FieldVector], b: &[FieldVector]) -> f64 {
    let sq = |v: &FieldVector| v.iter().map(|c| f64::from(*c) * f64::from(*c)).sum::<f64>();
    0.5 * (e.iter().map(sq).sum::<f64>() + b.iter().map(sq).sum::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        for p in [reference_profile(), stress_profile(), sheet_profile()] {
            assert!(p.config.validate(1).is_ok(), "{} invalid", p.name);
        }
    }

    #[test]
    fn pulse_peaks_at_centre() {
        let f = gaussian_pulse(Size3::new(8, 1, 1), 1.0);
        assert_eq!(f([4, 0, 0]).0, [0.0, 1.0, 0.0]);
        assert!(f([0, 0, 0]).0[1] < 1.0e-6);
    }

    #[test]
    fn energy_counts_both_fields() {
        let e = [[1.0, 0.0, 0.0], [0.0, 2.0, 0.0]];
        let b = [[0.0, 0.0, 2.0], [0.0; 3]];
        assert_eq!(field_energy(&e, &b), 0.5 * (1.0 + 4.0 + 4.0));
    }
}
