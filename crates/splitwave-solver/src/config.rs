//! Solver configuration and validation.

use smallvec::SmallVec;
use splitwave_core::{Axis, ConfigError, Size3};

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Relative tolerance for the `c * dt == dx` and cubic-cell checks.
const SPLITTING_TOLERANCE: f64 = 1e-9;

const CELL_SIZE_NAMES: [&str; 3] = ["cell_size.x", "cell_size.y", "cell_size.z"];

static AXES: [Axis; 3] = Axis::ALL;

// ── SplittingPattern ───────────────────────────────────────────────

/// Order of the axis sweeps within a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SplittingPattern {
    /// X, Y, Z on every step.
    #[default]
    Sequential,
    /// X, Y, Z on even steps and Z, Y, X on odd steps.
    Symmetric,
}

impl SplittingPattern {
    /// Sweep axes for `step` on a `dims`-dimensional grid.
    ///
    /// A 2-D grid never sweeps Z.
    pub fn axes(self, step: u32, dims: usize) -> SmallVec<[Axis; 3]> {
        let mut axes: SmallVec<[Axis; 3]> = AXES[..dims.min(3)].iter().copied().collect();
        if self == Self::Symmetric && step % 2 == 1 {
            axes.reverse();
        }
        axes
    }
}

// ── InjectionWindow ────────────────────────────────────────────────

/// Time window during which the field source is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InjectionWindow {
    /// Simulated time (s) after which injection stops. Zero or negative
    /// disables injection entirely.
    pub init_time: f64,
}

impl InjectionWindow {
    /// Whether the source is applied on `step`: `init_time > 0` and
    /// `step * dt < init_time`.
    pub fn is_active(&self, step: u32, dt: f64) -> bool {
        self.init_time > 0.0 && f64::from(step) * dt < self.init_time
    }
}

// ── SolverConfig ───────────────────────────────────────────────────

/// Parameters of a [`DirSplitting`](crate::DirSplitting) solver.
///
/// Spacing and time step are in SI units. Directional splitting is only
/// exact for cubic cells with `c * dt` equal to the cell width; that is
/// checked by [`validate`](Self::validate).
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Cell spacing along x, y, z (m). In 2-D the z spacing is unused.
    pub cell_size: [f64; 3],
    /// Time step (s).
    pub dt: f64,
    /// Speed of light (m/s). Default: [`SPEED_OF_LIGHT`].
    pub speed_of_light: f64,
    /// Guard width per axis. Default: 1.
    pub guard: Size3,
    /// Kernel block extents. Each sweep tiles its transverse plane with
    /// the block extents of the two transverse axes. Default: 16x4x4.
    pub block: Size3,
    /// Grid dimensionality, 2 or 3. Default: 3.
    pub dims: usize,
    /// Source injection window. Default: disabled.
    pub injection: InjectionWindow,
    /// Sweep ordering policy. Default: [`SplittingPattern::Sequential`].
    pub pattern: SplittingPattern,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::for_cell_width(1.0e-6, 3)
    }
}

impl SolverConfig {
    /// Cubic cells of width `dx` with the matching time step `dx / c`.
    pub fn for_cell_width(dx: f64, dims: usize) -> Self {
        Self {
            cell_size: [dx; 3],
            dt: dx / SPEED_OF_LIGHT,
            speed_of_light: SPEED_OF_LIGHT,
            guard: Size3::splat(1),
            block: Size3::new(16, 4, 4),
            dims,
            injection: InjectionWindow::default(),
            pattern: SplittingPattern::default(),
        }
    }

    /// Axes swept on this grid.
    pub fn active_axes(&self) -> &'static [Axis] {
        &AXES[..self.dims.min(3)]
    }

    /// Check the configuration for a stencil of neighbourhood `radius`.
    pub fn validate(&self, radius: usize) -> Result<(), ConfigError> {
        // 1. Dimensionality.
        if !(2..=3).contains(&self.dims) {
            return Err(ConfigError::UnsupportedDimension { dims: self.dims });
        }
        let axes = self.active_axes();
        // 2. Finite, positive physical parameters.
        for &axis in axes {
            positive(CELL_SIZE_NAMES[axis.index()], self.cell_size[axis.index()])?;
        }
        positive("dt", self.dt)?;
        positive("speed_of_light", self.speed_of_light)?;
        // 3. Cubic (square in 2-D) cells.
        let dx = self.cell_size[0];
        for &axis in &axes[1..] {
            let spacing = self.cell_size[axis.index()];
            if !within_tolerance(spacing, dx) {
                return Err(ConfigError::NonCubicCells {
                    axis,
                    spacing,
                    cell_width: dx,
                });
            }
        }
        // 4. One cell per step.
        let light_step = self.speed_of_light * self.dt;
        if !within_tolerance(light_step, dx) {
            return Err(ConfigError::UnstableSplitting {
                light_step,
                cell_width: dx,
            });
        }
        // 5. Launch geometry.
        if !self.block.is_positive() {
            return Err(ConfigError::InvalidBlockSize { block: self.block });
        }
        // 6. Guards wide enough for the stencil.
        for &axis in axes {
            let guard = self.guard.get(axis);
            if guard < radius {
                return Err(ConfigError::GuardTooNarrow {
                    axis,
                    guard,
                    radius,
                });
            }
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

fn within_tolerance(value: f64, reference: f64) -> bool {
    (value - reference).abs() <= SPLITTING_TOLERANCE * reference
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SolverConfig::default().validate(1).is_ok());
        assert!(SolverConfig::for_cell_width(1.0, 2).validate(1).is_ok());
    }

    #[test]
    fn light_step_must_match_cell_width() {
        let mut cfg = SolverConfig::for_cell_width(1.0, 3);
        cfg.cell_size = [1.5; 3];
        match cfg.validate(1) {
            Err(ConfigError::UnstableSplitting { cell_width, .. }) => assert_eq!(cell_width, 1.5),
            other => panic!("expected UnstableSplitting, got {other:?}"),
        }
    }

    #[test]
    fn non_cubic_cells_rejected() {
        let mut cfg = SolverConfig::for_cell_width(1.0, 3);
        cfg.cell_size[2] = 2.0;
        match cfg.validate(1) {
            Err(ConfigError::NonCubicCells { axis: Axis::Z, .. }) => {}
            other => panic!("expected NonCubicCells, got {other:?}"),
        }
        // 2-D ignores the z spacing.
        cfg.dims = 2;
        assert!(cfg.validate(1).is_ok());
    }

    #[test]
    fn nan_time_step_rejected() {
        let mut cfg = SolverConfig::default();
        cfg.dt = f64::NAN;
        match cfg.validate(1) {
            Err(ConfigError::InvalidParameter { name: "dt", .. }) => {}
            other => panic!("expected InvalidParameter(dt), got {other:?}"),
        }
    }

    #[test]
    fn guard_narrower_than_radius_rejected() {
        let mut cfg = SolverConfig::default();
        cfg.guard = Size3::new(1, 0, 1);
        match cfg.validate(1) {
            Err(ConfigError::GuardTooNarrow { axis: Axis::Y, .. }) => {}
            other => panic!("expected GuardTooNarrow, got {other:?}"),
        }
    }

    #[test]
    fn zero_block_and_bad_dims_rejected() {
        let mut cfg = SolverConfig::default();
        cfg.block = Size3::new(8, 0, 8);
        assert!(matches!(cfg.validate(1), Err(ConfigError::InvalidBlockSize { .. })));
        let mut cfg = SolverConfig::default();
        cfg.dims = 1;
        assert!(matches!(
            cfg.validate(1),
            Err(ConfigError::UnsupportedDimension { dims: 1 })
        ));
    }

    #[test]
    fn symmetric_pattern_alternates() {
        let p = SplittingPattern::Symmetric;
        assert_eq!(p.axes(0, 3).as_slice(), &[Axis::X, Axis::Y, Axis::Z]);
        assert_eq!(p.axes(1, 3).as_slice(), &[Axis::Z, Axis::Y, Axis::X]);
        assert_eq!(p.axes(1, 2).as_slice(), &[Axis::Y, Axis::X]);
        let s = SplittingPattern::Sequential;
        assert_eq!(s.axes(7, 3).as_slice(), &[Axis::X, Axis::Y, Axis::Z]);
    }

    #[test]
    fn injection_window_bounds() {
        let off = InjectionWindow::default();
        assert!(!off.is_active(0, 1.0));
        let w = InjectionWindow { init_time: 2.5 };
        assert!(w.is_active(0, 1.0));
        assert!(w.is_active(2, 1.0));
        assert!(!w.is_active(3, 1.0));
    }
}
