//! One-dimensional line updates used by the axis sweeps.

use splitwave_core::FieldVector;

/// The numerical update applied to one line of cells along the fast axis.
///
/// Components are given in the sweep's frame: component 0 lies along the
/// line, components 1 and 2 are transverse. Implementations must treat
/// every sweep axis the same way; the dispatcher rotates the frame.
///
/// # Contract
///
/// - `e` and `b` hold `len + 2 * radius()` cells: `radius()` guard cells
///   on each end around the `len` cells being updated.
/// - `e_out` and `b_out` hold `len` cells, pre-initialised with the
///   current values of the updated cells.
/// - Only `e_out` and `b_out` may be written.
pub trait SplitStencil: Send + Sync + 'static {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// How many cells beyond each end of a line the update reads.
    fn radius(&self) -> usize;

    /// Advance one line by one split step.
    fn update_line(
        &self,
        e: &[FieldVector],
        b: &[FieldVector],
        e_out: &mut [FieldVector],
        b_out: &mut [FieldVector],
    );
}

/// Exact characteristic shift for `c * dt == dx`.
///
/// B is stored as `c * B`. Along the sweep axis the pairs
/// `(E1 + B2, B2 - E1)` and `(B1 - E2, B1 + E2)` are Riemann invariants
/// moving one cell per step in opposite directions, so the update is a
/// pure shift of each invariant followed by recombination. The component
/// along the line is untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct CharacteristicStencil;

impl SplitStencil for CharacteristicStencil {
    fn name(&self) -> &str {
        "characteristic"
    }

    fn radius(&self) -> usize {
        1
    }

    fn update_line(
        &self,
        e: &[FieldVector],
        b: &[FieldVector],
        e_out: &mut [FieldVector],
        b_out: &mut [FieldVector],
    ) {
        for i in 0..e_out.len() {
            // Cell i of the output is cell i + 1 of the input.
            let (l, r) = (i, i + 2);
            let a_plus = b[l][2] + e[l][1];
            let a_minus = b[r][2] - e[r][1];
            let c_plus = b[l][1] - e[l][2];
            let c_minus = b[r][1] + e[r][2];

            b_out[i][2] = 0.5 * (a_plus + a_minus);
            e_out[i][1] = 0.5 * (a_plus - a_minus);
            b_out[i][1] = 0.5 * (c_plus + c_minus);
            e_out[i][2] = 0.5 * (c_minus - c_plus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(e: &[FieldVector], b: &[FieldVector]) -> (Vec<FieldVector>, Vec<FieldVector>) {
        let n = e.len() - 2;
        let mut e_out = e[1..=n].to_vec();
        let mut b_out = b[1..=n].to_vec();
        CharacteristicStencil.update_line(e, b, &mut e_out, &mut b_out);
        (e_out, b_out)
    }

    #[test]
    fn right_moving_pulse_shifts_one_cell() {
        // Ey = Bz = 1 at input cell 1 only: a pure right-moving wave.
        let mut e = vec![[0.0f32; 3]; 5];
        let mut b = vec![[0.0f32; 3]; 5];
        e[1][1] = 1.0;
        b[1][2] = 1.0;
        let (e_out, b_out) = run(&e, &b);
        // Output cell 1 is input cell 2, right of the pulse.
        assert_eq!(e_out[1][1], 1.0);
        assert_eq!(b_out[1][2], 1.0);
        assert_eq!(e_out[0][1], 0.0);
        assert_eq!(e_out[2][1], 0.0);
    }

    #[test]
    fn left_moving_pulse_shifts_one_cell() {
        // Ez = By = 1 at input cell 3: By + Ez moves left.
        let mut e = vec![[0.0f32; 3]; 5];
        let mut b = vec![[0.0f32; 3]; 5];
        e[3][2] = 1.0;
        b[3][1] = 1.0;
        let (e_out, b_out) = run(&e, &b);
        assert_eq!(e_out[1][2], 1.0);
        assert_eq!(b_out[1][1], 1.0);
        assert_eq!(e_out[2][2], 0.0);
    }

    #[test]
    fn uniform_fields_are_stationary() {
        let e = vec![[0.3f32, -1.0, 2.0]; 6];
        let b = vec![[7.0f32, 0.5, 0.25]; 6];
        let (e_out, b_out) = run(&e, &b);
        assert!(e_out.iter().all(|v| *v == [0.3, -1.0, 2.0]));
        assert!(b_out.iter().all(|v| *v == [7.0, 0.5, 0.25]));
    }

    #[test]
    fn longitudinal_component_untouched() {
        let mut e = vec![[0.0f32; 3]; 4];
        e[0][0] = 9.0;
        e[2][0] = 5.0;
        let b = vec![[0.0f32; 3]; 4];
        let (e_out, _) = run(&e, &b);
        assert_eq!(e_out[1][0], 5.0);
    }
}
