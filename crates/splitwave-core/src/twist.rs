//! Coordinate permutations ("twists") used to reinterpret a grid along
//! a different sweep axis without copying it.
//!
//! A twist `t` maps a three-component value `v` to `w` with
//! `w[i] = v[t[i]]`. The sweep twists are cyclic, so the curl structure
//! of Maxwell's equations is preserved: a kernel written for a sweep
//! along x works unchanged on the twisted y and z views.

use std::fmt;

use crate::dims::{Axis, Size3};

/// A bijection on the axis set {x, y, z}.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AxisTwist([u8; 3]);

impl AxisTwist {
    /// The identity twist: x stays the fast axis.
    pub const IDENTITY: AxisTwist = AxisTwist([0, 1, 2]);

    /// Twist making y the fast axis (`(y, z, x)`).
    pub const SWEEP_Y: AxisTwist = AxisTwist([1, 2, 0]);

    /// Twist making z the fast axis (`(z, x, y)`).
    pub const SWEEP_Z: AxisTwist = AxisTwist([2, 0, 1]);

    /// Build a twist from an explicit permutation.
    ///
    /// Returns `None` unless `perm` is a bijection on `{0, 1, 2}`.
    pub fn new(perm: [u8; 3]) -> Option<Self> {
        let mut seen = [false; 3];
        for &p in &perm {
            let slot = seen.get_mut(p as usize)?;
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(Self(perm))
    }

    /// The twist that makes `axis` the fast (first) axis.
    pub fn for_sweep(axis: Axis) -> Self {
        match axis {
            Axis::X => Self::IDENTITY,
            Axis::Y => Self::SWEEP_Y,
            Axis::Z => Self::SWEEP_Z,
        }
    }

    /// The underlying permutation.
    pub fn permutation(&self) -> [u8; 3] {
        self.0
    }

    /// Source index feeding twisted position `i`.
    pub fn source(&self, i: usize) -> usize {
        self.0[i] as usize
    }

    /// Apply the twist: `out[i] = v[self[i]]`.
    pub fn apply<T: Copy>(&self, v: [T; 3]) -> [T; 3] {
        [v[self.source(0)], v[self.source(1)], v[self.source(2)]]
    }

    /// Apply the twist to an extent.
    pub fn apply_size(&self, s: Size3) -> Size3 {
        Size3(self.apply(s.0))
    }

    /// The inverse twist, so that `t.inverse().apply(t.apply(v)) == v`.
    pub fn inverse(&self) -> Self {
        let mut inv = [0u8; 3];
        for (i, &p) in self.0.iter().enumerate() {
            inv[p as usize] = i as u8;
        }
        Self(inv)
    }

    /// Twist equivalent to applying `self` first and then `outer`.
    pub fn then(&self, outer: AxisTwist) -> Self {
        Self([
            self.0[outer.source(0)],
            self.0[outer.source(1)],
            self.0[outer.source(2)],
        ])
    }

    /// The base axis that became the fast axis under this twist.
    pub fn fast_axis(&self) -> Axis {
        match self.0[0] {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        }
    }
}

impl Default for AxisTwist {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for AxisTwist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{},{},{}>", self.0[0], self.0[1], self.0[2])
    }
}
