//! Block decomposition of a global grid into partitions.
//!
//! Partitions form a box of `nx * ny * nz` ranks numbered x fastest:
//! `rank = px + nx * (py + ny * pz)`. Each axis has its own outer
//! [`Boundary`]; on a periodic axis the first and last partitions are
//! neighbours, and a single partition is its own neighbour.

use std::fmt;

use splitwave_core::{Axis, ConfigError, Face, Rank, Side, Size3};

/// What lies beyond the outer faces of the global grid along one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// No neighbour: the outer guard is never written by exchanges.
    #[default]
    Open,
    /// The axis wraps around: the last partition neighbours the first.
    Periodic,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Periodic => write!(f, "periodic"),
        }
    }
}

/// Partition counts and outer boundaries per axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decomposition {
    partitions: Size3,
    boundaries: [Boundary; 3],
}

impl Decomposition {
    /// Build a decomposition.
    ///
    /// Fails with [`ConfigError::InvalidDecomposition`] if any axis has
    /// zero partitions or the rank count does not fit in a [`Rank`].
    pub fn new(partitions: Size3, boundaries: [Boundary; 3]) -> Result<Self, ConfigError> {
        if !partitions.is_positive() {
            return Err(ConfigError::InvalidDecomposition {
                reason: format!("partition grid {partitions} has an empty axis"),
            });
        }
        if u32::try_from(partitions.product()).is_err() {
            return Err(ConfigError::InvalidDecomposition {
                reason: format!("partition grid {partitions} has too many ranks"),
            });
        }
        Ok(Self {
            partitions,
            boundaries,
        })
    }

    /// A single open partition.
    pub fn single() -> Self {
        Self {
            partitions: Size3::splat(1),
            boundaries: [Boundary::Open; 3],
        }
    }

    /// Partitions per axis.
    pub fn partitions(&self) -> Size3 {
        self.partitions
    }

    /// Outer boundary along `axis`.
    pub fn boundary(&self, axis: Axis) -> Boundary {
        self.boundaries[axis.index()]
    }

    /// Total number of partitions.
    pub fn rank_count(&self) -> usize {
        self.partitions.product()
    }

    /// Partition coordinates of `rank`, or `None` if out of range.
    pub fn coords_of(&self, rank: Rank) -> Option<[usize; 3]> {
        let r = rank.index();
        if r >= self.rank_count() {
            return None;
        }
        let [nx, ny, _] = self.partitions.0;
        Some([r % nx, (r / nx) % ny, r / (nx * ny)])
    }

    /// Rank at partition coordinates `coords`.
    ///
    /// Coordinates must lie inside the partition grid.
    pub fn rank_of(&self, coords: [usize; 3]) -> Rank {
        debug_assert!((0..3).all(|a| coords[a] < self.partitions.0[a]));
        Rank(self.partitions.linear(coords) as u32)
    }

    /// The partition across `face` of `rank`.
    ///
    /// `None` on an open outer face or for an out-of-range rank.
    pub fn neighbor(&self, rank: Rank, face: Face) -> Option<Rank> {
        let mut coords = self.coords_of(rank)?;
        let a = face.axis.index();
        let n = self.partitions.0[a];
        let periodic = self.boundaries[a] == Boundary::Periodic;
        coords[a] = match face.side {
            Side::Low if coords[a] > 0 => coords[a] - 1,
            Side::Low if periodic => n - 1,
            Side::High if coords[a] + 1 < n => coords[a] + 1,
            Side::High if periodic => 0,
            _ => return None,
        };
        Some(self.rank_of(coords))
    }

    /// Check that `global` can be split: every axis needs at least one
    /// cell per partition.
    pub fn validate_against(&self, global: Size3) -> Result<(), ConfigError> {
        for axis in Axis::ALL {
            if global.get(axis) < self.partitions.get(axis) {
                return Err(ConfigError::InvalidDecomposition {
                    reason: format!(
                        "cannot split {} cells along {axis} across {} partitions",
                        global.get(axis),
                        self.partitions.get(axis)
                    ),
                });
            }
        }
        Ok(())
    }

    /// Interior extent owned by `rank` when splitting `global`.
    ///
    /// Remainder cells go to the lowest partitions on each axis.
    pub fn local_extent(&self, global: Size3, rank: Rank) -> Result<Size3, ConfigError> {
        self.validate_against(global)?;
        let coords = self.checked_coords(rank)?;
        let mut extent = [0usize; 3];
        for a in 0..3 {
            let (n, p) = (global.0[a], self.partitions.0[a]);
            extent[a] = n / p + usize::from(coords[a] < n % p);
        }
        Ok(Size3(extent))
    }

    /// Global coordinates of the first interior cell owned by `rank`.
    pub fn local_origin(&self, global: Size3, rank: Rank) -> Result<[usize; 3], ConfigError> {
        self.validate_against(global)?;
        let coords = self.checked_coords(rank)?;
        let mut origin = [0usize; 3];
        for a in 0..3 {
            let (n, p, c) = (global.0[a], self.partitions.0[a], coords[a]);
            origin[a] = c * (n / p) + c.min(n % p);
        }
        Ok(origin)
    }

    fn checked_coords(&self, rank: Rank) -> Result<[usize; 3], ConfigError> {
        self.coords_of(rank)
            .ok_or_else(|| ConfigError::InvalidDecomposition {
                reason: format!("rank {rank} outside {} partitions", self.rank_count()),
            })
    }
}

impl Default for Decomposition {
    fn default() -> Self {
        Self::single()
    }
}

/// One partition's place in a [`Decomposition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Topology {
    rank: Rank,
    decomposition: Decomposition,
}

impl Topology {
    /// Place `rank` in `decomposition`.
    pub fn new(rank: Rank, decomposition: Decomposition) -> Result<Self, ConfigError> {
        decomposition.checked_coords(rank)?;
        Ok(Self {
            rank,
            decomposition,
        })
    }

    /// The single-partition topology.
    pub fn single() -> Self {
        Self {
            rank: Rank(0),
            decomposition: Decomposition::single(),
        }
    }

    /// This partition's rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// The decomposition this partition belongs to.
    pub fn decomposition(&self) -> &Decomposition {
        &self.decomposition
    }

    /// Neighbour across `face`, if any.
    pub fn neighbor(&self, face: Face) -> Option<Rank> {
        self.decomposition.neighbor(self.rank, face)
    }
}
