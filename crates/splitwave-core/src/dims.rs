//! Axes, faces and three-dimensional extents.

use std::fmt;

/// One of the three spatial axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The x axis (index 0).
    X,
    /// The y axis (index 1).
    Y,
    /// The z axis (index 2).
    Z,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Axis for a component index, or `None` if out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
            Self::Z => f.write_str("z"),
        }
    }
}

/// Which end of an axis a face lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// The minimum-coordinate end.
    Low,
    /// The maximum-coordinate end.
    High,
}

impl Side {
    /// Both sides, low first.
    pub const BOTH: [Side; 2] = [Side::Low, Side::High];

    /// The opposite side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// One of the six faces of a rectangular partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Face {
    /// Axis normal to the face.
    pub axis: Axis,
    /// End of the axis the face lies on.
    pub side: Side,
}

impl Face {
    /// Construct a face.
    pub fn new(axis: Axis, side: Side) -> Self {
        Self { axis, side }
    }

    /// The face on the other end of the same axis.
    pub fn opposite(self) -> Self {
        Self::new(self.axis, self.side.opposite())
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Side::Low => write!(f, "-{}", self.axis),
            Side::High => write!(f, "+{}", self.axis),
        }
    }
}

/// A per-axis count of cells (an extent, margin or guard width).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size3(pub [usize; 3]);

impl Size3 {
    /// Construct from the three axis values.
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self([x, y, z])
    }

    /// The same value on every axis.
    pub const fn splat(v: usize) -> Self {
        Self([v, v, v])
    }

    /// Extent along x.
    pub fn x(&self) -> usize {
        self.0[0]
    }

    /// Extent along y.
    pub fn y(&self) -> usize {
        self.0[1]
    }

    /// Extent along z.
    pub fn z(&self) -> usize {
        self.0[2]
    }

    /// Value along `axis`.
    pub fn get(&self, axis: Axis) -> usize {
        self.0[axis.index()]
    }

    /// Total number of cells.
    pub fn product(&self) -> usize {
        self.0.iter().product()
    }

    /// Component-wise sum.
    pub fn add(&self, other: Size3) -> Size3 {
        Size3([
            self.0[0] + other.0[0],
            self.0[1] + other.0[1],
            self.0[2] + other.0[2],
        ])
    }

    /// Component-wise `self * k`.
    pub fn scale(&self, k: usize) -> Size3 {
        Size3([self.0[0] * k, self.0[1] * k, self.0[2] * k])
    }

    /// Whether every component is non-zero.
    pub fn is_positive(&self) -> bool {
        self.0.iter().all(|&v| v > 0)
    }

    /// Row-major (x fastest) linear index of `index` within this extent.
    pub fn linear(&self, index: [usize; 3]) -> usize {
        index[0] + self.0[0] * (index[1] + self.0[1] * index[2])
    }

    /// Iterate every index in the extent, x fastest.
    pub fn indices(&self) -> impl Iterator<Item = [usize; 3]> {
        let [nx, ny, nz] = self.0;
        (0..nz).flat_map(move |z| (0..ny).flat_map(move |y| (0..nx).map(move |x| [x, y, z])))
    }
}

impl fmt::Display for Size3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.0[0], self.0[1], self.0[2])
    }
}

impl From<[usize; 3]> for Size3 {
    fn from(v: [usize; 3]) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_is_x_fastest() {
        let s = Size3::new(4, 3, 2);
        assert_eq!(s.linear([0, 0, 0]), 0);
        assert_eq!(s.linear([1, 0, 0]), 1);
        assert_eq!(s.linear([0, 1, 0]), 4);
        assert_eq!(s.linear([0, 0, 1]), 12);
        assert_eq!(s.linear([3, 2, 1]), 23);
    }

    #[test]
    fn indices_cover_extent_in_linear_order() {
        let s = Size3::new(3, 2, 2);
        let all: Vec<_> = s.indices().collect();
        assert_eq!(all.len(), s.product());
        for (i, idx) in all.iter().enumerate() {
            assert_eq!(s.linear(*idx), i);
        }
    }

    #[test]
    fn face_display_and_opposite() {
        let f = Face::new(Axis::Y, Side::Low);
        assert_eq!(f.to_string(), "-y");
        assert_eq!(f.opposite().to_string(), "+y");
        assert_eq!(f.opposite().opposite(), f);
    }
}
