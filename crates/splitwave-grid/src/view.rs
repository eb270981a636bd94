//! Strided, non-copying views into a grid buffer.
//!
//! A [`ViewLayout`] is pure data: origin offset, per-axis strides,
//! extent and the twist applied to vector components. Twisting a view
//! permutes that data; the cells never move.

use splitwave_core::{AxisTwist, FieldVector, Size3};

use crate::buffer::GridBuffer;

/// Address arithmetic of a view: `(origin, strides, extent, components)`.
///
/// Index `i` of the view addresses linear cell
/// `origin + i[0]*strides[0] + i[1]*strides[1] + i[2]*strides[2]`.
/// Indices may be negative or exceed the extent by up to the guard
/// width of the owning buffer; that is how a stencil reaches into the
/// guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewLayout {
    origin: usize,
    strides: [isize; 3],
    extent: Size3,
    components: AxisTwist,
}

impl ViewLayout {
    pub(crate) fn new(origin: usize, strides: [isize; 3], extent: Size3) -> Self {
        Self {
            origin,
            strides,
            extent,
            components: AxisTwist::IDENTITY,
        }
    }

    /// Linear offset of the view's `(0, 0, 0)` cell.
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Per-axis linear strides, in view axis order.
    pub fn strides(&self) -> [isize; 3] {
        self.strides
    }

    /// Extent in view axis order.
    pub fn size(&self) -> Size3 {
        self.extent
    }

    /// Twist mapping view components to stored components.
    pub fn components(&self) -> AxisTwist {
        self.components
    }

    /// Reinterpret the view so that view axis `k` is current axis `t[k]`.
    ///
    /// Extent, strides and vector components are permuted together.
    pub fn twist(&self, t: AxisTwist) -> Self {
        Self {
            origin: self.origin,
            strides: t.apply(self.strides),
            extent: t.apply_size(self.extent),
            components: self.components.then(t),
        }
    }

    /// Linear cell offset of a (possibly out-of-extent) view index.
    ///
    /// # Panics
    ///
    /// Panics if the index addresses memory before the start of the
    /// buffer, which means the guard is narrower than the access.
    pub fn offset(&self, index: [isize; 3]) -> usize {
        let delta: isize = index
            .iter()
            .zip(self.strides.iter())
            .map(|(i, s)| i * s)
            .sum();
        self.origin
            .checked_add_signed(delta)
            .unwrap_or_else(|| panic!("view index {index:?} reaches before buffer start"))
    }

    /// Stored vector to view components.
    pub fn load(&self, stored: FieldVector) -> FieldVector {
        self.components.apply(stored)
    }

    /// View components to stored vector.
    pub fn store(&self, value: FieldVector) -> FieldVector {
        self.components.inverse().apply(value)
    }
}

/// A rectangular window into a [`GridBuffer`].
///
/// Borrowing the buffer ties the view's lifetime to it. Work submitted
/// to a device queue captures the buffer's memory handle and the
/// [`ViewLayout`], which is `'static`.
#[derive(Clone, Copy, Debug)]
pub struct SubView<'a> {
    buffer: &'a GridBuffer,
    layout: ViewLayout,
}

impl<'a> SubView<'a> {
    pub(crate) fn new(buffer: &'a GridBuffer, layout: ViewLayout) -> Self {
        Self { buffer, layout }
    }

    /// Extent of the view.
    pub fn size(&self) -> Size3 {
        self.layout.size()
    }

    /// Address arithmetic of the view.
    pub fn layout(&self) -> ViewLayout {
        self.layout
    }

    /// The owning buffer.
    pub fn buffer(&self) -> &'a GridBuffer {
        self.buffer
    }

    /// Linear offset of the view's minimum corner in the buffer.
    pub fn origin(&self) -> usize {
        self.layout.origin()
    }

    /// The same cells seen along a permuted coordinate frame.
    pub fn twist(&self, t: AxisTwist) -> SubView<'a> {
        Self {
            buffer: self.buffer,
            layout: self.layout.twist(t),
        }
    }

    /// Host read of one cell, in view components.
    ///
    /// Locks the buffer; callers synchronise with outstanding device
    /// work first.
    pub fn read(&self, index: [usize; 3]) -> FieldVector {
        let cells = self.buffer.memory().lock();
        let stored = cells[self.layout.offset(signed(index))];
        self.layout.load(stored)
    }
}

/// Mutable access to a view over locked cells.
///
/// This is what kernels and source injectors run against on a device
/// worker.
pub struct ViewMut<'g> {
    cells: &'g mut [FieldVector],
    layout: ViewLayout,
}

impl<'g> ViewMut<'g> {
    /// Wrap locked cells with a view layout.
    pub fn new(cells: &'g mut [FieldVector], layout: ViewLayout) -> Self {
        Self { cells, layout }
    }

    /// Extent of the view.
    pub fn size(&self) -> Size3 {
        self.layout.size()
    }

    /// Address arithmetic of the view.
    pub fn layout(&self) -> ViewLayout {
        self.layout
    }

    /// Read a cell in view components. Negative indices reach the guard.
    pub fn get(&self, index: [isize; 3]) -> FieldVector {
        self.layout.load(self.cells[self.layout.offset(index)])
    }

    /// Write a cell given in view components.
    pub fn set(&mut self, index: [isize; 3], value: FieldVector) {
        let at = self.layout.offset(index);
        self.cells[at] = self.layout.store(value);
    }
}

pub(crate) fn signed(index: [usize; 3]) -> [isize; 3] {
    [index[0] as isize, index[1] as isize, index[2] as isize]
}
