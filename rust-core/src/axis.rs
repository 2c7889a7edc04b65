//! Physical accelerometer axes and per-axis storage

use std::fmt;
use std::ops::{Index, IndexMut};

/// Accelerometer axis. The ordinal fixes the histogram segment order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in histogram order
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Segment ordinal: X=0, Y=1, Z=2
    pub const fn ordinal(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Exactly one value per axis, addressed by [`Axis`] instead of a raw index
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PerAxis<T>([T; 3]);

impl<T> PerAxis<T> {
    pub fn new(x: T, y: T, z: T) -> Self {
        Self([x, y, z])
    }

    /// Build each slot from its axis
    pub fn from_fn(mut f: impl FnMut(Axis) -> T) -> Self {
        Self(Axis::ALL.map(&mut f))
    }

    /// Transform each slot, keeping the axis association
    pub fn map<U>(self, mut f: impl FnMut(Axis, T) -> U) -> PerAxis<U> {
        let [x, y, z] = self.0;
        PerAxis([f(Axis::X, x), f(Axis::Y, y), f(Axis::Z, z)])
    }

    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> {
        Axis::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Axis, &mut T)> {
        Axis::ALL.into_iter().zip(self.0.iter_mut())
    }
}

impl<T> Index<Axis> for PerAxis<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        &self.0[axis.ordinal()]
    }
}

impl<T> IndexMut<Axis> for PerAxis<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        &mut self.0[axis.ordinal()]
    }
}
