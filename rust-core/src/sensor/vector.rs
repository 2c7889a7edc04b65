//! Three-axis sensor vector

use crate::axis::Axis;
use std::ops::{Add, AddAssign, Div, Index};

/// One accelerometer reading in sensor units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl Index<Axis> for Vector3 {
    type Output = f64;

    fn index(&self, axis: Axis) -> &f64 {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Vector3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Div<f64> for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let mut v = Vector3::new(1.0, 2.0, 3.0);
        v += Vector3::from([3.0, 2.0, 1.0]);
        assert_eq!(v, Vector3::new(4.0, 4.0, 4.0));
        assert_eq!(v / 2.0, Vector3::new(2.0, 2.0, 2.0));
        assert_eq!(v + Vector3::ZERO, v);
    }

    #[test]
    fn test_axis_index() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::ALL.map(|a| v[a]), [1.0, 2.0, 3.0]);
        assert!(!Vector3::new(f64::NAN, 0.0, 0.0).is_finite());
    }
}
