//! Published magnitude histogram
//!
//! Holds `3 × window_size/2` bins laid out as three contiguous axis segments,
//! so bin `k` of axis `a` sits at flat offset `k + a·(window_size/2)`. Values
//! are replaced in place; bins that are not rewritten keep their last value.

use crate::axis::Axis;
use crate::config::WindowSize;
use ndarray::{Array2, ArrayView1};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistogramError {
    #[error("Histogram index {offset} ({axis} bin {bin}) outside [0, {capacity})")]
    IndexOutOfRange {
        axis: Axis,
        bin: usize,
        offset: usize,
        capacity: usize,
    },

    #[error("Histogram flat offset {offset} outside [0, {capacity})")]
    OffsetOutOfRange { offset: usize, capacity: usize },
}

/// Fixed-capacity store of magnitude bins addressed by (axis, bin)
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramStore {
    /// Shape (3, bins_per_axis), row-major
    bins: Array2<f64>,
}

impl HistogramStore {
    pub fn new(window_size: WindowSize) -> Self {
        Self {
            bins: Array2::zeros((Axis::ALL.len(), window_size.bins_per_axis())),
        }
    }

    pub fn bins_per_axis(&self) -> usize {
        self.bins.ncols()
    }

    /// Total number of bins across all axes
    pub fn capacity(&self) -> usize {
        self.bins.len()
    }

    /// Flat offset of an (axis, bin) pair, if it lies inside that axis's segment
    pub fn offset(&self, axis: Axis, bin: usize) -> Result<usize, HistogramError> {
        let per_axis = self.bins_per_axis();
        let offset = bin.saturating_add(axis.ordinal() * per_axis);

        // A bin past its segment would land in the next axis
        if bin >= per_axis || offset >= self.capacity() {
            return Err(HistogramError::IndexOutOfRange {
                axis,
                bin,
                offset,
                capacity: self.capacity(),
            });
        }

        Ok(offset)
    }

    /// Write one bin; out-of-range writes are rejected and nothing is touched
    pub fn publish(&mut self, axis: Axis, bin: usize, value: f64) -> Result<(), HistogramError> {
        self.offset(axis, bin)?;
        self.bins[[axis.ordinal(), bin]] = value;
        Ok(())
    }

    /// Write one bin by flat offset
    pub fn publish_flat(&mut self, offset: usize, value: f64) -> Result<(), HistogramError> {
        let capacity = self.capacity();
        if offset >= capacity {
            return Err(HistogramError::OffsetOutOfRange { offset, capacity });
        }

        let per_axis = self.bins_per_axis();
        self.bins[[offset / per_axis, offset % per_axis]] = value;
        Ok(())
    }

    pub fn get(&self, axis: Axis, bin: usize) -> Option<f64> {
        self.bins.get([axis.ordinal(), bin]).copied()
    }

    pub fn get_flat(&self, offset: usize) -> Option<f64> {
        let per_axis = self.bins_per_axis();
        self.bins.get([offset / per_axis, offset % per_axis]).copied()
    }

    /// All bins of one axis
    pub fn axis(&self, axis: Axis) -> ArrayView1<'_, f64> {
        self.bins.row(axis.ordinal())
    }

    /// Bins in flat offset order
    pub fn to_flat_vec(&self) -> Vec<f64> {
        self.bins.iter().copied().collect()
    }

    /// Strongest bin of an axis as (bin, magnitude)
    pub fn peak(&self, axis: Axis) -> Option<(usize, f64)> {
        self.axis(axis)
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
    }
}
