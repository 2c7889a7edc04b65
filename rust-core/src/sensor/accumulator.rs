//! Running sum of sensor samples shared between the sensor callback and the
//! analysis task
//!
//! The sum and the count live behind a single mutex, so a drain observes and
//! resets both as one unit. The critical section on either side is a handful
//! of additions; the division for the average happens after the guard drops.

use super::vector::Vector3;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Samples collected since the last drain
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SampleBatch {
    pub sum: Vector3,
    pub count: u64,
}

impl SampleBatch {
    /// Component-wise mean, or `None` for an empty batch
    pub fn average(&self) -> Option<Vector3> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Thread-safe sample accumulator
#[derive(Debug, Default)]
pub struct SampleAccumulator {
    state: Mutex<SampleBatch>,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample to the running sum
    ///
    /// Waits only for a concurrent drain's O(1) reset, never drops the sample.
    pub fn accumulate(&self, sample: Vector3) {
        let mut state = self.lock();
        state.sum += sample;
        state.count += 1;
    }

    /// Take everything accumulated so far and reset to empty
    pub fn drain(&self) -> SampleBatch {
        std::mem::take(&mut *self.lock())
    }

    /// Mean of the samples since the last drain, resetting the accumulator
    ///
    /// # Returns
    /// `None` when no sample arrived since the previous drain
    pub fn drain_average(&self) -> Option<Vector3> {
        self.drain().average()
    }

    /// Number of samples waiting to be drained
    pub fn pending(&self) -> u64 {
        self.lock().count
    }

    // Every mutation finishes inside one guard, so the data is consistent
    // even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, SampleBatch> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle given to the sensor-update notification path
#[derive(Debug, Clone)]
pub struct SampleUpdater {
    accumulator: Arc<SampleAccumulator>,
}

impl SampleUpdater {
    pub fn new(accumulator: Arc<SampleAccumulator>) -> Self {
        Self { accumulator }
    }

    /// Sensor-update callback entry point
    #[inline]
    pub fn on_sample(&self, sample: Vector3) {
        self.accumulator.accumulate(sample);
    }
}
