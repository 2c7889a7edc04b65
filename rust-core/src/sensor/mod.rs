//! Sensor-side ingestion: sample vectors and the shared accumulator

pub mod vector;
pub mod accumulator;

pub use vector::Vector3;
pub use accumulator::{SampleAccumulator, SampleBatch, SampleUpdater};
