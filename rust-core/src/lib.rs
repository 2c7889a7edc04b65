//! Vibration Spectrum - Accelerometer Vibration Analysis Core
//! 
//! Averages incoming accelerometer samples once per analysis tick, buffers
//! them into fixed-length windows per axis and publishes a magnitude
//! histogram of each completed window.

pub mod axis;
pub mod config;
pub mod sensor;
pub mod spectrum;
pub mod histogram;
pub mod cycle;

pub use axis::{Axis, PerAxis};
pub use config::{ConfigError, FftBackend, VibrationConfig, WindowSize};
pub use sensor::{SampleAccumulator, SampleUpdater, Vector3};
pub use spectrum::{SpectralAnalyzer, TransformError, WindowBuffer};
pub use histogram::{HistogramError, HistogramStore};
pub use cycle::{AnalysisCycle, TickOutcome, VibrationMonitor};
