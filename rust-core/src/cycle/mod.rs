//! Periodic analysis driver and its task runner

pub mod analysis_cycle;
pub mod clock;
pub mod monitor;

pub use analysis_cycle::{AnalysisCycle, AxisOutcome, CycleStats, TickOutcome};
pub use clock::TickClock;
pub use monitor::{MonitorError, SpectrumFrame, VibrationMonitor};
