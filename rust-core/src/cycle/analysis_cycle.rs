//! One analysis step per tick
//!
//! drain average → append per axis → on a completed window, transform each
//! axis and publish its bins. Axes fail independently: a failed axis keeps
//! its previous bins and the other two are still published.

use crate::axis::{Axis, PerAxis};
use crate::config::VibrationConfig;
use crate::histogram::HistogramStore;
use crate::sensor::{SampleAccumulator, SampleUpdater};
use crate::spectrum::{SpectralAnalyzer, TransformError, WindowBuffer};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Counters for everything the cycle reports as a diagnostic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub ticks: u64,
    /// Ticks that found no new samples
    pub idle_ticks: u64,
    /// Averaged samples appended to the windows
    pub samples_buffered: u64,
    pub windows_completed: u64,
    /// Per-axis transform failures
    pub transform_failures: u64,
    /// Histogram writes rejected as out of range
    pub dropped_writes: u64,
}

/// Result of analysing one axis in a completed window
#[derive(Debug, Clone, PartialEq)]
pub enum AxisOutcome {
    Published { bins: usize, dropped: usize },
    Failed(TransformError),
}

impl AxisOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, AxisOutcome::Published { .. })
    }
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing accumulated since the last tick; windows untouched
    NoNewData,
    /// Sample appended, window not yet full
    Buffered { cursor: usize },
    /// Window completed and analysed
    WindowComplete(PerAxis<AxisOutcome>),
}

/// Periodic analysis driver state, owned by the analysis task
pub struct AnalysisCycle {
    config: VibrationConfig,
    accumulator: Arc<SampleAccumulator>,
    windows: PerAxis<WindowBuffer>,
    analyzer: SpectralAnalyzer,
    histogram: HistogramStore,
    stats: CycleStats,
}

impl AnalysisCycle {
    /// Allocate windows, analyzer and histogram for the configuration
    pub fn new(config: VibrationConfig, accumulator: Arc<SampleAccumulator>) -> Self {
        let analyzer = SpectralAnalyzer::new(config.window_size(), config.backend());
        Self::with_analyzer(config, accumulator, analyzer)
    }

    /// Same as [`new`](Self::new) with a caller-supplied analyzer
    pub fn with_analyzer(
        config: VibrationConfig,
        accumulator: Arc<SampleAccumulator>,
        analyzer: SpectralAnalyzer,
    ) -> Self {
        let window_size = config.window_size();
        Self {
            config,
            accumulator,
            windows: PerAxis::from_fn(|_| WindowBuffer::new(window_size)),
            analyzer,
            histogram: HistogramStore::new(window_size),
            stats: CycleStats::default(),
        }
    }

    /// Run one tick
    pub fn tick(&mut self) -> TickOutcome {
        self.stats.ticks += 1;

        let Some(average) = self.accumulator.drain_average() else {
            self.stats.idle_ticks += 1;
            trace!("no new samples, skipping tick");
            return TickOutcome::NoNewData;
        };

        self.stats.samples_buffered += 1;
        let completed = self
            .windows
            .iter_mut()
            .fold(false, |done, (axis, window)| window.append(average[axis]) | done);

        if !completed {
            return TickOutcome::Buffered {
                cursor: self.windows[Axis::X].cursor(),
            };
        }

        self.stats.windows_completed += 1;
        let outcomes = PerAxis::from_fn(|axis| self.analyze_axis(axis));
        debug!(
            window = self.stats.windows_completed,
            x = outcomes[Axis::X].is_published(),
            y = outcomes[Axis::Y].is_published(),
            z = outcomes[Axis::Z].is_published(),
            "window complete"
        );

        TickOutcome::WindowComplete(outcomes)
    }

    fn analyze_axis(&mut self, axis: Axis) -> AxisOutcome {
        let magnitudes = match self.analyzer.transform(&self.windows[axis]) {
            Ok(magnitudes) => magnitudes,
            Err(err) => {
                self.stats.transform_failures += 1;
                warn!(%axis, error = %err, "transform failed, keeping previous bins");
                return AxisOutcome::Failed(err);
            }
        };

        let mut bins = 0;
        let mut dropped = 0;
        for (bin, &value) in magnitudes.iter().enumerate() {
            match self.histogram.publish(axis, bin, value) {
                Ok(()) => bins += 1,
                Err(err) => {
                    dropped += 1;
                    warn!(error = %err, "dropping histogram write");
                }
            }
        }
        self.stats.dropped_writes += dropped as u64;

        AxisOutcome::Published { bins, dropped }
    }

    /// Handle for the sensor-update path feeding this cycle
    pub fn updater(&self) -> SampleUpdater {
        SampleUpdater::new(Arc::clone(&self.accumulator))
    }

    pub fn accumulator(&self) -> &Arc<SampleAccumulator> {
        &self.accumulator
    }

    pub fn config(&self) -> &VibrationConfig {
        &self.config
    }

    pub fn histogram(&self) -> &HistogramStore {
        &self.histogram
    }

    pub fn window(&self, axis: Axis) -> &WindowBuffer {
        &self.windows[axis]
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }
}
