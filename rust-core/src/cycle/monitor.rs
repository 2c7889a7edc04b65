//! Vibration monitor - runs the analysis cycle on its own thread
//!
//! Owns the whole analysis context: the shared accumulator the sensor path
//! writes into, the cycle itself, and the slot where each completed spectrum
//! is published for telemetry readers.

use super::analysis_cycle::{AnalysisCycle, CycleStats, TickOutcome};
use super::clock::TickClock;
use crate::config::VibrationConfig;
use crate::histogram::HistogramStore;
use crate::sensor::{SampleAccumulator, SampleUpdater};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Analysis task is already running")]
    AlreadyRunning,

    #[error("Failed to spawn analysis thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Analysis thread exited before receiving its cycle")]
    TaskExited,
}

/// Histogram snapshot taken right after a window completed
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFrame {
    /// Completed-window counter, starting at 1
    pub sequence: u64,
    pub histogram: HistogramStore,
}

/// What the analysis thread hands back when it exits
struct TaskExit {
    cycle: AnalysisCycle,
    panicked: bool,
}

/// Clears the running flag however the analysis thread exits
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Analysis task runner
pub struct VibrationMonitor {
    config: VibrationConfig,

    /// Shared with every [`SampleUpdater`]
    accumulator: Arc<SampleAccumulator>,

    /// Cycle state while the task is stopped
    cycle: Option<AnalysisCycle>,

    /// Latest published spectrum
    latest: Arc<Mutex<Option<SpectrumFrame>>>,

    /// Processing thread handle (returns the cycle on exit)
    task: Option<JoinHandle<Option<TaskExit>>>,

    /// Running flag
    running: Arc<AtomicBool>,
}

impl VibrationMonitor {
    pub fn new(config: VibrationConfig) -> Self {
        let accumulator = Arc::new(SampleAccumulator::new());
        let cycle = AnalysisCycle::new(config, Arc::clone(&accumulator));
        Self::from_cycle(cycle)
    }

    /// Wrap a prepared cycle, e.g. one built with a custom analyzer
    pub fn from_cycle(cycle: AnalysisCycle) -> Self {
        Self {
            config: *cycle.config(),
            accumulator: Arc::clone(cycle.accumulator()),
            cycle: Some(cycle),
            latest: Arc::new(Mutex::new(None)),
            task: None,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle for the sensor-update notification path
    pub fn updater(&self) -> SampleUpdater {
        SampleUpdater::new(Arc::clone(&self.accumulator))
    }

    /// Spawn the analysis thread
    ///
    /// A task that already died on its own is reaped first, so a crashed
    /// monitor can be started again.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.task.as_ref().is_some_and(|handle| handle.is_finished()) {
            self.stop();
        }

        let Some(cycle) = self.cycle.take() else {
            return Err(MonitorError::AlreadyRunning);
        };

        self.running.store(true, Ordering::SeqCst);

        let running = Arc::clone(&self.running);
        let latest = Arc::clone(&self.latest);
        let interval = self.config.sample_interval();

        // The cycle only moves to the thread once the spawn has succeeded
        let (cycle_tx, cycle_rx) = mpsc::sync_channel::<AnalysisCycle>(1);

        let spawned = std::thread::Builder::new()
            .name("vibration-analysis".into())
            .spawn(move || {
                let _guard = RunningGuard(Arc::clone(&running));
                let mut cycle = cycle_rx.recv().ok()?;

                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_cycle(&mut cycle, interval, &running, &latest)
                }));

                Some(TaskExit {
                    cycle,
                    panicked: result.is_err(),
                })
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                self.cycle = Some(cycle);
                return Err(MonitorError::Spawn(e));
            }
        };

        if let Err(mpsc::SendError(cycle)) = cycle_tx.send(cycle) {
            self.running.store(false, Ordering::SeqCst);
            if handle.join().is_err() {
                error!("analysis thread panicked before start");
            }
            self.cycle = Some(cycle);
            return Err(MonitorError::TaskExited);
        }

        info!(
            window = self.config.window_size().samples(),
            interval_ms = self.config.sample_interval_ms(),
            "vibration analysis started"
        );
        self.task = Some(handle);
        Ok(())
    }

    /// Stop the analysis thread and take back the cycle state
    ///
    /// Returns at the latest one tick interval after the call. The cycle
    /// stays owned by the monitor so it can be started again.
    pub fn stop(&mut self) -> Option<&AnalysisCycle> {
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.task.take() {
            match handle.join() {
                Ok(Some(TaskExit { cycle, panicked })) => {
                    if panicked {
                        error!(stats = ?cycle.stats(), "analysis cycle panicked, task stopped");
                    } else {
                        info!(stats = ?cycle.stats(), "vibration analysis stopped");
                    }
                    self.cycle = Some(cycle);
                }
                // Only reachable if the cycle was never handed over or the
                // exit path itself panicked
                Ok(None) | Err(_) => {
                    error!("analysis thread lost its cycle, starting from a fresh one");
                    self.cycle = Some(AnalysisCycle::new(self.config, Arc::clone(&self.accumulator)));
                }
            }
        }

        self.cycle.as_ref()
    }

    /// True while the analysis thread is alive and has not been told to stop
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.task.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Most recent completed spectrum, if any window has completed yet
    pub fn latest_frame(&self) -> Option<SpectrumFrame> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Cycle statistics; only available while stopped
    pub fn stats(&self) -> Option<CycleStats> {
        self.cycle.as_ref().map(AnalysisCycle::stats)
    }

    pub fn config(&self) -> &VibrationConfig {
        &self.config
    }
}

impl Drop for VibrationMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Thread body: tick on the fixed-delay clock until told to stop
fn run_cycle(
    cycle: &mut AnalysisCycle,
    interval: Duration,
    running: &AtomicBool,
    latest: &Mutex<Option<SpectrumFrame>>,
) {
    let mut clock = TickClock::new(interval, Instant::now());

    while running.load(Ordering::SeqCst) {
        clock.wait();

        if let TickOutcome::WindowComplete(_) = cycle.tick() {
            let frame = SpectrumFrame {
                sequence: cycle.stats().windows_completed,
                histogram: cycle.histogram().clone(),
            };
            *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;
    use crate::config::WindowSize;
    use crate::sensor::Vector3;
    use crate::spectrum::{FftKernel, SpectralAnalyzer, TransformError};
    use num_complex::Complex;

    /// Kernel that panics on every transform
    struct PanickingKernel;

    impl FftKernel for PanickingKernel {
        fn fft_len(&self) -> usize {
            16
        }

        fn forward(&mut self, _buffer: &mut [Complex<f64>]) -> Result<(), TransformError> {
            panic!("kernel failure");
        }
    }

    fn panicking_monitor() -> VibrationMonitor {
        let config = VibrationConfig::new(16, 1).unwrap();
        let analyzer = SpectralAnalyzer::with_kernel(WindowSize::W16, Box::new(PanickingKernel));
        let cycle = AnalysisCycle::with_analyzer(config, Arc::new(SampleAccumulator::new()), analyzer);
        VibrationMonitor::from_cycle(cycle)
    }

    fn feed_until(monitor: &VibrationMonitor, done: impl Fn(&VibrationMonitor) -> bool) {
        let updater = monitor.updater();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(monitor) && Instant::now() < deadline {
            updater.on_sample(Vector3::new(1.0, 2.0, 3.0));
            std::thread::sleep(Duration::from_micros(200));
        }
    }

    #[test]
    fn test_start_twice_fails() {
        let mut monitor = VibrationMonitor::new(VibrationConfig::new(16, 1).unwrap());
        monitor.start().unwrap();
        assert!(monitor.is_running());
        assert!(matches!(monitor.start(), Err(MonitorError::AlreadyRunning)));

        monitor.stop();
        assert!(!monitor.is_running());
        assert!(monitor.stats().is_some());
    }

    #[test]
    fn test_publishes_frames_while_fed() {
        let mut monitor = VibrationMonitor::new(VibrationConfig::new(16, 1).unwrap());
        let updater = monitor.updater();
        monitor.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while monitor.latest_frame().is_none() && Instant::now() < deadline {
            updater.on_sample(Vector3::new(1.0, 2.0, 3.0));
            std::thread::sleep(Duration::from_micros(200));
        }

        let frame = monitor.latest_frame().expect("no spectrum published");
        assert!(frame.sequence >= 1);
        assert!((frame.histogram.get(Axis::Z, 0).unwrap() - 48.0).abs() < 1e-9);

        let cycle = monitor.stop().unwrap();
        assert!(cycle.stats().windows_completed >= 1);
    }

    #[test]
    fn test_panicked_task_reports_stopped_and_restarts() {
        let mut monitor = panicking_monitor();
        monitor.start().unwrap();

        feed_until(&monitor, |m| !m.is_running());
        assert!(!monitor.is_running());

        // The cycle survives the panic, including the window that triggered it
        let cycle = monitor.stop().expect("cycle lost after panic");
        assert_eq!(cycle.stats().windows_completed, 1);

        monitor.start().unwrap();
        assert!(monitor.is_running());
        monitor.stop();
    }

    #[test]
    fn test_start_reaps_dead_task() {
        let mut monitor = panicking_monitor();
        monitor.start().unwrap();
        feed_until(&monitor, |m| !m.is_running());

        // No stop() in between
        assert!(monitor.start().is_ok());
        monitor.stop();
    }

    #[test]
    fn test_restart_keeps_cycle_state() {
        let config = VibrationConfig::new(16, 1).unwrap();
        let analyzer = SpectralAnalyzer::new(WindowSize::W16, config.backend());
        let cycle = AnalysisCycle::with_analyzer(config, Arc::new(SampleAccumulator::new()), analyzer);
        let mut monitor = VibrationMonitor::from_cycle(cycle);

        monitor.start().unwrap();
        feed_until(&monitor, |m| m.latest_frame().is_some());
        let cycle = monitor.stop().unwrap();
        let before = cycle.stats();
        let histogram = cycle.histogram().clone();
        assert!(before.windows_completed >= 1);

        monitor.start().unwrap();
        let after = monitor.stop().unwrap();
        assert!(after.stats().windows_completed >= before.windows_completed);
        assert!(after.stats().ticks >= before.ticks);
        assert_eq!(after.histogram().get(Axis::Z, 0), histogram.get(Axis::Z, 0));
    }

    #[test]
    fn test_latest_frame_survives_poisoned_slot() {
        let monitor = VibrationMonitor::new(VibrationConfig::new(16, 1).unwrap());
        let frame = SpectrumFrame {
            sequence: 7,
            histogram: HistogramStore::new(WindowSize::W16),
        };
        *monitor.latest.lock().unwrap() = Some(frame.clone());

        let latest = Arc::clone(&monitor.latest);
        let poisoner = std::thread::spawn(move || {
            let _slot = latest.lock().unwrap();
            panic!("poison the slot");
        });
        assert!(poisoner.join().is_err());
        assert!(monitor.latest.is_poisoned());

        assert_eq!(monitor.latest_frame(), Some(frame));
    }
}
