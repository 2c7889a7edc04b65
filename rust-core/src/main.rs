//! Vibration monitor harness
//!
//! Feeds a simulated accelerometer into the analysis core and logs the
//! dominant frequency per axis for every completed window.
//!
//! Usage: `vibration-monitor [seconds]` (config via `VIBRATION_CONFIG` or
//! `vibration.toml`, log level via `RUST_LOG`)

use anyhow::Context;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vibration_spectrum::{Axis, SampleUpdater, Vector3, VibrationConfig, VibrationMonitor};

/// Simulated sensor bus rate
const SENSOR_RATE_HZ: f64 = 1000.0;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let run_for = match std::env::args().nth(1) {
        Some(arg) => Duration::from_secs(arg.parse().context("duration must be whole seconds")?),
        None => Duration::from_secs(10),
    };

    let config = VibrationConfig::load().map_err(|e| {
        error!("invalid configuration, vibration analysis disabled: {e}");
        e
    })?;

    let mut monitor = VibrationMonitor::new(config);
    let running = Arc::new(AtomicBool::new(true));
    let sensor = spawn_sensor(monitor.updater(), &config, Arc::clone(&running))?;

    monitor.start()?;

    let started = Instant::now();
    let mut last_sequence = 0;
    while started.elapsed() < run_for {
        std::thread::sleep(Duration::from_millis(100));

        let Some(frame) = monitor.latest_frame() else { continue };
        if frame.sequence == last_sequence {
            continue;
        }
        last_sequence = frame.sequence;

        for axis in Axis::ALL {
            // Skip the DC bin so gravity does not mask the vibration peak
            let peak = frame
                .histogram
                .axis(axis)
                .iter()
                .copied()
                .enumerate()
                .skip(1)
                .max_by(|(_, a), (_, b)| a.total_cmp(b));

            if let Some((bin, magnitude)) = peak {
                info!(
                    window = frame.sequence,
                    %axis,
                    bin,
                    freq_hz = config.bin_frequency_hz(bin),
                    magnitude,
                    "peak"
                );
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    join_logged(sensor, "simulated sensor");

    if let Some(cycle) = monitor.stop() {
        info!(stats = ?cycle.stats(), "done");
    }

    Ok(())
}

/// Join a worker thread, logging instead of discarding a panic
fn join_logged(handle: std::thread::JoinHandle<()>, name: &str) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(_) => {
            error!(thread = name, "thread panicked");
            false
        }
    }
}

/// Sinusoidal vibration at a different frequency per axis, plus gravity on z
fn spawn_sensor(
    updater: SampleUpdater,
    config: &VibrationConfig,
    running: Arc<AtomicBool>,
) -> anyhow::Result<std::thread::JoinHandle<()>> {
    // Tones at 1/4, 1/2 and 3/4 of the way to Nyquist
    let quarter = config.bins_per_axis() / 4;
    let tones = [1, 2, 3].map(|k| config.bin_frequency_hz(k * quarter));
    let period = Duration::from_secs_f64(1.0 / SENSOR_RATE_HZ);

    std::thread::Builder::new()
        .name("simulated-accels".into())
        .spawn(move || {
            let start = Instant::now();
            while running.load(Ordering::SeqCst) {
                let t = start.elapsed().as_secs_f64();
                let wave = |f: f64| (2.0 * PI * f * t).sin();
                updater.on_sample(Vector3::new(
                    wave(tones[0]),
                    0.5 * wave(tones[1]),
                    9.81 + 0.25 * wave(tones[2]),
                ));
                std::thread::sleep(period);
            }
        })
        .context("failed to spawn simulated sensor")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_logged_reports_panic() {
        let clean = std::thread::spawn(|| {});
        assert!(join_logged(clean, "clean"));

        let crashed = std::thread::spawn(|| panic!("sensor failure"));
        assert!(!join_logged(crashed, "crashed"));
    }
}
