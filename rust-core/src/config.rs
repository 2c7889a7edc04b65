//! Vibration analysis configuration
//!
//! Read once at startup and immutable afterwards. Window size is validated
//! here so the rest of the crate can size its buffers from a [`WindowSize`]
//! without re-checking.
//!
//! ## Loading order
//!
//! 1. `VIBRATION_CONFIG` environment variable (path to a TOML file)
//! 2. `vibration.toml` in the current working directory
//! 3. Built-in defaults

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "VIBRATION_CONFIG";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "vibration.toml";

/// Default analysis interval in milliseconds
pub const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 10;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported window size {0} (expected 16, 64, 256 or 1024)")]
    InvalidWindowSize(u32),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// FFT window length, restricted to the sizes the analysis supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowSize {
    W16,
    W64,
    W256,
    W1024,
}

impl WindowSize {
    pub const ALL: [WindowSize; 4] = [
        WindowSize::W16,
        WindowSize::W64,
        WindowSize::W256,
        WindowSize::W1024,
    ];

    /// Number of samples per window
    pub const fn samples(self) -> usize {
        match self {
            WindowSize::W16 => 16,
            WindowSize::W64 => 64,
            WindowSize::W256 => 256,
            WindowSize::W1024 => 1024,
        }
    }

    /// Published bins per axis (lower half of the spectrum)
    pub const fn bins_per_axis(self) -> usize {
        self.samples() / 2
    }
}

impl TryFrom<u32> for WindowSize {
    type Error = ConfigError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            16 => Ok(WindowSize::W16),
            64 => Ok(WindowSize::W64),
            256 => Ok(WindowSize::W256),
            1024 => Ok(WindowSize::W1024),
            other => Err(ConfigError::InvalidWindowSize(other)),
        }
    }
}

/// Numeric kernel used for the forward transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FftBackend {
    /// Complex in-place transform (rustfft)
    #[default]
    Complex,
    /// Real-input transform (realfft), mirrored to the full spectrum
    Real,
}

/// On-disk representation, validated into [`VibrationConfig`]
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    window_size: u32,
    sample_interval_ms: i64,
    backend: FftBackend,
}

impl Default for RawConfig {
    fn default() -> Self {
        let defaults = VibrationConfig::default();
        Self {
            window_size: defaults.window_size.samples() as u32,
            sample_interval_ms: i64::from(defaults.sample_interval_ms),
            backend: defaults.backend,
        }
    }
}

/// Validated analysis configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibrationConfig {
    window_size: WindowSize,
    sample_interval_ms: u32,
    backend: FftBackend,
}

impl Default for VibrationConfig {
    fn default() -> Self {
        Self {
            window_size: WindowSize::W64,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            backend: FftBackend::Complex,
        }
    }
}

impl VibrationConfig {
    /// Validate raw settings
    ///
    /// # Arguments
    /// * `window_size` - One of 16, 64, 256, 1024; anything else is fatal
    /// * `sample_interval_ms` - Analysis period; values below 1 are clamped to 1
    pub fn new(window_size: u32, sample_interval_ms: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            window_size: WindowSize::try_from(window_size)?,
            sample_interval_ms: clamp_interval(sample_interval_ms),
            backend: FftBackend::default(),
        })
    }

    /// Same configuration with a different FFT backend
    pub fn with_backend(mut self, backend: FftBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        Ok(Self::new(raw.window_size, raw.sample_interval_ms)?.with_backend(raw.backend))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load using the documented lookup order
    ///
    /// A missing file falls back to defaults; a present but invalid file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(PathBuf::from(path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }

        tracing::debug!("no {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
        Ok(Self::default())
    }

    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    pub fn backend(&self) -> FftBackend {
        self.backend
    }

    /// Analysis period in milliseconds (always >= 1)
    pub fn sample_interval_ms(&self) -> u32 {
        self.sample_interval_ms
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.sample_interval_ms))
    }

    /// Effective sampling rate of the averaged signal in Hz
    pub fn sample_rate_hz(&self) -> f64 {
        1000.0 / f64::from(self.sample_interval_ms)
    }

    pub fn bins_per_axis(&self) -> usize {
        self.window_size.bins_per_axis()
    }

    /// Total histogram length across all three axes
    pub fn histogram_len(&self) -> usize {
        3 * self.bins_per_axis()
    }

    /// Center frequency of a bin in Hz
    ///
    /// The last published bin sits just below Nyquist (`sample_rate / 2`).
    pub fn bin_frequency_hz(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate_hz() / self.window_size.samples() as f64
    }
}

fn clamp_interval(ms: i64) -> u32 {
    ms.clamp(1, i64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_window_sizes() {
        for size in WindowSize::ALL {
            let config = VibrationConfig::new(size.samples() as u32, 5).unwrap();
            assert_eq!(config.window_size(), size);
            assert_eq!(config.histogram_len(), 3 * size.samples() / 2);
        }
    }

    #[test]
    fn test_invalid_window_size_is_rejected() {
        for bad in [0, 8, 32, 100, 512, 2048] {
            let err = VibrationConfig::new(bad, 5).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidWindowSize(v) if v == bad));
        }
    }

    #[test]
    fn test_interval_is_clamped() {
        assert_eq!(VibrationConfig::new(16, 0).unwrap().sample_interval_ms(), 1);
        assert_eq!(VibrationConfig::new(16, -20).unwrap().sample_interval_ms(), 1);
        assert_eq!(VibrationConfig::new(16, 7).unwrap().sample_interval_ms(), 7);

        let zero = VibrationConfig::new(16, 0).unwrap();
        let one = VibrationConfig::new(16, 1).unwrap();
        assert_eq!(zero, one);
        assert_eq!(zero.sample_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_frequency_axis() {
        // 10 ms interval -> 100 Hz sampling, 64-point window
        let config = VibrationConfig::new(64, 10).unwrap();
        assert!((config.sample_rate_hz() - 100.0).abs() < 1e-12);
        assert_eq!(config.bin_frequency_hz(0), 0.0);
        assert!((config.bin_frequency_hz(1) - 100.0 / 64.0).abs() < 1e-12);
        assert!(config.bin_frequency_hz(config.bins_per_axis() - 1) < 50.0);
    }

    #[test]
    fn test_from_toml() {
        let config = VibrationConfig::from_toml_str(
            r#"
            window_size = 256
            sample_interval_ms = 0
            backend = "real"
            "#,
        )
        .unwrap();

        assert_eq!(config.window_size(), WindowSize::W256);
        assert_eq!(config.sample_interval_ms(), 1);
        assert_eq!(config.backend(), FftBackend::Real);
    }

    #[test]
    fn test_toml_defaults_and_errors() {
        let config = VibrationConfig::from_toml_str("").unwrap();
        assert_eq!(config, VibrationConfig::default());

        let err = VibrationConfig::from_toml_str("window_size = 128").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWindowSize(128)));

        let err = VibrationConfig::from_toml_str("window_size = \"big\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibration.toml");
        std::fs::write(&path, "window_size = 16\nsample_interval_ms = 4\n").unwrap();

        let config = VibrationConfig::from_file(&path).unwrap();
        assert_eq!(config.window_size(), WindowSize::W16);
        assert_eq!(config.sample_interval_ms(), 4);

        let missing = VibrationConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
