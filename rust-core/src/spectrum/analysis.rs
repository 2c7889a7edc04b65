//! Magnitude spectrum of a completed window
//!
//! Runs the forward FFT kernel over a copy of one axis's window and keeps the
//! magnitudes of the lower half of the spectrum. For real input the upper
//! half mirrors the lower half about Nyquist, so it is never computed.

use super::fft::{plan_kernel, FftKernel, TransformError};
use super::window::WindowBuffer;
use crate::config::{FftBackend, WindowSize};
use num_complex::Complex;

/// Per-window spectral analyzer, shared by all three axes
pub struct SpectralAnalyzer {
    kernel: Box<dyn FftKernel>,

    window_size: WindowSize,

    /// FFT working buffer, so the window itself is left untouched
    work: Vec<Complex<f64>>,

    /// Output magnitudes for bins 0..window_size/2
    magnitudes: Vec<f64>,
}

impl SpectralAnalyzer {
    /// Create analyzer with a freshly planned kernel
    pub fn new(window_size: WindowSize, backend: FftBackend) -> Self {
        Self::with_kernel(window_size, plan_kernel(backend, window_size))
    }

    /// Create analyzer around an existing kernel
    ///
    /// A kernel planned for a different length is accepted here and reported
    /// per transform as [`TransformError::UnsupportedLength`].
    pub fn with_kernel(window_size: WindowSize, kernel: Box<dyn FftKernel>) -> Self {
        Self {
            kernel,
            window_size,
            work: vec![Complex::new(0.0, 0.0); window_size.samples()],
            magnitudes: vec![0.0; window_size.bins_per_axis()],
        }
    }

    /// Compute the half-spectrum magnitudes of a full window
    ///
    /// # Returns
    /// `|X[k]|` for `k = 0..window_size/2` (unnormalized forward transform).
    /// On error nothing from this call is visible; the previous output is
    /// left as it was.
    pub fn transform(&mut self, window: &WindowBuffer) -> Result<&[f64], TransformError> {
        let n = self.window_size.samples();

        if self.kernel.fft_len() != n {
            return Err(TransformError::UnsupportedLength {
                kernel: self.kernel.fft_len(),
                window: n,
            });
        }
        if window.capacity() != n {
            return Err(TransformError::LengthMismatch {
                expected: n,
                actual: window.capacity(),
            });
        }

        self.work.copy_from_slice(window.samples());
        self.kernel.forward(&mut self.work)?;

        let half = &self.work[..self.window_size.bins_per_axis()];
        if let Some(bin) = half.iter().position(|c| !c.norm().is_finite()) {
            return Err(TransformError::NonFinite { bin });
        }

        for (mag, c) in self.magnitudes.iter_mut().zip(half) {
            *mag = c.norm();
        }

        Ok(&self.magnitudes)
    }

    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    /// Number of magnitude bins produced per transform
    pub fn num_bins(&self) -> usize {
        self.magnitudes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::fft::ComplexFftKernel;
    use std::f64::consts::PI;

    fn filled(size: WindowSize, f: impl Fn(usize) -> f64) -> WindowBuffer {
        let mut window = WindowBuffer::new(size);
        for n in 0..size.samples() {
            window.append(f(n));
        }
        window
    }

    #[test]
    fn test_constant_window() {
        let mut analyzer = SpectralAnalyzer::new(WindowSize::W16, FftBackend::Complex);
        let window = filled(WindowSize::W16, |_| 3.0);

        let spectrum = analyzer.transform(&window).unwrap();
        assert_eq!(spectrum.len(), 8);
        assert!((spectrum[0] - 48.0).abs() < 1e-9);
        assert!(spectrum[1..].iter().all(|&m| m < 1e-9));
    }

    #[test]
    fn test_sine_peak_bin() {
        for backend in [FftBackend::Complex, FftBackend::Real] {
            let mut analyzer = SpectralAnalyzer::new(WindowSize::W64, backend);
            let window = filled(WindowSize::W64, |n| (2.0 * PI * 5.0 * n as f64 / 64.0).cos());

            let spectrum = analyzer.transform(&window).unwrap();
            let peak = spectrum
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
                .map(|(k, _)| k)
                .unwrap();

            assert_eq!(peak, 5, "backend {:?}", backend);
            assert!((spectrum[5] - 32.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_window_is_not_modified() {
        let mut analyzer = SpectralAnalyzer::new(WindowSize::W16, FftBackend::Complex);
        let window = filled(WindowSize::W16, |n| n as f64);
        let before = window.samples().to_vec();

        analyzer.transform(&window).unwrap();
        assert_eq!(window.samples(), &before[..]);
    }

    #[test]
    fn test_kernel_length_mismatch() {
        let kernel = Box::new(ComplexFftKernel::new(32));
        let mut analyzer = SpectralAnalyzer::with_kernel(WindowSize::W16, kernel);
        let window = filled(WindowSize::W16, |_| 1.0);

        let err = analyzer.transform(&window).unwrap_err();
        assert_eq!(err, TransformError::UnsupportedLength { kernel: 32, window: 16 });
    }

    #[test]
    fn test_window_size_mismatch() {
        let mut analyzer = SpectralAnalyzer::new(WindowSize::W16, FftBackend::Complex);
        let window = filled(WindowSize::W64, |_| 1.0);

        let err = analyzer.transform(&window).unwrap_err();
        assert_eq!(err, TransformError::LengthMismatch { expected: 16, actual: 64 });
    }

    #[test]
    fn test_non_finite_input() {
        let mut analyzer = SpectralAnalyzer::new(WindowSize::W16, FftBackend::Complex);
        let good = filled(WindowSize::W16, |_| 1.0);
        analyzer.transform(&good).unwrap();

        let bad = filled(WindowSize::W16, |n| if n == 3 { f64::NAN } else { 1.0 });
        assert!(matches!(
            analyzer.transform(&bad),
            Err(TransformError::NonFinite { .. })
        ));
    }
}
