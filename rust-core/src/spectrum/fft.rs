//! Forward FFT kernels
//!
//! Both kernels compute the unnormalized forward DFT
//! `X[k] = sum_n x[n] * exp(-2πi·k·n/N)`, so a constant input `c` of length
//! `N` yields `|X[0]| = N·c` and zero elsewhere.

use crate::config::{FftBackend, WindowSize};
use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("FFT kernel planned for {kernel} points cannot process a {window}-point window")]
    UnsupportedLength { kernel: usize, window: usize },

    #[error("Buffer length {actual} does not match transform length {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("FFT backend failed: {0}")]
    Backend(String),

    #[error("Non-finite magnitude at bin {bin}")]
    NonFinite { bin: usize },
}

/// External numeric primitive: in-place forward complex transform
pub trait FftKernel: Send {
    /// Transform length this kernel was planned for
    fn fft_len(&self) -> usize;

    /// Replace `buffer` with its forward transform
    fn forward(&mut self, buffer: &mut [Complex<f64>]) -> Result<(), TransformError>;
}

/// Plan a kernel for the configured backend and window size
pub fn plan_kernel(backend: FftBackend, window_size: WindowSize) -> Box<dyn FftKernel> {
    match backend {
        FftBackend::Complex => Box::new(ComplexFftKernel::new(window_size.samples())),
        FftBackend::Real => Box::new(RealFftKernel::new(window_size.samples())),
    }
}

/// Complex in-place FFT (rustfft)
pub struct ComplexFftKernel {
    fft: Arc<dyn Fft<f64>>,
    fft_len: usize,

    /// Reusable scratch space
    scratch: Vec<Complex<f64>>,
}

impl ComplexFftKernel {
    pub fn new(fft_len: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(fft_len);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            fft_len,
            scratch,
        }
    }
}

impl FftKernel for ComplexFftKernel {
    fn fft_len(&self) -> usize {
        self.fft_len
    }

    fn forward(&mut self, buffer: &mut [Complex<f64>]) -> Result<(), TransformError> {
        check_len(self.fft_len, buffer.len())?;
        self.fft.process_with_scratch(buffer, &mut self.scratch);
        Ok(())
    }
}

/// Real-input FFT (realfft)
///
/// Reads only the real parts of the buffer. The upper half of the output is
/// filled in from conjugate symmetry so callers see the full complex spectrum.
pub struct RealFftKernel {
    r2c: Arc<dyn RealToComplex<f64>>,
    fft_len: usize,

    /// Reusable input buffer
    input_buffer: Vec<f64>,

    /// Reusable output buffer (fft_len/2 + 1 bins)
    output_buffer: Vec<Complex<f64>>,

    scratch: Vec<Complex<f64>>,
}

impl RealFftKernel {
    pub fn new(fft_len: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let r2c = planner.plan_fft_forward(fft_len);

        let input_buffer = r2c.make_input_vec();
        let output_buffer = r2c.make_output_vec();
        let scratch = r2c.make_scratch_vec();

        Self {
            r2c,
            fft_len,
            input_buffer,
            output_buffer,
            scratch,
        }
    }
}

impl FftKernel for RealFftKernel {
    fn fft_len(&self) -> usize {
        self.fft_len
    }

    fn forward(&mut self, buffer: &mut [Complex<f64>]) -> Result<(), TransformError> {
        check_len(self.fft_len, buffer.len())?;

        for (dst, src) in self.input_buffer.iter_mut().zip(buffer.iter()) {
            *dst = src.re;
        }

        self.r2c
            .process_with_scratch(&mut self.input_buffer, &mut self.output_buffer, &mut self.scratch)
            .map_err(|e| TransformError::Backend(e.to_string()))?;

        let n = self.fft_len;
        for (k, slot) in buffer.iter_mut().enumerate() {
            *slot = if k <= n / 2 {
                self.output_buffer[k]
            } else {
                self.output_buffer[n - k].conj()
            };
        }

        Ok(())
    }
}

fn check_len(expected: usize, actual: usize) -> Result<(), TransformError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransformError::LengthMismatch { expected, actual })
    }
}
