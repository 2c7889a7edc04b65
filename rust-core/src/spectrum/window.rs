//! Per-axis circular window of complex samples
//!
//! Sized once from the configured window length. The write cursor wraps
//! modulo that length and the wrap back to zero is what marks a window as
//! complete.

use crate::config::WindowSize;
use num_complex::Complex;

/// Fixed-capacity circular buffer for one axis
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    /// Complex samples; imaginary parts stay 0
    samples: Vec<Complex<f64>>,

    /// Next write position, always < samples.len()
    cursor: usize,
}

impl WindowBuffer {
    pub fn new(window_size: WindowSize) -> Self {
        Self {
            samples: vec![Complex::new(0.0, 0.0); window_size.samples()],
            cursor: 0,
        }
    }

    /// Write one real sample at the cursor and advance
    ///
    /// # Returns
    /// `true` iff the cursor wrapped to 0, i.e. the window is now full
    pub fn append(&mut self, value: f64) -> bool {
        self.samples[self.cursor] = Complex::new(value, 0.0);
        self.cursor = (self.cursor + 1) % self.samples.len();
        self.cursor == 0
    }

    /// Current write position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Window length (fixed at construction)
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Samples in time order of the current window
    ///
    /// Only meaningful as a complete window right after `append` returned `true`.
    pub fn samples(&self) -> &[Complex<f64>] {
        &self.samples
    }
}
