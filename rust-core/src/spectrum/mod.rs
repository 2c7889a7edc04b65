//! Spectral analysis with FFT

pub mod fft;
pub mod window;
pub mod analysis;

pub use fft::{FftKernel, ComplexFftKernel, RealFftKernel, TransformError};
pub use window::WindowBuffer;
pub use analysis::SpectralAnalyzer;
