//! Error type shared by configuration, scanning and WAV input.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("window length must be positive")]
    InvalidWindowLength,

    #[error("step length must be positive")]
    InvalidStepLength,

    #[error("invalid f0 range: need 0 < f0_min ({min}) < f0_max ({max})")]
    InvalidFrequencyRange { min: f64, max: f64 },

    #[error("harmonic threshold {0} is outside (0, 1]")]
    InvalidThreshold(f64),

    #[error("sample rate must be positive")]
    InvalidSampleRate,

    #[error("FFT: {0}")]
    Fft(#[from] realfft::FftError),

    #[cfg(feature = "wav")]
    #[error("WAV: {0}")]
    Wav(#[from] hound::Error),

    #[cfg(feature = "wav")]
    #[error("expected a mono recording, found {0} channels")]
    UnsupportedChannels(u16),
}

pub type Result<T> = std::result::Result<T, Error>;
