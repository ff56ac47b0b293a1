//! Decoded mono recordings.

use crate::float::Float;

#[cfg(feature = "wav")]
use crate::error::{Error, Result};
#[cfg(feature = "wav")]
use std::path::Path;

/// A mono recording: samples in any consistent unit plus their sample rate.
/// The analysis only ever borrows `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal<T> {
    pub sample_rate: usize,
    pub data: Vec<T>,
}

impl<T> Signal<T>
where
    T: Float,
{
    pub fn new(data: Vec<T>, sample_rate: usize) -> Self {
        Signal { sample_rate, data }
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        match self.sample_rate {
            0 => 0.0,
            rate => self.data.len() as f64 / rate as f64,
        }
    }
}

#[cfg(feature = "wav")]
impl<T> Signal<T>
where
    T: Float,
{
    /// Read a mono WAV file. Integer samples are scaled into `[-1, 1]`,
    /// float samples are taken as they are.
    pub fn from_wav<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        if spec.channels != 1 {
            return Err(Error::UnsupportedChannels(spec.channels));
        }

        let data = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(|s| T::from_f64_lossy(s as f64)))
                .collect::<std::result::Result<Vec<T>, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample - 1)) as f64;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| T::from_f64_lossy(s as f64 / full_scale)))
                    .collect::<std::result::Result<Vec<T>, _>>()?
            }
        };

        log::debug!(
            "read {} samples at {} Hz ({} bit {:?})",
            data.len(),
            spec.sample_rate,
            spec.bits_per_sample,
            spec.sample_format
        );
        Ok(Signal::new(data, spec.sample_rate as usize))
    }
}
