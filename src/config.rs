//! Frame scanning parameters.

use crate::error::{Error, Result};

/// Parameters of one YIN scan. Passed explicitly to [scan][crate::tracker::scan];
/// nothing is read from process-wide state.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct YinConfig {
    /// Analysis window size in samples.
    pub window_length: usize,
    /// Hop between consecutive window starts in samples.
    pub step_length: usize,
    /// Lowest detectable fundamental in Hz. Sets the largest lag searched.
    pub f0_min: f64,
    /// Highest detectable fundamental in Hz. Sets the smallest lag searched.
    pub f0_max: f64,
    /// A lag is a pitch candidate once its CMND value drops below this.
    pub harmonic_threshold: f64,
    /// Frames whose energy (sum of squared samples) is below this are
    /// reported unvoiced without searching for a period.
    pub min_frame_energy: Option<f64>,
}

impl Default for YinConfig {
    fn default() -> Self {
        YinConfig {
            window_length: 1024,
            step_length: 256,
            f0_min: 70.0,
            f0_max: 700.0,
            harmonic_threshold: 0.1,
            min_frame_energy: None,
        }
    }
}

impl YinConfig {
    /// Check every parameter against `sample_rate`, failing on the first bad one.
    pub fn validate(&self, sample_rate: usize) -> Result<()> {
        self.validate_parameters()?;
        if sample_rate == 0 {
            return Err(Error::InvalidSampleRate);
        }
        Ok(())
    }

    /// Check the parameters that do not depend on the sample rate.
    pub fn validate_parameters(&self) -> Result<()> {
        if self.window_length == 0 {
            return Err(Error::InvalidWindowLength);
        }
        if self.step_length == 0 {
            return Err(Error::InvalidStepLength);
        }
        // Written so that NaN bounds fail too.
        if !(self.f0_min > 0.0 && self.f0_max > self.f0_min && self.f0_max.is_finite()) {
            return Err(Error::InvalidFrequencyRange {
                min: self.f0_min,
                max: self.f0_max,
            });
        }
        if !(self.harmonic_threshold > 0.0 && self.harmonic_threshold <= 1.0) {
            return Err(Error::InvalidThreshold(self.harmonic_threshold));
        }
        Ok(())
    }

    /// Smallest lag searched, `floor(sample_rate / f0_max)`.
    pub fn tau_min(&self, sample_rate: usize) -> usize {
        (sample_rate as f64 / self.f0_max).floor() as usize
    }

    /// Largest lag (exclusive), `floor(sample_rate / f0_min)`, before clamping
    /// to the window length.
    pub fn tau_max(&self, sample_rate: usize) -> usize {
        (sample_rate as f64 / self.f0_min).floor() as usize
    }
}
