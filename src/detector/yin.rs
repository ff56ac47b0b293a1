//! The YIN pitch detection algorithm is based on the algorithm from the paper
//! *[YIN, a fundamental frequency estimator for speech and music](http://recherche.ircam.fr/equipes/pcm/cheveign/ps/2002_JASA_YIN_proof.pdf)*.
//!
//! Let $S=(s_0,s_1,\ldots,s_{N-1})$ be one frame. The *difference function* at lag $t$ is
//! $$ d(t) = \sum_{j=0}^{N-t-1} (s_j-s_{j+t})^2. $$
//! It is close to zero when the frame "lines up" with itself, but its scale depends on
//! the volume, so YIN works on the *cumulative mean normalized difference function*
//! $$ d\'(t) = \begin{cases}1&\text{if }t=0\\\\ d(t) / \left[ \tfrac{1}{t}\sum_{k=1}^t d(k) \right] & \text{otherwise}\end{cases} $$
//! and takes the first dip below a threshold, followed down to the bottom of its trough.
//!
//! ## Implementation
//! $d(t)$ is evaluated from prefix sums of squares and an autocorrelation computed with a
//! zero padded real FFT, which makes a frame $O(N \log N)$ instead of $O(N \tau_{max})$.
//!
//! No parabolic interpolation is applied: the reported frequency is always
//! `sample_rate / lag` for an integer lag.

use crate::config::YinConfig;
use crate::detector::internals::{
    cumulative_mean_normalized_difference, difference_function, global_minimum, pick_period,
    DetectorInternals, Pitch,
};
use crate::detector::PitchDetector;
use crate::error::Result;
use crate::float::Float;
use crate::utils::buffer::{new_real_buffer, square_sum};

pub struct YINDetector<T>
where
    T: Float,
{
    internals: DetectorInternals<T>,
    tau_min: usize,
    threshold: T,
    min_frame_energy: Option<T>,
    cmnd: Vec<T>,
}

impl<T> YINDetector<T>
where
    T: Float,
{
    /// Detector for frames of `size` samples searching lags `tau_min..tau_max`.
    /// `tau_max` is clamped to the frame size.
    pub fn new(size: usize, tau_min: usize, tau_max: usize, threshold: T) -> Self {
        let internals = DetectorInternals::new(size, tau_max);
        let cmnd = new_real_buffer(internals.tau_max);
        YINDetector {
            internals,
            tau_min,
            threshold,
            min_frame_energy: None,
            cmnd,
        }
    }

    /// Detector for the windows of a scan described by `config`.
    pub fn from_config(config: &YinConfig, sample_rate: usize) -> Self {
        let mut detector = Self::new(
            config.window_length,
            config.tau_min(sample_rate),
            config.tau_max(sample_rate),
            T::from_f64_lossy(config.harmonic_threshold),
        );
        detector.min_frame_energy = config.min_frame_energy.map(T::from_f64_lossy);
        detector
    }

    pub fn tau_min(&self) -> usize {
        self.tau_min
    }

    pub fn tau_max(&self) -> usize {
        self.internals.tau_max
    }

    /// CMND curve of the last frame passed to [get_pitch][PitchDetector::get_pitch].
    pub fn cmnd(&self) -> &[T] {
        &self.cmnd
    }
}

impl<T> PitchDetector<T> for YINDetector<T>
where
    T: Float,
{
    fn get_pitch(&mut self, frame: &[T], sample_rate: usize) -> Result<Pitch> {
        assert_eq!(frame.len(), self.internals.size);
        let sample_rate = sample_rate as f64;

        // STEP 1: The difference function, d_t.
        difference_function(frame, &mut self.internals, &mut self.cmnd)?;

        // STEP 2: The cumulative mean normalized difference function, d_t'.
        cumulative_mean_normalized_difference(&mut self.cmnd);

        let (argmin, minimum) = global_minimum(&self.cmnd);
        let argmin_frequency = match argmin > self.tau_min {
            true => sample_rate / argmin as f64,
            false => 0.0,
        };

        // STEP 3: The absolute threshold. Quiet frames skip it entirely.
        let quiet = self
            .min_frame_energy
            .map_or(false, |floor| square_sum(frame) < floor);
        let tau = match quiet {
            true => 0,
            false => pick_period(&self.cmnd, self.tau_min, self.cmnd.len(), self.threshold),
        };

        let pitch = match tau {
            0 => Pitch {
                frequency: 0.0,
                harmonic_rate: minimum.to_f64_lossy(),
                argmin_frequency,
            },
            tau => Pitch {
                frequency: sample_rate / tau as f64,
                harmonic_rate: self.cmnd[tau].to_f64_lossy(),
                argmin_frequency,
            },
        };
        Ok(pitch)
    }
}
