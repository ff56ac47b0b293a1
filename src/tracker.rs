//! Sliding-window pitch tracking over a whole recording.
//!
//! Windows of `window_length` samples start every `step_length` samples, for
//! as long as a full window fits in the signal. Each window is analysed on its
//! own by a [YINDetector], so with the `parallel` feature the frames are spread
//! over the rayon thread pool, one detector per worker, and collected back in
//! frame order.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::YinConfig;
use crate::detector::internals::Pitch;
use crate::detector::yin::YINDetector;
use crate::detector::PitchDetector;
use crate::error::Result;
use crate::float::Float;

/// Pitch of the frame starting at `time` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchEstimate {
    pub time: f64,
    pub frequency: f64,
    pub harmonic_rate: f64,
    pub argmin_frequency: f64,
}

impl PitchEstimate {
    fn new(time: f64, pitch: Pitch) -> Self {
        PitchEstimate {
            time,
            frequency: pitch.frequency,
            harmonic_rate: pitch.harmonic_rate,
            argmin_frequency: pitch.argmin_frequency,
        }
    }

    pub fn is_voiced(&self) -> bool {
        self.frequency > 0.0
    }
}

/// Number of full windows that fit in `len` samples.
pub fn frame_count(len: usize, window_length: usize, step_length: usize) -> usize {
    match len >= window_length {
        true => (len - window_length) / step_length + 1,
        false => 0,
    }
}

/// Run YIN over every full window of `signal`.
///
/// The configuration is validated before any frame is processed. A signal
/// shorter than one window gives an empty series.
pub fn scan<T>(signal: &[T], sample_rate: usize, config: &YinConfig) -> Result<Vec<PitchEstimate>>
where
    T: Float,
{
    config.validate(sample_rate)?;

    let frames = frame_count(signal.len(), config.window_length, config.step_length);
    log::debug!(
        "scanning {} frames of {} samples (step {}, lags {}..{}) at {} Hz",
        frames,
        config.window_length,
        config.step_length,
        config.tau_min(sample_rate),
        config.tau_max(sample_rate).min(config.window_length),
        sample_rate
    );
    if frames == 0 {
        return Ok(Vec::new());
    }

    let estimate = |detector: &mut YINDetector<T>, index: usize| -> Result<PitchEstimate> {
        let start = index * config.step_length;
        let frame = &signal[start..start + config.window_length];
        let pitch = detector.get_pitch(frame, sample_rate)?;
        let estimate = PitchEstimate::new(start as f64 / sample_rate as f64, pitch);
        log::trace!(
            "frame {} at {:.4}s: {:.2} Hz (harmonic rate {:.4})",
            index,
            estimate.time,
            estimate.frequency,
            estimate.harmonic_rate
        );
        Ok(estimate)
    };

    #[cfg(feature = "parallel")]
    let estimates = (0..frames)
        .into_par_iter()
        .map_init(|| YINDetector::from_config(config, sample_rate), estimate)
        .collect::<Result<Vec<_>>>()?;

    #[cfg(not(feature = "parallel"))]
    let estimates = {
        let mut detector = YINDetector::from_config(config, sample_rate);
        (0..frames)
            .map(|index| estimate(&mut detector, index))
            .collect::<Result<Vec<_>>>()?
    };

    log::debug!(
        "{} of {} frames voiced",
        estimates.iter().filter(|e| e.is_voiced()).count(),
        frames
    );
    Ok(estimates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sin_wave(freq: f64, size: usize, sample_rate: usize) -> Vec<f64> {
        (0..size)
            .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    #[test]
    fn counts_full_windows_only() {
        assert_eq!(frame_count(1023, 1024, 256), 0);
        assert_eq!(frame_count(1024, 1024, 256), 1);
        assert_eq!(frame_count(1279, 1024, 256), 1);
        assert_eq!(frame_count(1280, 1024, 256), 2);
        assert_eq!(frame_count(10, 3, 1), 8);
    }

    #[test]
    fn short_signal_gives_empty_series() {
        let signal = sin_wave(110.0, 1000, 44100);
        let estimates = scan(&signal, 44100, &YinConfig::default()).unwrap();
        assert!(estimates.is_empty());
    }

    #[test]
    fn invalid_config_fails_before_scanning() {
        let config = YinConfig {
            f0_min: 800.0,
            ..Default::default()
        };
        let signal = sin_wave(110.0, 4096, 44100);
        assert!(matches!(
            scan(&signal, 44100, &config),
            Err(Error::InvalidFrequencyRange { .. })
        ));
        // Even when there is nothing to scan.
        assert!(scan::<f64>(&[], 44100, &config).is_err());
    }

    #[test]
    fn frame_times_follow_step() {
        let config = YinConfig {
            window_length: 512,
            step_length: 128,
            ..Default::default()
        };
        let signal = sin_wave(220.0, 2048, 8000);
        let estimates = scan(&signal, 8000, &config).unwrap();

        assert_eq!(estimates.len(), frame_count(2048, 512, 128));
        for (i, estimate) in estimates.iter().enumerate() {
            assert_eq!(estimate.time, (i * 128) as f64 / 8000.0);
        }
    }

    #[test]
    fn scan_matches_frame_by_frame_detection() {
        // A2 then B3, a quarter second each, so some frames straddle the change.
        let sample_rate = 44100;
        let config = YinConfig::default();
        let mut signal = sin_wave(110.0, sample_rate / 4, sample_rate);
        signal.extend(sin_wave(246.94, sample_rate / 4, sample_rate));

        let estimates = scan(&signal, sample_rate, &config).unwrap();

        let mut detector = YINDetector::<f64>::from_config(&config, sample_rate);
        let frames = frame_count(signal.len(), config.window_length, config.step_length);
        let expected: Vec<PitchEstimate> = (0..frames)
            .map(|index| {
                let start = index * config.step_length;
                let frame = &signal[start..start + config.window_length];
                let pitch = detector.get_pitch(frame, sample_rate).unwrap();
                PitchEstimate::new(start as f64 / sample_rate as f64, pitch)
            })
            .collect();

        assert_eq!(estimates.len(), expected.len());
        for (i, (got, want)) in estimates.iter().zip(&expected).enumerate() {
            assert_eq!(got, want, "frame {}", i);
        }
        assert!((estimates[0].frequency - 110.0).abs() < 2.2);
        assert!((estimates[frames - 1].frequency - 246.94).abs() < 5.0);
    }

    #[test]
    fn unvoiced_frames_report_cmnd_minimum() {
        // The tone's period (160 samples) is longer than any lag searched
        // (53..80), so the difference function only climbs.
        let config = YinConfig {
            f0_min: 100.0,
            f0_max: 150.0,
            window_length: 256,
            step_length: 256,
            ..Default::default()
        };
        let signal = sin_wave(50.0, 1024, 8000);
        let estimates = scan(&signal, 8000, &config).unwrap();

        assert_eq!(estimates.len(), 4);
        for estimate in estimates {
            assert_eq!(estimate.frequency, 0.0);
            assert_eq!(estimate.argmin_frequency, 0.0);
            assert!(estimate.harmonic_rate > config.harmonic_threshold);
            assert!(estimate.harmonic_rate <= 1.0);
        }
    }
}
