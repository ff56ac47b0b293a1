use std::sync::Arc;

use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;

use crate::error::Result;
use crate::float::Float;
use crate::utils::buffer::{new_real_buffer, padded_fft_size, prefix_square_sum};

/// Added to the running sum in the CMND denominator so silent frames stay finite.
pub const CMND_EPSILON: f64 = 1e-10;

/// Pitch of a single frame, before it is placed on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Pitch {
    /// Detected fundamental in Hz, `0.0` when the frame is unvoiced.
    pub frequency: f64,
    /// CMND value at the chosen lag, or the CMND minimum when unvoiced.
    /// Lower means more periodic.
    pub harmonic_rate: f64,
    /// Frequency of the global CMND minimum, `0.0` when that minimum lies at
    /// or below the smallest searched lag.
    pub argmin_frequency: f64,
}

impl Pitch {
    pub fn is_voiced(&self) -> bool {
        self.frequency > 0.0
    }
}

/// FFT plans and buffers for one window size. Planning is the expensive part
/// of an FFT, so a detector builds these once and reuses them for every frame.
pub struct DetectorInternals<T>
where
    T: Float,
{
    pub size: usize,
    pub tau_max: usize,
    forward: Arc<dyn RealToComplex<T>>,
    inverse: Arc<dyn ComplexToReal<T>>,
    /// Zero padded frame on the way in, unnormalized autocorrelation on the way out.
    padded: Vec<T>,
    spectrum: Vec<Complex<T>>,
    forward_scratch: Vec<Complex<T>>,
    inverse_scratch: Vec<Complex<T>>,
    energy: Vec<T>,
}

impl<T> DetectorInternals<T>
where
    T: Float,
{
    /// `tau_max` is clamped to `1..=size`.
    pub fn new(size: usize, tau_max: usize) -> Self {
        let tau_max = tau_max.clamp(1, size.max(1));
        let fft_size = padded_fft_size(size + tau_max);

        let mut planner = RealFftPlanner::<T>::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);

        DetectorInternals {
            size,
            tau_max,
            padded: forward.make_input_vec(),
            spectrum: forward.make_output_vec(),
            forward_scratch: forward.make_scratch_vec(),
            inverse_scratch: inverse.make_scratch_vec(),
            energy: new_real_buffer(size + 1),
            forward,
            inverse,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.padded.len()
    }
}

/// Autocorrelation of `frame` for lags `0..fft_size`, left unnormalized in
/// `internals.padded`. The padding keeps the circular correlation from
/// wrapping into the lags we read.
fn autocorrelation<T>(frame: &[T], internals: &mut DetectorInternals<T>) -> Result<()>
where
    T: Float,
{
    let DetectorInternals {
        forward,
        inverse,
        padded,
        spectrum,
        forward_scratch,
        inverse_scratch,
        ..
    } = internals;

    padded[..frame.len()].copy_from_slice(frame);
    padded[frame.len()..].iter_mut().for_each(|x| *x = T::zero());

    forward.process_with_scratch(padded, spectrum, forward_scratch)?;
    // X * conj(X) is real. The imaginary parts must be exactly zero for the
    // inverse real transform to accept the DC and Nyquist bins.
    spectrum
        .iter_mut()
        .for_each(|c| *c = Complex::new(c.norm_sqr(), T::zero()));
    inverse.process_with_scratch(spectrum, padded, inverse_scratch)?;
    Ok(())
}

/// Compute the difference function _d(t)_ of `frame` for lags `0..internals.tau_max`
/// into `result`. For a frame _x_ of length _N_ this is
///
///  > d(t) = sum_{j=0}^{N-t-1} (x_j - x_{j+t})^2
///
/// evaluated as `E(N) + E(N-t) - E(t) - 2 r(t)`, where `E` is the prefix sum of
/// squares and `r` the autocorrelation computed with an FFT. `d(0)` is left at zero.
pub fn difference_function<T>(
    frame: &[T],
    internals: &mut DetectorInternals<T>,
    result: &mut [T],
) -> Result<()>
where
    T: Float,
{
    assert_eq!(frame.len(), internals.size);
    let n = frame.len();
    let tau_max = internals.tau_max;
    assert!(result.len() >= tau_max);

    autocorrelation(frame, internals)?;
    prefix_square_sum(frame, &mut internals.energy);

    // rustfft doesn't normalize, so the fft -> inverse fft round trip leaves
    // the correlation scaled by the transform length.
    let normalization = T::one() / T::from_index(internals.fft_size());
    let two = T::from_index(2);
    let energy = &internals.energy;
    let total = energy[n];

    result[..tau_max]
        .iter_mut()
        .zip(&internals.padded[..tau_max])
        .enumerate()
        .for_each(|(tau, (d, &r))| {
            let value = total + energy[n - tau] - energy[tau] - two * r * normalization;
            // Rounding can push near-zero values slightly negative.
            *d = value.max(T::zero());
        });
    result[0] = T::zero();
    Ok(())
}

/// Calculate the "cumulative mean normalized difference function" in place.
/// If _d(t)_ is the difference function, set _d'(0) = 1_ and for _t > 0_
///
///  > d'(t) = d(t) * t / (sum_{k=1}^t d(k) + epsilon)
pub fn cumulative_mean_normalized_difference<T: Float>(difference: &mut [T]) {
    if difference.is_empty() {
        return;
    }
    let epsilon = T::from_f64_lossy(CMND_EPSILON);
    let mut sum = T::zero();
    difference[0] = T::one();
    difference
        .iter_mut()
        .enumerate()
        .skip(1)
        .for_each(|(tau, d)| {
            sum = sum + *d;
            *d = *d * T::from_index(tau) / (sum + epsilon);
        });
}

/// Find the pitch period in `cmnd`: the first lag in `tau_min..tau_max` below
/// `threshold`, followed downhill to the bottom of its trough. Returns `0` if
/// no lag in range is below the threshold.
///
/// The first dip wins even if a later one is deeper, which keeps the
/// detector on the fundamental rather than a multiple of its period.
pub fn pick_period<T: Float>(cmnd: &[T], tau_min: usize, tau_max: usize, threshold: T) -> usize {
    let tau_max = tau_max.min(cmnd.len());
    (tau_min..tau_max)
        .find(|&tau| cmnd[tau] < threshold)
        .map(|mut tau| {
            while tau + 1 < tau_max && cmnd[tau + 1] < cmnd[tau] {
                tau += 1;
            }
            tau
        })
        .unwrap_or(0)
}

/// Index and value of the smallest element of `cmnd`, first occurrence on ties.
/// An empty slice reports `(0, 1)`, the value `cmnd[0]` would have.
pub fn global_minimum<T: Float>(cmnd: &[T]) -> (usize, T) {
    cmnd.iter()
        .enumerate()
        .fold((0, T::one()), |(best_idx, best), (idx, &value)| {
            if idx == 0 || value < best {
                (idx, value)
            } else {
                (best_idx, best)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn direct_difference(frame: &[f64], tau_max: usize) -> Vec<f64> {
        (0..tau_max)
            .map(|tau| {
                frame[..frame.len() - tau]
                    .iter()
                    .zip(&frame[tau..])
                    .map(|(x_j, x_j_tau)| (x_j - x_j_tau) * (x_j - x_j_tau))
                    .sum()
            })
            .collect()
    }

    /// Two partials plus a little deterministic noise.
    fn test_frame(size: usize) -> Vec<f64> {
        let mut seed: u32 = 12345;
        (0..size)
            .map(|i| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (seed >> 16) as f64 / 65536.0 - 0.5;
                let t = i as f64 / 8000.0;
                (2.0 * std::f64::consts::PI * 196.0 * t).sin()
                    + 0.4 * (2.0 * std::f64::consts::PI * 392.0 * t).sin()
                    + 0.1 * noise
            })
            .collect()
    }

    #[test]
    fn difference_function_small() {
        let frame: Vec<f64> = vec![0., 1., 2., 0., -1., -2.];
        let mut internals = DetectorInternals::new(frame.len(), 3);
        let mut result = vec![0.; 3];
        difference_function(&frame, &mut internals, &mut result).unwrap();

        let expected = direct_difference(&frame, 3);
        // Using an FFT loses precision; we don't care that much, so round generously.
        result.iter_mut().for_each(|x| *x = (*x * 100.).round() / 100.);
        assert_eq!(result[1..], expected[1..]);
        assert_eq!(result[0], 0.);
    }

    #[test]
    fn difference_function_matches_direct_sum() {
        for &(size, tau_max) in &[(64, 32), (300, 299), (1024, 630), (1024, 1024)] {
            let frame = test_frame(size);
            let mut internals = DetectorInternals::new(size, tau_max);
            let mut result = vec![0.; tau_max];
            difference_function(&frame, &mut internals, &mut result).unwrap();

            let expected = direct_difference(&frame, tau_max);
            let scale = expected.iter().cloned().fold(1.0, f64::max);
            for tau in 1..tau_max {
                assert!(
                    (result[tau] - expected[tau]).abs() <= 1e-6 * scale,
                    "size {} lag {}: fft {} direct {}",
                    size,
                    tau,
                    result[tau],
                    expected[tau]
                );
            }
        }
    }

    #[test]
    fn tau_max_is_clamped_to_frame() {
        let internals = DetectorInternals::<f64>::new(100, 500);
        assert_eq!(internals.tau_max, 100);
        assert!(internals.fft_size() >= 200);

        let internals = DetectorInternals::<f64>::new(100, 0);
        assert_eq!(internals.tau_max, 1);
    }

    #[test]
    fn difference_function_f32() {
        let frame: Vec<f32> = test_frame(512).iter().map(|&x| x as f32).collect();
        let frame64: Vec<f64> = frame.iter().map(|&x| x as f64).collect();
        let mut internals = DetectorInternals::new(512, 256);
        let mut result = vec![0f32; 256];
        difference_function(&frame, &mut internals, &mut result).unwrap();

        let expected = direct_difference(&frame64, 256);
        let scale = expected.iter().cloned().fold(1.0, f64::max);
        for tau in 1..256 {
            assert!((result[tau] as f64 - expected[tau]).abs() <= 1e-3 * scale);
        }
    }

    #[test]
    fn cmnd_normalization() {
        let mut values = vec![0., 6., 14.];
        cumulative_mean_normalized_difference(&mut values);

        assert_eq!(values[0], 1.);
        assert_relative_eq!(values[1], 1., max_relative = 1e-9);
        assert_relative_eq!(values[2], 2. * 14. / (6. + 14.), max_relative = 1e-9);
    }

    #[test]
    fn cmnd_of_silence_is_finite() {
        let frame = vec![0f64; 256];
        let mut internals = DetectorInternals::new(256, 128);
        let mut values = vec![0.; 128];
        difference_function(&frame, &mut internals, &mut values).unwrap();
        cumulative_mean_normalized_difference(&mut values);

        assert_eq!(values[0], 1.);
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn pick_descends_into_first_trough() {
        //            0    1    2    3     4     5     6    7     8
        let cmnd = [1.0, 0.9, 0.5, 0.08, 0.05, 0.07, 0.6, 0.01, 0.3];
        assert_eq!(pick_period(&cmnd, 1, cmnd.len(), 0.1), 4);
        // A deeper dip later on does not win over the first one.
        assert_eq!(pick_period(&cmnd, 5, cmnd.len(), 0.1), 5);
        assert_eq!(pick_period(&cmnd, 6, cmnd.len(), 0.1), 7);
    }

    #[test]
    fn pick_stops_at_tau_max() {
        let cmnd = [1.0, 0.9, 0.08, 0.05, 0.01];
        assert_eq!(pick_period(&cmnd, 1, 4, 0.1), 3);
        assert_eq!(pick_period(&cmnd, 1, 100, 0.1), 4);
    }

    #[test]
    fn pick_reports_unvoiced() {
        let cmnd = [1.0, 0.9, 0.5, 0.3, 0.2, 0.4];
        assert_eq!(pick_period(&cmnd, 1, cmnd.len(), 0.1), 0);
        // Dips outside the searched range are ignored.
        let cmnd = [1.0, 0.01, 0.5, 0.3, 0.2, 0.4];
        assert_eq!(pick_period(&cmnd, 2, cmnd.len(), 0.1), 0);
    }

    #[test]
    fn picked_lag_is_below_threshold_and_first() {
        let frame = test_frame(1024);
        let mut internals = DetectorInternals::new(1024, 400);
        let mut cmnd = vec![0.; 400];
        difference_function(&frame, &mut internals, &mut cmnd).unwrap();
        cumulative_mean_normalized_difference(&mut cmnd);

        let threshold = 0.2;
        let tau = pick_period(&cmnd, 10, 400, threshold);
        assert_ne!(tau, 0);
        assert!(cmnd[tau] < threshold);
        let first = (10..tau).find(|&t| cmnd[t] < threshold).unwrap_or(tau);
        // Everything between the first dip and the result is a strict descent.
        assert!((first..tau).all(|t| cmnd[t + 1] < cmnd[t]));
        // 196 Hz at 8 kHz is a period of about 40.8 samples.
        assert!(tau == 40 || tau == 41, "picked {}", tau);
    }

    #[test]
    fn global_minimum_first_occurrence() {
        assert_eq!(global_minimum(&[1.0, 0.5, 0.2, 0.2, 0.7]), (2, 0.2));
        assert_eq!(global_minimum(&[1.0, 1.0]), (0, 1.0));
        assert_eq!(global_minimum::<f64>(&[]), (0, 1.0));
    }
}
