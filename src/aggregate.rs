//! Reduce a pitch track to the frequency that was held the longest.
//!
//! Every voiced frame after the first adds the time elapsed since the
//! previous frame to its frequency. Frequencies are grouped by a
//! [Bucketing] key; under [Bucketing::Exact] two frames only share a total
//! when their frequencies are bit-for-bit equal.

use std::collections::HashMap;

use crate::tracker::PitchEstimate;

/// Cent offsets are measured from A4 when bucketing by cents.
const CENT_REFERENCE_HZ: f64 = 440.0;

/// How detected frequencies are grouped before their durations are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Bucketing {
    /// Group identical frequency values only.
    Exact,
    /// Group frequencies that round to the same whole Hz.
    NearestHz,
    /// Group frequencies that round to the same cent.
    #[default]
    NearestCent,
}

impl Bucketing {
    /// `frequency` must be positive.
    fn key(self, frequency: f64) -> i64 {
        match self {
            Bucketing::Exact => frequency.to_bits() as i64,
            Bucketing::NearestHz => frequency.round() as i64,
            Bucketing::NearestCent => {
                (1200.0 * (frequency / CENT_REFERENCE_HZ).log2()).round() as i64
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    /// First frequency seen in the bucket.
    first: f64,
    duration: f64,
    // Sum of frequency * duration, for the duration-weighted mean.
    weighted: f64,
}

/// Frequency sustained for the longest total time in `estimates`, or `0.0`
/// when no frame after the first is voiced.
///
/// Buckets keep first-seen order, and only a strictly longer total replaces
/// the current winner, so ties go to the bucket encountered first. The
/// returned value is the duration-weighted mean of the winning bucket's
/// frequencies, except under [Bucketing::Exact] where it is the detected
/// frequency itself.
pub fn dominant_frequency(estimates: &[PitchEstimate], bucketing: Bucketing) -> f64 {
    let mut index: HashMap<i64, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for pair in estimates.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);
        if !current.is_voiced() {
            continue;
        }
        let elapsed = current.time - previous.time;
        let slot = *index
            .entry(bucketing.key(current.frequency))
            .or_insert_with(|| {
                buckets.push(Bucket {
                    first: current.frequency,
                    duration: 0.0,
                    weighted: 0.0,
                });
                buckets.len() - 1
            });
        let bucket = &mut buckets[slot];
        bucket.duration += elapsed;
        bucket.weighted += elapsed * current.frequency;
    }

    let mut best: Option<&Bucket> = None;
    for bucket in &buckets {
        if best.map_or(true, |b| bucket.duration > b.duration) {
            best = Some(bucket);
        }
    }

    best.filter(|bucket| bucket.duration > 0.0)
        .map(|bucket| match bucketing {
            Bucketing::Exact => bucket.first,
            _ => bucket.weighted / bucket.duration,
        })
        .unwrap_or(0.0)
}
