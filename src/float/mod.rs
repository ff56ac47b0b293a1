//! Generic [Float] type which acts as a stand-in for `f32` or `f64`.
use rustfft::num_traits::float::FloatCore as NumFloatCore;
use rustfft::FftNum;
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Signals are processed as arrays of [Float]s. A [Float] is normally `f32` or `f64`.
pub trait Float: Display + Debug + NumFloatCore + FftNum + Sum {
    /// Convert an `f64` into the sample type, rounding if needed.
    fn from_f64_lossy(value: f64) -> Self;

    /// Widen the sample type to `f64`.
    fn to_f64_lossy(self) -> f64;

    /// Convert a lag or sample count into the sample type.
    fn from_index(index: usize) -> Self {
        Self::from_f64_lossy(index as f64)
    }
}

impl Float for f64 {
    fn from_f64_lossy(value: f64) -> Self {
        value
    }

    fn to_f64_lossy(self) -> f64 {
        self
    }
}

impl Float for f32 {
    fn from_f64_lossy(value: f64) -> Self {
        value as f32
    }

    fn to_f64_lossy(self) -> f64 {
        self as f64
    }
}
