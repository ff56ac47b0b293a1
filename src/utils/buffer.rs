use crate::float::Float;

/// FFT lengths are padded to `k * 2^p` for one of these `k`. Small factors of
/// 2, 3 and 5 only, so every padded length stays on rustfft's fast paths.
const FFT_FRIENDLY_FACTORS: [usize; 8] = [16, 18, 20, 24, 25, 27, 30, 32];

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}

/// Prefix sums of the squared samples with a leading zero, so that
/// `result[b] - result[a]` is the energy of `arr[a..b]`.
/// `result` must hold `arr.len() + 1` values.
pub fn prefix_square_sum<T: Float>(arr: &[T], result: &mut [T]) {
    assert!(result.len() > arr.len());
    result[0] = T::zero();
    let mut acc = T::zero();
    for (r, &s) in result[1..].iter_mut().zip(arr) {
        acc = acc + s * s;
        *r = acc;
    }
}

/// Smallest length of the form `k * 2^p`, `k` in [FFT_FRIENDLY_FACTORS],
/// that is at least `min_size`.
///
/// ```rust
/// use guitar_pitch::utils::buffer::padded_fft_size;
///
/// assert_eq!(padded_fft_size(10), 16);
/// assert_eq!(padded_fft_size(1024 + 630), 1728);
/// assert_eq!(padded_fft_size(2048), 2048);
/// ```
pub fn padded_fft_size(min_size: usize) -> usize {
    // 2^p is the first power of two above min_size / 32, so 32 * 2^p always
    // reaches min_size.
    let p = usize::BITS - (min_size / 32).leading_zeros();
    let scale = 1usize << p;
    FFT_FRIENDLY_FACTORS
        .iter()
        .map(|k| k * scale)
        .filter(|&n| n >= min_size)
        .min()
        .unwrap_or(32 * scale)
}
