use crate::detector::internals::Pitch;
use crate::error::Result;
use crate::float::Float;

pub mod internals;
pub mod yin;

pub trait PitchDetector<T>
where
    T: Float,
{
    /// Estimate the pitch of one frame. `frame` must have the length the
    /// detector was built for.
    fn get_pitch(&mut self, frame: &[T], sample_rate: usize) -> Result<Pitch>;
}
