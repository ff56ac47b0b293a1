//! # Guitar Pitch
//! *guitar_pitch* tracks the fundamental frequency of a monophonic recording
//! with the YIN algorithm and reduces the track to the guitar note that was
//! held the longest.
//!
//! # Pipeline
//!   * [scan][tracker::scan] slides a window over the signal and runs the
//!     [YINDetector][detector::yin::YINDetector] on every frame, producing a
//!     [PitchEstimate] per frame.
//!   * [dominant_frequency][aggregate::dominant_frequency] sums how long each
//!     frequency was held and keeps the longest.
//!   * [NoteLattice] names the note closest to that frequency.
//!
//! [Analyzer] runs all three.
//!
//! # Examples
//! ```
//! use guitar_pitch::{Analyzer, Signal, YinConfig};
//!
//! fn main() {
//!     const SAMPLE_RATE: usize = 44100;
//!
//!     // Half a second of the open A string.
//!     let freq = 110.0;
//!     let data: Vec<f64> = (0..SAMPLE_RATE / 2)
//!         .map(|i| (2.0 * std::f64::consts::PI * freq * i as f64 / SAMPLE_RATE as f64).sin())
//!         .collect();
//!     let signal = Signal::new(data, SAMPLE_RATE);
//!
//!     let analyzer = Analyzer::new(YinConfig::default()).unwrap();
//!     let analysis = analyzer.analyze(&signal).unwrap();
//!
//!     let note = analysis.note.unwrap();
//!     println!("{} Hz -> {} ({:+.1} cents)", analysis.dominant_frequency, note.name, analysis.cents_offset);
//!     assert_eq!(note.name, "A");
//! }
//! ```

pub use analysis::{Analysis, Analyzer};
pub use config::YinConfig;
pub use detector::internals::Pitch;
pub use error::{Error, Result};
pub use note::{Note, NoteLattice};
pub use signal::Signal;
pub use tracker::PitchEstimate;

pub mod aggregate;
pub mod analysis;
pub mod config;
pub mod detector;
pub mod error;
pub mod float;
pub mod note;
pub mod signal;
pub mod tracker;
pub mod utils;
