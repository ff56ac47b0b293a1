//! One complete run: track the pitch of a recording, find the dominant
//! frequency and name the note it is closest to.

use crate::aggregate::{dominant_frequency, Bucketing};
use crate::config::YinConfig;
use crate::error::Result;
use crate::float::Float;
use crate::note::{Note, NoteLattice};
use crate::signal::Signal;
use crate::tracker::{scan, PitchEstimate};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Analysis {
    /// Per-frame pitch track, in frame order.
    pub estimates: Vec<PitchEstimate>,
    /// Frequency held the longest, `0.0` if nothing was voiced.
    pub dominant_frequency: f64,
    /// Note nearest to the dominant frequency, `None` if nothing was voiced.
    pub note: Option<Note>,
    /// Deviation of the dominant frequency from `note`, in cents.
    pub cents_offset: f64,
}

impl Analysis {
    pub fn is_voiced(&self) -> bool {
        self.note.is_some()
    }

    /// Whether the recording's note is `expected`, ignoring surrounding whitespace.
    pub fn played(&self, expected: &str) -> bool {
        self.note
            .map_or(false, |note| note.name == expected.trim())
    }
}

/// Holds everything a run needs besides the signal, so the same analyzer
/// can be shared across recordings and threads.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: YinConfig,
    bucketing: Bucketing,
    lattice: NoteLattice,
}

impl Analyzer {
    /// Fails if any parameter of `config` is invalid. The sample rate is
    /// checked per signal by [analyze][Analyzer::analyze].
    pub fn new(config: YinConfig) -> Result<Self> {
        config.validate_parameters()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: YinConfig) -> Self {
        Analyzer {
            config,
            bucketing: Bucketing::default(),
            lattice: NoteLattice::default(),
        }
    }

    pub fn with_bucketing(mut self, bucketing: Bucketing) -> Self {
        self.bucketing = bucketing;
        self
    }

    pub fn with_lattice(mut self, lattice: NoteLattice) -> Self {
        self.lattice = lattice;
        self
    }

    pub fn config(&self) -> &YinConfig {
        &self.config
    }

    pub fn lattice(&self) -> &NoteLattice {
        &self.lattice
    }

    pub fn analyze<T>(&self, signal: &Signal<T>) -> Result<Analysis>
    where
        T: Float,
    {
        let estimates = scan(&signal.data, signal.sample_rate, &self.config)?;
        let dominant = dominant_frequency(&estimates, self.bucketing);

        let note = match dominant > 0.0 {
            true => Some(*self.lattice.nearest(dominant)),
            false => None,
        };
        let cents_offset = note.map_or(0.0, |note| note.cents_from(dominant));

        match note {
            Some(note) => log::debug!(
                "dominant frequency {:.2} Hz -> {} ({:+.1} cents)",
                dominant,
                note.name,
                cents_offset
            ),
            None => log::warn!(
                "no voiced frames in {:.3}s of audio",
                signal.duration()
            ),
        }

        Ok(Analysis {
            estimates,
            dominant_frequency: dominant,
            note,
            cents_offset,
        })
    }
}

impl Default for Analyzer {
    /// Analyzer over [YinConfig::default], whose parameters are valid.
    fn default() -> Self {
        Self::with_config(YinConfig::default())
    }
}
