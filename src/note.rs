//! Map frequencies to the nearest note of a guitar-range chromatic lattice.
//!
//! The lattice starts at the open low E string and climbs one equal-tempered
//! semitone at a time for a fixed number of octaves. Note names repeat every
//! twelve entries; [Note::octave] tells the repetitions apart.

/// Chromatic note names starting from the open low E string.
pub const NOTE_NAMES: [&str; 12] = [
    "E", "F", "F#", "G", "G#", "A", "A#", "B", "C", "C#", "D", "D#",
];

/// Octaves spanned by [NoteLattice::default], E2 up to D#7.
pub const DEFAULT_OCTAVES: usize = 5;

/// Frequency of the open A string, which anchors the equal-tempered lattice.
pub const A2_HZ: f64 = 110.0;

const A_INDEX: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct Note {
    pub name: &'static str,
    pub frequency: f64,
    /// Octave of the lattice this entry belongs to, counted from the lowest.
    pub octave: usize,
}

impl Note {
    /// Distance of `frequency` from this note in cents, positive when sharp.
    pub fn cents_from(&self, frequency: f64) -> f64 {
        1200.0 * (frequency / self.frequency).log2()
    }
}

/// Ascending list of notes searched by [NoteLattice::nearest]. Built once and
/// only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteLattice {
    notes: Vec<Note>,
}

impl Default for NoteLattice {
    fn default() -> Self {
        Self::new(DEFAULT_OCTAVES)
    }
}

impl NoteLattice {
    /// Equal-tempered lattice with A2 at exactly 110 Hz.
    pub fn new(octaves: usize) -> Self {
        Self::with_reference(A2_HZ, octaves)
    }

    /// Equal-tempered lattice with A2 at `a2` Hz.
    pub fn with_reference(a2: f64, octaves: usize) -> Self {
        let mut base = [0.0; 12];
        for (i, f) in base.iter_mut().enumerate() {
            *f = a2 * ((i as f64 - A_INDEX as f64) / 12.0).exp2();
        }
        Self::with_base_frequencies(base, octaves)
    }

    /// Lattice built from one octave of frequencies for [NOTE_NAMES], doubled
    /// for each further octave. At least one octave is always built.
    pub fn with_base_frequencies(base: [f64; 12], octaves: usize) -> Self {
        let notes = (0..octaves.max(1))
            .flat_map(|octave| {
                let scale = (1u64 << octave) as f64;
                NOTE_NAMES
                    .iter()
                    .zip(base)
                    .map(move |(&name, frequency)| Note {
                        name,
                        frequency: frequency * scale,
                        octave,
                    })
            })
            .collect();
        NoteLattice { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// The note closest to `frequency`. When `frequency` lies exactly halfway
    /// between two notes the lower one is returned.
    ///
    /// Every input maps to some note, `0.0` included, so callers should treat
    /// unvoiced results separately before asking.
    pub fn nearest(&self, frequency: f64) -> &Note {
        let mut best = &self.notes[0];
        let mut best_distance = (best.frequency - frequency).abs();
        for note in &self.notes[1..] {
            let distance = (note.frequency - frequency).abs();
            if distance < best_distance {
                best = note;
                best_distance = distance;
            }
        }
        best
    }
}
