use thiserror::Error;

// ---------------------------------------------------------------------------
// SpectrumError – domain preconditions
// ---------------------------------------------------------------------------

/// Violated precondition on a spectrum, a filter or a synthesis request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectrumError {
    #[error("column lengths differ: {frequencies} frequencies, {amplitudes} amplitudes, {phases} phases")]
    LengthMismatch {
        frequencies: usize,
        amplitudes: usize,
        phases: usize,
    },
    #[error("synthesis needs at least {required} harmonics, got {found}")]
    TooFewHarmonics { required: usize, found: usize },
    #[error("second harmonic frequency must be positive to set the sampling window, got {0}")]
    NoFundamental(f64),
    #[error("frequencies must be ascending (index {index}: {value} after {previous})")]
    NotAscending {
        index: usize,
        previous: f64,
        value: f64,
    },
    #[error("non-finite value in {column}[{index}]")]
    NonFinite { column: &'static str, index: usize },
    #[error("synthesis would need {requested} samples, more than the limit of {limit}")]
    TooManySamples { requested: f64, limit: usize },
    #[error("cutoff frequency must be positive, got {0}")]
    InvalidCutoff(f64),
    #[error("number of periods must be positive and finite, got {0}")]
    InvalidPeriods(f64),
}

// ---------------------------------------------------------------------------
// Spectrum – harmonic content of a signal
// ---------------------------------------------------------------------------

/// Parallel frequency / amplitude / phase columns, one entry per harmonic.
///
/// The three columns always have the same length. Frequencies are expected in
/// ascending order; that is only checked by the synthesizer, which relies on
/// it to pick its sampling window.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    frequencies: Vec<f64>,
    amplitudes: Vec<f64>,
    /// Radians.
    phases: Vec<f64>,
}

impl Spectrum {
    pub fn new(
        frequencies: Vec<f64>,
        amplitudes: Vec<f64>,
        phases: Vec<f64>,
    ) -> Result<Self, SpectrumError> {
        if frequencies.len() != amplitudes.len() || frequencies.len() != phases.len() {
            return Err(SpectrumError::LengthMismatch {
                frequencies: frequencies.len(),
                amplitudes: amplitudes.len(),
                phases: phases.len(),
            });
        }
        for (column, values) in [
            ("frequency", &frequencies),
            ("amplitude", &amplitudes),
            ("phase", &phases),
        ] {
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(SpectrumError::NonFinite { column, index });
            }
        }
        Ok(Spectrum {
            frequencies,
            amplitudes,
            phases,
        })
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn phases(&self) -> &[f64] {
        &self.phases
    }

    /// Number of harmonics.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    /// Whether the spectrum has no harmonics.
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Iterate over `(frequency, amplitude, phase)` triples.
    pub fn harmonics(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.frequencies
            .iter()
            .zip(&self.amplitudes)
            .zip(&self.phases)
            .map(|((&f, &a), &p)| (f, a, p))
    }

    /// The first `n` harmonics (all of them if `n >= len`).
    pub fn truncated(&self, n: usize) -> Spectrum {
        let n = n.min(self.len());
        Spectrum {
            frequencies: self.frequencies[..n].to_vec(),
            amplitudes: self.amplitudes[..n].to_vec(),
            phases: self.phases[..n].to_vec(),
        }
    }

    /// Check that frequencies never decrease.
    pub fn check_ascending(&self) -> Result<(), SpectrumError> {
        match self
            .frequencies
            .windows(2)
            .position(|pair| pair[1] < pair[0])
        {
            Some(i) => Err(SpectrumError::NotAscending {
                index: i + 1,
                previous: self.frequencies[i],
                value: self.frequencies[i + 1],
            }),
            None => Ok(()),
        }
    }

    /// Rebuild from new amplitude and phase columns, keeping the frequencies.
    /// Callers guarantee the lengths match.
    pub(crate) fn with_amplitudes_and_phases(
        &self,
        amplitudes: Vec<f64>,
        phases: Vec<f64>,
    ) -> Spectrum {
        debug_assert_eq!(amplitudes.len(), self.len());
        debug_assert_eq!(phases.len(), self.len());
        Spectrum {
            frequencies: self.frequencies.clone(),
            amplitudes,
            phases,
        }
    }
}

// ---------------------------------------------------------------------------
// Signal – synthesizer output
// ---------------------------------------------------------------------------

/// A sampled time-domain waveform produced by the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

impl Signal {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// `[t, value]` pairs, ready for plotting.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.time
            .iter()
            .zip(&self.values)
            .map(|(&t, &v)| [t, v])
            .collect()
    }
}

// ---------------------------------------------------------------------------
// TimeSeries – measured record loaded from disk
// ---------------------------------------------------------------------------

/// A measured `(time, value)` record, e.g. daily temperatures.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.time
            .iter()
            .zip(&self.values)
            .map(|(&t, &v)| [t, v])
            .collect()
    }
}
