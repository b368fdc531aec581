use std::f64::consts::SQRT_2;
use std::fmt;

use num_complex::Complex64;

use crate::data::model::{Spectrum, SpectrumError};

// ---------------------------------------------------------------------------
// Filter order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOrder {
    /// `H = 1 / (1 + j·f/fc)`
    First,
    /// `H = 1 / (1 − (f/fc)² + j·√2·f/fc)`
    Second,
}

impl fmt::Display for FilterOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOrder::First => write!(f, "order 1"),
            FilterOrder::Second => write!(f, "order 2"),
        }
    }
}

// ---------------------------------------------------------------------------
// LowPass – analytic transfer function applied to a spectrum
// ---------------------------------------------------------------------------

/// A first- or second-order low-pass transfer function.
///
/// Filtering a spectrum keeps its frequencies, multiplies each amplitude by
/// `|H(f)|` and adds `arg H(f)` to each phase. Both orders are defined at
/// `f = 0` (gain 1, shift 0), so the output always has the input's length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPass {
    order: FilterOrder,
    cutoff_hz: f64,
}

impl LowPass {
    /// `cutoff_hz` must be positive; `f64::INFINITY` gives the identity filter.
    pub fn new(order: FilterOrder, cutoff_hz: f64) -> Result<Self, SpectrumError> {
        if cutoff_hz.is_nan() || cutoff_hz <= 0.0 {
            return Err(SpectrumError::InvalidCutoff(cutoff_hz));
        }
        Ok(LowPass { order, cutoff_hz })
    }

    pub fn first_order(cutoff_hz: f64) -> Result<Self, SpectrumError> {
        Self::new(FilterOrder::First, cutoff_hz)
    }

    pub fn second_order(cutoff_hz: f64) -> Result<Self, SpectrumError> {
        Self::new(FilterOrder::Second, cutoff_hz)
    }

    /// Normalised frequency `f / fc`.
    fn ratio(&self, f: f64) -> f64 {
        f / self.cutoff_hz
    }

    /// Complex transfer function `H(f)`.
    pub fn response(&self, f: f64) -> Complex64 {
        let x = self.ratio(f);
        let denominator = match self.order {
            FilterOrder::First => Complex64::new(1.0, x),
            FilterOrder::Second => Complex64::new(1.0 - x * x, SQRT_2 * x),
        };
        denominator.inv()
    }

    /// `|H(f)|`, i.e. `1/√(1+(f/fc)²)` or `1/√(1+(f/fc)⁴)`.
    pub fn gain(&self, f: f64) -> f64 {
        self.response(f).norm()
    }

    /// `arg H(f)` in radians, within `(−π, 0]`.
    ///
    /// Order 1 gives `−arctan(f/fc)`. Order 2 goes through `−π/2` at the
    /// cutoff and is 0 at DC. The closed form `π/2 − arctan((f/fc − fc/f)/2)`
    /// sometimes quoted for this filter is offset by π from `arg H` and uses a
    /// damping term of 2 instead of √2. It also divides by zero at DC.
    pub fn phase_shift(&self, f: f64) -> f64 {
        self.response(f).arg()
    }

    /// Filter a spectrum: same frequencies, attenuated amplitudes, shifted phases.
    pub fn apply(&self, spectrum: &Spectrum) -> Spectrum {
        let amplitudes = spectrum
            .frequencies()
            .iter()
            .zip(spectrum.amplitudes())
            .map(|(&f, &a)| a * self.gain(f))
            .collect();
        let phases = spectrum
            .frequencies()
            .iter()
            .zip(spectrum.phases())
            .map(|(&f, &phi)| phi + self.phase_shift(f))
            .collect();

        spectrum.with_amplitudes_and_phases(amplitudes, phases)
    }
}

impl fmt::Display for LowPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "low-pass {} @ {} Hz", self.order, self.cutoff_hz)
    }
}
