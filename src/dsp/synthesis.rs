use std::f64::consts::TAU;

use crate::data::model::{Signal, Spectrum, SpectrumError};

/// Periods of the second-lowest harmonic rendered when the caller has no preference.
pub const DEFAULT_PERIODS: f64 = 5.0;

/// Samples per period of the highest harmonic.
pub const OVERSAMPLING: f64 = 50.0;

/// Upper bound on the samples of one synthesized signal.
pub const MAX_SAMPLES: usize = 4_000_000;

// ---------------------------------------------------------------------------
// Sampling window
// ---------------------------------------------------------------------------

/// Duration covered by `periods` periods of `frequencies[1]`.
///
/// Index 1 rather than 0 because the lowest entry is usually the DC term.
fn duration(spectrum: &Spectrum, periods: f64) -> Result<f64, SpectrumError> {
    if !(periods.is_finite() && periods > 0.0) {
        return Err(SpectrumError::InvalidPeriods(periods));
    }
    if spectrum.len() < 2 {
        return Err(SpectrumError::TooFewHarmonics {
            required: 2,
            found: spectrum.len(),
        });
    }
    spectrum.check_ascending()?;

    let reference = spectrum.frequencies()[1];
    if reference <= 0.0 {
        return Err(SpectrumError::NoFundamental(reference));
    }
    Ok(periods / reference)
}

/// Number of samples [`synthesize`] produces: `duration × f_max × OVERSAMPLING`,
/// truncated. Wide frequency ratios beyond [`MAX_SAMPLES`] are rejected before
/// anything is allocated.
pub fn sample_count(spectrum: &Spectrum, periods: f64) -> Result<usize, SpectrumError> {
    let t_max = duration(spectrum, periods)?;
    let f_max = spectrum.frequencies()[spectrum.len() - 1];
    let requested = (t_max * f_max * OVERSAMPLING).floor();
    if requested > MAX_SAMPLES as f64 {
        return Err(SpectrumError::TooManySamples {
            requested,
            limit: MAX_SAMPLES,
        });
    }
    Ok(requested as usize)
}

/// `n` evenly spaced instants over the closed interval `[0, t_max]`.
fn linspace(t_max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let step = t_max / (n - 1) as f64;
            (0..n).map(|i| i as f64 * step).collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Additive synthesis
// ---------------------------------------------------------------------------

/// Evaluate `Σ Aᵢ·cos(2π·fᵢ·t + φᵢ)` at every instant of `times`.
pub fn render_at(spectrum: &Spectrum, times: &[f64]) -> Signal {
    let values = times
        .iter()
        .map(|&t| {
            spectrum
                .harmonics()
                .map(|(f, a, phi)| a * (TAU * f * t + phi).cos())
                .sum()
        })
        .collect();

    Signal {
        time: times.to_vec(),
        values,
    }
}

/// Reconstruct `periods` periods of the waveform described by `spectrum`.
///
/// Requires at least two harmonics in ascending frequency order with a
/// positive second frequency.
pub fn synthesize(spectrum: &Spectrum, periods: f64) -> Result<Signal, SpectrumError> {
    let t_max = duration(spectrum, periods)?;
    let n = sample_count(spectrum, periods)?;
    log::debug!(
        "synthesizing {} harmonics over {t_max:.4}s with {n} samples",
        spectrum.len()
    );
    Ok(render_at(spectrum, &linspace(t_max, n)))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn spectrum(f: &[f64], a: &[f64], p: &[f64]) -> Spectrum {
        Spectrum::new(f.to_vec(), a.to_vec(), p.to_vec()).unwrap()
    }

    #[test]
    fn single_harmonic_at_origin() {
        let sp = spectrum(&[1.0], &[2.0], &[0.0]);
        let s = render_at(&sp, &[0.0]);
        assert_abs_diff_eq!(s.values[0], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn single_harmonic_is_rejected_by_sampling_rule() {
        let sp = spectrum(&[1.0], &[2.0], &[0.0]);
        assert_eq!(
            synthesize(&sp, DEFAULT_PERIODS),
            Err(SpectrumError::TooFewHarmonics {
                required: 2,
                found: 1
            })
        );
    }

    #[test]
    fn superposition_holds() {
        let both = spectrum(&[2.0, 5.0], &[1.0, 0.5], &[0.3, -1.1]);
        let signal = synthesize(&both, 3.0).unwrap();

        let first = render_at(&both.truncated(1), &signal.time);
        let second = render_at(
            &spectrum(&[5.0], &[0.5], &[-1.1]),
            &signal.time,
        );

        for i in 0..signal.len() {
            assert_abs_diff_eq!(
                signal.values[i],
                first.values[i] + second.values[i],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn sample_count_follows_oversampling_rule() {
        let sp = spectrum(&[0.0, 1.0, 10.0], &[1.0; 3], &[0.0; 3]);
        // 2 periods of 1 Hz = 2 s, × 10 Hz × 50
        assert_eq!(sample_count(&sp, 2.0).unwrap(), 1000);
    }

    #[test]
    fn sample_count_is_capped() {
        // 5 periods of 1 mHz with a 10 kHz top harmonic: 2.5e9 samples.
        let wide = spectrum(&[0.0, 0.001, 10_000.0], &[1.0; 3], &[0.0; 3]);
        match sample_count(&wide, DEFAULT_PERIODS) {
            Err(SpectrumError::TooManySamples { requested, limit }) => {
                assert_abs_diff_eq!(requested, 2.5e9, epsilon = 1.0);
                assert_eq!(limit, MAX_SAMPLES);
            }
            other => panic!("expected TooManySamples, got {other:?}"),
        }
        assert!(matches!(
            synthesize(&wide, DEFAULT_PERIODS),
            Err(SpectrumError::TooManySamples { .. })
        ));

        // Right at the limit is still allowed.
        let edge = spectrum(&[0.0, 1.0, MAX_SAMPLES as f64 / OVERSAMPLING], &[1.0; 3], &[0.0; 3]);
        assert_eq!(sample_count(&edge, 1.0).unwrap(), MAX_SAMPLES);
    }

    #[test]
    fn sample_count_scales_linearly() {
        let sp = spectrum(&[0.0, 1.0, 10.0], &[1.0; 3], &[0.0; 3]);
        let base = sample_count(&sp, 2.0).unwrap();
        assert_eq!(sample_count(&sp, 4.0).unwrap(), 2 * base);

        let higher = spectrum(&[0.0, 1.0, 20.0], &[1.0; 3], &[0.0; 3]);
        assert_eq!(sample_count(&higher, 2.0).unwrap(), 2 * base);
    }

    #[test]
    fn time_axis_spans_closed_window() {
        let sp = spectrum(&[0.0, 2.0, 4.0], &[1.0, 1.0, 1.0], &[0.0; 3]);
        let s = synthesize(&sp, 1.0).unwrap();
        assert_eq!(s.len(), 100);
        assert_eq!(s.time[0], 0.0);
        assert_abs_diff_eq!(*s.time.last().unwrap(), 0.5, epsilon = 1e-12);
        assert_eq!(s.values.len(), s.time.len());
    }

    #[test]
    fn dc_term_offsets_the_waveform() {
        let sp = spectrum(&[0.0, 1.0], &[3.0, 1.0], &[0.0, std::f64::consts::FRAC_PI_2]);
        let s = synthesize(&sp, 1.0).unwrap();
        // cos(2πt + π/2) = -sin(2πt), zero at t = 0
        assert_abs_diff_eq!(s.values[0], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn rejects_bad_requests() {
        let sp = spectrum(&[0.0, 1.0], &[1.0, 1.0], &[0.0, 0.0]);
        assert_eq!(synthesize(&sp, 0.0), Err(SpectrumError::InvalidPeriods(0.0)));

        let unsorted = spectrum(&[0.0, 3.0, 1.0], &[1.0; 3], &[0.0; 3]);
        assert!(matches!(
            synthesize(&unsorted, 1.0),
            Err(SpectrumError::NotAscending { index: 2, .. })
        ));

        let dc_only = spectrum(&[0.0, 0.0], &[1.0, 1.0], &[0.0, 0.0]);
        assert_eq!(synthesize(&dc_only, 1.0), Err(SpectrumError::NoFundamental(0.0)));
    }
}
