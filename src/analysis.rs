use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::Color32;

use crate::color::REFERENCE_GREY;
use crate::data::loader::{load_spectrum, load_time_series};
use crate::data::model::Spectrum;
use crate::dsp::lowpass::LowPass;
use crate::dsp::synthesis::{DEFAULT_PERIODS, synthesize};

pub const SQUARE_FILE: &str = "spectre_carre.dat";
pub const TEMPERATURE_FILE: &str = "temperatures_marseille.dat";
pub const TEMPERATURE_SPECTRUM_FILE: &str = "spectre_temperatures.dat";
pub const MYSTERY_X_FILE: &str = "spectre_x.dat";
pub const MYSTERY_Y_FILE: &str = "spectre_y.dat";

pub const DEFAULT_CUTOFF_HZ: f64 = 150.0;
pub const DEFAULT_HARMONIC_COUNTS: [usize; 4] = [2, 5, 20, 51];

/// Bar width of the temperature spectrum chart, in the file's frequency unit.
const TEMPERATURE_BAR_WIDTH: f64 = 0.0032;

// ---------------------------------------------------------------------------
// Figures – what the plot panel renders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesKind {
    Line(Vec<[f64; 2]>),
    Bars {
        centers: Vec<f64>,
        heights: Vec<f64>,
        width: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    /// Pinned colour; `None` picks one from the figure palette.
    pub color: Option<Color32>,
}

impl Series {
    pub fn line(name: impl Into<String>, points: Vec<[f64; 2]>) -> Self {
        Series {
            name: name.into(),
            kind: SeriesKind::Line(points),
            color: None,
        }
    }

    pub fn bars(name: impl Into<String>, centers: Vec<f64>, heights: Vec<f64>, width: f64) -> Self {
        Series {
            name: name.into(),
            kind: SeriesKind::Bars {
                centers,
                heights,
                width,
            },
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = Some(color);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub legend: bool,
    /// Lock x/y scale to this ratio (parametric plots).
    pub data_aspect: Option<f32>,
}

impl Figure {
    pub fn new(title: impl Into<String>, x_label: &str, y_label: &str) -> Self {
        Figure {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series: Vec::new(),
            legend: false,
            data_aspect: None,
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_legend(mut self) -> Self {
        self.legend = true;
        self
    }
}

/// Figures of one analysis plus the spectra it worked from, for the table view.
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub figures: Vec<Figure>,
    pub spectra: Vec<(String, Spectrum)>,
}

// ---------------------------------------------------------------------------
// Analysis selection and parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    SquareWave,
    Temperatures,
    Mystery,
    LowPassSquare,
    Custom,
}

impl Analysis {
    /// Analyses backed by the fixed files of the data directory.
    pub const BUILT_IN: [Analysis; 4] = [
        Analysis::SquareWave,
        Analysis::Temperatures,
        Analysis::Mystery,
        Analysis::LowPassSquare,
    ];
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Analysis::SquareWave => "Square wave",
            Analysis::Temperatures => "Temperatures",
            Analysis::Mystery => "Mystery signal",
            Analysis::LowPassSquare => "Low-pass on square",
            Analysis::Custom => "Custom spectrum",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub cutoff_hz: f64,
    /// Overrides each analysis' own number of periods.
    pub periods: Option<f64>,
    pub harmonic_counts: Vec<usize>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            periods: None,
            harmonic_counts: DEFAULT_HARMONIC_COUNTS.to_vec(),
        }
    }
}

impl AnalysisParams {
    fn periods_or(&self, default: f64) -> f64 {
        self.periods.unwrap_or(default)
    }
}

/// Where the analyses read their input files.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSources {
    pub data_dir: PathBuf,
    pub custom_spectrum: Option<PathBuf>,
}

impl DataSources {
    fn file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }
}

/// Run one analysis from scratch.  Nothing is shared between runs.
pub fn run(analysis: Analysis, sources: &DataSources, params: &AnalysisParams) -> Result<AnalysisReport> {
    log::info!("Running analysis '{analysis}'");
    let report = match analysis {
        Analysis::SquareWave => square_wave(&sources.file(SQUARE_FILE), params),
        Analysis::Temperatures => temperatures(
            &sources.file(TEMPERATURE_FILE),
            &sources.file(TEMPERATURE_SPECTRUM_FILE),
            params,
        ),
        Analysis::Mystery => mystery(
            &sources.file(MYSTERY_X_FILE),
            &sources.file(MYSTERY_Y_FILE),
            params,
        ),
        Analysis::LowPassSquare => lowpass_square(&sources.file(SQUARE_FILE), params),
        Analysis::Custom => {
            let path = sources
                .custom_spectrum
                .as_deref()
                .context("no custom spectrum opened")?;
            custom(path, params)
        }
    }
    .with_context(|| format!("analysis '{analysis}'"))?;

    log::info!("Analysis '{analysis}' produced {} figures", report.figures.len());
    Ok(report)
}

// ---------------------------------------------------------------------------
// Individual analyses
// ---------------------------------------------------------------------------

/// The square wave rebuilt from an increasing number of harmonics.
fn square_wave(path: &Path, params: &AnalysisParams) -> Result<AnalysisReport> {
    let spectrum = load_spectrum(path)?;
    let periods = params.periods_or(DEFAULT_PERIODS);

    let mut figures = Vec::new();
    for &requested in &params.harmonic_counts {
        let count = requested.clamp(2, spectrum.len().max(2));
        if count != requested {
            log::warn!("Square wave: {requested} harmonics requested, using {count}");
        }
        let signal = synthesize(&spectrum.truncated(count), periods)?;
        figures.push(
            Figure::new(format!("Square wave, {count} harmonics"), "Time (s)", "Signal")
                .with_series(Series::line(format!("{count} harmonics"), signal.points())),
        );
    }

    Ok(AnalysisReport {
        figures,
        spectra: vec![("square wave".to_string(), spectrum)],
    })
}

/// Measured temperatures against their reconstruction, and the spectrum itself.
fn temperatures(record_path: &Path, spectrum_path: &Path, params: &AnalysisParams) -> Result<AnalysisReport> {
    let record = load_time_series(record_path)?;
    let spectrum = load_spectrum(spectrum_path)?;
    let rebuilt = synthesize(&spectrum, params.periods_or(1.0))?;

    let comparison = Figure::new("Marseille temperatures", "Time (days)", "Temperature (°C)")
        .with_series(Series::line("measured", record.points()))
        .with_series(Series::line("spectrum", rebuilt.points()))
        .with_legend();

    let bars = Figure::new("Temperature spectrum", "Frequency (1/day)", "Amplitude (°C)")
        .with_series(Series::bars(
            "amplitude",
            spectrum.frequencies().to_vec(),
            spectrum.amplitudes().to_vec(),
            TEMPERATURE_BAR_WIDTH,
        ));

    Ok(AnalysisReport {
        figures: vec![comparison, bars],
        spectra: vec![("temperatures".to_string(), spectrum)],
    })
}

/// Two unknown signals, over time and against each other.
fn mystery(x_path: &Path, y_path: &Path, params: &AnalysisParams) -> Result<AnalysisReport> {
    let x_spectrum = load_spectrum(x_path)?;
    let y_spectrum = load_spectrum(y_path)?;
    let periods = params.periods_or(2.0);
    let x = synthesize(&x_spectrum, periods)?;
    let y = synthesize(&y_spectrum, periods)?;

    let over_time = Figure::new("Mystery signals", "Time (s)", "Signal")
        .with_series(Series::line("x", x.points()))
        .with_series(Series::line("y", y.points()))
        .with_legend();

    if x.is_empty() || y.is_empty() {
        log::warn!("Mystery: a signal has no samples, y(x) will be empty");
    } else if x.len() != y.len() {
        log::warn!(
            "Mystery: x has {} samples, y has {}; pairing the first {}",
            x.len(),
            y.len(),
            x.len().min(y.len())
        );
    }
    let parametric: Vec<[f64; 2]> = x
        .values
        .iter()
        .zip(&y.values)
        .map(|(&xv, &yv)| [xv, yv])
        .collect();
    let mut phase_plot = Figure::new("Mystery signals, y(x)", "x", "y")
        .with_series(Series::line("y(x)", parametric));
    phase_plot.data_aspect = Some(1.0);

    Ok(AnalysisReport {
        figures: vec![over_time, phase_plot],
        spectra: vec![("x".to_string(), x_spectrum), ("y".to_string(), y_spectrum)],
    })
}

/// The square wave before and after both low-pass filters.
fn lowpass_square(path: &Path, params: &AnalysisParams) -> Result<AnalysisReport> {
    let spectrum = load_spectrum(path)?;
    let periods = params.periods_or(4.0);
    filtered_comparison(
        spectrum,
        "square wave",
        format!("Square wave before/after {} Hz low-pass", params.cutoff_hz),
        periods,
        params.cutoff_hz,
    )
}

/// A user-chosen spectrum: filtered comparison plus its amplitude bars.
fn custom(path: &Path, params: &AnalysisParams) -> Result<AnalysisReport> {
    let spectrum = load_spectrum(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("custom")
        .to_string();

    let mut report = filtered_comparison(
        spectrum.clone(),
        &name,
        format!("{name} before/after {} Hz low-pass", params.cutoff_hz),
        params.periods_or(DEFAULT_PERIODS),
        params.cutoff_hz,
    )?;
    report.figures.push(
        Figure::new(format!("{name} spectrum"), "Frequency (Hz)", "Amplitude").with_series(
            Series::bars(
                "amplitude",
                spectrum.frequencies().to_vec(),
                spectrum.amplitudes().to_vec(),
                bar_width(spectrum.frequencies()),
            ),
        ),
    );
    Ok(report)
}

fn filtered_comparison(
    spectrum: Spectrum,
    name: &str,
    title: String,
    periods: f64,
    cutoff_hz: f64,
) -> Result<AnalysisReport> {
    let first = LowPass::first_order(cutoff_hz)?;
    let second = LowPass::second_order(cutoff_hz)?;
    let filtered_1 = first.apply(&spectrum);
    let filtered_2 = second.apply(&spectrum);

    let figure = Figure::new(title, "Time (s)", "Signal")
        .with_series(
            Series::line("unfiltered", synthesize(&spectrum, periods)?.points())
                .with_color(REFERENCE_GREY),
        )
        .with_series(Series::line("filter 1", synthesize(&filtered_1, periods)?.points()))
        .with_series(Series::line("filter 2", synthesize(&filtered_2, periods)?.points()))
        .with_legend();

    Ok(AnalysisReport {
        figures: vec![figure],
        spectra: vec![
            (name.to_string(), spectrum),
            (format!("{name}, {first}"), filtered_1),
            (format!("{name}, {second}"), filtered_2),
        ],
    })
}

/// 80 % of the narrowest gap between neighbouring frequencies.
fn bar_width(frequencies: &[f64]) -> f64 {
    frequencies
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > 0.0)
        .fold(None, |min: Option<f64>, gap| Some(min.map_or(gap, |m| m.min(gap))))
        .map_or(1.0, |gap| gap * 0.8)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::fs;

    use approx::assert_abs_diff_eq;

    use super::*;

    /// Odd harmonics of a 50 Hz unit square wave, with a DC row.
    fn write_square(dir: &Path, n: usize) {
        let mut text = String::from("f A phi\n0 0 0\n");
        for k in 0..n {
            let order = (2 * k + 1) as f64;
            text.push_str(&format!("{} {} {}\n", 50.0 * order, 4.0 / (PI * order), -FRAC_PI_2));
        }
        fs::write(dir.join(SQUARE_FILE), text).unwrap();
    }

    fn sources(dir: &Path) -> DataSources {
        DataSources {
            data_dir: dir.to_path_buf(),
            custom_spectrum: None,
        }
    }

    fn line(series: &Series) -> &[[f64; 2]] {
        match &series.kind {
            SeriesKind::Line(points) => points,
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn square_wave_one_figure_per_count() {
        let dir = tempfile::tempdir().unwrap();
        write_square(dir.path(), 60);

        let report = run(Analysis::SquareWave, &sources(dir.path()), &AnalysisParams::default()).unwrap();
        let titles: Vec<&str> = report.figures.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Square wave, 2 harmonics",
                "Square wave, 5 harmonics",
                "Square wave, 20 harmonics",
                "Square wave, 51 harmonics"
            ]
        );
    }

    #[test]
    fn square_wave_clamps_to_available_harmonics() {
        let dir = tempfile::tempdir().unwrap();
        write_square(dir.path(), 9);

        let report = run(Analysis::SquareWave, &sources(dir.path()), &AnalysisParams::default()).unwrap();
        assert_eq!(report.figures.last().unwrap().title, "Square wave, 10 harmonics");
    }

    #[test]
    fn lowpass_square_has_three_curves() {
        let dir = tempfile::tempdir().unwrap();
        write_square(dir.path(), 25);

        let report = run(Analysis::LowPassSquare, &sources(dir.path()), &AnalysisParams::default()).unwrap();
        assert_eq!(report.figures.len(), 1);
        let fig = &report.figures[0];
        assert!(fig.legend);
        let names: Vec<&str> = fig.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["unfiltered", "filter 1", "filter 2"]);
        assert_eq!(fig.series[0].color, Some(REFERENCE_GREY));

        // Filtering never changes the sampling grid.
        let n = line(&fig.series[0]).len();
        assert!(fig.series.iter().all(|s| line(s).len() == n));

        // Filtered spectra keep every harmonic, DC included.
        assert_eq!(report.spectra.len(), 3);
        assert!(report.spectra.iter().all(|(_, sp)| sp.len() == 26));
    }

    #[test]
    fn infinite_cutoff_leaves_square_untouched() {
        let dir = tempfile::tempdir().unwrap();
        write_square(dir.path(), 5);

        let params = AnalysisParams {
            cutoff_hz: f64::INFINITY,
            ..AnalysisParams::default()
        };
        let report = run(Analysis::LowPassSquare, &sources(dir.path()), &params).unwrap();
        let fig = &report.figures[0];
        let reference = line(&fig.series[0]);
        for s in &fig.series[1..] {
            for (a, b) in reference.iter().zip(line(s)) {
                assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn temperatures_line_and_bars() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TEMPERATURE_FILE), "t T\n0 8\n100 15\n200 24\n300 13\n").unwrap();
        fs::write(
            dir.path().join(TEMPERATURE_SPECTRUM_FILE),
            "f A phi\n0 15 0\n0.00274 8 3.1\n0.00548 1 0\n",
        )
        .unwrap();

        let report = run(Analysis::Temperatures, &sources(dir.path()), &AnalysisParams::default()).unwrap();
        assert_eq!(report.figures.len(), 2);
        assert_eq!(line(&report.figures[0].series[0]).len(), 4);
        match &report.figures[1].series[0].kind {
            SeriesKind::Bars { centers, heights, width } => {
                assert_eq!(centers.len(), 3);
                assert_eq!(heights, &[15.0, 8.0, 1.0]);
                assert_eq!(*width, TEMPERATURE_BAR_WIDTH);
            }
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn mystery_pairs_x_and_y() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MYSTERY_X_FILE), "f A phi\n0 0 0\n1 1 0\n").unwrap();
        fs::write(dir.path().join(MYSTERY_Y_FILE), "f A phi\n0 0 0\n1 1 -1.5707963267948966\n").unwrap();

        let report = run(Analysis::Mystery, &sources(dir.path()), &AnalysisParams::default()).unwrap();
        let phase_plot = &report.figures[1];
        assert_eq!(phase_plot.data_aspect, Some(1.0));
        // cos and sin of the same angle trace the unit circle.
        for p in line(&phase_plot.series[0]) {
            assert_abs_diff_eq!(p[0].hypot(p[1]), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn missing_file_names_the_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(Analysis::Mystery, &sources(dir.path()), &AnalysisParams::default()).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Mystery signal"), "{msg}");
        assert!(msg.contains(MYSTERY_X_FILE), "{msg}");
    }

    #[test]
    fn custom_needs_a_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(Analysis::Custom, &sources(dir.path()), &AnalysisParams::default()).is_err());

        let path = dir.path().join("triangle.csv");
        fs::write(&path, "frequency,amplitude,phase\n10,1,0\n30,0.11,0\n50,0.04,0\n").unwrap();
        let with_custom = DataSources {
            custom_spectrum: Some(path),
            ..sources(dir.path())
        };
        let report = run(Analysis::Custom, &with_custom, &AnalysisParams::default()).unwrap();
        assert_eq!(report.figures.len(), 2);
        assert_eq!(report.figures[1].title, "triangle spectrum");
    }

    #[test]
    fn bar_width_uses_narrowest_gap() {
        assert_abs_diff_eq!(bar_width(&[0.0, 10.0, 15.0, 40.0]), 4.0, epsilon = 1e-12);
        assert_eq!(bar_width(&[5.0]), 1.0);
    }
}
