use std::path::PathBuf;

use crate::analysis::{self, Analysis, AnalysisParams, AnalysisReport, DataSources};
use crate::config::AppConfig;
use crate::dsp::synthesis::DEFAULT_PERIODS;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Analysis whose figures are shown.
    pub selected: Analysis,

    /// Parameters fed to every analysis run.
    pub params: AnalysisParams,

    /// Result of the last successful run (None until one succeeds).
    pub report: Option<AnalysisReport>,

    /// Index into `report.spectra` shown in the table.
    pub table_spectrum: usize,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Set when the report no longer matches selection or parameters.
    stale: bool,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let selected = if config.last_custom_spectrum.is_some() {
            Analysis::Custom
        } else {
            Analysis::SquareWave
        };
        let params = AnalysisParams {
            cutoff_hz: config.cutoff_hz,
            ..AnalysisParams::default()
        };
        Self {
            config,
            selected,
            params,
            report: None,
            table_spectrum: 0,
            status_message: None,
            stale: true,
        }
    }

    pub fn sources(&self) -> DataSources {
        DataSources {
            data_dir: self.config.data_dir.clone(),
            custom_spectrum: self.config.last_custom_spectrum.clone(),
        }
    }

    /// Analyses the user can pick from.
    pub fn available_analyses(&self) -> Vec<Analysis> {
        let mut all = Analysis::BUILT_IN.to_vec();
        if self.config.last_custom_spectrum.is_some() {
            all.push(Analysis::Custom);
        }
        all
    }

    pub fn select(&mut self, analysis: Analysis) {
        if self.selected != analysis {
            self.selected = analysis;
            self.table_spectrum = 0;
            self.stale = true;
        }
    }

    pub fn set_data_dir(&mut self, dir: PathBuf) {
        log::info!("Data directory set to {}", dir.display());
        self.config.data_dir = dir;
        self.config.save();
        self.stale = true;
    }

    pub fn set_custom_spectrum(&mut self, path: PathBuf) {
        self.config.last_custom_spectrum = Some(path);
        self.config.save();
        self.selected = Analysis::Custom;
        self.table_spectrum = 0;
        self.stale = true;
    }

    /// Not persisted here; the slider saves once the drag ends.
    pub fn set_cutoff(&mut self, cutoff_hz: f64) {
        self.params.cutoff_hz = cutoff_hz;
        self.config.cutoff_hz = cutoff_hz;
        self.stale = true;
    }

    /// Value the periods field shows: the override, else the synthesizer default.
    pub fn periods_or_default(&self) -> f64 {
        self.params.periods.unwrap_or(DEFAULT_PERIODS)
    }

    pub fn set_periods(&mut self, periods: Option<f64>) {
        self.params.periods = periods;
        self.stale = true;
    }

    pub fn set_harmonic_counts(&mut self, counts: Vec<usize>) {
        self.params.harmonic_counts = counts;
        self.stale = true;
    }

    /// Force the next `refresh` to rerun the analysis (e.g. files changed on disk).
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Rerun the selected analysis if anything changed since the last run.
    pub fn refresh(&mut self) {
        if !self.stale {
            return;
        }
        self.stale = false;

        match analysis::run(self.selected, &self.sources(), &self.params) {
            Ok(report) => {
                if self.table_spectrum >= report.spectra.len() {
                    self.table_spectrum = 0;
                }
                self.report = Some(report);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Analysis failed: {e:#}");
                self.report = None;
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
