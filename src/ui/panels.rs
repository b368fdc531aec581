use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analysis::Analysis;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – analysis picker and parameters
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Analyses");
    ui.separator();

    for analysis in state.available_analyses() {
        if ui
            .selectable_label(state.selected == analysis, analysis.to_string())
            .clicked()
        {
            state.select(analysis);
        }
    }

    ui.add_space(8.0);
    ui.heading("Parameters");
    ui.separator();

    // ---- Low-pass cutoff ----
    let mut cutoff = state.params.cutoff_hz;
    let response = ui.add(
        egui::Slider::new(&mut cutoff, 1.0..=10_000.0)
            .logarithmic(true)
            .text("Cutoff (Hz)"),
    );
    if response.changed() {
        state.set_cutoff(cutoff);
    }
    // Persist once the user lets go rather than on every dragged frame.
    if response.drag_stopped() || (response.changed() && !response.dragged()) {
        state.config.save();
    }

    // ---- Periods override ----
    let mut override_periods = state.params.periods.is_some();
    let mut periods = state.periods_or_default();
    ui.horizontal(|ui: &mut Ui| {
        let toggled = ui.checkbox(&mut override_periods, "Periods").changed();
        let edited = ui
            .add_enabled(
                override_periods,
                egui::DragValue::new(&mut periods)
                    .range(0.5..=50.0)
                    .speed(0.1),
            )
            .changed();
        if toggled || edited {
            state.set_periods(override_periods.then_some(periods));
        }
    });

    // ---- Harmonic counts (square wave only) ----
    if state.selected == Analysis::SquareWave {
        let mut counts = state.params.harmonic_counts.clone();
        let mut changed = false;
        ui.label("Harmonics per figure");
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for count in counts.iter_mut() {
                changed |= ui
                    .add(egui::DragValue::new(count).range(2..=500))
                    .changed();
            }
        });
        if changed {
            state.set_harmonic_counts(counts);
        }
    }
}

// ---------------------------------------------------------------------------
// Bottom panel – spectrum table
// ---------------------------------------------------------------------------

/// Render the harmonic table of one of the report's spectra.
pub fn spectrum_table(ui: &mut Ui, state: &mut AppState) {
    let Some(report) = &state.report else {
        ui.label("No spectrum loaded.");
        return;
    };
    if report.spectra.is_empty() {
        return;
    }

    let mut choice = state.table_spectrum.min(report.spectra.len() - 1);
    egui::ComboBox::from_id_salt("table_spectrum")
        .selected_text(report.spectra[choice].0.as_str())
        .show_ui(ui, |ui: &mut Ui| {
            for (i, (name, _)) in report.spectra.iter().enumerate() {
                ui.selectable_value(&mut choice, i, name.as_str());
            }
        });

    let spectrum = &report.spectra[choice].1;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(100.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["#", "Frequency", "Amplitude", "Phase (rad)"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, spectrum.len(), |mut row| {
                let i = row.index();
                row.col(|ui: &mut Ui| {
                    ui.label(i.to_string());
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", spectrum.frequencies()[i]));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", spectrum.amplitudes()[i]));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format!("{:.4}", spectrum.phases()[i]));
                });
            });
        });

    state.table_spectrum = choice;
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open spectrum…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.invalidate();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(format!("Data: {}", state.config.data_dir.display()));

        if let Some(report) = &state.report {
            ui.separator();
            ui.label(format!("{} figures", report.figures.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open data folder")
        .set_directory(&state.config.data_dir)
        .pick_folder();

    if let Some(dir) = folder {
        state.set_data_dir(dir);
    }
}

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open spectrum")
        .set_directory(&state.config.data_dir)
        .add_filter("Supported files", &["dat", "txt", "csv", "json", "parquet", "pq"])
        .add_filter("Text table", &["dat", "txt"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Opening custom spectrum {}", path.display());
        state.set_custom_spectrum(path);
    }
}
