use eframe::egui;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FourierLabApp {
    pub state: AppState,
}

impl FourierLabApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for FourierLabApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: analyses and parameters ----
        egui::SidePanel::left("control_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // Widgets above may have changed the selection or parameters.
        self.state.refresh();

        // ---- Bottom panel: harmonic table ----
        egui::TopBottomPanel::bottom("spectrum_table")
            .default_height(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::spectrum_table(ui, &mut self.state);
            });

        // ---- Central panel: figures ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figures(ui, &self.state);
        });
    }
}
