mod analysis;
mod app;
mod color;
mod config;
mod data;
mod dsp;
mod state;
mod ui;

use app::FourierLabApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::load();
    log::info!("Reading data files from {}", config.data_dir.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fourier Lab – Synthesis & Low-pass",
        options,
        Box::new(|_cc| Ok(Box::new(FourierLabApp::new(config)))),
    )
}
