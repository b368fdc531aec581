use eframe::egui::{self, Ui};
use egui_plot::{Bar, BarChart, Corner, Legend, Line, Plot, PlotPoints};

use crate::analysis::{Figure, SeriesKind};
use crate::color::ColorMap;
use crate::state::AppState;

/// Smallest height a figure gets before the panel starts scrolling.
const MIN_FIGURE_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// Figure stack (central panel)
// ---------------------------------------------------------------------------

/// Render every figure of the current report, stacked vertically.
pub fn figures(ui: &mut Ui, state: &AppState) {
    let report = match &state.report {
        Some(report) => report,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Pick a data folder to run the analyses  (File → Open data folder…)");
            });
            return;
        }
    };

    let n = report.figures.len().max(1);
    // Leave room for each figure's title.
    let per_figure = (ui.available_height() / n as f32 - 28.0).max(MIN_FIGURE_HEIGHT);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (index, figure) in report.figures.iter().enumerate() {
                ui.strong(&figure.title);
                figure_plot(ui, index, figure, per_figure);
                ui.add_space(6.0);
            }
        });
}

/// Render one figure.
fn figure_plot(ui: &mut Ui, index: usize, figure: &Figure, height: f32) {
    let color_map = ColorMap::new(figure.series.iter().map(|s| s.name.as_str()));

    let mut plot = Plot::new(("figure", index, figure.title.as_str()))
        .height(height)
        .x_axis_label(figure.x_label.as_str())
        .y_axis_label(figure.y_label.as_str())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);
    if figure.legend {
        plot = plot.legend(Legend::default().position(Corner::RightBottom));
    }
    if let Some(aspect) = figure.data_aspect {
        plot = plot.data_aspect(aspect);
    }

    plot.show(ui, |plot_ui| {
        for series in &figure.series {
            let color = series
                .color
                .unwrap_or_else(|| color_map.color_for(&series.name));

            match &series.kind {
                SeriesKind::Line(points) => {
                    let line = Line::new(PlotPoints::from(points.clone()))
                        .name(&series.name)
                        .color(color)
                        .width(1.5);
                    plot_ui.line(line);
                }
                SeriesKind::Bars {
                    centers,
                    heights,
                    width,
                } => {
                    let bars: Vec<Bar> = centers
                        .iter()
                        .zip(heights)
                        .map(|(&x, &h)| Bar::new(x, h).width(*width))
                        .collect();
                    plot_ui.bar_chart(BarChart::new(bars).name(&series.name).color(color));
                }
            }
        }
    });
}
