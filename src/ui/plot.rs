use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Dose plot (central panel)
// ---------------------------------------------------------------------------

/// Render every visible curve as one line.
pub fn dose_plot(ui: &mut Ui, state: &AppState) {
    if state.files.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a .mcc file to view curves  (File → Open…)");
        });
        return;
    }

    let multiple_files = state.files.len() > 1;

    Plot::new("dose_plot")
        .legend(Legend::default())
        .x_axis_label("Distance [mm]")
        .y_axis_label(format!("Dose ({} normalisation)", state.config.normalisation))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for &(file_idx, curve_idx) in &state.visible {
                let file = &state.files[file_idx];
                let scan = &file.curves.scans[curve_idx];

                let name = if multiple_files {
                    format!("{} {}", file.label(), scan.label())
                } else {
                    scan.label()
                };

                let points: PlotPoints = scan
                    .distance
                    .iter()
                    .zip(&scan.dose)
                    .map(|(&x, &y)| [x, y])
                    .collect();

                let line = Line::new(points)
                    .name(&name)
                    .color(state.color_map.color_for(file_idx, scan))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}
