use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorBy;
use crate::data::model::CurveType;
use crate::data::normalise::NormalisationMode;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Curves");
    ui.separator();

    if state.files.is_empty() {
        ui.label("No file loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Curve-type filter ----
            ui.strong("Curve type");
            for kind in CurveType::ALL {
                let count: usize = state.files.iter().map(|f| f.curves.count(kind)).sum();
                let mut checked = state.filters.curve_types.contains(&kind);
                if ui
                    .checkbox(&mut checked, format!("{kind}  ({count})"))
                    .changed()
                {
                    state.toggle_curve_type(kind);
                }
            }
            ui.separator();

            // ---- Colour-by selector ----
            ui.strong("Color by");
            let current = state.color_map.color_by;
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(current.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for option in ColorBy::ALL {
                        if ui
                            .selectable_label(current == option, option.to_string())
                            .clicked()
                        {
                            state.rebuild_color_map(option);
                        }
                    }
                });

            if current != ColorBy::Curve {
                for (key, color) in state.color_map.legend_entries() {
                    ui.label(RichText::new(key).color(color));
                }
            }
            ui.separator();

            // ---- Files ----
            ui.strong("Files");
            let labels: Vec<(String, usize)> = state
                .files
                .iter()
                .map(|f| (f.label(), f.curves.len()))
                .collect();
            for (i, (label, n)) in labels.into_iter().enumerate() {
                let mut shown = !state.filters.hidden_files.contains(&i);
                if ui
                    .checkbox(&mut shown, format!("{label}  ({n})"))
                    .changed()
                {
                    state.toggle_file(i);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} curves loaded, {} visible",
            state.total_curves(),
            state.visible.len()
        ));

        ui.separator();

        let mode = state.config.normalisation;
        let reorder = state.config.reorder;
        egui::ComboBox::from_id_salt("normalisation")
            .selected_text(format!("Normalisation: {mode}"))
            .show_ui(ui, |ui: &mut Ui| {
                for option in NormalisationMode::ALL {
                    if ui
                        .selectable_label(mode == option, option.to_string())
                        .clicked()
                        && option != mode
                    {
                        state.apply_settings(option, reorder);
                    }
                }
            });

        if ui.selectable_label(reorder, "Group by type").clicked() {
            state.apply_settings(mode, !reorder);
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open Mephisto scan file")
        .add_filter("Mephisto", &["mcc"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
