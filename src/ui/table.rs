use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export::ExportKind;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// A two-column grid of label → value rows.
pub fn pair_grid<V: ToString>(ui: &mut Ui, id: &str, headers: [&str; 2], rows: &[(String, V)]) {
    egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        ui.strong(headers[0]);
        ui.strong(headers[1]);
        ui.end_row();
        for (label, value) in rows {
            ui.label(label.as_str());
            ui.label(value.to_string());
            ui.end_row();
        }
    });
}

/// "Download Data" button that saves one export table through a save dialog.
pub fn download_button(ui: &mut Ui, state: &mut AppState, kind: ExportKind) {
    if !ui.button("📥 Download Data").clicked() {
        return;
    }
    let Some(path) = rfd::FileDialog::new()
        .set_title("Save CSV")
        .set_file_name(kind.file_name())
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };
    if let Err(e) = state.export_to(kind, &path) {
        log::error!("Failed to export {}: {e:#}", kind.file_name());
        state.status_message = Some(format!("Error: {e:#}"));
    }
}

/// The detailed transaction table: every input column of the visible rows,
/// led by the original row index.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = state.dataset.as_deref() else {
        return;
    };
    let rows = &state.visible_indices;
    if rows.is_empty() {
        ui.label(RichText::new("No transactions match the current filters.").weak());
        return;
    }

    ui.push_id("transaction_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(320.0)
            .column(Column::auto())
            .columns(Column::auto().resizable(true), dataset.columns.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|ui| {
                    ui.strong("");
                });
                for name in &dataset.columns {
                    header.col(|ui| {
                        ui.strong(name.as_str());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let Some(record) = rows.get(row.index()).and_then(|&i| dataset.records.get(i))
                    else {
                        return;
                    };
                    row.col(|ui| {
                        ui.label(record.index.to_string());
                    });
                    for name in &dataset.columns {
                        row.col(|ui| {
                            ui.label(record.cell_text(name, &dataset.kinds));
                        });
                    }
                });
            });
    });
}
