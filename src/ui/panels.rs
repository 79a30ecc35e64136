use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::filter::{FilterState, Selection};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    if let Some(logo) = &state.logo {
        let uri = format!("file://{}", logo.display());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.heading("Filter Options");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the combo boxes.
    let options = state.options.clone();
    let mut city = state.filters.city.clone();
    let mut year = state.filters.year.clone();
    let mut month = state.filters.month.clone();

    ui.strong("Select City 📋");
    egui::ComboBox::from_id_salt("city_filter")
        .selected_text(city.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut city, Selection::All, "All");
            for c in &options.cities {
                ui.selectable_value(&mut city, Selection::Only(c.clone()), c.as_str());
            }
        });
    ui.add_space(6.0);

    ui.strong("Select Year 📋");
    egui::ComboBox::from_id_salt("year_filter")
        .selected_text(year.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut year, Selection::All, "All");
            for y in &options.years {
                ui.selectable_value(&mut year, Selection::Only(*y), y.to_string());
            }
        });
    ui.add_space(6.0);

    ui.strong("Select Month 📋");
    egui::ComboBox::from_id_salt("month_filter")
        .selected_text(month.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut month, Selection::All, "All");
            for m in &options.months {
                ui.selectable_value(&mut month, Selection::Only(m.clone()), m.as_str());
            }
        });

    state.set_city(city);
    state.set_year(year);
    state.set_month(month);

    ui.add_space(8.0);
    if ui.button("Reset filters").clicked() {
        state.clear_filters();
    }

    ui.separator();
    ui.label(
        RichText::new(format!(
            "{} of {} transactions",
            state.visible_indices.len(),
            state.dataset.as_ref().map_or(0, |ds| ds.len())
        ))
        .weak(),
    );
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

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(raw) => {
                let dataset = crate::data::normalize::normalize_dataset(raw);
                state.set_dataset(dataset, FilterState::default());
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
