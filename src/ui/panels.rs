use carbon_dashboard::config::Cli;
use carbon_dashboard::data::filter::{Dimension, SelectionStatus};
use carbon_dashboard::data::loader::load_projects;
use carbon_dashboard::state::AppState;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // The bulk toggle comes first: everything below renders the state it
    // produces in the same frame.
    let mut select_all = state.filters.is_select_all();
    if ui
        .checkbox(&mut select_all, "Select all for every filter")
        .changed()
    {
        state.set_select_all(select_all);
    }
    let dirty = !state.filters.is_unrestricted() || !state.project_id_query.is_empty();
    if ui
        .add_enabled(dirty, egui::Button::new("Reset all filters"))
        .clicked()
    {
        state.reset();
    }
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                dimension_filter(ui, state, dim);
            }
        });
}

/// One collapsible checkbox list.
fn dimension_filter(ui: &mut Ui, state: &mut AppState, dim: Dimension) {
    let options = state.options(dim);
    if options.is_empty() {
        ui.label(RichText::new(format!("{}  (not in data)", dim.label())).weak());
        return;
    }

    let selected = state.filters.selection(dim).clone();
    let n_selected = selected.intersection(&options).count();
    let header_text = format!("{}  ({n_selected}/{})", dim.label(), options.len());

    let locked = state.filters.is_select_all();
    let collapsing = egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(dim.label())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if state.status(dim) == SelectionStatus::PrunedSubset {
                ui.label(
                    RichText::new("Some choices no longer match the filters above.")
                        .italics()
                        .small(),
                );
            }

            ui.add_enabled_ui(!locked, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.select_all_in(dim);
                    }
                    if ui.small_button("None").clicked() {
                        state.select_none(dim);
                    }
                });

                for value in &options {
                    let mut checked = selected.contains(value);
                    if ui.checkbox(&mut checked, value.as_str()).changed() {
                        state.toggle_filter_value(dim, value);
                    }
                }
            });
        });

    if !dim.children().is_empty() {
        let narrows: Vec<&str> = dim.children().iter().map(|d| d.label()).collect();
        collapsing
            .header_response
            .on_hover_text(format!("Narrows the {} options", narrows.join(" and ")));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, cli: &Cli) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state, cli);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.dataset {
            ui.label(format!(
                "{} projects loaded, {} visible",
                table.len(),
                state.visible_indices.len()
            ));

            if !table.schema_gaps.is_empty() {
                let missing: Vec<&str> = table.schema_gaps.iter().map(|f| f.raw_label()).collect();
                ui.separator();
                ui.label(
                    RichText::new(format!("{} columns missing", missing.len()))
                        .color(Color32::YELLOW),
                )
                .on_hover_text(missing.join("\n"));
            }
        }

        if let Some(source) = &state.source {
            ui.separator();
            ui.label(RichText::new(source.path.display().to_string()).weak());
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

pub fn open_file_dialog(state: &mut AppState, cli: &Cli) {
    let file = rfd::FileDialog::new()
        .set_title("Open project spreadsheet")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        let source = cli.source_for(path);
        match load_projects(&source) {
            Ok(table) => {
                log::info!(
                    "Opened {} projects with {} known columns",
                    table.len(),
                    table.columns.len()
                );
                state.set_dataset(table, source);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
