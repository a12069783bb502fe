use carbon_dashboard::data::model::ProjectTable;
use carbon_dashboard::data::schema::{Field, FieldKind};
use carbon_dashboard::state::AppState;
use eframe::egui::{self, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use super::plot::no_data;

/// Columns shown in the project table, in display order.
const TABLE_FIELDS: [Field; 12] = [
    Field::ProjectId,
    Field::ProjectName,
    Field::VoluntaryRegistry,
    Field::Scope,
    Field::Type,
    Field::ReductionRemoval,
    Field::Region,
    Field::Country,
    Field::TotalCreditsIssued,
    Field::TotalCreditsRetired,
    Field::TotalCreditsRemaining,
    Field::FirstVintageYear,
];

/// Text of one cell. Absent text fields and years render empty.
pub fn cell_text(table: &ProjectTable, row: usize, field: Field) -> String {
    let record = &table.records[row];
    match field.kind() {
        FieldKind::Measure => format!("{:.0}", record.measure(field)),
        FieldKind::Year => record
            .first_vintage_year
            .map(|y| y.to_string())
            .unwrap_or_default(),
        _ => record.attribute(field).unwrap_or_default().to_string(),
    }
}

/// Filtered projects, narrowed further by the Project ID search box.
pub fn project_table(ui: &mut Ui, table: &ProjectTable, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search Project ID:");
        ui.text_edit_singleline(&mut state.project_id_query);
    });

    let rows = state.table_indices();
    ui.label(format!(
        "Showing {} of {} filtered projects",
        rows.len(),
        state.visible_indices.len()
    ));
    if rows.is_empty() {
        no_data(ui);
        return;
    }

    let columns: Vec<Field> = TABLE_FIELDS
        .into_iter()
        .filter(|&f| table.has_column(f))
        .collect();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(egui::Align::Center))
        .columns(Column::initial(120.0).at_least(40.0).clip(true), columns.len())
        .max_scroll_height(f32::INFINITY)
        .header(22.0, |mut header| {
            for field in &columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(field.raw_label());
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let index = rows[row.index()];
                for &field in &columns {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell_text(table, index, field));
                    });
                }
            });
        });
}
