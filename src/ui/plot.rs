use carbon_dashboard::color::{generate_palette, ColorMap};
use carbon_dashboard::data::aggregate::{
    credits_by_group, crosstab, summary, top_countries, value_counts, vintage_series, CreditsRow,
    CrossTab, RegistryPivot, REGISTRY_ALIASES,
};
use carbon_dashboard::data::model::ProjectTable;
use carbon_dashboard::data::schema::Field;
use carbon_dashboard::state::AppState;
use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, PlotUi, Points};

const CHART_HEIGHT: f32 = 260.0;

/// Shown in place of any chart whose input is empty.
pub const NO_DATA: &str = "No data to display. Adjust your filters.";

pub fn no_data(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.label(RichText::new(NO_DATA).italics().color(Color32::GRAY));
    ui.add_space(8.0);
}

/// Axis text for category charts: the label at integer positions, nothing
/// in between.
pub fn category_label(labels: &[String], value: f64) -> String {
    let index = value.round();
    if (value - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

/// Compact number for cards: 1 234 567 → "1.23M".
pub fn format_quantity(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

/// Plot with one category per integer x position.
fn category_plot(ui: &mut Ui, id: &str, labels: Vec<String>, build: impl FnOnce(&mut PlotUi)) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_scroll(false)
        .allow_drag(false)
        .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, build);
}

/// Stack `charts` in order: each sits on all the ones before it.
fn stacked(charts: Vec<BarChart>) -> Vec<BarChart> {
    let mut out: Vec<BarChart> = Vec::with_capacity(charts.len());
    for chart in charts {
        let below: Vec<&BarChart> = out.iter().collect();
        let chart = chart.stack_on(&below);
        out.push(chart);
    }
    out
}

// ---------------------------------------------------------------------------
// Headline cards
// ---------------------------------------------------------------------------

pub fn stats_cards(ui: &mut Ui, table: &ProjectTable, indices: &[usize]) {
    let s = summary(table, indices);
    ui.horizontal(|ui: &mut Ui| {
        card(ui, "Projects", s.projects.to_string());
        card(ui, "Credits issued", format_quantity(s.credits_issued));
        card(ui, "Credits retired", format_quantity(s.credits_retired));
        card(ui, "Countries", s.countries.to_string());
    });
}

fn card(ui: &mut Ui, title: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(140.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(title).small());
            ui.label(RichText::new(value).heading().strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Overview tab
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, table: &ProjectTable, state: &AppState) {
    let indices = &state.visible_indices;

    ui.heading("Projects by registry");
    count_bars(
        ui,
        "registry_counts",
        &value_counts(table, indices, Field::VoluntaryRegistry),
        state.registry_colors.as_ref(),
    );

    ui.heading("Reduction vs. removal");
    count_bars(
        ui,
        "redrem_counts",
        &value_counts(table, indices, Field::ReductionRemoval),
        None,
    );

    ui.heading("Credits by reduction / removal");
    credits_chart(ui, &credits_by_group(table, indices, Field::ReductionRemoval));

    ui.heading("Registry × reduction / removal");
    crosstab_chart(
        ui,
        "registry_redrem",
        &crosstab(table, indices, Field::VoluntaryRegistry, Field::ReductionRemoval),
    );
}

/// One bar per category value.
pub fn count_bars(ui: &mut Ui, id: &str, counts: &[(String, usize)], colors: Option<&ColorMap>) {
    if counts.is_empty() {
        no_data(ui);
        return;
    }

    let fallback = generate_palette(counts.len());
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (value, n))| {
            let fill = colors.map_or(fallback[i], |c| c.color_for(value));
            Bar::new(i as f64, *n as f64).name(value).fill(fill)
        })
        .collect();
    let labels = counts.iter().map(|(value, _)| value.clone()).collect();

    category_plot(ui, id, labels, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).name("Projects"));
    });
}

/// Retired and remaining credits stacked, issued drawn on top as a line.
pub fn credits_chart(ui: &mut Ui, rows: &[CreditsRow]) {
    if rows.is_empty() {
        no_data(ui);
        return;
    }

    let retired: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| Bar::new(i as f64, r.retired).name(&r.group))
        .collect();
    let remaining: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| Bar::new(i as f64, r.remaining).name(&r.group))
        .collect();
    let issued: Vec<[f64; 2]> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| [i as f64, r.issued])
        .collect();

    let charts = stacked(vec![
        BarChart::new(retired)
            .name("Retired")
            .color(Color32::from_rgb(46, 139, 87)),
        BarChart::new(remaining)
            .name("Remaining")
            .color(Color32::from_rgb(100, 149, 237)),
    ]);
    let labels = rows.iter().map(|r| r.group.clone()).collect();

    category_plot(ui, "credits_by_group", labels, |plot_ui| {
        for chart in charts {
            plot_ui.bar_chart(chart);
        }
        plot_ui.line(
            Line::new(PlotPoints::from(issued.clone()))
                .name("Issued")
                .color(Color32::from_rgb(255, 140, 0))
                .width(2.0),
        );
        plot_ui.points(
            Points::new(PlotPoints::from(issued))
                .name("Issued")
                .color(Color32::from_rgb(255, 140, 0))
                .radius(4.0),
        );
    });
}

/// Stacked bars: one bar per row value, one segment per column value.
pub fn crosstab_chart(ui: &mut Ui, id: &str, table: &CrossTab) {
    if table.is_empty() {
        no_data(ui);
        return;
    }

    let palette = generate_palette(table.columns.len());
    let charts = stacked(
        table
            .columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                let bars = table
                    .column(c)
                    .into_iter()
                    .enumerate()
                    .map(|(r, n)| Bar::new(r as f64, n as f64).name(&table.rows[r]))
                    .collect();
                BarChart::new(bars).name(name).color(palette[c])
            })
            .collect(),
    );

    category_plot(ui, id, table.rows.clone(), |plot_ui| {
        for chart in charts {
            plot_ui.bar_chart(chart);
        }
    });
}

// ---------------------------------------------------------------------------
// Vintage tab
// ---------------------------------------------------------------------------

/// Projects started per first-vintage year, one line per registry.
pub fn vintage(ui: &mut Ui, table: &ProjectTable, state: &AppState) {
    ui.heading("Project starts by vintage year");
    let series = vintage_series(table, &state.visible_indices);
    if series.is_empty() {
        no_data(ui);
        return;
    }

    let colors = state.registry_colors.as_ref();
    Plot::new("vintage_series")
        .height(CHART_HEIGHT * 1.5)
        .legend(Legend::default())
        .x_axis_label("First vintage year")
        .y_axis_label("Projects")
        .show(ui, |plot_ui| {
            for (registry, counts) in &series.series {
                let points: PlotPoints = series
                    .years
                    .iter()
                    .zip(counts)
                    .map(|(&year, &n)| [year as f64, n as f64])
                    .collect();
                let mut line = Line::new(points).name(registry).width(1.5);
                if let Some(c) = colors {
                    line = line.color(c.color_for(registry));
                }
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Countries tab
// ---------------------------------------------------------------------------

/// Horizontal bars for the top countries, stacked by registry alias.
pub fn top_countries_chart(ui: &mut Ui, pivot: &RegistryPivot, n: usize) {
    let top = top_countries(pivot, n);
    if top.is_empty() {
        no_data(ui);
        return;
    }

    // Largest at the top of the plot.
    let order: Vec<usize> = top.into_iter().rev().collect();
    let palette = generate_palette(REGISTRY_ALIASES.len());
    let charts = stacked(
        REGISTRY_ALIASES
            .iter()
            .enumerate()
            .map(|(a, (alias, _))| {
                let bars = order
                    .iter()
                    .enumerate()
                    .map(|(y, &country)| {
                        Bar::new(y as f64, pivot.counts[country][a] as f64)
                            .name(&pivot.countries[country].country)
                    })
                    .collect();
                BarChart::new(bars)
                    .name(*alias)
                    .color(palette[a])
                    .horizontal()
            })
            .collect(),
    );
    let labels: Vec<String> = order
        .iter()
        .map(|&country| pivot.countries[country].country.clone())
        .collect();

    Plot::new("top_countries")
        .height(20.0 * labels.len() as f32 + 60.0)
        .legend(Legend::default())
        .allow_scroll(false)
        .allow_drag(false)
        .y_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_label_integer_positions_only() {
        let labels = vec!["GOLD".to_string(), "VCS".to_string()];
        assert_eq!(category_label(&labels, 0.0), "GOLD");
        assert_eq!(category_label(&labels, 1.0), "VCS");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 2.0), "");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(950.0), "950");
        assert_eq!(format_quantity(12_300.0), "12.3K");
        assert_eq!(format_quantity(1_234_567.0), "1.23M");
        assert_eq!(format_quantity(2.5e9), "2.50B");
    }
}
