use carbon_dashboard::color::continuous_color;
use carbon_dashboard::data::aggregate::{country_counts, registry_country_pivot, CountryCount, REGISTRY_ALIASES};
use carbon_dashboard::data::filter::Dimension;
use carbon_dashboard::data::model::ProjectTable;
use carbon_dashboard::state::AppState;
use eframe::egui::{self, Color32, RichText, Ui, Vec2};

use super::plot::{no_data, top_countries_chart};

const TOP_N: usize = 20;

/// Country view: a colour-scaled list standing in for a choropleth.
/// Clicking a country narrows the Country filter to it.
#[derive(Debug, Default)]
pub struct MapView {
    /// Index into `REGISTRY_ALIASES`; `None` counts every registry.
    registry: Option<usize>,
}

/// Position of `count` on the colour scale, log-scaled so a few very
/// large countries do not wash out the rest.
pub fn intensity(count: usize, max: usize) -> f32 {
    if max == 0 {
        return 0.0;
    }
    ((count as f32).ln_1p() / (max as f32).ln_1p()).clamp(0.0, 1.0)
}

impl MapView {
    pub fn show(&mut self, ui: &mut Ui, table: &ProjectTable, state: &mut AppState) {
        let pivot = registry_country_pivot(table, &state.visible_indices);

        ui.horizontal(|ui: &mut Ui| {
            ui.label("Projects per country for");
            let current = self.registry.map_or("all registries", |a| REGISTRY_ALIASES[a].0);
            egui::ComboBox::from_id_salt("map_registry")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut self.registry, None, "all registries");
                    for (a, (alias, _)) in REGISTRY_ALIASES.iter().enumerate() {
                        ui.selectable_value(&mut self.registry, Some(a), *alias);
                    }
                });
        });

        let counts: Vec<CountryCount> = match self.registry {
            None => country_counts(table, &state.visible_indices),
            Some(a) => {
                let mut counts: Vec<CountryCount> = pivot
                    .countries
                    .iter()
                    .zip(&pivot.counts)
                    .filter(|(_, by_registry)| by_registry[a] > 0)
                    .map(|(c, by_registry)| CountryCount {
                        count: by_registry[a],
                        ..c.clone()
                    })
                    .collect();
                counts.sort_by(|x, y| y.count.cmp(&x.count).then_with(|| x.country.cmp(&y.country)));
                counts
            }
        };

        ui.columns(2, |columns| {
            country_list(&mut columns[0], &counts, state);

            columns[1].heading(format!("Top {TOP_N} countries by registry"));
            top_countries_chart(&mut columns[1], &pivot, TOP_N);
        });
    }
}

fn country_list(ui: &mut Ui, counts: &[CountryCount], state: &mut AppState) {
    if counts.is_empty() {
        no_data(ui);
        return;
    }

    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    let selected = state.filters.selection(Dimension::Country).clone();
    let mut clicked: Option<String> = None;

    egui::Grid::new("country_list")
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            for c in counts {
                let (rect, _) = ui.allocate_exact_size(Vec2::splat(14.0), egui::Sense::hover());
                ui.painter()
                    .rect_filled(rect, 2.0, continuous_color(intensity(c.count, max)));

                let mut text = RichText::new(&c.normalized);
                if c.normalized != c.country {
                    text = RichText::new(format!("{} ({})", c.normalized, c.country));
                }
                if ui
                    .selectable_label(selected.contains(&c.country), text)
                    .on_hover_text("Filter to this country")
                    .clicked()
                {
                    clicked = Some(c.country.clone());
                }
                ui.label(RichText::new(c.count.to_string()).color(Color32::GRAY));
                ui.end_row();
            }
        });

    if let Some(country) = clicked {
        state.point_select(Dimension::Country, &country);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_bounds() {
        assert_eq!(intensity(0, 0), 0.0);
        assert_eq!(intensity(0, 10), 0.0);
        assert_eq!(intensity(10, 10), 1.0);
        let mid = intensity(3, 10);
        assert!(mid > 0.0 && mid < 1.0);
    }
}
