use carbon_dashboard::config::Cli;
use carbon_dashboard::state::AppState;
use eframe::egui;

use crate::ui::{map, panels, plot, sunburst, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Overview,
    Projects,
    Countries,
    Vintage,
}

pub struct CarbonDashboardApp {
    pub state: AppState,
    cli: Cli,
    tab: Tab,
    map: map::MapView,
}

impl CarbonDashboardApp {
    pub fn new(state: AppState, cli: Cli) -> Self {
        Self {
            state,
            cli,
            tab: Tab::Overview,
            map: map::MapView::default(),
        }
    }
}

impl eframe::App for CarbonDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.cli);
        });

        // ---- Left side panel: filters ----
        // Drawn before the central panel so charts see this frame's filters.
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(projects) = self.state.dataset.clone() else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a project spreadsheet to begin  (File → Open…)");
                });
                return;
            };

            plot::stats_cards(ui, &projects, &self.state.visible_indices);
            ui.separator();

            ui.horizontal(|ui| {
                ui.selectable_value(&mut self.tab, Tab::Overview, "Overview");
                ui.selectable_value(&mut self.tab, Tab::Projects, "Projects");
                ui.selectable_value(&mut self.tab, Tab::Countries, "Countries");
                ui.selectable_value(&mut self.tab, Tab::Vintage, "Vintage");
            });
            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.tab {
                    Tab::Overview => {
                        plot::overview(ui, &projects, &self.state);
                        sunburst::sunbursts(ui, &projects, &self.state.visible_indices);
                    }
                    Tab::Projects => table::project_table(ui, &projects, &mut self.state),
                    Tab::Countries => self.map.show(ui, &projects, &mut self.state),
                    Tab::Vintage => plot::vintage(ui, &projects, &self.state),
                });
        });
    }
}
