use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use crate::color::ColorMap;
use crate::config::DataSourceConfig;
use crate::data::aggregate::filter_by_project_id;
use crate::data::filter::{
    apply_point_selection, apply_select_all, clear_on_parent_change, compute_options,
    filtered_indices, reconcile, Dimension, FilterState, SelectionStatus,
};
use crate::data::model::ProjectTable;
use crate::data::schema::Field;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Every user event maps to one method here. Each method mutates the filter
/// selections and then calls [`AppState::refilter`], which reconciles the
/// derived state before recomputing the visible rows, so widgets rendered
/// afterwards never see stale option lists.
#[derive(Default)]
pub struct AppState {
    /// Loaded table (None until a source is loaded).
    pub dataset: Option<Arc<ProjectTable>>,

    /// Where `dataset` came from.
    pub source: Option<DataSourceConfig>,

    /// Per-dimension filter selections.
    pub filters: FilterState,

    /// Indices of projects passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Project ID search for the table view. Charts ignore it.
    pub project_id_query: String,

    /// One colour per registry, stable across filter changes.
    pub registry_colors: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded table and start over with no filters.
    pub fn set_dataset(&mut self, table: Arc<ProjectTable>, source: DataSourceConfig) {
        self.registry_colors = Some(ColorMap::new(
            Field::VoluntaryRegistry.key(),
            &table.distinct_values(Field::VoluntaryRegistry),
        ));
        self.filters = FilterState::default();
        self.project_id_query.clear();
        self.dataset = Some(table);
        self.source = Some(source);
        self.status_message = None;
        self.refilter();
    }

    /// Reconcile the selections, then recompute `visible_indices`.
    pub fn refilter(&mut self) {
        let Some(table) = &self.dataset else {
            self.visible_indices.clear();
            return;
        };
        reconcile(table, &mut self.filters);
        self.visible_indices = filtered_indices(table, &self.filters);
        if self.visible_indices.is_empty() {
            debug!("Current filters match no projects");
        }
    }

    /// Legal values for a dimension under the current parent selections.
    pub fn options(&self, dim: Dimension) -> BTreeSet<String> {
        match &self.dataset {
            Some(table) => compute_options(table, &self.filters, dim),
            None => BTreeSet::new(),
        }
    }

    pub fn status(&self, dim: Dimension) -> SelectionStatus {
        self.filters.status(dim)
    }

    /// Toggle a single value in a dimension's filter.
    pub fn toggle_filter_value(&mut self, dim: Dimension, value: &str) {
        if self.filters.toggle(dim, value) {
            clear_on_parent_change(&mut self.filters, dim);
        }
        self.refilter();
    }

    /// Replace a dimension's selection wholesale.
    pub fn set_selection(&mut self, dim: Dimension, values: BTreeSet<String>) {
        if self.filters.set_selection(dim, values) {
            clear_on_parent_change(&mut self.filters, dim);
        }
        self.refilter();
    }

    /// The "select all for every filter" checkbox. Unticking keeps the
    /// filled selections as explicit choices.
    pub fn set_select_all(&mut self, enabled: bool) {
        match (&self.dataset, enabled) {
            (Some(table), true) => apply_select_all(table, &mut self.filters),
            (_, false) => self.filters.release_select_all(),
            (None, true) => return,
        }
        self.refilter();
    }

    /// Select every legal value of one dimension.
    pub fn select_all_in(&mut self, dim: Dimension) {
        let options = self.options(dim);
        self.set_selection(dim, options);
    }

    /// Drop the explicit choice for one dimension.
    pub fn select_none(&mut self, dim: Dimension) {
        self.set_selection(dim, BTreeSet::new());
    }

    /// A click on a country (or any value outside the filter widgets).
    pub fn point_select(&mut self, dim: Dimension, value: &str) {
        debug!("Point selection {} = {value}", dim.label());
        apply_point_selection(&mut self.filters, dim, value);
        self.refilter();
    }

    /// "Reset all filters".
    pub fn reset(&mut self) {
        self.filters.reset();
        self.project_id_query.clear();
        self.refilter();
    }

    /// Rows for the project table: the visible rows narrowed by the Project
    /// ID search.
    pub fn table_indices(&self) -> Vec<usize> {
        match &self.dataset {
            Some(table) => filter_by_project_id(table, &self.visible_indices, &self.project_id_query),
            None => Vec::new(),
        }
    }
}
