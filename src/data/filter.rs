use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::model::ProjectTable;
use super::schema::Field;

// ---------------------------------------------------------------------------
// Filter dimensions and their dependency order
// ---------------------------------------------------------------------------

/// A filterable column. Declaration order is the evaluation order: parents
/// always come before the dimensions that depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Region,
    Scope,
    Country,
    Type,
    Registry,
    ReductionRemoval,
}

impl Dimension {
    /// All dimensions in evaluation order.
    pub const ALL: [Dimension; 6] = [
        Dimension::Region,
        Dimension::Scope,
        Dimension::Country,
        Dimension::Type,
        Dimension::Registry,
        Dimension::ReductionRemoval,
    ];

    pub fn field(self) -> Field {
        match self {
            Dimension::Region => Field::Region,
            Dimension::Scope => Field::Scope,
            Dimension::Country => Field::Country,
            Dimension::Type => Field::Type,
            Dimension::Registry => Field::VoluntaryRegistry,
            Dimension::ReductionRemoval => Field::ReductionRemoval,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Region => "Region",
            Dimension::Scope => "Scope",
            Dimension::Country => "Country",
            Dimension::Type => "Type",
            Dimension::Registry => "Registry",
            Dimension::ReductionRemoval => "Reduction / Removal",
        }
    }

    /// Dimensions whose selections restrict this dimension's options.
    pub fn parents(self) -> &'static [Dimension] {
        match self {
            Dimension::Country => &[Dimension::Region, Dimension::Scope],
            Dimension::Type => &[Dimension::Scope],
            _ => &[],
        }
    }

    pub fn children(self) -> &'static [Dimension] {
        match self {
            Dimension::Region => &[Dimension::Country],
            Dimension::Scope => &[Dimension::Country, Dimension::Type],
            _ => &[],
        }
    }

    pub fn is_dependent(self) -> bool {
        !self.parents().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

static NO_SELECTION: BTreeSet<String> = BTreeSet::new();

/// Per-dimension selections for one session.
///
/// An empty selection means "no explicit choice": the dimension then allows
/// every value in its current option set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    selections: BTreeMap<Dimension, BTreeSet<String>>,
    select_all: bool,
    /// Dimensions whose explicit choice lost values to a parent change.
    pruned: BTreeSet<Dimension>,
}

/// Where a dimension's selection stands, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStatus {
    /// Nothing chosen: every legal value passes.
    Unset,
    /// User-chosen subset of the legal values.
    Explicit,
    /// Filled with the full option set by "select all".
    AllViaSelectAll,
    /// Explicit choice that lost values after a parent changed.
    PrunedSubset,
}

impl FilterState {
    pub fn selection(&self, dim: Dimension) -> &BTreeSet<String> {
        self.selections.get(&dim).unwrap_or(&NO_SELECTION)
    }

    /// Replace a dimension's selection with an explicit choice. Returns
    /// whether the selected values changed.
    pub fn set_selection(&mut self, dim: Dimension, values: BTreeSet<String>) -> bool {
        self.select_all = false;
        self.pruned.remove(&dim);
        self.selections.insert(dim, values).unwrap_or_default() != *self.selection(dim)
    }

    /// Add or remove a single value.
    pub fn toggle(&mut self, dim: Dimension, value: &str) -> bool {
        let mut values = self.selection(dim).clone();
        if !values.remove(value) {
            values.insert(value.to_string());
        }
        self.set_selection(dim, values)
    }

    pub fn is_select_all(&self) -> bool {
        self.select_all
    }

    /// Leave select-all mode, keeping the filled selections as explicit ones.
    pub fn release_select_all(&mut self) {
        self.select_all = false;
    }

    /// Back to the initial state: nothing selected, select-all off.
    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    /// No dimension has an explicit choice.
    pub fn is_unrestricted(&self) -> bool {
        self.selections.values().all(BTreeSet::is_empty)
    }

    pub fn status(&self, dim: Dimension) -> SelectionStatus {
        if self.select_all {
            SelectionStatus::AllViaSelectAll
        } else if self.selection(dim).is_empty() {
            SelectionStatus::Unset
        } else if self.pruned.contains(&dim) {
            SelectionStatus::PrunedSubset
        } else {
            SelectionStatus::Explicit
        }
    }
}

// ---------------------------------------------------------------------------
// Option sets
// ---------------------------------------------------------------------------

/// Whether `row` passes `dim`'s explicit selection. Empty selections and
/// absent columns restrict nothing.
fn explicit_allows(table: &ProjectTable, state: &FilterState, dim: Dimension, row: usize) -> bool {
    let selected = state.selection(dim);
    if selected.is_empty() {
        return true;
    }
    table
        .category(row, dim.field())
        .map_or(true, |value| selected.contains(value))
}

/// Sorted distinct values of `dim` among rows passing its parents'
/// selections. Sibling and child selections are ignored. Empty when the
/// column is absent.
pub fn compute_options(table: &ProjectTable, state: &FilterState, dim: Dimension) -> BTreeSet<String> {
    if !table.has_column(dim.field()) {
        return BTreeSet::new();
    }
    (0..table.len())
        .filter(|&row| {
            dim.parents()
                .iter()
                .all(|&parent| explicit_allows(table, state, parent, row))
        })
        .filter_map(|row| table.category(row, dim.field()))
        .map(str::to_owned)
        .collect()
}

/// The values a dimension actually lets through: the explicit choice
/// restricted to the legal options, or every legal option when that is
/// empty.
pub fn effective_selection(table: &ProjectTable, state: &FilterState, dim: Dimension) -> BTreeSet<String> {
    let options = compute_options(table, state, dim);
    let chosen: BTreeSet<String> = state
        .selection(dim)
        .intersection(&options)
        .cloned()
        .collect();
    if chosen.is_empty() {
        options
    } else {
        chosen
    }
}

// ---------------------------------------------------------------------------
// State transitions
// ---------------------------------------------------------------------------

/// Fill every dimension with its full option set, parents first so that
/// Country and Type see the just-filled Region and Scope.
pub fn apply_select_all(table: &ProjectTable, state: &mut FilterState) {
    state.pruned.clear();
    for dim in Dimension::ALL {
        let options = compute_options(table, state, dim);
        state.selections.insert(dim, options);
    }
    state.select_all = true;
    debug!("Select-all applied");
}

/// Drop selected values that are no longer legal for their dimension.
/// A selection pruned to nothing returns to "no explicit choice".
pub fn prune_invalid_selections(table: &ProjectTable, state: &mut FilterState) {
    for dim in Dimension::ALL.into_iter().filter(|d| d.is_dependent()) {
        let options = compute_options(table, state, dim);
        let Some(selected) = state.selections.get_mut(&dim) else {
            continue;
        };

        let before = selected.len();
        selected.retain(|value| options.contains(value));
        if selected.len() == before {
            continue;
        }

        debug!(
            "Pruned {} stale {} value(s)",
            before - selected.len(),
            dim.label()
        );
        if selected.is_empty() {
            state.pruned.remove(&dim);
        } else {
            state.pruned.insert(dim);
        }
    }
}

/// A Scope change wipes the Type choice so it falls back to every Type
/// legal under the new Scope. Callers invoke it only when the selected
/// values actually changed.
pub fn clear_on_parent_change(state: &mut FilterState, dim: Dimension) {
    if dim == Dimension::Scope && !state.selection(Dimension::Type).is_empty() {
        debug!("Scope changed; clearing Type selection");
        state.selections.insert(Dimension::Type, BTreeSet::new());
        state.pruned.remove(&Dimension::Type);
    }
}

/// Overwrite a dimension with a single value from outside the filter
/// widgets (a country click). The caller reconciles afterwards as for any
/// other change.
pub fn apply_point_selection(state: &mut FilterState, dim: Dimension, value: &str) {
    if state.set_selection(dim, BTreeSet::from([value.to_string()])) {
        clear_on_parent_change(state, dim);
    }
}

/// Resolve derived state before anything reads option lists or the mask:
/// refresh select-all children, then prune stale child values.
pub fn reconcile(table: &ProjectTable, state: &mut FilterState) {
    if state.select_all {
        for dim in Dimension::ALL.into_iter().filter(|d| d.is_dependent()) {
            let options = compute_options(table, state, dim);
            state.selections.insert(dim, options);
        }
    }
    prune_invalid_selections(table, state);
}

// ---------------------------------------------------------------------------
// Row mask
// ---------------------------------------------------------------------------

/// One flag per row: the AND of every dimension's effective selection.
/// Dimensions with no legal options (absent column) restrict nothing.
pub fn build_mask(table: &ProjectTable, state: &FilterState) -> Vec<bool> {
    let mut mask = vec![true; table.len()];
    for dim in Dimension::ALL {
        let allowed = effective_selection(table, state, dim);
        if allowed.is_empty() {
            continue;
        }
        for (row, keep) in mask.iter_mut().enumerate() {
            if *keep {
                *keep = table
                    .category(row, dim.field())
                    .is_some_and(|value| allowed.contains(value));
            }
        }
    }
    mask
}

/// Return indices of projects that pass all active filters.
pub fn filtered_indices(table: &ProjectTable, state: &FilterState) -> Vec<usize> {
    build_mask(table, state)
        .into_iter()
        .enumerate()
        .filter(|(_, keep)| *keep)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ProjectRecord;

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn record(id: &str, region: &str, country: &str, scope: &str, kind: &str) -> ProjectRecord {
        ProjectRecord::new(id)
            .with_attribute(Field::Region, region)
            .with_attribute(Field::Country, country)
            .with_attribute(Field::Scope, scope)
            .with_attribute(Field::Type, kind)
            .with_attribute(Field::VoluntaryRegistry, "VCS")
            .with_attribute(Field::ReductionRemoval, "Reduction")
    }

    fn sample_table() -> ProjectTable {
        let records = vec![
            record("P1", "Africa", "Kenya", "Forestry", "REDD+"),
            record("P2", "Africa", "Kenya", "Forestry", "Afforestation"),
            record("P3", "Asia", "India", "Forestry", "REDD+"),
            record("P4", "Europe", "Germany", "Energy", "Wind"),
            record("P5", "Europe", "Spain", "Energy", "Solar"),
        ];
        let columns = BTreeSet::from([
            Field::ProjectId,
            Field::Region,
            Field::Country,
            Field::Scope,
            Field::Type,
            Field::VoluntaryRegistry,
            Field::ReductionRemoval,
        ]);
        ProjectTable::new(records, columns)
    }

    #[test]
    fn test_dependency_order() {
        for (i, dim) in Dimension::ALL.iter().enumerate() {
            for parent in dim.parents() {
                let parent_pos = Dimension::ALL.iter().position(|d| d == parent).unwrap();
                assert!(parent_pos < i, "{dim:?} evaluated before {parent:?}");
                assert!(parent.children().contains(dim));
            }
        }
    }

    #[test]
    fn test_scope_options_ignore_region() {
        let table = sample_table();
        let mut state = FilterState::default();
        state.set_selection(Dimension::Region, set(&["Asia"]));

        assert_eq!(
            compute_options(&table, &state, Dimension::Scope),
            set(&["Energy", "Forestry"])
        );
        assert_eq!(
            compute_options(&table, &state, Dimension::Country),
            set(&["India"])
        );
    }

    #[test]
    fn test_type_options_follow_scope_only() {
        let table = sample_table();
        let mut state = FilterState::default();
        state.set_selection(Dimension::Scope, set(&["Energy"]));
        state.set_selection(Dimension::Region, set(&["Africa"]));

        assert_eq!(
            compute_options(&table, &state, Dimension::Type),
            set(&["Solar", "Wind"])
        );
        // Country depends on both parents: no Energy projects in Africa.
        assert!(compute_options(&table, &state, Dimension::Country).is_empty());
    }

    #[test]
    fn test_prune_after_scope_change() {
        let table = sample_table();
        let mut state = FilterState::default();
        state.set_selection(Dimension::Country, set(&["Kenya", "Germany"]));
        state.set_selection(Dimension::Scope, set(&["Forestry"]));

        prune_invalid_selections(&table, &mut state);

        assert_eq!(state.selection(Dimension::Country), &set(&["Kenya"]));
        assert_eq!(state.status(Dimension::Country), SelectionStatus::PrunedSubset);
    }

    #[test]
    fn test_pruned_to_empty_returns_to_unset() {
        let table = sample_table();
        let mut state = FilterState::default();
        state.set_selection(Dimension::Type, set(&["Wind"]));
        state.set_selection(Dimension::Scope, set(&["Forestry"]));

        prune_invalid_selections(&table, &mut state);

        assert!(state.selection(Dimension::Type).is_empty());
        assert_eq!(state.status(Dimension::Type), SelectionStatus::Unset);
    }

    #[test]
    fn test_scope_change_clears_type() {
        let mut state = FilterState::default();
        state.set_selection(Dimension::Type, set(&["REDD+"]));
        state.set_selection(Dimension::Scope, set(&["Forestry"]));
        clear_on_parent_change(&mut state, Dimension::Scope);
        assert!(state.selection(Dimension::Type).is_empty());

        // Other parents leave Type alone.
        state.set_selection(Dimension::Type, set(&["REDD+"]));
        clear_on_parent_change(&mut state, Dimension::Region);
        assert_eq!(state.selection(Dimension::Type), &set(&["REDD+"]));
    }

    #[test]
    fn test_unchanged_selection_reports_no_change() {
        let mut state = FilterState::default();
        assert!(state.set_selection(Dimension::Scope, set(&["Forestry"])));
        assert!(!state.set_selection(Dimension::Scope, set(&["Forestry"])));
        assert!(state.toggle(Dimension::Scope, "Energy"));

        // Selecting the same Scope again keeps the Type choice.
        state.set_selection(Dimension::Type, set(&["REDD+"]));
        apply_point_selection(&mut state, Dimension::Scope, "Energy");
        assert!(state.selection(Dimension::Type).is_empty());
        state.set_selection(Dimension::Type, set(&["Wind"]));
        apply_point_selection(&mut state, Dimension::Scope, "Energy");
        assert_eq!(state.selection(Dimension::Type), &set(&["Wind"]));
    }

    #[test]
    fn test_effective_selection_defaults_to_options() {
        let table = sample_table();
        let mut state = FilterState::default();
        state.set_selection(Dimension::Scope, set(&["Energy"]));

        assert_eq!(
            effective_selection(&table, &state, Dimension::Type),
            set(&["Solar", "Wind"])
        );

        // Stale explicit values are ignored.
        state.set_selection(Dimension::Type, set(&["Wind", "REDD+"]));
        assert_eq!(
            effective_selection(&table, &state, Dimension::Type),
            set(&["Wind"])
        );
    }

    #[test]
    fn test_mask_combines_dimensions() {
        let table = sample_table();
        let mut state = FilterState::default();
        assert_eq!(filtered_indices(&table, &state), vec![0, 1, 2, 3, 4]);

        state.set_selection(Dimension::Region, set(&["Africa", "Asia"]));
        state.set_selection(Dimension::Type, set(&["REDD+"]));
        assert_eq!(filtered_indices(&table, &state), vec![0, 2]);
    }

    #[test]
    fn test_select_all_fills_every_dimension() {
        let table = sample_table();
        let mut state = FilterState::default();
        apply_select_all(&table, &mut state);

        assert!(state.is_select_all());
        assert_eq!(state.selection(Dimension::Region), &set(&["Africa", "Asia", "Europe"]));
        assert_eq!(
            state.selection(Dimension::Country),
            &set(&["Germany", "India", "Kenya", "Spain"])
        );
        assert_eq!(state.status(Dimension::Type), SelectionStatus::AllViaSelectAll);
        assert_eq!(filtered_indices(&table, &state).len(), table.len());
    }

    #[test]
    fn test_select_all_skips_absent_columns() {
        let records = vec![ProjectRecord::new("P1").with_attribute(Field::Region, "Asia")];
        let table = ProjectTable::new(records, BTreeSet::from([Field::ProjectId, Field::Region]));
        let mut state = FilterState::default();
        apply_select_all(&table, &mut state);

        assert!(state.selection(Dimension::Country).is_empty());
        assert_eq!(filtered_indices(&table, &state), vec![0]);
    }

    #[test]
    fn test_point_selection_then_reset() {
        let table = sample_table();
        let mut state = FilterState::default();
        apply_select_all(&table, &mut state);

        apply_point_selection(&mut state, Dimension::Country, "Spain");
        reconcile(&table, &mut state);
        assert!(!state.is_select_all());
        assert_eq!(filtered_indices(&table, &state), vec![4]);

        state.reset();
        assert!(state.is_unrestricted());
        assert!(state.selection(Dimension::Country).is_empty());
        assert_eq!(filtered_indices(&table, &state).len(), table.len());
    }

    #[test]
    fn test_reconcile_refreshes_select_all_children() {
        let table = sample_table();
        let mut state = FilterState::default();
        apply_select_all(&table, &mut state);

        // Parents narrowed programmatically while select-all stays on.
        state
            .selections
            .insert(Dimension::Scope, set(&["Energy"]));
        reconcile(&table, &mut state);

        assert_eq!(state.selection(Dimension::Type), &set(&["Solar", "Wind"]));
        assert_eq!(state.selection(Dimension::Country), &set(&["Germany", "Spain"]));
    }
}
