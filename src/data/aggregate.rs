//! Aggregate tables for the charts.
//!
//! Every function works on the filtered row indices and returns an owned,
//! possibly empty result. Empty input never fails; the caller shows a
//! "no data" state instead.

use std::collections::{BTreeMap, BTreeSet};

use super::country::standardize_country;
use super::model::ProjectTable;
use super::schema::Field;

// ---------------------------------------------------------------------------
// Headline numbers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub projects: usize,
    pub credits_issued: f64,
    pub credits_retired: f64,
    pub countries: usize,
}

pub fn summary(table: &ProjectTable, indices: &[usize]) -> Summary {
    let countries: BTreeSet<&str> = indices
        .iter()
        .filter_map(|&row| table.category(row, Field::Country))
        .collect();
    Summary {
        projects: indices.len(),
        credits_issued: indices
            .iter()
            .map(|&row| table.measure(row, Field::TotalCreditsIssued))
            .sum(),
        credits_retired: indices
            .iter()
            .map(|&row| table.measure(row, Field::TotalCreditsRetired))
            .sum(),
        countries: countries.len(),
    }
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// Number of projects per value of `field`, ascending by value.
pub fn value_counts(table: &ProjectTable, indices: &[usize], field: Field) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for &row in indices {
        if let Some(value) = table.category(row, field) {
            *counts.entry(value).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}

/// Zero-filled count matrix of two category fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Counts of one column across all rows, for stacked series.
    pub fn column(&self, column: usize) -> Vec<usize> {
        self.counts
            .iter()
            .map(|r| r.get(column).copied().unwrap_or(0))
            .collect()
    }
}

pub fn crosstab(table: &ProjectTable, indices: &[usize], row_field: Field, col_field: Field) -> CrossTab {
    let mut pairs: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for &row in indices {
        if let (Some(r), Some(c)) = (table.category(row, row_field), table.category(row, col_field)) {
            *pairs.entry((r, c)).or_default() += 1;
        }
    }

    let rows: Vec<String> = pairs
        .keys()
        .map(|(r, _)| *r)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    let columns: Vec<String> = pairs
        .keys()
        .map(|(_, c)| *c)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut counts = vec![vec![0; columns.len()]; rows.len()];
    for ((r, c), n) in pairs {
        // Both axes are sorted and contain every key.
        if let (Ok(ri), Ok(ci)) = (
            rows.binary_search_by(|x| x.as_str().cmp(r)),
            columns.binary_search_by(|x| x.as_str().cmp(c)),
        ) {
            counts[ri][ci] = n;
        }
    }

    CrossTab { rows, columns, counts }
}

/// Counts per distinct value tuple along `path`, sorted by tuple. Rows
/// missing any field on the path are skipped.
pub fn hierarchy_counts(table: &ProjectTable, indices: &[usize], path: &[Field]) -> Vec<(Vec<String>, usize)> {
    let mut counts: BTreeMap<Vec<&str>, usize> = BTreeMap::new();
    for &row in indices {
        let key: Option<Vec<&str>> = path.iter().map(|&f| table.category(row, f)).collect();
        if let Some(key) = key {
            *counts.entry(key).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(key, n)| (key.into_iter().map(str::to_string).collect(), n))
        .collect()
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CreditsRow {
    pub group: String,
    pub retired: f64,
    pub remaining: f64,
    /// Always `retired + remaining`, so the stacked bars and the issued line
    /// agree even when the source totals do not.
    pub issued: f64,
}

/// Retired and remaining credits summed per value of `field`, ascending.
pub fn credits_by_group(table: &ProjectTable, indices: &[usize], field: Field) -> Vec<CreditsRow> {
    let mut sums: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for &row in indices {
        if let Some(group) = table.category(row, field) {
            let entry = sums.entry(group).or_default();
            entry.0 += table.measure(row, Field::TotalCreditsRetired);
            entry.1 += table.measure(row, Field::TotalCreditsRemaining);
        }
    }
    sums.into_iter()
        .map(|(group, (retired, remaining))| CreditsRow {
            group: group.to_string(),
            retired,
            remaining,
            issued: retired + remaining,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Countries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CountryCount {
    /// Value as it appears in the table; what a click selects.
    pub country: String,
    /// Reference spelling for map matching.
    pub normalized: String,
    pub count: usize,
}

/// Projects per country, most projects first (ties by name).
pub fn country_counts(table: &ProjectTable, indices: &[usize]) -> Vec<CountryCount> {
    let mut counts: Vec<CountryCount> = value_counts(table, indices, Field::Country)
        .into_iter()
        .map(|(country, count)| CountryCount {
            normalized: standardize_country(&country),
            country,
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.country.cmp(&b.country)));
    counts
}

/// Short registry names used by the per-registry country views, with the
/// long names some exports use instead.
pub const REGISTRY_ALIASES: [(&str, &[&str]); 5] = [
    ("ACR", &["American Carbon Registry"]),
    ("ART", &["Architecture for REDD+ Transactions", "ART TREES"]),
    ("CAR", &["Climate Action Reserve"]),
    ("GOLD", &["Gold Standard"]),
    ("VCS", &["Verra", "Verified Carbon Standard"]),
];

/// Index into [`REGISTRY_ALIASES`] for a registry name.
pub fn registry_alias(name: &str) -> Option<usize> {
    REGISTRY_ALIASES
        .iter()
        .position(|(short, long)| *short == name || long.contains(&name))
}

/// Country × registry project counts over the fixed aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryPivot {
    pub countries: Vec<CountryCount>,
    /// `counts[country][alias]`, aligned with [`REGISTRY_ALIASES`].
    pub counts: Vec<[usize; 5]>,
}

impl RegistryPivot {
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn total(&self, country: usize) -> usize {
        self.counts.get(country).map_or(0, |c| c.iter().sum())
    }
}

/// Countries in ascending order with their counts per aliased registry.
/// Projects from other registries count towards `CountryCount::count` only.
pub fn registry_country_pivot(table: &ProjectTable, indices: &[usize]) -> RegistryPivot {
    let mut per_country: BTreeMap<&str, (usize, [usize; 5])> = BTreeMap::new();
    for &row in indices {
        let Some(country) = table.category(row, Field::Country) else {
            continue;
        };
        let entry = per_country.entry(country).or_default();
        entry.0 += 1;
        if let Some(alias) = table
            .category(row, Field::VoluntaryRegistry)
            .and_then(registry_alias)
        {
            entry.1[alias] += 1;
        }
    }

    let mut pivot = RegistryPivot::default();
    for (country, (count, by_registry)) in per_country {
        pivot.countries.push(CountryCount {
            country: country.to_string(),
            normalized: standardize_country(country),
            count,
        });
        pivot.counts.push(by_registry);
    }
    pivot
}

/// Indices into `pivot.countries` of the `n` countries with most projects
/// across the aliased registries, largest first, ties by name.
pub fn top_countries(pivot: &RegistryPivot, n: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pivot.countries.len())
        .filter(|&i| pivot.total(i) > 0)
        .collect();
    order.sort_by(|&a, &b| {
        pivot
            .total(b)
            .cmp(&pivot.total(a))
            .then_with(|| pivot.countries[a].country.cmp(&pivot.countries[b].country))
    });
    order.truncate(n);
    order
}

// ---------------------------------------------------------------------------
// Vintage years
// ---------------------------------------------------------------------------

/// Project starts per first-vintage year, one zero-filled series per
/// registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VintageSeries {
    pub years: Vec<i32>,
    /// (registry, counts aligned with `years`), ascending by registry.
    pub series: Vec<(String, Vec<usize>)>,
}

impl VintageSeries {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

pub fn vintage_series(table: &ProjectTable, indices: &[usize]) -> VintageSeries {
    let mut counts: BTreeMap<&str, BTreeMap<i32, usize>> = BTreeMap::new();
    let mut years = BTreeSet::new();
    for &row in indices {
        let (Some(registry), Some(year)) = (
            table.category(row, Field::VoluntaryRegistry),
            table.records[row].first_vintage_year,
        ) else {
            continue;
        };
        years.insert(year);
        *counts.entry(registry).or_default().entry(year).or_default() += 1;
    }

    let years: Vec<i32> = years.into_iter().collect();
    let series = counts
        .into_iter()
        .map(|(registry, by_year)| {
            let aligned = years
                .iter()
                .map(|y| by_year.get(y).copied().unwrap_or(0))
                .collect();
            (registry.to_string(), aligned)
        })
        .collect();
    VintageSeries { years, series }
}

// ---------------------------------------------------------------------------
// Table search
// ---------------------------------------------------------------------------

/// Rows whose project id contains `needle`, case-insensitively. Only the
/// project table uses this; charts keep the full filtered set.
pub fn filter_by_project_id(table: &ProjectTable, indices: &[usize], needle: &str) -> Vec<usize> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return indices.to_vec();
    }
    indices
        .iter()
        .copied()
        .filter(|&row| table.records[row].project_id.to_lowercase().contains(&needle))
        .collect()
}
