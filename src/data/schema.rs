use std::fmt;

// ---------------------------------------------------------------------------
// Canonical fields of the project sheet
// ---------------------------------------------------------------------------

/// What a canonical column holds, which decides how the cleaning pipeline
/// treats its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// The row key. Rows without one are dropped.
    Identifier,
    /// Free text, kept as-is (nulls stay absent).
    Text,
    /// Filterable dimension. Nulls become [`UNKNOWN`].
    Category,
    /// Credit quantity. Unparsable values become `0.0`.
    Measure,
    /// First vintage year.
    Year,
}

/// Sentinel written into empty category cells.
pub const UNKNOWN: &str = "Unknown";

/// Every column the dashboard understands. Anything else in the source is
/// dropped while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    ProjectId,
    ProjectName,
    VoluntaryRegistry,
    ArbWaProject,
    VoluntaryStatus,
    Scope,
    Type,
    ReductionRemoval,
    MethodologyProtocol,
    MethodologyVersion,
    Region,
    Country,
    State,
    ProjectSiteLocation,
    ProjectDeveloper,
    TotalCreditsIssued,
    TotalCreditsRetired,
    TotalCreditsRemaining,
    TotalBufferPoolDeposits,
    ReversalsCoveredByBuffer,
    ReversalsNotCoveredByBuffer,
    BufferCreditsReleased,
    FirstVintageYear,
}

impl Field {
    pub const ALL: [Field; 23] = [
        Field::ProjectId,
        Field::ProjectName,
        Field::VoluntaryRegistry,
        Field::ArbWaProject,
        Field::VoluntaryStatus,
        Field::Scope,
        Field::Type,
        Field::ReductionRemoval,
        Field::MethodologyProtocol,
        Field::MethodologyVersion,
        Field::Region,
        Field::Country,
        Field::State,
        Field::ProjectSiteLocation,
        Field::ProjectDeveloper,
        Field::TotalCreditsIssued,
        Field::TotalCreditsRetired,
        Field::TotalCreditsRemaining,
        Field::TotalBufferPoolDeposits,
        Field::ReversalsCoveredByBuffer,
        Field::ReversalsNotCoveredByBuffer,
        Field::BufferCreditsReleased,
        Field::FirstVintageYear,
    ];

    /// Canonical key used throughout the dashboard.
    pub fn key(self) -> &'static str {
        match self {
            Field::ProjectId => "Project ID",
            Field::ProjectName => "Project Name",
            Field::VoluntaryRegistry => "Voluntary_Registry",
            Field::ArbWaProject => "ARB_WA_Project",
            Field::VoluntaryStatus => "Voluntary_Status",
            Field::Scope => "Scope",
            Field::Type => "Type",
            Field::ReductionRemoval => "Reduction_Removal",
            Field::MethodologyProtocol => "Methodology_Protocol",
            Field::MethodologyVersion => "Methodology_Version",
            Field::Region => "Region",
            Field::Country => "Country",
            Field::State => "State",
            Field::ProjectSiteLocation => "Project_Site_Location",
            Field::ProjectDeveloper => "Project_Developer",
            Field::TotalCreditsIssued => "Total_Credits_Issued",
            Field::TotalCreditsRetired => "Total_Credits_Retired",
            Field::TotalCreditsRemaining => "Total_Credits_Remaining",
            Field::TotalBufferPoolDeposits => "Total_Buffer_Pool_Deposits",
            Field::ReversalsCoveredByBuffer => "Reversals_Covered_by_Buffer",
            Field::ReversalsNotCoveredByBuffer => "Reversals_Not_Covered_by_Buffer",
            Field::BufferCreditsReleased => "Buffer_Credits_Released",
            Field::FirstVintageYear => "First_Vintage_Year",
        }
    }

    /// Header text as it appears in the registry workbook (after
    /// [`normalize_label`]). Also used as the human-readable column title.
    pub fn raw_label(self) -> &'static str {
        match self {
            Field::ProjectId => "Project ID",
            Field::ProjectName => "Project Name",
            Field::VoluntaryRegistry => "Voluntary Registry",
            Field::ArbWaProject => "ARB / WA Project",
            Field::VoluntaryStatus => "Voluntary Status",
            Field::Scope => "Scope",
            Field::Type => "Type",
            Field::ReductionRemoval => "Reduction / Removal",
            Field::MethodologyProtocol => "Methodology / Protocol",
            Field::MethodologyVersion => "Methodology Version",
            Field::Region => "Region",
            Field::Country => "Country",
            Field::State => "State",
            Field::ProjectSiteLocation => "Project Site Location",
            Field::ProjectDeveloper => "Project Developer",
            Field::TotalCreditsIssued => "Total Credits Issued",
            Field::TotalCreditsRetired => "Total Credits Retired",
            Field::TotalCreditsRemaining => "Total Credits Remaining",
            Field::TotalBufferPoolDeposits => "Total Buffer Pool Deposits",
            Field::ReversalsCoveredByBuffer => "Reversals Covered by Buffer Pool",
            Field::ReversalsNotCoveredByBuffer => "Reversals Not Covered by Buffer",
            Field::BufferCreditsReleased => "Buffer Credits Released to Project",
            Field::FirstVintageYear => "First Year of Project (Vintage)",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::ProjectId => FieldKind::Identifier,
            Field::VoluntaryRegistry
            | Field::Scope
            | Field::Type
            | Field::ReductionRemoval
            | Field::Region
            | Field::Country => FieldKind::Category,
            Field::TotalCreditsIssued
            | Field::TotalCreditsRetired
            | Field::TotalCreditsRemaining
            | Field::TotalBufferPoolDeposits
            | Field::ReversalsCoveredByBuffer
            | Field::ReversalsNotCoveredByBuffer
            | Field::BufferCreditsReleased => FieldKind::Measure,
            Field::FirstVintageYear => FieldKind::Year,
            _ => FieldKind::Text,
        }
    }

    /// Resolve a normalised header to a field. Both the workbook label and
    /// the canonical key are accepted, so re-exported tables load too.
    pub fn from_label(label: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.raw_label() == label || f.key() == label)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_label())
    }
}

/// Collapse newlines and whitespace runs into single spaces and trim.
///
/// Registry workbooks wrap long headers (`"Total Credits\nIssued"`), so
/// labels must be normalised before they can be matched.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Total Credits\nIssued"), "Total Credits Issued");
        assert_eq!(normalize_label("  Voluntary   Registry \r\n"), "Voluntary Registry");
        assert_eq!(normalize_label(""), "");
    }

    #[test]
    fn test_from_label_accepts_raw_and_canonical() {
        assert_eq!(
            Field::from_label("Reduction / Removal"),
            Some(Field::ReductionRemoval)
        );
        assert_eq!(
            Field::from_label("Reduction_Removal"),
            Some(Field::ReductionRemoval)
        );
        assert_eq!(
            Field::from_label("First Year of Project (Vintage)"),
            Some(Field::FirstVintageYear)
        );
        assert_eq!(Field::from_label("Notes"), None);
    }

    #[test]
    fn test_every_field_round_trips_through_its_labels() {
        for field in Field::ALL {
            assert_eq!(Field::from_label(field.raw_label()), Some(field));
            assert_eq!(Field::from_label(field.key()), Some(field));
        }
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Field::ProjectId.kind(), FieldKind::Identifier);
        assert_eq!(Field::Country.kind(), FieldKind::Category);
        assert_eq!(Field::State.kind(), FieldKind::Text);
        assert_eq!(Field::BufferCreditsReleased.kind(), FieldKind::Measure);
        assert_eq!(Field::FirstVintageYear.kind(), FieldKind::Year);
    }
}
