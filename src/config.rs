//! Command line and environment configuration.

use std::path::PathBuf;

use clap::Parser;

/// Worksheet holding the project list in the registry workbook.
pub const DEFAULT_SHEET: &str = "PROJECTS";

/// Title rows above the header in the registry workbook.
pub const DEFAULT_SKIP_ROWS: usize = 3;

/// Where the project table comes from. Also the key of the loader cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSourceConfig {
    pub path: PathBuf,
    /// Worksheet name; only used by workbook formats.
    pub sheet: String,
    /// Rows discarded before the header row; only used by sheet-like formats.
    pub skip_rows: usize,
}

impl DataSourceConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DataSourceConfig {
            path: path.into(),
            sheet: DEFAULT_SHEET.to_string(),
            skip_rows: DEFAULT_SKIP_ROWS,
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = sheet.into();
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }
}

/// Carbon Dashboard: explore voluntary carbon-offset registry projects
#[derive(Debug, Parser)]
#[command(name = "carbon-dashboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project spreadsheet to open at startup (.xlsx/.xls/.ods/.csv/.json/.parquet)
    #[arg(short, long, value_name = "FILE", env = "CARBON_DASHBOARD_DATA")]
    pub data: Option<PathBuf>,

    /// Worksheet holding the project list
    #[arg(long, default_value = DEFAULT_SHEET, env = "CARBON_DASHBOARD_SHEET")]
    pub sheet: String,

    /// Title rows above the header row
    #[arg(long, default_value_t = DEFAULT_SKIP_ROWS, env = "CARBON_DASHBOARD_SKIP_ROWS")]
    pub skip_rows: usize,
}

impl Cli {
    /// Source to load at startup, if a file was given.
    pub fn data_source(&self) -> Option<DataSourceConfig> {
        self.data.as_ref().map(|path| {
            DataSourceConfig::new(path)
                .with_sheet(&self.sheet)
                .with_skip_rows(self.skip_rows)
        })
    }

    /// Sheet and skip-rows settings applied to files opened from the UI.
    pub fn source_for(&self, path: impl Into<PathBuf>) -> DataSourceConfig {
        DataSourceConfig::new(path)
            .with_sheet(&self.sheet)
            .with_skip_rows(self.skip_rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cli = Cli::try_parse_from(["carbon-dashboard"]).unwrap();
        assert_eq!(cli.sheet, DEFAULT_SHEET);
        assert_eq!(cli.skip_rows, DEFAULT_SKIP_ROWS);
        // Only meaningful when CARBON_DASHBOARD_DATA is unset in the test env.
        if std::env::var_os("CARBON_DASHBOARD_DATA").is_none() {
            assert!(cli.data_source().is_none());
        }
    }

    #[test]
    fn test_explicit_arguments() {
        let cli = Cli::try_parse_from([
            "carbon-dashboard",
            "--data",
            "projects.xlsx",
            "--sheet",
            "Sheet1",
            "--skip-rows",
            "0",
        ])
        .unwrap();
        let source = cli.data_source().unwrap();
        assert_eq!(source.path, PathBuf::from("projects.xlsx"));
        assert_eq!(source.sheet, "Sheet1");
        assert_eq!(source.skip_rows, 0);
        assert_eq!(cli.source_for("other.csv").sheet, "Sheet1");
    }
}
