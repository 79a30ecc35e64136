use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::data::filter::{FilterState, Selection};
use crate::data::normalize::{normalize_label, normalize_month};

/// Interactive sales dashboard.
///
/// Loads a cleaned sales table once, then filters it by city, year and
/// month. With `--export-dir` the filtered exports are written to disk and
/// no window is opened.
#[derive(Debug, Clone, Parser)]
#[command(name = "sales-dashboard", version, about)]
pub struct Cli {
    /// Sales table to load (.csv, .json or .parquet).
    #[arg(long, short = 'd', default_value = "walmartcleaned_datafile.csv")]
    pub data: PathBuf,

    /// Image shown at the top of the filter panel.
    #[arg(long)]
    pub logo: Option<PathBuf>,

    /// Initial city selection.
    #[arg(long, default_value = "All")]
    pub city: String,

    /// Initial year selection.
    #[arg(long, default_value = "All")]
    pub year: String,

    /// Initial month selection (e.g. "march").
    #[arg(long, default_value = "All")]
    pub month: String,

    /// Write the CSV exports for the selected filters into this directory
    /// and exit.
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,
}

impl Cli {
    /// Initial filter selections. Values are normalized the same way the
    /// dataset is, so `--city yangon` selects "Yangon".
    pub fn filter_state(&self) -> Result<FilterState> {
        let city = if is_all(&self.city) {
            Selection::All
        } else {
            Selection::Only(normalize_label(&self.city))
        };
        let year = if is_all(&self.year) {
            Selection::All
        } else {
            let year = self
                .year
                .trim()
                .parse::<i64>()
                .with_context(|| format!("--year expects a number, got '{}'", self.year))?;
            Selection::Only(year)
        };
        let month = if is_all(&self.month) {
            Selection::All
        } else {
            Selection::Only(normalize_month(&self.month))
        };
        Ok(FilterState { city, year, month })
    }
}

fn is_all(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("all")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_everything() {
        let cli = Cli::parse_from(["sales-dashboard"]);
        assert_eq!(cli.data, PathBuf::from("walmartcleaned_datafile.csv"));
        assert_eq!(cli.filter_state().expect("valid"), FilterState::default());
        assert!(cli.export_dir.is_none());
    }

    #[test]
    fn selections_are_normalized() {
        let cli = Cli::parse_from([
            "sales-dashboard",
            "--city",
            " yangon",
            "--year",
            "2019",
            "--month",
            "Febuary",
            "--export-dir",
            "out",
        ]);
        let filters = cli.filter_state().expect("valid");
        assert_eq!(filters.city, Selection::Only("Yangon".into()));
        assert_eq!(filters.year, Selection::Only(2019));
        assert_eq!(filters.month, Selection::Only("february".into()));
        assert_eq!(cli.export_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn non_numeric_year_is_rejected() {
        let cli = Cli::parse_from(["sales-dashboard", "--year", "last"]);
        assert!(cli.filter_state().is_err());
    }
}
