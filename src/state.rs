use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::color::ColorMap;
use crate::data::aggregate::Aggregates;
use crate::data::export::ExportKind;
use crate::data::filter::{filtered_indices, FilterOptions, FilterState, FilteredView, Selection};
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Normalized dataset, read-only once loaded.
    pub dataset: Option<Arc<Dataset>>,

    /// Selector option lists from the unfiltered dataset.
    pub options: FilterOptions,

    /// Current selector values.
    pub filters: FilterState,

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Aggregates of the visible records.
    pub aggregates: Aggregates,

    /// Colour per category, built from the whole dataset so colours do not
    /// shift when filtering.
    pub color_map: ColorMap,

    /// Optional sidebar logo.
    pub logo: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded (normalized) dataset with initial selections.
    pub fn set_dataset(&mut self, dataset: Dataset, filters: FilterState) {
        self.options = FilterOptions::from_dataset(&dataset);
        self.color_map = ColorMap::new(dataset.records.iter().map(|r| r.category.as_str()));
        self.dataset = Some(Arc::new(dataset));
        self.filters = filters;
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and every aggregate after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.visible_indices.clear();
            self.aggregates = Aggregates::default();
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.filters);
        let view = FilteredView::from_indices(ds, self.visible_indices.clone());
        self.aggregates = Aggregates::compute(&view);
        log::debug!(
            "filters city={} year={} month={} → {} of {} records",
            self.filters.city,
            self.filters.year,
            self.filters.month,
            self.visible_indices.len(),
            ds.len()
        );
    }

    pub fn set_city(&mut self, city: Selection<String>) {
        if self.filters.city != city {
            self.filters.city = city;
            self.refilter();
        }
    }

    pub fn set_year(&mut self, year: Selection<i64>) {
        if self.filters.year != year {
            self.filters.year = year;
            self.refilter();
        }
    }

    pub fn set_month(&mut self, month: Selection<String>) {
        if self.filters.month != month {
            self.filters.month = month;
            self.refilter();
        }
    }

    /// Reset every selector to "All".
    pub fn clear_filters(&mut self) {
        self.filters = FilterState::default();
        self.refilter();
    }

    /// The current filtered view, if a dataset is loaded.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        self.dataset
            .as_deref()
            .map(|ds| FilteredView::from_indices(ds, self.visible_indices.clone()))
    }

    /// Serialize one export table for the current view.
    pub fn export_bytes(&self, kind: ExportKind) -> Result<Vec<u8>> {
        let view = self.view().context("no dataset loaded")?;
        kind.to_csv(&view, &self.aggregates)
    }

    /// Write one export table to `path`.
    pub fn export_to(&self, kind: ExportKind, path: &Path) -> Result<()> {
        let bytes = self.export_bytes(kind)?;
        std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {} to {}", kind.file_name(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{dataset, record};

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(
            dataset(vec![
                record("Yangon", 2019, "january", 5.0, 100.0),
                record("Mandalay", 2019, "march", 2.0, 40.0),
                record("Yangon", 2020, "february", 3.0, 60.0),
            ]),
            FilterState::default(),
        );
        state
    }

    #[test]
    fn loading_shows_everything() {
        let state = loaded();
        assert_eq!(state.visible_indices, vec![0, 1, 2]);
        assert_eq!(state.aggregates.kpis.transaction_count, 3);
        assert_eq!(state.options.cities, vec!["Mandalay", "Yangon"]);
    }

    #[test]
    fn selector_changes_recompute_aggregates_but_not_options() {
        let mut state = loaded();
        state.set_city(Selection::Only("Yangon".into()));
        assert_eq!(state.visible_indices, vec![0, 2]);
        assert_eq!(state.aggregates.kpis.total_revenue, 160.0);

        state.set_year(Selection::Only(2021));
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.aggregates.kpis.total_quantity, 0.0);
        assert_eq!(state.options.years, vec![2019, 2020]);

        state.clear_filters();
        assert_eq!(state.visible_indices.len(), 3);
    }

    #[test]
    fn export_uses_the_current_view() {
        let mut state = loaded();
        state.set_month(Selection::Only("march".into()));
        let csv = String::from_utf8(
            state
                .export_bytes(ExportKind::CategoryTotals)
                .expect("serializes"),
        )
        .expect("utf-8");
        assert_eq!(csv, ",category,quantity\n0,Health And Beauty,2.0\n");
    }

    #[test]
    fn export_without_dataset_fails() {
        let state = AppState::default();
        assert!(state.export_bytes(ExportKind::FilteredTable).is_err());
    }
}
