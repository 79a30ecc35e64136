use std::collections::BTreeSet;
use std::fmt;

use super::model::{Dataset, SalesRecord, MONTHS};

// ---------------------------------------------------------------------------
// Selection – one selector's value
// ---------------------------------------------------------------------------

/// A selector value: either no restriction or one specific value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    /// Whether `value` passes this selector.
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => selected == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "All"),
            Selection::Only(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterState
// ---------------------------------------------------------------------------

/// The three dashboard selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub city: Selection<String>,
    pub year: Selection<i64>,
    pub month: Selection<String>,
}

impl FilterState {
    /// Whether a record passes every active selector.
    ///
    /// Applied in order city → year → month; a record without a year only
    /// passes when the year selector is "All".
    pub fn matches(&self, record: &SalesRecord) -> bool {
        self.city.admits(&record.city)
            && match (&self.year, record.year) {
                (Selection::All, _) => true,
                (Selection::Only(selected), Some(year)) => *selected == year,
                (Selection::Only(_), None) => false,
            }
            && self.month.admits(&record.month)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "city={} year={} month={}", self.city, self.year, self.month)
    }
}

/// Return indices of records that pass all active selectors, in row order.
pub fn filtered_indices(dataset: &Dataset, filters: &FilterState) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| filters.matches(record))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView
// ---------------------------------------------------------------------------

/// The dataset restricted to the rows matching a [`FilterState`].
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, filters: &FilterState) -> Self {
        Self::from_indices(dataset, filtered_indices(dataset, filters))
    }

    /// A view over precomputed row positions.
    pub fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Records in the view, in row order.
    pub fn records(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        let dataset = self.dataset;
        self.indices.iter().filter_map(move |&i| dataset.records.get(i))
    }
}

// ---------------------------------------------------------------------------
// FilterOptions – what each selector offers
// ---------------------------------------------------------------------------

/// Selector option lists, computed once from the unfiltered dataset so that
/// filtering never shrinks them. "All" is implied and not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub years: Vec<i64>,
    /// Canonical months present in the dataset, in calendar order.
    pub months: Vec<String>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let cities: BTreeSet<&str> = dataset.records.iter().map(|r| r.city.as_str()).collect();
        let years: BTreeSet<i64> = dataset.records.iter().filter_map(|r| r.year).collect();
        let present: BTreeSet<&str> = dataset.records.iter().map(|r| r.month.as_str()).collect();

        FilterOptions {
            cities: cities.into_iter().map(str::to_string).collect(),
            years: years.into_iter().collect(),
            months: MONTHS
                .iter()
                .filter(|m| present.contains(*m))
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{dataset, record};

    fn sample() -> Dataset {
        dataset(vec![
            record("Yangon", 2019, "january", 5.0, 100.0),
            record("Mandalay", 2019, "march", 2.0, 40.0),
            record("Yangon", 2019, "february", 3.0, 60.0),
            record("Naypyitaw", 2020, "january", 1.0, 15.0),
            record("Yangon", 2020, "march", 4.0, 80.0),
        ])
    }

    #[test]
    fn all_selectors_keep_every_row() {
        let ds = sample();
        assert_eq!(filtered_indices(&ds, &FilterState::default()), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn selectors_combine_with_and_and_keep_row_order() {
        let ds = sample();
        let filters = FilterState {
            city: Selection::Only("Yangon".into()),
            year: Selection::Only(2019),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&ds, &filters), vec![0, 2]);
    }

    #[test]
    fn adding_a_selector_never_grows_the_view() {
        let ds = sample();
        let mut filters = FilterState::default();
        let mut previous = FilteredView::new(&ds, &filters).len();
        for step in 0..3 {
            match step {
                0 => filters.city = Selection::Only("Yangon".into()),
                1 => filters.year = Selection::Only(2020),
                _ => filters.month = Selection::Only("march".into()),
            }
            let current = FilteredView::new(&ds, &filters).len();
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(previous, 1);
    }

    #[test]
    fn unmatched_selection_yields_an_empty_view() {
        let ds = sample();
        let filters = FilterState {
            city: Selection::Only("Mandalay".into()),
            month: Selection::Only("december".into()),
            ..Default::default()
        };
        let view = FilteredView::new(&ds, &filters);
        assert!(view.is_empty());
        assert_eq!(view.records().count(), 0);
    }

    #[test]
    fn rows_without_a_year_only_pass_all() {
        let mut rec = record("Yangon", 2019, "may", 1.0, 1.0);
        rec.year = None;
        let ds = dataset(vec![rec]);
        assert_eq!(filtered_indices(&ds, &FilterState::default()), vec![0]);
        let filters = FilterState {
            year: Selection::Only(2019),
            ..Default::default()
        };
        assert!(filtered_indices(&ds, &filters).is_empty());
    }

    #[test]
    fn options_are_sorted_and_months_follow_the_calendar() {
        let mut ds = sample();
        ds.records[1].month = "janury".into();
        let options = FilterOptions::from_dataset(&ds);
        assert_eq!(options.cities, vec!["Mandalay", "Naypyitaw", "Yangon"]);
        assert_eq!(options.years, vec![2019, 2020]);
        assert_eq!(options.months, vec!["january", "february", "march"]);
    }

    #[test]
    fn selection_displays_all_or_value() {
        assert_eq!(Selection::<i64>::All.to_string(), "All");
        assert_eq!(Selection::Only(2019).to_string(), "2019");
        let filters = FilterState {
            month: Selection::Only("march".into()),
            ..Default::default()
        };
        assert_eq!(filters.to_string(), "city=All year=All month=march");
    }
}
