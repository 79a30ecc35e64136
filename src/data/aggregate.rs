use std::collections::BTreeMap;
use std::fmt;

use super::filter::FilteredView;
use super::model::{month_position, SalesRecord, MONTHS};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Headline figures of a view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KpiSummary {
    pub total_quantity: f64,
    pub total_revenue: f64,
    /// Mean of the present ratings; `None` when the view has none.
    pub average_rating: Option<f64>,
    pub transaction_count: usize,
}

impl fmt::Display for KpiSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} transactions, quantity {}, revenue {}, average rating ",
            self.transaction_count, self.total_quantity, self.total_revenue
        )?;
        match self.average_rating {
            Some(r) => write!(f, "{r:.2}"),
            None => write!(f, "n/a"),
        }
    }
}

/// One scatter point: units sold vs revenue, coloured by category.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub quantity: f64,
    pub total_price: f64,
    pub category: String,
}

/// Everything the dashboard draws, derived from one [`FilteredView`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregates {
    /// category → units sold, ascending.
    pub category_totals: Vec<(String, f64)>,
    /// payment method → transactions, ascending.
    pub payment_counts: Vec<(String, usize)>,
    /// canonical month → revenue, calendar order, absent months omitted.
    pub monthly_revenue: Vec<(String, f64)>,
    pub scatter: Vec<ScatterPoint>,
    pub kpis: KpiSummary,
}

impl Aggregates {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let aggregates = Aggregates {
            category_totals: category_totals(view),
            payment_counts: payment_counts(view),
            monthly_revenue: monthly_revenue(view),
            scatter: scatter_points(view),
            kpis: kpi_summary(view),
        };
        log::debug!(
            "aggregated {} rows: {} categories, {} payment methods, {} months",
            view.len(),
            aggregates.category_totals.len(),
            aggregates.payment_counts.len(),
            aggregates.monthly_revenue.len()
        );
        aggregates
    }
}

// ---------------------------------------------------------------------------
// Generic group operations
// ---------------------------------------------------------------------------

/// Sum of the present (non-NaN) values.
fn nan_sum(values: impl Iterator<Item = f64>) -> f64 {
    values.filter(|v| !v.is_nan()).sum()
}

/// Partition rows by `key`, sum `value` per group and sort ascending by the
/// sum. Ties keep key order.
pub fn group_sum<'a, K, V>(view: &FilteredView<'a>, key: K, value: V) -> Vec<(String, f64)>
where
    K: Fn(&'a SalesRecord) -> &'a str,
    V: Fn(&SalesRecord) -> f64,
{
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    for record in view.records() {
        let sum = groups.entry(key(record)).or_insert(0.0);
        let v = value(record);
        if !v.is_nan() {
            *sum += v;
        }
    }
    let mut out: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(k, sum)| (k.to_string(), sum))
        .collect();
    out.sort_by(|a, b| a.1.total_cmp(&b.1));
    out
}

/// Partition rows by `key`, count rows whose `id` is present and sort
/// ascending by the count. Ties keep key order.
pub fn group_count<'a, K, I>(view: &FilteredView<'a>, key: K, id: I) -> Vec<(String, usize)>
where
    K: Fn(&'a SalesRecord) -> &'a str,
    I: Fn(&SalesRecord) -> bool,
{
    let mut groups: BTreeMap<&str, usize> = BTreeMap::new();
    for record in view.records() {
        let count = groups.entry(key(record)).or_insert(0);
        if id(record) {
            *count += 1;
        }
    }
    let mut out: Vec<(String, usize)> = groups
        .into_iter()
        .map(|(k, count)| (k.to_string(), count))
        .collect();
    out.sort_by(|a, b| a.1.cmp(&b.1));
    out
}

/// Group by a month key, sum `value`, and lay the groups out in `calendar`
/// order. Months with no rows are omitted, as are keys outside the calendar.
pub fn calendar_group_sum<'a, K, V>(
    view: &FilteredView<'a>,
    month: K,
    value: V,
    calendar: &[&str],
) -> Vec<(String, f64)>
where
    K: Fn(&'a SalesRecord) -> &'a str,
    V: Fn(&SalesRecord) -> f64,
{
    let mut groups: BTreeMap<&str, f64> = BTreeMap::new();
    let mut outside = 0usize;
    for record in view.records() {
        let key = month(record);
        if !calendar.iter().any(|m| *m == key) {
            outside += 1;
            continue;
        }
        let sum = groups.entry(key).or_insert(0.0);
        let v = value(record);
        if !v.is_nan() {
            *sum += v;
        }
    }
    if outside > 0 {
        log::warn!("{outside} rows have a month outside the calendar and are left out of monthly totals");
    }
    calendar
        .iter()
        .filter_map(|m| groups.get(*m).map(|sum| (m.to_string(), *sum)))
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard aggregates
// ---------------------------------------------------------------------------

/// Units sold per category.
pub fn category_totals(view: &FilteredView<'_>) -> Vec<(String, f64)> {
    group_sum(view, |r| r.category.as_str(), |r| r.quantity)
}

/// Transactions per payment method.
pub fn payment_counts(view: &FilteredView<'_>) -> Vec<(String, usize)> {
    group_count(view, |r| r.payment_method.as_str(), |r| r.invoice_id.is_some())
}

/// Revenue per month in calendar order.
pub fn monthly_revenue(view: &FilteredView<'_>) -> Vec<(String, f64)> {
    calendar_group_sum(view, |r| r.month.as_str(), |r| r.total_price, &MONTHS)
}

/// Per-row (quantity, total_price, category).
pub fn scatter_points(view: &FilteredView<'_>) -> Vec<ScatterPoint> {
    view.records()
        .map(|r| ScatterPoint {
            quantity: r.quantity,
            total_price: r.total_price,
            category: r.category.clone(),
        })
        .collect()
}

/// Sums, mean rating and row count. The mean of no ratings is `None`.
pub fn kpi_summary(view: &FilteredView<'_>) -> KpiSummary {
    let ratings: Vec<f64> = view
        .records()
        .map(|r| r.rating)
        .filter(|v| !v.is_nan())
        .collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };

    KpiSummary {
        total_quantity: nan_sum(view.records().map(|r| r.quantity)),
        total_revenue: nan_sum(view.records().map(|r| r.total_price)),
        average_rating,
        transaction_count: view.len(),
    }
}

/// Calendar position of each month key, for charts that need an x value.
pub fn month_axis(monthly: &[(String, f64)]) -> Vec<(usize, f64)> {
    monthly
        .iter()
        .filter_map(|(m, v)| month_position(m).map(|p| (p, *v)))
        .collect()
}
