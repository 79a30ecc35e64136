use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use super::aggregate::Aggregates;
use super::filter::FilteredView;
use super::model::NumberKind;

// ---------------------------------------------------------------------------
// Export tables
// ---------------------------------------------------------------------------

/// The tables the dashboard offers for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    CategoryTotals,
    PaymentCounts,
    MonthlyRevenue,
    FilteredTable,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [
        ExportKind::CategoryTotals,
        ExportKind::PaymentCounts,
        ExportKind::MonthlyRevenue,
        ExportKind::FilteredTable,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            ExportKind::CategoryTotals => "Total_Sales_by_Category.csv",
            ExportKind::PaymentCounts => "Total_Transactions.csv",
            ExportKind::MonthlyRevenue => "Revenue_by_Month.csv",
            ExportKind::FilteredTable => "Walmart_Data.csv",
        }
    }

    /// Serialize this table for the given view.
    pub fn to_csv(self, view: &FilteredView<'_>, aggregates: &Aggregates) -> Result<Vec<u8>> {
        let kinds = &view.dataset().kinds;
        match self {
            ExportKind::CategoryTotals => {
                category_totals_csv(&aggregates.category_totals, kinds.quantity)
            }
            ExportKind::PaymentCounts => payment_counts_csv(&aggregates.payment_counts),
            ExportKind::MonthlyRevenue => {
                monthly_revenue_csv(&aggregates.monthly_revenue, kinds.total_price)
            }
            ExportKind::FilteredTable => filtered_table_csv(view),
        }
    }
}

// ---------------------------------------------------------------------------
// Serializers
// ---------------------------------------------------------------------------

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| anyhow!("flushing CSV buffer: {}", e.error()))
}

/// `,category,quantity` with a positional index.
pub fn category_totals_csv(totals: &[(String, f64)], kind: NumberKind) -> Result<Vec<u8>> {
    let mut w = writer();
    w.write_record(["", "category", "quantity"])?;
    for (i, (category, sum)) in totals.iter().enumerate() {
        w.write_record([i.to_string(), category.clone(), kind.format(*sum)])?;
    }
    finish(w)
}

/// `,payment_method,transaction_count` with a positional index.
pub fn payment_counts_csv(counts: &[(String, usize)]) -> Result<Vec<u8>> {
    let mut w = writer();
    w.write_record(["", "payment_method", "transaction_count"])?;
    for (i, (method, count)) in counts.iter().enumerate() {
        w.write_record([i.to_string(), method.clone(), count.to_string()])?;
    }
    finish(w)
}

/// `month,total_price`; the month is the index column.
pub fn monthly_revenue_csv(monthly: &[(String, f64)], kind: NumberKind) -> Result<Vec<u8>> {
    let mut w = writer();
    w.write_record(["month", "total_price"])?;
    for (month, sum) in monthly {
        w.write_record([month.clone(), kind.format(*sum)])?;
    }
    finish(w)
}

/// Every input column in input order, each row led by its original index.
pub fn filtered_table_csv(view: &FilteredView<'_>) -> Result<Vec<u8>> {
    let dataset = view.dataset();
    let mut w = writer();

    let mut header = vec![String::new()];
    header.extend(dataset.columns.iter().cloned());
    w.write_record(&header)?;

    for record in view.records() {
        let mut row = Vec::with_capacity(dataset.columns.len() + 1);
        row.push(record.index.to_string());
        row.extend(
            dataset
                .columns
                .iter()
                .map(|c| record.cell_text(c, &dataset.kinds)),
        );
        w.write_record(&row)?;
    }
    finish(w)
}

/// Write all four tables into `dir`, returning the written paths.
pub fn export_all(
    dir: &Path,
    view: &FilteredView<'_>,
    aggregates: &Aggregates,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating export directory {}", dir.display()))?;

    ExportKind::ALL
        .iter()
        .map(|kind| {
            let path = dir.join(kind.file_name());
            let bytes = kind.to_csv(view, aggregates)?;
            std::fs::write(&path, bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Exported {}", path.display());
            Ok(path)
        })
        .collect()
}
