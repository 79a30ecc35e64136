//! Writes a synthetic sales table for trying the dashboard out.
//!
//! Usage: `generate_sample [OUTPUT]` where OUTPUT ends in `.csv` (default
//! `walmartcleaned_datafile.csv`) or `.parquet`. A few values are left
//! deliberately messy (odd casing, padding, the "Febuary" spelling) so the
//! normalizer has work to do.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct SaleRow {
    invoice_id: String,
    #[serde(rename = "Branch")]
    branch: &'static str,
    #[serde(rename = "City")]
    city: String,
    category: String,
    unit_price: f64,
    quantity: i64,
    total_price: f64,
    payment_method: String,
    rating: f64,
    month: String,
    year: i64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

const BRANCHES: [(&str, &str); 3] = [("A", "Yangon"), ("B", "Mandalay"), ("C", "Naypyitaw")];
const CATEGORIES: [&str; 6] = [
    "Health and beauty",
    "Electronic accessories",
    "Home and lifestyle",
    "Sports and travel",
    "Food and beverages",
    "Fashion accessories",
];
const PAYMENTS: [&str; 3] = ["Ewallet", "Cash", "Credit card"];
const MONTHS: [&str; 12] = [
    "January", "Febuary", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Occasionally mangle a label the way hand-entered data does.
fn messy(rng: &mut SimpleRng, label: &str) -> String {
    match rng.below(10) {
        0 => label.to_uppercase(),
        1 => format!(" {} ", label.to_lowercase()),
        _ => label.to_string(),
    }
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Vec<SaleRow> {
    (0..rows)
        .map(|i| {
            let (branch, city) = *rng.pick(&BRANCHES);
            let unit_price = ((10.0 + rng.next_f64() * 90.0) * 100.0).round() / 100.0;
            let quantity = 1 + rng.below(10) as i64;
            let category = *rng.pick(&CATEGORIES);
            let payment = *rng.pick(&PAYMENTS);
            let month = *rng.pick(&MONTHS);
            SaleRow {
                invoice_id: format!("{:03}-{:02}-{:04}", 100 + i % 900, i % 97, i),
                branch,
                city: messy(rng, city),
                category: messy(rng, category),
                unit_price,
                quantity,
                total_price: (unit_price * quantity as f64 * 100.0).round() / 100.0,
                payment_method: messy(rng, payment),
                rating: (40.0 + rng.next_f64() * 60.0).round() / 10.0,
                month: messy(rng, month),
                year: 2019 + rng.below(5) as i64,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[SaleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SaleRow]) -> Result<()> {
    let strings = |f: fn(&SaleRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let floats = |f: fn(&SaleRow) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };
    let ints = |f: fn(&SaleRow) -> i64| -> ArrayRef {
        Arc::new(Int64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("invoice_id", DataType::Utf8, false),
        Field::new("Branch", DataType::Utf8, false),
        Field::new("City", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("unit_price", DataType::Float64, false),
        Field::new("quantity", DataType::Int64, false),
        Field::new("total_price", DataType::Float64, false),
        Field::new("payment_method", DataType::Utf8, false),
        Field::new("rating", DataType::Float64, false),
        Field::new("month", DataType::Utf8, false),
        Field::new("year", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            strings(|r| r.invoice_id.as_str()),
            strings(|r| r.branch),
            strings(|r| r.city.as_str()),
            strings(|r| r.category.as_str()),
            floats(|r| r.unit_price),
            ints(|r| r.quantity),
            floats(|r| r.total_price),
            strings(|r| r.payment_method.as_str()),
            floats(|r| r.rating),
            strings(|r| r.month.as_str()),
            ints(|r| r.year),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "walmartcleaned_datafile.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let rows = generate(1000, &mut rng);

    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => write_csv(path, &rows)?,
        Some("parquet") | Some("pq") => write_parquet(path, &rows)?,
        _ => bail!("output must end in .csv or .parquet: {output}"),
    }

    println!("Wrote {} sales rows to {output}", rows.len());
    Ok(())
}
