use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, ColumnKinds, Dataset, NumberKind, SalesRecord};
use super::normalize::{coerce_missing, normalize_header};
use super::DatasetError;

static NULL_CELL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// RawTable – what every format parses into
// ---------------------------------------------------------------------------

/// A loosely typed table straight out of a file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one transaction per line
/// * `.json`    – `[{ "invoice_id": "...", "city": "...", ... }, ...]`
/// * `.parquet` – flat columns (strings, ints, floats, bools)
///
/// The result is not normalized yet; see [`super::normalize`].
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV file {}", path.display()))?;
            read_csv(file)?
        }
        "json" => read_json(
            &std::fs::read_to_string(path)
                .with_context(|| format!("reading JSON file {}", path.display()))?,
        )?,
        "parquet" | "pq" => read_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let dataset = build_dataset(table)
        .with_context(|| format!("building dataset from {}", path.display()))?;
    log::info!(
        "Loaded {} records with columns {:?} from {}",
        dataset.len(),
        dataset.columns,
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// RawTable → Dataset
// ---------------------------------------------------------------------------

/// Resolve the required columns and type every row.
///
/// Headers are lowercased and trimmed first. A missing required column or a
/// non-numeric value in a numeric column fails the whole load.
pub fn build_dataset(table: RawTable) -> Result<Dataset, DatasetError> {
    let columns: Vec<String> = table.columns.iter().map(|c| normalize_header(c)).collect();

    let positions = Column::ALL
        .iter()
        .map(|col| {
            columns
                .iter()
                .position(|c| c == col.name())
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: col.name(),
                    available: columns.clone(),
                })
        })
        .collect::<Result<Vec<usize>, _>>()?;

    let extra_columns: Vec<(usize, &String)> = columns
        .iter()
        .enumerate()
        .filter(|(_, name)| Column::from_name(name).is_none())
        .collect();

    let mut year_integral = true;
    let mut quantity_integral = true;
    let mut total_price_integral = true;
    let mut rating_integral = true;
    let mut extra_kinds = vec![ExtraKind::default(); extra_columns.len()];

    let mut records = Vec::with_capacity(table.rows.len());
    for (row, cells) in table.rows.iter().enumerate() {
        let cell = |col: Column| cells.get(positions[col as usize]).unwrap_or(&NULL_CELL);

        let year = cell(Column::Year)
            .as_i64()
            .map_err(|_| invalid_number(row, Column::Year, cell(Column::Year)))?;
        let quantity = number(row, Column::Quantity, cell(Column::Quantity))?;
        let total_price = number(row, Column::TotalPrice, cell(Column::TotalPrice))?;
        let rating = number(row, Column::Rating, cell(Column::Rating))?;

        year_integral &= matches!(cell(Column::Year), CellValue::Integer(_));
        quantity_integral &= matches!(cell(Column::Quantity), CellValue::Integer(_));
        total_price_integral &= matches!(cell(Column::TotalPrice), CellValue::Integer(_));
        rating_integral &= matches!(cell(Column::Rating), CellValue::Integer(_));

        let extra = extra_columns
            .iter()
            .zip(extra_kinds.iter_mut())
            .map(|((i, name), kind)| {
                let value = cells.get(*i).cloned().unwrap_or(CellValue::Null);
                kind.observe(&value);
                ((*name).clone(), value)
            })
            .collect::<BTreeMap<_, _>>();

        records.push(SalesRecord {
            index: row,
            invoice_id: cell(Column::InvoiceId).as_text(),
            city: coerce_missing(cell(Column::City).as_text()),
            year,
            month: coerce_missing(cell(Column::Month).as_text()),
            payment_method: coerce_missing(cell(Column::PaymentMethod).as_text()),
            category: coerce_missing(cell(Column::Category).as_text()),
            quantity,
            total_price,
            rating,
            extra,
        });
    }

    let extra = extra_columns
        .iter()
        .zip(extra_kinds)
        .filter_map(|((_, name), kind)| kind.number_kind().map(|k| ((*name).clone(), k)))
        .collect();

    Ok(Dataset {
        columns,
        records,
        kinds: ColumnKinds {
            year: NumberKind::from_integral(year_integral),
            quantity: NumberKind::from_integral(quantity_integral),
            total_price: NumberKind::from_integral(total_price_integral),
            rating: NumberKind::from_integral(rating_integral),
            extra,
        },
    })
}

/// Running dtype guess for one pass-through column. A column is numeric when
/// every present cell is a number; it stays integral only while no cell is
/// a float or missing.
#[derive(Debug, Clone, Copy)]
struct ExtraKind {
    numeric: bool,
    integral: bool,
    seen: bool,
}

impl Default for ExtraKind {
    fn default() -> Self {
        Self {
            numeric: true,
            integral: true,
            seen: false,
        }
    }
}

impl ExtraKind {
    fn observe(&mut self, cell: &CellValue) {
        match cell {
            CellValue::Integer(_) => self.seen = true,
            CellValue::Float(_) => {
                self.seen = true;
                self.integral = false;
            }
            CellValue::Null => self.integral = false,
            CellValue::String(_) | CellValue::Bool(_) => self.numeric = false,
        }
    }

    fn number_kind(self) -> Option<NumberKind> {
        (self.numeric && self.seen).then(|| NumberKind::from_integral(self.integral))
    }
}

fn number(row: usize, column: Column, value: &CellValue) -> Result<f64, DatasetError> {
    value
        .as_f64()
        .ok_or_else(|| invalid_number(row, column, value))
}

fn invalid_number(row: usize, column: Column, value: &CellValue) -> DatasetError {
    DatasetError::InvalidNumber {
        row,
        column: column.name(),
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one transaction per line.
/// Cell types are guessed per value.
pub fn read_csv<R: Read>(source: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { columns, rows })
}

/// Cell texts read as missing, matching the default NA set of dataframe CSV
/// readers.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn guess_cell_type(s: &str) -> CellValue {
    if NA_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s {
        "True" | "true" => CellValue::Bool(true),
        "False" | "false" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "invoice_id": "750-67-8428", "city": "Yangon", "quantity": 7, ... },
///   ...
/// ]
/// ```
///
/// Columns appear in the order they are first seen; a key missing from a
/// record reads as null.
pub fn read_json(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { columns, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .zip(&columns)
                .map(|(col, name)| {
                    extract_cell(col, row)
                        .with_context(|| format!("parquet column '{name}', row {row}"))
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(cells);
        }
    }

    Ok(RawTable { columns, rows })
}

/// Extract a single cell from an Arrow column at a given row. Types without
/// a direct counterpart (dictionaries, dates, decimals, ...) keep their
/// display text.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Dictionary(_, values) if values.is_numeric() => {
            guess_cell_type(&array_value_to_string(col, row)?)
        }
        _ => CellValue::String(array_value_to_string(col, row)?),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Invoice_ID, City ,Category,Payment_Method,Quantity,Total_Price,Rating,Month,Year,Branch
750-67-8428,Yangon,Health and beauty,Ewallet,7,522.83,9.1,January,2019,A
226-31-3081,Naypyitaw,Electronic accessories,Cash,5,76.4,9.6,Febuary,2019,C
,Yangon,,Credit card,,10.5,,March,,A
";

    #[test]
    fn csv_headers_are_normalized_and_extras_kept() {
        let table = read_csv(SAMPLE.as_bytes()).expect("valid csv");
        let dataset = build_dataset(table).expect("all columns present");

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.columns[1], "city");
        assert_eq!(dataset.columns.last().map(String::as_str), Some("branch"));

        let first = &dataset.records[0];
        assert_eq!(first.invoice_id.as_deref(), Some("750-67-8428"));
        assert_eq!(first.year, Some(2019));
        assert_eq!(first.quantity, 7.0);
        assert_eq!(first.extra.get("branch"), Some(&CellValue::String("A".into())));
    }

    #[test]
    fn missing_cells_become_nan_text_or_nan_numbers() {
        let dataset = build_dataset(read_csv(SAMPLE.as_bytes()).expect("valid csv"))
            .expect("all columns present");
        let third = &dataset.records[2];
        assert_eq!(third.index, 2);
        assert_eq!(third.invoice_id, None);
        assert_eq!(third.category, "nan");
        assert_eq!(third.year, None);
        assert!(third.quantity.is_nan());
        assert!(third.rating.is_nan());

        assert_eq!(dataset.kinds.quantity, NumberKind::Float);
        assert_eq!(dataset.kinds.year, NumberKind::Float);
        assert_eq!(dataset.kinds.total_price, NumberKind::Float);
    }

    #[test]
    fn integral_columns_are_detected() {
        let csv = "invoice_id,city,category,payment_method,quantity,total_price,rating,month,year\n\
                   1,Yangon,Food,Cash,3,60,7,may,2019\n";
        let dataset = build_dataset(read_csv(csv.as_bytes()).expect("valid csv"))
            .expect("all columns present");
        assert_eq!(dataset.kinds.quantity, NumberKind::Integer);
        assert_eq!(dataset.kinds.year, NumberKind::Integer);
        assert_eq!(dataset.records[0].invoice_id.as_deref(), Some("1"));
    }

    #[test]
    fn missing_column_is_reported() {
        let csv = "invoice_id,city,category,payment_method,quantity,total_price,month,year\n";
        let err = build_dataset(read_csv(csv.as_bytes()).expect("valid csv"))
            .expect_err("rating is missing");
        assert!(matches!(err, DatasetError::MissingColumn { column: "rating", .. }));
        assert!(err.to_string().contains("available: invoice_id, city"));
    }

    #[test]
    fn non_numeric_quantity_is_rejected() {
        let csv = "invoice_id,city,category,payment_method,quantity,total_price,rating,month,year\n\
                   1,Yangon,Food,Cash,three,60,7,may,2019\n";
        let err = build_dataset(read_csv(csv.as_bytes()).expect("valid csv"))
            .expect_err("quantity is not a number");
        assert_eq!(
            err,
            DatasetError::InvalidNumber {
                row: 0,
                column: "quantity",
                value: "three".into()
            }
        );
    }

    #[test]
    fn json_records_load_in_first_seen_column_order() {
        let json = r#"[
            {"invoice_id": "a", "city": "Yangon", "category": "Food", "payment_method": "Cash",
             "quantity": 2, "total_price": 20.5, "rating": 8.0, "month": "may", "year": 2019},
            {"invoice_id": "b", "city": "Mandalay", "category": "Food", "payment_method": "Cash",
             "quantity": 1, "total_price": 9.5, "month": "june", "year": 2020, "branch": "B"}
        ]"#;
        let table = read_json(json).expect("valid json");
        assert_eq!(table.columns.last().map(String::as_str), Some("branch"));
        assert_eq!(table.rows[0].last(), Some(&CellValue::Null));

        let dataset = build_dataset(table).expect("all columns present");
        assert_eq!(dataset.records[1].city, "Mandalay");
        assert!(dataset.records[1].rating.is_nan());
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, SAMPLE).expect("write sample");
        let dataset = load_file(&path).expect("csv loads");
        assert_eq!(dataset.len(), 3);

        let unknown = dir.path().join("sales.xlsx");
        std::fs::write(&unknown, "").expect("write placeholder");
        let err = load_file(&unknown).expect_err("xlsx unsupported");
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn dataframe_na_tokens_read_as_missing() {
        let csv = "invoice_id,city,category,payment_method,quantity,total_price,rating,month,year\n\
                   NULL,N/A,Food,Cash,NA,60,#N/A,may,None\n";
        let dataset = build_dataset(read_csv(csv.as_bytes()).expect("valid csv"))
            .expect("missing values are not errors");
        let record = &dataset.records[0];
        assert_eq!(record.invoice_id, None);
        assert_eq!(record.city, "nan");
        assert!(record.quantity.is_nan());
        assert!(record.rating.is_nan());
        assert_eq!(record.year, None);

        assert_eq!(guess_cell_type("Nana"), CellValue::String("Nana".into()));
        assert_eq!(guess_cell_type(" NA"), CellValue::String(" NA".into()));
    }

    #[test]
    fn numeric_pass_through_columns_get_a_kind() {
        let csv = "invoice_id,city,category,payment_method,quantity,total_price,rating,month,year,unit_price,branch_no,branch\n\
                   1,Yangon,Food,Cash,3,60,7,may,2019,74,1,A\n\
                   2,Yangon,Food,Cash,3,60,7,may,2019,74.5,2,B\n\
                   3,Yangon,Food,Cash,3,60,7,may,2019,,3,7\n";
        let dataset = build_dataset(read_csv(csv.as_bytes()).expect("valid csv"))
            .expect("all columns present");

        assert_eq!(dataset.kinds.extra.get("unit_price"), Some(&NumberKind::Float));
        assert_eq!(dataset.kinds.extra.get("branch_no"), Some(&NumberKind::Integer));
        assert_eq!(dataset.kinds.extra.get("branch"), None);

        let cells: Vec<String> = dataset
            .records
            .iter()
            .map(|r| r.cell_text("unit_price", &dataset.kinds))
            .collect();
        assert_eq!(cells, vec!["74.0", "74.5", ""]);
        assert_eq!(dataset.records[2].cell_text("branch_no", &dataset.kinds), "3");
        assert_eq!(dataset.records[2].cell_text("branch", &dataset.kinds), "7");
    }

    #[test]
    fn parquet_dictionary_and_date_columns_keep_their_values() {
        use arrow::array::{
            ArrayRef, Date32Array, DictionaryArray, Float64Array, Int64Array, StringArray,
        };
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let strings = |values: [&str; 2]| -> ArrayRef { Arc::new(StringArray::from(values.to_vec())) };
        let city: DictionaryArray<Int32Type> = ["Yangon", "Mandalay"].into_iter().collect();
        let batch = RecordBatch::try_from_iter(vec![
            ("invoice_id", strings(["a", "b"])),
            ("city", Arc::new(city) as ArrayRef),
            ("category", strings(["Food", "Toys"])),
            ("payment_method", strings(["Cash", "Ewallet"])),
            ("quantity", Arc::new(Int64Array::from(vec![2, 3])) as ArrayRef),
            ("total_price", Arc::new(Float64Array::from(vec![20.5, 9.0])) as ArrayRef),
            ("rating", Arc::new(Float64Array::from(vec![8.0, 6.5])) as ArrayRef),
            ("month", strings(["january", "february"])),
            ("year", Arc::new(Int64Array::from(vec![2019, 2019])) as ArrayRef),
            ("date", Arc::new(Date32Array::from(vec![17897, 17928])) as ArrayRef),
        ])
        .expect("valid batch");

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sales.parquet");
        let file = std::fs::File::create(&path).expect("create parquet");
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close writer");

        let dataset = load_file(&path).expect("parquet loads");
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[0].city, "Yangon");
        assert_eq!(dataset.records[1].city, "Mandalay");
        assert_eq!(dataset.records[1].quantity, 3.0);
        assert_eq!(dataset.kinds.quantity, NumberKind::Integer);
        assert_eq!(
            dataset.records[0].extra.get("date"),
            Some(&CellValue::String("2019-01-01".into()))
        );
        assert_eq!(dataset.records[1].cell_text("date", &dataset.kinds), "2019-02-01");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_file(Path::new("/nonexistent/sales.csv")).expect_err("no such file");
        assert!(format!("{err:#}").contains("opening CSV file"));
    }
}
