use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Canonical month names in calendar order. Monthly aggregation only ever
/// reports keys from this list.
pub const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Position of a canonical month name in [`MONTHS`].
pub fn month_position(month: &str) -> Option<usize> {
    MONTHS.iter().position(|m| *m == month)
}

/// Returned when a cell cannot be read as a whole number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotAWholeNumber;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the input table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Interpret the value as an `f64`. Missing cells become NaN.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Null => Some(f64::NAN),
            CellValue::String(s) => {
                let s = s.trim();
                if s.is_empty() || s.eq_ignore_ascii_case("nan") {
                    Some(f64::NAN)
                } else {
                    s.parse().ok()
                }
            }
            CellValue::Bool(_) => None,
        }
    }

    /// Interpret the value as a whole number. `Ok(None)` means missing.
    pub fn as_i64(&self) -> Result<Option<i64>, NotAWholeNumber> {
        match self {
            CellValue::Integer(i) => Ok(Some(*i)),
            CellValue::Null => Ok(None),
            CellValue::Float(v) if v.is_nan() => Ok(None),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => Ok(Some(*v as i64)),
            CellValue::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    return Ok(None);
                }
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(Some(i));
                }
                match s.parse::<f64>() {
                    Ok(v) if v.is_nan() => Ok(None),
                    Ok(v) if v.fract() == 0.0 && v.is_finite() => Ok(Some(v as i64)),
                    _ => Err(NotAWholeNumber),
                }
            }
            _ => Err(NotAWholeNumber),
        }
    }

    /// Text form of the value, `None` when missing.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Float(v) if v.is_nan() => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{}", format_float(*v)),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Null => Ok(()),
        }
    }
}

/// Render a float the way a dataframe writes float columns: always with a
/// fractional part (`160.0`), shortest round-trip digits otherwise, empty
/// for NaN.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

// ---------------------------------------------------------------------------
// Column – the fields the dashboard understands
// ---------------------------------------------------------------------------

/// A column the dashboard requires. All other input columns are carried
/// through untouched as [`SalesRecord::extra`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    InvoiceId,
    City,
    Year,
    Month,
    PaymentMethod,
    Category,
    Quantity,
    TotalPrice,
    Rating,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::InvoiceId,
        Column::City,
        Column::Year,
        Column::Month,
        Column::PaymentMethod,
        Column::Category,
        Column::Quantity,
        Column::TotalPrice,
        Column::Rating,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Column::InvoiceId => "invoice_id",
            Column::City => "city",
            Column::Year => "year",
            Column::Month => "month",
            Column::PaymentMethod => "payment_method",
            Column::Category => "category",
            Column::Quantity => "quantity",
            Column::TotalPrice => "total_price",
            Column::Rating => "rating",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

// ---------------------------------------------------------------------------
// NumberKind – how a numeric column prints
// ---------------------------------------------------------------------------

/// Whether a numeric column was integral in the input. Drives export
/// formatting only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumberKind {
    Integer,
    #[default]
    Float,
}

impl NumberKind {
    pub fn from_integral(integral: bool) -> Self {
        if integral {
            NumberKind::Integer
        } else {
            NumberKind::Float
        }
    }

    pub fn format(self, v: f64) -> String {
        match self {
            NumberKind::Integer if v.is_finite() => format!("{}", v as i64),
            _ => format_float(v),
        }
    }
}

/// Number kinds of the numeric columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnKinds {
    pub year: NumberKind,
    pub quantity: NumberKind,
    pub total_price: NumberKind,
    pub rating: NumberKind,
    /// Pass-through columns whose present cells are all numbers.
    pub extra: BTreeMap<String, NumberKind>,
}

impl ColumnKinds {
    /// Text of a pass-through cell; numbers follow their column's kind.
    pub fn extra_text(&self, column: &str, value: &CellValue) -> String {
        match (self.extra.get(column), value) {
            (Some(kind), CellValue::Integer(i)) => kind.format(*i as f64),
            (Some(kind), CellValue::Float(v)) => kind.format(*v),
            _ => value.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// SalesRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single sales transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    /// 0-based row position in the input file.
    pub index: usize,
    pub invoice_id: Option<String>,
    pub city: String,
    pub year: Option<i64>,
    pub month: String,
    pub payment_method: String,
    pub category: String,
    pub quantity: f64,
    pub total_price: f64,
    pub rating: f64,
    /// Every other input column: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl SalesRecord {
    /// Text of a cell for CSV export; empty when missing.
    pub fn cell_text(&self, column: &str, kinds: &ColumnKinds) -> String {
        match Column::from_name(column) {
            Some(Column::InvoiceId) => self.invoice_id.clone().unwrap_or_default(),
            Some(Column::City) => self.city.clone(),
            Some(Column::Year) => match self.year {
                Some(y) => kinds.year.format(y as f64),
                None => String::new(),
            },
            Some(Column::Month) => self.month.clone(),
            Some(Column::PaymentMethod) => self.payment_method.clone(),
            Some(Column::Category) => self.category.clone(),
            Some(Column::Quantity) => kinds.quantity.format(self.quantity),
            Some(Column::TotalPrice) => kinds.total_price.format(self.total_price),
            Some(Column::Rating) => kinds.rating.format(self.rating),
            None => self
                .extra
                .get(column)
                .map(|v| kinds.extra_text(column, v))
                .unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// All input column names in input order (normalized).
    pub columns: Vec<String>,
    /// All records (rows) in input order.
    pub records: Vec<SalesRecord>,
    pub kinds: ColumnKinds,
}

impl Dataset {
    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_keep_a_fractional_digit() {
        assert_eq!(format_float(160.0), "160.0");
        assert_eq!(format_float(12.5), "12.5");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(f64::NAN), "");
    }

    #[test]
    fn integer_kind_drops_the_fraction() {
        assert_eq!(NumberKind::Integer.format(8.0), "8");
        assert_eq!(NumberKind::Float.format(8.0), "8.0");
        assert_eq!(NumberKind::Integer.format(f64::NAN), "");
    }

    #[test]
    fn pass_through_numbers_follow_their_column_kind() {
        let mut kinds = ColumnKinds::default();
        kinds.extra.insert("unit_price".into(), NumberKind::Float);
        kinds.extra.insert("branch_no".into(), NumberKind::Integer);

        assert_eq!(kinds.extra_text("unit_price", &CellValue::Integer(74)), "74.0");
        assert_eq!(kinds.extra_text("unit_price", &CellValue::Float(74.5)), "74.5");
        assert_eq!(kinds.extra_text("unit_price", &CellValue::Null), "");
        assert_eq!(kinds.extra_text("branch_no", &CellValue::Integer(3)), "3");
        assert_eq!(kinds.extra_text("branch", &CellValue::Integer(3)), "3");
        assert_eq!(kinds.extra_text("branch", &CellValue::String("A".into())), "A");
    }

    #[test]
    fn year_cells_accept_float_spelling() {
        assert_eq!(CellValue::Float(2019.0).as_i64(), Ok(Some(2019)));
        assert_eq!(CellValue::String("2020.0".into()).as_i64(), Ok(Some(2020)));
        assert_eq!(CellValue::Null.as_i64(), Ok(None));
        assert!(CellValue::String("twenty".into()).as_i64().is_err());
    }

    #[test]
    fn month_positions_follow_the_calendar() {
        assert_eq!(month_position("january"), Some(0));
        assert_eq!(month_position("december"), Some(11));
        assert_eq!(month_position("febuary"), None);
    }
}
