use super::model::{Dataset, SalesRecord};

/// Text used for a missing categorical cell. It is normalized like any other
/// value and ends up as its own category ("nan" month, "Nan" city).
pub const MISSING_TEXT: &str = "nan";

/// Known month misspellings and their canonical name.
const MONTH_CORRECTIONS: &[(&str, &str)] = &[("febuary", "february")];

/// Lowercase and trim a column header.
pub fn normalize_header(header: &str) -> String {
    header.to_lowercase().trim().to_string()
}

/// Coerce an optional cell text to the string the normalizer works on.
pub fn coerce_missing(text: Option<String>) -> String {
    text.unwrap_or_else(|| MISSING_TEXT.to_string())
}

/// Lowercase, trim and apply the correction table.
pub fn normalize_month(month: &str) -> String {
    let month = month.to_lowercase().trim().to_string();
    MONTH_CORRECTIONS
        .iter()
        .find(|(wrong, _)| *wrong == month)
        .map(|(_, right)| right.to_string())
        .unwrap_or(month)
}

/// Trim and title-case a categorical label.
pub fn normalize_label(label: &str) -> String {
    title_case(label.trim())
}

/// Upper-case the first letter of every alphabetic run and lower-case the
/// rest: `"health and beauty"` → `"Health And Beauty"`, `"e-wallet"` →
/// `"E-Wallet"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_alphabetic = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            out.push(c);
            previous_alphabetic = false;
        }
    }
    out
}

/// Normalize the categorical fields of one record in place.
pub fn normalize_record(record: &mut SalesRecord) {
    record.month = normalize_month(&record.month);
    record.payment_method = normalize_label(&record.payment_method);
    record.category = normalize_label(&record.category);
    record.city = normalize_label(&record.city);
}

/// Produce the normalized copy of a dataset. Idempotent.
pub fn normalize_dataset(mut dataset: Dataset) -> Dataset {
    let mut changed = 0usize;
    for record in &mut dataset.records {
        let before = record.clone();
        normalize_record(record);
        if *record != before {
            changed += 1;
        }
    }
    log::debug!("normalized {} of {} records", changed, dataset.len());
    dataset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testutil::{dataset, record};

    #[test]
    fn title_case_matches_dataframe_behaviour() {
        assert_eq!(title_case("health and beauty"), "Health And Beauty");
        assert_eq!(title_case("EWALLET"), "Ewallet");
        assert_eq!(title_case("e-wallet"), "E-Wallet");
        assert_eq!(title_case("credit card"), "Credit Card");
        assert_eq!(title_case("nan"), "Nan");
    }

    #[test]
    fn months_are_lowered_trimmed_and_corrected() {
        assert_eq!(normalize_month("  January "), "january");
        assert_eq!(normalize_month("Febuary"), "february");
        assert_eq!(normalize_month("FEBRUARY"), "february");
        assert_eq!(normalize_month("Janury"), "janury");
    }

    #[test]
    fn missing_text_passes_through_as_its_own_value() {
        assert_eq!(normalize_month(&coerce_missing(None)), "nan");
        assert_eq!(normalize_label(&coerce_missing(None)), "Nan");
        assert_eq!(coerce_missing(Some("Yangon".into())), "Yangon");
    }

    #[test]
    fn headers_are_lowered_and_trimmed() {
        assert_eq!(normalize_header(" Total_Price "), "total_price");
        assert_eq!(normalize_header("Invoice_ID"), "invoice_id");
    }

    #[test]
    fn normalization_is_idempotent() {
        let mut messy = record(" yangon ", 2019, " Febuary", 5.0, 100.0);
        messy.category = "  electronic ACCESSORIES".to_string();
        messy.payment_method = "ewallet ".to_string();
        let raw = dataset(vec![messy, record("MANDALAY", 2020, "MARCH", 1.0, 10.0)]);

        let once = normalize_dataset(raw);
        let twice = normalize_dataset(once.clone());
        assert_eq!(once, twice);

        let first = &once.records[0];
        assert_eq!(first.city, "Yangon");
        assert_eq!(first.month, "february");
        assert_eq!(first.category, "Electronic Accessories");
        assert_eq!(first.payment_method, "Ewallet");
        assert_eq!(once.records[1].city, "Mandalay");
    }
}
