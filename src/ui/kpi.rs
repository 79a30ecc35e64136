use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::aggregate::KpiSummary;

const BOX_FILL: Color32 = Color32::from_rgb(0xf0, 0xf2, 0xf6);

/// Format with thousands separators and no decimals: `12345.6` → `"12,346"`.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return "–".to_string();
    }
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}

/// Average rating with one decimal, or a dash when no rating is present.
pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) => format!("{r:.1}"),
        None => "–".to_string(),
    }
}

/// The four headline boxes in one row.
pub fn kpi_row(ui: &mut Ui, kpis: &KpiSummary) {
    let boxes = [
        ("🛒 Total Quantity", format_thousands(kpis.total_quantity)),
        ("💰 Total Revenue", format_thousands(kpis.total_revenue)),
        ("⭐ Average Rating", format_rating(kpis.average_rating)),
        ("📦 Transactions", format_thousands(kpis.transaction_count as f64)),
    ];

    ui.columns(boxes.len(), |cols| {
        for (col, (title, value)) in cols.iter_mut().zip(boxes) {
            kpi_box(col, title, &value);
        }
    });
}

fn kpi_box(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style())
        .fill(BOX_FILL)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(title).size(18.0).strong().color(Color32::BLACK));
                ui.label(RichText::new(value).size(28.0).strong().color(Color32::BLACK));
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(1234567.8), "1,234,568");
        assert_eq!(format_thousands(-4200.0), "-4,200");
        assert_eq!(format_thousands(f64::NAN), "–");
    }

    #[test]
    fn missing_rating_shows_a_dash() {
        assert_eq!(format_rating(Some(6.97)), "7.0");
        assert_eq!(format_rating(None), "–");
    }
}
