use std::collections::BTreeMap;
use std::f32::consts::TAU;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::{generate_palette, ColorMap};
use crate::data::aggregate::{month_axis, ScatterPoint};
use crate::data::model::MONTHS;

const CHART_HEIGHT: f32 = 380.0;
const BAR_COLOR: Color32 = Color32::from_rgb(0x63, 0x6e, 0xfa);
const PULLED_SLICE: &str = "Cash";

fn chart_title(ui: &mut Ui, title: &str) {
    ui.label(RichText::new(title).size(16.0).strong());
}

/// Label for a tick on a categorical axis; empty between categories.
pub fn label_at(labels: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}

/// Capitalized month name for a calendar position on the x axis.
pub fn month_label(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    MONTHS
        .get(rounded as usize)
        .map(|m| crate::data::normalize::title_case(m))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Units sold by category (horizontal bars)
// ---------------------------------------------------------------------------

pub fn category_bar(ui: &mut Ui, totals: &[(String, f64)]) {
    chart_title(ui, "🔍 Units Sold by Category");

    let labels: Vec<String> = totals.iter().map(|(c, _)| c.clone()).collect();
    let bars: Vec<Bar> = totals
        .iter()
        .enumerate()
        .map(|(i, (category, sum))| Bar::new(i as f64, *sum).name(category).fill(BAR_COLOR))
        .collect();
    let texts: Vec<Text> = totals
        .iter()
        .enumerate()
        .map(|(i, (_, sum))| {
            Text::new(PlotPoint::new(*sum, i as f64), format!("{sum}"))
                .anchor(Align2::LEFT_CENTER)
        })
        .collect();

    Plot::new("category_bar")
        .height(CHART_HEIGHT)
        .x_axis_label("Units Sold")
        .y_axis_label("Category")
        .y_axis_formatter(move |mark, _range| label_at(&labels, mark.value))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Units Sold"));
            for text in texts {
                plot_ui.text(text);
            }
        });
}

// ---------------------------------------------------------------------------
// Transactions by payment method (donut)
// ---------------------------------------------------------------------------

/// One donut slice, angles in radians starting at 12 o'clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub fraction: f32,
    pub start: f32,
    pub end: f32,
}

/// Lay the counts out around the circle. Empty when there is nothing to show.
pub fn donut_slices(counts: &[(String, usize)]) -> Vec<Slice> {
    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut angle = -TAU / 4.0;
    counts
        .iter()
        .map(|(label, n)| {
            let fraction = *n as f32 / total as f32;
            let start = angle;
            angle += fraction * TAU;
            Slice {
                label: label.clone(),
                fraction,
                start,
                end: angle,
            }
        })
        .collect()
}

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + egui::vec2(angle.cos(), angle.sin()) * radius
}

pub fn payment_donut(ui: &mut Ui, counts: &[(String, usize)]) {
    chart_title(ui, "💳 Transactions by Payment Method");

    let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let text_color = ui.visuals().text_color();

    let slices = donut_slices(counts);
    if slices.is_empty() {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No transactions",
            FontId::proportional(14.0),
            ui.visuals().weak_text_color(),
        );
        return;
    }

    let outer = (rect.width().min(rect.height()) * 0.5 - 48.0).max(16.0);
    let inner = outer * 0.5;
    let palette = generate_palette(slices.len());

    for (slice, color) in slices.iter().zip(palette) {
        let mid = (slice.start + slice.end) * 0.5;
        let pull = if slice.label == PULLED_SLICE { outer * 0.1 } else { 0.0 };
        let center = polar(rect.center(), pull, mid);

        // Annular sectors are not convex; paint them as thin quads.
        let steps = ((slice.end - slice.start) / (TAU / 180.0)).ceil().max(1.0) as usize;
        let step = (slice.end - slice.start) / steps as f32;
        for s in 0..steps {
            let a0 = slice.start + step * s as f32;
            let a1 = a0 + step;
            painter.add(Shape::convex_polygon(
                vec![
                    polar(center, inner, a0),
                    polar(center, outer, a0),
                    polar(center, outer, a1),
                    polar(center, inner, a1),
                ],
                color,
                Stroke::NONE,
            ));
        }

        let anchor = if mid.cos() >= 0.0 {
            Align2::LEFT_CENTER
        } else {
            Align2::RIGHT_CENTER
        };
        painter.text(
            polar(center, outer + 12.0, mid),
            anchor,
            format!("{} {:.1}%", slice.label, slice.fraction * 100.0),
            FontId::proportional(13.0),
            text_color,
        );
    }
}

// ---------------------------------------------------------------------------
// Revenue by month (line with markers)
// ---------------------------------------------------------------------------

pub fn monthly_line(ui: &mut Ui, monthly: &[(String, f64)]) {
    chart_title(ui, "📅 Revenue by Months");

    let points: Vec<[f64; 2]> = month_axis(monthly)
        .into_iter()
        .map(|(pos, revenue)| [pos as f64, revenue])
        .collect();

    Plot::new("monthly_line")
        .height(CHART_HEIGHT)
        .x_axis_label("Month")
        .y_axis_label("Total Revenue")
        .x_axis_formatter(|mark, _range| month_label(mark.value))
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(points.clone())).name("Total Revenue"));
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(4.0)
                    .color(Color32::BLACK),
            );
        });
}

// ---------------------------------------------------------------------------
// Quantity vs revenue (scatter)
// ---------------------------------------------------------------------------

pub fn scatter_plot(ui: &mut Ui, points: &[ScatterPoint], color_map: &ColorMap) {
    chart_title(ui, "📅 Quantity VS Revenue");

    let mut by_category: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        if p.quantity.is_nan() || p.total_price.is_nan() {
            continue;
        }
        by_category
            .entry(p.category.as_str())
            .or_default()
            .push([p.quantity, p.total_price]);
    }

    Plot::new("quantity_vs_revenue")
        .height(CHART_HEIGHT)
        .x_axis_label("Units Sold")
        .y_axis_label("Total Revenue")
        .show(ui, |plot_ui| {
            for (category, series) in by_category {
                let color = color_map.color_for(category).gamma_multiply(0.6);
                plot_ui.points(
                    Points::new(PlotPoints::from(series))
                        .radius(4.0)
                        .color(color)
                        .name(category),
                );
            }
        });
}

/// Coloured dots naming every category.
pub fn category_legend(ui: &mut Ui, color_map: &ColorMap) {
    for (label, color) in color_map.legend_entries() {
        ui.label(RichText::new(format!("● {label}")).color(color));
    }
}
