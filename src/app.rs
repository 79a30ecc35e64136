use eframe::egui::{self, RichText, Ui};

use crate::data::export::ExportKind;
use crate::state::AppState;
use crate::ui::{charts, kpi, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &mut self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new("📊 Sales Dashboard").size(28.0));
    ui.separator();

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view sales  (File → Open…)");
        });
        return;
    }

    kpi::kpi_row(ui, &state.aggregates.kpis);
    ui.separator();

    ui.columns(2, |cols| {
        charts::category_bar(&mut cols[0], &state.aggregates.category_totals);
        cols[0].collapsing(RichText::new("🔍 View Total Sales by Category").strong(), |ui| {
            table::pair_grid(
                ui,
                "category_totals",
                ["category", "quantity"],
                &state.aggregates.category_totals,
            );
        });
        table::download_button(&mut cols[0], state, ExportKind::CategoryTotals);

        charts::payment_donut(&mut cols[1], &state.aggregates.payment_counts);
        cols[1].collapsing(RichText::new("🔍 View Total Transactions").strong(), |ui| {
            table::pair_grid(
                ui,
                "payment_counts",
                ["payment_method", "transaction_count"],
                &state.aggregates.payment_counts,
            );
        });
        table::download_button(&mut cols[1], state, ExportKind::PaymentCounts);
    });
    ui.separator();

    ui.columns(2, |cols| {
        charts::monthly_line(&mut cols[0], &state.aggregates.monthly_revenue);
        cols[0].collapsing(RichText::new("🔍 View Revenue by Month Report").strong(), |ui| {
            table::pair_grid(
                ui,
                "monthly_revenue",
                ["month", "total_price"],
                &state.aggregates.monthly_revenue,
            );
        });
        table::download_button(&mut cols[0], state, ExportKind::MonthlyRevenue);

        charts::scatter_plot(&mut cols[1], &state.aggregates.scatter, &state.color_map);
        cols[1].collapsing("🗂️ View Category Legend", |ui| {
            charts::category_legend(ui, &state.color_map);
        });
    });
    ui.separator();

    ui.heading("📋 Detailed Transaction Data");
    ui.collapsing(RichText::new("🔍 View Raw Data").strong(), |ui| {
        table::data_table(ui, state);
    });
    table::download_button(ui, state, ExportKind::FilteredTable);
}
