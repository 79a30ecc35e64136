//! Rendering: panels, KPI boxes, charts and tables. Everything here reads
//! from [`crate::state::AppState`]; only selectors and buttons mutate it.

pub mod charts;
pub mod kpi;
pub mod panels;
pub mod table;
