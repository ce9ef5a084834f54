//! Chart Viewer Widget
//! Central scrollable dashboard: key metrics, charts and tables, one section each.

use crate::charts::layout::{self, Sunburst};
use crate::charts::ChartPlotter;
use crate::data::aggregate::DistrictTotals;
use crate::data::DashboardViews;
use crate::error::DashboardError;
use egui::{Color32, RichText, ScrollArea};

const SECTION_SPACING: f32 = 15.0;
const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 30);
const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

/// Error banner contents.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub hint: Option<&'static str>,
}

impl From<&DashboardError> for Diagnostic {
    fn from(err: &DashboardError) -> Self {
        Self {
            message: err.diagnostic(),
            hint: err.hint(),
        }
    }
}

#[derive(Default)]
pub struct ChartViewer {
    pub views: Option<DashboardViews>,
    /// Sunburst geometry for the current views.
    sunburst: Option<Sunburst>,
    pub diagnostic: Option<Diagnostic>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.views = None;
        self.sunburst = None;
    }

    pub fn set_views(&mut self, views: DashboardViews) {
        self.sunburst = views.district_items.as_deref().map(layout::sunburst_rings);
        self.views = Some(views);
        self.diagnostic = None;
    }

    pub fn set_error(&mut self, err: &DashboardError) {
        self.diagnostic = Some(Diagnostic::from(err));
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        if let Some(diagnostic) = &self.diagnostic {
            Self::draw_diagnostic(ui, diagnostic);
            ui.add_space(SECTION_SPACING);
        }

        let Some(views) = &self.views else {
            if self.diagnostic.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
            }
            return;
        };
        let sunburst = self.sunburst.as_ref();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new("🛒 Shop-wise Transaction Dashboard").size(26.0));
                ui.separator();

                Self::section(ui, "Key Metrics Overview");
                ChartPlotter::draw_key_metrics(ui, &views.metrics);

                Self::section(ui, "Sales by District");
                ChartPlotter::draw_bar_chart(
                    ui,
                    "sales_by_district",
                    &Self::categories(&views.sales_by_district),
                    views.sales_by_district.metric.column(),
                );

                Self::section(ui, "Transactions by Region");
                ChartPlotter::draw_bar_chart(
                    ui,
                    "transactions_by_region",
                    &Self::categories(&views.region_totals),
                    views.region_totals.metric.column(),
                );

                Self::section(ui, "Sales Distribution by Region");
                ChartPlotter::draw_pie_chart(ui, &views.amount_shares);

                Self::section(ui, "Shop-Level Details");
                ui.label(
                    RichText::new(format!(
                        "{} rows, sorted by {} (descending)",
                        views.shop_details.len(),
                        views.selection.sort_column
                    ))
                    .color(Color32::GRAY),
                );
                ChartPlotter::draw_detail_table(ui, &views.shop_details);

                Self::section(ui, "Item Consumption by District");
                match sunburst {
                    Some(sunburst) => {
                        let filter = &views.selection.item_filter;
                        ui.label(if filter.is_all() {
                            "Consumption of Items by District".to_string()
                        } else {
                            format!("Consumption of Items in {filter} District")
                        });
                        ChartPlotter::draw_sunburst(ui, sunburst);
                    }
                    None => Self::draw_warning(
                        ui,
                        "Column 'itemName' is missing in the dataset; item consumption by district is unavailable.",
                    ),
                }

                Self::section(ui, "Combined Item Consumption by District");
                match &views.combined_items {
                    Some(rows) => {
                        let filter = &views.selection.combined_filter;
                        ui.label(if filter.is_all() {
                            "Total Consumption of Combined Items by District".to_string()
                        } else {
                            format!("Total Consumption of Combined Items in {filter} District")
                        });
                        ChartPlotter::draw_treemap(ui, rows);
                    }
                    None => Self::draw_warning(
                        ui,
                        "Columns for combining items (Salt, Wheat, Rgdal, Kerosene, Sugar) are missing in the dataset.",
                    ),
                }

                Self::section(ui, "Consumption of Each Item by District");
                match &views.item_quantities {
                    Some(rows) => {
                        ChartPlotter::draw_item_table(ui, rows);
                        ui.add_space(8.0);
                        let item = views.selection.selected_item;
                        let categories: Vec<(String, f64)> = rows
                            .iter()
                            .map(|r| (r.dist_name.clone(), r.quantities.get(item)))
                            .collect();
                        ui.label(format!("Consumption of {item} by District"));
                        ChartPlotter::draw_bar_chart(ui, "item_by_district", &categories, "Quantity Consumed");
                    }
                    None => Self::draw_warning(
                        ui,
                        "Required columns for items or district are missing in the dataset.",
                    ),
                }

                ui.add_space(SECTION_SPACING);
            });
    }

    fn categories(totals: &DistrictTotals) -> Vec<(String, f64)> {
        totals
            .rows
            .iter()
            .map(|r| (r.dist_name.clone(), r.value))
            .collect()
    }

    fn section(ui: &mut egui::Ui, title: &str) {
        ui.add_space(SECTION_SPACING);
        ui.separator();
        ui.label(RichText::new(title).size(20.0).strong());
        ui.add_space(8.0);
    }

    fn draw_warning(ui: &mut egui::Ui, text: &str) {
        egui::Frame::none()
            .stroke(egui::Stroke::new(1.0, WARNING_COLOR))
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(format!("⚠ {text}")).color(WARNING_COLOR));
            });
    }

    fn draw_diagnostic(ui: &mut egui::Ui, diagnostic: &Diagnostic) {
        egui::Frame::none()
            .stroke(egui::Stroke::new(2.0, ERROR_COLOR))
            .rounding(8.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&diagnostic.message).color(ERROR_COLOR).strong());
                if let Some(hint) = diagnostic.hint {
                    ui.label(RichText::new(format!("ℹ {hint}")).color(Color32::from_rgb(100, 149, 237)));
                }
            });
    }
}
