//! Control Panel Widget
//! Left side panel with the data source, every dashboard filter and export.

use crate::data::{DistrictFilter, FeatureFlags, Item, Metric, Selection, SortColumn};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

const LABEL_WIDTH: f32 = 110.0;
const COMBO_WIDTH: f32 = 160.0;

/// Left side control panel.
pub struct ControlPanel {
    pub selection: Selection,
    pub csv_path: Option<PathBuf>,
    pub district_options: Vec<DistrictFilter>,
    pub features: FeatureFlags,
    pub status: String,
    pub busy: bool,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selection: Selection::default(),
            csv_path: None,
            district_options: vec![DistrictFilter::All],
            features: FeatureFlags::default(),
            status: "Ready".to_string(),
            busy: false,
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh dropdown contents after a dataset load.
    ///
    /// District selections that no longer exist fall back to `All`.
    pub fn update_dataset(&mut self, districts: &[String], features: FeatureFlags) {
        self.district_options = DistrictFilter::options(districts);
        self.features = features;

        for filter in [
            &mut self.selection.detail_filter,
            &mut self.selection.item_filter,
            &mut self.selection.combined_filter,
        ] {
            if !self.district_options.contains(filter) {
                *filter = DistrictFilter::All;
            }
        }
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let before = self.selection.clone();

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🛒 Shop-wise Dashboard")
                    .size(20.0)
                    .color(Color32::from_rgb(44, 62, 80)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(path_text).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.busy, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseCsv;
                            }
                        });
                    });
                });
            });

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Metrics =====
        ui.label(RichText::new("📊 Metrics").size(14.0).strong());
        ui.add_space(5.0);
        ui.label("Sales by District:");
        ui.horizontal(|ui| {
            for metric in Metric::ALL {
                ui.radio_value(&mut self.selection.sales_metric, metric, metric.column());
            }
        });
        ui.label("Transactions by Region:");
        ui.horizontal(|ui| {
            for metric in [Metric::NoOfTrans, Metric::TotalAmount] {
                ui.radio_value(&mut self.selection.region_metric, metric, metric.column());
            }
        });

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Filters =====
        ui.label(RichText::new("🔧 Filters").size(14.0).strong());
        ui.add_space(5.0);

        Self::district_combo(
            ui,
            "detail_filter",
            "Select Region:",
            &self.district_options,
            &mut self.selection.detail_filter,
        );

        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Sort Table By:"));
            ComboBox::from_id_salt("sort_column")
                .width(COMBO_WIDTH)
                .selected_text(self.selection.sort_column.column())
                .show_ui(ui, |ui| {
                    for column in SortColumn::ALL {
                        ui.selectable_value(&mut self.selection.sort_column, column, column.column());
                    }
                });
        });

        if self.features.has_item_name_column {
            Self::district_combo(
                ui,
                "item_filter",
                "Select District:",
                &self.district_options,
                &mut self.selection.item_filter,
            );
        }

        if self.features.has_item_columns {
            Self::district_combo(
                ui,
                "combined_filter",
                "Combined Items:",
                &self.district_options,
                &mut self.selection.combined_filter,
            );

            ui.horizontal(|ui| {
                ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new("Item:"));
                ComboBox::from_id_salt("selected_item")
                    .width(COMBO_WIDTH)
                    .selected_text(self.selection.selected_item.column())
                    .show_ui(ui, |ui| {
                        for item in Item::ALL {
                            ui.selectable_value(&mut self.selection.selected_item, item, item.column());
                        }
                    });
            });
        }

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled && !self.busy, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            if self.busy {
                ui.spinner();
            }
            let status_color = if self.status.starts_with("Error") {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        if action == ControlPanelAction::None && self.selection != before {
            action = ControlPanelAction::SelectionChanged;
        }
        action
    }

    fn district_combo(
        ui: &mut egui::Ui,
        id: &str,
        label: &str,
        options: &[DistrictFilter],
        value: &mut DistrictFilter,
    ) {
        ui.horizontal(|ui| {
            ui.add_sized([LABEL_WIDTH, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(id)
                .width(COMBO_WIDTH)
                .selected_text(value.to_string())
                .show_ui(ui, |ui| {
                    for option in options {
                        ui.selectable_value(&mut *value, option.clone(), option.to_string());
                    }
                });
        });
        ui.add_space(4.0);
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    SelectionChanged,
    ExportCharts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_district_selections_reset_to_all() {
        let mut panel = ControlPanel::new();
        panel.selection.detail_filter = DistrictFilter::from("Old");
        panel.selection.item_filter = DistrictFilter::from("B");

        panel.update_dataset(&["A".to_string(), "B".to_string()], FeatureFlags::default());

        assert_eq!(panel.selection.detail_filter, DistrictFilter::All);
        assert_eq!(panel.selection.item_filter, DistrictFilter::from("B"));
        assert_eq!(panel.district_options.len(), 3);
    }

    #[test]
    fn failed_load_resets_every_district_filter() {
        let mut panel = ControlPanel::new();
        panel.update_dataset(&["A".to_string()], FeatureFlags::default());
        panel.selection.item_filter = DistrictFilter::from("A");

        panel.update_dataset(&[], FeatureFlags::default());

        assert_eq!(panel.selection.item_filter, DistrictFilter::All);
        assert_eq!(panel.district_options, vec![DistrictFilter::All]);
    }
}
