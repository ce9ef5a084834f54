//! Chart Plotter Module
//! Draws the dashboard charts and tables with egui / egui_plot.

use crate::charts::layout::{self, Sector, Sunburst, Tile};
use crate::charts::PALETTE;
use crate::data::aggregate::{
    DistrictItemQuantities, DistrictItemsTotal, DistrictShare, ShopDetail,
};
use crate::data::Item;
use crate::stats::{format_amount, format_count, KeyMetrics};
use egui::{Align2, Color32, FontId, Pos2, RichText, Sense, Stroke};
use egui_plot::{Bar, BarChart, Legend, Plot};

const CHART_HEIGHT: f32 = 360.0;

/// Palette colour for the `index`-th category.
pub fn category_color(index: usize) -> Color32 {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    Color32::from_rgb(r, g, b)
}

fn to_pos(p: [f64; 2]) -> Pos2 {
    Pos2::new(p[0] as f32, p[1] as f32)
}

/// Creates the dashboard visualizations.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Three headline numbers side by side.
    pub fn draw_key_metrics(ui: &mut egui::Ui, metrics: &KeyMetrics) {
        ui.columns(3, |columns| {
            let cards = [
                ("Total Transactions", format_count(metrics.total_transactions)),
                ("Total Sales", format_amount(metrics.total_sales)),
                ("Total Shops", metrics.district_count.to_string()),
            ];
            for (ui, (label, value)) in columns.iter_mut().zip(cards) {
                ui.label(RichText::new(label).size(13.0).color(Color32::GRAY));
                ui.label(RichText::new(value).size(28.0).strong());
            }
        });
    }

    /// Bar chart with one bar per category.
    pub fn draw_bar_chart(
        ui: &mut egui::Ui,
        id: &str,
        categories: &[(String, f64)],
        value_label: &str,
    ) {
        let labels: Vec<String> = categories.iter().map(|(name, _)| name.clone()).collect();

        let bars: Vec<Bar> = categories
            .iter()
            .enumerate()
            .map(|(i, (name, value))| {
                Bar::new(i as f64, *value)
                    .name(name)
                    .width(0.7)
                    .fill(category_color(0))
            })
            .collect();

        Plot::new(id)
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("District")
            .y_axis_label(value_label)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < 1e-6 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(value_label));
            });
    }

    /// Pie chart of each district's share of `totalAmount`.
    pub fn draw_pie_chart(ui: &mut egui::Ui, shares: &[DistrictShare]) {
        let values: Vec<f64> = shares.iter().map(|s| s.total_amount).collect();
        let sectors = layout::pie_sectors(&values);

        let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;
        let radius = (rect.height().min(rect.width() * 0.6) / 2.0 - 10.0).max(10.0) as f64;
        let center = [(rect.left() as f64) + radius + 20.0, rect.center().y as f64];

        for (i, sector) in sectors.iter().enumerate() {
            Self::fill_sector(&painter, center, 0.0, radius, sector, category_color(i));
            if sector.fraction >= 0.04 {
                let anchor = layout::label_anchor(center, radius * 0.65, sector);
                painter.text(
                    to_pos(anchor),
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", sector.fraction * 100.0),
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
        }

        // legend to the right of the pie
        let mut y = rect.top() + 10.0;
        let legend_x = (center[0] + radius) as f32 + 30.0;
        for (i, share) in shares.iter().enumerate() {
            let swatch = egui::Rect::from_min_size(Pos2::new(legend_x, y), egui::vec2(12.0, 12.0));
            painter.rect_filled(swatch, 2.0, category_color(i));
            painter.text(
                Pos2::new(legend_x + 18.0, y + 6.0),
                Align2::LEFT_CENTER,
                &share.dist_name,
                FontId::proportional(12.0),
                ui.visuals().text_color(),
            );
            y += 18.0;
            if y > rect.bottom() - 12.0 {
                break;
            }
        }

        if let Some(idx) = Self::hovered_sector(&response, center, 0.0, radius, &sectors) {
            let share = &shares[idx];
            response.on_hover_text(format!(
                "{}\ntotalAmount: {}\n{:.1}%",
                share.dist_name,
                format_amount(share.total_amount),
                share.share * 100.0
            ));
        }
    }

    /// Two-ring sunburst: district inside, items outside.
    pub fn draw_sunburst(ui: &mut egui::Ui, sunburst: &Sunburst) {
        let size = egui::vec2(ui.available_width(), CHART_HEIGHT + 80.0);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;
        let outer_radius = (rect.height().min(rect.width()) / 2.0 - 10.0).max(20.0) as f64;
        let inner_radius = outer_radius * 0.55;
        let hole = outer_radius * 0.12;
        let center = [rect.center().x as f64, rect.center().y as f64];

        for (i, ring) in sunburst.inner.iter().enumerate() {
            Self::fill_sector(&painter, center, hole, inner_radius, &ring.sector, category_color(i));
            if ring.sector.fraction >= 0.05 {
                let anchor = layout::label_anchor(center, (hole + inner_radius) / 2.0, &ring.sector);
                painter.text(
                    to_pos(anchor),
                    Align2::CENTER_CENTER,
                    &ring.label,
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
        }

        for ring in &sunburst.outer {
            let base = category_color(ring.parent.unwrap_or(0));
            Self::fill_sector(
                &painter,
                center,
                inner_radius + 2.0,
                outer_radius,
                &ring.sector,
                base.gamma_multiply(0.75),
            );
            if ring.sector.sweep >= 0.2 {
                let anchor = layout::label_anchor(center, (inner_radius + outer_radius) / 2.0, &ring.sector);
                painter.text(
                    to_pos(anchor),
                    Align2::CENTER_CENTER,
                    &ring.label,
                    FontId::proportional(11.0),
                    Color32::WHITE,
                );
            }
        }

        let inner_sectors: Vec<Sector> = sunburst.inner.iter().map(|r| r.sector).collect();
        let outer_sectors: Vec<Sector> = sunburst.outer.iter().map(|r| r.sector).collect();
        let hover = Self::hovered_sector(&response, center, hole, inner_radius, &inner_sectors)
            .map(|i| &sunburst.inner[i])
            .or_else(|| {
                Self::hovered_sector(&response, center, inner_radius, outer_radius, &outer_sectors)
                    .map(|i| &sunburst.outer[i])
            });
        if let Some(ring) = hover {
            let title = match ring.parent {
                Some(p) => format!("{} / {}", sunburst.inner[p].label, ring.label),
                None => ring.label.clone(),
            };
            response.on_hover_text(format!("{}\nnoOfTrans: {}", title, format_count(ring.value as i64)));
        }
    }

    /// Treemap of combined item totals per district.
    pub fn draw_treemap(ui: &mut egui::Ui, rows: &[DistrictItemsTotal]) {
        let size = egui::vec2(ui.available_width(), CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;

        let values: Vec<f64> = rows.iter().map(|r| r.total_items).collect();
        let bounds = Tile::new(
            rect.left() as f64,
            rect.top() as f64,
            rect.width() as f64,
            rect.height() as f64,
        );
        let tiles = layout::treemap(&values, bounds);

        let mut hovered = None;
        for (i, (tile, row)) in tiles.iter().zip(rows).enumerate() {
            if tile.area() <= 0.0 {
                continue;
            }
            let tile_rect = egui::Rect::from_min_size(
                Pos2::new(tile.x as f32, tile.y as f32),
                egui::vec2(tile.w as f32, tile.h as f32),
            );
            painter.rect_filled(tile_rect, 0.0, category_color(i));
            painter.rect_stroke(tile_rect, 0.0, Stroke::new(1.5, Color32::WHITE));
            if tile.w > 60.0 && tile.h > 24.0 {
                painter.text(
                    tile_rect.left_top() + egui::vec2(6.0, 6.0),
                    Align2::LEFT_TOP,
                    format!("{}\n{}", row.dist_name, format_amount(row.total_items)),
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
            if response.hover_pos().is_some_and(|p| tile_rect.contains(p)) {
                hovered = Some(row);
            }
        }

        if let Some(row) = hovered {
            response.on_hover_text(format!(
                "{}\nTotal Items: {}",
                row.dist_name,
                format_amount(row.total_items)
            ));
        }
    }

    /// Shop-level detail table. Only the visible rows are laid out.
    pub fn draw_detail_table(ui: &mut egui::Ui, rows: &[ShopDetail]) {
        const COL_WIDTH: f32 = 140.0;

        egui::Grid::new("shop_details_header")
            .min_col_width(COL_WIDTH)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("distName").strong());
                ui.label(RichText::new("noOfTrans").strong());
                ui.label(RichText::new("totalAmount").strong());
                ui.end_row();
            });

        let row_height = ui.text_style_height(&egui::TextStyle::Body) + 4.0;
        egui::ScrollArea::vertical()
            .id_salt("shop_details")
            .max_height(320.0)
            .show_rows(ui, row_height, rows.len(), |ui, range| {
                egui::Grid::new("shop_details_grid")
                    .striped(true)
                    .min_col_width(COL_WIDTH)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for row in &rows[range] {
                            ui.label(row.dist_name.as_deref().unwrap_or("(missing)"));
                            ui.label(
                                row.no_of_trans
                                    .map(format_count)
                                    .unwrap_or_else(|| "-".to_string()),
                            );
                            ui.label(
                                row.total_amount
                                    .map(format_amount)
                                    .unwrap_or_else(|| "-".to_string()),
                            );
                            ui.end_row();
                        }
                    });
            });
    }

    /// Per-district table of the five item quantities.
    pub fn draw_item_table(ui: &mut egui::Ui, rows: &[DistrictItemQuantities]) {
        egui::Grid::new("item_quantities_grid")
            .striped(true)
            .min_col_width(80.0)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label(RichText::new("distName").strong());
                for item in Item::ALL {
                    ui.label(RichText::new(item.column()).strong());
                }
                ui.end_row();

                for row in rows {
                    ui.label(&row.dist_name);
                    for item in Item::ALL {
                        ui.label(format_amount(row.quantities.get(item)));
                    }
                    ui.end_row();
                }
            });
    }

    fn fill_sector(
        painter: &egui::Painter,
        center: [f64; 2],
        inner: f64,
        outer: f64,
        sector: &Sector,
        color: Color32,
    ) {
        for quad in layout::annular_sector_strips(center, inner, outer, sector) {
            painter.add(egui::Shape::convex_polygon(
                quad.iter().map(|p| to_pos(*p)).collect(),
                color,
                Stroke::NONE,
            ));
        }
    }

    fn hovered_sector(
        response: &egui::Response,
        center: [f64; 2],
        inner: f64,
        outer: f64,
        sectors: &[Sector],
    ) -> Option<usize> {
        let pos = response.hover_pos()?;
        let dx = pos.x as f64 - center[0];
        let dy = pos.y as f64 - center[1];
        let distance = dx.hypot(dy);
        if distance < inner || distance > outer {
            return None;
        }
        layout::sector_at(sectors, dy.atan2(dx))
    }
}
