//! Static Chart Renderer
//! Writes every dashboard chart to a PNG file with plotters.
//!
//! Charts are independent, so they are rendered in parallel; each job owns its file.

use crate::charts::layout::{self, Sector, Tile};
use crate::charts::PALETTE;
use crate::data::aggregate::{DistrictItemsTotal, DistrictShare};
use crate::data::DashboardViews;
use crate::error::ExportError;
use crate::stats::format_amount;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

const FONT: &str = "sans-serif";

fn palette(index: usize) -> RGBColor {
    let (r, g, b) = PALETTE[index % PALETTE.len()];
    RGBColor(r, g, b)
}

/// One chart to export.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartJob {
    Bar {
        file_stem: &'static str,
        title: String,
        value_label: String,
        categories: Vec<(String, f64)>,
    },
    Pie {
        title: String,
        shares: Vec<DistrictShare>,
    },
    Sunburst {
        title: String,
        sunburst: layout::Sunburst,
    },
    Treemap {
        title: String,
        rows: Vec<DistrictItemsTotal>,
    },
}

impl ChartJob {
    pub fn file_name(&self) -> String {
        let stem = match self {
            ChartJob::Bar { file_stem, .. } => *file_stem,
            ChartJob::Pie { .. } => "sales_distribution",
            ChartJob::Sunburst { .. } => "item_consumption",
            ChartJob::Treemap { .. } => "combined_items",
        };
        format!("{stem}.png")
    }

    fn title(&self) -> &str {
        match self {
            ChartJob::Bar { title, .. }
            | ChartJob::Pie { title, .. }
            | ChartJob::Sunburst { title, .. }
            | ChartJob::Treemap { title, .. } => title,
        }
    }
}

fn district_title(prefix: &str, filter: &crate::data::DistrictFilter, all: &str) -> String {
    if filter.is_all() {
        all.to_string()
    } else {
        format!("{prefix} in {filter} District")
    }
}

/// Renders dashboard charts to PNG files.
pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// The charts the dashboard currently shows, in page order.
    pub fn chart_jobs(views: &DashboardViews) -> Vec<ChartJob> {
        let selection = &views.selection;
        let mut jobs = vec![
            ChartJob::Bar {
                file_stem: "sales_by_district",
                title: format!("{} by District", views.sales_by_district.metric),
                value_label: views.sales_by_district.metric.to_string(),
                categories: views
                    .sales_by_district
                    .rows
                    .iter()
                    .map(|r| (r.dist_name.clone(), r.value))
                    .collect(),
            },
            ChartJob::Bar {
                file_stem: "transactions_by_region",
                title: format!("{} by District", views.region_totals.metric),
                value_label: views.region_totals.metric.to_string(),
                categories: views
                    .region_totals
                    .rows
                    .iter()
                    .map(|r| (r.dist_name.clone(), r.value))
                    .collect(),
            },
            ChartJob::Pie {
                title: "Sales Distribution by Region".to_string(),
                shares: views.amount_shares.clone(),
            },
        ];

        if let Some(rows) = &views.district_items {
            jobs.push(ChartJob::Sunburst {
                title: district_title(
                    "Consumption of Items",
                    &selection.item_filter,
                    "Consumption of Items by District",
                ),
                sunburst: layout::sunburst_rings(rows),
            });
        }

        if let Some(rows) = &views.combined_items {
            jobs.push(ChartJob::Treemap {
                title: district_title(
                    "Total Consumption of Combined Items",
                    &selection.combined_filter,
                    "Total Consumption of Combined Items by District",
                ),
                rows: rows.clone(),
            });
        }

        if let Some(rows) = &views.item_quantities {
            let item = selection.selected_item;
            jobs.push(ChartJob::Bar {
                file_stem: "item_by_district",
                title: format!("Consumption of {item} by District"),
                value_label: "Quantity Consumed".to_string(),
                categories: rows
                    .iter()
                    .map(|r| (r.dist_name.clone(), r.quantities.get(item)))
                    .collect(),
            });
        }

        jobs
    }

    /// Render every chart into `dir` and return the written files in page order.
    pub fn export_all(
        views: &DashboardViews,
        dir: &Path,
        size: (u32, u32),
    ) -> Result<Vec<PathBuf>, ExportError> {
        let jobs = Self::chart_jobs(views);
        if jobs.is_empty() {
            return Err(ExportError::Empty);
        }

        std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let paths = jobs
            .par_iter()
            .map(|job| {
                let path = dir.join(job.file_name());
                Self::render(job, &path, size)?;
                Ok(path)
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        tracing::info!("Exported {} charts to {}", paths.len(), dir.display());
        Ok(paths)
    }

    /// Render one chart to `path`.
    pub fn render(job: &ChartJob, path: &Path, size: (u32, u32)) -> Result<(), ExportError> {
        let err = |e: &dyn std::fmt::Display| ExportError::Render {
            chart: job.title().to_string(),
            reason: e.to_string(),
        };

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| err(&e))?;
        let area = root.titled(job.title(), (FONT, 28)).map_err(|e| err(&e))?;

        let drawn = match job {
            ChartJob::Bar {
                value_label,
                categories,
                ..
            } => Self::draw_bars(&area, value_label, categories),
            ChartJob::Pie { shares, .. } => Self::draw_pie(&area, shares),
            ChartJob::Sunburst { sunburst, .. } => Self::draw_sunburst(&area, sunburst),
            ChartJob::Treemap { rows, .. } => Self::draw_treemap(&area, rows),
        };
        drawn.map_err(|reason| ExportError::Render {
            chart: job.title().to_string(),
            reason,
        })?;

        root.present().map_err(|e| err(&e))?;
        tracing::debug!("Rendered {}", path.display());
        Ok(())
    }

    fn draw_bars(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        value_label: &str,
        categories: &[(String, f64)],
    ) -> Result<(), String> {
        let n = categories.len().max(1);
        let max = categories.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let min = categories.iter().map(|(_, v)| *v).fold(0.0_f64, f64::min);
        let top = if max > 0.0 { max * 1.1 } else { 1.0 };

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(70)
            .y_label_area_size(90)
            .build_cartesian_2d((0..n).into_segmented(), min * 1.1..top)
            .map_err(|e| e.to_string())?;

        let label_of = |x: &SegmentValue<usize>| match x {
            SegmentValue::CenterOf(i) => categories
                .get(*i)
                .map(|(name, _)| name.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&label_of)
            .y_label_formatter(&|v| format_amount(*v))
            .x_desc("District")
            .y_desc(value_label)
            .draw()
            .map_err(|e| e.to_string())?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(palette(0).filled())
                    .margin(8)
                    .data(categories.iter().enumerate().map(|(i, (_, v))| (i, *v))),
            )
            .map_err(|e| e.to_string())?;

        Ok(())
    }

    fn fill_sector(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        center: [f64; 2],
        inner: f64,
        outer: f64,
        sector: &Sector,
        style: ShapeStyle,
    ) -> Result<(), String> {
        if sector.sweep <= 0.0 {
            return Ok(());
        }
        let points: Vec<(i32, i32)> = layout::annular_sector_outline(center, inner, outer, sector)
            .into_iter()
            .map(|[x, y]| (x.round() as i32, y.round() as i32))
            .collect();
        area.draw(&Polygon::new(points.clone(), style))
            .map_err(|e| e.to_string())?;
        area.draw(&PathElement::new(points, WHITE.stroke_width(2)))
            .map_err(|e| e.to_string())
    }

    fn centered_text(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        text: &str,
        at: [f64; 2],
        size: u32,
        color: &RGBColor,
    ) -> Result<(), String> {
        let style = (FONT, size)
            .into_font()
            .color(color)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(
            text.to_string(),
            (at[0].round() as i32, at[1].round() as i32),
            style,
        ))
        .map_err(|e| e.to_string())
    }

    fn draw_pie(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        shares: &[DistrictShare],
    ) -> Result<(), String> {
        let (w, h) = area.dim_in_pixel();
        let radius = (f64::from(h).min(f64::from(w) * 0.6) / 2.0 - 20.0).max(10.0);
        let center = [radius + 40.0, f64::from(h) / 2.0];

        let values: Vec<f64> = shares.iter().map(|s| s.total_amount).collect();
        for (i, sector) in layout::pie_sectors(&values).iter().enumerate() {
            Self::fill_sector(area, center, 0.0, radius, sector, palette(i).filled())?;
            if sector.fraction >= 0.04 {
                let at = layout::label_anchor(center, radius * 0.65, sector);
                Self::centered_text(area, &format!("{:.1}%", sector.fraction * 100.0), at, 16, &WHITE)?;
            }
        }

        let legend_x = (center[0] + radius + 50.0) as i32;
        for (i, share) in shares.iter().enumerate() {
            let y = 20 + i as i32 * 26;
            if y + 20 > h as i32 {
                break;
            }
            area.draw(&Rectangle::new(
                [(legend_x, y), (legend_x + 16, y + 16)],
                palette(i).filled(),
            ))
            .map_err(|e| e.to_string())?;
            area.draw(&Text::new(
                share.dist_name.clone(),
                (legend_x + 24, y),
                (FONT, 16).into_font(),
            ))
            .map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    fn draw_sunburst(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        sunburst: &layout::Sunburst,
    ) -> Result<(), String> {
        let (w, h) = area.dim_in_pixel();
        let outer = (f64::from(w.min(h)) / 2.0 - 20.0).max(20.0);
        let inner = outer * 0.55;
        let hole = outer * 0.12;
        let center = [f64::from(w) / 2.0, f64::from(h) / 2.0];

        for (i, ring) in sunburst.inner.iter().enumerate() {
            Self::fill_sector(area, center, hole, inner, &ring.sector, palette(i).filled())?;
            if ring.sector.fraction >= 0.05 {
                let at = layout::label_anchor(center, (hole + inner) / 2.0, &ring.sector);
                Self::centered_text(area, &ring.label, at, 15, &WHITE)?;
            }
        }
        for ring in &sunburst.outer {
            let color = palette(ring.parent.unwrap_or(0)).mix(0.7);
            Self::fill_sector(area, center, inner, outer, &ring.sector, color.filled())?;
            if ring.sector.sweep >= 0.2 {
                let at = layout::label_anchor(center, (inner + outer) / 2.0, &ring.sector);
                Self::centered_text(area, &ring.label, at, 13, &BLACK)?;
            }
        }
        Ok(())
    }

    fn draw_treemap(
        area: &DrawingArea<BitMapBackend<'_>, Shift>,
        rows: &[DistrictItemsTotal],
    ) -> Result<(), String> {
        let (w, h) = area.dim_in_pixel();
        let values: Vec<f64> = rows.iter().map(|r| r.total_items).collect();
        let bounds = Tile::new(10.0, 10.0, f64::from(w) - 20.0, f64::from(h) - 20.0);

        for (i, (tile, row)) in layout::treemap(&values, bounds).iter().zip(rows).enumerate() {
            if tile.area() <= 0.0 {
                continue;
            }
            let corners = [
                (tile.x.round() as i32, tile.y.round() as i32),
                ((tile.x + tile.w).round() as i32, (tile.y + tile.h).round() as i32),
            ];
            area.draw(&Rectangle::new(corners, palette(i).filled()))
                .map_err(|e| e.to_string())?;
            area.draw(&Rectangle::new(corners, WHITE.stroke_width(2)))
                .map_err(|e| e.to_string())?;

            if tile.w > 80.0 && tile.h > 40.0 {
                let style = (FONT, 16).into_font().color(&WHITE);
                area.draw(&Text::new(
                    row.dist_name.clone(),
                    (corners[0].0 + 8, corners[0].1 + 8),
                    style.clone(),
                ))
                .map_err(|e| e.to_string())?;
                area.draw(&Text::new(
                    format_amount(row.total_items),
                    (corners[0].0 + 8, corners[0].1 + 28),
                    style,
                ))
                .map_err(|e| e.to_string())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixtures, DistrictFilter, Item, Selection};

    #[test]
    fn full_dataset_exports_six_charts() {
        let views = DashboardViews::compute(&fixtures::with_items(), &Selection::default()).unwrap();
        let jobs = StaticChartRenderer::chart_jobs(&views);

        let names: Vec<String> = jobs.iter().map(ChartJob::file_name).collect();
        assert_eq!(
            names,
            vec![
                "sales_by_district.png",
                "transactions_by_region.png",
                "sales_distribution.png",
                "item_consumption.png",
                "combined_items.png",
                "item_by_district.png",
            ]
        );
    }

    #[test]
    fn degraded_dataset_skips_item_charts() {
        let views = DashboardViews::compute(&fixtures::scenario(), &Selection::default()).unwrap();
        let jobs = StaticChartRenderer::chart_jobs(&views);
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[0].title(), "totalAmount by District");
        assert_eq!(jobs[1].title(), "noOfTrans by District");
    }

    #[test]
    fn titles_follow_the_selection() {
        let selection = Selection {
            item_filter: DistrictFilter::from("B"),
            selected_item: Item::Sugar,
            ..Selection::default()
        };
        let views = DashboardViews::compute(&fixtures::with_items(), &selection).unwrap();
        let jobs = StaticChartRenderer::chart_jobs(&views);

        assert_eq!(jobs[3].title(), "Consumption of Items in B District");
        assert_eq!(jobs[4].title(), "Total Consumption of Combined Items by District");
        match &jobs[5] {
            ChartJob::Bar {
                title, categories, ..
            } => {
                assert_eq!(title, "Consumption of sugar by District");
                assert_eq!(categories[0], ("A".to_string(), 6.0));
            }
            other => panic!("unexpected job {other:?}"),
        }
    }
}
