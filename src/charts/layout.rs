//! Chart geometry shared by the interactive plotter and the PNG renderer.
//!
//! Angles are radians, starting at 12 o'clock and growing clockwise in screen
//! coordinates (y pointing down).

use crate::data::aggregate::DistrictItemTotal;
use std::f64::consts::{FRAC_PI_2, TAU};

pub const START_ANGLE: f64 = -FRAC_PI_2;

/// Largest arc (radians) approximated by one polygon edge.
const ARC_STEP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: f64,
    pub sweep: f64,
    pub fraction: f64,
}

impl Sector {
    pub fn mid_angle(&self) -> f64 {
        self.start + self.sweep / 2.0
    }
}

fn weight(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Split `[start, start + span)` proportionally to `values`.
fn split_span(values: &[f64], start: f64, span: f64) -> Vec<Sector> {
    let total: f64 = values.iter().map(|v| weight(*v)).sum();
    let mut angle = start;
    values
        .iter()
        .map(|v| {
            let fraction = if total > 0.0 { weight(*v) / total } else { 0.0 };
            let sector = Sector {
                start: angle,
                sweep: fraction * span,
                fraction,
            };
            angle += sector.sweep;
            sector
        })
        .collect()
}

/// Pie slices for `values`; non-positive values get an empty slice.
pub fn pie_sectors(values: &[f64]) -> Vec<Sector> {
    split_span(values, START_ANGLE, TAU)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RingSector {
    pub label: String,
    pub value: f64,
    /// Index into [`Sunburst::inner`] for outer-ring sectors.
    pub parent: Option<usize>,
    pub sector: Sector,
}

/// Two-level sunburst: districts on the inner ring, their items outside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sunburst {
    pub inner: Vec<RingSector>,
    pub outer: Vec<RingSector>,
}

pub fn sunburst_rings(rows: &[DistrictItemTotal]) -> Sunburst {
    let mut districts: Vec<(String, f64)> = Vec::new();
    for row in rows {
        let value = weight(row.no_of_trans as f64);
        match districts.iter_mut().find(|(name, _)| *name == row.dist_name) {
            Some((_, total)) => *total += value,
            None => districts.push((row.dist_name.clone(), value)),
        }
    }

    let values: Vec<f64> = districts.iter().map(|(_, v)| *v).collect();
    let inner: Vec<RingSector> = districts
        .into_iter()
        .zip(pie_sectors(&values))
        .map(|((label, value), sector)| RingSector {
            label,
            value,
            parent: None,
            sector,
        })
        .collect();

    let mut outer = Vec::with_capacity(rows.len());
    for (parent_idx, parent) in inner.iter().enumerate() {
        let children: Vec<&DistrictItemTotal> = rows
            .iter()
            .filter(|r| r.dist_name == parent.label)
            .collect();
        let child_values: Vec<f64> = children.iter().map(|r| r.no_of_trans as f64).collect();
        let sectors = split_span(&child_values, parent.sector.start, parent.sector.sweep);

        for (child, sector) in children.into_iter().zip(sectors) {
            outer.push(RingSector {
                label: child.item_name.clone(),
                value: weight(child.no_of_trans as f64),
                parent: Some(parent_idx),
                sector,
            });
        }
    }

    Sunburst { inner, outer }
}

fn polar(center: [f64; 2], radius: f64, angle: f64) -> [f64; 2] {
    [
        center[0] + radius * angle.cos(),
        center[1] + radius * angle.sin(),
    ]
}

fn arc_steps(sweep: f64) -> usize {
    ((sweep.abs() / ARC_STEP).ceil() as usize).max(1)
}

/// Closed outline of a ring sector (a pie slice when `inner` is zero).
pub fn annular_sector_outline(
    center: [f64; 2],
    inner: f64,
    outer: f64,
    sector: &Sector,
) -> Vec<[f64; 2]> {
    let steps = arc_steps(sector.sweep);
    let step = sector.sweep / steps as f64;

    let mut points: Vec<[f64; 2]> = (0..=steps)
        .map(|i| polar(center, outer, sector.start + step * i as f64))
        .collect();
    if inner > 0.0 {
        points.extend((0..=steps).rev().map(|i| polar(center, inner, sector.start + step * i as f64)));
    } else {
        points.push(center);
    }
    points
}

/// The same sector cut into convex quads, for painters that only fill convex shapes.
pub fn annular_sector_strips(
    center: [f64; 2],
    inner: f64,
    outer: f64,
    sector: &Sector,
) -> Vec<[[f64; 2]; 4]> {
    if sector.sweep <= 0.0 {
        return Vec::new();
    }
    let steps = arc_steps(sector.sweep);
    let step = sector.sweep / steps as f64;

    (0..steps)
        .map(|i| {
            let a0 = sector.start + step * i as f64;
            let a1 = a0 + step;
            [
                polar(center, inner, a0),
                polar(center, outer, a0),
                polar(center, outer, a1),
                polar(center, inner, a1),
            ]
        })
        .collect()
}

/// Index of the sector containing `angle` (any branch of atan2).
pub fn sector_at(sectors: &[Sector], angle: f64) -> Option<usize> {
    let offset = (angle - START_ANGLE).rem_euclid(TAU);
    sectors.iter().position(|s| {
        let from = (s.start - START_ANGLE).rem_euclid(TAU);
        s.sweep > 0.0 && (offset >= from && offset < from + s.sweep || offset + TAU < from + s.sweep)
    })
}

/// Point at `radius` on the sector's bisector, for labels.
pub fn label_anchor(center: [f64; 2], radius: f64, sector: &Sector) -> [f64; 2] {
    polar(center, radius, sector.mid_angle())
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tile {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Tile {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }
}

/// Squarified treemap. Output is in input order; non-positive values get an empty tile.
pub fn treemap(values: &[f64], bounds: Tile) -> Vec<Tile> {
    let mut tiles = vec![Tile::new(bounds.x, bounds.y, 0.0, 0.0); values.len()];
    let total: f64 = values.iter().map(|v| weight(*v)).sum();
    if total <= 0.0 || bounds.area() <= 0.0 {
        return tiles;
    }

    let scale = bounds.area() / total;
    let mut order: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| weight(**v) > 0.0)
        .map(|(i, v)| (i, v * scale))
        .collect();
    order.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut remaining = bounds;
    let mut row: Vec<(usize, f64)> = Vec::new();
    let mut next = 0;
    while next < order.len() {
        let side = remaining.w.min(remaining.h);
        let mut candidate = row.clone();
        candidate.push(order[next]);

        if row.is_empty() || worst_ratio(&candidate, side) <= worst_ratio(&row, side) {
            row = candidate;
            next += 1;
        } else {
            remaining = lay_row(&row, remaining, &mut tiles);
            row.clear();
        }
    }
    if !row.is_empty() {
        lay_row(&row, remaining, &mut tiles);
    }

    tiles
}

/// Worst aspect ratio of a row of areas laid along a side of length `side`.
fn worst_ratio(row: &[(usize, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();
    let max = row.iter().map(|(_, a)| *a).fold(f64::MIN, f64::max);
    let min = row.iter().map(|(_, a)| *a).fold(f64::MAX, f64::min);
    if sum <= 0.0 || min <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let side2 = side * side;
    let sum2 = sum * sum;
    f64::max(side2 * max / sum2, sum2 / (side2 * min))
}

/// Place `row` along the shorter side of `rect`; returns the unused remainder.
fn lay_row(row: &[(usize, f64)], rect: Tile, tiles: &mut [Tile]) -> Tile {
    let sum: f64 = row.iter().map(|(_, a)| a).sum();

    if rect.w >= rect.h {
        let width = if rect.h > 0.0 { sum / rect.h } else { 0.0 };
        let mut y = rect.y;
        for &(idx, area) in row {
            let h = if width > 0.0 { area / width } else { 0.0 };
            tiles[idx] = Tile::new(rect.x, y, width, h);
            y += h;
        }
        Tile::new(rect.x + width, rect.y, (rect.w - width).max(0.0), rect.h)
    } else {
        let height = if rect.w > 0.0 { sum / rect.w } else { 0.0 };
        let mut x = rect.x;
        for &(idx, area) in row {
            let w = if height > 0.0 { area / height } else { 0.0 };
            tiles[idx] = Tile::new(x, rect.y, w, height);
            x += w;
        }
        Tile::new(rect.x, rect.y + height, rect.w, (rect.h - height).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn item(dist: &str, item: &str, n: i64) -> DistrictItemTotal {
        DistrictItemTotal {
            dist_name: dist.into(),
            item_name: item.into(),
            no_of_trans: n,
        }
    }

    #[test]
    fn pie_covers_the_full_circle() {
        let sectors = pie_sectors(&[120.0, 50.0, 30.0]);
        let sweep: f64 = sectors.iter().map(|s| s.sweep).sum();
        assert!((sweep - TAU).abs() < EPS);
        assert!((sectors[0].start - START_ANGLE).abs() < EPS);
        assert!((sectors[1].start - (sectors[0].start + sectors[0].sweep)).abs() < EPS);
        assert!((sectors[0].fraction - 0.6).abs() < EPS);
    }

    #[test]
    fn pie_ignores_non_positive_values() {
        let sectors = pie_sectors(&[-5.0, f64::NAN, 10.0]);
        assert_eq!(sectors[0].sweep, 0.0);
        assert_eq!(sectors[1].sweep, 0.0);
        assert!((sectors[2].sweep - TAU).abs() < EPS);

        let empty = pie_sectors(&[0.0, 0.0]);
        assert!(empty.iter().all(|s| s.sweep == 0.0 && s.fraction == 0.0));
    }

    #[test]
    fn sector_lookup_by_angle() {
        let sectors = pie_sectors(&[1.0, 1.0, 2.0]);
        // straight up is the first slice, straight down starts the third
        assert_eq!(sector_at(&sectors, -FRAC_PI_2 + 0.01), Some(0));
        assert_eq!(sector_at(&sectors, 0.0 + 0.01), Some(1));
        assert_eq!(sector_at(&sectors, FRAC_PI_2 + 0.01), Some(2));
        assert_eq!(sector_at(&sectors, std::f64::consts::PI + 0.01), Some(2));
        assert_eq!(sector_at(&sectors, -FRAC_PI_2 - 0.01), Some(2));
    }

    #[test]
    fn sunburst_nests_items_inside_districts() {
        let rows = vec![
            item("A", "rice", 5),
            item("B", "rice", 3),
            item("A", "oil", 2),
        ];
        let sunburst = sunburst_rings(&rows);

        assert_eq!(sunburst.inner.len(), 2);
        assert_eq!(sunburst.inner[0].label, "A");
        assert_eq!(sunburst.inner[0].value, 7.0);
        assert!((sunburst.inner[0].sector.fraction - 0.7).abs() < EPS);

        assert_eq!(sunburst.outer.len(), 3);
        for child in &sunburst.outer {
            let parent = &sunburst.inner[child.parent.unwrap()].sector;
            assert!(child.sector.start >= parent.start - EPS);
            assert!(child.sector.start + child.sector.sweep <= parent.start + parent.sweep + EPS);
        }

        let a_children: f64 = sunburst
            .outer
            .iter()
            .filter(|c| c.parent == Some(0))
            .map(|c| c.sector.sweep)
            .sum();
        assert!((a_children - sunburst.inner[0].sector.sweep).abs() < EPS);
    }

    #[test]
    fn outline_closes_at_the_center_for_pie_slices() {
        let sector = pie_sectors(&[1.0, 1.0])[0];
        let points = annular_sector_outline([0.0, 0.0], 0.0, 10.0, &sector);
        assert_eq!(points.last(), Some(&[0.0, 0.0]));
        let first = points[0];
        assert!((first[0]).abs() < EPS && (first[1] + 10.0).abs() < EPS);
    }

    #[test]
    fn strips_cover_the_sweep() {
        let sector = Sector {
            start: 0.0,
            sweep: 1.0,
            fraction: 0.5,
        };
        let strips = annular_sector_strips([0.0, 0.0], 5.0, 10.0, &sector);
        assert!(strips.len() >= 20);
        let last = strips.last().unwrap();
        assert!((last[2][0] - 10.0 * 1.0f64.cos()).abs() < EPS);
        assert!(annular_sector_strips([0.0, 0.0], 5.0, 10.0, &Sector { sweep: 0.0, ..sector }).is_empty());
    }

    #[test]
    fn treemap_areas_are_proportional_and_tile_the_bounds() {
        let values = [18.0, 4.0, 10.0, 0.0];
        let bounds = Tile::new(10.0, 20.0, 320.0, 200.0);
        let tiles = treemap(&values, bounds);

        assert_eq!(tiles.len(), 4);
        let total: f64 = values.iter().sum();
        for (tile, value) in tiles.iter().zip(values) {
            let expected = bounds.area() * value / total;
            assert!((tile.area() - expected).abs() < 1e-6, "{tile:?} vs {expected}");
            assert!(tile.x >= bounds.x - EPS && tile.y >= bounds.y - EPS);
            assert!(tile.x + tile.w <= bounds.x + bounds.w + 1e-6);
            assert!(tile.y + tile.h <= bounds.y + bounds.h + 1e-6);
        }

        let covered: f64 = tiles.iter().map(Tile::area).sum();
        assert!((covered - bounds.area()).abs() < 1e-6);
    }

    #[test]
    fn treemap_single_value_fills_the_bounds() {
        let bounds = Tile::new(0.0, 0.0, 100.0, 50.0);
        let tile = treemap(&[42.0], bounds)[0];
        assert!((tile.x - bounds.x).abs() < 1e-9 && (tile.y - bounds.y).abs() < 1e-9);
        assert!((tile.w - bounds.w).abs() < 1e-9 && (tile.h - bounds.h).abs() < 1e-9);
    }

    #[test]
    fn treemap_without_positive_values_is_empty() {
        let tiles = treemap(&[0.0, -1.0], Tile::new(0.0, 0.0, 10.0, 10.0));
        assert!(tiles.iter().all(|t| t.area() == 0.0));
    }
}
