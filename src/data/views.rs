//! Everything the dashboard shows for one set of user selections.

use crate::data::aggregate::{
    self, DistrictItemQuantities, DistrictItemTotal, DistrictItemsTotal, DistrictShare,
    DistrictTotals, ShopDetail,
};
use crate::data::schema::{DistrictFilter, Item, Metric, SortColumn};
use crate::data::Dataset;
use crate::error::AggregateError;
use crate::stats::KeyMetrics;

/// User-chosen parameters. Defaults match the dashboard's initial widget values.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// "Sales by District" bar chart.
    pub sales_metric: Metric,
    /// "Transactions by Region" bar chart.
    pub region_metric: Metric,
    /// Shop-level details table.
    pub detail_filter: DistrictFilter,
    pub sort_column: SortColumn,
    /// Item consumption sunburst.
    pub item_filter: DistrictFilter,
    /// Combined item treemap.
    pub combined_filter: DistrictFilter,
    /// Per-item bar chart.
    pub selected_item: Item,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            sales_metric: Metric::TotalAmount,
            region_metric: Metric::NoOfTrans,
            detail_filter: DistrictFilter::All,
            sort_column: SortColumn::DistName,
            item_filter: DistrictFilter::All,
            combined_filter: DistrictFilter::All,
            selected_item: Item::Salt,
        }
    }
}

/// Derived tables for one [`Selection`].
///
/// Optional views are `None` when the dataset lacks their columns; `warnings` then
/// says why.
#[derive(Debug, Clone)]
pub struct DashboardViews {
    pub selection: Selection,
    pub metrics: KeyMetrics,
    pub sales_by_district: DistrictTotals,
    pub region_totals: DistrictTotals,
    pub amount_shares: Vec<DistrictShare>,
    pub shop_details: Vec<ShopDetail>,
    pub district_items: Option<Vec<DistrictItemTotal>>,
    pub combined_items: Option<Vec<DistrictItemsTotal>>,
    pub item_quantities: Option<Vec<DistrictItemQuantities>>,
    pub districts: Vec<String>,
    pub warnings: Vec<String>,
}

impl DashboardViews {
    pub fn compute(ds: &Dataset, selection: &Selection) -> Result<Self, AggregateError> {
        let features = ds.features();

        let district_items = if features.has_item_name_column {
            let rows = aggregate::group_sum_by_district_item(ds)?;
            Some(aggregate::filter_district_items(&rows, &selection.item_filter))
        } else {
            None
        };

        let (combined_items, item_quantities) = if features.has_item_columns {
            let combined = aggregate::combined_items_by_district(ds)?;
            (
                Some(aggregate::filter_combined_items(
                    &combined,
                    &selection.combined_filter,
                )),
                Some(aggregate::item_quantities_by_district(ds)?),
            )
        } else {
            (None, None)
        };

        let views = Self {
            selection: selection.clone(),
            metrics: KeyMetrics::compute(ds)?,
            sales_by_district: aggregate::group_sum_by_district(ds, selection.sales_metric)?,
            region_totals: aggregate::group_sum_by_district(ds, selection.region_metric)?,
            amount_shares: aggregate::amount_share_by_district(ds)?,
            shop_details: aggregate::filter_and_sort(
                ds,
                &selection.detail_filter,
                selection.sort_column,
            )?,
            district_items,
            combined_items,
            item_quantities,
            districts: ds.districts()?,
            warnings: ds.degraded_warnings(),
        };

        tracing::debug!(
            "Computed views: {} districts, {} detail rows, {} warnings",
            views.districts.len(),
            views.shop_details.len(),
            views.warnings.len()
        );
        Ok(views)
    }
}
