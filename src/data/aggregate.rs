//! District aggregations.
//!
//! Every function reads the dataset and returns a new table; nothing is mutated.
//! Groups come out in order of first appearance. Rows without a district name are
//! kept in the detail table but never form a group.

use crate::data::dataset::zero_if_missing;
use crate::data::schema::{
    DistrictFilter, Item, ItemQuantities, Metric, SortColumn, DIST_NAME, ITEM_NAME, NO_OF_TRANS,
    TOTAL_AMOUNT, TOTAL_ITEMS,
};
use crate::data::Dataset;
use crate::error::AggregateError;
use polars::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictTotal {
    pub dist_name: String,
    pub value: f64,
}

/// District×Metric table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictTotals {
    pub metric: Metric,
    pub rows: Vec<DistrictTotal>,
}

impl DistrictTotals {
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.value).sum()
    }

    #[cfg(test)]
    pub fn get(&self, dist_name: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.dist_name == dist_name)
            .map(|r| r.value)
    }
}

/// One pie slice: a district's `totalAmount` and its share of the positive total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictShare {
    pub dist_name: String,
    pub total_amount: f64,
    pub share: f64,
}

/// District×Item table row (sunburst input).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictItemTotal {
    pub dist_name: String,
    pub item_name: String,
    pub no_of_trans: i64,
}

/// District×CombinedItems table row (treemap input).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictItemsTotal {
    pub dist_name: String,
    pub total_items: f64,
}

/// District×PerItemQuantity table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictItemQuantities {
    pub dist_name: String,
    pub quantities: ItemQuantities,
}

/// Shop-level detail table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopDetail {
    pub dist_name: Option<String>,
    pub no_of_trans: Option<i64>,
    pub total_amount: Option<f64>,
}

fn require(ds: &Dataset, columns: &[&str]) -> Result<(), AggregateError> {
    match columns.iter().copied().find(|&name| !ds.has_columns(&[name])) {
        Some(name) => Err(AggregateError::missing(name)),
        None => Ok(()),
    }
}

/// Float sum that reads null and NaN cells as zero.
fn summed(name: &str) -> Expr {
    col(name)
        .cast(DataType::Float64)
        .fill_null(lit(0.0))
        .fill_nan(lit(0.0))
        .sum()
}

fn grouped_by_district(ds: &Dataset) -> LazyGroupBy {
    ds.frame()
        .clone()
        .lazy()
        .filter(col(DIST_NAME).is_not_null())
        .group_by_stable([col(DIST_NAME)])
}

fn read_district_values(df: &DataFrame, value_col: &str) -> Result<Vec<(String, f64)>, AggregateError> {
    let names = df.column(DIST_NAME)?.str()?;
    let values = df.column(value_col)?.f64()?;
    Ok(names
        .into_iter()
        .zip(values)
        .filter_map(|(name, value)| Some((name?.to_string(), zero_if_missing(value))))
        .collect())
}

/// Sum `metric` per district.
pub fn group_sum_by_district(ds: &Dataset, metric: Metric) -> Result<DistrictTotals, AggregateError> {
    require(ds, &[DIST_NAME, metric.column()])?;

    let df = grouped_by_district(ds)
        .agg([summed(metric.column())])
        .collect()?;

    let rows = read_district_values(&df, metric.column())?
        .into_iter()
        .map(|(dist_name, value)| DistrictTotal { dist_name, value })
        .collect();
    Ok(DistrictTotals { metric, rows })
}

/// `totalAmount` per district with each district's share of the total.
///
/// Shares only count positive sums, so a district with a negative or zero total gets
/// a zero share and the shares still add up to 1 (or are all zero).
pub fn amount_share_by_district(ds: &Dataset) -> Result<Vec<DistrictShare>, AggregateError> {
    let totals = group_sum_by_district(ds, Metric::TotalAmount)?;
    let positive: f64 = totals.rows.iter().map(|r| r.value.max(0.0)).sum();

    Ok(totals
        .rows
        .into_iter()
        .map(|r| DistrictShare {
            share: if positive > 0.0 {
                r.value.max(0.0) / positive
            } else {
                0.0
            },
            dist_name: r.dist_name,
            total_amount: r.value,
        })
        .collect())
}

/// Sum `noOfTrans` per (district, item). Requires `itemName`.
pub fn group_sum_by_district_item(ds: &Dataset) -> Result<Vec<DistrictItemTotal>, AggregateError> {
    require(ds, &[DIST_NAME, ITEM_NAME, NO_OF_TRANS])?;

    let df = ds
        .frame()
        .clone()
        .lazy()
        .filter(col(DIST_NAME).is_not_null().and(col(ITEM_NAME).is_not_null()))
        .group_by_stable([col(DIST_NAME), col(ITEM_NAME)])
        .agg([col(NO_OF_TRANS).fill_null(lit(0i64)).sum()])
        .collect()?;

    let names = df.column(DIST_NAME)?.str()?;
    let items = df.column(ITEM_NAME)?.str()?;
    let counts = df.column(NO_OF_TRANS)?.i64()?;

    Ok(names
        .into_iter()
        .zip(items)
        .zip(counts)
        .filter_map(|((name, item), count)| {
            Some(DistrictItemTotal {
                dist_name: name?.to_string(),
                item_name: item?.to_string(),
                no_of_trans: count.unwrap_or(0),
            })
        })
        .collect())
}

/// Restrict district×item rows to one district, matching on the grouping key.
pub fn filter_district_items(
    rows: &[DistrictItemTotal],
    filter: &DistrictFilter,
) -> Vec<DistrictItemTotal> {
    rows.iter()
        .filter(|r| filter.matches(&r.dist_name))
        .cloned()
        .collect()
}

/// Sum of all five item columns per district. Requires every item column.
pub fn combined_items_by_district(ds: &Dataset) -> Result<Vec<DistrictItemsTotal>, AggregateError> {
    require(ds, &[DIST_NAME])?;
    require(ds, &Item::columns())?;
    require(ds, &[TOTAL_ITEMS])?;

    let df = grouped_by_district(ds)
        .agg([summed(TOTAL_ITEMS)])
        .collect()?;

    Ok(read_district_values(&df, TOTAL_ITEMS)?
        .into_iter()
        .map(|(dist_name, total_items)| DistrictItemsTotal {
            dist_name,
            total_items,
        })
        .collect())
}

pub fn filter_combined_items(
    rows: &[DistrictItemsTotal],
    filter: &DistrictFilter,
) -> Vec<DistrictItemsTotal> {
    rows.iter()
        .filter(|r| filter.matches(&r.dist_name))
        .cloned()
        .collect()
}

/// One row per district with each item quantity summed. Requires every item column.
pub fn item_quantities_by_district(
    ds: &Dataset,
) -> Result<Vec<DistrictItemQuantities>, AggregateError> {
    require(ds, &[DIST_NAME])?;
    require(ds, &Item::columns())?;

    let df = grouped_by_district(ds)
        .agg(Item::columns().map(summed))
        .collect()?;

    let names = df.column(DIST_NAME)?.str()?;
    let mut columns = Vec::with_capacity(Item::ALL.len());
    for name in Item::columns() {
        columns.push(df.column(name)?.f64()?);
    }

    let mut rows = Vec::with_capacity(df.height());
    for (i, name) in names.into_iter().enumerate() {
        let Some(name) = name else {
            continue;
        };
        let at = |idx: usize| zero_if_missing(columns[idx].get(i));
        rows.push(DistrictItemQuantities {
            dist_name: name.to_string(),
            quantities: ItemQuantities {
                salt: at(0),
                wheat: at(1),
                rgdal: at(2),
                kerosene: at(3),
                sugar: at(4),
            },
        });
    }
    Ok(rows)
}

/// Detail rows for one district (or all), sorted descending by `sort`.
///
/// Ties keep their original relative order; missing values sort last.
pub fn filter_and_sort(
    ds: &Dataset,
    filter: &DistrictFilter,
    sort: SortColumn,
) -> Result<Vec<ShopDetail>, AggregateError> {
    require(ds, &[DIST_NAME, NO_OF_TRANS, TOTAL_AMOUNT])?;

    let mut lf = ds
        .frame()
        .clone()
        .lazy()
        .select([col(DIST_NAME), col(NO_OF_TRANS), col(TOTAL_AMOUNT)]);

    if let DistrictFilter::District(name) = filter {
        lf = lf.filter(col(DIST_NAME).eq(lit(name.clone())));
    }

    let df = lf
        .sort_by_exprs(
            [col(sort.column())],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let names = df.column(DIST_NAME)?.str()?;
    let counts = df.column(NO_OF_TRANS)?.i64()?;
    let amounts = df.column(TOTAL_AMOUNT)?.f64()?;

    Ok(names
        .into_iter()
        .zip(counts)
        .zip(amounts)
        .map(|((name, count), amount)| ShopDetail {
            dist_name: name.map(str::to_string),
            no_of_trans: count,
            total_amount: amount,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;

    fn as_pairs(totals: &DistrictTotals) -> Vec<(&str, f64)> {
        totals
            .rows
            .iter()
            .map(|r| (r.dist_name.as_str(), r.value))
            .collect()
    }

    #[test]
    fn scenario_sums_per_district() {
        let ds = fixtures::scenario();

        let trans = group_sum_by_district(&ds, Metric::NoOfTrans).unwrap();
        assert_eq!(as_pairs(&trans), vec![("A", 7.0), ("B", 3.0)]);

        let amount = group_sum_by_district(&ds, Metric::TotalAmount).unwrap();
        assert_eq!(as_pairs(&amount), vec![("A", 120.0), ("B", 50.0)]);
    }

    #[test]
    fn group_sum_preserves_total_mass() {
        for ds in [fixtures::scenario(), fixtures::with_items()] {
            let records = ds.records().unwrap();

            let trans = group_sum_by_district(&ds, Metric::NoOfTrans).unwrap();
            let expected: i64 = records.iter().map(|r| r.no_of_trans).sum();
            assert_eq!(trans.total(), expected as f64);

            let amount = group_sum_by_district(&ds, Metric::TotalAmount).unwrap();
            let expected: f64 = records.iter().map(|r| r.total_amount).sum();
            assert!((amount.total() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn one_row_per_distinct_district() {
        let ds = fixtures::with_items();
        let amount = group_sum_by_district(&ds, Metric::TotalAmount).unwrap();

        let names: Vec<String> = amount.rows.iter().map(|r| r.dist_name.clone()).collect();
        assert_eq!(names, ds.districts().unwrap());
    }

    #[test]
    fn missing_amounts_count_as_zero() {
        let df = df!(
            DIST_NAME => ["A", "A", "B"],
            NO_OF_TRANS => [Some(1i64), None, Some(2)],
            TOTAL_AMOUNT => [Some(10.0), None, Some(f64::NAN)],
        )
        .unwrap();
        let ds = Dataset::from_frame(df, "t.csv").unwrap();

        let amount = group_sum_by_district(&ds, Metric::TotalAmount).unwrap();
        assert_eq!(as_pairs(&amount), vec![("A", 10.0), ("B", 0.0)]);

        let trans = group_sum_by_district(&ds, Metric::NoOfTrans).unwrap();
        assert_eq!(as_pairs(&trans), vec![("A", 1.0), ("B", 2.0)]);
    }

    #[test]
    fn rows_without_district_do_not_form_a_group() {
        let df = df!(
            DIST_NAME => [Some("A"), None],
            NO_OF_TRANS => [1i64, 2],
            TOTAL_AMOUNT => [1.0, 2.0],
        )
        .unwrap();
        let ds = Dataset::from_frame(df, "t.csv").unwrap();

        let trans = group_sum_by_district(&ds, Metric::NoOfTrans).unwrap();
        assert_eq!(as_pairs(&trans), vec![("A", 1.0)]);
        assert_eq!(filter_and_sort(&ds, &DistrictFilter::All, SortColumn::NoOfTrans).unwrap().len(), 2);
    }

    #[test]
    fn shares_add_up_and_ignore_negative_totals() {
        let ds = fixtures::scenario();
        let shares = amount_share_by_district(&ds).unwrap();
        let sum: f64 = shares.iter().map(|s| s.share).sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((shares[0].share - 120.0 / 170.0).abs() < 1e-12);

        let df = df!(
            DIST_NAME => ["A", "B"],
            NO_OF_TRANS => [1i64, 1],
            TOTAL_AMOUNT => [-5.0, 10.0],
        )
        .unwrap();
        let ds = Dataset::from_frame(df, "t.csv").unwrap();
        let shares = amount_share_by_district(&ds).unwrap();
        assert_eq!(shares[0].share, 0.0);
        assert_eq!(shares[0].total_amount, -5.0);
        assert_eq!(shares[1].share, 1.0);
    }

    #[test]
    fn district_item_sums_and_filter_on_district() {
        let ds = fixtures::with_items();
        let rows = group_sum_by_district_item(&ds).unwrap();
        let triples: Vec<(&str, &str, i64)> = rows
            .iter()
            .map(|r| (r.dist_name.as_str(), r.item_name.as_str(), r.no_of_trans))
            .collect();
        assert_eq!(
            triples,
            vec![("A", "rice", 5), ("B", "rice", 3), ("A", "oil", 2), ("C", "rice", 4), ("B", "oil", 1)]
        );

        // The filter keys on the same district column the rows were grouped by,
        // so selecting a district really narrows the sunburst.
        let only_b = filter_district_items(&rows, &DistrictFilter::from("B"));
        assert_eq!(only_b.len(), 2);
        assert!(only_b.iter().all(|r| r.dist_name == "B"));
        assert_eq!(filter_district_items(&rows, &DistrictFilter::All), rows);
    }

    #[test]
    fn district_item_requires_item_name() {
        let ds = fixtures::scenario();
        let err = group_sum_by_district_item(&ds).unwrap_err();
        assert!(matches!(err, AggregateError::MissingColumn { ref column } if column == ITEM_NAME));
    }

    #[test]
    fn combined_items_per_district() {
        let ds = fixtures::with_items();
        let rows = combined_items_by_district(&ds).unwrap();
        let pairs: Vec<(&str, f64)> = rows
            .iter()
            .map(|r| (r.dist_name.as_str(), r.total_items))
            .collect();
        assert_eq!(pairs, vec![("A", 18.0), ("B", 4.0), ("C", 10.0)]);

        let only_c = filter_combined_items(&rows, &DistrictFilter::from("C"));
        assert_eq!(only_c.len(), 1);
        assert_eq!(only_c[0].total_items, 10.0);
    }

    #[test]
    fn combined_items_unavailable_without_item_columns() {
        let ds = fixtures::scenario();
        let err = combined_items_by_district(&ds).unwrap_err();
        assert!(matches!(err, AggregateError::MissingColumn { ref column } if column == "salt"));

        // other views are unaffected
        assert!(group_sum_by_district(&ds, Metric::TotalAmount).is_ok());
    }

    #[test]
    fn item_quantities_per_district() {
        let ds = fixtures::with_items();
        let rows = item_quantities_by_district(&ds).unwrap();
        assert_eq!(rows.len(), 3);

        let a = &rows[0];
        assert_eq!(a.dist_name, "A");
        assert_eq!(
            a.quantities,
            ItemQuantities {
                salt: 2.0,
                wheat: 2.0,
                rgdal: 4.0,
                kerosene: 4.0,
                sugar: 6.0,
            }
        );

        let combined = combined_items_by_district(&ds).unwrap();
        for (q, c) in rows.iter().zip(&combined) {
            assert_eq!(q.quantities.total(), c.total_items);
        }

        assert!(item_quantities_by_district(&fixtures::scenario()).is_err());
    }

    #[test]
    fn all_rows_sorted_descending_by_count() {
        let ds = fixtures::with_items();
        let rows = filter_and_sort(&ds, &DistrictFilter::All, SortColumn::NoOfTrans).unwrap();
        assert_eq!(rows.len(), ds.height());

        let counts: Vec<i64> = rows.iter().filter_map(|r| r.no_of_trans).collect();
        assert_eq!(counts, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn sort_keeps_original_order_for_ties() {
        let df = df!(
            DIST_NAME => ["A", "B", "C", "D"],
            NO_OF_TRANS => [1i64, 2, 1, 2],
            TOTAL_AMOUNT => [1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let ds = Dataset::from_frame(df, "t.csv").unwrap();

        let rows = filter_and_sort(&ds, &DistrictFilter::All, SortColumn::NoOfTrans).unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r.dist_name.as_deref()).collect();
        assert_eq!(names, vec!["B", "D", "A", "C"]);
    }

    #[test]
    fn filter_keeps_one_district_sorted_by_amount() {
        let ds = fixtures::scenario();
        let rows = filter_and_sort(&ds, &DistrictFilter::from("A"), SortColumn::TotalAmount).unwrap();
        assert_eq!(
            rows,
            vec![
                ShopDetail {
                    dist_name: Some("A".into()),
                    no_of_trans: Some(5),
                    total_amount: Some(100.0),
                },
                ShopDetail {
                    dist_name: Some("A".into()),
                    no_of_trans: Some(2),
                    total_amount: Some(20.0),
                },
            ]
        );
    }

    #[test]
    fn filter_on_every_district_returns_only_that_district() {
        let ds = fixtures::with_items();
        for district in ds.districts().unwrap() {
            let rows =
                filter_and_sort(&ds, &DistrictFilter::from(district.as_str()), SortColumn::DistName)
                    .unwrap();
            assert!(!rows.is_empty());
            assert!(rows.iter().all(|r| r.dist_name.as_deref() == Some(district.as_str())));
        }

        let none = filter_and_sort(&ds, &DistrictFilter::from("Nowhere"), SortColumn::DistName).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn sort_by_district_name_is_descending() {
        let ds = fixtures::with_items();
        let rows = filter_and_sort(&ds, &DistrictFilter::All, SortColumn::DistName).unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r.dist_name.as_deref()).collect();
        assert_eq!(names, vec!["C", "B", "B", "A", "A"]);
    }
}
