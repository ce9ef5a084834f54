//! The loaded transaction table and its capability flags.

use crate::data::schema::{
    Item, ItemQuantities, TransactionRecord, DIST_NAME, ITEM_NAME, NO_OF_TRANS,
    REQUIRED_COLUMNS, TOTAL_AMOUNT, TOTAL_ITEMS,
};
use crate::error::{AggregateError, DataLoadError};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Optional features available in this dataset, decided once after load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    /// All five item quantity columns are present (and `Total Items` was derived).
    pub has_item_columns: bool,
    pub has_item_name_column: bool,
}

/// Immutable, normalised transaction table.
///
/// Column types after normalisation: `distName` and `itemName` are text, `noOfTrans`
/// is `Int64`, `totalAmount` and the item quantities are `Float64`.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    source: PathBuf,
    features: FeatureFlags,
}

impl Dataset {
    /// Validate and normalise a freshly read frame.
    pub fn from_frame(df: DataFrame, source: impl Into<PathBuf>) -> Result<Self, DataLoadError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| df.get_column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns(missing));
        }

        let features = FeatureFlags {
            has_item_columns: Item::columns()
                .iter()
                .all(|name| df.get_column_index(name).is_some()),
            has_item_name_column: df.get_column_index(ITEM_NAME).is_some(),
        };

        let mut df = df;
        normalize(&mut df, DIST_NAME, DataType::String, "text")?;
        normalize(&mut df, NO_OF_TRANS, DataType::Int64, "an integer")?;
        normalize(&mut df, TOTAL_AMOUNT, DataType::Float64, "a number")?;
        if features.has_item_name_column {
            normalize(&mut df, ITEM_NAME, DataType::String, "text")?;
        }

        if features.has_item_columns {
            for name in Item::columns() {
                normalize(&mut df, name, DataType::Float64, "a number")?;
            }
            df = with_total_items(df)?;
        }

        Ok(Self {
            frame: df,
            source: source.into(),
            features,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn features(&self) -> FeatureFlags {
        self.features
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// True when every named column exists. Never fails.
    pub fn has_columns(&self, columns: &[&str]) -> bool {
        columns
            .iter()
            .all(|name| self.frame.get_column_index(name).is_some())
    }

    /// Warnings for optional views this dataset cannot supply.
    pub fn degraded_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.features.has_item_name_column {
            warnings.push(format!(
                "Column '{}' is missing in the dataset; item consumption by district is unavailable.",
                ITEM_NAME
            ));
        }
        if !self.features.has_item_columns {
            warnings.push(
                "Columns for combining items (Salt, Wheat, Rgdal, Kerosene, Sugar) are missing in the dataset."
                    .to_string(),
            );
        }
        warnings
    }

    /// Distinct district names in order of first appearance. Missing names are skipped.
    pub fn districts(&self) -> Result<Vec<String>, AggregateError> {
        let names = self.frame.column(DIST_NAME)?.str()?;
        let mut seen = HashSet::new();
        Ok(names
            .into_iter()
            .flatten()
            .filter(|name| seen.insert(*name))
            .map(str::to_string)
            .collect())
    }

    /// The table as typed rows. Missing numbers read as zero.
    pub fn records(&self) -> Result<Vec<TransactionRecord>, AggregateError> {
        let names = self.frame.column(DIST_NAME)?.str()?;
        let counts = self.frame.column(NO_OF_TRANS)?.i64()?;
        let amounts = self.frame.column(TOTAL_AMOUNT)?.f64()?;

        let item_names = if self.features.has_item_name_column {
            Some(self.frame.column(ITEM_NAME)?.str()?)
        } else {
            None
        };

        let quantities = if self.features.has_item_columns {
            let mut columns = Vec::with_capacity(Item::ALL.len());
            for name in Item::columns() {
                columns.push(self.frame.column(name)?.f64()?);
            }
            Some(columns)
        } else {
            None
        };

        let mut records = Vec::with_capacity(self.height());
        for i in 0..self.height() {
            let items = quantities.as_ref().map(|cols| {
                let at = |idx: usize| zero_if_missing(cols[idx].get(i));
                ItemQuantities {
                    salt: at(0),
                    wheat: at(1),
                    rgdal: at(2),
                    kerosene: at(3),
                    sugar: at(4),
                }
            });

            records.push(TransactionRecord {
                dist_name: names.get(i).map(str::to_string),
                no_of_trans: counts.get(i).unwrap_or(0),
                total_amount: zero_if_missing(amounts.get(i)),
                item_name: item_names
                    .and_then(|ca| ca.get(i))
                    .map(str::to_string),
                items,
            });
        }

        Ok(records)
    }
}

pub(crate) fn zero_if_missing(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

fn normalize(
    df: &mut DataFrame,
    name: &str,
    dtype: DataType,
    expected: &'static str,
) -> Result<(), DataLoadError> {
    let column = df.column(name)?;
    if column.dtype() == &dtype {
        return Ok(());
    }

    // float -> integer casts truncate instead of failing
    if dtype.is_integer() && column.dtype().is_float() {
        let values = column.cast(&DataType::Float64)?;
        if let Some(v) = values.f64()?.into_iter().flatten().find(|v| v.fract() != 0.0) {
            return Err(DataLoadError::Malformed {
                column: name.to_string(),
                expected,
                reason: format!("found non-integral value {v}"),
            });
        };
    }

    let cast = column
        .strict_cast(&dtype)
        .map_err(|e| DataLoadError::Malformed {
            column: name.to_string(),
            expected,
            reason: e.to_string(),
        })?;
    df.with_column(cast)?;
    Ok(())
}

/// Row-wise sum of the five item columns, missing cells counted as zero.
fn with_total_items(df: DataFrame) -> Result<DataFrame, DataLoadError> {
    let total = Item::columns()
        .iter()
        .map(|name| col(*name).fill_null(lit(0.0)).fill_nan(lit(0.0)))
        .reduce(|acc, e| acc + e)
        .unwrap_or_else(|| lit(0.0));

    Ok(df
        .lazy()
        .with_column(total.alias(TOTAL_ITEMS))
        .collect()?)
}
