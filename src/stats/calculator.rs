//! Key Metrics Module
//! Headline numbers shown above the charts.

use crate::data::schema::{DIST_NAME, NO_OF_TRANS, TOTAL_AMOUNT};
use crate::data::Dataset;
use crate::error::AggregateError;
use polars::prelude::*;
use serde::Serialize;

/// Dataset-wide totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct KeyMetrics {
    pub total_transactions: i64,
    pub total_sales: f64,
    /// Distinct `distName` values (shown as "Total Shops"); a missing name counts
    /// as one value of its own.
    pub district_count: usize,
}

impl KeyMetrics {
    pub fn compute(ds: &Dataset) -> Result<Self, AggregateError> {
        let frame = ds.frame();
        let total_transactions = frame
            .column(NO_OF_TRANS)?
            .i64()?
            .into_iter()
            .flatten()
            .sum();
        let total_sales = frame
            .column(TOTAL_AMOUNT)?
            .f64()?
            .into_iter()
            .flatten()
            .filter(|v| v.is_finite())
            .sum();

        let unnamed = usize::from(frame.column(DIST_NAME)?.null_count() > 0);

        Ok(Self {
            total_transactions,
            total_sales,
            district_count: ds.districts()?.len() + unnamed,
        })
    }
}

/// `1234567` -> `"1,234,567"`
pub fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let sign = if n < 0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(&digits))
}

/// `1234567.891` -> `"1,234,567.89"`
pub fn format_amount(x: f64) -> String {
    if !x.is_finite() {
        return x.to_string();
    }
    let fixed = format!("{:.2}", x.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if x < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
}

fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}
