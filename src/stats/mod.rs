//! Stats module - Headline metrics

mod calculator;

pub use calculator::{format_amount, format_count, KeyMetrics};
