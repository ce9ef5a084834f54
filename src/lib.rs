//! Shop-wise Transaction Dashboard
//!
//! Loads shop-level transaction records from CSV, aggregates them by district and
//! item, and presents the results as an interactive dashboard or exported PNG charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod gui;
pub mod logging;
pub mod stats;
