//! Data module - CSV loading, aggregation and dashboard views

pub mod aggregate;
mod dataset;
mod loader;
pub mod schema;
mod views;

pub use dataset::{Dataset, FeatureFlags};
pub use loader::{DataLoader, LoadOptions};
pub use schema::{DistrictFilter, Item, ItemQuantities, Metric, SortColumn, TransactionRecord};
pub use views::{DashboardViews, Selection};
