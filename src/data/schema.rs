//! Column names, user-selectable parameters and the typed transaction row.

use serde::Serialize;
use std::fmt;

pub const DIST_NAME: &str = "distName";
pub const NO_OF_TRANS: &str = "noOfTrans";
pub const TOTAL_AMOUNT: &str = "totalAmount";
pub const ITEM_NAME: &str = "itemName";
pub const TOTAL_ITEMS: &str = "Total Items";

pub const REQUIRED_COLUMNS: [&str; 3] = [DIST_NAME, NO_OF_TRANS, TOTAL_AMOUNT];

/// Summable metric shown on the district bar charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    TotalAmount,
    NoOfTrans,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::TotalAmount, Metric::NoOfTrans];

    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalAmount => TOTAL_AMOUNT,
            Metric::NoOfTrans => NO_OF_TRANS,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Column the shop-level detail table is sorted by (always descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SortColumn {
    #[default]
    DistName,
    NoOfTrans,
    TotalAmount,
}

impl SortColumn {
    pub const ALL: [SortColumn; 3] = [
        SortColumn::DistName,
        SortColumn::NoOfTrans,
        SortColumn::TotalAmount,
    ];

    pub fn column(self) -> &'static str {
        match self {
            SortColumn::DistName => DIST_NAME,
            SortColumn::NoOfTrans => NO_OF_TRANS,
            SortColumn::TotalAmount => TOTAL_AMOUNT,
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// The five tracked commodity quantity columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Item {
    #[default]
    Salt,
    Wheat,
    Rgdal,
    Kerosene,
    Sugar,
}

impl Item {
    pub const ALL: [Item; 5] = [Item::Salt, Item::Wheat, Item::Rgdal, Item::Kerosene, Item::Sugar];

    pub fn column(self) -> &'static str {
        match self {
            Item::Salt => "salt",
            Item::Wheat => "wheat",
            Item::Rgdal => "rgdal",
            Item::Kerosene => "kerosene",
            Item::Sugar => "sugar",
        }
    }

    pub fn columns() -> [&'static str; 5] {
        Self::ALL.map(Item::column)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// District dropdown value: everything, or one exact district name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DistrictFilter {
    #[default]
    All,
    District(String),
}

impl DistrictFilter {
    pub fn matches(&self, dist_name: &str) -> bool {
        match self {
            DistrictFilter::All => true,
            DistrictFilter::District(name) => name == dist_name,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DistrictFilter::All)
    }

    /// Dropdown values: `All` followed by each district, in the given order.
    pub fn options(districts: &[String]) -> Vec<DistrictFilter> {
        std::iter::once(DistrictFilter::All)
            .chain(districts.iter().cloned().map(DistrictFilter::District))
            .collect()
    }
}

impl From<&str> for DistrictFilter {
    /// `"All"` selects everything; any other value is an exact district name.
    fn from(value: &str) -> Self {
        if value == "All" {
            DistrictFilter::All
        } else {
            DistrictFilter::District(value.to_string())
        }
    }
}

impl fmt::Display for DistrictFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistrictFilter::All => f.write_str("All"),
            DistrictFilter::District(name) => f.write_str(name),
        }
    }
}

/// Per-item quantities, in [`Item::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ItemQuantities {
    pub salt: f64,
    pub wheat: f64,
    pub rgdal: f64,
    pub kerosene: f64,
    pub sugar: f64,
}

impl ItemQuantities {
    pub fn get(&self, item: Item) -> f64 {
        match item {
            Item::Salt => self.salt,
            Item::Wheat => self.wheat,
            Item::Rgdal => self.rgdal,
            Item::Kerosene => self.kerosene,
            Item::Sugar => self.sugar,
        }
    }

    pub fn total(&self) -> f64 {
        self.salt + self.wheat + self.rgdal + self.kerosene + self.sugar
    }
}

/// One row of the source table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub dist_name: Option<String>,
    pub no_of_trans: i64,
    pub total_amount: f64,
    pub item_name: Option<String>,
    pub items: Option<ItemQuantities>,
}
