//! Charts module - Chart geometry, interactive drawing and PNG export

pub mod layout;
mod plotter;
mod renderer;

pub use plotter::{category_color, ChartPlotter};
pub use renderer::{ChartJob, StaticChartRenderer};

/// Category colours shared by the interactive and exported charts.
pub const PALETTE: [(u8, u8, u8); 10] = [
    (52, 152, 219),  // Blue
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (255, 87, 34),   // Deep Orange
    (121, 85, 72),   // Brown
];
