//! Shop-wise Transaction Dashboard - interactive district and item analysis of
//! shop transaction records.

use eframe::egui;
use shopwise::config::DashboardConfig;
use shopwise::gui::DashboardApp;
use shopwise::logging;

fn main() -> anyhow::Result<()> {
    let mut config = DashboardConfig::load()?;
    if let Some(path) = std::env::args_os().nth(1) {
        config = config.with_data_path(path);
    }

    logging::initialize(&config.log_filter)?;
    tracing::info!("Starting dashboard for {}", config.data_path.display());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Shop-wise Transaction Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Shop-wise Transaction Dashboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
