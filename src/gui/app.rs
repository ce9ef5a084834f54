//! Dashboard Main Application
//! Main window with control panel and dashboard view.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::{DashboardViews, DataLoader, Dataset, FeatureFlags};
use crate::error::{DashboardError, DataLoadError};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

/// CSV loading result from background thread
enum LoadResult {
    Complete(Dataset),
    Error(DataLoadError),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    loader: DataLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            loader: DataLoader::new((&config).into()),
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            config,
        };
        app.start_loading(app.config.data_path.clone());
        app
    }

    /// Load `path`, from the cache when possible, otherwise on a background thread.
    fn start_loading(&mut self, path: PathBuf) {
        if self.load_rx.is_some() {
            return; // Already loading
        }
        self.control_panel.csv_path = Some(path.clone());

        if self
            .loader
            .cached()
            .is_some_and(|dataset| dataset.source() == path)
        {
            match self.loader.load(&path) {
                Ok(dataset) => self.install_dataset(dataset),
                Err(e) => {
                    self.chart_viewer.clear();
                    self.report(&DashboardError::from(e));
                }
            }
            return;
        }

        self.control_panel.busy = true;
        self.control_panel
            .set_status(&format!("Loading {}...", path.display()));

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let options = self.loader.options();

        thread::spawn(move || {
            let result = match DataLoader::read(&path, options) {
                Ok(dataset) => LoadResult::Complete(dataset),
                Err(e) => LoadResult::Error(e),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(dataset)) => {
                self.control_panel.busy = false;
                self.install_dataset(Arc::new(dataset));
            }
            Ok(LoadResult::Error(e)) => {
                self.control_panel.busy = false;
                self.loader.clear();
                self.control_panel.update_dataset(&[], FeatureFlags::default());
                self.chart_viewer.clear();
                self.control_panel.export_enabled = false;
                self.report(&DashboardError::from(e));
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.busy = false;
                self.control_panel.set_status("Error: loader thread stopped");
            }
        }
    }

    fn install_dataset(&mut self, dataset: Arc<Dataset>) {
        self.loader.set_dataset(Arc::clone(&dataset));

        match dataset.districts() {
            Ok(districts) => self
                .control_panel
                .update_dataset(&districts, dataset.features()),
            Err(e) => {
                self.report(&DashboardError::from(e));
                return;
            }
        }

        self.control_panel.set_status(&format!(
            "Loaded {} rows, {} columns",
            dataset.height(),
            dataset.columns().len()
        ));
        self.recompute();
    }

    /// Rebuild every view from the cached dataset for the current selection.
    fn recompute(&mut self) {
        let Some(dataset) = self.loader.cached() else {
            return;
        };

        match DashboardViews::compute(&dataset, &self.control_panel.selection) {
            Ok(views) => {
                for warning in &views.warnings {
                    tracing::debug!("Degraded view: {}", warning);
                }
                self.chart_viewer.set_views(views);
                self.control_panel.export_enabled = true;
            }
            Err(e) => self.report(&DashboardError::from(e)),
        }
    }

    fn report(&mut self, err: &DashboardError) {
        tracing::error!("{}", err);
        self.chart_viewer.set_error(err);
        self.control_panel.set_status(&format!("Error: {}", err));
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Render every chart to PNG in a user-chosen folder, then open it.
    fn handle_export_charts(&mut self) {
        let Some(views) = &self.chart_viewer.views else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.config.export_dir)
            .pick_folder()
        else {
            return; // User cancelled
        };

        let size = (self.config.export_width, self.config.export_height);
        match StaticChartRenderer::export_all(views, &dir, size) {
            Ok(paths) => {
                self.control_panel
                    .set_status(&format!("Exported {} charts", paths.len()));
                if let Err(e) = open::that(&dir) {
                    tracing::warn!("Cannot open {}: {}", dir.display(), e);
                }
            }
            Err(e) => self.report(&DashboardError::from(e)),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        // Request repaint while loading
        if self.load_rx.is_some() {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::SelectionChanged => self.recompute(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
