use std::sync::Arc;
use tokio::sync::mpsc;

use pocket_phone::log_collector::get_global_logs_path;
use pocket_phone::ui::{PhoneApp, PhoneController, Providers};
use pocket_phone::{LogCollector, LogLine, SettingsManager};

#[tokio::main]
async fn main() -> pocket_phone::Result<()> {
    // =========================================================================
    // SETTINGS - needed first for the debug logging flag
    // =========================================================================
    let (settings, settings_error) = match SettingsManager::load() {
        Ok(settings) => (settings, None),
        Err(e) => {
            eprintln!("[Main] WARNING: Falling back to default settings: {}", e);
            (Default::default(), Some(e))
        }
    };

    // =========================================================================
    // LOG COLLECTOR - DECOUPLED FROM UI
    // =========================================================================
    let log_dir = get_global_logs_path()?;
    let (log_ui_tx, log_ui_rx) = mpsc::channel::<LogLine>(1024);
    let log_collector = match LogCollector::new(log_dir, log_ui_tx) {
        Ok(collector) => {
            eprintln!("[Main] ✓ LogCollector initialized");
            collector
        }
        Err(e) => {
            return Err(format!("LogCollector initialization failed: {}", e).into());
        }
    };

    if let Err(e) = pocket_phone::initialize_logging(log_collector.clone(), settings.debug_logging) {
        eprintln!("[Main] WARNING: {}", e);
    }
    log::info!("Pocket Phone {} logging initialized", pocket_phone::VERSION);

    // =========================================================================
    // CONTROLLER
    // =========================================================================
    let controller = Arc::new(PhoneController::new(settings, Providers::detect()));
    controller.start();
    if let Some(e) = settings_error {
        controller.report_config_error(e);
    }

    let app = PhoneApp::new(Arc::clone(&controller), Some(log_ui_rx));

    // =========================================================================
    // LAUNCH EGUI
    // =========================================================================
    eprintln!("[Main] Launching egui frontend...");
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 820.0])
            .with_min_inner_size([420.0, 640.0]),
        ..Default::default()
    };

    let result = eframe::run_native("Pocket Phone", options, Box::new(move |_cc| Box::new(app)));

    // =========================================================================
    // SHUTDOWN
    // =========================================================================
    controller.shutdown_tasks();
    log::info!("Pocket Phone shutting down");
    if let Err(e) = log_collector.wait_for_empty().await {
        eprintln!("[Main] WARNING: Failed to wait for log collector to empty: {}", e);
    }

    result.map_err(|e| e.to_string().into())
}
