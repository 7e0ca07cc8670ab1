/// System module: logger installation and the crate logging macros

use crate::log_collector::LogCollector;
use log::LevelFilter;

/// Install `collector` as the global `log` backend.
///
/// Only the first call wins; later calls return an error string so tests
/// that build several collectors do not abort.
pub fn initialize_logging(collector: LogCollector, debug: bool) -> Result<(), String> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let collector = collector.with_max_level(level);
    log::set_boxed_logger(Box::new(collector))
        .map_err(|e| format!("Logger already installed: {}", e))?;
    log::set_max_level(level);
    Ok(())
}

/// Logging macros for convenient access
/// Use the log crate directly for target-aware routing
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::info!("{}", msg);
    }}
}

#[macro_export]
macro_rules! log_parsed {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        // target="parsed" marks lifecycle events
        log::info!(target: "parsed", "{}", msg);
    }}
}
