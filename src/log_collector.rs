//! Decoupled logging pipeline for the phone session.
//!
//! ```text
//! log::info!() / log_parsed!()
//!     |
//! [LogCollector] (crossbeam channel, never blocks the caller)
//!     |
//! [writer thread] --> logs/full/<ts>_full.log
//!     |           --> logs/parsed/<ts>_parsed.log  (target "parsed" only)
//!     v
//! UI channel (bounded, lossy) --> debug log panel
//! ```
//!
//! Disk writes happen regardless of the UI channel. A full UI channel only
//! drops lines from the panel.

use chrono::Local;
use crossbeam_channel::{unbounded, Sender};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Target used for high-level lifecycle events.
pub const PARSED_TARGET: &str = "parsed";

enum LogMessage {
    Line(LogLine),
    /// Flush marker; the sender is signalled once everything before it is on disk
    Flush(std::sync::mpsc::Sender<()>),
}

/// Logs directory under the pocket-phone data dir, falling back to ./logs.
pub fn get_global_logs_path() -> Result<PathBuf, String> {
    if let Some(data) = dirs::data_local_dir() {
        return Ok(data.join("pocket-phone").join("logs"));
    }
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Failed to get current working directory: {}", e))?;
    Ok(cwd.join("logs"))
}

/// Whether a line goes to the full log only or also to the parsed log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogKind {
    Full,
    Parsed,
}

impl LogKind {
    fn dir_name(&self) -> &'static str {
        match self {
            LogKind::Full => "full",
            LogKind::Parsed => "parsed",
        }
    }
}

/// A log line with metadata
#[derive(Clone, Debug)]
pub struct LogLine {
    pub message: String,
    pub kind: LogKind,
    pub level: Level,
    /// HH:MM:SS.mmm
    pub timestamp: String,
}

impl LogLine {
    pub fn new(message: String) -> Self {
        Self::with_kind(message, LogKind::Full, Level::Info)
    }

    pub fn parsed(message: String) -> Self {
        Self::with_kind(message, LogKind::Parsed, Level::Info)
    }

    fn with_kind(message: String, kind: LogKind, level: Level) -> Self {
        LogLine {
            message,
            kind,
            level,
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    fn formatted(&self) -> String {
        format!("[{}] {}\n", self.timestamp, self.message)
    }
}

/// Unified logger that handles disk and UI dispatch
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    log_dir: PathBuf,
    max_level: LevelFilter,
}

impl LogCollector {
    /// Create the collector and its writer thread.
    ///
    /// A plain OS thread is used so lines logged from any runtime (or none)
    /// reach disk.
    pub fn new(log_dir: PathBuf, ui_tx: tokio::sync::mpsc::Sender<LogLine>) -> Result<Self, String> {
        for kind in [LogKind::Full, LogKind::Parsed] {
            std::fs::create_dir_all(log_dir.join(kind.dir_name()))
                .map_err(|e| format!("Failed to create {} log dir: {}", kind.dir_name(), e))?;
        }

        let (tx, rx) = unbounded::<LogMessage>();
        let thread_dir = log_dir.clone();

        std::thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                let mut full = open_session_log(&thread_dir, LogKind::Full);
                let mut parsed = open_session_log(&thread_dir, LogKind::Parsed);

                while let Ok(msg) = rx.recv() {
                    match msg {
                        LogMessage::Line(line) => {
                            let text = line.formatted();
                            if let Some(file) = full.as_mut() {
                                let _ = file.write_all(text.as_bytes());
                            }
                            if line.kind == LogKind::Parsed {
                                if let Some(file) = parsed.as_mut() {
                                    let _ = file.write_all(text.as_bytes());
                                }
                            }
                            // Lossy by design of the panel: disk already has the line
                            let _ = ui_tx.try_send(line);
                        }
                        LogMessage::Flush(done) => {
                            for file in [full.as_mut(), parsed.as_mut()].into_iter().flatten() {
                                let _ = file.flush();
                            }
                            let _ = done.send(());
                        }
                    }
                }
                eprintln!("[Log] Writer thread shutting down");
            })
            .map_err(|e| format!("Failed to spawn log writer: {}", e))?;

        Ok(LogCollector {
            tx,
            log_dir,
            max_level: LevelFilter::Info,
        })
    }

    /// Let debug records through (settings `debug_logging`).
    pub fn with_max_level(mut self, level: LevelFilter) -> Self {
        self.max_level = level;
        self
    }

    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn log(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    pub fn log_str(&self, message: impl Into<String>) {
        self.log(LogLine::new(message.into()));
    }

    /// High-level lifecycle event; also lands in the parsed log.
    pub fn log_parsed(&self, message: impl Into<String>) {
        self.log(LogLine::parsed(message.into()));
    }

    /// Wait until every line sent before this call is flushed to disk.
    pub async fn wait_for_empty(&self) -> Result<(), String> {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        self.tx
            .send(LogMessage::Flush(tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;

        tokio::task::spawn_blocking(move || rx.recv())
            .await
            .map_err(|e| format!("Flush task failed: {}", e))?
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }
}

/// Routes `log` records into the collector. Target "parsed" marks
/// lifecycle events.
impl Log for LogCollector {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = format!("[{}] {}", record.level(), record.args());
        let kind = if record.target() == PARSED_TARGET {
            LogKind::Parsed
        } else {
            LogKind::Full
        };
        self.log(LogLine::with_kind(message, kind, record.level()));
    }

    fn flush(&self) {}
}

/// Open a fresh timestamped log file for this session.
fn open_session_log(log_dir: &Path, kind: LogKind) -> Option<File> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = log_dir
        .join(kind.dir_name())
        .join(format!("{}_{}.log", timestamp, kind.dir_name()));

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("[Log] Failed to open {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_dir_text(dir: &Path) -> String {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| fs::read_to_string(e.path()).unwrap_or_default())
            .collect()
    }

    #[tokio::test]
    async fn test_log_collector_creates_directories() {
        let temp = tempfile::TempDir::new().unwrap();
        let (ui_tx, _ui_rx) = tokio::sync::mpsc::channel(100);
        LogCollector::new(temp.path().to_path_buf(), ui_tx).unwrap();

        assert!(temp.path().join("full").exists());
        assert!(temp.path().join("parsed").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_parsed_lines_reach_both_logs() {
        let temp = tempfile::TempDir::new().unwrap();
        let (ui_tx, mut ui_rx) = tokio::sync::mpsc::channel(100);
        let collector = LogCollector::new(temp.path().to_path_buf(), ui_tx).unwrap();

        collector.log_str("battery tick");
        collector.log_parsed("[Power] Shut down");
        collector.wait_for_empty().await.unwrap();

        let full = read_dir_text(&temp.path().join("full"));
        let parsed = read_dir_text(&temp.path().join("parsed"));
        assert!(full.contains("battery tick"));
        assert!(full.contains("[Power] Shut down"));
        assert!(!parsed.contains("battery tick"));
        assert!(parsed.contains("[Power] Shut down"));

        assert_eq!(ui_rx.recv().await.unwrap().message, "battery tick");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_full_ui_channel_does_not_block() {
        let temp = tempfile::TempDir::new().unwrap();
        let (ui_tx, _ui_rx) = tokio::sync::mpsc::channel(1);
        let collector = LogCollector::new(temp.path().to_path_buf(), ui_tx).unwrap();

        for i in 0..500 {
            collector.log_str(format!("Log message {}", i));
        }
        collector.wait_for_empty().await.unwrap();

        let full = read_dir_text(&temp.path().join("full"));
        assert!(full.contains("Log message 499"));
    }

    #[test]
    fn test_debug_records_filtered_by_default() {
        let temp = tempfile::TempDir::new().unwrap();
        let (ui_tx, _ui_rx) = tokio::sync::mpsc::channel(1);
        let collector = LogCollector::new(temp.path().to_path_buf(), ui_tx).unwrap();
        let debug = Metadata::builder().level(Level::Debug).target("x").build();
        assert!(!collector.enabled(&debug));
        assert!(collector.with_max_level(LevelFilter::Debug).enabled(&debug));
    }
}
