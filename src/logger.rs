use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config::Config;
use crate::debug::DebugEvent;

static STUDIO_LOGGER: Lazy<StudioLogger> = Lazy::new(StudioLogger::new);

/// Installs the global logger. Calling it again only swaps the config.
pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let filter = config.min_level.to_level_filter();
    STUDIO_LOGGER.reconfigure(config)?;

    if log::set_logger(&*STUDIO_LOGGER).is_err() {
        log::debug!("Logger already installed, configuration updated");
    }

    log::set_max_level(filter);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Magenta,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            LogLevel::Trace => "🔍",
            LogLevel::Debug => "🐛",
            LogLevel::Info => "ℹ️ ",
            LogLevel::Warn => "⚠️ ",
            LogLevel::Error => "❌",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }

    /// `-q` wins over any number of `-v`.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => LogLevel::Warn,
            (false, 0) => LogLevel::Info,
            (false, 1) => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colors and emoji for an interactive terminal.
    Pretty,
    Plain,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            target: target.into(),
            message: message.into(),
        }
    }

    fn from_record(record: &Record) -> Self {
        Self::new(
            record.level().into(),
            record.target(),
            record.args().to_string(),
        )
    }

    pub fn render(&self, format: LogFormat, show_target: bool) -> String {
        if format == LogFormat::Json {
            return serde_json::to_string(self).unwrap_or_default();
        }

        let time = self.timestamp.format("%H:%M:%S%.3f").to_string();
        let target = if show_target {
            format!("{}: ", self.target)
        } else {
            String::new()
        };

        match format {
            LogFormat::Pretty => format!(
                "{} {} {}{}",
                time.bright_black(),
                format!("{} {:<5}", self.level.emoji(), self.level.as_str())
                    .color(self.level.color())
                    .bold(),
                target.bright_blue(),
                self.message
            ),
            _ => format!("{} {:<5} {}{}", time, self.level.as_str(), target, self.message),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub format: LogFormat,
    pub show_target: bool,
    /// Entries are also appended here, always without colors.
    pub log_file: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_target: false,
            log_file: None,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.show_target = enabled;
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Machine-readable output for batch runs.
    pub fn for_scripts() -> Self {
        Self {
            format: LogFormat::Json,
            show_target: true,
            ..Default::default()
        }
    }
}

/// `log` backend writing to stderr so stdout stays free for command output.
pub struct StudioLogger {
    config: Mutex<LoggerConfig>,
    file: Mutex<Option<File>>,
}

impl StudioLogger {
    pub fn new() -> Self {
        Self {
            config: Mutex::new(LoggerConfig::default()),
            file: Mutex::new(None),
        }
    }

    pub fn reconfigure(&self, config: LoggerConfig) -> Result<(), String> {
        let file = match &config.log_file {
            Some(path) => Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))?,
            ),
            None => None,
        };

        if let Ok(mut slot) = self.file.lock() {
            *slot = file;
        }
        if let Ok(mut current) = self.config.lock() {
            *current = config;
        }
        Ok(())
    }
}

impl Default for StudioLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for StudioLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.lock() {
            Ok(config) => LogLevel::from(metadata.level()) >= config.min_level,
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        let Ok(config) = self.config.lock() else {
            return;
        };
        if LogLevel::from(record.level()) < config.min_level {
            return;
        }

        let entry = LogEntry::from_record(record);
        eprintln!("{}", entry.render(config.format, config.show_target));

        if let Ok(mut file) = self.file.lock() {
            if let Some(file) = file.as_mut() {
                let format = match config.format {
                    LogFormat::Json => LogFormat::Json,
                    _ => LogFormat::Plain,
                };
                let _ = writeln!(file, "{}", entry.render(format, true));
            }
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
        if let Ok(mut file) = self.file.lock() {
            if let Some(file) = file.as_mut() {
                let _ = file.flush();
            }
        }
    }
}

/// Logs how long a scope took when dropped.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        log::info!(
            "⏱️  {} finished in {}ms",
            self.name,
            self.elapsed().as_millis()
        );
    }
}

/// Renders one debug event the way the terminal panel shows it.
pub fn format_debug_event(event: &DebugEvent, colors: bool) -> String {
    let header = format!(
        "[{}] {}",
        event.timestamp.format("%H:%M:%S%.3f"),
        event.kind
    );
    let body = serde_json::to_string_pretty(&event.payload).unwrap_or_default();

    if colors {
        format!("{}\n{}", header.bright_green().bold(), body.bright_black())
    } else {
        format!("{}\n{}", header, body)
    }
}

pub fn log_config_info(config: &Config) {
    log::info!("⚙️  Configuration loaded:");
    log::info!(
        "   Backend: {}",
        config.backend.base_url.as_deref().unwrap_or("(not set)")
    );
    log::info!(
        "   Endpoints: image={} video={} enhance={}",
        config.backend.image_endpoint,
        config.backend.video_endpoint,
        config.backend.enhance_endpoint
    );
    match &config.preprocess {
        Some(p) => log::info!("   Preprocess: {}x{}", p.max_width, p.max_height),
        None => log::info!("   Preprocess: ❌"),
    }
    log::info!("   Inspiration: {}", config.inspiration_path.display());
}
