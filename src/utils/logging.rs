// Mon Oct 19 2026 - Alex

use colored::*;
use log::{Level, LevelFilter};
use std::io::Write;
use std::time::Instant;

pub struct LoggingUtils;

impl LoggingUtils {
    /// Install the process-wide logger. `RUST_LOG` still narrows per-module
    /// filters on top of `level`. Calling twice is harmless.
    pub fn init_logger(level: LevelFilter, use_color: bool) {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level).format_timestamp(None);
        if let Ok(filters) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filters);
        }
        builder.format(move |buf, record| {
            let level = if use_color {
                Self::format_level(record.level()).to_string()
            } else {
                format!("{:5}", record.level())
            };
            writeln!(buf, "{} [{}] {}", level, record.target(), record.args())
        });
        builder.try_init().ok();
    }

    fn format_level(level: Level) -> ColoredString {
        match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green().bold(),
            Level::Debug => "DEBUG".blue().bold(),
            Level::Trace => "TRACE".magenta().bold(),
        }
    }

    pub fn level_from_str(s: &str) -> LevelFilter {
        match s.to_lowercase().as_str() {
            "error" => LevelFilter::Error,
            "warn" | "warning" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            "trace" => LevelFilter::Trace,
            "off" => LevelFilter::Off,
            _ => LevelFilter::Warn,
        }
    }

    pub fn level_from_verbosity(verbosity: u8) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Logs the wall time of a scope at debug level when dropped.
pub struct ScopedTimer {
    name: String,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(name: &str) -> Self {
        log::debug!("[TIMER] {} started", name);
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::debug!("[TIMER] {} took {:.2}ms", self.name, self.elapsed_ms());
    }
}
