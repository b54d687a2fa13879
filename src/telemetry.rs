/// Telemetry Module - Structured Logging with Tracing
///
/// - JSON vs pretty format (`LOTUSIA_LOG_FORMAT`)
/// - Optional file output with rotation (`LOTUSIA_LOG_FILE`)
/// - RUST_LOG env var support
/// - Truncation helpers for hashes in log fields

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub log_level: String,
    /// Log format: "json" or "pretty"
    pub log_format: String,
    /// Optional log file path (None = console only)
    pub log_file: Option<String>,
    /// Rotation interval: "daily", "hourly", "never"
    pub rotation: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            log_format: std::env::var("LOTUSIA_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            log_file: std::env::var("LOTUSIA_LOG_FILE").ok(),
            rotation: "daily".to_string(),
        }
    }
}

/// Initialize tracing subscriber
///
/// The returned guard must be held for the life of the process when logging
/// to a file, otherwise buffered lines are lost on exit.
pub fn init_tracing(
    config: TelemetryConfig,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let json = config.log_format == "json";

    let Some(log_file_path) = config.log_file else {
        if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_current_span(true).with_span_list(true))
                .try_init()?;
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(false).with_line_number(true))
                .try_init()?;
        }
        return Ok(None);
    };

    let path = std::path::Path::new(&log_file_path);
    let directory = path
        .parent()
        .ok_or("Invalid log file path: no parent directory")?;
    let file_name = path
        .file_name()
        .ok_or("Invalid log file path: no filename")?;
    let file_appender = match config.rotation.as_str() {
        "hourly" => rolling::hourly(directory, file_name),
        "never" => rolling::never(directory, file_name),
        _ => rolling::daily(directory, file_name),
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(non_blocking),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_line_number(true)
                    .with_writer(non_blocking),
            )
            .try_init()?;
    }

    Ok(Some(guard))
}

/// Truncate hex string for logging
///
/// Example: "0a1b2c3d4e5f67890a1b2c3d4e5f6789" → "0a1b2c3d4e5f6789..."
pub fn truncate_hex(hex: &str, len: usize) -> String {
    match hex.get(..len) {
        Some(prefix) if hex.len() > len => format!("{}...", prefix),
        _ => hex.to_string(),
    }
}
