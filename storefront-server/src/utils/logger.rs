//! Logging Infrastructure
//!
//! Structured logging for development and production:
//! - console output, pretty or JSON
//! - daily rotating application logs (deleted after 14 days)
//! - daily payment logs for payment state transitions (kept)

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, prelude::*};

/// Target used by payment state transitions
pub const PAYMENT_TARGET: &str = "payment";

/// Days an application log file is kept
const APP_LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Delete `app.YYYY-MM-DD` files older than the retention window
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date_part) = name.strip_prefix("app.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }
    Ok(removed)
}

fn file_layer(dir: &Path, prefix: &str, json: bool) -> BoxedLayer {
    let appender = std::sync::Mutex::new(RollingFileAppender::new(Rotation::DAILY, dir, prefix));
    if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(appender)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .with_writer(appender)
            .boxed()
    }
}

/// Initialize logging
///
/// # Arguments
/// * `level` - default filter when `RUST_LOG` is unset ("info", "debug", ...)
/// * `json_format` - JSON console output (production)
/// * `log_dir` - optional directory for rolling files
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if json_format {
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    }

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        let app_log_dir = log_dir.join("app");
        let payment_log_dir = log_dir.join(PAYMENT_TARGET);
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&payment_log_dir)?;

        layers.push(
            file_layer(&app_log_dir, "app", json_format)
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != PAYMENT_TARGET
                }))
                .boxed(),
        );
        layers.push(
            file_layer(&payment_log_dir, PAYMENT_TARGET, json_format)
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == PAYMENT_TARGET
                }))
                .boxed(),
        );

        tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;
    Ok(())
}

/// Runs every hour
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// Payment log helper - records payment state transitions
///
/// Written to `payment/payment.YYYY-MM-DD`, never cleaned up.
///
/// ```ignore
/// payment_log!("1234567", "paid", method = "stripe");
/// ```
#[macro_export]
macro_rules! payment_log {
    ($order_id:expr, $event:expr) => {
        tracing::info!(
            target: "payment",
            order_id = %$order_id,
            event = $event,
            "PAYMENT"
        );
    };
    ($order_id:expr, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "payment",
            order_id = %$order_id,
            event = $event,
            $($arg)*,
            "PAYMENT"
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();
        let today = chrono::Local::now().date_naive();
        let old = today - chrono::Duration::days(30);
        fs::write(app.join(format!("app.{}", old.format("%Y-%m-%d"))), "old").unwrap();
        fs::write(app.join(format!("app.{}", today.format("%Y-%m-%d"))), "new").unwrap();
        fs::write(app.join("notes.txt"), "keep").unwrap();

        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 1);
        assert_eq!(fs::read_dir(&app).unwrap().count(), 2);
    }

    #[test]
    fn test_cleanup_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 0);
    }
}
