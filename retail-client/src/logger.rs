//! Logging Infrastructure
//!
//! Console output (pretty for development, JSON for production) plus an
//! optional daily rotating file under `log_dir`. Rotated files are named
//! `checkout.YYYY-MM-DD` and pruned by [`cleanup_old_logs`].

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Rotated log file prefix
pub const LOG_FILE_PREFIX: &str = "checkout";

/// Default retention for rotated log files
pub const DEFAULT_KEEP_DAYS: i64 = 14;

/// Initialize the logging system
///
/// `RUST_LOG` overrides `level` when set.
///
/// # Examples
/// ```no_run
/// // Development (console only)
/// retail_client::logger::init_logger("debug", false, None)?;
///
/// // Production (console + daily file)
/// retail_client::logger::init_logger("info", true, Some(std::path::Path::new("./logs")))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let layer = fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(appender));
            Some(if json_format {
                layer.json().boxed()
            } else {
                layer.boxed()
            })
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// Delete rotated log files older than `keep_days`.
///
/// Returns the number of files removed. Files that do not follow the
/// rotation naming are left alone.
pub fn cleanup_old_logs(log_dir: &Path, keep_days: i64) -> anyhow::Result<usize> {
    if !log_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(keep_days);
    let prefix = format!("{LOG_FILE_PREFIX}.");
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(date_part) = name.strip_prefix(&prefix)
            && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let today = chrono::Local::now().date_naive();
        let old = today - chrono::Duration::days(30);

        let old_file = dir.path().join(format!("checkout.{}", old.format("%Y-%m-%d")));
        let new_file = dir.path().join(format!("checkout.{}", today.format("%Y-%m-%d")));
        let other = dir.path().join("notes.txt");
        for f in [&old_file, &new_file, &other] {
            fs::write(f, "x").unwrap();
        }

        let removed = cleanup_old_logs(dir.path(), DEFAULT_KEEP_DAYS).unwrap();
        assert_eq!(removed, 1);
        assert!(!old_file.exists());
        assert!(new_file.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_cleanup_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(&dir.path().join("nope"), 7).unwrap(), 0);
    }
}
