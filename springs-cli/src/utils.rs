//! Some utilities

use std::path::PathBuf;

use ftlog::{
    appender::{FileAppender, Period},
    LevelFilter, LoggerGuard,
};

/// Configures the logger.
///
/// Logs go to stderr unless `file_name` is given, in which case they go to a
/// daily-rotated file under `logs/`.
///
/// # Errors
///
/// - If a logs directory could not be located/created.
/// - If the logger could not be initialized.
pub fn configure_logger(file_name: Option<&str>, verbose: bool) -> Result<LoggerGuard, String> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let builder = ftlog::Builder::new().max_log_level(level);

    let builder = match file_name {
        Some(file_name) => {
            let root_dir = PathBuf::from(".").canonicalize().map_err(|e| e.to_string())?;
            let logs_dir = root_dir.join("logs");
            if !logs_dir.exists() {
                std::fs::create_dir(&logs_dir).map_err(|e| e.to_string())?;
            }
            let log_path = logs_dir.join(file_name);
            let writer = FileAppender::builder().path(&log_path).rotate(Period::Day).build();
            builder.root(writer)
        }
        None => builder,
    };

    builder.try_init().map_err(|e| e.to_string())
}
