use anyhow::Result;
use log::{Level, LevelFilter, Log, Metadata, Record};
use r2r::{log_debug, log_error, log_fatal, log_info, log_warn};
use std::{backtrace::Backtrace, panic};

const LOGGER_NAME: &str = env!("CARGO_PKG_NAME");

/// Forwards `log` records from the library to the ROS logger.
struct RosLogger;

impl Log for RosLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let args = record.args();
        match record.level() {
            Level::Error => log_error!(LOGGER_NAME, "{}", args),
            Level::Warn => log_warn!(LOGGER_NAME, "{}", args),
            Level::Info => log_info!(LOGGER_NAME, "{}", args),
            Level::Debug | Level::Trace => log_debug!(LOGGER_NAME, "{}", args),
        }
    }

    fn flush(&self) {}
}

/// Installs the ROS log bridge and a panic hook that reports the
/// panic with a backtrace before the default hook runs.
pub fn init() -> Result<()> {
    log::set_logger(&RosLogger)?;
    log::set_max_level(LevelFilter::Trace);

    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let backtrace = Backtrace::force_capture();
        log_fatal!(LOGGER_NAME, "{}\n{}", info, backtrace);
        default_hook(info);
    }));

    Ok(())
}
