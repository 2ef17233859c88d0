use std::io::Write;
use std::sync::atomic::{self, AtomicBool};

use colored::Colorize;
use log::{Metadata, Record};
use parking_lot::Mutex;

use crate::config::Config;

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

struct Logger {
    stderr: Mutex<std::io::Stderr>,
    colored: bool,
}

impl Logger {
    pub fn new(colored: bool) -> Self {
        Self {
            stderr: Mutex::new(std::io::stderr()),
            colored,
        }
    }

    fn format(&self, record: &Record) -> String {
        let msg_str = format!("[{}] {}", env!("CARGO_PKG_NAME"), record.args());
        let time_str = format!(
            "[ {} ]",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        if !self.colored {
            return format!("{} {:<5} {}\n", time_str, record.level(), msg_str);
        }

        let msg_str_colored = match record.level() {
            log::Level::Error => msg_str.red().bold(),
            log::Level::Warn => msg_str.yellow(),
            log::Level::Info => msg_str.white(),
            log::Level::Debug => msg_str.dimmed(),
            log::Level::Trace => msg_str.dimmed(),
        };
        format!("{} {}\n", time_str.green(), msg_str_colored)
    }
}

impl log::Log for Logger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let msg = self.format(record);
            let mut stderr = self.stderr.lock();
            let _ = stderr.write_all(msg.as_bytes());
        }
    }

    fn flush(&self) {
        let _ = self.stderr.lock().flush();
    }
}

/// Install the stderr logger. Calling it again, or after the host process
/// already installed its own logger, is not an error.
pub fn init_logger() {
    if LOGGER_INITIALIZED.load(atomic::Ordering::SeqCst) {
        return;
    }

    let log_config = Config::global().log.clone();
    let logger = Logger::new(log_config.colored);

    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(log_config.level.into());
    }

    LOGGER_INITIALIZED.store(true, atomic::Ordering::SeqCst);
}
