//! Redirect log records into an arbitrary callable.
//!
//! [`CallbackSink`] is a [`log::Log`] implementation that hands each record to
//! a user supplied closure, which makes it possible to re-inject messages
//! emitted by this crate into a host application's own logging machinery.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

type Callback = Box<dyn Fn(Level, &str) + Send + Sync>;

/// Logger that forwards every enabled record to a callback.
pub struct CallbackSink {
    callback: Callback,
    level: LevelFilter,
}

impl CallbackSink {
    /// Create a sink that forwards records at or above `level`.
    pub fn new<F>(level: LevelFilter, callback: F) -> Self
    where
        F: Fn(Level, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
            level,
        }
    }

    /// Install this sink as the global logger.
    ///
    /// Fails if another logger has already been installed.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    /// Forward a single message, stripping one trailing newline.
    pub fn emit(&self, level: Level, message: &str) {
        let message = message
            .strip_suffix('\n')
            .map(|m| m.strip_suffix('\r').unwrap_or(m))
            .unwrap_or(message);
        (self.callback)(level, message);
    }
}

impl Log for CallbackSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.emit(record.level(), &record.args().to_string());
    }

    fn flush(&self) {}
}
