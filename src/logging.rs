use log::{Level, LevelFilter};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const LOG_TARGET: &str = "classmap";

/// Run-scoped logging handle.
///
/// Every component of a run holds a clone; changing the level through any
/// clone changes it for all of them. Records are forwarded to the `log`
/// facade, so the binary decides where they end up.
#[derive(Debug, Clone)]
pub struct LogContext {
    state: Arc<LogState>,
}

#[derive(Debug)]
struct LogState {
    level: AtomicUsize,
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl LogContext {
    pub fn new(level: LevelFilter) -> Self {
        Self {
            state: Arc::new(LogState {
                level: AtomicUsize::new(level as usize),
                warnings: AtomicUsize::new(0),
                errors: AtomicUsize::new(0),
            }),
        }
    }

    pub fn set_level(&self, level: LevelFilter) {
        self.state.level.store(level as usize, Ordering::Relaxed);
    }

    pub fn level(&self) -> LevelFilter {
        level_filter_from_usize(self.state.level.load(Ordering::Relaxed))
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level()
    }

    /// Number of warnings reported through this context, including filtered ones.
    pub fn warnings(&self) -> usize {
        self.state.warnings.load(Ordering::Relaxed)
    }

    /// Number of errors reported through this context, including filtered ones.
    pub fn errors(&self) -> usize {
        self.state.errors.load(Ordering::Relaxed)
    }

    pub fn emit(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::Error => {
                self.state.errors.fetch_add(1, Ordering::Relaxed);
            }
            Level::Warn => {
                self.state.warnings.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }

        if self.enabled(level) {
            log::log!(target: LOG_TARGET, level, "{}", args);
        }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, args);
    }

    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Trace, args);
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new(LevelFilter::Info)
    }
}

fn level_filter_from_usize(value: usize) -> LevelFilter {
    match value {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Lower-case level name as written into the instrumentation config.
pub fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
