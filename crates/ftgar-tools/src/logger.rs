use colorize::AnsiColor;
use indicatif::MultiProgress;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Writes log records to stderr without tearing the progress bars.
struct ConsoleLogger {
    progress: MultiProgress,
    level: LevelFilter,
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "error".red().bold(),
            Level::Warn => "warn".yellow().bold(),
            Level::Info => "info".green(),
            Level::Debug => "debug".blue(),
            Level::Trace => "trace".to_string(),
        };
        let line = format!("{level} {}", record.args());
        self.progress.suspend(|| eprintln!("{line}"));
    }

    fn flush(&self) {}
}

/// `verbosity` is the number of `-v` flags: warnings only, then info, then
/// everything down to debug.
pub fn init(progress: MultiProgress, verbosity: u8) -> Result<(), SetLoggerError> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    log::set_boxed_logger(Box::new(ConsoleLogger { progress, level }))?;
    log::set_max_level(level);
    Ok(())
}
