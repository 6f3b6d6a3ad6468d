use std::env::args;
use std::ffi::OsStr;
use std::path::PathBuf;

use log::LevelFilter;

/// Diagnostics go to stderr, so that stdout stays reserved for
/// records, and optionally to syslog.
pub struct Logger {
    level: LevelFilter,
    stderr: simple_logger::SimpleLogger,
    syslog: Option<syslog::BasicLogger>,
}

fn syslog_backend() -> Option<syslog::BasicLogger> {
    let cmd: PathBuf = args()
        .next()
        .unwrap_or_else(|| "audit-fields".into())
        .into();
    syslog::unix(syslog::Formatter3164 {
        facility: syslog::Facility::LOG_DAEMON,
        hostname: None,
        process: cmd
            .file_name()
            .unwrap_or_else(|| OsStr::new("audit-fields"))
            .to_string_lossy()
            .into(),
        pid: std::process::id(),
    })
    .map(syslog::BasicLogger::new)
    .ok()
}

impl Logger {
    pub fn new(level: LevelFilter, use_syslog: bool) -> Self {
        Logger {
            level,
            stderr: simple_logger::SimpleLogger::new().with_level(level),
            syslog: if use_syslog { syslog_backend() } else { None },
        }
    }

    pub fn has_syslog(&self) -> bool {
        self.syslog.is_some()
    }

    /// Install as the global logger.
    pub fn install(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(LevelFilter::Info, true)
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }
    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.stderr.log(record);
        if let Some(l) = &self.syslog {
            l.log(record);
        }
    }
    fn flush(&self) {
        self.stderr.flush();
        if let Some(l) = &self.syslog {
            l.flush();
        }
    }
}
