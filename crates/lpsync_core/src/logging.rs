//! Process-wide logging for layout passes.
//!
//! # Responsibility
//! - Start one `flexi_logger` backend per process, writing either to stderr
//!   or to size-rotated files under a log directory.
//! - Route panics through the log as single-line `event=panic` records.
//!
//! # Invariants
//! - A second init with the same level and target is a no-op.
//! - A second init with a different level or target is rejected.
//! - Initialization never panics.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, LogSpecBuilder, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "lpsync";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_CHARS: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

struct ActiveLogger {
    level: LevelFilter,
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Rolling `lpsync_*.log` files inside an absolute directory.
    Directory(PathBuf),
}

impl LogTarget {
    /// Maps an optional `--log-dir` value onto a target.
    pub fn from_dir(dir: Option<&str>) -> Result<Self, LoggingError> {
        let Some(dir) = dir else {
            return Ok(Self::Stderr);
        };
        let trimmed = dir.trim();
        if trimmed.is_empty() {
            return Err(LoggingError::EmptyDirectory);
        }
        let path = PathBuf::from(trimmed);
        if !path.is_absolute() {
            return Err(LoggingError::RelativeDirectory(path));
        }
        Ok(Self::Directory(path))
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => write!(f, "stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

#[derive(Debug)]
pub enum LoggingError {
    UnsupportedLevel(String),
    EmptyDirectory,
    RelativeDirectory(PathBuf),
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// Logging already runs with another level or target.
    Conflict {
        active: String,
        requested: String,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected off|error|warn|info|debug|trace"
            ),
            Self::EmptyDirectory => write!(f, "log directory cannot be empty"),
            Self::RelativeDirectory(path) => {
                write!(f, "log directory must be absolute, got `{}`", path.display())
            }
            Self::CreateDirectory { path, source } => {
                write!(f, "cannot create log directory `{}`: {source}", path.display())
            }
            Self::Backend(err) => write!(f, "cannot start logger: {err}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already runs as `{active}`; refusing to switch to `{requested}`"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDirectory { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FlexiLoggerError> for LoggingError {
    fn from(value: FlexiLoggerError) -> Self {
        Self::Backend(value)
    }
}

/// Starts logging at `level` (`info`, `DEBUG`, ...) towards `target`.
///
/// # Errors
/// Unknown level, unusable directory, backend failure, or an earlier init
/// with a different configuration.
pub fn init_logging(level: &str, target: LogTarget) -> Result<(), LoggingError> {
    let level = parse_level(level)?;

    if let Some(active) = ACTIVE.get() {
        return ensure_same(active, level, &target);
    }

    let active = ACTIVE.get_or_try_init(|| start_backend(level, target.clone()))?;
    ensure_same(active, level, &target)
}

/// Level used when neither flags nor environment pick one.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_backend(level: LevelFilter, target: LogTarget) -> Result<ActiveLogger, LoggingError> {
    let logger = Logger::with(LogSpecBuilder::new().default(level).build());
    let handle = match &target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::default_format)
            .start()?,
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDirectory {
                path: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()?
        }
    };

    install_panic_hook();
    info!(
        "event=logging_start module=logging status=ok level={} target={} os={} version={}",
        level,
        target,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        target,
        _handle: handle,
    })
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    let trimmed = level.trim();
    LevelFilter::from_str(trimmed).map_err(|_| LoggingError::UnsupportedLevel(trimmed.to_string()))
}

fn ensure_same(
    active: &ActiveLogger,
    level: LevelFilter,
    target: &LogTarget,
) -> Result<(), LoggingError> {
    if active.level == level && &active.target == target {
        return Ok(());
    }
    Err(LoggingError::Conflict {
        active: describe(active.level, &active.target),
        requested: describe(level, target),
    })
}

fn describe(level: LevelFilter, target: &LogTarget) -> String {
    format!("{}@{target}", level.as_str().to_ascii_lowercase())
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string payload".to_string());
        // Titles can end up in payloads.
        error!(
            "event=panic module=logging status=error location={} payload={}",
            location,
            one_line(&payload, MAX_PANIC_CHARS)
        );
        previous(info);
    }));
}

/// Flattens `value` onto one line and caps it at `max_chars` characters.
fn one_line(value: &str, max_chars: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::{init_logging, one_line, parse_level, LogTarget, LoggingError};
    use log::LevelFilter;
    use std::path::PathBuf;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level(" DEBUG ").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("warn").unwrap(), LevelFilter::Warn);
        assert!(matches!(
            parse_level("loud"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn missing_dir_means_stderr() {
        assert_eq!(LogTarget::from_dir(None).unwrap(), LogTarget::Stderr);
    }

    #[test]
    fn relative_or_blank_dir_is_rejected() {
        assert!(matches!(
            LogTarget::from_dir(Some("logs/dev")),
            Err(LoggingError::RelativeDirectory(path)) if path == PathBuf::from("logs/dev")
        ));
        assert!(matches!(
            LogTarget::from_dir(Some("  ")),
            Err(LoggingError::EmptyDirectory)
        ));
    }

    #[test]
    fn panic_payload_is_flattened_and_capped() {
        assert_eq!(one_line("Safari\nMail", 40), "Safari Mail");
        assert_eq!(one_line("Calculator", 4), "Calc...");
    }

    // The only test that starts the backend: the logger is process-wide.
    #[test]
    fn second_init_must_match_the_first() {
        let dir = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        let target = LogTarget::Directory(dir.path().to_path_buf());

        init_logging("info", target.clone()).unwrap();
        init_logging("INFO", target.clone()).unwrap();

        let level_change = init_logging("debug", target.clone()).unwrap_err();
        assert!(matches!(level_change, LoggingError::Conflict { .. }));

        let moved = init_logging("info", LogTarget::Directory(other.path().to_path_buf()))
            .unwrap_err();
        assert!(moved.to_string().contains("refusing to switch"));

        let to_stderr = init_logging("info", LogTarget::Stderr).unwrap_err();
        assert!(to_stderr.to_string().contains("info@stderr"));
    }
}
