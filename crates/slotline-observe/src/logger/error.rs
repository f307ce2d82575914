use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format '{0}' (expected text|json|journald)")]
    InvalidFormat(String),

    #[error("journald output is only available on Linux")]
    JournaldNotSupported,

    #[error("journald connection failed: {0}")]
    JournaldInitFailed(String),

    #[error("a global logger is already installed")]
    AlreadyInitialized,

    #[error("unknown time zone '{0}' (expected utc|local)")]
    InvalidTimeZone(String),

    #[error("invalid log filter: {0}")]
    InvalidLevel(String),
}

pub type LoggerResult<T> = Result<T, LoggerError>;
