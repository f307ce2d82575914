mod clock;
mod config;
mod error;
mod format;
mod install;
mod level;

pub use clock::{LoggerTimeZone, init_local_offset};
pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;

/// Install the global tracing subscriber described by `cfg`.
///
/// Every `tracing` macro in the process (scheduler internals included) goes
/// through it afterwards. Fails with [`LoggerError::AlreadyInitialized`] on a second call.
///
/// With [`LoggerTimeZone::Local`], call [`init_local_offset`] in `main()` before the
/// Tokio runtime starts; offset detection is unreliable once threads exist.
///
/// # Examples
/// ```rust
/// use slotline_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("logger");
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => install::text(cfg),
        LoggerFormat::Json => install::json(cfg),
        LoggerFormat::Journald => install::journald(cfg),
    }
}
