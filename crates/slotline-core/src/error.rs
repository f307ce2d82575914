use thiserror::Error;

use slotline_model::{ModelError, SlotKey};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid refresh interval: {0}")]
    InvalidInterval(#[from] ModelError),

    #[error("no Tokio runtime to drive refresh timers")]
    NoRuntime,

    #[error("no interval for slot '{0}'")]
    NoInterval(SlotKey),

    #[error("scheduler dropped the request before dispatch")]
    Closed,
}
