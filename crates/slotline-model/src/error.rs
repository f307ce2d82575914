use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid interval: '{0}'")]
    InvalidDuration(String),

    #[error("'{0}' must be of number or string type")]
    TypeMismatch(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
