use thiserror::Error;

#[derive(Error, Debug)]
pub enum PregiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Computation invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PregiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        PregiError::Validation(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, PregiError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, PregiError>;
