use life_engine::GridError;
use thiserror::Error;

/// Failures surfaced to callers of the session API.
///
/// Every rejected request maps to one of these two kinds; the transport layer
/// turns them into status codes without looking any deeper.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("session {0} not found")]
    NotFound(String),
}

impl SessionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
        }
    }
}

impl From<GridError> for SessionError {
    fn from(err: GridError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
