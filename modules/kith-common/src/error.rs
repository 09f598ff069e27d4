use thiserror::Error;

#[derive(Error, Debug)]
pub enum KithError {
    // User-facing messages carry the payload verbatim so the HTTP layer can
    // surface a specific message ("person not found") rather than a generic
    // failure.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl KithError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        KithError::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        KithError::NotFound(msg.into())
    }
}
