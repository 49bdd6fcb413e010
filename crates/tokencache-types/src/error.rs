use thiserror::Error;

/// Failure raised while resolving filesystems or obtaining tokens.
///
/// Every variant is an I/O failure from the caller's point of view; the
/// split only exists to give the log line and the message some context.
#[derive(Error, Debug)]
pub enum TokenCacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("No filesystem for scheme: {0}")]
    UnsupportedScheme(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Format error: {0}")]
    Format(String),
}

impl TokenCacheError {
    /// Always true. Kept so callers can match on the failure kind without
    /// caring about the variant.
    pub fn is_io_failure(&self) -> bool {
        true
    }
}

pub type Result<T> = std::result::Result<T, TokenCacheError>;
