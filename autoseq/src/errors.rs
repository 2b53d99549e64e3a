use thiserror::Error;

/// Errors surfaced by the automation seam and the components built on it.
///
/// Components translate most of these into `bool`/`Option` results at their
/// own boundary; only session setup propagates them to the caller.
#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("platform error: {0}")]
    PlatformError(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
