//! Error types for archive-session

use archive_core::{ConfigError, PersistenceError};
use thiserror::Error;

/// Failures opening a session. Operations on an open session return
/// [`archive_core::Result`].
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
