//! Error types for archive-core

use thiserror::Error;

use crate::item::ItemId;

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Main error type for archive operations
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Required fields missing on create/update
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Operation targeted an id that is not in the collection
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// Top-level import payload was not an array of records
    #[error("Invalid import format: {0}")]
    ImportFormat(String),

    /// Underlying storage read/write failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Export selection matched no items
    #[error("No items selected for export")]
    EmptyExport,

    /// Export encoding failure
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Storage-level errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode '{key}': {message}")]
    Encode { key: String, message: String },

    #[error("Failed to decode '{key}': {message}")]
    Decode { key: String, message: String },
}

/// One or more required draft fields were blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<String>,
}

impl ValidationError {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Whether `field` is among the offending fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing required fields: {}", self.fields.join(", "))
    }
}

impl std::error::Error for ValidationError {}
