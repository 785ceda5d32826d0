//! Error types for the ACH builder.
//!
//! Failures fall into three families: bad caller input
//! ([`ConfigValidationError`]), mutation after a scope was closed
//! ([`SequenceStateError`]) and broken internal invariants discovered while
//! rendering ([`AssemblyError`]). [`AchError`] wraps all of them plus the I/O
//! concerns of the binary.

use crate::builder::FileState;
use crate::field::FieldError;
use crate::record::RecordKind;
use thiserror::Error;

/// Result type alias for builder operations
pub type Result<T> = std::result::Result<T, AchError>;

/// Errors that can occur while building or rendering an ACH file.
#[derive(Error, Debug)]
pub enum AchError {
    /// A supplied value failed validation
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    /// A closed scope was mutated
    #[error(transparent)]
    SequenceState(#[from] SequenceStateError),

    /// Rendering hit an internal invariant violation
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Failed to open or read the input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: ach-builder [--json] <entries.csv>")]
    MissingArgument,

    /// A required environment variable is not set
    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),

    /// An environment variable holds a value that cannot be used
    #[error("Environment variable {var} has unusable value {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// A caller-supplied value is unusable. Raised when the record is built,
/// never at render time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{record} field `{field}` rejects value {value:?}: {reason}")]
    InvalidValue {
        record: RecordKind,
        field: &'static str,
        value: String,
        reason: FieldError,
    },

    #[error("{record} field `{field}` requires a value and has no default")]
    MissingField {
        record: RecordKind,
        field: &'static str,
    },

    #[error("{record} field `{field}` is computed during the build and cannot be supplied")]
    ComputedField { record: RecordKind, field: String },

    #[error("{record} has no field named `{field}`")]
    UnknownField { record: RecordKind, field: String },
}

/// A file, batch or record was mutated after it was closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceStateError {
    #[error("file is {state} and no longer accepts batches or entries")]
    FileClosed { state: FileState },

    #[error("batch {batch_number} was aggregated and no longer accepts entries")]
    BatchSealed { batch_number: u32 },

    #[error("batch {batch_number} was already aggregated")]
    AlreadyAggregated { batch_number: u32 },

    #[error("{record} field `{field}` was already computed")]
    AlreadyComputed {
        record: RecordKind,
        field: &'static str,
    },

    #[error("no batch exists for handle {index}")]
    UnknownBatch { index: usize },

    #[error("{counter} cannot exceed {limit}")]
    SequenceExhausted { counter: &'static str, limit: u64 },
}

/// Rendering found the file in a state that cannot produce a valid artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("{record} rendered to {actual} characters, expected {expected}")]
    RecordWidth {
        record: RecordKind,
        expected: usize,
        actual: usize,
    },

    #[error("{record} field `{field}` has not been computed")]
    PendingField {
        record: RecordKind,
        field: &'static str,
    },

    #[error("batch {batch_number} was never aggregated")]
    BatchNotAggregated { batch_number: u32 },

    #[error("file control record has not been computed")]
    FileNotSealed,
}
