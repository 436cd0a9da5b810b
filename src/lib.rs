//! AttendEase Store is the record store behind the AttendEase classroom console.
//!
//! It keeps four collections (departments, subjects, students and teachers) in
//! memory and writes the complete data set to a single key-value slot after
//! every mutation.
//!
//! ## Core Components
//! - [`engine`]: The record store, its persistence slot and the seed data set.
//! - [`model`]: Typed records, one struct per entity.
//! - [`codes`]: Department code generation and code normalization.
//! - [`import`]: Bulk student import from CSV text.
//! - [`stats`]: Per-collection counts for the dashboard.
//! - [`sdk`]: Convenience constructor for a persisted store.

pub mod codes;
pub mod engine;
pub mod import;
pub mod model;
pub mod sdk;
pub mod stats;

use thiserror::Error;

pub use model::{Collection, Dataset, Fields, Record};

/// Errors returned by the AttendEase Store.
#[derive(Error, Debug)]
pub enum Error {
    /// The collection name is not one of the four fixed collections.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),
    /// The CSV text has no header line or no data lines.
    #[error("CSV file is empty or invalid")]
    EmptyOrInvalid,
    /// The CSV header is missing required columns.
    #[error(
        "CSV must have headers: name, email, department, rollNumber (missing: {})",
        .0.join(", ")
    )]
    MissingHeaders(Vec<String>),
    /// An import stopped early. The rows counted in `imported_count` were kept.
    #[error("import stopped after {imported_count} students: {source}")]
    PartialImport {
        imported_count: usize,
        #[source]
        source: Box<Error>,
    },
    /// The supplied fields do not form a valid record of the target collection.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// The collection already holds the largest representable id.
    #[error("no id left in collection {0}")]
    IdOverflow(Collection),
    /// Credits text that is neither blank nor a non-negative integer.
    #[error("invalid credits: {0:?}")]
    InvalidCredits(String),
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred while reading or writing the slot.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Error while reading CSV text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A specialized Result type for AttendEase Store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Key of the slot holding the persisted data set.
pub const STORAGE_KEY: &str = "attendease_data";

/// Read operations over the four collections.
pub trait RecordReader: Send + Sync {
    /// Returns the record with `id`, or `None` when no record matches.
    fn get(&self, collection: Collection, id: u64) -> Option<Record>;
    /// Returns every record of a collection in insertion order.
    fn list(&self, collection: Collection) -> Vec<Record>;
}

/// Mutating operations over the four collections.
///
/// Every successful call persists the full data set before returning.
pub trait RecordWriter: Send + Sync {
    /// Creates a record from `fields` and returns its newly allocated id.
    fn create(&self, collection: Collection, fields: Fields) -> Result<u64>;
    /// Shallow-merges `patch` into the record with `id`. Absent ids are a no-op.
    fn update(&self, collection: Collection, id: u64, patch: Fields) -> Result<()>;
    /// Removes the record with `id`. Absent ids are a no-op.
    fn delete(&self, collection: Collection, id: u64) -> Result<()>;
}
