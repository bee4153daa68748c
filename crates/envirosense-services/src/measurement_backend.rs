//! Storage backend trait for measurement records.
//!
//! Backends are synchronous; [`crate::LocalStore`] moves calls onto the
//! blocking pool and adds change notification on top.

use envirosense_core::DatabaseError;

use crate::record::MeasurementRecord;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, DatabaseError>;

/// Columns that support a rolling average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AverageField {
    Temperature,
    Aqi,
}

impl AverageField {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Aqi => "aqi",
        }
    }
}

/// Every listing is ordered newest first (timestamp descending).
pub trait MeasurementBackend: Send {
    /// Insert a record, replacing any row with the same id.
    ///
    /// A record with id 0 gets a fresh id. Returns the row id.
    fn insert_or_replace(&self, record: &MeasurementRecord) -> BackendResult<i64>;

    fn get(&self, id: i64) -> BackendResult<Option<MeasurementRecord>>;

    fn list_all(&self) -> BackendResult<Vec<MeasurementRecord>>;

    fn list_recent(&self, limit: usize) -> BackendResult<Vec<MeasurementRecord>>;

    /// Records with `start <= timestamp <= end`.
    fn list_between(&self, start: i64, end: i64) -> BackendResult<Vec<MeasurementRecord>>;

    /// Delete by id. Returns the number of rows removed (0 or 1).
    fn delete(&self, id: i64) -> BackendResult<usize>;

    fn delete_all(&self) -> BackendResult<usize>;

    fn count(&self) -> BackendResult<usize>;

    /// Mean of `field` over the `limit` most recent rows; `None` when empty.
    fn average(&self, field: AverageField, limit: usize) -> BackendResult<Option<f64>>;
}
