pub mod local_store;
pub mod measurement_backend;
pub mod measurement_store;
pub mod record;
pub mod repository;

pub use local_store::{LocalStore, RecordFeed};
pub use measurement_backend::{AverageField, BackendResult, MeasurementBackend};
pub use measurement_store::SqliteMeasurementStore;
pub use record::MeasurementRecord;
pub use repository::{EnviroRepository, MeasurementFeed};
