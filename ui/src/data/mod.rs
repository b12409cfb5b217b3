//! Input tables: row types, loading (upload or bundled sample) and the typed
//! query helpers the aggregations are written with.

pub mod loader;
pub mod query;
pub mod records;
pub mod samples;

pub use loader::{load_table, Dataset, DashboardInputs, UploadedFile};
pub use records::{AgeUserRecord, ComparisonRow, MonthlyUserRecord, StudentRecord, TableRecord};
