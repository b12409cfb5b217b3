//! Cross-cutting pieces shared by the pipeline and the views.

pub mod config;
pub mod error;
pub mod format;

pub use config::DashboardConfig;
pub use error::{DashboardError, Result, TableKind};
