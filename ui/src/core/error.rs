//! Error taxonomy for a dashboard render pass.
//!
//! Every variant carries enough context (table, column, filter, row) for a user
//! to fix the offending upload. Errors are never recovered inside the pipeline:
//! they abort the pass and the shell renders them in place of the dashboard.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Result alias used throughout the data pipeline.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// The three input tables the dashboard knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Students,
    AgeUsers,
    MonthlyUsers,
    /// Synthetic two-row table behind the comparison chart.
    Comparison,
}

impl TableKind {
    /// File name users are expected to upload (and the bundled sample name).
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Students => "students.csv",
            Self::AgeUsers => "linkedin_age.csv",
            Self::MonthlyUsers => "linkedin_monthly.csv",
            Self::Comparison => "comparison",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl Serialize for TableKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.file_name())
    }
}

#[derive(Debug, Error)]
pub enum DashboardError {
    /// A designated date column holds text that is not a calendar date.
    #[error("{table}: row {row}, column '{column}': '{value}' is not a valid date")]
    DateParse {
        table: TableKind,
        column: String,
        /// 1-based data row (header excluded).
        row: usize,
        value: String,
    },

    /// A value does not fit the type its column requires.
    #[error("{table}: row {row} could not be read: {source}")]
    InvalidRow {
        table: TableKind,
        row: usize,
        #[source]
        source: csv::Error,
    },

    /// An expected column is absent from the table header.
    #[error("{table}: missing column '{column}' (found: {})", found.join(", "))]
    Schema {
        table: TableKind,
        column: String,
        found: Vec<String>,
    },

    /// A required selection matched zero or more than one row.
    #[error("{table}: filter {filter} matched {matched} row(s), expected {expected}")]
    Lookup {
        table: TableKind,
        filter: String,
        matched: usize,
        expected: &'static str,
    },

    /// An aggregate no longer fits its numeric type.
    #[error("{table}: sum of column '{column}' overflows")]
    Overflow { table: TableKind, column: String },

    /// A chart kind was asked to render without one of its required channels.
    #[error("{kind} chart needs the '{channel}' channel")]
    Encoding {
        kind: &'static str,
        channel: &'static str,
    },

    /// A chart channel points at a column whose values are not numeric.
    #[error("column '{column}' must be numeric to be plotted as {channel}")]
    ColumnType {
        column: String,
        channel: &'static str,
    },

    /// The bundled fallback for a table is not embedded in the binary.
    #[error("bundled sample '{path}' is not available")]
    MissingSample { path: String },

    /// Uploaded bytes could not be turned into text.
    #[error("{table}: upload '{name}' could not be read: {reason}")]
    Upload {
        table: TableKind,
        name: String,
        reason: String,
    },

    /// CSV failure that is not tied to a single data row (e.g. the header).
    #[error("{table}: {source}")]
    Csv {
        table: TableKind,
        #[source]
        source: csv::Error,
    },
}

impl DashboardError {
    /// Table the error refers to, when there is one.
    pub fn table(&self) -> Option<TableKind> {
        match self {
            Self::DateParse { table, .. }
            | Self::InvalidRow { table, .. }
            | Self::Schema { table, .. }
            | Self::Lookup { table, .. }
            | Self::Overflow { table, .. }
            | Self::Upload { table, .. }
            | Self::Csv { table, .. } => Some(*table),
            Self::Encoding { .. } | Self::ColumnType { .. } | Self::MissingSample { .. } => None,
        }
    }

    pub(crate) fn no_rows(table: TableKind, filter: impl Into<String>) -> Self {
        Self::Lookup {
            table,
            filter: filter.into(),
            matched: 0,
            expected: "at least one",
        }
    }
}
