//! Column-addressable view of typed rows, the input of [`super::build_chart`].

use time::Date;

use crate::core::error::{DashboardError, Result, TableKind};
use crate::data::records::iso_date;
use crate::data::{AgeUserRecord, ComparisonRow, MonthlyUserRecord, StudentRecord, TableRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Number(f64),
    Date(Date),
}

impl Cell {
    /// Numeric value for value channels; `None` for text and dates.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Number(value) => Some(*value),
            Self::Text(_) | Self::Date(_) => None,
        }
    }

    /// Display text used for categories, names and bar labels.
    pub fn label(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Date(date) => iso_date::format(*date).unwrap_or_else(|_| date.to_string()),
        }
    }
}

/// A row type that can be handed to the chart builder.
pub trait ChartRow {
    const TABLE: TableKind;
    const COLUMNS: &'static [&'static str];
    /// One cell per entry of `COLUMNS`, same order.
    fn cells(&self) -> Vec<Cell>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartTable {
    table: TableKind,
    columns: &'static [&'static str],
    rows: Vec<Vec<Cell>>,
}

impl ChartTable {
    pub fn from_rows<'a, R: ChartRow + 'a>(rows: impl IntoIterator<Item = &'a R>) -> Self {
        Self {
            table: R::TABLE,
            columns: R::COLUMNS,
            rows: rows.into_iter().map(|row| row.cells()).collect(),
        }
    }

    pub fn table(&self) -> TableKind {
        self.table
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name`, or a schema error listing the available columns.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| *column == name)
            .ok_or_else(|| DashboardError::Schema {
                table: self.table,
                column: name.to_string(),
                found: self.columns.iter().map(|c| c.to_string()).collect(),
            })
    }
}

impl ChartRow for StudentRecord {
    const TABLE: TableKind = <Self as TableRecord>::TABLE;
    const COLUMNS: &'static [&'static str] = <Self as TableRecord>::COLUMNS;

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.region.clone()),
            Cell::Text(self.level.clone()),
            Cell::Integer(i64::from(self.year)),
            Cell::Integer(i64::try_from(self.students).unwrap_or(i64::MAX)),
        ]
    }
}

impl ChartRow for AgeUserRecord {
    const TABLE: TableKind = <Self as TableRecord>::TABLE;
    const COLUMNS: &'static [&'static str] = <Self as TableRecord>::COLUMNS;

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.age_group.clone()),
            Cell::Number(self.users_million),
            Cell::Text(self.period.clone()),
        ]
    }
}

impl ChartRow for MonthlyUserRecord {
    const TABLE: TableKind = <Self as TableRecord>::TABLE;
    const COLUMNS: &'static [&'static str] = <Self as TableRecord>::COLUMNS;

    fn cells(&self) -> Vec<Cell> {
        vec![Cell::Date(self.date), Cell::Number(self.users_million)]
    }
}

impl ChartRow for ComparisonRow {
    const TABLE: TableKind = TableKind::Comparison;
    const COLUMNS: &'static [&'static str] = &["category", "amount"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.category.clone()),
            Cell::Number(self.amount),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_column_lists_available_ones() {
        let rows = vec![ComparisonRow {
            category: "a".into(),
            amount: 1.0,
        }];
        let table = ChartTable::from_rows(&rows);
        assert_eq!(table.column_index("amount").unwrap(), 1);
        match table.column_index("Jumlah").unwrap_err() {
            DashboardError::Schema { found, .. } => assert_eq!(found, vec!["category", "amount"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn number_labels_are_shortest_form() {
        assert_eq!(Cell::Number(9.0).label(), "9");
        assert_eq!(Cell::Number(5.2).label(), "5.2");
        assert_eq!(Cell::Integer(42).as_f64(), Some(42.0));
        assert_eq!(Cell::Text("x".into()).as_f64(), None);
    }
}
