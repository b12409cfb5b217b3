//! Summary metrics derived from the three loaded tables.

use serde::Serialize;
use tracing::debug;

use crate::core::config::DashboardConfig;
use crate::core::error::{DashboardError, Result, TableKind};
use crate::data::query::{self, last_by_key};
use crate::data::{AgeUserRecord, ComparisonRow, Dataset};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    /// Students in the national `Total` row(s).
    pub total_students: u64,
    /// LinkedIn users aged 18–24, in millions.
    pub users_18_24: f64,
    /// LinkedIn users aged 25–34, in millions.
    pub users_25_34: f64,
    /// Users in the most recent month of the monthly series, in millions.
    pub total_linkedin_latest: f64,
    /// `users_18_24 * 1e6 / total_students`; `None` when there are no students.
    pub penetration_18_24: Option<f64>,
}

impl SummaryMetrics {
    pub fn compute(dataset: &Dataset, config: &DashboardConfig) -> Result<Self> {
        let total_students = total_students(dataset, config)?;
        let users_18_24 = users_in_age_group(&dataset.age, &config.young_age_group)?;
        let users_25_34 = users_in_age_group(&dataset.age, &config.adult_age_group)?;

        let latest = last_by_key(&dataset.monthly, |row| row.date).ok_or_else(|| {
            DashboardError::no_rows(TableKind::MonthlyUsers, "latest date (table is empty)")
        })?;

        let metrics = Self {
            total_students,
            users_18_24,
            users_25_34,
            total_linkedin_latest: latest.users_million,
            penetration_18_24: penetration(users_18_24, total_students),
        };
        debug!(?metrics, latest_date = %latest.date, "computed summary metrics");
        Ok(metrics)
    }

    /// Students (in millions) next to LinkedIn 18–24 users, for the comparison chart.
    pub fn comparison_rows(&self, students_label: &str, linkedin_label: &str) -> Vec<ComparisonRow> {
        vec![
            ComparisonRow {
                category: students_label.to_string(),
                amount: self.total_students as f64 / 1e6,
            },
            ComparisonRow {
                category: linkedin_label.to_string(),
                amount: self.users_18_24,
            },
        ]
    }
}

fn total_students(dataset: &Dataset, config: &DashboardConfig) -> Result<u64> {
    let national = query::select(&dataset.students, |row| {
        row.region == config.national_region && row.level == config.total_level
    });
    if national.is_empty() {
        return Err(DashboardError::no_rows(
            TableKind::Students,
            format!(
                "region == \"{}\" and level == \"{}\"",
                config.national_region, config.total_level
            ),
        ));
    }
    query::sum_by(TableKind::Students, "students", &national, |row| row.students)
}

fn users_in_age_group(rows: &[AgeUserRecord], age_group: &str) -> Result<f64> {
    let filter = format!("age_group == \"{age_group}\"");
    query::exactly_one(TableKind::AgeUsers, rows, &filter, |row| row.age_group == age_group)
        .map(|row| row.users_million)
}

/// Users (millions) per student. Undefined rather than zero or infinite when
/// there are no students.
pub fn penetration(users_million: f64, total_students: u64) -> Option<f64> {
    if total_students == 0 {
        None
    } else {
        Some(users_million * 1e6 / total_students as f64)
    }
}
