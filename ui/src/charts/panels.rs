//! The six chart panels of the dashboard, each built from its slice of the data.

use serde::Serialize;

use crate::core::config::DashboardConfig;
use crate::core::error::Result;
use crate::data::query::{self, SortOrder};
use crate::data::{AgeUserRecord, ComparisonRow, MonthlyUserRecord, StudentRecord};

use super::builder::build_chart;
use super::spec::{ChartKind, ChartSpec, Encoding};
use super::table::ChartTable;

/// Axis titles and synthetic category names. Supplied by the shell so they can
/// follow the active locale; the defaults are the Indonesian originals.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartLabels {
    pub students_axis: String,
    pub users_axis: String,
    pub date_axis: String,
    pub millions_axis: String,
    pub category_axis: String,
    pub comparison_students: String,
    pub comparison_linkedin: String,
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self {
            students_axis: "Mahasiswa".into(),
            users_axis: "Juta Pengguna".into(),
            date_axis: "Tanggal".into(),
            millions_axis: "Juta".into(),
            category_axis: "Kategori".into(),
            comparison_students: "Mahasiswa (18–24, perkiraan total)".into(),
            comparison_linkedin: "LinkedIn 18–24".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelId {
    RegionBar,
    LevelTreemap,
    AgeBar,
    AgePie,
    MonthlyTrend,
    Comparison,
}

impl PanelId {
    pub const ALL: [PanelId; 6] = [
        PanelId::RegionBar,
        PanelId::LevelTreemap,
        PanelId::AgeBar,
        PanelId::AgePie,
        PanelId::MonthlyTrend,
        PanelId::Comparison,
    ];

    /// Stable slug used for CSS hooks and export file names.
    pub fn slug(self) -> &'static str {
        match self {
            Self::RegionBar => "students-by-region",
            Self::LevelTreemap => "education-levels",
            Self::AgeBar => "linkedin-age-bar",
            Self::AgePie => "linkedin-age-pie",
            Self::MonthlyTrend => "linkedin-monthly-trend",
            Self::Comparison => "students-vs-linkedin",
        }
    }
}

/// Per-region totals, largest first (ties keep file order).
pub fn region_rows<'a>(
    students: &'a [StudentRecord],
    config: &DashboardConfig,
) -> Vec<&'a StudentRecord> {
    let totals = query::select(students, |row| row.level == config.total_level);
    query::sorted_by_key(totals, |row| row.students, SortOrder::Descending)
}

/// National rows broken down by tier (the `Total` row excluded).
pub fn level_rows<'a>(
    students: &'a [StudentRecord],
    config: &DashboardConfig,
) -> Vec<&'a StudentRecord> {
    query::select(students, |row| {
        row.region == config.national_region && row.level != config.total_level
    })
}

/// Monthly rows in ascending date order.
pub fn trend_rows(monthly: &[MonthlyUserRecord]) -> Vec<&MonthlyUserRecord> {
    query::sorted_by_key(monthly.iter().collect(), |row| row.date, SortOrder::Ascending)
}

pub fn region_bar(
    students: &[StudentRecord],
    config: &DashboardConfig,
    labels: &ChartLabels,
) -> Result<ChartSpec> {
    let table = ChartTable::from_rows(region_rows(students, config));
    let encoding = Encoding::xy("region", "students").with_label("students", &labels.students_axis);
    build_chart(ChartKind::Bar, &table, &encoding)
}

pub fn level_treemap(students: &[StudentRecord], config: &DashboardConfig) -> Result<ChartSpec> {
    let table = ChartTable::from_rows(level_rows(students, config));
    build_chart(
        ChartKind::Treemap,
        &table,
        &Encoding::hierarchy(&["level"], "students"),
    )
}

pub fn age_bar(age: &[AgeUserRecord], labels: &ChartLabels) -> Result<ChartSpec> {
    let table = ChartTable::from_rows(age);
    let encoding =
        Encoding::xy("age_group", "users_million").with_label("users_million", &labels.users_axis);
    build_chart(ChartKind::Bar, &table, &encoding)
}

pub fn age_pie(age: &[AgeUserRecord]) -> Result<ChartSpec> {
    let table = ChartTable::from_rows(age);
    let encoding = Encoding::slices("age_group", "users_million").with_hole(0.35);
    build_chart(ChartKind::Pie, &table, &encoding)
}

pub fn monthly_trend(monthly: &[MonthlyUserRecord], labels: &ChartLabels) -> Result<ChartSpec> {
    let table = ChartTable::from_rows(trend_rows(monthly));
    let encoding = Encoding::xy("date", "users_million")
        .with_markers()
        .with_label("users_million", &labels.users_axis)
        .with_label("date", &labels.date_axis);
    build_chart(ChartKind::Line, &table, &encoding)
}

pub fn comparison_bar(rows: &[ComparisonRow], labels: &ChartLabels) -> Result<ChartSpec> {
    let table = ChartTable::from_rows(rows);
    let encoding = Encoding::xy("category", "amount")
        .with_text("amount")
        .with_label("amount", &labels.millions_axis)
        .with_label("category", &labels.category_axis);
    build_chart(ChartKind::Bar, &table, &encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::spec::ChartData;

    fn student(region: &str, level: &str, students: u64) -> StudentRecord {
        StudentRecord {
            region: region.into(),
            level: level.into(),
            year: 2024,
            students,
        }
    }

    fn students() -> Vec<StudentRecord> {
        vec![
            student("Indonesia", "Total", 9_000_000),
            student("Indonesia", "S1", 7_000_000),
            student("Jawa", "Total", 4_000_000),
            student("Sumatera", "Total", 2_000_000),
            student("Bali", "Total", 2_000_000),
            student("Indonesia", "S2", 2_000_000),
            student("Jawa", "S1", 3_000_000),
        ]
    }

    #[test]
    fn region_rows_are_descending_and_stable() {
        let data = students();
        let rows = region_rows(&data, &DashboardConfig::default());
        let regions: Vec<&str> = rows.iter().map(|row| row.region.as_str()).collect();
        assert_eq!(regions, vec!["Indonesia", "Jawa", "Sumatera", "Bali"]);
        assert!(rows.iter().all(|row| row.level == "Total"));
    }

    #[test]
    fn level_rows_exclude_total_and_other_regions() {
        let data = students();
        let rows = level_rows(&data, &DashboardConfig::default());
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.region == "Indonesia" && row.level != "Total"));
    }

    #[test]
    fn treemap_leaves_are_levels() {
        let data = students();
        let spec = level_treemap(&data, &DashboardConfig::default()).unwrap();
        let ChartData::Leaves(leaves) = spec.data else {
            panic!("treemap must carry leaves");
        };
        let labels: Vec<&str> = leaves.iter().map(|leaf| leaf.label.as_str()).collect();
        assert_eq!(labels, vec!["S1", "S2"]);
    }

    #[test]
    fn trend_is_sorted_by_date() {
        use time::macros::date;
        let monthly = vec![
            MonthlyUserRecord {
                date: date!(2024 - 03 - 01),
                users_million: 21.5,
            },
            MonthlyUserRecord {
                date: date!(2024 - 01 - 01),
                users_million: 20.0,
            },
        ];
        let spec = monthly_trend(&monthly, &ChartLabels::default()).unwrap();
        assert_eq!(spec.x_label.as_deref(), Some("Tanggal"));
        let ChartData::Series(points) = spec.data else {
            panic!("trend must carry a series");
        };
        assert_eq!(points[0].value, 20.0);
        assert_eq!(points[1].value, 21.5);
    }
}
