//! One complete render pass: load → aggregate → build charts → lay out.
//!
//! [`render`] holds no state. The shell calls it on every component render with
//! whatever uploads are currently selected.

use serde::Serialize;
use tracing::{debug, warn};

use crate::charts::layout::{layout, Figure};
use crate::charts::panels::{self, ChartLabels, PanelId};
use crate::charts::ChartSpec;
use crate::core::config::DashboardConfig;
use crate::core::error::{Result, TableKind};
use crate::core::format::{format_count_millions, format_millions, format_percent};
use crate::data::{DashboardInputs, Dataset};
use crate::metrics::SummaryMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardId {
    TotalStudents,
    Users18To24,
    Users25To34,
    LinkedinLatest,
}

/// A summary card value, already formatted (`9.0 Juta`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub id: CardId,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub id: PanelId,
    pub spec: ChartSpec,
    pub figure: Figure,
    pub svg: String,
}

/// Where a table's rows came from in this pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "origin", rename_all = "snake_case")]
pub enum SourceOrigin {
    Bundled { path: String },
    Uploaded { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSource {
    pub table: TableKind,
    #[serde(flatten)]
    pub origin: SourceOrigin,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub metrics: SummaryMetrics,
    pub cards: Vec<MetricCard>,
    pub panels: Vec<ChartPanel>,
    /// Penetration rate with one decimal (`57.8%`); `None` when undefined.
    pub penetration: Option<String>,
    pub sources: Vec<TableSource>,
}

impl DashboardView {
    pub fn panel(&self, id: PanelId) -> Option<&ChartPanel> {
        self.panels.iter().find(|panel| panel.id == id)
    }

    pub fn source(&self, table: TableKind) -> Option<&TableSource> {
        self.sources.iter().find(|source| source.table == table)
    }
}

pub fn render(
    inputs: &DashboardInputs,
    config: &DashboardConfig,
    labels: &ChartLabels,
) -> Result<DashboardView> {
    let outcome = render_pass(inputs, config, labels);
    if let Err(err) = &outcome {
        warn!(error = %err, table = ?err.table(), "dashboard render pass failed");
    }
    outcome
}

fn render_pass(
    inputs: &DashboardInputs,
    config: &DashboardConfig,
    labels: &ChartLabels,
) -> Result<DashboardView> {
    let dataset = Dataset::load(inputs, config)?;
    let metrics = SummaryMetrics::compute(&dataset, config)?;

    let cards = vec![
        MetricCard {
            id: CardId::TotalStudents,
            value: format_count_millions(metrics.total_students),
        },
        MetricCard {
            id: CardId::Users18To24,
            value: format_millions(metrics.users_18_24),
        },
        MetricCard {
            id: CardId::Users25To34,
            value: format_millions(metrics.users_25_34),
        },
        MetricCard {
            id: CardId::LinkedinLatest,
            value: format_millions(metrics.total_linkedin_latest),
        },
    ];

    let comparison =
        metrics.comparison_rows(&labels.comparison_students, &labels.comparison_linkedin);
    let specs = [
        (PanelId::RegionBar, panels::region_bar(&dataset.students, config, labels)?),
        (PanelId::LevelTreemap, panels::level_treemap(&dataset.students, config)?),
        (PanelId::AgeBar, panels::age_bar(&dataset.age, labels)?),
        (PanelId::AgePie, panels::age_pie(&dataset.age)?),
        (PanelId::MonthlyTrend, panels::monthly_trend(&dataset.monthly, labels)?),
        (PanelId::Comparison, panels::comparison_bar(&comparison, labels)?),
    ];
    let panels = specs
        .into_iter()
        .map(|(id, spec)| {
            let figure = layout(&spec);
            let svg = figure.to_svg();
            debug!(panel = id.slug(), kind = %spec.kind, points = spec.data.len(), "laid out chart");
            ChartPanel {
                id,
                spec,
                figure,
                svg,
            }
        })
        .collect();

    let sources = vec![
        source(inputs, TableKind::Students, &config.students_path, dataset.students.len()),
        source(inputs, TableKind::AgeUsers, &config.age_path, dataset.age.len()),
        source(inputs, TableKind::MonthlyUsers, &config.monthly_path, dataset.monthly.len()),
    ];

    Ok(DashboardView {
        penetration: format_percent(metrics.penetration_18_24),
        metrics,
        cards,
        panels,
        sources,
    })
}

fn source(inputs: &DashboardInputs, table: TableKind, default_path: &str, rows: usize) -> TableSource {
    let origin = match inputs.slot(table) {
        Some(file) => SourceOrigin::Uploaded {
            name: file.name.clone(),
        },
        None => SourceOrigin::Bundled {
            path: default_path.to_string(),
        },
    };
    TableSource { table, origin, rows }
}
