use dioxus::prelude::*;

use crate::charts::{ChartLabels, PanelId};
use crate::core::config::DashboardConfig;
use crate::core::error::TableKind;
use crate::dashboard::{self, CardId, ChartPanel, DashboardView, SourceOrigin, TableSource};
use crate::data::{DashboardInputs, UploadedFile};
use crate::export::{ChartExportButton, SummaryExportPanel};
use crate::t;

const COLUMN_TEMPLATE: &str = "students.csv: region, level, year, students\n\
linkedin_age.csv: age_group, users_million, period\n\
linkedin_monthly.csv: date, users_million";

/// Axis titles in the active language.
pub fn localized_chart_labels() -> ChartLabels {
    ChartLabels {
        students_axis: t!("axis-students"),
        users_axis: t!("axis-users"),
        date_axis: t!("axis-date"),
        millions_axis: t!("axis-millions"),
        category_axis: t!("axis-category"),
        comparison_students: t!("comparison-students"),
        comparison_linkedin: t!("comparison-linkedin"),
    }
}

fn card_label(id: CardId) -> String {
    match id {
        CardId::TotalStudents => t!("card-students"),
        CardId::Users18To24 => t!("card-users-18-24"),
        CardId::Users25To34 => t!("card-users-25-34"),
        CardId::LinkedinLatest => t!("card-linkedin-total"),
    }
}

fn panel_title(id: PanelId) -> String {
    match id {
        PanelId::RegionBar => t!("panel-region"),
        PanelId::LevelTreemap => t!("panel-levels"),
        PanelId::AgeBar => t!("panel-age-bar"),
        PanelId::AgePie => t!("panel-age-pie"),
        PanelId::MonthlyTrend => t!("panel-trend"),
        PanelId::Comparison => t!("panel-comparison"),
    }
}

fn upload_label(table: TableKind) -> String {
    match table {
        TableKind::Students => t!("upload-students"),
        TableKind::AgeUsers => t!("upload-age"),
        TableKind::MonthlyUsers | TableKind::Comparison => t!("upload-monthly"),
    }
}

#[component]
pub fn Dashboard() -> Element {
    // Re-render when the navbar switches language.
    let _lang = try_use_context::<Signal<String>>().map(|code| code());
    let config = try_use_context::<DashboardConfig>().unwrap_or_else(DashboardConfig::bundled);
    let inputs = use_signal(DashboardInputs::default);
    let upload_error = use_signal(|| None::<String>);

    // Whole pipeline on every render; nothing is memoised.
    let outcome = dashboard::render(&inputs.read(), &config, &localized_chart_labels());
    let sources = outcome
        .as_ref()
        .map(|view| view.sources.clone())
        .unwrap_or_default();

    rsx! {
        div { class: "page dashboard",
            aside { class: "dashboard__sidebar",
                h2 { {t!("sidebar-title")} }
                p { {t!("sidebar-intro")} }
                for table in [TableKind::Students, TableKind::AgeUsers, TableKind::MonthlyUsers] {
                    UploadControl {
                        key: "{table}",
                        table,
                        inputs,
                        upload_error,
                        source: sources.iter().find(|source| source.table == table).cloned(),
                    }
                }
                if let Some(message) = upload_error() {
                    p { class: "dashboard__upload-error", "⚠️ {message}" }
                }
                hr {}
                strong { {t!("template-title")} }
                pre { class: "dashboard__template", code { "{COLUMN_TEMPLATE}" } }
            }

            main { class: "dashboard__main",
                header { class: "dashboard__header",
                    h1 { {t!("dashboard-title")} }
                    p { class: "dashboard__caption", {t!("dashboard-caption")} }
                }

                {match outcome {
                    Ok(view) => rsx! { DashboardBody { view } },
                    Err(err) => rsx! { ErrorCard { error: err.to_string(), table: err.table() } },
                }}

                hr {}
                p { class: "dashboard__note",
                    strong { {t!("note-label")} }
                    " "
                    {t!("dashboard-note")}
                }
            }
        }
    }
}

#[component]
fn DashboardBody(view: DashboardView) -> Element {
    let chart = |id: PanelId| view.panel(id).cloned();
    let penetration = view
        .penetration
        .clone()
        .unwrap_or_else(|| t!("penetration-undefined"));

    rsx! {
        div { class: "metric-grid",
            for card in view.cards.iter() {
                div { key: "{card.id:?}", class: "metric-card",
                    span { class: "metric-card__label", {card_label(card.id)} }
                    strong { class: "metric-card__value", "{card.value}" }
                }
            }
        }
        hr {}

        div { class: "chart-row chart-row--region",
            ChartSlot { panel: chart(PanelId::RegionBar) }
            ChartSlot { panel: chart(PanelId::LevelTreemap) }
        }
        div { class: "chart-row chart-row--age",
            ChartSlot { panel: chart(PanelId::AgeBar) }
            ChartSlot { panel: chart(PanelId::AgePie) }
        }
        div { class: "chart-row chart-row--full",
            ChartSlot { panel: chart(PanelId::MonthlyTrend) }
        }
        div { class: "chart-row chart-row--full",
            ChartSlot { panel: chart(PanelId::Comparison) }
        }
        p { class: "dashboard__caption dashboard__penetration",
            {t!("penetration-caption", rate = penetration)}
        }

        SummaryExportPanel {
            metrics: view.metrics.clone(),
            penetration: view.penetration.clone(),
            sources: view.sources.clone(),
        }
    }
}

#[component]
fn ChartSlot(panel: Option<ChartPanel>) -> Element {
    let Some(panel) = panel else {
        return rsx! {};
    };
    let title = panel_title(panel.id);
    let slug = panel.id.slug();
    let svg = panel.svg.clone();

    rsx! {
        section { class: "chart-card chart-card--{slug}",
            div { class: "chart-card__header",
                h3 { "{title}" }
                ChartExportButton { panel: panel.id, svg: svg.clone() }
            }
            div {
                class: "chart-card__figure",
                dangerous_inner_html: "{svg}",
            }
        }
    }
}

#[component]
fn UploadControl(
    table: TableKind,
    inputs: Signal<DashboardInputs>,
    upload_error: Signal<Option<String>>,
    source: Option<TableSource>,
) -> Element {
    let mut inputs = inputs;
    let mut upload_error = upload_error;
    let uploaded = inputs.read().slot(table).is_some();
    let input_id = format!("upload-{}", table.file_name().replace('.', "-"));

    let on_change = move |evt: FormEvent| async move {
        let Some(engine) = evt.files() else {
            return;
        };
        let Some(name) = engine.files().into_iter().next() else {
            return;
        };
        let Some(bytes) = engine.read_file(&name).await else {
            upload_error.set(Some(t!("upload-failed", name = name.clone())));
            return;
        };
        match UploadedFile::from_bytes(table, name, bytes) {
            Ok(file) => {
                tracing::info!(%table, name = %file.name, "upload selected");
                if let Some(slot) = inputs.write().slot_mut(table) {
                    *slot = Some(file);
                }
                upload_error.set(None);
            }
            Err(err) => upload_error.set(Some(err.to_string())),
        }
    };

    let on_reset = move |_| {
        if let Some(slot) = inputs.write().slot_mut(table) {
            *slot = None;
        }
        upload_error.set(None);
    };

    let badge = source.map(|source| match source.origin {
        SourceOrigin::Bundled { .. } => (
            "source-badge source-badge--bundled",
            t!("source-bundled", rows = source.rows),
        ),
        SourceOrigin::Uploaded { name } => (
            "source-badge source-badge--uploaded",
            t!("source-uploaded", name = name, rows = source.rows),
        ),
    });

    rsx! {
        div { class: "upload",
            label { class: "upload__label", r#for: "{input_id}", {upload_label(table)} }
            input {
                id: "{input_id}",
                class: "upload__input",
                r#type: "file",
                accept: ".csv",
                onchange: on_change,
            }
            div { class: "upload__footer",
                if let Some((class_name, text)) = badge {
                    span { class: "{class_name}", "{text}" }
                }
                if uploaded {
                    button {
                        r#type: "button",
                        class: "button button--ghost button--small",
                        onclick: on_reset,
                        {t!("upload-reset")}
                    }
                }
            }
        }
    }
}

#[component]
fn ErrorCard(error: String, table: Option<TableKind>) -> Element {
    rsx! {
        section { class: "error-card", role: "alert",
            h2 { class: "error-card__title", {t!("error-title")} }
            if let Some(table) = table {
                p { class: "error-card__table", {t!("error-table", table = table.to_string())} }
            }
            pre { class: "error-card__detail", "{error}" }
            p { class: "error-card__hint", {t!("error-hint")} }
        }
    }
}
