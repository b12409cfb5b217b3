//! Chart and summary exports.
//!
//! Web: charts download as SVG, the summary is copied via a hidden textarea and
//! downloaded as JSON. Desktop: charts are rasterised to PNG with `resvg`, the
//! summary goes to the system clipboard, and both are written to the app's
//! data directory.

use dioxus::prelude::*;
use serde::Serialize;
use time::{format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime};
use tracing::info;

use crate::charts::PanelId;
use crate::dashboard::TableSource;
use crate::metrics::SummaryMetrics;
use crate::t;

/// Where an export ended up.
#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    /// Written to disk at this path (desktop).
    Saved(String),
    /// Handed to the browser as a download (web).
    Downloaded,
}

#[derive(Clone, Debug, PartialEq)]
enum ExportStatus {
    Idle,
    Working,
    Done(Delivery),
    Error(String),
}

/// Payload of the summary export.
#[derive(Debug, Serialize)]
pub struct SummaryExport<'a> {
    pub generated_at: String,
    pub metrics: &'a SummaryMetrics,
    /// Penetration rate as displayed (`57.8%`); absent when undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penetration: Option<&'a str>,
    pub sources: &'a [TableSource],
}

pub fn summary_json(
    metrics: &SummaryMetrics,
    penetration: Option<&str>,
    sources: &[TableSource],
    generated_at: OffsetDateTime,
) -> Result<String, serde_json::Error> {
    let export = SummaryExport {
        generated_at: generated_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| generated_at.unix_timestamp().to_string()),
        metrics,
        penetration,
        sources,
    };
    serde_json::to_string_pretty(&export)
}

/// Runs an export future to completion and records the outcome in `status`.
fn run_export<F>(task: F, mut status: Signal<ExportStatus>, mut busy: Signal<bool>)
where
    F: std::future::Future<Output = Result<Delivery, String>> + 'static,
{
    busy.set(true);
    status.set(ExportStatus::Working);

    #[cfg(target_arch = "wasm32")]
    {
        spawn(async move {
            let outcome = task.await;
            status.set(match outcome {
                Ok(delivery) => ExportStatus::Done(delivery),
                Err(err) => ExportStatus::Error(err),
            });
            busy.set(false);
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let outcome = futures::executor::block_on(task);
        status.set(match outcome {
            Ok(delivery) => ExportStatus::Done(delivery),
            Err(err) => ExportStatus::Error(err),
        });
        busy.set(false);
    }
}

fn status_line(
    status: &ExportStatus,
    saved: impl Fn(&str) -> String,
    downloaded: String,
) -> Option<(&'static str, String)> {
    match status {
        ExportStatus::Idle => None,
        ExportStatus::Working => Some(("export-status", t!("export-working"))),
        ExportStatus::Done(Delivery::Saved(path)) => {
            Some(("export-status export-status--success", format!("✅ {}", saved(path))))
        }
        ExportStatus::Done(Delivery::Downloaded) => {
            Some(("export-status export-status--success", format!("✅ {downloaded}")))
        }
        ExportStatus::Error(err) => Some(("export-status export-status--error", format!("⚠️ {err}"))),
    }
}

/// Download button shown in the header of every chart card.
#[component]
pub fn ChartExportButton(panel: PanelId, svg: String) -> Element {
    let status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);

    let on_export = move |_| {
        if busy() {
            return;
        }
        run_export(perform_chart_export(panel, svg.clone()), status, busy);
    };

    let feedback = status_line(
        &status(),
        |path| t!("export-chart-saved", path = path.to_string()),
        t!("export-chart-downloaded"),
    );

    rsx! {
        div { class: "chart-card__export",
            button {
                r#type: "button",
                class: "button button--ghost button--small",
                disabled: busy(),
                onclick: on_export,
                {t!("export-chart")}
            }
            if let Some((class_name, message)) = feedback {
                span { class: "{class_name}", "{message}" }
            }
        }
    }
}

/// Summary export panel (JSON to clipboard plus file).
#[component]
pub fn SummaryExportPanel(
    metrics: SummaryMetrics,
    penetration: Option<String>,
    sources: Vec<TableSource>,
) -> Element {
    let status = use_signal(|| ExportStatus::Idle);
    let busy = use_signal(|| false);

    let on_export = move |_| {
        if busy() {
            return;
        }
        let payload = summary_json(
            &metrics,
            penetration.as_deref(),
            &sources,
            OffsetDateTime::now_utc(),
        )
        .map_err(|err| err.to_string());
        run_export(perform_summary_export(payload), status, busy);
    };

    let feedback = status_line(
        &status(),
        |path| t!("export-summary-saved", path = path.to_string()),
        t!("export-summary-downloaded"),
    );

    rsx! {
        section { class: "export-panel",
            h3 { {t!("export-title")} }
            div { class: "export-panel__actions",
                button {
                    r#type: "button",
                    class: "button button--primary",
                    disabled: busy(),
                    onclick: on_export,
                    {t!("export-summary")}
                }
            }
            if let Some((class_name, message)) = feedback {
                p { class: "{class_name}", "{message}" }
            }
        }
    }
}

/// A finished export: file name, MIME type and contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Chart image named after its panel: SVG markup on web, a PNG on desktop.
    pub fn chart(panel: PanelId, svg: String, stamp: &str) -> Result<Self, String> {
        #[cfg(target_arch = "wasm32")]
        let (extension, mime, bytes) = ("svg", "image/svg+xml", svg.into_bytes());
        #[cfg(not(target_arch = "wasm32"))]
        let (extension, mime, bytes) = ("png", "image/png", render_png(&svg)?);

        Ok(Self {
            name: format!("kampuslink-{}-{stamp}.{extension}", panel.slug()),
            mime,
            bytes,
        })
    }

    pub fn summary(json: String, stamp: &str) -> Self {
        Self {
            name: format!("kampuslink-summary-{stamp}.json"),
            mime: "application/json",
            bytes: json.into_bytes(),
        }
    }
}

async fn perform_chart_export(panel: PanelId, svg: String) -> Result<Delivery, String> {
    let file = ExportFile::chart(panel, svg, &timestamp_slug())?;
    let delivery = sink::deliver(&file)?;
    info!(panel = panel.slug(), filename = %file.name, bytes = file.bytes.len(), "exported chart");
    Ok(delivery)
}

async fn perform_summary_export(payload: Result<String, String>) -> Result<Delivery, String> {
    let json = payload?;
    sink::copy_text(&json)?;
    let file = ExportFile::summary(json, &timestamp_slug());
    let delivery = sink::deliver(&file)?;
    info!(filename = %file.name, "exported summary");
    Ok(delivery)
}

fn timestamp_slug() -> String {
    OffsetDateTime::now_utc()
        .format(&format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .unwrap_or_else(|_| "export".into())
}

/// Rasterise an SVG document to PNG at twice its nominal size.
#[cfg(not(target_arch = "wasm32"))]
pub fn render_png(svg: &str) -> Result<Vec<u8>, String> {
    const SCALE: f32 = 2.0;

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options).map_err(|err| err.to_string())?;

    let size = tree.size();
    let width = (size.width() * SCALE).ceil() as u32;
    let height = (size.height() * SCALE).ceil() as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or("Chart has an empty canvas")?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(SCALE, SCALE),
        &mut pixmap.as_mut(),
    );
    pixmap.encode_png().map_err(|err| err.to_string())
}

/// Browser side: object-URL downloads and a hidden textarea for the clipboard.
#[cfg(target_arch = "wasm32")]
mod sink {
    use wasm_bindgen::JsCast;
    use web_sys::{Blob, BlobPropertyBag, Document, HtmlAnchorElement, HtmlElement, Url};

    use super::{Delivery, ExportFile};

    fn document() -> Result<Document, String> {
        web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| "Document unavailable".to_string())
    }

    /// Create `tag`, hide it off-screen and attach it to `<body>`.
    fn attach_hidden<T: JsCast>(document: &Document, tag: &str) -> Result<T, String> {
        let node = document
            .create_element(tag)
            .map_err(|_| format!("Unable to create <{tag}>"))?;
        let element: HtmlElement = node.dyn_into().map_err(|_| format!("<{tag}> is not HTML"))?;
        let style = element.style();
        for (property, value) in [("position", "fixed"), ("top", "0"), ("opacity", "0")] {
            style.set_property(property, value).ok();
        }
        document
            .body()
            .ok_or("Missing body")?
            .append_child(&element)
            .map_err(|_| format!("Unable to attach <{tag}>"))?;
        element.dyn_into().map_err(|_| format!("<{tag}> cast failed"))
    }

    pub fn copy_text(text: &str) -> Result<(), String> {
        let document = document()?;
        let textarea: web_sys::HtmlTextAreaElement = attach_hidden(&document, "textarea")?;
        textarea.set_value(text);
        textarea.select();
        let copied = document
            .dyn_ref::<web_sys::HtmlDocument>()
            .and_then(|html| html.exec_command("copy").ok())
            .unwrap_or(false);
        textarea.remove();
        copied.then_some(()).ok_or_else(|| "Clipboard copy blocked".to_string())
    }

    pub fn deliver(file: &ExportFile) -> Result<Delivery, String> {
        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(file.bytes.as_slice()));
        let options = BlobPropertyBag::new();
        options.set_type(file.mime);
        let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(|_| "Failed to create blob".to_string())?;
        let url = Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Unable to create download".to_string())?;

        let anchor: HtmlAnchorElement = attach_hidden(&document()?, "a")?;
        anchor.set_href(&url);
        anchor.set_download(&file.name);
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url).ok();
        Ok(Delivery::Downloaded)
    }
}

/// Desktop side: system clipboard and the per-user export directory.
#[cfg(not(target_arch = "wasm32"))]
mod sink {
    use std::fs;
    use std::path::{Path, PathBuf};

    use super::{Delivery, ExportFile};

    pub fn copy_text(text: &str) -> Result<(), String> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text))
            .map_err(|err| format!("Clipboard unavailable: {err}"))
    }

    pub fn deliver(file: &ExportFile) -> Result<Delivery, String> {
        save_into(&export_dir()?, file)
    }

    /// Write `file` under `dir`, creating the directory on first use.
    pub(super) fn save_into(dir: &Path, file: &ExportFile) -> Result<Delivery, String> {
        fs::create_dir_all(dir).map_err(|err| format!("{}: {err}", dir.display()))?;
        let path = dir.join(&file.name);
        fs::write(&path, &file.bytes).map_err(|err| format!("{}: {err}", path.display()))?;
        Ok(Delivery::Saved(path.display().to_string()))
    }

    /// `<data dir>/KampusLink/exports` per the platform's conventions.
    fn export_dir() -> Result<PathBuf, String> {
        directories::ProjectDirs::from("id", "KampusLink", "KampusLink")
            .map(|dirs| dirs.data_dir().join("exports"))
            .ok_or_else(|| "Unable to determine export directory".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TableKind;
    use crate::dashboard::SourceOrigin;
    use time::macros::datetime;

    fn metrics() -> SummaryMetrics {
        SummaryMetrics {
            total_students: 9_000_000,
            users_18_24: 5.2,
            users_25_34: 3.1,
            total_linkedin_latest: 21.5,
            penetration_18_24: Some(5.2e6 / 9e6),
        }
    }

    #[test]
    fn summary_json_carries_metrics_and_sources() {
        let sources = vec![TableSource {
            table: TableKind::AgeUsers,
            origin: SourceOrigin::Uploaded {
                name: "usia.csv".into(),
            },
            rows: 2,
        }];
        let json = summary_json(
            &metrics(),
            Some("57.8%"),
            &sources,
            datetime!(2024-12-01 08:00 UTC),
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["generated_at"], "2024-12-01T08:00:00Z");
        assert_eq!(value["metrics"]["total_students"], 9_000_000);
        assert_eq!(value["penetration"], "57.8%");
        assert_eq!(value["sources"][0]["table"], "linkedin_age.csv");
        assert_eq!(value["sources"][0]["origin"], "uploaded");
        assert_eq!(value["sources"][0]["name"], "usia.csv");
    }

    #[test]
    fn undefined_penetration_is_omitted() {
        let mut undefined = metrics();
        undefined.penetration_18_24 = None;
        let json = summary_json(&undefined, None, &[], datetime!(2024-12-01 08:00 UTC)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("penetration").is_none());
        assert!(value["metrics"]["penetration_18_24"].is_null());
    }

    #[test]
    fn summary_file_is_named_and_typed() {
        let file = ExportFile::summary("{}".into(), "20241201_080000");
        assert_eq!(file.name, "kampuslink-summary-20241201_080000.json");
        assert_eq!(file.mime, "application/json");
        assert_eq!(file.bytes, b"{}");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn saved_exports_land_in_the_given_directory() {
        let dir = std::env::temp_dir().join(format!("kampuslink-export-{}", std::process::id()));
        let file = ExportFile::summary("{\"ok\":true}".into(), "test");
        let delivery = sink::save_into(&dir, &file).unwrap();

        let path = dir.join("kampuslink-summary-test.json");
        assert_eq!(delivery, Delivery::Saved(path.display().to_string()));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"ok\":true}");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn chart_svg_rasterises_to_png() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"40\" height=\"20\" \
                   viewBox=\"0 0 40 20\"><rect width=\"40\" height=\"20\" fill=\"#636efa\"/></svg>";
        let png = render_png(svg).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
