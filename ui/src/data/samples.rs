//! Sample tables bundled into the binary so the dashboard renders without uploads.

use rust_embed::Embed;

/// Everything under `ui/data/` (CSV samples plus the optional `dashboard.json`).
#[derive(Embed)]
#[folder = "data"]
struct BundledSamples;

/// Text of a bundled file, or `None` when nothing is embedded under `path`.
pub fn bundled_text(path: &str) -> Option<String> {
    BundledSamples::get(path).map(|file| String::from_utf8_lossy(&file.data).into_owned())
}

/// Paths of every embedded sample, sorted.
pub fn bundled_paths() -> Vec<String> {
    let mut paths = BundledSamples::iter()
        .map(|path| path.to_string())
        .collect::<Vec<_>>();
    paths.sort();
    paths
}
