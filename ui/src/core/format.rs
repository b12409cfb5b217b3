//! Formatting helpers for presenting metrics.

/// Unit appended to every summary card ("Juta" = millions).
pub const MILLIONS_UNIT: &str = "Juta";

/// Value already expressed in millions, e.g. `5.2 Juta`.
pub fn format_millions(value: f64) -> String {
    format!("{value:.1} {MILLIONS_UNIT}")
}

/// Raw head count shown in millions, e.g. `9000000` → `9.0 Juta`.
pub fn format_count_millions(count: u64) -> String {
    format_millions(count as f64 / 1e6)
}

/// Ratio as a percentage with one decimal; `None` when the ratio is undefined.
pub fn format_percent(ratio: Option<f64>) -> Option<String> {
    ratio
        .filter(|value| value.is_finite())
        .map(|value| format!("{:.1}%", value * 100.0))
}

pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{value:.decimals$}")
    } else {
        "—".to_string()
    }
}

/// Compact axis tick label: `9000000` → `9M`, `2500` → `2.5k`, `21.5` → `21.5`.
pub fn format_tick(value: f64) -> String {
    let magnitude = value.abs();
    let (scaled, suffix) = if magnitude >= 1e9 {
        (value / 1e9, "B")
    } else if magnitude >= 1e6 {
        (value / 1e6, "M")
    } else if magnitude >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };
    format!("{}{suffix}", trim_decimal(scaled))
}

fn trim_decimal(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
