//! Renderer-independent chart specifications.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Treemap,
    Pie,
    Line,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Treemap => "treemap",
            Self::Pie => "pie",
            Self::Line => "line",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which columns feed which visual channel.
///
/// Bar and line charts read `x`/`y`, treemaps `path`/`values`, pies
/// `names`/`values`. `labels` overrides the axis title shown for a column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Encoding {
    pub x: Option<String>,
    pub y: Option<String>,
    pub path: Vec<String>,
    pub names: Option<String>,
    pub values: Option<String>,
    /// Column whose value is printed on each bar.
    pub text: Option<String>,
    pub markers: bool,
    /// Inner radius of a pie as a fraction of the outer radius (0 = full pie).
    pub hole: f64,
    pub labels: BTreeMap<String, String>,
}

impl Encoding {
    pub fn xy(x: &str, y: &str) -> Self {
        Self {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            ..Self::default()
        }
    }

    pub fn hierarchy(path: &[&str], values: &str) -> Self {
        Self {
            path: path.iter().map(|level| level.to_string()).collect(),
            values: Some(values.to_string()),
            ..Self::default()
        }
    }

    pub fn slices(names: &str, values: &str) -> Self {
        Self {
            names: Some(names.to_string()),
            values: Some(values.to_string()),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, column: &str, label: impl Into<String>) -> Self {
        self.labels.insert(column.to_string(), label.into());
        self
    }

    pub fn with_text(mut self, column: &str) -> Self {
        self.text = Some(column.to_string());
        self
    }

    pub fn with_markers(mut self) -> Self {
        self.markers = true;
        self
    }

    pub fn with_hole(mut self, hole: f64) -> Self {
        self.hole = hole.clamp(0.0, 0.95);
        self
    }

    /// Axis title for `column`: the override if one is set, else the column name.
    pub fn label_for(&self, column: &str) -> String {
        self.labels
            .get(column)
            .cloned()
            .unwrap_or_else(|| column.to_string())
    }
}

/// A labelled value: one bar, treemap leaf or pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datum {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// One point of a line chart. `position` is numeric (dates use the Julian day).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub position: f64,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "points", rename_all = "snake_case")]
pub enum ChartData {
    Categories(Vec<Datum>),
    Leaves(Vec<Datum>),
    Slices(Vec<Datum>),
    Series(Vec<SeriesPoint>),
}

impl ChartData {
    pub fn len(&self) -> usize {
        match self {
            Self::Categories(points) | Self::Leaves(points) | Self::Slices(points) => points.len(),
            Self::Series(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    pub data: ChartData,
    pub show_text: bool,
    pub markers: bool,
    pub hole: f64,
}

impl ChartSpec {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
