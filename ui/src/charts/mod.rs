//! Chart building: typed rows → [`ChartSpec`] → laid-out [`Figure`] → SVG.

pub mod builder;
pub mod layout;
pub mod panels;
pub mod spec;
pub mod svg;
pub mod table;

pub use builder::build_chart;
pub use layout::{layout, Figure, Shape};
pub use panels::{ChartLabels, PanelId};
pub use spec::{ChartData, ChartKind, ChartSpec, Datum, Encoding, SeriesPoint};
pub use table::{Cell, ChartRow, ChartTable};
