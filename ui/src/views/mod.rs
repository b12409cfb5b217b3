mod dashboard;
mod guide;

pub use dashboard::{localized_chart_labels, Dashboard};
pub use guide::Guide;
