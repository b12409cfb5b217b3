//! Dashboard configuration: where the bundled samples live and which labels the
//! aggregations filter on.

use serde::{Deserialize, Serialize};

use crate::data::samples;

/// Name of the optional bundled override (inside `ui/data/`).
const BUNDLED_CONFIG: &str = "dashboard.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub students_path: String,
    pub age_path: String,
    pub monthly_path: String,
    /// Columns of the monthly table converted to calendar dates on load.
    pub date_columns: Vec<String>,
    /// Region label of the national aggregate.
    pub national_region: String,
    /// Level label of the per-region total row.
    pub total_level: String,
    /// Age bracket compared against the student population.
    pub young_age_group: String,
    pub adult_age_group: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            students_path: "students.csv".into(),
            age_path: "linkedin_age.csv".into(),
            monthly_path: "linkedin_monthly.csv".into(),
            date_columns: vec!["date".into()],
            national_region: "Indonesia".into(),
            total_level: "Total".into(),
            young_age_group: "18-24".into(),
            adult_age_group: "25-34".into(),
        }
    }
}

impl DashboardConfig {
    /// Parse a JSON override. Missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Defaults merged with the bundled `dashboard.json`, if one is embedded.
    pub fn bundled() -> Self {
        let Some(raw) = samples::bundled_text(BUNDLED_CONFIG) else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring bundled {BUNDLED_CONFIG}: {err}");
                Self::default()
            }
        }
    }

    pub fn date_columns(&self) -> Vec<&str> {
        self.date_columns.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config = DashboardConfig::from_json(r#"{ "national_region": "Nasional" }"#).unwrap();
        assert_eq!(config.national_region, "Nasional");
        assert_eq!(config.total_level, "Total");
        assert_eq!(config.date_columns, vec!["date".to_string()]);
    }

    #[test]
    fn bundled_config_matches_sample_layout() {
        let config = DashboardConfig::bundled();
        assert_eq!(config.students_path, "students.csv");
        assert_eq!(config.young_age_group, "18-24");
    }
}
