//! Row types of the three input tables.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::core::error::TableKind;

/// A row type that can be read from one of the dashboard's CSV tables.
pub trait TableRecord: DeserializeOwned {
    const TABLE: TableKind;
    /// Header names the loader insists on before reading any row.
    const COLUMNS: &'static [&'static str];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub region: String,
    /// Education tier, or `"Total"` for the per-region aggregate.
    pub level: String,
    pub year: i32,
    pub students: u64,
}

impl TableRecord for StudentRecord {
    const TABLE: TableKind = TableKind::Students;
    const COLUMNS: &'static [&'static str] = &["region", "level", "year", "students"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeUserRecord {
    pub age_group: String,
    #[serde(deserialize_with = "finite")]
    pub users_million: f64,
    pub period: String,
}

impl TableRecord for AgeUserRecord {
    const TABLE: TableKind = TableKind::AgeUsers;
    const COLUMNS: &'static [&'static str] = &["age_group", "users_million", "period"];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyUserRecord {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(deserialize_with = "finite")]
    pub users_million: f64,
}

impl TableRecord for MonthlyUserRecord {
    const TABLE: TableKind = TableKind::MonthlyUsers;
    const COLUMNS: &'static [&'static str] = &["date", "users_million"];
}

/// One bar of the students-vs-LinkedIn comparison chart, in millions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub category: String,
    pub amount: f64,
}

/// Decimal that must be a real number; `NaN` and infinities are rejected.
fn finite<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!("{value} is not a finite number")))
    }
}

/// `YYYY-MM-DD` (de)serialization for [`Date`] fields.
pub(crate) mod iso_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{macros::format_description, Date};

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = format(*date).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(raw.trim()).map_err(serde::de::Error::custom)
    }

    pub fn format(date: Date) -> Result<String, time::error::Format> {
        date.format(format_description!("[year]-[month]-[day]"))
    }

    pub fn parse(raw: &str) -> Result<Date, time::error::Parse> {
        Date::parse(raw, format_description!("[year]-[month]-[day]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn monthly_record_round_trips_iso_dates() {
        let record = MonthlyUserRecord {
            date: date!(2024 - 03 - 01),
            users_million: 21.5,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"date":"2024-03-01","users_million":21.5}"#);
    }

    #[test]
    fn iso_date_rejects_other_layouts() {
        assert!(iso_date::parse("01/03/2024").is_err());
        assert_eq!(iso_date::parse("2024-03-01").unwrap(), date!(2024 - 03 - 01));
    }
}
