//! Reads the dashboard tables from an upload or from the bundled samples.
//!
//! Nothing is cached: each render pass calls [`load_table`] again and the text is
//! re-parsed from scratch, whether or not the inputs changed.

use std::borrow::Cow;

use csv::{ReaderBuilder, StringRecord, Trim};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Month,
    OffsetDateTime, PrimitiveDateTime,
};
use tracing::{debug, info};

use crate::core::config::DashboardConfig;
use crate::core::error::{DashboardError, Result, TableKind};

use super::records::{iso_date, AgeUserRecord, MonthlyUserRecord, StudentRecord, TableRecord};
use super::samples;

/// Text of a file the user picked in one of the upload controls.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub name: String,
    pub contents: String,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Decode raw upload bytes as UTF-8, dropping a leading byte-order mark.
    pub fn from_bytes(table: TableKind, name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        match String::from_utf8(bytes) {
            Ok(text) => {
                let contents = match text.strip_prefix('\u{feff}') {
                    Some(stripped) => stripped.to_string(),
                    None => text,
                };
                Ok(Self { name, contents })
            }
            Err(err) => Err(DashboardError::Upload {
                table,
                name,
                reason: err.to_string(),
            }),
        }
    }
}

/// The uploads currently selected for each table; `None` means "use the sample".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardInputs {
    pub students: Option<UploadedFile>,
    pub age: Option<UploadedFile>,
    pub monthly: Option<UploadedFile>,
}

impl DashboardInputs {
    pub fn slot(&self, table: TableKind) -> Option<&UploadedFile> {
        match table {
            TableKind::Students => self.students.as_ref(),
            TableKind::AgeUsers => self.age.as_ref(),
            TableKind::MonthlyUsers => self.monthly.as_ref(),
            TableKind::Comparison => None,
        }
    }

    pub fn slot_mut(&mut self, table: TableKind) -> Option<&mut Option<UploadedFile>> {
        match table {
            TableKind::Students => Some(&mut self.students),
            TableKind::AgeUsers => Some(&mut self.age),
            TableKind::MonthlyUsers => Some(&mut self.monthly),
            TableKind::Comparison => None,
        }
    }
}

/// The three tables of one render pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub students: Vec<StudentRecord>,
    pub age: Vec<AgeUserRecord>,
    pub monthly: Vec<MonthlyUserRecord>,
}

impl Dataset {
    pub fn load(inputs: &DashboardInputs, config: &DashboardConfig) -> Result<Self> {
        let date_columns = config.date_columns();
        Ok(Self {
            students: load_table(&config.students_path, inputs.students.as_ref(), &[])?,
            age: load_table(&config.age_path, inputs.age.as_ref(), &[])?,
            monthly: load_table(&config.monthly_path, inputs.monthly.as_ref(), &date_columns)?,
        })
    }
}

/// Load one table from `uploaded` if present, otherwise from the bundled sample
/// at `default_path`. Values of every column in `date_columns` are converted to
/// calendar dates before the rows are typed.
pub fn load_table<R: TableRecord>(
    default_path: &str,
    uploaded: Option<&UploadedFile>,
    date_columns: &[&str],
) -> Result<Vec<R>> {
    let (origin, text) = match uploaded {
        Some(file) => (file.name.as_str(), Cow::Borrowed(file.contents.as_str())),
        None => {
            let text = samples::bundled_text(default_path).ok_or_else(|| {
                DashboardError::MissingSample {
                    path: default_path.to_string(),
                }
            })?;
            (default_path, Cow::Owned(text))
        }
    };

    let rows = parse_table::<R>(&text, date_columns)?;
    info!(
        table = %R::TABLE,
        origin,
        uploaded = uploaded.is_some(),
        rows = rows.len(),
        "loaded table"
    );
    Ok(rows)
}

/// Parse CSV text into typed rows. See [`load_table`].
pub fn parse_table<R: TableRecord>(text: &str, date_columns: &[&str]) -> Result<Vec<R>> {
    let table = R::TABLE;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|source| DashboardError::Csv { table, source })?
        .clone();
    let found: Vec<String> = headers.iter().map(str::to_string).collect();

    for column in R::COLUMNS.iter().chain(date_columns.iter()) {
        if !found.iter().any(|name| name == column) {
            return Err(DashboardError::Schema {
                table,
                column: column.to_string(),
                found,
            });
        }
    }

    let date_indices: Vec<(usize, &str)> = date_columns
        .iter()
        .filter_map(|column| {
            found
                .iter()
                .position(|name| name == column)
                .map(|index| (index, *column))
        })
        .collect();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        let record = result.map_err(|source| DashboardError::InvalidRow { table, row, source })?;
        let record = normalize_dates(table, row, record, &date_indices)?;
        let parsed = record
            .deserialize::<R>(Some(&headers))
            .map_err(|source| DashboardError::InvalidRow { table, row, source })?;
        rows.push(parsed);
    }

    debug!(table = %table, rows = rows.len(), "parsed csv");
    Ok(rows)
}

/// Rewrite the date columns of `record` in canonical `YYYY-MM-DD` form.
fn normalize_dates(
    table: TableKind,
    row: usize,
    record: StringRecord,
    date_indices: &[(usize, &str)],
) -> Result<StringRecord> {
    if date_indices.is_empty() {
        return Ok(record);
    }

    let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
    for (index, column) in date_indices {
        let Some(raw) = fields.get(*index) else {
            continue;
        };
        let canonical = parse_calendar_date(raw)
            .and_then(|date| iso_date::format(date).ok())
            .ok_or_else(|| DashboardError::DateParse {
                table,
                column: column.to_string(),
                row,
                value: raw.clone(),
            })?;
        fields[*index] = canonical;
    }

    Ok(StringRecord::from(fields))
}

/// Lenient date parsing: ISO dates, slash dates, date-times (time dropped) and
/// bare `YYYY-MM` months (first day of the month).
pub fn parse_calendar_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = iso_date::parse(raw) {
        return Some(date);
    }
    if let Ok(date) = Date::parse(raw, format_description!("[year]/[month]/[day]")) {
        return Some(date);
    }
    if let Ok(stamp) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(stamp.date());
    }

    let date_times = [
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]"),
    ];
    for layout in date_times {
        if let Ok(stamp) = PrimitiveDateTime::parse(raw, layout) {
            return Some(stamp.date());
        }
    }

    let (year, month) = raw.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;
    Date::from_calendar_date(year, month, 1).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    const STUDENTS: &str = "region,level,year,students\n\
        Indonesia,Total,2024,9000000\n\
        Indonesia,S1,2024,7000000\n";

    #[test]
    fn parses_typed_rows() {
        let rows = parse_table::<StudentRecord>(STUDENTS, &[]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].region, "Indonesia");
        assert_eq!(rows[0].students, 9_000_000);
        assert_eq!(rows[1].level, "S1");
    }

    #[test]
    fn trims_whitespace_and_ignores_extra_columns() {
        let text = "age_group , users_million , period , source\n 18-24 , 5.2 , 2024 , survey\n";
        let rows = parse_table::<AgeUserRecord>(text, &[]).unwrap();
        assert_eq!(rows[0].age_group, "18-24");
        assert_eq!(rows[0].users_million, 5.2);
    }

    #[test]
    fn missing_column_is_schema_error() {
        let text = "region,tier,year,students\nIndonesia,Total,2024,1\n";
        let err = parse_table::<StudentRecord>(text, &[]).unwrap_err();
        match err {
            DashboardError::Schema { table, column, found } => {
                assert_eq!(table, TableKind::Students);
                assert_eq!(column, "level");
                assert!(found.contains(&"tier".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn date_column_outside_header_is_schema_error() {
        let err = parse_table::<StudentRecord>(STUDENTS, &["date"]).unwrap_err();
        assert!(matches!(err, DashboardError::Schema { column, .. } if column == "date"));
    }

    #[test]
    fn bad_date_reports_row_and_value() {
        let text = "date,users_million\n2024-01-01,20.0\nlast month,21.0\n";
        let err = parse_table::<MonthlyUserRecord>(text, &["date"]).unwrap_err();
        match err {
            DashboardError::DateParse { row, value, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "last month");
                assert_eq!(column, "date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_users_are_invalid_rows() {
        for raw in ["NaN", "inf", "-inf"] {
            let text = format!("age_group,users_million,period\n25-34,3.1,2024\n18-24,{raw},2024\n");
            let err = parse_table::<AgeUserRecord>(&text, &[]).unwrap_err();
            match err {
                DashboardError::InvalidRow { table, row, .. } => {
                    assert_eq!(table, TableKind::AgeUsers);
                    assert_eq!(row, 2);
                }
                other => panic!("{raw}: unexpected error: {other}"),
            }
        }

        let monthly = "date,users_million\n2024-01-01,NaN\n";
        let err = parse_table::<MonthlyUserRecord>(monthly, &["date"]).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRow { row: 1, .. }));
    }

    #[test]
    fn lenient_date_layouts_are_normalized() {
        let text = "date,users_million\n\
            2024/02/01,1.0\n\
            2024-03-01T08:30:00Z,2.0\n\
            2024-04-01 10:00:00,3.0\n\
            2024-05,4.0\n";
        let rows = parse_table::<MonthlyUserRecord>(text, &["date"]).unwrap();
        let dates: Vec<Date> = rows.iter().map(|r| r.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2024 - 02 - 01),
                date!(2024 - 03 - 01),
                date!(2024 - 04 - 01),
                date!(2024 - 05 - 01),
            ]
        );
    }

    #[test]
    fn wrong_value_type_is_invalid_row() {
        let text = "region,level,year,students\nIndonesia,Total,2024,many\n";
        let err = parse_table::<StudentRecord>(text, &[]).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRow { row: 1, .. }));
    }

    #[test]
    fn upload_takes_precedence_over_sample() {
        let upload = UploadedFile::new("mine.csv", STUDENTS);
        let rows = load_table::<StudentRecord>("students.csv", Some(&upload), &[]).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn missing_sample_is_reported() {
        let err = load_table::<StudentRecord>("absent.csv", None, &[]).unwrap_err();
        assert!(matches!(err, DashboardError::MissingSample { path } if path == "absent.csv"));
    }

    #[test]
    fn upload_bytes_strip_bom_and_reject_invalid_utf8() {
        let mut bytes = "\u{feff}".as_bytes().to_vec();
        bytes.extend_from_slice(STUDENTS.as_bytes());
        let file = UploadedFile::from_bytes(TableKind::Students, "bom.csv", bytes).unwrap();
        assert!(file.contents.starts_with("region"));

        let err = UploadedFile::from_bytes(TableKind::Students, "bin.csv", vec![0xff, 0xfe, 0x00])
            .unwrap_err();
        assert!(matches!(err, DashboardError::Upload { .. }));
    }

    #[test]
    fn bundled_dataset_loads() {
        let dataset = Dataset::load(&DashboardInputs::default(), &DashboardConfig::default())
            .expect("bundled samples parse");
        assert!(!dataset.students.is_empty());
        assert!(!dataset.age.is_empty());
        assert!(!dataset.monthly.is_empty());
    }
}
