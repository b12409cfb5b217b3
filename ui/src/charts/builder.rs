//! Turns a table plus an [`Encoding`] into a [`ChartSpec`]. Pure: no I/O and no
//! validation beyond what plotting needs (channels present, values numeric).

use time::macros::format_description;

use crate::core::error::{DashboardError, Result};
use crate::core::format::format_tick;
use crate::data::query;

use super::spec::{ChartData, ChartKind, ChartSpec, Datum, Encoding, SeriesPoint};
use super::table::{Cell, ChartTable};

pub fn build_chart(kind: ChartKind, table: &ChartTable, encoding: &Encoding) -> Result<ChartSpec> {
    let (x_label, y_label, data) = match kind {
        ChartKind::Bar => {
            let x = required(kind, "x", encoding.x.as_deref())?;
            let y = required(kind, "y", encoding.y.as_deref())?;
            let data = ChartData::Categories(categories(table, x, y, encoding.text.as_deref())?);
            (Some(encoding.label_for(x)), Some(encoding.label_for(y)), data)
        }
        ChartKind::Treemap => {
            if encoding.path.is_empty() {
                return Err(DashboardError::Encoding {
                    kind: kind.as_str(),
                    channel: "path",
                });
            }
            let values = required(kind, "values", encoding.values.as_deref())?;
            let path: Vec<&str> = encoding.path.iter().map(String::as_str).collect();
            (None, None, ChartData::Leaves(grouped(table, &path, values)?))
        }
        ChartKind::Pie => {
            let names = required(kind, "names", encoding.names.as_deref())?;
            let values = required(kind, "values", encoding.values.as_deref())?;
            (None, None, ChartData::Slices(grouped(table, &[names], values)?))
        }
        ChartKind::Line => {
            let x = required(kind, "x", encoding.x.as_deref())?;
            let y = required(kind, "y", encoding.y.as_deref())?;
            let data = ChartData::Series(series(table, x, y)?);
            (Some(encoding.label_for(x)), Some(encoding.label_for(y)), data)
        }
    };

    Ok(ChartSpec {
        kind,
        x_label,
        y_label,
        data,
        show_text: encoding.text.is_some(),
        markers: encoding.markers,
        hole: if kind == ChartKind::Pie { encoding.hole } else { 0.0 },
    })
}

fn required<'a>(kind: ChartKind, channel: &'static str, column: Option<&'a str>) -> Result<&'a str> {
    column.ok_or(DashboardError::Encoding {
        kind: kind.as_str(),
        channel,
    })
}

fn numeric(cell: &Cell, column: &str, channel: &'static str) -> Result<f64> {
    cell.as_f64().ok_or_else(|| DashboardError::ColumnType {
        column: column.to_string(),
        channel,
    })
}

fn categories(table: &ChartTable, x: &str, y: &str, text: Option<&str>) -> Result<Vec<Datum>> {
    let xi = table.column_index(x)?;
    let yi = table.column_index(y)?;
    let ti = text.map(|column| table.column_index(column)).transpose()?;

    table
        .rows()
        .iter()
        .map(|row| -> Result<Datum> {
            Ok(Datum {
                label: row[xi].label(),
                value: numeric(&row[yi], y, "y")?,
                text: ti.map(|index| row[index].label()),
            })
        })
        .collect()
}

/// Leaves keyed by the joined path labels; rows sharing a path are summed.
fn grouped(table: &ChartTable, path: &[&str], values: &str) -> Result<Vec<Datum>> {
    let path_indices = path
        .iter()
        .map(|column| table.column_index(column))
        .collect::<Result<Vec<_>>>()?;
    let vi = table.column_index(values)?;

    let mut keyed = Vec::with_capacity(table.len());
    for row in table.rows() {
        let label = path_indices
            .iter()
            .map(|index| row[*index].label())
            .collect::<Vec<_>>()
            .join(" / ");
        keyed.push((label, numeric(&row[vi], values, "values")?));
    }

    let refs: Vec<&(String, f64)> = keyed.iter().collect();
    Ok(query::group_sum(&refs, |(label, _)| label.clone(), |(_, value)| *value)
        .into_iter()
        .map(|(label, value)| Datum {
            label,
            value,
            text: None,
        })
        .collect())
}

fn series(table: &ChartTable, x: &str, y: &str) -> Result<Vec<SeriesPoint>> {
    let xi = table.column_index(x)?;
    let yi = table.column_index(y)?;

    table
        .rows()
        .iter()
        .map(|row| -> Result<SeriesPoint> {
            let (position, label) = match &row[xi] {
                Cell::Date(date) => (
                    f64::from(date.to_julian_day()),
                    date.format(format_description!("[month repr:short] [year]"))
                        .unwrap_or_else(|_| row[xi].label()),
                ),
                cell => {
                    let value = numeric(cell, x, "x")?;
                    (value, format_tick(value))
                }
            };
            Ok(SeriesPoint {
                position,
                label,
                value: numeric(&row[yi], y, "y")?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AgeUserRecord, ComparisonRow, MonthlyUserRecord};
    use time::macros::date;

    fn ages() -> Vec<AgeUserRecord> {
        vec![
            AgeUserRecord {
                age_group: "18-24".into(),
                users_million: 5.2,
                period: "2024".into(),
            },
            AgeUserRecord {
                age_group: "25-34".into(),
                users_million: 3.1,
                period: "2024".into(),
            },
        ]
    }

    #[test]
    fn bar_uses_label_overrides() {
        let table = ChartTable::from_rows(&ages());
        let encoding =
            Encoding::xy("age_group", "users_million").with_label("users_million", "Juta Pengguna");
        let spec = build_chart(ChartKind::Bar, &table, &encoding).unwrap();
        assert_eq!(spec.x_label.as_deref(), Some("age_group"));
        assert_eq!(spec.y_label.as_deref(), Some("Juta Pengguna"));
        match spec.data {
            ChartData::Categories(points) => {
                assert_eq!(points[0].label, "18-24");
                assert_eq!(points[1].value, 3.1);
                assert!(points[0].text.is_none());
            }
            other => panic!("unexpected data: {other:?}"),
        }
    }

    #[test]
    fn bar_text_repeats_plotted_value() {
        let rows = vec![
            ComparisonRow {
                category: "Mahasiswa".into(),
                amount: 9.0,
            },
            ComparisonRow {
                category: "LinkedIn".into(),
                amount: 5.2,
            },
        ];
        let table = ChartTable::from_rows(&rows);
        let encoding = Encoding::xy("category", "amount").with_text("amount");
        let spec = build_chart(ChartKind::Bar, &table, &encoding).unwrap();
        assert!(spec.show_text);
        let ChartData::Categories(points) = spec.data else {
            panic!("bar chart must carry categories");
        };
        assert_eq!(points[0].text.as_deref(), Some("9"));
        assert_eq!(points[1].text.as_deref(), Some("5.2"));
    }

    #[test]
    fn missing_channel_is_encoding_error() {
        let table = ChartTable::from_rows(&ages());
        let err = build_chart(ChartKind::Pie, &table, &Encoding::xy("age_group", "users_million"))
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Encoding { kind: "pie", channel: "names" }
        ));
    }

    #[test]
    fn text_value_channel_is_type_error() {
        let table = ChartTable::from_rows(&ages());
        let err = build_chart(ChartKind::Bar, &table, &Encoding::xy("age_group", "period"))
            .unwrap_err();
        assert!(matches!(err, DashboardError::ColumnType { channel: "y", .. }));
    }

    #[test]
    fn pie_sums_duplicate_names() {
        let mut rows = ages();
        rows.push(AgeUserRecord {
            age_group: "18-24".into(),
            users_million: 0.8,
            period: "2023".into(),
        });
        let table = ChartTable::from_rows(&rows);
        let spec = build_chart(
            ChartKind::Pie,
            &table,
            &Encoding::slices("age_group", "users_million").with_hole(0.35),
        )
        .unwrap();
        assert_eq!(spec.hole, 0.35);
        let ChartData::Slices(slices) = spec.data else {
            panic!("pie must carry slices");
        };
        assert_eq!(slices.len(), 2);
        assert!((slices[0].value - 6.0).abs() < 1e-9);
    }

    #[test]
    fn line_positions_follow_dates() {
        let rows = vec![
            MonthlyUserRecord {
                date: date!(2024 - 01 - 01),
                users_million: 20.0,
            },
            MonthlyUserRecord {
                date: date!(2024 - 02 - 01),
                users_million: 21.0,
            },
        ];
        let table = ChartTable::from_rows(&rows);
        let spec = build_chart(
            ChartKind::Line,
            &table,
            &Encoding::xy("date", "users_million").with_markers(),
        )
        .unwrap();
        assert!(spec.markers);
        let ChartData::Series(points) = spec.data else {
            panic!("line must carry a series");
        };
        assert_eq!(points[1].position - points[0].position, 31.0);
        assert_eq!(points[0].label, "Jan 2024");
    }
}
