//! Typed query helpers over in-memory rows: the handful of filter / sort /
//! aggregate operations the dashboard needs.

use std::cmp::Ordering;

use crate::core::error::{DashboardError, Result, TableKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Rows matching `predicate`, in input order.
pub fn select<'a, T>(rows: &'a [T], predicate: impl Fn(&T) -> bool) -> Vec<&'a T> {
    rows.iter().filter(|row| predicate(row)).collect()
}

/// Sum of `value` over `rows`. A total past `u64::MAX` is an overflow error
/// naming `table` and `column`.
pub fn sum_by<T>(
    table: TableKind,
    column: &str,
    rows: &[&T],
    value: impl Fn(&T) -> u64,
) -> Result<u64> {
    rows.iter()
        .try_fold(0u64, |total, row| total.checked_add(value(row)))
        .ok_or_else(|| DashboardError::Overflow {
            table,
            column: column.to_string(),
        })
}

/// Sum `value` per key. Keys appear in order of first occurrence.
pub fn group_sum<T, K: PartialEq>(
    rows: &[&T],
    key: impl Fn(&T) -> K,
    value: impl Fn(&T) -> f64,
) -> Vec<(K, f64)> {
    let mut groups: Vec<(K, f64)> = Vec::new();
    for row in rows {
        let group = key(row);
        let amount = value(row);
        match groups.iter_mut().find(|(existing, _)| *existing == group) {
            Some((_, total)) => *total += amount,
            None => groups.push((group, amount)),
        }
    }
    groups
}

/// Stable sort by `key`. Rows with equal keys keep their input order in both
/// directions; incomparable keys (NaN) are treated as equal.
pub fn sorted_by_key<'a, T, K: PartialOrd>(
    mut rows: Vec<&'a T>,
    key: impl Fn(&T) -> K,
    order: SortOrder,
) -> Vec<&'a T> {
    rows.sort_by(|a, b| {
        let ordering = key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
    rows
}

/// The row that sorts last by `key` (the latest of equal keys in input order).
pub fn last_by_key<'a, T, K: PartialOrd>(rows: &'a [T], key: impl Fn(&T) -> K) -> Option<&'a T> {
    let all: Vec<&T> = rows.iter().collect();
    sorted_by_key(all, key, SortOrder::Ascending).pop()
}

/// The single row matching `predicate`. Zero or several matches are a lookup
/// error naming `filter`.
pub fn exactly_one<'a, T>(
    table: TableKind,
    rows: &'a [T],
    filter: &str,
    predicate: impl Fn(&T) -> bool,
) -> Result<&'a T> {
    let matches = select(rows, predicate);
    match matches.as_slice() {
        [single] => Ok(*single),
        _ => Err(DashboardError::Lookup {
            table,
            filter: filter.to_string(),
            matched: matches.len(),
            expected: "exactly one",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row {
        name: &'static str,
        value: u64,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "a", value: 3 },
            Row { name: "b", value: 5 },
            Row { name: "c", value: 3 },
            Row { name: "a", value: 1 },
        ]
    }

    #[test]
    fn descending_sort_is_stable() {
        let data = rows();
        let sorted = sorted_by_key(data.iter().collect(), |r| r.value, SortOrder::Descending);
        let names: Vec<_> = sorted.iter().map(|r| (r.name, r.value)).collect();
        assert_eq!(names, vec![("b", 5), ("a", 3), ("c", 3), ("a", 1)]);
    }

    #[test]
    fn group_sum_keeps_first_appearance_order() {
        let data = rows();
        let refs: Vec<&Row> = data.iter().collect();
        let groups = group_sum(&refs, |r| r.name, |r| r.value as f64);
        assert_eq!(groups, vec![("a", 4.0), ("b", 5.0), ("c", 3.0)]);
    }

    #[test]
    fn last_by_key_picks_maximum() {
        let data = rows();
        let last = last_by_key(&data, |r| r.value).unwrap();
        assert_eq!(last.name, "b");
        assert!(last_by_key(&Vec::<Row>::new(), |r| r.value).is_none());
    }

    #[test]
    fn exactly_one_rejects_none_and_many() {
        let data = rows();
        assert_eq!(
            exactly_one(TableKind::Students, &data, "name == b", |r| r.name == "b")
                .unwrap()
                .value,
            5
        );

        let none = exactly_one(TableKind::Students, &data, "name == z", |r| r.name == "z");
        assert!(matches!(none, Err(DashboardError::Lookup { matched: 0, .. })));

        let many = exactly_one(TableKind::Students, &data, "name == a", |r| r.name == "a");
        assert!(matches!(many, Err(DashboardError::Lookup { matched: 2, .. })));
    }

    #[test]
    fn sum_over_selection() {
        let data = rows();
        let picked = select(&data, |r| r.name == "a");
        assert_eq!(
            sum_by(TableKind::Students, "value", &picked, |r| r.value).unwrap(),
            4
        );
    }

    #[test]
    fn sum_past_u64_max_is_an_error() {
        let data = [
            Row { name: "a", value: u64::MAX },
            Row { name: "a", value: 1 },
        ];
        let picked = select(&data, |r| r.name == "a");
        let err = sum_by(TableKind::Students, "students", &picked, |r| r.value).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Overflow { table: TableKind::Students, ref column } if column == "students"
        ));
    }
}
