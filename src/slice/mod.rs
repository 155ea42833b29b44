//! Row selection at a fixed control parameter.
//!
//! For each averaged table we pick the row(s) whose column 0 equals the target
//! `c` and keep only the requested value columns. Collapsing the per-dataset
//! selections into one cross-size `Series` also lives here.

use tracing::debug;

use crate::domain::{Dataset, RowLookup, Series, SeriesPoint, Statistic, Table, Tolerance};
use crate::error::{AppError, ErrorKind};

/// Indices of the rows whose column 0 matches `target`.
pub fn matching_rows(table: &Table, target: f64, tolerance: Tolerance) -> Vec<usize> {
    if table.ncols() == 0 {
        return Vec::new();
    }
    table
        .column(0)
        .iter()
        .enumerate()
        .filter(|&(_, &c)| matches(c, target, tolerance))
        .map(|(i, _)| i)
        .collect()
}

fn matches(c: f64, target: f64, tolerance: Tolerance) -> bool {
    match tolerance {
        Tolerance::Exact => c == target,
        Tolerance::Abs(eps) => (c - target).abs() <= eps,
    }
}

/// Build a `rows.len() x columns.len()` table from the given rows and columns.
pub fn take_rows(table: &Table, rows: &[usize], columns: &[usize]) -> Result<Table, AppError> {
    if let Some(&r) = rows.iter().find(|&&r| r >= table.nrows()) {
        return Err(AppError::new(
            ErrorKind::ShapeMismatch,
            format!("Row {r} out of range for a table with {} rows.", table.nrows()),
        ));
    }
    if let Some(&c) = columns.iter().find(|&&c| c >= table.ncols()) {
        return Err(AppError::new(
            ErrorKind::ShapeMismatch,
            format!("Column {c} out of range for a table with {} columns.", table.ncols()),
        ));
    }
    Ok(Table::from_fn(rows.len(), columns.len(), |i, j| {
        table[(rows[i], columns[j])]
    }))
}

/// Rows where column 0 matches `target`, restricted to `columns`.
///
/// No match yields an empty (0-row) selection; every match is returned.
pub fn select_rows(
    table: &Table,
    target: f64,
    columns: &[usize],
    tolerance: Tolerance,
) -> Result<Table, AppError> {
    let rows = matching_rows(table, target, tolerance);
    take_rows(table, &rows, columns)
}

/// Collect one point per dataset for `statistic` at control parameter `target`.
///
/// `lookup` decides whose column 0 locates the rows of each dataset. Every
/// dataset must yield exactly one row: none is `InsufficientData`, several is
/// an ambiguous `Format` error. The result is ordered by N.
pub fn build_series(
    datasets: &[Dataset],
    statistic: Statistic,
    target: f64,
    tolerance: Tolerance,
    lookup: RowLookup,
) -> Result<Series, AppError> {
    let mut points = Vec::with_capacity(datasets.len());

    for (idx, ds) in datasets.iter().enumerate() {
        let source = datasets.get(lookup.mask_source(idx)).unwrap_or(ds);
        let rows = matching_rows(&source.averaged, target, tolerance);
        if source.size != ds.size {
            debug!(
                size = ds.size,
                mask_size = source.size,
                "locating rows with another dataset's control column"
            );
        }

        let selected = take_rows(&ds.averaged, &rows, &[statistic.column()])
            .map_err(|e| AppError::new(e.kind(), format!("N={}: {e}", ds.size)))?;

        match selected.nrows() {
            0 => {
                return Err(AppError::new(
                    ErrorKind::InsufficientData,
                    format!(
                        "N={} ({}): no row with c == {target} (tolerance {tolerance:?}).",
                        ds.size,
                        ds.path.display()
                    ),
                ));
            }
            1 => points.push(SeriesPoint {
                size: ds.size,
                value: selected[(0, 0)],
            }),
            n => {
                return Err(AppError::new(
                    ErrorKind::Format,
                    format!(
                        "N={} ({}): {n} rows match c == {target}; the selection is ambiguous.",
                        ds.size,
                        ds.path.display()
                    ),
                ));
            }
        }
    }

    points.sort_by_key(|p| p.size);
    Ok(Series {
        statistic,
        target,
        points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn dataset(size: u64, rows: &[[f64; 3]]) -> Dataset {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Dataset {
            size,
            path: PathBuf::from(format!("n{size}.txt")),
            trials: 1,
            averaged: Table::from_row_slice(rows.len(), 3, &flat),
        }
    }

    #[test]
    fn selects_value_columns_of_matching_row() {
        let t = Table::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
        let sel = select_rows(&t, 1.0, &[1, 2], Tolerance::Exact).unwrap();
        assert_eq!(sel, Table::from_row_slice(1, 2, &[2.0, 3.0]));
    }

    #[test]
    fn no_match_is_empty_selection() {
        let t = Table::from_row_slice(2, 3, &[0.98, 2.0, 3.0, 1.02, 4.0, 6.0]);
        let sel = select_rows(&t, 1.0, &[1, 2], Tolerance::Exact).unwrap();
        assert_eq!(sel.shape(), (0, 2));
    }

    #[test]
    fn exact_comparison_misses_rounding_noise() {
        let c = 0.1 + 0.2; // 0.30000000000000004
        let t = Table::from_row_slice(1, 3, &[c, 2.0, 3.0]);
        assert!(matching_rows(&t, 0.3, Tolerance::Exact).is_empty());
        assert_eq!(matching_rows(&t, 0.3, Tolerance::Abs(1e-9)), vec![0]);
    }

    #[test]
    fn all_matches_are_returned() {
        let t = Table::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 0.5, 0.0, 0.0, 1.0, 5.0, 6.0]);
        let sel = select_rows(&t, 1.0, &[2], Tolerance::Exact).unwrap();
        assert_eq!(sel, Table::from_row_slice(2, 1, &[3.0, 6.0]));
    }

    #[test]
    fn out_of_range_column_is_shape_mismatch() {
        let t = Table::from_row_slice(1, 2, &[1.0, 2.0]);
        let err = select_rows(&t, 1.0, &[2], Tolerance::Exact).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn series_is_sorted_by_size() {
        let datasets = vec![
            dataset(10_000, &[[0.0, 1.0, 0.1], [1.0, 20.0, 0.2]]),
            dataset(1000, &[[0.0, 1.0, 0.1], [1.0, 10.0, 0.3]]),
        ];
        let s = build_series(&datasets, Statistic::MaxCluster, 1.0, Tolerance::Exact, RowLookup::Own)
            .unwrap();
        assert_eq!(
            s.points,
            vec![
                SeriesPoint { size: 1000, value: 0.3 },
                SeriesPoint { size: 10_000, value: 0.2 },
            ]
        );
    }

    #[test]
    fn missing_target_row_is_insufficient_data() {
        let datasets = vec![dataset(1000, &[[0.0, 1.0, 0.1], [0.5, 2.0, 0.2]])];
        let err = build_series(&datasets, Statistic::MeanCluster, 1.0, Tolerance::Exact, RowLookup::Own)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn duplicate_target_rows_are_ambiguous() {
        let datasets = vec![dataset(1000, &[[1.0, 1.0, 0.1], [1.0, 2.0, 0.2]])];
        let err = build_series(&datasets, Statistic::MeanCluster, 1.0, Tolerance::Exact, RowLookup::Own)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn legacy_lookup_uses_second_dataset_rows_for_third() {
        // The third dataset has its c = 1 row at index 0, but the second
        // dataset has it at index 1; legacy lookup reads index 1.
        let datasets = vec![
            dataset(1000, &[[0.0, 1.0, 0.0], [1.0, 10.0, 0.0]]),
            dataset(10_000, &[[0.0, 1.0, 0.0], [1.0, 20.0, 0.0]]),
            dataset(100_000, &[[1.0, 30.0, 0.0], [0.0, 99.0, 0.0]]),
        ];
        let own = build_series(&datasets, Statistic::MeanCluster, 1.0, Tolerance::Exact, RowLookup::Own)
            .unwrap();
        let legacy =
            build_series(&datasets, Statistic::MeanCluster, 1.0, Tolerance::Exact, RowLookup::Legacy)
                .unwrap();
        assert_eq!(own.values(), vec![10.0, 20.0, 30.0]);
        assert_eq!(legacy.values(), vec![10.0, 20.0, 99.0]);
    }

    #[test]
    fn legacy_lookup_with_shorter_third_table_is_shape_mismatch() {
        let datasets = vec![
            dataset(1000, &[[1.0, 10.0, 0.0]]),
            dataset(10_000, &[[0.0, 1.0, 0.0], [1.0, 20.0, 0.0]]),
            dataset(100_000, &[[1.0, 30.0, 0.0]]),
        ];
        let err =
            build_series(&datasets, Statistic::MeanCluster, 1.0, Tolerance::Exact, RowLookup::Legacy)
                .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    proptest! {
        #[test]
        fn every_selected_row_matches_target(
            cs in proptest::collection::vec(prop_oneof![Just(1.0f64), 0.0f64..2.0], 1..30),
        ) {
            let t = Table::from_fn(cs.len(), 2, |i, j| if j == 0 { cs[i] } else { i as f64 });
            let rows = matching_rows(&t, 1.0, Tolerance::Exact);
            for &r in &rows {
                prop_assert_eq!(t[(r, 0)], 1.0);
            }
            let expected = cs.iter().filter(|&&c| c == 1.0).count();
            prop_assert_eq!(rows.len(), expected);
            prop_assert_eq!(rows.is_empty(), !cs.contains(&1.0));
        }
    }
}
