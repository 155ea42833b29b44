//! Element-wise averaging of trial tables.

use crate::domain::Table;
use crate::error::{AppError, ErrorKind};

/// Element-wise arithmetic mean of equally shaped tables.
///
/// NaN and infinities are not filtered; they propagate into the affected cells.
pub fn mean_tables(tables: &[Table]) -> Result<Table, AppError> {
    let Some(first) = tables.first() else {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            "Cannot average zero trial tables.",
        ));
    };

    let shape = first.shape();
    if let Some((idx, bad)) = tables.iter().enumerate().find(|(_, t)| t.shape() != shape) {
        return Err(AppError::new(
            ErrorKind::ShapeMismatch,
            format!(
                "Trial {} has shape {}x{}, expected {}x{} (from trial 1).",
                idx + 1,
                bad.nrows(),
                bad.ncols(),
                shape.0,
                shape.1
            ),
        ));
    }

    if tables.len() == 1 {
        return Ok(first.clone());
    }

    let mut sum = Table::zeros(shape.0, shape.1);
    for t in tables {
        sum += t;
    }
    Ok(sum / tables.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mean_of_two_tables() {
        let a = Table::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
        let b = Table::from_row_slice(2, 3, &[1.0, 4.0, 5.0, 2.0, 0.0, 8.0]);
        let m = mean_tables(&[a, b]).unwrap();
        assert_eq!(m, Table::from_row_slice(2, 3, &[1.0, 3.0, 4.0, 2.0, 2.0, 7.0]));
    }

    #[test]
    fn identical_control_column_survives_exactly() {
        // Averaging many copies of the same c value must not drift away from it,
        // otherwise exact-match row selection breaks.
        let t = Table::from_row_slice(1, 2, &[1.0, 0.3]);
        let tables = vec![t; 1000];
        let m = mean_tables(&tables).unwrap();
        assert_eq!(m[(0, 0)], 1.0);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let a = Table::zeros(2, 3);
        let b = Table::zeros(3, 3);
        let err = mean_tables(&[a, b]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert!(err.to_string().contains("Trial 2"));
    }

    #[test]
    fn empty_input_is_insufficient_data() {
        let err = mean_tables(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn nan_propagates() {
        let a = Table::from_row_slice(1, 2, &[1.0, f64::NAN]);
        let b = Table::from_row_slice(1, 2, &[1.0, 2.0]);
        let m = mean_tables(&[a, b]).unwrap();
        assert_eq!(m[(0, 0)], 1.0);
        assert!(m[(0, 1)].is_nan());
    }

    proptest! {
        #[test]
        fn single_table_is_returned_unchanged(
            rows in 1usize..6,
            cols in 1usize..5,
            seed in proptest::collection::vec(-1e6f64..1e6, 30),
        ) {
            let t = Table::from_fn(rows, cols, |i, j| seed[(i * cols + j) % seed.len()]);
            let m = mean_tables(std::slice::from_ref(&t)).unwrap();
            prop_assert_eq!(m, t);
        }

        #[test]
        fn mean_lies_between_min_and_max(
            values in proptest::collection::vec(-1e3f64..1e3, 1..20),
        ) {
            let tables: Vec<Table> = values.iter().map(|&v| Table::from_element(2, 2, v)).collect();
            let m = mean_tables(&tables).unwrap();
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            for &x in m.iter() {
                prop_assert!(x >= lo - 1e-9 && x <= hi + 1e-9);
            }
        }
    }
}
