//! Trial-file ingest.
//!
//! A trial file holds one block of whitespace-separated numeric rows per
//! simulation trial, blocks separated by one or more empty lines:
//!
//! ```text
//! 0.000000	1.000000	0.001000
//! 0.020000	1.020000	0.002000
//!
//! 0.000000	1.000000	0.001000
//! 0.020000	1.040000	0.002000
//! ```
//!
//! Design goals:
//! - **Strict parsing**: a bad token or a ragged block aborts the load with the
//!   offending line number, there is no row-skipping
//! - **No shape assumptions across blocks**: that check belongs to the aggregator

use std::path::Path;

use tracing::debug;

use crate::domain::Table;
use crate::error::{AppError, ErrorKind};

/// Read a trial file and parse it into one table per block.
pub fn load_trials(path: &Path) -> Result<Vec<Table>, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to read trial file '{}': {e}", path.display()),
        )
    })?;

    let tables = parse_trials(&text)
        .map_err(|e| AppError::new(e.kind(), format!("{}: {e}", path.display())))?;

    debug!(path = %path.display(), blocks = tables.len(), "parsed trial file");
    Ok(tables)
}

/// Parse trial-file text into one table per non-blank block, in file order.
///
/// Only an empty line ends a block. A line holding nothing but spaces or tabs
/// carries no row and is skipped without splitting the block around it.
pub fn parse_trials(text: &str) -> Result<Vec<Table>, AppError> {
    let mut tables = Vec::new();
    let mut block = BlockBuilder::default();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim_end_matches('\r').is_empty() {
            if let Some(table) = block.finish() {
                tables.push(table);
            }
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        block.push_line(line, line_no)?;
    }
    if let Some(table) = block.finish() {
        tables.push(table);
    }

    if tables.is_empty() {
        return Err(AppError::new(
            ErrorKind::InsufficientData,
            "No trial blocks found (file is empty or blank).",
        ));
    }

    Ok(tables)
}

/// Infer the system size N from a file name like `n1000.txt`.
pub fn size_from_path(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits = stem.strip_prefix('n').or_else(|| stem.strip_prefix('N'))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|&n| n > 0)
}

/// Accumulates the rows of the block currently being read.
#[derive(Default)]
struct BlockBuilder {
    values: Vec<f64>,
    cols: usize,
    rows: usize,
    first_line: usize,
}

impl BlockBuilder {
    fn push_line(&mut self, line: &str, line_no: usize) -> Result<(), AppError> {
        let before = self.values.len();
        for token in line.split_whitespace() {
            let v = token.parse::<f64>().map_err(|_| {
                AppError::new(
                    ErrorKind::Parse,
                    format!("line {line_no}: invalid number '{token}'"),
                )
            })?;
            self.values.push(v);
        }
        let cols = self.values.len() - before;

        if self.rows == 0 {
            self.cols = cols;
            self.first_line = line_no;
        } else if cols != self.cols {
            return Err(AppError::new(
                ErrorKind::Format,
                format!(
                    "line {line_no}: row has {cols} columns, but the block starting at line {} has {}",
                    self.first_line, self.cols
                ),
            ));
        }
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Option<Table> {
        if self.rows == 0 {
            return None;
        }
        let table = Table::from_row_slice(self.rows, self.cols, &self.values);
        *self = BlockBuilder::default();
        Some(table)
    }
}
