//! Delimited numeric tables produced by the integrators.
//!
//! Files are plain text, one sample per line, column 0 holding the time. The layout of the
//! remaining columns is a convention of the producing program, so the loader only checks that
//! every row has the same width and that every field is a number.

use crate::error::{PlotError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Whitespace,
    Comma,
}

impl Delimiter {
    fn split<'a>(self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Whitespace => line.split_whitespace().collect(),
            Delimiter::Comma => line.split(',').map(str::trim).collect(),
        }
    }
}

/// How a table file should be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadOptions {
    pub delimiter: Delimiter,
    /// Physical lines skipped at the top of the file (header rows).
    pub skip_rows: usize,
    /// Columns to keep, in output order. `None` keeps all of them.
    pub columns: Option<Vec<usize>>,
}

impl LoadOptions {
    pub fn whitespace() -> Self {
        Self {
            delimiter: Delimiter::Whitespace,
            skip_rows: 0,
            columns: None,
        }
    }

    pub fn comma() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            skip_rows: 0,
            columns: None,
        }
    }

    pub fn skip_rows(mut self, rows: usize) -> Self {
        self.skip_rows = rows;
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = usize>) -> Self {
        self.columns = Some(columns.into_iter().collect());
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::whitespace()
    }
}

/// An immutable, rectangular table of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesTable {
    source: PathBuf,
    data: DMatrix<f64>,
}

impl TimeSeriesTable {
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn column(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.cols() {
            return Err(PlotError::parse(
                &self.source,
                0,
                format!(
                    "column {} requested but the table has {} columns",
                    index,
                    self.cols()
                ),
            ));
        }
        Ok(self.data.column(index).iter().copied().collect())
    }

    /// Pairs two columns point by point, e.g. (time, position) or (position, velocity).
    pub fn pairs(&self, x_col: usize, y_col: usize) -> Result<Vec<(f64, f64)>> {
        let xs = self.column(x_col)?;
        let ys = self.column(y_col)?;
        Ok(xs.into_iter().zip(ys).collect())
    }
}

pub fn load_table(path: impl AsRef<Path>, options: &LoadOptions) -> Result<TimeSeriesTable> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => PlotError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => PlotError::io(path, err),
    })?;
    let table = parse_table(&contents, path, options)?;
    debug!(
        path = %path.display(),
        rows = table.rows(),
        cols = table.cols(),
        "loaded table"
    );
    Ok(table)
}

/// Parses table text already in memory. `origin` is only used for error messages.
pub fn parse_table(
    contents: &str,
    origin: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<TimeSeriesTable> {
    let origin = origin.as_ref();
    let mut width: Option<usize> = None;
    let mut out_cols = 0usize;
    let mut rows = 0usize;
    let mut values = Vec::new();

    for (idx, raw) in contents.lines().enumerate().skip(options.skip_rows) {
        let line_no = idx + 1;
        // Everything from `#` to the end of the line is a comment.
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let fields = options.delimiter.split(line);
        match width {
            None => {
                width = Some(fields.len());
                out_cols = match &options.columns {
                    Some(cols) => cols.len(),
                    None => fields.len(),
                };
            }
            Some(expected) if expected != fields.len() => {
                return Err(PlotError::parse(
                    origin,
                    line_no,
                    format!("expected {} fields, found {}", expected, fields.len()),
                ));
            }
            Some(_) => {}
        }

        match &options.columns {
            Some(cols) => {
                for &col in cols {
                    let field = fields.get(col).ok_or_else(|| {
                        PlotError::parse(
                            origin,
                            line_no,
                            format!(
                                "column {} requested but the row has {} fields",
                                col,
                                fields.len()
                            ),
                        )
                    })?;
                    values.push(parse_field(field, origin, line_no)?);
                }
            }
            None => {
                for field in &fields {
                    values.push(parse_field(field, origin, line_no)?);
                }
            }
        }
        rows += 1;
    }

    if rows == 0 {
        return Err(PlotError::parse(origin, 0, "no data rows"));
    }
    if out_cols == 0 {
        return Err(PlotError::parse(origin, 0, "no columns selected"));
    }

    Ok(TimeSeriesTable {
        source: origin.to_path_buf(),
        data: DMatrix::from_row_slice(rows, out_cols, &values),
    })
}

fn parse_field(field: &str, origin: &Path, line_no: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|_| {
        PlotError::parse(origin, line_no, format!("invalid number {:?}", field))
    })
}
