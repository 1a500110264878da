//! CSV tables of sequences annotated in place with predictions.
use anyhow::{anyhow, bail, Context, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_SEQUENCE_COLUMN: &str = "Sequences";
pub const DEFAULT_PREDICTION_COLUMN: &str = "DeepIEP";

/// Float formatting for written tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Full,
    Decimals(usize),
}

impl Precision {
    pub fn from_full_precision(full_precision: bool) -> Self {
        if full_precision {
            Precision::Full
        } else {
            Precision::Decimals(1)
        }
    }

    fn float_precision(&self) -> Option<usize> {
        match self {
            Precision::Full => None,
            Precision::Decimals(n) => Some(*n),
        }
    }
}

pub fn read_table<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("failed to read CSV {}", path.display()))?;
    debug!(path = %path.display(), rows = df.height(), "read table");
    Ok(df)
}

/// Sequences from `column`, in row order. Missing values are an error.
pub fn sequence_column(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let series = df
        .column(column)
        .with_context(|| format!("no column named {column:?}"))?
        .as_materialized_series()
        .cast(&DataType::String)?;
    series
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(str::to_string)
                .ok_or_else(|| anyhow!("row {row} has no value in column {column:?}"))
        })
        .collect()
}

/// Add `column` holding `values`, replacing a column of the same name.
pub fn set_prediction_column(df: &mut DataFrame, column: &str, values: Vec<f32>) -> Result<()> {
    if values.len() != df.height() {
        bail!(
            "{} predictions for {} rows in column {column:?}",
            values.len(),
            df.height()
        );
    }
    df.with_column(Series::new(column.into(), values))
        .with_context(|| format!("failed to set column {column:?}"))?;
    Ok(())
}

pub fn write_table<P: AsRef<Path>>(
    df: &mut DataFrame,
    path: P,
    precision: Precision,
) -> Result<()> {
    let path = path.as_ref();
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_float_precision(precision.float_precision())
        .finish(df)
        .with_context(|| format!("failed to write CSV {}", path.display()))?;
    debug!(path = %path.display(), ?precision, "wrote table");
    Ok(())
}
