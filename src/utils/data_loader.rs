//! Data loading and cleaning utilities

use crate::error::{FailsenseError, Result};
use crate::schema::{COLUMN_RENAMES, NUMERIC_COLUMNS, TYPE_COLUMN};
use polars::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Loader for the machine failure dataset
pub struct DataLoader {
    infer_schema_rows: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_rows: 100,
        }
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let file = File::open(path).map_err(|e| {
            FailsenseError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let reader = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_rows))
            .into_reader_with_file_handle(file);

        reader
            .finish()
            .map_err(|e| FailsenseError::DataError(e.to_string()))
    }

    /// Load the dataset and apply the cleaning steps the pipeline expects:
    /// standardize column names, drop duplicate rows, and impute missing
    /// values (mean for numerics, mode for the product type).
    pub fn load_and_clean(&self, path: &Path) -> Result<DataFrame> {
        info!(path = %path.display(), "reading dataset");
        let mut df = self.load_csv(path)?;
        info!(rows = df.height(), cols = df.width(), "initial shape");

        df = rename_columns(df)?;
        df = drop_duplicates(df)?;
        df = impute_missing(df)?;

        info!(rows = df.height(), cols = df.width(), "cleaning complete");
        Ok(df)
    }
}

/// Standardize dataset headers to the schema's column names. Columns already
/// standardized are left as-is.
fn rename_columns(mut df: DataFrame) -> Result<DataFrame> {
    for (from, to) in COLUMN_RENAMES {
        if df.column(from).is_ok() {
            df.rename(from, to.into())
                .map_err(|e| FailsenseError::DataError(e.to_string()))?;
        }
    }
    Ok(df)
}

fn drop_duplicates(df: DataFrame) -> Result<DataFrame> {
    let before = df.height();
    let deduped = df
        .unique_stable(None, UniqueKeepStrategy::First, None)
        .map_err(|e| FailsenseError::DataError(e.to_string()))?;

    let dropped = before - deduped.height();
    if dropped > 0 {
        info!(dropped, "dropped duplicate rows");
    }
    Ok(deduped)
}

/// Mean-impute missing numeric features, mode-impute a missing product type.
fn impute_missing(df: DataFrame) -> Result<DataFrame> {
    let mut result = df;

    for col_name in NUMERIC_COLUMNS {
        let Ok(column) = result.column(col_name) else {
            continue;
        };
        if column.null_count() == 0 {
            continue;
        }

        let series = column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| FailsenseError::DataError(e.to_string()))?;
        let ca = series
            .f64()
            .map_err(|e| FailsenseError::DataError(e.to_string()))?;
        let mean = ca.mean().unwrap_or(0.0);

        let filled: Float64Chunked = ca
            .into_iter()
            .map(|opt| Some(opt.unwrap_or(mean)))
            .collect();

        info!(column = col_name, fill = mean, "imputed missing numerics with mean");
        result = result
            .with_column(filled.with_name(col_name.into()).into_series())
            .map_err(|e| FailsenseError::DataError(e.to_string()))?
            .clone();
    }

    if let Ok(column) = result.column(TYPE_COLUMN) {
        if column.null_count() > 0 {
            let series = column.as_materialized_series();
            let ca = series
                .str()
                .map_err(|e| FailsenseError::DataError(e.to_string()))?;

            let mut counts: HashMap<String, usize> = HashMap::new();
            for val in ca.into_iter().flatten() {
                *counts.entry(val.to_string()).or_insert(0) += 1;
            }
            let mode = counts
                .into_iter()
                .max_by_key(|(_, count)| *count)
                .map(|(k, _)| k)
                .unwrap_or_default();

            let filled: StringChunked = ca
                .into_iter()
                .map(|opt| Some(opt.unwrap_or(mode.as_str()).to_string()))
                .collect();

            info!(column = TYPE_COLUMN, fill = %mode, "imputed missing product types with mode");
            result = result
                .with_column(filled.with_name(TYPE_COLUMN.into()).into_series())
                .map_err(|e| FailsenseError::DataError(e.to_string()))?
                .clone();
        }
    }

    Ok(result)
}
