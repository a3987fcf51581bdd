//! Raw rows -> engineered feature matrix
//!
//! The one transformation shared by training and inference. Fit freezes the
//! scaler parameters and the engineered column order; transform reproduces the
//! exact same columns for any batch composition, including a single row that
//! carries only one product type.

use crate::error::{FailsenseError, Result};
use crate::schema::{self, ProductType, NUMERIC_COLUMNS, TYPE_COLUMN};
use super::scaler::StandardScaler;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Feature transformer with frozen state after fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTransformer {
    scaler: StandardScaler,
    feature_columns: Vec<String>,
    is_fitted: bool,
}

impl Default for FeatureTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureTransformer {
    pub fn new() -> Self {
        Self {
            scaler: StandardScaler::new(),
            feature_columns: Vec::new(),
            is_fitted: false,
        }
    }

    /// Rebuild a transformer from persisted parts. The column list must match
    /// the scaler it was fitted with; both come out of the artifact store.
    pub fn from_parts(scaler: StandardScaler, feature_columns: Vec<String>) -> Result<Self> {
        if !scaler.is_fitted() {
            return Err(FailsenseError::ModelNotFitted);
        }
        if feature_columns.is_empty() {
            return Err(FailsenseError::PreprocessingError(
                "empty feature column list".to_string(),
            ));
        }
        Ok(Self {
            scaler,
            feature_columns,
            is_fitted: true,
        })
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// The frozen engineered column order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Fingerprint of the frozen column list, embedded in artifacts.
    pub fn fingerprint(&self) -> String {
        schema::schema_fingerprint(&self.feature_columns)
    }

    /// Fit to a raw feature frame. Requires every schema feature column;
    /// rejects product types outside the fixed domain.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        for col in NUMERIC_COLUMNS {
            if df.column(col).is_err() {
                return Err(FailsenseError::FeatureNotFound(col.to_string()));
            }
        }
        validate_type_column(df)?;

        let df = cast_numeric_to_f64(df)?;
        let numeric: Vec<&str> = NUMERIC_COLUMNS.to_vec();
        self.scaler.fit(&df, &numeric)?;

        // The column order is a schema constant, never inferred from data.
        self.feature_columns = schema::engineered_columns();
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a raw feature frame into the engineered layout.
    ///
    /// Indicator columns are built from the fixed domain, so categories absent
    /// from this batch still get their all-zero column. The output is then
    /// reindexed to the frozen column list: engineered columns missing from
    /// the input are zero-filled, anything else (target, ids) is dropped.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(FailsenseError::ModelNotFitted);
        }

        let df = &cast_numeric_to_f64(df)?;
        let mut result = self.scaler.transform(df)?;

        if df.column(TYPE_COLUMN).is_ok() {
            validate_type_column(df)?;
            for indicator in self.encode_type(df)? {
                result = result
                    .with_column(indicator)
                    .map_err(|e| FailsenseError::DataError(e.to_string()))?
                    .clone();
            }
        }

        self.reindex(&result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Extract an engineered frame into a row-major matrix, in the frozen
    /// column order.
    pub fn to_matrix(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(FailsenseError::ModelNotFitted);
        }
        columns_to_array2(df, &self.feature_columns)
    }

    /// One binary column per product type, in `ProductType::ALL` order.
    fn encode_type(&self, df: &DataFrame) -> Result<Vec<Series>> {
        let column = df
            .column(TYPE_COLUMN)
            .map_err(|_| FailsenseError::FeatureNotFound(TYPE_COLUMN.to_string()))?;
        let ca = column
            .str()
            .map_err(|e| FailsenseError::DataError(e.to_string()))?;

        let mut indicators = Vec::with_capacity(ProductType::ALL.len());
        for variant in ProductType::ALL {
            let values: Vec<i32> = ca
                .into_iter()
                .map(|v| if v == Some(variant.as_str()) { 1 } else { 0 })
                .collect();
            indicators.push(Series::new(variant.indicator_column().into(), values));
        }
        Ok(indicators)
    }

    /// Select exactly the frozen columns, zero-filling any that are missing.
    fn reindex(&self, df: &DataFrame) -> Result<DataFrame> {
        let height = df.height();
        let columns: Vec<Column> = self
            .feature_columns
            .iter()
            .map(|name| match df.column(name) {
                Ok(col) => col.clone(),
                Err(_) => Column::new(name.as_str().into(), vec![0.0f64; height]),
            })
            .collect();

        DataFrame::new(columns).map_err(|e| FailsenseError::DataError(e.to_string()))
    }
}

/// Cast the schema's numeric feature columns to Float64 so integer-typed CSV
/// columns (e.g. rotational speed) scale like any other numeric.
fn cast_numeric_to_f64(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for col_name in NUMERIC_COLUMNS {
        let Ok(column) = df.column(col_name) else {
            continue;
        };
        if column.dtype() == &DataType::Float64 {
            continue;
        }
        let casted = column
            .cast(&DataType::Float64)
            .map_err(|e| FailsenseError::DataError(e.to_string()))?;
        result = result
            .with_column(casted)
            .map_err(|e| FailsenseError::DataError(e.to_string()))?
            .clone();
    }
    Ok(result)
}

/// Every product type value must parse into the fixed domain; nulls and
/// unknown codes are rejected before they can silently become all-zero rows.
fn validate_type_column(df: &DataFrame) -> Result<()> {
    let column = df
        .column(TYPE_COLUMN)
        .map_err(|_| FailsenseError::FeatureNotFound(TYPE_COLUMN.to_string()))?;
    let ca = column
        .str()
        .map_err(|e| FailsenseError::DataError(e.to_string()))?;

    for value in ca.into_iter() {
        match value {
            Some(s) => {
                s.parse::<ProductType>()?;
            }
            None => {
                return Err(FailsenseError::ValidationError(format!(
                    "null value in '{TYPE_COLUMN}' column"
                )));
            }
        }
    }
    Ok(())
}

/// Extract named columns from a DataFrame into a row-major Array2<f64>.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| FailsenseError::FeatureNotFound(col_name.clone()))?;
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| FailsenseError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| FailsenseError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}
