//! Input schema: raw column names, the product-type domain, and the frozen
//! engineered column order shared by training and inference.

use crate::error::{FailsenseError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standardized numeric feature columns, in matrix order.
pub const NUMERIC_COLUMNS: [&str; 5] = [
    "Air_temperature_K",
    "Process_temperature_K",
    "Rotational_speed_rpm",
    "Torque_Nm",
    "Tool_wear_min",
];

/// Categorical product-type column.
pub const TYPE_COLUMN: &str = "Type";

/// Binary target column.
pub const TARGET_COLUMN: &str = "Machine failure";

/// Dataset header -> standardized name pairs applied on load.
pub const COLUMN_RENAMES: [(&str, &str); 5] = [
    ("Air temperature [K]", "Air_temperature_K"),
    ("Process temperature [K]", "Process_temperature_K"),
    ("Rotational speed [rpm]", "Rotational_speed_rpm"),
    ("Torque [Nm]", "Torque_Nm"),
    ("Tool wear [min]", "Tool_wear_min"),
];

/// Valid sensor ranges (inclusive), matching the input form limits.
pub const AIR_TEMP_RANGE: (f64, f64) = (250.0, 400.0);
pub const PROCESS_TEMP_RANGE: (f64, f64) = (250.0, 500.0);
pub const SPEED_RANGE: (f64, f64) = (100.0, 3000.0);
pub const TORQUE_RANGE: (f64, f64) = (0.0, 100.0);
pub const WEAR_RANGE: (f64, f64) = (0.0, 250.0);

/// Product quality variant. Declaration order is the indicator column order
/// and must never change: it is frozen into persisted artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    L,
    M,
    H,
}

impl ProductType {
    /// All variants, in the frozen indicator order.
    pub const ALL: [ProductType; 3] = [ProductType::L, ProductType::M, ProductType::H];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::L => "L",
            ProductType::M => "M",
            ProductType::H => "H",
        }
    }

    /// Name of the one-hot indicator column for this variant.
    pub fn indicator_column(&self) -> String {
        format!("{}_{}", TYPE_COLUMN, self.as_str())
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = FailsenseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "L" => Ok(ProductType::L),
            "M" => Ok(ProductType::M),
            "H" => Ok(ProductType::H),
            other => Err(FailsenseError::UnknownProductType(other.to_string())),
        }
    }
}

/// The frozen engineered column order: numeric features first, then one
/// indicator per product type in `ProductType::ALL` order.
pub fn engineered_columns() -> Vec<String> {
    let mut cols: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    cols.extend(ProductType::ALL.iter().map(|t| t.indicator_column()));
    cols
}

/// Deterministic fingerprint of an engineered column list, embedded in every
/// persisted artifact so a stale artifact is rejected instead of silently
/// producing wrong predictions.
pub fn schema_fingerprint(columns: &[String]) -> String {
    format!("{}:{}", columns.len(), columns.join("|"))
}

/// One machine observation. Immutable once constructed; the optional label is
/// present for training data and absent for inference input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub air_temperature_k: f64,
    pub process_temperature_k: f64,
    pub rotational_speed_rpm: f64,
    pub torque_nm: f64,
    pub tool_wear_min: f64,
    pub product_type: ProductType,
    pub machine_failure: Option<f64>,
}

impl RawRecord {
    pub fn new(
        air_temperature_k: f64,
        process_temperature_k: f64,
        rotational_speed_rpm: f64,
        torque_nm: f64,
        tool_wear_min: f64,
        product_type: ProductType,
    ) -> Self {
        Self {
            air_temperature_k,
            process_temperature_k,
            rotational_speed_rpm,
            torque_nm,
            tool_wear_min,
            product_type,
            machine_failure: None,
        }
    }

    /// Reject sensor values outside their documented ranges before they reach
    /// the transformer.
    pub fn validate(&self) -> Result<()> {
        check_range("Air_temperature_K", self.air_temperature_k, AIR_TEMP_RANGE)?;
        check_range(
            "Process_temperature_K",
            self.process_temperature_k,
            PROCESS_TEMP_RANGE,
        )?;
        check_range("Rotational_speed_rpm", self.rotational_speed_rpm, SPEED_RANGE)?;
        check_range("Torque_Nm", self.torque_nm, TORQUE_RANGE)?;
        check_range("Tool_wear_min", self.tool_wear_min, WEAR_RANGE)?;
        Ok(())
    }

    /// Build a raw-feature DataFrame from a batch of records, with the schema
    /// column names the transformer expects. A batch of one is not special.
    pub fn to_dataframe(records: &[RawRecord]) -> Result<DataFrame> {
        let air: Vec<f64> = records.iter().map(|r| r.air_temperature_k).collect();
        let proc: Vec<f64> = records.iter().map(|r| r.process_temperature_k).collect();
        let speed: Vec<f64> = records.iter().map(|r| r.rotational_speed_rpm).collect();
        let torque: Vec<f64> = records.iter().map(|r| r.torque_nm).collect();
        let wear: Vec<f64> = records.iter().map(|r| r.tool_wear_min).collect();
        let ptype: Vec<&str> = records.iter().map(|r| r.product_type.as_str()).collect();

        DataFrame::new(vec![
            Column::new(NUMERIC_COLUMNS[0].into(), air),
            Column::new(NUMERIC_COLUMNS[1].into(), proc),
            Column::new(NUMERIC_COLUMNS[2].into(), speed),
            Column::new(NUMERIC_COLUMNS[3].into(), torque),
            Column::new(NUMERIC_COLUMNS[4].into(), wear),
            Column::new(TYPE_COLUMN.into(), ptype),
        ])
        .map_err(|e| FailsenseError::DataError(e.to_string()))
    }
}

fn check_range(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<()> {
    if !value.is_finite() || value < lo || value > hi {
        return Err(FailsenseError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: format!("expected a value in [{lo}, {hi}]"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_order_is_frozen() {
        let cols = engineered_columns();
        assert_eq!(cols.len(), 8);
        assert_eq!(cols[5], "Type_L");
        assert_eq!(cols[6], "Type_M");
        assert_eq!(cols[7], "Type_H");
    }

    #[test]
    fn test_product_type_parse() {
        assert_eq!("L".parse::<ProductType>().unwrap(), ProductType::L);
        assert_eq!(" H ".parse::<ProductType>().unwrap(), ProductType::H);
        assert!("X".parse::<ProductType>().is_err());
        assert!("".parse::<ProductType>().is_err());
    }

    #[test]
    fn test_fingerprint_changes_with_order() {
        let a = schema_fingerprint(&["a".to_string(), "b".to_string()]);
        let b = schema_fingerprint(&["b".to_string(), "a".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_record_validation() {
        let mut record = RawRecord::new(298.0, 308.6, 1551.0, 42.8, 0.0, ProductType::L);
        assert!(record.validate().is_ok());

        record.air_temperature_k = 200.0;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_records_to_dataframe() {
        let records = vec![
            RawRecord::new(298.0, 308.6, 1551.0, 42.8, 0.0, ProductType::L),
            RawRecord::new(300.1, 310.2, 1400.0, 50.3, 120.0, ProductType::H),
        ];
        let df = RawRecord::to_dataframe(&records).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);
        assert!(df.column(TYPE_COLUMN).is_ok());
    }
}
