//! Shared helpers for reading typed values out of a DataFrame and for
//! formatting numbers in the report.

use crate::error::{InsightsError, Result};
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Fail with `ColumnNotFound` for the first of `names` missing from `df`.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for name in names {
        if !present.iter().any(|p| p == name) {
            return Err(InsightsError::ColumnNotFound(name.to_string()));
        }
    }
    Ok(())
}

fn materialized(df: &DataFrame, name: &str) -> Result<Series> {
    let column = df
        .column(name)
        .map_err(|_| InsightsError::ColumnNotFound(name.to_string()))?;
    Ok(column.as_materialized_series().clone())
}

// =============================================================================
// Column Readers
// =============================================================================

/// Read a column as `Float64`. Text that does not parse and NaN become null.
pub fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let series = materialized(df, name)?;
    let floats = series
        .cast(&DataType::Float64)
        .map_err(|e| InsightsError::column_type(name, "Float64", e))?;
    let chunked = floats
        .f64()
        .map_err(|e| InsightsError::column_type(name, "Float64", e))?;

    Ok(chunked.apply(|v| v.filter(|x| !x.is_nan())))
}

/// Read a column as owned strings, keeping nulls.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = materialized(df, name)?;
    let strings = series
        .cast(&DataType::String)
        .map_err(|e| InsightsError::column_type(name, "String", e))?;
    let chunked = strings
        .str()
        .map_err(|e| InsightsError::column_type(name, "String", e))?;

    Ok(chunked
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

// =============================================================================
// Numbers
// =============================================================================

/// Round half to even, as Python's `round` does.
#[inline]
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Round to `decimals` places, half to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    round_half_even(value * factor) / factor
}

/// Format a float the way Python prints one: whole numbers keep a `.0`.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Format an integral value without a decimal point.
pub fn format_integer(value: f64) -> String {
    format!("{}", round_half_even(value) as i64)
}
