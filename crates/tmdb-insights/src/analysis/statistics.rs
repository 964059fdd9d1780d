//! Column statistics computed with Polars.
//!
//! Missing and NaN values are skipped. Ties are resolved deterministically:
//! - rankings are a stable sort, so the earlier row wins,
//! - value counts keep the value seen first,
//! - grouped results are ordered by key, so the smaller key wins.

use crate::error::{InsightsError, Result};
use crate::types::Frequency;
use polars::prelude::*;

const POSITION: &str = "__position";
const COUNT: &str = "__count";

/// Aggregation applied to each group by [`grouped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Mean,
    Median,
    /// Non-null values in the group.
    Count,
}

impl Aggregate {
    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::Mean => "mean",
            Aggregate::Median => "median",
            Aggregate::Count => "count",
        }
    }
}

fn numeric(column: &str) -> Expr {
    col(column).cast(DataType::Float64)
}

fn non_nan(column: &str) -> Expr {
    numeric(column).filter(numeric(column).is_not_nan())
}

fn series(df: &DataFrame, name: &str) -> Result<Series> {
    Ok(df
        .column(name)
        .map_err(|_| InsightsError::ColumnNotFound(name.to_string()))?
        .as_materialized_series()
        .clone())
}

/// Positions of the `limit` rows with the largest values, descending.
pub fn top_n(df: &DataFrame, column: &str, limit: usize) -> Result<Vec<(usize, f64)>> {
    let ranked = df
        .clone()
        .lazy()
        .with_row_index(POSITION, None)
        .select([col(POSITION).cast(DataType::UInt64), numeric(column)])
        .filter(col(column).is_not_null().and(col(column).is_not_nan()))
        .sort(
            [column],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .limit(limit as IdxSize)
        .collect()?;

    let positions = series(&ranked, POSITION)?;
    let values = series(&ranked, column)?;
    Ok(positions
        .u64()?
        .into_iter()
        .zip(values.f64()?)
        .filter_map(|(row, value)| Some((row? as usize, value?)))
        .collect())
}

/// Largest value and the position holding it (first row on ties).
pub fn max_value(df: &DataFrame, column: &str) -> Result<Option<(f64, usize)>> {
    Ok(top_n(df, column, 1)?
        .into_iter()
        .next()
        .map(|(row, value)| (value, row)))
}

/// Occurrences of each value, most frequent first.
pub fn value_counts(df: &DataFrame, column: &str) -> Result<Vec<Frequency>> {
    let counts = df
        .clone()
        .lazy()
        .select([col(column).cast(DataType::String)])
        .filter(col(column).is_not_null())
        .group_by_stable([col(column)])
        .agg([len().alias(COUNT)])
        .sort(
            [COUNT],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let values = series(&counts, column)?;
    let totals = series(&counts, COUNT)?.cast(&DataType::UInt64)?;
    Ok(values
        .str()?
        .into_iter()
        .zip(totals.u64()?)
        .filter_map(|(value, count)| {
            Some(Frequency {
                value: value?.to_string(),
                count: count? as usize,
            })
        })
        .collect())
}

/// The most frequent value, if any value is present.
pub fn most_common(df: &DataFrame, column: &str) -> Result<Option<Frequency>> {
    Ok(value_counts(df, column)?.into_iter().next())
}

/// `column` aggregated per `key`, sorted by key.
///
/// The result has the `key` column and a Float64 `column`. Null keys and
/// groups whose aggregate is undefined are left out.
pub fn grouped(df: &DataFrame, key: &str, column: &str, aggregate: Aggregate) -> Result<DataFrame> {
    let agg = match aggregate {
        Aggregate::Mean => non_nan(column).mean(),
        Aggregate::Median => non_nan(column).median(),
        Aggregate::Count => col(column).count().cast(DataType::Float64),
    };

    Ok(df
        .clone()
        .lazy()
        .filter(col(key).is_not_null())
        .group_by_stable([col(key)])
        .agg([agg.alias(column)])
        .filter(col(column).is_not_null())
        .sort([key], SortMultipleOptions::default())
        .collect()?)
}

/// Rows of a [`grouped`] result as `(key, value)` with the key as text.
pub fn group_pairs(groups: &DataFrame, key: &str, column: &str) -> Result<Vec<(String, f64)>> {
    let keys = series(groups, key)?.cast(&DataType::String)?;
    let values = series(groups, column)?;
    Ok(keys
        .str()?
        .into_iter()
        .zip(values.f64()?)
        .filter_map(|(key, value)| Some((key?.to_string(), value?)))
        .collect())
}

/// Group with the largest aggregate; the smallest key wins ties.
///
/// The key is cast to `dtype` before it is read back.
pub fn max_group(
    groups: &DataFrame,
    key: &str,
    column: &str,
    dtype: &DataType,
) -> Result<Option<(AnyValue<'static>, f64)>> {
    let Some((value, row)) = max_value(groups, column)? else {
        return Ok(None);
    };
    let keys = series(groups, key)?.cast(dtype)?;
    Ok(Some((keys.get(row)?.into_static(), value)))
}

/// Pearson correlation over rows where both values are present.
///
/// `None` with fewer than two complete pairs or when either side is
/// constant.
pub fn pearson(df: &DataFrame, x: &str, y: &str) -> Result<Option<f64>> {
    let pairs = df
        .clone()
        .lazy()
        .select([numeric(x), numeric(y)])
        .filter(
            col(x)
                .is_not_null()
                .and(col(x).is_not_nan())
                .and(col(y).is_not_null())
                .and(col(y).is_not_nan()),
        )
        .collect()?;

    if pairs.height() < 2 {
        return Ok(None);
    }

    let xs = series(&pairs, x)?;
    let ys = series(&pairs, y)?;
    let corr = polars::prelude::cov::pearson_corr(xs.f64()?, ys.f64()?);
    Ok(corr.filter(|r| r.is_finite()))
}
