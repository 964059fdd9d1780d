//! Mean-of-positive-values imputation.
//!
//! Zero and missing cells in budget-like columns mean "unknown" rather than
//! "nothing", so they are replaced with the mean of the strictly positive
//! values of the same column.

use crate::config::{ImputationRule, UndefinedMeanPolicy};
use crate::error::{InsightsError, Result};
use crate::types::ImputationRecord;
use crate::utils::{float_column, round_half_even};
use polars::prelude::*;
use tracing::{debug, warn};

/// Replaces missing and zero values with the mean of positive values.
pub struct PositiveMeanImputer;

impl PositiveMeanImputer {
    /// Mean over values strictly greater than zero, `None` if there are none.
    pub fn positive_mean(values: &Float64Chunked) -> Result<Option<f64>> {
        Ok(values.filter(&values.gt(0.0))?.mean())
    }

    /// Impute one column in place.
    ///
    /// Returns `Ok(None)` when the column has no positive values and the
    /// policy is [`UndefinedMeanPolicy::Skip`].
    pub fn apply(
        df: &mut DataFrame,
        rule: &ImputationRule,
        policy: UndefinedMeanPolicy,
    ) -> Result<Option<ImputationRecord>> {
        let col_name = rule.column.as_str();
        let values = float_column(df, col_name)?;

        let Some(mean) = Self::positive_mean(&values)? else {
            return match policy {
                UndefinedMeanPolicy::Fail => Err(InsightsError::NoValidValues(rule.column.clone())),
                UndefinedMeanPolicy::Skip => {
                    warn!(
                        "No positive values in '{}'; leaving the column untouched",
                        col_name
                    );
                    Ok(None)
                }
            };
        };

        let fill_value = if rule.round_to_int {
            round_half_even(mean)
        } else {
            mean
        };

        let missing = values.fill_null_with_values(0.0)?.equal(0.0);
        let replaced = missing.sum().unwrap_or(0) as usize;
        let filled = values
            .set(&missing, Some(fill_value))?
            .with_name(col_name.into());

        // Rounded columns hold counts and amounts; keep them integral unless
        // the source already carried fractions.
        let all_integral = filled.into_no_null_iter().all(|v| v.fract() == 0.0);
        let series = if rule.round_to_int && all_integral {
            filled.into_series().cast(&DataType::Int64)?
        } else {
            filled.into_series()
        };
        df.replace(col_name, series)?;

        debug!(
            "Filled {} cells of '{}' with positive mean {:.2}",
            replaced, col_name, fill_value
        );

        Ok(Some(ImputationRecord {
            column: rule.column.clone(),
            fill_value,
            rounded: rule.round_to_int,
            replaced,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget_rule() -> ImputationRule {
        ImputationRule::new("budget", true)
    }

    #[test]
    fn test_positive_mean_ignores_zero_negative_and_missing() {
        let values = Float64Chunked::new(
            "budget".into(),
            &[Some(0.0), Some(100.0), Some(200.0), None, Some(-50.0)],
        );
        assert_eq!(
            PositiveMeanImputer::positive_mean(&values).unwrap(),
            Some(150.0)
        );
    }

    #[test]
    fn test_positive_mean_undefined() {
        let zeros = Float64Chunked::new("budget".into(), &[Some(0.0), None]);
        assert_eq!(PositiveMeanImputer::positive_mean(&zeros).unwrap(), None);

        let empty = Float64Chunked::new("budget".into(), &[] as &[Option<f64>]);
        assert_eq!(PositiveMeanImputer::positive_mean(&empty).unwrap(), None);
    }

    #[test]
    fn test_apply_replaces_zero_and_missing_with_rounded_mean() {
        let mut df = df![
            "budget" => [Some(0.0), Some(100.0), Some(200.0), None],
        ]
        .unwrap();

        let record = PositiveMeanImputer::apply(&mut df, &budget_rule(), UndefinedMeanPolicy::Fail)
            .unwrap()
            .unwrap();

        assert_eq!(record.fill_value, 150.0);
        assert_eq!(record.replaced, 2);

        let column = df.column("budget").unwrap();
        assert_eq!(column.dtype(), &DataType::Int64);
        let values: Vec<Option<i64>> = column
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(150), Some(100), Some(200), Some(150)]);
    }

    #[test]
    fn test_apply_rounds_half_to_even() {
        let mut df = df!["vote_count" => [0i64, 1, 2, 3, 4]].unwrap();
        // mean of 1..=4 is 2.5, rounds to 2
        let rule = ImputationRule::new("vote_count", true);
        let record = PositiveMeanImputer::apply(&mut df, &rule, UndefinedMeanPolicy::Fail)
            .unwrap()
            .unwrap();
        assert_eq!(record.fill_value, 2.0);
    }

    #[test]
    fn test_apply_unrounded_keeps_float() {
        let mut df = df!["runtime" => [Some(90.0), Some(0.0), Some(125.0), None]].unwrap();
        let rule = ImputationRule::new("runtime", false);
        let record = PositiveMeanImputer::apply(&mut df, &rule, UndefinedMeanPolicy::Fail)
            .unwrap()
            .unwrap();

        assert_eq!(record.fill_value, 107.5);
        let column = df.column("runtime").unwrap();
        assert_eq!(column.dtype(), &DataType::Float64);
        assert_eq!(column.null_count(), 0);
    }

    #[test]
    fn test_apply_fails_without_positive_values() {
        let mut df = df!["budget" => [0i64, 0, 0]].unwrap();
        let err = PositiveMeanImputer::apply(&mut df, &budget_rule(), UndefinedMeanPolicy::Fail)
            .unwrap_err();
        assert_eq!(err.error_code(), "NO_VALID_VALUES");
    }

    #[test]
    fn test_apply_skip_policy_leaves_column() {
        let mut df = df!["budget" => [0i64, 0]].unwrap();
        let record =
            PositiveMeanImputer::apply(&mut df, &budget_rule(), UndefinedMeanPolicy::Skip).unwrap();
        assert!(record.is_none());
        assert_eq!(df.column("budget").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut df = df!["budget" => [Some(0.0), Some(100.0), Some(201.0), None]].unwrap();
        PositiveMeanImputer::apply(&mut df, &budget_rule(), UndefinedMeanPolicy::Fail).unwrap();
        let first = df.clone();

        let record = PositiveMeanImputer::apply(&mut df, &budget_rule(), UndefinedMeanPolicy::Fail)
            .unwrap()
            .unwrap();
        assert_eq!(record.replaced, 0);
        assert!(df.equals_missing(&first));
    }
}
