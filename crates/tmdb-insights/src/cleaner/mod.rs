//! Cleaning of the raw movie table.
//!
//! Steps, in order:
//! 0. Label each row with its position in the input (`input_row`)
//! 1. Remove exact duplicate rows (first occurrence kept, order preserved)
//! 2. Parse `release_date` (unparsable values become null)
//! 3. Drop rows without `overview` or `release_date`
//! 4. Impute zero/missing numeric values with the mean of positive values
//! 5. Drop rows whose list columns hold exactly `"[]"`
//!
//! Running the cleaner on its own output changes nothing.

pub(crate) mod dates;

use crate::config::{AnalysisConfig, ImputationRule, UndefinedMeanPolicy};
use crate::error::{InsightsError, Result, ResultExt};
use crate::imputers::PositiveMeanImputer;
use crate::types::{CleaningSummary, columns};
use crate::utils::{require_columns, string_values};
use polars::prelude::*;
use tracing::{debug, info};

/// The literal text of an empty serialized list.
pub const EMPTY_LIST_LITERAL: &str = "[]";

/// Data cleaner for the movie table.
pub struct MovieCleaner {
    imputation_rules: Vec<ImputationRule>,
    empty_list_columns: Vec<String>,
    undefined_mean_policy: UndefinedMeanPolicy,
}

impl MovieCleaner {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            imputation_rules: config.imputation_rules.clone(),
            empty_list_columns: config.empty_list_columns.clone(),
            undefined_mean_policy: config.undefined_mean_policy,
        }
    }

    /// Run every cleaning step and report what was removed or filled.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        let mut required = vec![columns::OVERVIEW, columns::RELEASE_DATE];
        required.extend(self.imputation_rules.iter().map(|r| r.column.as_str()));
        required.extend(self.empty_list_columns.iter().map(String::as_str));
        require_columns(&df, &required)?;

        let mut summary = CleaningSummary {
            rows_before: df.height(),
            ..Default::default()
        };

        info!("Cleaning {} rows...", df.height());

        let df = label_input_rows(df)?;

        // 1. Remove duplicate rows
        let before = df.height();
        let df = remove_duplicates(df)?;
        summary.duplicates_removed = before - df.height();
        debug!("Removed {} duplicate rows", summary.duplicates_removed);

        // 2. Parse release dates
        let mut df = df;
        summary.unparsable_dates = parse_release_dates(&mut df)?;
        if summary.unparsable_dates > 0 {
            debug!(
                "{} release dates could not be parsed",
                summary.unparsable_dates
            );
        }

        // 3. Drop rows missing essential fields
        let before = df.height();
        let mut df = drop_missing_essentials(df)?;
        summary.missing_essentials_removed = before - df.height();
        debug!(
            "Removed {} rows without overview or release date",
            summary.missing_essentials_removed
        );

        // 4. Impute invalid numeric values
        for rule in &self.imputation_rules {
            match PositiveMeanImputer::apply(&mut df, rule, self.undefined_mean_policy)
                .context(format!("Imputing '{}'", rule.column))?
            {
                Some(record) => summary.imputations.push(record),
                None => summary.skipped_imputations.push(rule.column.clone()),
            }
        }

        // 5. Drop rows with empty serialized lists
        let before = df.height();
        let df = drop_empty_lists(df, &self.empty_list_columns)?;
        summary.empty_lists_removed = before - df.height();
        debug!(
            "Removed {} rows with an empty list in {:?}",
            summary.empty_lists_removed, self.empty_list_columns
        );

        summary.rows_after = df.height();
        info!(
            "Cleaning complete: {} -> {} rows",
            summary.rows_before, summary.rows_after
        );

        Ok((df, summary))
    }
}

/// Add the [`columns::INPUT_ROW`] label unless an earlier run already did.
pub fn label_input_rows(df: DataFrame) -> Result<DataFrame> {
    if df.column(columns::INPUT_ROW).is_ok() {
        return Ok(df);
    }
    Ok(df.with_row_index(columns::INPUT_ROW.into(), None)?)
}

/// Drop exact duplicate rows, keeping the first and the table order.
///
/// The `input_row` label never makes two rows distinct.
pub fn remove_duplicates(df: DataFrame) -> Result<DataFrame> {
    let subset: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != columns::INPUT_ROW)
        .map(|name| name.to_string())
        .collect();
    Ok(df.unique_stable(Some(subset.as_slice()), UniqueKeepStrategy::First, None)?)
}

/// Convert `release_date` to a date column; returns the unparsable count.
pub fn parse_release_dates(df: &mut DataFrame) -> Result<usize> {
    let raw = df
        .column(columns::RELEASE_DATE)
        .map_err(|_| InsightsError::ColumnNotFound(columns::RELEASE_DATE.to_string()))?
        .as_materialized_series()
        .clone();
    let (parsed, unparsable) = dates::to_date_series(&raw)?;
    df.replace(columns::RELEASE_DATE, parsed)?;
    Ok(unparsable)
}

/// Keep only rows with both an overview and a release date.
pub fn drop_missing_essentials(df: DataFrame) -> Result<DataFrame> {
    let overview = df
        .column(columns::OVERVIEW)
        .map_err(|_| InsightsError::ColumnNotFound(columns::OVERVIEW.to_string()))?
        .as_materialized_series()
        .is_not_null();
    let release_date = df
        .column(columns::RELEASE_DATE)
        .map_err(|_| InsightsError::ColumnNotFound(columns::RELEASE_DATE.to_string()))?
        .as_materialized_series()
        .is_not_null();

    let mask = &overview & &release_date;
    Ok(df.filter(&mask)?)
}

/// Drop rows where any of `list_columns` is exactly `"[]"`.
///
/// Null cells and other spellings of an empty list (`"[ ]"`) are kept.
pub fn drop_empty_lists(df: DataFrame, list_columns: &[String]) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];
    for col_name in list_columns {
        for (flag, value) in keep.iter_mut().zip(string_values(&df, col_name)?) {
            if value.as_deref() == Some(EMPTY_LIST_LITERAL) {
                *flag = false;
            }
        }
    }

    let mask: BooleanChunked = keep.into_iter().collect();
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_movies() -> DataFrame {
        df![
            "original_title" => ["A", "B", "B", "C", "D", "E"],
            "overview" => [Some("a"), Some("b"), Some("b"), None, Some("d"), Some("e")],
            "release_date" => [Some("2000-01-01"), Some("2001-02-03"), Some("2001-02-03"), Some("2002-01-01"), Some("bad"), Some("2003-03-03")],
            "budget" => [0i64, 100, 100, 50, 10, 200],
            "revenue" => [10i64, 0, 0, 5, 1, 30],
            "vote_count" => [1i64, 2, 2, 3, 4, 0],
            "vote_average" => [5.0f64, 0.0, 0.0, 7.0, 6.0, 8.0],
            "runtime" => [Some(100.0f64), None, None, Some(90.0), Some(80.0), Some(120.0)],
            "genres" => ["[{\"id\": 1, \"name\": \"Action\"}]", "[{\"id\": 2, \"name\": \"Drama\"}]", "[{\"id\": 2, \"name\": \"Drama\"}]", "[]", "[]", "[]"],
            "keywords" => ["[{\"id\": 9, \"name\": \"k\"}]", "[{\"id\": 9, \"name\": \"k\"}]", "[{\"id\": 9, \"name\": \"k\"}]", "[]", "[]", "[{\"id\": 9, \"name\": \"k\"}]"],
            "production_companies" => ["[{\"id\": 3, \"name\": \"P\"}]", "[{\"id\": 3, \"name\": \"P\"}]", "[{\"id\": 3, \"name\": \"P\"}]", "[]", "[]", "[{\"id\": 3, \"name\": \"P\"}]"],
        ]
        .unwrap()
    }

    fn cleaner() -> MovieCleaner {
        MovieCleaner::new(&AnalysisConfig::default())
    }

    #[test]
    fn test_remove_duplicates_keeps_order() {
        let df = df![
            "title" => ["x", "y", "x", "z", "y"],
            "n" => [1i64, 2, 1, 3, 2],
        ]
        .unwrap();
        let deduped = remove_duplicates(df).unwrap();
        assert_eq!(
            string_values(&deduped, "title").unwrap(),
            vec![Some("x".to_string()), Some("y".to_string()), Some("z".to_string())]
        );
    }

    #[test]
    fn test_duplicates_ignore_input_row_label() {
        let df = label_input_rows(df!["title" => ["x", "x", "y"]].unwrap()).unwrap();
        let deduped = remove_duplicates(df).unwrap();
        let labels: Vec<Option<IdxSize>> = deduped
            .column(columns::INPUT_ROW)
            .unwrap()
            .as_materialized_series()
            .idx()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some(0), Some(2)]);
    }

    #[test]
    fn test_drop_missing_essentials() {
        let mut df = df![
            "overview" => [Some("a"), None, Some("c")],
            "release_date" => [Some("2000-01-01"), Some("2000-01-01"), Some("nope")],
        ]
        .unwrap();
        let unparsable = parse_release_dates(&mut df).unwrap();
        assert_eq!(unparsable, 1);

        let kept = drop_missing_essentials(df).unwrap();
        assert_eq!(kept.height(), 1);
    }

    #[test]
    fn test_drop_empty_lists_exact_literal_only() {
        let df = df![
            "genres" => [Some("[]"), Some("[ ]"), None, Some("[{'name': 'A'}]")],
        ]
        .unwrap();
        let kept = drop_empty_lists(df, &["genres".to_string()]).unwrap();
        assert_eq!(kept.height(), 3);
    }

    #[test]
    fn test_single_empty_genre_row_is_dropped() {
        let df = df!["genres" => ["[]"]].unwrap();
        let kept = drop_empty_lists(df, &["genres".to_string()]).unwrap();
        assert_eq!(kept.height(), 0);
    }

    #[test]
    fn test_clean_full_summary() {
        let (df, summary) = cleaner().clean(raw_movies()).unwrap();

        assert_eq!(summary.rows_before, 6);
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(summary.unparsable_dates, 1);
        // C lacks an overview, D has an unparsable date
        assert_eq!(summary.missing_essentials_removed, 2);
        // E has empty genres
        assert_eq!(summary.empty_lists_removed, 1);
        assert_eq!(summary.rows_after, 2);
        assert_eq!(df.height(), 2);

        assert_eq!(
            string_values(&df, "original_title").unwrap(),
            vec![Some("A".to_string()), Some("B".to_string())]
        );

        let labels: Vec<Option<IdxSize>> = df
            .column(columns::INPUT_ROW)
            .unwrap()
            .as_materialized_series()
            .idx()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(labels, vec![Some(0), Some(1)]);

        // budget positives among A, B, E: 100, 200 -> mean 150
        assert_eq!(summary.fill_value("budget"), Some(150.0));
        assert_eq!(df.column("release_date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn test_clean_leaves_no_zero_or_null_in_imputed_columns() {
        let (df, _) = cleaner().clean(raw_movies()).unwrap();
        for rule in &AnalysisConfig::default().imputation_rules {
            let values = crate::utils::float_column(&df, &rule.column).unwrap();
            assert!(
                values.into_iter().all(|v| matches!(v, Some(x) if x != 0.0)),
                "column {} still has zero or missing values",
                rule.column
            );
        }
    }

    #[test]
    fn test_clean_is_idempotent() {
        let (once, _) = cleaner().clean(raw_movies()).unwrap();
        let (twice, summary) = cleaner().clean(once.clone()).unwrap();

        assert_eq!(summary.rows_removed(), 0);
        assert!(summary.imputations.iter().all(|r| r.replaced == 0));
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn test_clean_requires_columns() {
        let df = df!["overview" => ["x"]].unwrap();
        let err = cleaner().clean(df).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
