//! Derived columns for the nested list fields.
//!
//! `genres` and `production_companies` hold serialized lists of
//! `{id, name}` objects. The name of the first element is used as a single
//! valued stand-in for the whole list (`main_genre`, `main_company`).
//!
//! Every way the value can fail to yield a name is treated the same: the
//! derived cell is null. The reason is only counted in the
//! [`ExtractionSummary`].

mod literal;

pub use literal::{LiteralError, parse_literal};

use crate::cleaner::dates;
use crate::error::{InsightsError, Result};
use crate::types::{ExtractionSummary, columns};
use crate::utils::string_values;
use polars::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

/// Outcome of extracting the first name from one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstName {
    Found(String),
    /// The cell was null.
    Missing,
    /// Parsed, but not a non-empty list.
    NotAList,
    /// Not a valid literal.
    Malformed,
    /// The first element is not an object with a usable `name`.
    MissingName,
}

impl FirstName {
    pub fn into_option(self) -> Option<String> {
        match self {
            FirstName::Found(name) => Some(name),
            _ => None,
        }
    }
}

/// Name of the first object of a serialized list.
pub fn first_name(raw: &str) -> FirstName {
    let parsed = match parse_literal(raw) {
        Ok(value) => value,
        Err(_) => return FirstName::Malformed,
    };

    let first = match parsed {
        Value::Array(items) => match items.into_iter().next() {
            Some(item) => item,
            None => return FirstName::NotAList,
        },
        _ => return FirstName::NotAList,
    };

    match first {
        Value::Object(mut object) => match object.remove("name") {
            Some(Value::String(name)) => FirstName::Found(name),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => {
                FirstName::Found(scalar.to_string())
            }
            _ => FirstName::MissingName,
        },
        _ => FirstName::MissingName,
    }
}

/// Adds `main_genre`, `main_company` and `release_year`.
pub struct ListExtractor;

impl ListExtractor {
    /// Run every extraction on the cleaned table.
    pub fn extract_all(mut df: DataFrame) -> Result<(DataFrame, Vec<ExtractionSummary>)> {
        info!("Extracting main genre, main company and release year...");

        let summaries = vec![
            Self::extract_first_names(&mut df, columns::GENRES, columns::MAIN_GENRE)?,
            Self::extract_first_names(
                &mut df,
                columns::PRODUCTION_COMPANIES,
                columns::MAIN_COMPANY,
            )?,
        ];
        Self::add_release_year(&mut df)?;

        Ok((df, summaries))
    }

    /// Add `target` holding the first list name of each `source` cell.
    pub fn extract_first_names(
        df: &mut DataFrame,
        source: &str,
        target: &str,
    ) -> Result<ExtractionSummary> {
        let mut summary = ExtractionSummary::new(source, target);

        let names: Vec<Option<String>> = string_values(df, source)?
            .into_iter()
            .map(|cell| {
                let outcome = match cell {
                    Some(raw) => first_name(&raw),
                    None => FirstName::Missing,
                };
                match &outcome {
                    FirstName::Found(_) => summary.extracted += 1,
                    FirstName::Missing => summary.missing += 1,
                    FirstName::NotAList => summary.not_a_list += 1,
                    FirstName::Malformed => summary.malformed += 1,
                    FirstName::MissingName => summary.missing_name += 1,
                }
                outcome.into_option()
            })
            .collect();

        df.with_column(Series::new(target.into(), names))?;

        debug!(
            "{} -> {}: {} extracted, {} absent ({} malformed, {} without name)",
            source,
            target,
            summary.extracted,
            summary.absent(),
            summary.malformed,
            summary.missing_name
        );

        Ok(summary)
    }

    /// Add `release_year` from the parsed `release_date`.
    pub fn add_release_year(df: &mut DataFrame) -> Result<()> {
        let release_dates = df
            .column(columns::RELEASE_DATE)
            .map_err(|_| InsightsError::ColumnNotFound(columns::RELEASE_DATE.to_string()))?
            .as_materialized_series()
            .clone();
        let years = dates::years(&release_dates)?;
        df.with_column(Series::new(columns::RELEASE_YEAR.into(), years))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_name_json() {
        assert_eq!(
            first_name(r#"[{"id":1,"name":"Action"}]"#),
            FirstName::Found("Action".to_string())
        );
    }

    #[test]
    fn test_first_name_python_literal() {
        assert_eq!(
            first_name("[{'id': 4, 'name': 'Legendary Pictures'}, {'id': 5, 'name': 'Other'}]"),
            FirstName::Found("Legendary Pictures".to_string())
        );
    }

    #[test]
    fn test_first_name_absent_cases() {
        assert_eq!(first_name("[]"), FirstName::NotAList);
        assert_eq!(first_name("{'name': 'x'}"), FirstName::NotAList);
        assert_eq!(first_name("42"), FirstName::NotAList);
        assert_eq!(first_name("[{'id': 1"), FirstName::Malformed);
        assert_eq!(first_name("Action, Drama"), FirstName::Malformed);
        assert_eq!(first_name("[{'id': 1}]"), FirstName::MissingName);
        assert_eq!(first_name("['Action']"), FirstName::MissingName);
        assert_eq!(first_name("[{'name': None}]"), FirstName::MissingName);
    }

    #[test]
    fn test_first_name_deeply_nested_is_malformed() {
        let nested = format!("{}{}", "[".repeat(200_000), "]".repeat(200_000));
        assert_eq!(first_name(&nested), FirstName::Malformed);
    }

    #[test]
    fn test_first_name_numeric_name() {
        assert_eq!(first_name("[{'name': 7}]"), FirstName::Found("7".to_string()));
    }

    #[test]
    fn test_extract_first_names_adds_column_and_counts() {
        let mut df = df![
            "genres" => [
                Some(r#"[{"id": 28, "name": "Action"}]"#),
                Some("not a list"),
                None,
                Some("[{'id': 18}]"),
                Some("[{'id': 18, 'name': 'Drama'}]"),
            ],
        ]
        .unwrap();

        let summary =
            ListExtractor::extract_first_names(&mut df, "genres", "main_genre").unwrap();

        let values = string_values(&df, "main_genre").unwrap();
        assert_eq!(
            values,
            vec![
                Some("Action".to_string()),
                None,
                None,
                None,
                Some("Drama".to_string())
            ]
        );
        assert_eq!(summary.extracted, 2);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.missing_name, 1);
        assert_eq!(summary.absent(), 3);
    }

    #[test]
    fn test_add_release_year() {
        let mut df = df![
            "release_date" => [Some("2000-05-01"), Some("2001-01-01"), None],
        ]
        .unwrap();
        ListExtractor::add_release_year(&mut df).unwrap();

        let years: Vec<Option<i32>> = df
            .column("release_year")
            .unwrap()
            .as_materialized_series()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(years, vec![Some(2000), Some(2001), None]);
    }
}
