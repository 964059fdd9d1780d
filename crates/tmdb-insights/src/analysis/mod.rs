//! Descriptive statistics over the cleaned movie table.
//!
//! [`MovieAnalyzer`] derives every finding of the report with Polars
//! queries over the table. The table itself is never modified.

pub mod statistics;

use crate::error::{InsightsError, Result};
use crate::types::{
    CleaningSummary, GroupedStat, MovieInsights, MovieValue, NumberKind, Ranking, columns,
};
use crate::utils::{require_columns, round_to, string_values};
use polars::prelude::*;
use statistics::Aggregate;
use tracing::{debug, info};

/// Columns the analyzer reads.
const ANALYZED_COLUMNS: [&str; 11] = [
    columns::ORIGINAL_TITLE,
    columns::ORIGINAL_LANGUAGE,
    columns::MAIN_GENRE,
    columns::MAIN_COMPANY,
    columns::RELEASE_YEAR,
    columns::BUDGET,
    columns::REVENUE,
    columns::VOTE_COUNT,
    columns::VOTE_AVERAGE,
    columns::RUNTIME,
    columns::POPULARITY,
];

/// Computes [`MovieInsights`] from a cleaned and extracted table.
pub struct MovieAnalyzer {
    top_n: usize,
}

impl Default for MovieAnalyzer {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

/// Title and input row label of each table position.
struct RowLookup {
    titles: Vec<Option<String>>,
    labels: Vec<usize>,
}

impl RowLookup {
    /// Labels come from [`columns::INPUT_ROW`] when the cleaner added it,
    /// otherwise the table position is the label.
    fn read(df: &DataFrame) -> Result<Self> {
        let labels = match df.column(columns::INPUT_ROW) {
            Ok(column) => {
                let labels = column.as_materialized_series().cast(&DataType::UInt64)?;
                let labels: Vec<usize> = labels
                    .u64()?
                    .into_iter()
                    .enumerate()
                    .map(|(position, label)| label.map_or(position, |l| l as usize))
                    .collect();
                labels
            }
            Err(_) => (0..df.height()).collect(),
        };

        Ok(Self {
            titles: string_values(df, columns::ORIGINAL_TITLE)?,
            labels,
        })
    }

    fn movie(&self, (value, position): (f64, usize)) -> MovieValue {
        MovieValue {
            title: self
                .titles
                .get(position)
                .cloned()
                .flatten()
                .unwrap_or_default(),
            value,
            row: self.labels.get(position).copied().unwrap_or(position),
        }
    }
}

impl MovieAnalyzer {
    pub fn new(top_n: usize) -> Result<Self> {
        if top_n == 0 {
            return Err(InsightsError::InvalidConfig(
                "top_n must be at least 1".to_string(),
            ));
        }
        Ok(Self { top_n })
    }

    /// Compute every finding. `cleaning` supplies the runtime mean used for
    /// imputation, which the report quotes as the average runtime.
    pub fn analyze(&self, df: &DataFrame, cleaning: &CleaningSummary) -> Result<MovieInsights> {
        info!("Analyzing {} movies...", df.height());
        require_columns(df, &ANALYZED_COLUMNS)?;
        let rows = RowLookup::read(df)?;

        let movie = |column: &str| -> Result<Option<MovieValue>> {
            Ok(statistics::max_value(df, column)?.map(|m| rows.movie(m)))
        };

        let year_counts = statistics::grouped(
            df,
            columns::RELEASE_YEAR,
            columns::ORIGINAL_TITLE,
            Aggregate::Count,
        )?;
        let busiest_year = statistics::max_group(
            &year_counts,
            columns::RELEASE_YEAR,
            columns::ORIGINAL_TITLE,
            &DataType::Int32,
        )?
        .and_then(|(year, count)| Some((year.extract::<i32>()?, count as usize)));

        let genre_medians = statistics::grouped(
            df,
            columns::MAIN_GENRE,
            columns::REVENUE,
            Aggregate::Median,
        )?;
        let most_successful_genre = statistics::max_group(
            &genre_medians,
            columns::MAIN_GENRE,
            columns::REVENUE,
            &DataType::String,
        )?
        .and_then(|(genre, median)| Some((genre.get_str()?.to_string(), median)));

        let insights = MovieInsights {
            movie_count: df.height(),
            most_common_genre: statistics::most_common(df, columns::MAIN_GENRE)?,
            top_rated: movie(columns::VOTE_AVERAGE)?,
            busiest_year,
            mean_runtime: cleaning
                .fill_value(columns::RUNTIME)
                .map(|mean| round_to(mean, 2)),
            most_common_language: statistics::most_common(df, columns::ORIGINAL_LANGUAGE)?,
            highest_budget: movie(columns::BUDGET)?,
            highest_revenue: movie(columns::REVENUE)?,
            budget_kind: number_kind(df, columns::BUDGET)?,
            revenue_kind: number_kind(df, columns::REVENUE)?,
            vote_count_kind: number_kind(df, columns::VOTE_COUNT)?,
            rating_per_genre: grouped_mean(df, columns::MAIN_GENRE, columns::VOTE_AVERAGE)?,
            rating_per_language: grouped_mean(
                df,
                columns::ORIGINAL_LANGUAGE,
                columns::VOTE_AVERAGE,
            )?,
            popularity_per_language: grouped_mean(
                df,
                columns::ORIGINAL_LANGUAGE,
                columns::POPULARITY,
            )?,
            popularity_per_genre: grouped_mean(df, columns::MAIN_GENRE, columns::POPULARITY)?,
            runtime_per_year: grouped_mean(df, columns::RELEASE_YEAR, columns::RUNTIME)?,
            rating_per_year: grouped_mean(df, columns::RELEASE_YEAR, columns::VOTE_AVERAGE)?,
            budget_revenue_correlation: statistics::pearson(
                df,
                columns::BUDGET,
                columns::REVENUE,
            )?,
            most_rated: movie(columns::VOTE_COUNT)?,
            top_rated_movies: self.ranking(df, &rows, columns::VOTE_AVERAGE)?,
            longest_movies: self.ranking(df, &rows, columns::RUNTIME)?,
            highest_revenue_movies: self.ranking(df, &rows, columns::REVENUE)?,
            highest_budget_movies: self.ranking(df, &rows, columns::BUDGET)?,
            most_recurring_company: statistics::most_common(df, columns::MAIN_COMPANY)?,
            most_successful_genre,
        };

        debug!(
            "Busiest year {:?}, budget/revenue correlation {:?}",
            insights.busiest_year, insights.budget_revenue_correlation
        );

        Ok(insights)
    }

    fn ranking(&self, df: &DataFrame, rows: &RowLookup, column: &str) -> Result<Ranking> {
        Ok(Ranking {
            column: column.to_string(),
            kind: number_kind(df, column)?,
            limit: self.top_n,
            entries: statistics::top_n(df, column, self.top_n)?
                .into_iter()
                .map(|(position, value)| rows.movie((value, position)))
                .collect(),
        })
    }
}

fn grouped_mean(df: &DataFrame, group_by: &str, column: &str) -> Result<GroupedStat> {
    let groups = statistics::grouped(df, group_by, column, Aggregate::Mean)?;
    Ok(GroupedStat {
        group_by: group_by.to_string(),
        column: column.to_string(),
        aggregate: Aggregate::Mean.name().to_string(),
        groups: statistics::group_pairs(&groups, group_by, column)?,
    })
}

/// Integer columns print without a decimal point.
pub fn number_kind(df: &DataFrame, column: &str) -> Result<NumberKind> {
    let dtype = df
        .column(column)
        .map_err(|_| InsightsError::ColumnNotFound(column.to_string()))?
        .dtype();
    Ok(if dtype.is_integer() {
        NumberKind::Integer
    } else {
        NumberKind::Float
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImputationRecord;
    use pretty_assertions::assert_eq;

    fn analyzed_movies() -> DataFrame {
        df![
            "original_title" => ["Alpha", "Beta", "Gamma", "Delta", "Epsilon"],
            "original_language" => ["en", "fr", "en", "en", "fr"],
            "main_genre" => [Some("Action"), Some("Drama"), Some("Action"), None, Some("Drama")],
            "main_company" => [Some("Pixar"), Some("Gaumont"), Some("Pixar"), Some("Pixar"), None],
            "release_year" => [2000i32, 2000, 2001, 2001, 2000],
            "budget" => [100i64, 50, 300, 300, 20],
            "revenue" => [200i64, 40, 900, 100, 30],
            "vote_count" => [10i64, 500, 40, 30, 20],
            "vote_average" => [7.0f64, 8.5, 6.0, 8.5, 5.5],
            "runtime" => [120.0f64, 95.0, 150.0, 100.0, 88.0],
            "popularity" => [10.0f64, 2.0, 30.0, 4.0, 6.0],
        ]
        .unwrap()
    }

    fn summary() -> CleaningSummary {
        CleaningSummary {
            imputations: vec![ImputationRecord {
                column: "runtime".to_string(),
                fill_value: 106.875,
                rounded: false,
                replaced: 1,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_analyze_scalar_findings() {
        let insights = MovieAnalyzer::default()
            .analyze(&analyzed_movies(), &summary())
            .unwrap();

        assert_eq!(insights.movie_count, 5);

        let genre = insights.most_common_genre.unwrap();
        assert_eq!((genre.value.as_str(), genre.count), ("Action", 2));

        let top = insights.top_rated.unwrap();
        assert_eq!((top.title.as_str(), top.value, top.row), ("Beta", 8.5, 1));

        assert_eq!(insights.busiest_year, Some((2000, 3)));
        assert_eq!(insights.mean_runtime, Some(106.88));

        let language = insights.most_common_language.unwrap();
        assert_eq!((language.value.as_str(), language.count), ("en", 3));

        // ties on budget go to the first row
        assert_eq!(insights.highest_budget.unwrap().title, "Gamma");
        assert_eq!(insights.highest_revenue.unwrap().title, "Gamma");
        assert_eq!(insights.budget_kind, NumberKind::Integer);

        assert_eq!(insights.most_rated.unwrap().title, "Beta");
        assert_eq!(insights.most_recurring_company.unwrap().value, "Pixar");
    }

    #[test]
    fn test_analyze_grouped_findings() {
        let insights = MovieAnalyzer::default()
            .analyze(&analyzed_movies(), &summary())
            .unwrap();

        assert_eq!(
            insights.rating_per_genre.groups,
            vec![("Action".to_string(), 6.5), ("Drama".to_string(), 7.0)]
        );
        assert_eq!(
            insights.popularity_per_language.groups,
            vec![("en".to_string(), 44.0 / 3.0), ("fr".to_string(), 4.0)]
        );
        assert_eq!(insights.popularity_per_language.group_by, "original_language");
        assert_eq!(
            insights.runtime_per_year.groups,
            vec![("2000".to_string(), 101.0), ("2001".to_string(), 125.0)]
        );

        // Action median revenue (200, 900) = 550, Drama (40, 30) = 35
        assert_eq!(
            insights.most_successful_genre,
            Some(("Action".to_string(), 550.0))
        );
        assert!(insights.budget_revenue_correlation.unwrap() > 0.0);
    }

    #[test]
    fn test_rankings_respect_limit_and_order() {
        let insights = MovieAnalyzer::new(3)
            .unwrap()
            .analyze(&analyzed_movies(), &summary())
            .unwrap();

        let titles: Vec<&str> = insights
            .top_rated_movies
            .entries
            .iter()
            .map(|m| m.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Beta", "Delta", "Alpha"]);
        assert_eq!(insights.top_rated_movies.limit, 3);
        assert_eq!(insights.top_rated_movies.kind, NumberKind::Float);
        assert_eq!(insights.highest_budget_movies.kind, NumberKind::Integer);
    }

    #[test]
    fn test_rows_are_input_file_labels() {
        let mut df = analyzed_movies();
        df.with_column(Series::new(
            columns::INPUT_ROW.into(),
            &[0 as IdxSize, 2, 3, 6, 7],
        ))
        .unwrap();

        let insights = MovieAnalyzer::default().analyze(&df, &summary()).unwrap();

        let top = insights.top_rated.unwrap();
        assert_eq!((top.title.as_str(), top.row), ("Beta", 2));
        let rows: Vec<usize> = insights
            .longest_movies
            .entries
            .iter()
            .map(|m| m.row)
            .collect();
        assert_eq!(rows, vec![3, 0, 6, 2, 7]);
    }

    #[test]
    fn test_busiest_year_counts_titled_movies() {
        let mut df = analyzed_movies();
        df.with_column(Series::new(
            "original_title".into(),
            &[Some("Alpha"), None, Some("Gamma"), Some("Delta"), None],
        ))
        .unwrap();

        let insights = MovieAnalyzer::default().analyze(&df, &summary()).unwrap();
        // 2000 has three rows but only Alpha has a title
        assert_eq!(insights.busiest_year, Some((2001, 2)));
    }

    #[test]
    fn test_analyze_requires_derived_columns() {
        let df = analyzed_movies().drop("main_genre").unwrap();
        let err = MovieAnalyzer::default()
            .analyze(&df, &summary())
            .unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_zero_top_n_rejected() {
        assert!(MovieAnalyzer::new(0).is_err());
    }
}
