//! Core types shared by the pipeline stages.
//!
//! Every stage summary and the final [`MovieInsights`] value derive
//! `Serialize` so the CLI can print them as JSON or write them to the report
//! file.

use serde::{Deserialize, Serialize};

/// Column names of the TMDB movies dataset and of the derived columns.
pub mod columns {
    pub const ORIGINAL_TITLE: &str = "original_title";
    pub const OVERVIEW: &str = "overview";
    pub const RELEASE_DATE: &str = "release_date";
    pub const BUDGET: &str = "budget";
    pub const REVENUE: &str = "revenue";
    pub const VOTE_COUNT: &str = "vote_count";
    pub const VOTE_AVERAGE: &str = "vote_average";
    pub const RUNTIME: &str = "runtime";
    pub const POPULARITY: &str = "popularity";
    pub const GENRES: &str = "genres";
    pub const KEYWORDS: &str = "keywords";
    pub const PRODUCTION_COMPANIES: &str = "production_companies";
    pub const ORIGINAL_LANGUAGE: &str = "original_language";

    pub const MAIN_GENRE: &str = "main_genre";
    pub const MAIN_COMPANY: &str = "main_company";
    pub const RELEASE_YEAR: &str = "release_year";

    /// Position of a row in the input file, added by the cleaner and
    /// dropped before the cleaned table is returned or written.
    pub const INPUT_ROW: &str = "input_row";

    /// Columns the input file must provide.
    pub const REQUIRED: [&str; 13] = [
        ORIGINAL_TITLE,
        OVERVIEW,
        RELEASE_DATE,
        BUDGET,
        REVENUE,
        VOTE_COUNT,
        VOTE_AVERAGE,
        RUNTIME,
        GENRES,
        KEYWORDS,
        PRODUCTION_COMPANIES,
        ORIGINAL_LANGUAGE,
        POPULARITY,
    ];
}

// ============================================================================
// Stage summaries
// ============================================================================

/// One column repaired with the mean of its positive values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    /// Mean of the strictly positive values (rounded when `rounded`).
    pub fill_value: f64,
    pub rounded: bool,
    /// Number of missing or zero cells replaced.
    pub replaced: usize,
}

/// Row accounting for the cleaning stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_before: usize,
    pub duplicates_removed: usize,
    pub unparsable_dates: usize,
    pub missing_essentials_removed: usize,
    pub empty_lists_removed: usize,
    pub rows_after: usize,
    pub imputations: Vec<ImputationRecord>,
    /// Columns left untouched because no positive value existed.
    pub skipped_imputations: Vec<String>,
}

impl CleaningSummary {
    /// Fill value used for `column`, if it was imputed.
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.imputations
            .iter()
            .find(|record| record.column == column)
            .map(|record| record.fill_value)
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Outcome counts for one derived "first name" column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub source: String,
    pub target: String,
    pub extracted: usize,
    /// Null cells in the source column.
    pub missing: usize,
    /// Valid literals that were not a non-empty list.
    pub not_a_list: usize,
    pub malformed: usize,
    /// First element not an object, or without a usable `name`.
    pub missing_name: usize,
}

impl ExtractionSummary {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            ..Default::default()
        }
    }

    pub fn absent(&self) -> usize {
        self.missing + self.not_a_list + self.malformed + self.missing_name
    }
}

// ============================================================================
// Analysis results
// ============================================================================

/// How a numeric value should be printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberKind {
    Integer,
    Float,
}

/// A category together with how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub value: String,
    pub count: usize,
}

/// A single movie singled out by a column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieValue {
    pub title: String,
    pub value: f64,
    /// Row label of the movie in the input file (0-based, header excluded).
    pub row: usize,
}

/// A grouped aggregate: one value per key, keys in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedStat {
    pub group_by: String,
    pub column: String,
    pub aggregate: String,
    pub groups: Vec<(String, f64)>,
}

/// A top-N ranking over one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub column: String,
    pub kind: NumberKind,
    /// Requested length; `entries` is shorter when fewer rows have a value.
    pub limit: usize,
    pub entries: Vec<MovieValue>,
}

/// Everything the report states about the cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieInsights {
    pub movie_count: usize,
    pub most_common_genre: Option<Frequency>,
    pub top_rated: Option<MovieValue>,
    pub busiest_year: Option<(i32, usize)>,
    pub mean_runtime: Option<f64>,
    pub most_common_language: Option<Frequency>,
    pub highest_budget: Option<MovieValue>,
    pub highest_revenue: Option<MovieValue>,
    pub budget_kind: NumberKind,
    pub revenue_kind: NumberKind,
    pub vote_count_kind: NumberKind,
    pub rating_per_genre: GroupedStat,
    pub rating_per_language: GroupedStat,
    pub popularity_per_language: GroupedStat,
    pub popularity_per_genre: GroupedStat,
    pub runtime_per_year: GroupedStat,
    pub rating_per_year: GroupedStat,
    pub budget_revenue_correlation: Option<f64>,
    pub most_rated: Option<MovieValue>,
    pub top_rated_movies: Ranking,
    pub longest_movies: Ranking,
    pub highest_revenue_movies: Ranking,
    pub highest_budget_movies: Ranking,
    pub most_recurring_company: Option<Frequency>,
    /// Genre with the highest median revenue and that median.
    pub most_successful_genre: Option<(String, f64)>,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub cleaning: CleaningSummary,
    pub extraction: Vec<ExtractionSummary>,
    pub insights: MovieInsights,
    /// Where the cleaned CSV was written, if it was.
    pub output_path: Option<String>,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleaning_summary_fill_value() {
        let summary = CleaningSummary {
            rows_before: 10,
            rows_after: 7,
            imputations: vec![ImputationRecord {
                column: "budget".to_string(),
                fill_value: 150.0,
                rounded: true,
                replaced: 2,
            }],
            ..Default::default()
        };
        assert_eq!(summary.fill_value("budget"), Some(150.0));
        assert_eq!(summary.fill_value("runtime"), None);
        assert_eq!(summary.rows_removed(), 3);
    }

    #[test]
    fn test_extraction_summary_absent() {
        let mut summary = ExtractionSummary::new("genres", "main_genre");
        summary.extracted = 4;
        summary.malformed = 1;
        summary.missing_name = 2;
        assert_eq!(summary.absent(), 3);
    }

    #[test]
    fn test_number_kind_serialization() {
        let json = serde_json::to_string(&NumberKind::Integer).unwrap();
        assert_eq!(json, "\"integer\"");
    }
}
