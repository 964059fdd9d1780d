//! TMDB Movie Insights Library
//!
//! Cleaning and summary analytics for the TMDB 5000 movies dataset, built on
//! Polars.
//!
//! # Overview
//!
//! - **Cleaning**: duplicate removal, date parsing, dropping incomplete rows,
//!   mean-of-positive-values imputation, dropping rows with empty lists
//! - **Extraction**: main genre and main production company from the
//!   serialized list columns (JSON or Python literal syntax), release year
//! - **Analysis**: most common genre and language, top rated and most rated
//!   movies, busiest year, grouped means and medians, budget/revenue
//!   correlation, top-N rankings
//! - **Reporting**: plain-text report and a serializable JSON report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tmdb_insights::{AnalysisConfig, Pipeline, render_report};
//!
//! let config = AnalysisConfig::builder()
//!     .input_path("tmdb_5000_movies.csv")
//!     .output_path("cleaned_tmdb_movies.csv")
//!     .build()?;
//!
//! let (cleaned, result) = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("{}", render_report(&result.insights));
//! ```
//!
//! # Stages
//!
//! Each stage can also be used on its own:
//!
//! ```rust,ignore
//! use tmdb_insights::{ListExtractor, MovieAnalyzer, MovieCleaner, load_movies};
//!
//! let df = load_movies(Path::new("tmdb_5000_movies.csv"), None)?;
//! let (df, cleaning) = MovieCleaner::new(&AnalysisConfig::default()).clean(df)?;
//! let (df, _) = ListExtractor::extract_all(df)?;
//! let insights = MovieAnalyzer::new(10)?.analyze(&df, &cleaning)?;
//! ```

pub mod analysis;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod extractor;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::MovieAnalyzer;
pub use cleaner::MovieCleaner;
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, ImputationRule,
    UndefinedMeanPolicy,
};
pub use error::{InsightsError, Result as InsightsResult, ResultExt};
pub use extractor::{FirstName, ListExtractor, first_name, parse_literal};
pub use imputers::PositiveMeanImputer;
pub use io::{load_movies, write_csv};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use reporting::{InsightsReport, ReportGenerator, render_report, saved_line};
pub use types::{
    CleaningSummary, ExtractionSummary, Frequency, GroupedStat, ImputationRecord, MovieInsights,
    MovieValue, NumberKind, PipelineResult, Ranking,
};
