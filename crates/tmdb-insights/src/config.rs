//! Configuration for the movie cleaning and analysis pipeline.
//!
//! Defaults describe the standard TMDB 5000 run: the TMDB input and output
//! file names, the five imputed columns with their rounding, the list
//! columns checked for `"[]"` and top-10 rankings.

use crate::error::InsightsError;
use crate::types::columns;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when a column has no strictly positive value to average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UndefinedMeanPolicy {
    /// Abort the run with `NoValidValues`.
    #[default]
    Fail,
    /// Leave the column untouched and log a warning.
    Skip,
}

/// One numeric column to repair with the mean of its positive values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImputationRule {
    /// Column name.
    pub column: String,
    /// Round the mean to the nearest integer and store the column as Int64.
    pub round_to_int: bool,
}

impl ImputationRule {
    pub fn new(column: impl Into<String>, round_to_int: bool) -> Self {
        Self {
            column: column.into(),
            round_to_int,
        }
    }
}

/// Configuration for the pipeline.
///
/// Use [`AnalysisConfig::builder()`] for a validated configuration, or
/// deserialize one from JSON (the CLI `--config` flag does this).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// CSV file to load.
    /// Default: "tmdb_5000_movies.csv"
    pub input_path: PathBuf,

    /// Destination of the cleaned CSV.
    /// Default: "cleaned_tmdb_movies.csv"
    pub output_path: PathBuf,

    /// Numeric columns repaired with the mean of positive values, in order.
    /// Default: budget, revenue, vote_count (rounded), vote_average, runtime
    pub imputation_rules: Vec<ImputationRule>,

    /// Columns whose rows are dropped when they hold exactly `"[]"`.
    /// Default: genres, keywords, production_companies
    pub empty_list_columns: Vec<String>,

    /// Length of the top-N rankings.
    /// Default: 10
    pub top_n: usize,

    /// Rows scanned for CSV schema inference; `None` scans the whole file.
    /// Default: None
    pub infer_schema_length: Option<usize>,

    /// Behaviour when an imputed column has no positive values.
    /// Default: Fail
    pub undefined_mean_policy: UndefinedMeanPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("tmdb_5000_movies.csv"),
            output_path: PathBuf::from("cleaned_tmdb_movies.csv"),
            imputation_rules: default_imputation_rules(),
            empty_list_columns: default_empty_list_columns(),
            top_n: 10,
            infer_schema_length: None,
            undefined_mean_policy: UndefinedMeanPolicy::default(),
        }
    }
}

fn default_imputation_rules() -> Vec<ImputationRule> {
    vec![
        ImputationRule::new(columns::BUDGET, true),
        ImputationRule::new(columns::REVENUE, true),
        ImputationRule::new(columns::VOTE_COUNT, true),
        ImputationRule::new(columns::VOTE_AVERAGE, false),
        ImputationRule::new(columns::RUNTIME, false),
    ]
}

fn default_empty_list_columns() -> Vec<String> {
    [
        columns::GENRES,
        columns::KEYWORDS,
        columns::PRODUCTION_COMPANIES,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_n == 0 {
            return Err(ConfigValidationError::InvalidTopN(self.top_n));
        }

        if self.input_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("input_path".to_string()));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("output_path".to_string()));
        }

        if self.input_path == self.output_path {
            return Err(ConfigValidationError::OutputOverwritesInput(
                self.output_path.display().to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for rule in &self.imputation_rules {
            if !seen.insert(rule.column.as_str()) {
                return Err(ConfigValidationError::DuplicateImputationColumn(
                    rule.column.clone(),
                ));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid top-N limit: {0} (must be at least 1)")]
    InvalidTopN(usize),

    #[error("Path '{0}' must not be empty")]
    EmptyPath(String),

    #[error("Output path '{0}' would overwrite the input file")]
    OutputOverwritesInput(String),

    #[error("Column '{0}' appears more than once in the imputation rules")]
    DuplicateImputationColumn(String),
}

impl From<ConfigValidationError> for InsightsError {
    fn from(err: ConfigValidationError) -> Self {
        InsightsError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    imputation_rules: Option<Vec<ImputationRule>>,
    empty_list_columns: Option<Vec<String>>,
    top_n: Option<usize>,
    infer_schema_length: Option<Option<usize>>,
    undefined_mean_policy: Option<UndefinedMeanPolicy>,
}

impl AnalysisConfigBuilder {
    /// Start from an existing configuration, e.g. one read from JSON.
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self {
            input_path: Some(config.input_path),
            output_path: Some(config.output_path),
            imputation_rules: Some(config.imputation_rules),
            empty_list_columns: Some(config.empty_list_columns),
            top_n: Some(config.top_n),
            infer_schema_length: Some(config.infer_schema_length),
            undefined_mean_policy: Some(config.undefined_mean_policy),
        }
    }

    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Replace the imputed columns.
    pub fn imputation_rules(mut self, rules: Vec<ImputationRule>) -> Self {
        self.imputation_rules = Some(rules);
        self
    }

    /// Replace the columns checked for the empty-list literal.
    pub fn empty_list_columns<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.empty_list_columns = Some(cols.into_iter().map(Into::into).collect());
        self
    }

    pub fn top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    /// Limit schema inference to the first `rows` rows (`None` = whole file).
    pub fn infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    pub fn undefined_mean_policy(mut self, policy: UndefinedMeanPolicy) -> Self {
        self.undefined_mean_policy = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_path: self.output_path.unwrap_or(defaults.output_path),
            imputation_rules: self.imputation_rules.unwrap_or(defaults.imputation_rules),
            empty_list_columns: self
                .empty_list_columns
                .unwrap_or(defaults.empty_list_columns),
            top_n: self.top_n.unwrap_or(defaults.top_n),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            undefined_mean_policy: self.undefined_mean_policy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
