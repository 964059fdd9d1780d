//! Main pipeline module.
//!
//! [`Pipeline`] runs the stages in order (load, clean, extract, analyze,
//! write), threading the table through them as an explicit value.

use crate::analysis::MovieAnalyzer;
use crate::cleaner::MovieCleaner;
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::{Result, ResultExt};
use crate::extractor::ListExtractor;
use crate::io::{load_movies, write_csv};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{PipelineResult, columns};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The movie cleaning and analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use tmdb_insights::{AnalysisConfig, Pipeline};
///
/// let config = AnalysisConfig::builder()
///     .input_path("data/tmdb_5000_movies.csv")
///     .top_n(5)
///     .build()?;
///
/// let (cleaned, result) = Pipeline::builder()
///     .config(config)
///     .on_progress(|update| println!("{}", update.message))
///     .build()?
///     .run()?;
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: MovieCleaner,
    analyzer: MovieAnalyzer,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the configured input, process it and write the cleaned CSV.
    pub fn run(&self) -> Result<(DataFrame, PipelineResult)> {
        self.finish(self.run_internal())
    }

    /// Clean, extract and analyze an already loaded table. Nothing is written.
    pub fn process(&self, df: DataFrame) -> Result<(DataFrame, PipelineResult)> {
        self.finish(self.process_internal(df, Instant::now()))
    }

    /// Read the configured input file.
    pub fn load(&self) -> Result<DataFrame> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}...", self.config.input_path.display()),
        ));
        let df = load_movies(&self.config.input_path, self.config.infer_schema_length)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!("Loaded {} rows", df.height()),
        ));
        Ok(df)
    }

    fn finish(
        &self,
        outcome: Result<(DataFrame, PipelineResult)>,
    ) -> Result<(DataFrame, PipelineResult)> {
        match outcome {
            Ok(done) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(done)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn run_internal(&self) -> Result<(DataFrame, PipelineResult)> {
        let start_time = Instant::now();
        let df = self.load()?;
        let (mut df, mut result) = self.process_internal(df, start_time)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Writing,
            0.0,
            "Writing cleaned dataset...",
        ));
        let output = &self.config.output_path;
        write_csv(&mut df, output)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Writing,
            1.0,
            format!("Saved {}", output.display()),
        ));
        result.output_path = Some(output.display().to_string());
        result.duration_ms = start_time.elapsed().as_millis() as u64;

        Ok((df, result))
    }

    fn process_internal(
        &self,
        df: DataFrame,
        start_time: Instant,
    ) -> Result<(DataFrame, PipelineResult)> {
        info!("Starting movie pipeline...");

        // Step 1: Cleaning
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Cleaning dataset...",
        ));
        let (df, cleaning) = self.cleaner.clean(df).context("Cleaning")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            1.0,
            format!(
                "Kept {} of {} rows",
                cleaning.rows_after, cleaning.rows_before
            ),
        ));

        // Step 2: Derived columns
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Extracting,
            0.0,
            "Extracting main genre, main company and release year...",
        ));
        let (df, extraction) = ListExtractor::extract_all(df).context("Extracting")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Extracting,
            1.0,
            "Derived columns added",
        ));

        // Step 3: Statistics
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Analyzing,
            0.0,
            format!("Analyzing {} movies...", df.height()),
        ));
        let insights = self
            .analyzer
            .analyze(&df, &cleaning)
            .context("Analyzing")?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Analyzing,
            1.0,
            "Statistics computed",
        ));

        let df = df.drop(columns::INPUT_ROW)?;

        let result = PipelineResult {
            cleaning,
            extraction,
            insights,
            output_path: None,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Pipeline finished: {} of {} rows kept",
            result.cleaning.rows_after, result.cleaning.rows_before
        );

        Ok((df, result))
    }
}

/// Builder for creating a configured [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress callback closure.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let pipeline = Pipeline::builder()
    ///     .on_progress(|update| {
    ///         println!("[{:.0}%] {:?}: {}",
    ///             update.progress * 100.0,
    ///             update.stage,
    ///             update.message
    ///         );
    ///     })
    ///     .build()?;
    /// ```
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let analyzer = MovieAnalyzer::new(config.top_n)
            .map_err(|_| ConfigValidationError::InvalidTopN(config.top_n))?;

        Ok(Pipeline {
            cleaner: MovieCleaner::new(&config),
            analyzer,
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
