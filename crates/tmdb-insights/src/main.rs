//! CLI entry point for the TMDB movie cleaning and analysis pipeline.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tmdb_insights::reporting::report_base_name;
use tmdb_insights::{
    AnalysisConfig, AnalysisConfigBuilder, Pipeline, PipelineResult, ReportGenerator,
    render_report, saved_line,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean the TMDB movies dataset and print summary insights",
    long_about = "Cleans the TMDB 5000 movies CSV (duplicates, missing values, empty lists),\n\
                  derives main genre, main company and release year, prints a report of\n\
                  summary statistics and writes the cleaned CSV.\n\n\
                  EXAMPLES:\n  \
                  # Default file names in the current directory\n  \
                  tmdb-insights\n\n  \
                  # Custom paths and shorter rankings\n  \
                  tmdb-insights -i data/movies.csv -o out/cleaned.csv -n 5\n\n  \
                  # Machine-readable output\n  \
                  tmdb-insights --json | jq .insights.most_common_genre"
)]
struct Args {
    /// Path to the movies CSV [default: tmdb_5000_movies.csv]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Where to write the cleaned CSV [default: cleaned_tmdb_movies.csv]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file; --input, --output and --top-n override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Length of the top-N rankings [default: 10]
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Print the report as JSON instead of text
    ///
    /// Disables all logging so stdout only holds the JSON document.
    #[arg(long)]
    json: bool,

    /// Write a JSON report next to the cleaned CSV
    ///
    /// The report is saved as <output stem>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Clean and analyze without writing the cleaned CSV
    #[arg(long)]
    dry_run: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // .env may set RUST_LOG, so load it before logging starts
    dotenv().ok();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = build_pipeline(&args, config)?;

    let outcome = if args.dry_run {
        info!("Dry run: the cleaned dataset will not be written");
        pipeline.load().and_then(|df| pipeline.process(df))
    } else {
        pipeline.run()
    };

    match outcome {
        Ok((_, result)) => handle_pipeline_output(&pipeline, &result, &args),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed [{}]: {}", e.error_code(), e))
        }
    }
}

/// Default configuration, or the `--config` file, with CLI overrides applied.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Reading config file {}", path.display()))?;
            serde_json::from_str::<AnalysisConfig>(&text)
                .with_context(|| format!("Parsing config file {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };

    let mut builder = AnalysisConfigBuilder::from_config(base);
    if let Some(ref input) = args.input {
        builder = builder.input_path(input);
    }
    if let Some(ref output) = args.output {
        builder = builder.output_path(output);
    }
    if let Some(top_n) = args.top_n {
        builder = builder.top_n(top_n);
    }

    Ok(builder.build()?)
}

fn build_pipeline(args: &Args, config: AnalysisConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: print the text report to stdout
/// - `--json`: print the JSON report to stdout only (no logs)
/// - `--emit-report`: also write the JSON report to a file
fn handle_pipeline_output(pipeline: &Pipeline, result: &PipelineResult, args: &Args) -> Result<()> {
    let config = pipeline.config();
    let report = ReportGenerator::build_report(&config.input_path.display().to_string(), result);

    if args.emit_report {
        let output_path: &Path = &config.output_path;
        let generator = ReportGenerator::beside(output_path);
        let report_path = generator.write_report_to_file(&report, &report_base_name(output_path))?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", render_report(&result.insights));

    match &result.output_path {
        Some(path) => println!("{}", saved_line(path)),
        None => println!(
            "\nDry run: {} cleaned rows were not written to '{}'",
            result.cleaning.rows_after,
            config.output_path.display()
        ),
    }

    Ok(())
}
