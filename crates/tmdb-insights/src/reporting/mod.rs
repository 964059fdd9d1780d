//! Report output.
//!
//! - [`render_report`] turns [`MovieInsights`](crate::types::MovieInsights)
//!   into the text printed on stdout
//! - [`InsightsReport`] is the JSON form, printed with `--json` or written
//!   next to the cleaned CSV with `--emit-report`
//!
//! # Example
//!
//! ```rust,ignore
//! use tmdb_insights::reporting::{ReportGenerator, report_base_name};
//!
//! let report = ReportGenerator::build_report("tmdb_5000_movies.csv", &result);
//! let generator = ReportGenerator::beside(Path::new("out/cleaned.csv"));
//! generator.write_report_to_file(&report, &report_base_name(Path::new("out/cleaned.csv")))?;
//! ```

mod generator;
mod text;

pub use generator::{InsightsReport, ReportGenerator, report_base_name};
pub use text::{format_value, render_grouped, render_ranking, render_report, saved_line};
