use crate::error::{InsightsError, Result};
use crate::types::{CleaningSummary, ExtractionSummary, MovieInsights, PipelineResult};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Machine-readable report of one pipeline run.
///
/// Used for both JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub input_path: String,
    pub output_path: Option<String>,
    pub duration_ms: u64,
    pub cleaning: CleaningSummary,
    pub extraction: Vec<ExtractionSummary>,
    pub insights: MovieInsights,
}

pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    /// Report writer placed next to the cleaned CSV.
    pub fn beside(output_path: &Path) -> Self {
        let output_dir = output_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { output_dir }
    }

    pub fn build_report(input_path: &str, result: &PipelineResult) -> InsightsReport {
        InsightsReport {
            generated_at: Local::now().to_rfc3339(),
            input_path: input_path.to_string(),
            output_path: result.output_path.clone(),
            duration_ms: result.duration_ms,
            cleaning: result.cleaning.clone(),
            extraction: result.extraction.clone(),
            insights: result.insights.clone(),
        }
    }

    /// Write the report as pretty JSON to `<base_name>_report.json`.
    pub fn write_report_to_file(&self, report: &InsightsReport, base_name: &str) -> Result<PathBuf> {
        if base_name.is_empty() {
            return Err(InsightsError::ReportFailed(
                "report base name is empty".to_string(),
            ));
        }

        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

/// File stem of `path`, used as the report base name.
pub fn report_base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "movies".to_string())
}
