use crate::error::{InsightsError, Result};
use crate::types::columns;
use crate::utils::{is_numeric_dtype, require_columns};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const NUMERIC_COLUMNS: [&str; 6] = [
    columns::BUDGET,
    columns::REVENUE,
    columns::VOTE_COUNT,
    columns::VOTE_AVERAGE,
    columns::RUNTIME,
    columns::POPULARITY,
];

/// Load the movie CSV and check that every required column is present.
///
/// `infer_schema_length` of `None` infers column types from the whole file.
pub fn load_movies(path: &Path, infer_schema_length: Option<usize>) -> Result<DataFrame> {
    if !path.exists() {
        return Err(InsightsError::InputNotFound(path.to_path_buf()));
    }

    info!("Loading {}...", path.display());
    let df = load_csv_with_fallbacks(path, infer_schema_length)?;
    info!("Loaded {} rows x {} columns", df.height(), df.width());

    require_columns(&df, &columns::REQUIRED)?;

    for name in NUMERIC_COLUMNS {
        if let Ok(column) = df.column(name) {
            if !is_numeric_dtype(column.dtype()) {
                warn!(
                    "Column '{}' was read as {}; non-numeric cells are treated as missing",
                    name,
                    column.dtype()
                );
            }
        }
    }

    Ok(df)
}

fn load_csv_with_fallbacks(path: &Path, infer_schema_length: Option<usize>) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(infer_schema_length)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Tolerate ragged lines and unparsable cells
    warn!(
        "Strict CSV read of {} failed; retrying in relaxed mode",
        path.display()
    );
    let df = CsvReadOptions::default()
        .with_infer_schema_length(infer_schema_length)
        .with_has_header(true)
        .with_ignore_errors(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_truncate_ragged_lines(true),
        )
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load_movies(Path::new("does/not/exist.csv"), None).unwrap_err();
        assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
        assert!(err.to_string().contains("does/not/exist.csv"));
    }

    #[test]
    fn test_missing_required_column() {
        let path = std::env::temp_dir().join("tmdb_insights_reader_missing_column.csv");
        std::fs::write(&path, "original_title,budget\nAvatar,237000000\n").unwrap();

        let err = load_movies(&path, None).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");

        std::fs::remove_file(&path).ok();
    }
}
