use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{MatchRow, MatchTable};

/// Name of the mandatory match-identifier column.
pub const MATCH_COLUMN: &str = "Match";

// ---------------------------------------------------------------------------
// LoadError – terminal for the session, surfaced once
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be read at all.
    #[error("cannot read {path}: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The source was read but is not a valid season table.
    #[error("malformed season table in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl LoadError {
    fn malformed(path: &Path, err: anyhow::Error) -> Self {
        LoadError::Malformed {
            path: path.to_path_buf(),
            reason: format!("{err:#}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a season table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header `Match,<team>,...`, one record per match
/// * `.json`    – records orientation: `[{ "Match": 1, "<team>": 10.0, ... }]`
/// * `.parquet` – scalar `Match` column plus one numeric column per team
pub fn load_file(path: &Path) -> Result<MatchTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let text = read_source(path)?;
            parse_csv(&text).map_err(|e| LoadError::malformed(path, e))
        }
        "json" => {
            let text = read_source(path)?;
            parse_json(&text).map_err(|e| LoadError::malformed(path, e))
        }
        "parquet" | "pq" => {
            let file = std::fs::File::open(path).map_err(|source| LoadError::NotFound {
                path: path.to_path_buf(),
                source,
            })?;
            parse_parquet(file).map_err(|e| LoadError::malformed(path, e))
        }
        other => Err(LoadError::Malformed {
            path: path.to_path_buf(),
            reason: format!("unsupported file extension: .{other}"),
        }),
    }
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::NotFound {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Shared validation
// ---------------------------------------------------------------------------

/// Check the table invariants: at least one team column, match ids unique
/// and strictly ascending.
fn validate(table: MatchTable) -> Result<MatchTable> {
    if table.team_names.is_empty() {
        bail!("no team columns after '{MATCH_COLUMN}'");
    }
    for pair in table.rows.windows(2) {
        let (prev, next) = (pair[0].match_id, pair[1].match_id);
        if next == prev {
            bail!("duplicate match id {next}");
        }
        if next < prev {
            bail!("match ids not sorted: {next} after {prev}");
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Parse CSV text: header row `Match,<team>,...`, then one record per match
/// with an integer id followed by one numeric value per team.
pub fn parse_csv(text: &str) -> Result<MatchTable> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    match headers.first() {
        Some(first) if first == MATCH_COLUMN => {}
        Some(first) => bail!("first column is '{first}', expected '{MATCH_COLUMN}'"),
        None => bail!("empty CSV header"),
    }
    let team_names: Vec<String> = headers[1..].to_vec();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields, expected {}",
                record.len(),
                headers.len()
            );
        }

        let match_id: u32 = record[0]
            .trim()
            .parse()
            .with_context(|| format!("CSV row {row_no}: '{}' is not a match id", &record[0]))?;

        let values: Vec<f64> = record
            .iter()
            .skip(1)
            .enumerate()
            .map(|(col, cell)| {
                cell.trim().parse::<f64>().with_context(|| {
                    format!(
                        "CSV row {row_no}, column '{}': '{cell}' is not a number",
                        team_names[col]
                    )
                })
            })
            .collect::<Result<_>>()?;

        rows.push(MatchRow { match_id, values });
    }

    validate(MatchTable::new(team_names, rows))
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Parse records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Match": 1, "Super Kings": 120.0, "Royals": 95.0 },
///   ...
/// ]
/// ```
///
/// Team columns are taken from the first record; `serde_json` maps iterate
/// in key order, so JSON sources carry their teams alphabetically.
pub fn parse_json(text: &str) -> Result<MatchTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("expected top-level JSON array")?;

    let first = records
        .first()
        .and_then(|r| r.as_object())
        .context("expected at least one record object")?;
    let team_names: Vec<String> = first
        .keys()
        .filter(|k| k.as_str() != MATCH_COLUMN)
        .cloned()
        .collect();

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("record {i} is not a JSON object"))?;

        let match_id = obj
            .get(MATCH_COLUMN)
            .and_then(|v| v.as_u64())
            .with_context(|| format!("record {i}: missing or non-integer '{MATCH_COLUMN}'"))?
            as u32;

        let values: Vec<f64> = team_names
            .iter()
            .map(|team| {
                obj.get(team)
                    .and_then(|v| v.as_f64())
                    .with_context(|| format!("record {i}: missing or non-numeric '{team}'"))
            })
            .collect::<Result<_>>()?;

        rows.push(MatchRow { match_id, values });
    }

    validate(MatchTable::new(team_names, rows))
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Read a Parquet season table: a scalar integer `Match` column plus one
/// numeric column per team.  Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn parse_parquet(file: std::fs::File) -> Result<MatchTable> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut team_names: Vec<String> = Vec::new();
    let mut rows: Vec<MatchRow> = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let match_idx = schema
            .index_of(MATCH_COLUMN)
            .map_err(|_| anyhow::anyhow!("parquet file missing '{MATCH_COLUMN}' column"))?;

        let batch_teams: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != match_idx)
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        if team_names.is_empty() {
            team_names = batch_teams.iter().map(|(_, name)| name.clone()).collect();
        }

        let match_col = batch.column(match_idx);
        for row in 0..batch.num_rows() {
            let match_id = extract_match_id(match_col, row)
                .with_context(|| format!("row {row}: failed to read '{MATCH_COLUMN}'"))?;

            let values: Vec<f64> = batch_teams
                .iter()
                .map(|(col_idx, name)| {
                    extract_f64(batch.column(*col_idx), row)
                        .with_context(|| format!("row {row}, column '{name}'"))
                })
                .collect::<Result<_>>()?;

            rows.push(MatchRow { match_id, values });
        }
    }

    validate(MatchTable::new(team_names, rows))
}

// -- Arrow helpers --

fn extract_match_id(col: &Arc<dyn Array>, row: usize) -> Result<u32> {
    if col.is_null(row) {
        bail!("null match id");
    }
    let id = match col.data_type() {
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            arr.value(row)
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            arr.value(row) as i64
        }
        other => bail!("match column has type {other:?}, expected integer"),
    };
    u32::try_from(id).with_context(|| format!("match id {id} out of range"))
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value");
    }
    match col.data_type() {
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            Ok(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            Ok(arr.value(row) as f64)
        }
        other => bail!("column type {other:?}, expected numeric"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_happy_path() {
        let text = "Match,A,B\n1,10,5\n2,20,25\n3,10,20\n";
        let table = parse_csv(text).unwrap();
        assert_eq!(table.team_names, vec!["A", "B"]);
        assert_eq!(table.match_count(), 3);
        assert_eq!(table.rows[1].match_id, 2);
        assert_eq!(table.rows[1].values, vec![20.0, 25.0]);
    }

    #[test]
    fn csv_rejects_non_numeric_cell() {
        let text = "Match,A,B\n1,10,five\n";
        let err = parse_csv(text).unwrap_err();
        assert!(format!("{err:#}").contains("not a number"));
    }

    #[test]
    fn csv_rejects_wrong_first_column() {
        let text = "Round,A,B\n1,10,5\n";
        assert!(parse_csv(text).is_err());
    }

    #[test]
    fn csv_rejects_duplicate_match_id() {
        let text = "Match,A,B\n1,10,5\n1,20,25\n";
        let err = parse_csv(text).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate match id"));
    }

    #[test]
    fn csv_rejects_unsorted_match_ids() {
        let text = "Match,A,B\n2,10,5\n1,20,25\n";
        let err = parse_csv(text).unwrap_err();
        assert!(format!("{err:#}").contains("not sorted"));
    }

    #[test]
    fn csv_rejects_missing_team_columns() {
        let text = "Match\n1\n";
        assert!(parse_csv(text).is_err());
    }

    #[test]
    fn json_happy_path() {
        let text = r#"[
            {"Match": 1, "A": 10.0, "B": 5.0},
            {"Match": 2, "A": 20.0, "B": 25.0}
        ]"#;
        let table = parse_json(text).unwrap();
        assert_eq!(table.team_names, vec!["A", "B"]);
        assert_eq!(table.rows[0].values, vec![10.0, 5.0]);
    }

    #[test]
    fn json_rejects_missing_team_value() {
        let text = r#"[
            {"Match": 1, "A": 10.0, "B": 5.0},
            {"Match": 2, "A": 20.0}
        ]"#;
        assert!(parse_json(text).is_err());
    }

    #[test]
    fn load_file_reports_not_found() {
        let err = load_file(Path::new("no/such/file.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn load_file_rejects_unknown_extension() {
        let err = load_file(Path::new("season.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }
}
