use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RawRow, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a raw growth table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – label column plus numeric day columns (a spreadsheet
///   exported via `df.to_parquet()`)
/// * `.json`    – `[["Candida", null, ...], [null, 0.4, ...], ...]`
/// * `.csv`     – first column is the label cell, the rest are day cells
///
/// Every format yields the same [`RawTable`]: a label string per row and
/// `f64` day cells, NAN where the source cell is blank or non-numeric. No
/// interpretation happens here; section headers and replicate blocks are
/// recognized later by the extractor.
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    info!("loaded {} raw rows from {}", table.len(), path.display());
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: one header row (column names, discarded), then the raw grid.
/// Spacer rows may be entirely blank or shorter than the header.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let label = record.get(0).unwrap_or("").trim().to_string();
        let values = record.iter().skip(1).map(parse_cell).collect();
        rows.push(RawRow { label, values });
    }

    Ok(RawTable { rows })
}

fn parse_cell(s: &str) -> f64 {
    s.trim().parse().unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema: an array of row arrays, each `[label, d1, d2, ...]`
/// with `null` for blank cells:
///
/// ```json
/// [
///   ["Candida", null, null, null, null],
///   ["Candida alone", 0.1, 0.5, 0.9, 1.2],
///   [null, null, 0.6, 1.0, 1.3]
/// ]
/// ```
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let cells = rec
            .as_array()
            .with_context(|| format!("Row {i} is not a JSON array"))?;

        let label = match cells.first() {
            Some(JsonValue::String(s)) => s.trim().to_string(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let values = cells
            .iter()
            .skip(1)
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect();

        rows.push(RawRow { label, values });
    }

    Ok(RawTable { rows })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet export of the spreadsheet.
///
/// Expected schema:
/// - column 0: Utf8 label column (nullable)
/// - remaining columns: numeric day columns (Float64/Float32/Int64/Int32,
///   nullable – nulls become NAN)
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch.num_columns() == 0 {
            bail!("Parquet file has no columns");
        }

        let label_col = batch.column(0);
        if !matches!(label_col.data_type(), DataType::Utf8 | DataType::LargeUtf8) {
            bail!(
                "First parquet column must be the Utf8 label column, got {:?}",
                label_col.data_type()
            );
        }

        let day_cols: Vec<&Arc<dyn Array>> =
            (1..batch.num_columns()).map(|c| batch.column(c)).collect();

        for row in 0..batch.num_rows() {
            let label = extract_label(label_col, row);
            let values = day_cols
                .iter()
                .map(|col| extract_numeric(col, row))
                .collect();
            rows.push(RawRow { label, values });
        }
    }

    Ok(RawTable { rows })
}

// -- Parquet / Arrow helpers --

/// Read the label cell, empty string for null.
fn extract_label(col: &Arc<dyn Array>, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
        s.value(row).trim().to_string()
    } else {
        // LargeStringArray
        let s = col.as_string::<i64>();
        s.value(row).trim().to_string()
    }
}

/// Read a numeric day cell as `f64`, NAN for null or non-numeric columns.
fn extract_numeric(col: &Arc<dyn Array>, row: usize) -> f64 {
    if col.is_null(row) {
        return f64::NAN;
    }
    match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(f64::NAN, |a| a.value(row)),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or(f64::NAN, |a| a.value(row) as f64),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(f64::NAN, |a| a.value(row) as f64),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map_or(f64::NAN, |a| a.value(row) as f64),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!("pairgrowth-loader-{}-{name}", std::process::id()));
        p
    }

    #[test]
    fn csv_rows_parse_labels_and_cells() {
        let path = temp_path("table.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Name,Day 1,Day 3,Day 5,Day 7").unwrap();
        writeln!(f, "Candida,,,,").unwrap();
        writeln!(f, "Candida alone,0.1,0.5,0.9,1.2").unwrap();
        writeln!(f, ",,0.6,1.0,1.3").unwrap();
        writeln!(f, "notes go here,,,,").unwrap();
        drop(f);

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 4);
        assert_eq!(table.rows[0].label, "Candida");
        assert_eq!(table.rows[1].label, "Candida alone");
        assert_eq!(table.rows[1].values, vec![0.1, 0.5, 0.9, 1.2]);
        assert!(table.rows[2].label.is_empty());
        assert!(table.rows[2].values[0].is_nan());
        assert_eq!(table.rows[2].values[1], 0.6);
        assert_eq!(table.rows[3].label, "notes go here");
    }

    #[test]
    fn json_rows_parse_labels_and_cells() {
        let path = temp_path("table.json");
        std::fs::write(
            &path,
            r#"[["Candida", null, null],
                ["Candida alone", 0.1, 0.5],
                [null, null, 0.6]]"#,
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows[1].label, "Candida alone");
        assert_eq!(table.rows[1].values, vec![0.1, 0.5]);
        assert!(table.rows[2].label.is_empty());
        assert!(table.rows[2].values[0].is_nan());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("growth.xlsx")).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }
}
