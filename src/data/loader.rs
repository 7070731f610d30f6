use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeStringArray, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    parse_integer, parse_timestamp, Complaint, ComplaintDataset, RawComplaint, RecordError,
    COL_LENGTH, COL_STATE, COL_STATUS, COL_STORE, COL_TIME, COL_YEAR,
};

const REQUIRED_COLUMNS: [&str; 6] = [COL_STORE, COL_STATE, COL_STATUS, COL_YEAR, COL_LENGTH, COL_TIME];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a complaints dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the source column names (recommended)
/// * `.json`    – `[{ "LOJA": "...", "ESTADO": "...", ... }, ...]`
/// * `.parquet` – one column per field; the timestamp may be text, Date32 or Timestamp
pub fn load_file(path: &Path) -> Result<ComplaintDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} complaints from {} ({} stores, {} states, {} statuses, {} years)",
        dataset.len(),
        path.display(),
        dataset.stores.len(),
        dataset.states.len(),
        dataset.statuses.len(),
        dataset.years.len()
    );
    if dataset.is_empty() {
        log::warn!("{} has no complaints; every chart will be empty", path.display());
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names. Extra columns are ignored.
fn load_csv(path: &Path) -> Result<ComplaintDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            bail!("CSV missing '{col}' column");
        }
    }

    let mut records = Vec::new();
    for (row_no, result) in reader.deserialize::<RawComplaint>().enumerate() {
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        let complaint = raw
            .into_complaint()
            .with_context(|| format!("CSV row {row_no}"))?;
        records.push(complaint);
    }

    Ok(ComplaintDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "LOJA": "Loja A", "ESTADO": "SP", "STATUS": "Respondida",
///     "ANO": 2023, "TAMANHO_DESCRICAO": 412, "TEMPO": "2023-04-17" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<ComplaintDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let raw: RawComplaint = serde_json::from_value(row.clone())
            .with_context(|| format!("Row {i} does not match the complaint schema"))?;
        records.push(raw.into_complaint().with_context(|| format!("Row {i}"))?);
    }

    Ok(ComplaintDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per complaint field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<ComplaintDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let column = |name: &str| -> Result<ArrayRef> {
            let idx = schema
                .index_of(name)
                .map_err(|_| anyhow::anyhow!("Parquet file missing '{name}' column"))?;
            Ok(batch.column(idx).clone())
        };

        let store = column(COL_STORE)?;
        let state = column(COL_STATE)?;
        let status = column(COL_STATUS)?;
        let year = column(COL_YEAR)?;
        let length = column(COL_LENGTH)?;
        let time = date_column(column(COL_TIME)?)?;

        for row in 0..batch.num_rows() {
            let complaint = (|| -> Result<Complaint> {
                let year = integer_cell(&year, row, COL_YEAR)?;
                Ok(Complaint {
                    store: string_cell(&store, row, COL_STORE)?,
                    state: string_cell(&state, row, COL_STATE)?,
                    status: string_cell(&status, row, COL_STATUS)?,
                    year: i32::try_from(year).with_context(|| format!("{COL_YEAR} out of range"))?,
                    description_len: integer_cell(&length, row, COL_LENGTH)?,
                    time: date_cell(&time, row)?,
                })
            })()
            .with_context(|| format!("Row {}", offset + row))?;
            records.push(complaint);
        }
        offset += batch.num_rows();
    }

    Ok(ComplaintDataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// Timestamps and Date64 are converted to Date32 up front; text stays text.
fn date_column(col: ArrayRef) -> Result<ArrayRef> {
    match col.data_type() {
        DataType::Timestamp(_, _) | DataType::Date64 => {
            cast(col.as_ref(), &DataType::Date32).context("converting timestamp column to dates")
        }
        DataType::Date32 | DataType::Utf8 | DataType::LargeUtf8 => Ok(col),
        other => bail!("Column '{COL_TIME}' has unsupported type {other:?}"),
    }
}

fn string_cell(col: &ArrayRef, row: usize, name: &str) -> Result<String> {
    if col.is_null(row) {
        bail!("null value in '{name}'");
    }
    if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
        Ok(s.value(row).to_string())
    } else if let Some(s) = col.as_any().downcast_ref::<LargeStringArray>() {
        Ok(s.value(row).to_string())
    } else {
        bail!("Column '{name}' is {:?}, expected a string column", col.data_type())
    }
}

fn integer_cell(col: &ArrayRef, row: usize, name: &'static str) -> Result<i64> {
    if col.is_null(row) {
        bail!("null value in '{name}'");
    }
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.value(row) as i64)
    } else if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(parse_integer(&arr.value(row).to_string(), name)?)
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(parse_integer(&arr.value(row).to_string(), name)?)
    } else if let Some(arr) = any.downcast_ref::<StringArray>() {
        Ok(parse_integer(arr.value(row), name)?)
    } else {
        bail!("Column '{name}' is {:?}, expected a numeric column", col.data_type())
    }
}

fn date_cell(col: &ArrayRef, row: usize) -> Result<NaiveDate> {
    if col.is_null(row) {
        bail!("null value in '{COL_TIME}'");
    }
    let any = col.as_any();
    let text = if let Some(arr) = any.downcast_ref::<Date32Array>() {
        return arr
            .value_as_date(row)
            .with_context(|| format!("'{COL_TIME}' value out of range"));
    } else if let Some(arr) = any.downcast_ref::<StringArray>() {
        arr.value(row)
    } else if let Some(arr) = any.downcast_ref::<LargeStringArray>() {
        arr.value(row)
    } else {
        bail!("Column '{COL_TIME}' is {:?}, expected dates", col.data_type())
    };

    parse_timestamp(text).ok_or_else(|| {
        RecordError::Timestamp {
            column: COL_TIME,
            value: text.to_string(),
        }
        .into()
    })
}
