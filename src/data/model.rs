use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// RecordError – a raw row that cannot become a Complaint
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("column {column}: '{value}' is not a valid timestamp")]
    Timestamp { column: &'static str, value: String },
    #[error("column {column}: '{value}' is not an integer")]
    Integer { column: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// RawComplaint – one row as it appears in the source file
// ---------------------------------------------------------------------------

/// Source column names.
pub const COL_STORE: &str = "LOJA";
pub const COL_STATE: &str = "ESTADO";
pub const COL_STATUS: &str = "STATUS";
pub const COL_YEAR: &str = "ANO";
pub const COL_LENGTH: &str = "TAMANHO_DESCRICAO";
pub const COL_TIME: &str = "TEMPO";

/// Untyped row straight out of a CSV / JSON file. Numbers are kept as text so
/// both `2023` and `2023.0` are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComplaint {
    #[serde(rename = "LOJA")]
    pub store: String,
    #[serde(rename = "ESTADO")]
    pub state: String,
    #[serde(rename = "STATUS")]
    pub status: String,
    #[serde(rename = "ANO", deserialize_with = "number_as_text")]
    pub year: String,
    #[serde(rename = "TAMANHO_DESCRICAO", deserialize_with = "number_as_text")]
    pub description_len: String,
    #[serde(rename = "TEMPO")]
    pub time: String,
}

/// JSON numbers and strings both end up as text.
fn number_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Int(i) => i.to_string(),
        NumberOrText::Float(f) => f.to_string(),
        NumberOrText::Text(s) => s,
    })
}

impl RawComplaint {
    /// Validate and type the row.
    pub fn into_complaint(self) -> Result<Complaint, RecordError> {
        let year = parse_integer(&self.year, COL_YEAR)?;
        let year = i32::try_from(year).map_err(|_| RecordError::Integer {
            column: COL_YEAR,
            value: self.year.clone(),
        })?;
        let description_len = parse_integer(&self.description_len, COL_LENGTH)?;
        let time = parse_timestamp(&self.time).ok_or_else(|| RecordError::Timestamp {
            column: COL_TIME,
            value: self.time.clone(),
        })?;

        Ok(Complaint {
            store: self.store,
            state: self.state,
            status: self.status,
            year,
            description_len,
            time,
        })
    }
}

/// Accepts `"42"` and `"42.0"`, rejects `"42.5"`.
pub fn parse_integer(value: &str, column: &'static str) -> Result<i64, RecordError> {
    let trimmed = value.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Ok(i);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Ok(f as i64),
        _ => Err(RecordError::Integer {
            column,
            value: value.to_string(),
        }),
    }
}

/// Parse a date or datetime string, keeping only the calendar date.
pub fn parse_timestamp(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
    ];

    let trimmed = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}

// ---------------------------------------------------------------------------
// Complaint – one typed row
// ---------------------------------------------------------------------------

/// A single complaint. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complaint {
    pub store: String,
    /// Region of the complaint (a Brazilian state in the source data).
    pub state: String,
    pub status: String,
    pub year: i32,
    pub description_len: i64,
    pub time: NaiveDate,
}

impl Complaint {
    /// First day of the month the complaint was filed in.
    pub fn month(&self) -> NaiveDate {
        self.time.with_day(1).unwrap_or(self.time)
    }
}

// ---------------------------------------------------------------------------
// ComplaintDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column domains.
#[derive(Debug, Clone, Default)]
pub struct ComplaintDataset {
    pub records: Vec<Complaint>,
    /// Sorted distinct values of each categorical dimension.
    pub stores: Vec<String>,
    pub states: Vec<String>,
    pub statuses: Vec<String>,
    pub years: Vec<i32>,
}

impl ComplaintDataset {
    /// Build column domains from the loaded records.
    pub fn from_records(records: Vec<Complaint>) -> Self {
        let mut stores = BTreeSet::new();
        let mut states = BTreeSet::new();
        let mut statuses = BTreeSet::new();
        let mut years = BTreeSet::new();

        for rec in &records {
            stores.insert(rec.store.clone());
            states.insert(rec.state.clone());
            statuses.insert(rec.status.clone());
            years.insert(rec.year);
        }

        ComplaintDataset {
            records,
            stores: stores.into_iter().collect(),
            states: states.into_iter().collect(),
            statuses: statuses.into_iter().collect(),
            years: years.into_iter().collect(),
        }
    }

    /// Inclusive (min, max) description length over the whole dataset.
    pub fn length_bounds(&self) -> Option<(i64, i64)> {
        let min = self.records.iter().map(|r| r.description_len).min()?;
        let max = self.records.iter().map(|r| r.description_len).max()?;
        Some((min, max))
    }

    /// Number of complaints.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn complaint(store: &str, state: &str, status: &str, year: i32, len: i64) -> Complaint {
        Complaint {
            store: store.to_string(),
            state: state.to_string(),
            status: status.to_string(),
            year,
            description_len: len,
            time: NaiveDate::from_ymd_opt(year, 3, 17).unwrap(),
        }
    }

    fn raw(year: &str, len: &str, time: &str) -> RawComplaint {
        RawComplaint {
            store: "A".into(),
            state: "SP".into(),
            status: "Open".into(),
            year: year.into(),
            description_len: len.into(),
            time: time.into(),
        }
    }

    #[test]
    fn raw_row_converts() {
        let c = raw("2023.0", "120", "2023-05-09 14:02:11").into_complaint().unwrap();
        assert_eq!(c.year, 2023);
        assert_eq!(c.description_len, 120);
        assert_eq!(c.time, NaiveDate::from_ymd_opt(2023, 5, 9).unwrap());
        assert_eq!(c.month(), NaiveDate::from_ymd_opt(2023, 5, 1).unwrap());
    }

    #[test]
    fn fractional_length_is_rejected() {
        let err = raw("2023", "12.5", "2023-05-09").into_complaint().unwrap_err();
        assert_eq!(
            err,
            RecordError::Integer {
                column: COL_LENGTH,
                value: "12.5".into()
            }
        );
    }

    #[test]
    fn bad_timestamp_is_rejected() {
        let err = raw("2023", "12", "yesterday").into_complaint().unwrap_err();
        assert!(matches!(err, RecordError::Timestamp { .. }));
    }

    #[test]
    fn timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2022, 11, 30);
        assert_eq!(parse_timestamp("2022-11-30"), expected);
        assert_eq!(parse_timestamp("30/11/2022"), expected);
        assert_eq!(parse_timestamp("2022-11-30T08:15:00.250"), expected);
        assert_eq!(parse_timestamp("2022-11-30 08:15"), expected);
    }

    #[test]
    fn domains_are_sorted_and_distinct() {
        let ds = ComplaintDataset::from_records(vec![
            complaint("B", "RJ", "Open", 2023, 10),
            complaint("A", "SP", "Closed", 2022, 300),
            complaint("B", "SP", "Open", 2023, 45),
        ]);
        assert_eq!(ds.stores, vec!["A", "B"]);
        assert_eq!(ds.states, vec!["RJ", "SP"]);
        assert_eq!(ds.statuses, vec!["Closed", "Open"]);
        assert_eq!(ds.years, vec![2022, 2023]);
        assert_eq!(ds.length_bounds(), Some((10, 300)));
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = ComplaintDataset::from_records(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.length_bounds(), None);
    }
}
