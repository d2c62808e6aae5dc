//! CSV ingestion into a column-typed record table.
//!
//! Every column is classified once at load time: if all of its non-empty
//! cells parse as `f64` it is numeric (empty cells become NaN), otherwise it
//! is kept as text. Timestamp columns are usually text and are parsed on
//! demand by [`parse_timestamp`].

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use cs_common::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Column names recognised as the timestamp column, in priority order.
pub const TIME_COLUMN_CANDIDATES: [&str; 6] = ["timestamp", "ts", "time", "datetime", "date", "t"];

/// Naive (zone-less) layouts accepted for timestamps, tried in order.
const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
];

/// Values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// All non-empty cells parsed as numbers; missing cells are NaN.
    Numeric(Vec<f64>),
    /// Raw trimmed cell text.
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnData::Numeric(_))
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn text(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Text(values),
        }
    }
}

/// Ordered rows of a sensor recording, stored column-wise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordTable {
    columns: Vec<Column>,
    n_rows: usize,
}

impl RecordTable {
    /// Build a table; every column must have the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map_or(0, |c| c.data.len());
        if let Some(bad) = columns.iter().find(|c| c.data.len() != n_rows) {
            return Err(Error::InvalidShape {
                expected: format!("{n_rows} rows in every column"),
                actual: vec![bad.data.len()],
            });
        }
        Ok(Self { columns, n_rows })
    }

    /// Build a table whose columns are already known to share `n_rows`.
    pub(crate) fn from_parts(columns: Vec<Column>, n_rows: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.data.len() == n_rows));
        Self { columns, n_rows }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// First column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// The timestamp column, if any candidate name is present.
    pub fn time_column(&self) -> Option<&str> {
        TIME_COLUMN_CANDIDATES
            .iter()
            .copied()
            .find(|candidate| self.column(candidate).is_some())
    }

    /// Parse a CSV document with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            for (col, value) in cells.iter_mut().zip(record.iter()) {
                col.push(value.to_string());
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| Column {
                name,
                data: classify(raw),
            })
            .collect();
        Self::from_columns(columns)
    }
}

fn classify(raw: Vec<String>) -> ColumnData {
    let numeric: Option<Vec<f64>> = raw
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                Some(f64::NAN)
            } else {
                cell.parse::<f64>().ok()
            }
        })
        .collect();
    match numeric {
        Some(values) => ColumnData::Numeric(values),
        None => ColumnData::Text(raw),
    }
}

/// Read a CSV recording from disk.
pub fn read_csv(path: &Path) -> Result<RecordTable> {
    let file = std::fs::File::open(path)?;
    let table = RecordTable::from_reader(std::io::BufReader::new(file))?;
    debug!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.columns().len(),
        "csv loaded"
    );
    Ok(table)
}

/// Parse one timestamp cell to microseconds since the Unix epoch.
///
/// Accepts RFC 3339, ISO-8601-like naive date-times (treated as UTC),
/// bare dates, and plain numbers (Unix seconds). Returns `None` when the
/// cell is empty or matches none of these.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_micros());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.timestamp_micros());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc().timestamp_micros());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|ndt| ndt.and_utc().timestamp_micros());
    }
    s.parse::<f64>().ok().and_then(seconds_to_micros)
}

/// Convert Unix seconds to microseconds.
///
/// `None` for non-finite input or instants outside the `i64` microsecond range.
pub fn seconds_to_micros(secs: f64) -> Option<i64> {
    let micros = (secs * 1e6).round();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if micros.is_finite() && micros >= i64::MIN as f64 && micros < i64::MAX as f64 {
        Some(micros as i64)
    } else {
        None
    }
}

/// Parse every cell of a column as a timestamp.
pub fn parse_time_column(column: &Column) -> Vec<Option<i64>> {
    match &column.data {
        ColumnData::Numeric(values) => values.iter().map(|&v| seconds_to_micros(v)).collect(),
        ColumnData::Text(values) => values.iter().map(|v| parse_timestamp(v)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> RecordTable {
        RecordTable::from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn classifies_numeric_and_text_columns() {
        let t = table(
            "timestamp,ax,label\n2026-01-01T00:00:00,1.5,walk\n2026-01-01T00:00:01,,run\n",
        );
        assert_eq!(t.n_rows(), 2);
        assert!(!t.column("timestamp").unwrap().data.is_numeric());
        assert!(!t.column("label").unwrap().data.is_numeric());
        match &t.column("ax").unwrap().data {
            ColumnData::Numeric(v) => {
                assert_eq!(v[0], 1.5);
                assert!(v[1].is_nan());
            }
            other => panic!("expected numeric column, got {other:?}"),
        }
    }

    #[test]
    fn cells_are_trimmed() {
        let t = table("a , b\n 1 , 2 \n");
        assert_eq!(t.column_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            t.column("b").unwrap().data,
            ColumnData::Numeric(vec![2.0])
        );
    }

    #[test]
    fn time_column_priority() {
        let t = table("t,time,x\n1,2,3\n");
        assert_eq!(t.time_column(), Some("time"));
        let t = table("date,ts,x\n1,2,3\n");
        assert_eq!(t.time_column(), Some("ts"));
        let t = table("x,y\n1,2\n");
        assert_eq!(t.time_column(), None);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = RecordTable::from_reader("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let t = table("ax,ay\n");
        assert_eq!(t.n_rows(), 0);
        assert_eq!(t.columns().len(), 2);
    }

    #[test]
    fn parses_common_timestamp_layouts() {
        let base = parse_timestamp("2026-01-15T14:30:22").unwrap();
        assert_eq!(parse_timestamp("2026-01-15 14:30:22"), Some(base));
        assert_eq!(parse_timestamp("2026-01-15T14:30:22Z"), Some(base));
        assert_eq!(parse_timestamp("2026-01-15T14:30:22+00:00"), Some(base));
        assert_eq!(
            parse_timestamp("2026-01-15T14:30:22.250000"),
            Some(base + 250_000)
        );
        assert_eq!(
            parse_timestamp("2026-01-15T16:30:22+02:00"),
            Some(base),
            "offsets are normalised to UTC"
        );
        assert_eq!(
            parse_timestamp("2026-01-15"),
            Some(base - (14 * 3600 + 30 * 60 + 22) * 1_000_000)
        );
    }

    #[test]
    fn numeric_timestamps_are_unix_seconds() {
        assert_eq!(parse_timestamp("1.5"), Some(1_500_000));
        assert_eq!(parse_timestamp("0"), Some(0));
    }

    #[test]
    fn garbage_timestamps_are_rejected() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not-a-time"), None);
        assert_eq!(parse_timestamp("2026-13-45T99:00:00"), None);
        assert_eq!(parse_timestamp("NaN"), None);
    }

    #[test]
    fn out_of_range_seconds_are_rejected() {
        assert_eq!(seconds_to_micros(1e300), None);
        assert_eq!(seconds_to_micros(-1e300), None);
        assert_eq!(seconds_to_micros(9.3e12), None);
        assert!(seconds_to_micros(-9.2e12).is_some());
        assert_eq!(parse_timestamp("1e20"), None);
    }

    #[test]
    fn numeric_time_column_parses_as_seconds() {
        let col = Column::numeric("t", vec![0.0, 0.02, f64::NAN]);
        assert_eq!(
            parse_time_column(&col),
            vec![Some(0), Some(20_000), None]
        );
    }

    #[test]
    fn mismatched_columns_rejected() {
        let err = RecordTable::from_columns(vec![
            Column::numeric("a", vec![1.0, 2.0]),
            Column::numeric("b", vec![1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InvalidShape { .. }));
    }
}
