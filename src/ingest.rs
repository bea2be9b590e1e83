//! Lenient CSV ingestion for the daily and frequent tables.
//!
//! ### Rules
//! - Columns are located by header name through the [`crate::schema`] registry;
//!   an unnamed leading index column (as written by dataframe exports) is
//!   simply never looked at.
//! - A missing file or a missing required column is fatal ([`DataLoadError`]).
//! - A row whose count or date cannot be coerced, whose term is empty, or
//!   whose field count is wrong is skipped and counted in [`LoadReport`].
//!
//! ### Example
//! ```
//! use ngram_trends::ingest::{parse_counts, parse_date};
//! assert_eq!(parse_counts("150.0"), Some(150));
//! assert_eq!(parse_counts("n/a"), None);
//! assert_eq!(parse_date("2020-03-22 00:00:00").unwrap().to_string(), "2020-03-22");
//! ```
use std::fs::File;
use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info};

use crate::error::DataLoadError;
use crate::record::{FrequentTerm, TermRecord};
use crate::schema::{schema_of, TableId, COUNTS_COLUMN, DATE_COLUMN};

/// Row accounting for one loaded table.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoadReport {
    pub table: TableId,
    pub kept: usize,
    pub skipped: usize,
}

/// Coerce a count cell. Integers and integral floats are accepted; negative,
/// fractional, non-finite and non-numeric values are invalid.
pub fn parse_counts(cell: &str) -> Option<u64> {
    let s = cell.trim();
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

/// Coerce a date cell: plain dates, naive timestamps and RFC 3339 timestamps.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let s = cell.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DataLoadError::Missing { path: path.to_path_buf() },
        _ => DataLoadError::Io { path: path.to_path_buf(), source },
    })
}

fn column(headers: &StringRecord, name: &'static str, origin: &Path) -> Result<usize, DataLoadError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| DataLoadError::MissingColumn { path: origin.to_path_buf(), column: name })
}

fn reader<R: io::Read>(rdr: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(rdr)
}

/// Visit every well-formed row, handing the callback the resolved cells.
/// Returns `(kept, skipped)`.
fn scan<R, F>(rdr: R, origin: &Path, columns: &[&'static str], mut on_row: F) -> Result<(usize, usize), DataLoadError>
where
    R: io::Read,
    F: FnMut(&[&str]) -> bool,
{
    let mut rdr = reader(rdr);
    let headers = rdr
        .headers()
        .map_err(|source| DataLoadError::Csv { path: origin.to_path_buf(), source })?
        .clone();
    let idx = columns
        .iter()
        .map(|c| column(&headers, c, origin))
        .collect::<Result<Vec<_>, _>>()?;

    let (mut kept, mut skipped) = (0usize, 0usize);
    for rec in rdr.records() {
        let r = match rec {
            Ok(r) => r,
            Err(e) => {
                debug!(path = %origin.display(), error = %e, "skipping unreadable row");
                skipped += 1;
                continue;
            }
        };
        if r.len() != headers.len() {
            debug!(path = %origin.display(), fields = r.len(), expected = headers.len(), "skipping row with wrong field count");
            skipped += 1;
            continue;
        }
        let mut cells: Vec<&str> = Vec::with_capacity(idx.len());
        for &i in &idx {
            match r.get(i) {
                Some(c) => cells.push(c),
                None => break,
            }
        }
        if cells.len() == idx.len() && on_row(cells.as_slice()) {
            kept += 1;
        } else {
            skipped += 1;
        }
    }
    Ok((kept, skipped))
}

/// Parse a dated table from any reader. `origin` is only used in errors.
pub fn read_daily_from<R: io::Read>(rdr: R, origin: &Path, table: TableId) -> Result<(Vec<TermRecord>, LoadReport), DataLoadError> {
    let schema = schema_of(table);
    let mut out = Vec::new();
    let (kept, skipped) = scan(rdr, origin, &[schema.term_column, COUNTS_COLUMN, DATE_COLUMN], |c| {
        let term = c[0].trim();
        match (term.is_empty(), parse_counts(c[1]), parse_date(c[2])) {
            (false, Some(counts), Some(date)) => {
                out.push(TermRecord::new(term, counts, date));
                true
            }
            _ => false,
        }
    })?;
    Ok((out, LoadReport { table, kept, skipped }))
}

/// Parse an aggregate (date-less) table from any reader.
pub fn read_frequent_from<R: io::Read>(rdr: R, origin: &Path, table: TableId) -> Result<(Vec<FrequentTerm>, LoadReport), DataLoadError> {
    let schema = schema_of(table);
    let mut out = Vec::new();
    let (kept, skipped) = scan(rdr, origin, &[schema.term_column, COUNTS_COLUMN], |c| {
        let term = c[0].trim();
        match (term.is_empty(), parse_counts(c[1])) {
            (false, Some(counts)) => {
                out.push(FrequentTerm { term: term.to_string(), counts });
                true
            }
            _ => false,
        }
    })?;
    Ok((out, LoadReport { table, kept, skipped }))
}

pub fn read_daily(path: &Path, table: TableId) -> Result<(Vec<TermRecord>, LoadReport), DataLoadError> {
    let out = read_daily_from(open(path)?, path, table)?;
    info!(table = %table, path = %path.display(), kept = out.1.kept, skipped = out.1.skipped, "loaded daily table");
    Ok(out)
}

pub fn read_frequent(path: &Path, table: TableId) -> Result<(Vec<FrequentTerm>, LoadReport), DataLoadError> {
    let out = read_frequent_from(open(path)?, path, table)?;
    info!(table = %table, path = %path.display(), kept = out.1.kept, skipped = out.1.skipped, "loaded frequent table");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ymd;

    fn origin() -> &'static Path { Path::new("inline.csv") }

    #[test]
    fn counts_coercion() {
        assert_eq!(parse_counts(" 42 "), Some(42));
        assert_eq!(parse_counts("42.0"), Some(42));
        assert_eq!(parse_counts("42.5"), None);
        assert_eq!(parse_counts("-3"), None);
        assert_eq!(parse_counts("NaN"), None);
        assert_eq!(parse_counts(""), None);
    }

    #[test]
    fn date_coercion() {
        let d = ymd("2020-03-22");
        assert_eq!(parse_date("2020-03-22"), d);
        assert_eq!(parse_date("2020-03-22T00:00:00.000Z"), d);
        assert_eq!(parse_date("2020-03-22T00:00:00"), d);
        assert_eq!(parse_date("2020-03-22 00:00:00"), d);
        assert_eq!(parse_date("22/03/2020"), None);
        assert_eq!(parse_date("NaT"), None);
    }

    #[test]
    fn daily_rows_with_bad_cells_are_skipped() {
        let csv = ",term,counts,date\n\
                   0,covid,100,2020-01-01\n\
                   1,virus,lots,2020-01-01\n\
                   2,mask,5,not-a-date\n\
                   3,,7,2020-01-01\n\
                   4,covid,150.0,2020-01-02\n\
                   5,short\n\
                   6,mask,12,2020-01-03,999\n\
                   7,mask,12,2020-01-03,\n";
        let (rows, rep) = read_daily_from(csv.as_bytes(), origin(), TableId::DailyTerms).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], TermRecord::new("covid", 150, ymd("2020-01-02").unwrap()));
        assert_eq!(rep, LoadReport { table: TableId::DailyTerms, kept: 2, skipped: 6 });
    }

    #[test]
    fn daily_ngram_tables_use_gram_column() {
        let csv = "gram,counts,date\nstay home,12,2020-04-01\n";
        let (rows, _) = read_daily_from(csv.as_bytes(), origin(), TableId::DailyBigrams).unwrap();
        assert_eq!(rows[0].term, "stay home");

        let err = read_daily_from("term,counts,date\n".as_bytes(), origin(), TableId::DailyBigrams).unwrap_err();
        assert!(matches!(err, DataLoadError::MissingColumn { column: "gram", .. }));
    }

    #[test]
    fn frequent_table_ignores_extra_columns() {
        let csv = "trigram,counts,share\nwash your hands,900,0.1\nstay at home,x,0.2\n";
        let (rows, rep) = read_frequent_from(csv.as_bytes(), origin(), TableId::FrequentTrigrams).unwrap();
        assert_eq!(rows, vec![FrequentTerm { term: "wash your hands".into(), counts: 900 }]);
        assert_eq!(rep.skipped, 1);
    }

    #[test]
    fn undecodable_header_is_fatal() {
        let bytes: &[u8] = b"te\xffrm,counts,date\ncovid,1,2020-01-01\n";
        let err = read_daily_from(bytes, origin(), TableId::DailyTerms).unwrap_err();
        assert!(matches!(err, DataLoadError::Csv { .. }), "{err}");
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = read_daily(Path::new("/nonexistent/all_terms.csv"), TableId::DailyTerms).unwrap_err();
        assert!(matches!(err, DataLoadError::Missing { .. }));
    }
}
