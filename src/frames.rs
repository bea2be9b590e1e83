//! Polars frames for everything the dashboard renders as a table or plot.
//!
//! Dates are rendered as `YYYY-MM-DD` strings so the frames print and export
//! identically regardless of polars' temporal formatting settings.
use std::collections::BTreeMap;
use std::io::Write;

use polars::prelude::*;

use crate::record::{FrequentTerm, NgramKind, RankedTerm};
use crate::schema::{TableId, COUNTS_COLUMN, DATE_COLUMN};
use crate::series::ChartData;

/// `date, counts, term` rows of the trend chart. A blank chart has no rows.
pub fn chart_frame(chart: &ChartData) -> PolarsResult<DataFrame> {
    let p = chart.points();
    df!(
        DATE_COLUMN   => p.iter().map(|r| r.date.format("%Y-%m-%d").to_string()).collect::<Vec<_>>(),
        COUNTS_COLUMN => p.iter().map(|r| r.counts).collect::<Vec<u64>>(),
        "term"        => p.iter().map(|r| r.term.clone()).collect::<Vec<_>>(),
    )
}

/// Day ranking with the drilldown table's `term` / `counts` columns.
pub fn ranking_frame(rows: &[RankedTerm]) -> PolarsResult<DataFrame> {
    df!(
        TableId::DayTerms.term_column() => rows.iter().map(|r| r.term.clone()).collect::<Vec<_>>(),
        COUNTS_COLUMN                   => rows.iter().map(|r| r.counts).collect::<Vec<u64>>(),
    )
}

/// Word-cloud input, in term order.
pub fn cloud_frame(cloud: &BTreeMap<String, u64>) -> PolarsResult<DataFrame> {
    df!(
        "term"        => cloud.keys().cloned().collect::<Vec<_>>(),
        COUNTS_COLUMN => cloud.values().copied().collect::<Vec<u64>>(),
    )
}

/// Aggregate table, keeping that table's own term column name.
pub fn frequent_frame(rows: &[FrequentTerm], kind: NgramKind) -> PolarsResult<DataFrame> {
    df!(
        TableId::frequent(kind).term_column() => rows.iter().map(|r| r.term.clone()).collect::<Vec<_>>(),
        COUNTS_COLUMN                         => rows.iter().map(|r| r.counts).collect::<Vec<u64>>(),
    )
}

pub fn write_csv<W: Write>(df: &mut DataFrame, w: W) -> PolarsResult<()> {
    CsvWriter::new(w).include_header(true).finish(df)
}

/// Show every row and column, untruncated, when frames are printed.
pub fn configure_display() {
    // Read by polars' pretty-printer (fmt feature).
    std::env::set_var("POLARS_FMT_TABLE_FORMATTING", "UTF8_FULL");
    std::env::set_var("POLARS_FMT_MAX_COLS", "100000");
    std::env::set_var("POLARS_FMT_MAX_ROWS", "1000000");
    std::env::set_var("POLARS_FMT_STR_LEN", "100000");
    std::env::set_var("POLARS_TABLE_WIDTH", "65535");
}
