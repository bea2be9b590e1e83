//! Registry mapping table identifiers to their on-disk / on-screen schema.
//!
//! The term-bearing column name is **not** uniform across tables: daily
//! unigrams and the per-day drilldown table use `term`, daily n-gram tables
//! use `gram`, and the aggregate n-gram tables use `bigram` / `trigram`.
//! That inconsistency comes from the upstream data and is kept as an explicit
//! lookup rather than guessed from headers.
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::record::NgramKind;

/// Column holding the integer frequency in every table.
pub const COUNTS_COLUMN: &str = "counts";
/// Column holding the observation date in daily tables.
pub const DATE_COLUMN: &str = "date";

/// Identifier for every table the dashboard knows about.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableId {
    DailyTerms,
    DailyBigrams,
    DailyTrigrams,
    FrequentTerms,
    FrequentBigrams,
    FrequentTrigrams,
    /// Ranking for the date of the last clicked chart point.
    DayTerms,
}

impl TableId {
    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(self) -> &'static str { schema_of(self).name }

    /// Daily (dated) table holding n-grams of `kind`.
    pub fn daily(kind: NgramKind) -> TableId {
        match kind {
            NgramKind::Unigram => TableId::DailyTerms,
            NgramKind::Bigram => TableId::DailyBigrams,
            NgramKind::Trigram => TableId::DailyTrigrams,
        }
    }

    /// Aggregate table holding n-grams of `kind`.
    pub fn frequent(kind: NgramKind) -> TableId {
        match kind {
            NgramKind::Unigram => TableId::FrequentTerms,
            NgramKind::Bigram => TableId::FrequentBigrams,
            NgramKind::Trigram => TableId::FrequentTrigrams,
        }
    }

    /// Name of the column carrying the term string in this table.
    pub fn term_column(self) -> &'static str { schema_of(self).term_column }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for TableId {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TABLES
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(s))
            .map(|t| t.id)
            .ok_or_else(|| format!("Unknown table: {}", s))
    }
}

/// Static description of one table.
#[derive(Clone, Debug)]
pub struct TableSchema {
    pub id: TableId,
    /// Stable name used in config, events and logs.
    pub name: &'static str,
    /// N-gram kind stored in the table; `None` for the mixed drilldown table.
    pub kind: Option<NgramKind>,
    /// Column holding the term string.
    pub term_column: &'static str,
    /// Whether rows carry a `date` column.
    pub dated: bool,
    /// Whether the dashboard lets the user check rows of this table.
    pub selectable: bool,
}

pub const TABLES: &[TableSchema] = &[
    TableSchema { id: TableId::DailyTerms, name: "daily_terms", kind: Some(NgramKind::Unigram), term_column: "term", dated: true, selectable: false },
    TableSchema { id: TableId::DailyBigrams, name: "daily_bigrams", kind: Some(NgramKind::Bigram), term_column: "gram", dated: true, selectable: false },
    TableSchema { id: TableId::DailyTrigrams, name: "daily_trigrams", kind: Some(NgramKind::Trigram), term_column: "gram", dated: true, selectable: false },
    TableSchema { id: TableId::FrequentTerms, name: "frequent_terms", kind: Some(NgramKind::Unigram), term_column: "term", dated: false, selectable: true },
    TableSchema { id: TableId::FrequentBigrams, name: "frequent_bigrams", kind: Some(NgramKind::Bigram), term_column: "bigram", dated: false, selectable: true },
    TableSchema { id: TableId::FrequentTrigrams, name: "frequent_trigrams", kind: Some(NgramKind::Trigram), term_column: "trigram", dated: false, selectable: true },
    TableSchema { id: TableId::DayTerms, name: "day_terms", kind: None, term_column: "term", dated: false, selectable: true },
];

/// Look up the schema for a table id.
pub fn schema_of(id: TableId) -> &'static TableSchema {
    // TABLES has one entry per variant, in declaration order.
    &TABLES[id as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_indexed_by_variant() {
        for (i, t) in TABLES.iter().enumerate() {
            assert_eq!(t.id as usize, i, "{} out of order", t.name);
        }
    }

    #[test]
    fn term_columns_follow_upstream_naming() {
        assert_eq!(TableId::FrequentTerms.term_column(), "term");
        assert_eq!(TableId::FrequentBigrams.term_column(), "bigram");
        assert_eq!(TableId::FrequentTrigrams.term_column(), "trigram");
        assert_eq!(TableId::DayTerms.term_column(), "term");
        assert_eq!(TableId::daily(NgramKind::Bigram).term_column(), "gram");
    }

    #[test]
    fn only_ui_tables_are_selectable() {
        let selectable: Vec<_> = TABLES.iter().filter(|t| t.selectable).map(|t| t.name).collect();
        assert_eq!(selectable, ["frequent_terms", "frequent_bigrams", "frequent_trigrams", "day_terms"]);
    }

    #[test]
    fn names_round_trip_through_from_str() {
        assert_eq!("Day_Terms".parse::<TableId>().unwrap(), TableId::DayTerms);
        assert!("weekly_terms".parse::<TableId>().is_err());
    }
}
