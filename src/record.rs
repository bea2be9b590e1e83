//! Core types for **term records**, **rankings** and **chart points**.
//!
//! This module holds the data model used across the crate. Records are owned
//! (`String` terms, `chrono::NaiveDate` dates) because everything is loaded
//! once from flat files at startup and never mutated afterwards.
//!
//! # N-gram kinds
//! Every daily and frequent table is restricted to exactly one [`NgramKind`].
//! The kind only matters at load time (which file, which term column); once
//! loaded, a bigram such as `"stay home"` is looked up like any other term.
use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of words per term in a table.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NgramKind {
    /// Single words (`"covid"`).
    Unigram,
    /// Two-word terms (`"stay home"`).
    Bigram,
    /// Three-word terms (`"wash your hands"`).
    Trigram,
}

impl NgramKind {
    /// All kinds, in load order.
    pub const ALL: [NgramKind; 3] = [NgramKind::Unigram, NgramKind::Bigram, NgramKind::Trigram];

    /// Stable lowercase name (`unigram`, `bigram`, `trigram`).
    pub fn as_str(self) -> &'static str {
        match self {
            NgramKind::Unigram => "unigram",
            NgramKind::Bigram => "bigram",
            NgramKind::Trigram => "trigram",
        }
    }
}

impl fmt::Display for NgramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl std::str::FromStr for NgramKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unigram" | "unigrams" | "term" | "terms" | "1" => Ok(Self::Unigram),
            "bigram" | "bigrams" | "2" => Ok(Self::Bigram),
            "trigram" | "trigrams" | "3" => Ok(Self::Trigram),
            other => Err(format!("Unknown n-gram kind: {}", other)),
        }
    }
}

/// One daily observation: `term` was counted `counts` times on `date`.
///
/// `(term, date)` is not guaranteed unique in source data; see
/// [`crate::config::DuplicatePolicy`] for how the store resolves repeats.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TermRecord {
    pub term: String,
    pub counts: u64,
    pub date: NaiveDate,
}

impl TermRecord {
    pub fn new(term: impl Into<String>, counts: u64, date: NaiveDate) -> Self {
        TermRecord { term: term.into(), counts, date }
    }
}

/// A row of an aggregate (date-less) frequency table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FrequentTerm {
    pub term: String,
    pub counts: u64,
}

/// A row of a per-day ranking: `(term, counts)`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RankedTerm {
    pub term: String,
    pub counts: u64,
}

/// A single point of the trend chart, tagged by the term it belongs to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub counts: u64,
    pub term: String,
}

/// Convenience for tests and doc examples: parse a `YYYY-MM-DD` literal.
///
/// Returns `None` for anything that is not a valid calendar date.
pub fn ymd(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_plural_and_numeric_aliases() {
        assert_eq!("Bigrams".parse::<NgramKind>().unwrap(), NgramKind::Bigram);
        assert_eq!("3".parse::<NgramKind>().unwrap(), NgramKind::Trigram);
        assert!("quadgram".parse::<NgramKind>().is_err());
    }

    #[test]
    fn ymd_rejects_impossible_dates() {
        assert!(ymd("2020-02-30").is_none());
        assert_eq!(ymd("2020-03-01").unwrap().to_string(), "2020-03-01");
    }
}
