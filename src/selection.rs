//! Selection aggregation: free text, pinned terms and checked table rows are
//! folded into one deduplicated set of **active terms**.
//!
//! Row indices refer to the table snapshot *as the UI currently shows it*
//! (after its own sorting and filtering), so each [`TableSelection`] carries
//! that snapshot alongside the indices. Indices past the end of the snapshot
//! are stale and skipped.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Miss;
use crate::schema::TableId;

/// One row of a UI table snapshot, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Checked rows of one UI table together with the snapshot they index into.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableSelection {
    pub table: TableId,
    #[serde(default)]
    pub selected_rows: Vec<usize>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl TableSelection {
    pub fn new(table: TableId, selected_rows: Vec<usize>, rows: Vec<Row>) -> Self {
        TableSelection { table, selected_rows, rows }
    }

    /// Resolve the checked rows to term strings through the table's term column.
    fn terms(&self) -> impl Iterator<Item = String> + '_ {
        let table = self.table;
        let column = table.term_column();
        self.selected_rows.iter().filter_map(move |&i| {
            let Some(row) = self.rows.get(i) else {
                debug!(miss = %Miss::StaleSelectionIndex { table, index: i, len: self.rows.len() }, "skipping row");
                return None;
            };
            cell_term(row.get(column)?)
        })
    }
}

fn cell_term(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Deduplicated set of active terms, iterated in lexical order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Selection(BTreeSet<String>);

impl Selection {
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn contains(&self, term: &str) -> bool { self.0.contains(term) }
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(String::as_str) }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Selection(iter.into_iter().map(Into::into).collect())
    }
}

/// Terms the user added by hand; they stay active across events until removed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PinnedTerms(Vec<String>);

impl PinnedTerms {
    pub fn new() -> Self { Self::default() }

    /// Pin `term` (trimmed). Returns `false` for blank or already-pinned terms.
    pub fn add(&mut self, term: &str) -> bool {
        let t = term.trim();
        if t.is_empty() || self.0.iter().any(|p| p == t) {
            return false;
        }
        self.0.push(t.to_string());
        true
    }

    /// Unpin `term`. Returns whether it was pinned.
    pub fn remove(&mut self, term: &str) -> bool {
        let t = term.trim();
        let before = self.0.len();
        self.0.retain(|p| p != t);
        self.0.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(String::as_str) }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

/// Union free text, pinned terms and every table selection into one [`Selection`].
///
/// # Examples
/// ```
/// use ngram_trends::selection::{aggregate, PinnedTerms};
/// let s = aggregate(Some("covid"), &PinnedTerms::new(), &[]);
/// assert_eq!(s.iter().collect::<Vec<_>>(), ["covid"]);
/// ```
pub fn aggregate(free_text: Option<&str>, pinned: &PinnedTerms, tables: &[TableSelection]) -> Selection {
    let text = free_text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
    let picked = tables.iter().flat_map(TableSelection::terms);
    text.into_iter()
        .chain(pinned.iter().map(str::to_string))
        .chain(picked)
        .collect()
}
