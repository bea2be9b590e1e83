//! Chart-data assembly: every active term's full time series, concatenated
//! and tagged by term.
use serde::Serialize;

use crate::record::ChartPoint;
use crate::selection::Selection;
use crate::store::TermStore;

/// What the trend chart should draw.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "points", rename_all = "snake_case")]
pub enum ChartData {
    /// Nothing selected: draw an empty plot.
    #[default]
    Blank,
    /// Points sorted by date ascending, then term ascending.
    Series(Vec<ChartPoint>),
}

impl ChartData {
    pub fn is_blank(&self) -> bool { matches!(self, ChartData::Blank) }

    pub fn points(&self) -> &[ChartPoint] {
        match self {
            ChartData::Blank => &[],
            ChartData::Series(p) => p.as_slice(),
        }
    }

    pub fn len(&self) -> usize { self.points().len() }

    pub fn is_empty(&self) -> bool { self.points().is_empty() }

    /// Distinct terms in first-appearance order; one visual series each.
    pub fn terms(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for p in self.points() {
            if !out.contains(&p.term.as_str()) {
                out.push(&p.term);
            }
        }
        out
    }
}

/// Build the chart for `selection`.
///
/// An empty selection gives [`ChartData::Blank`]. A non-empty selection whose
/// terms are all unknown gives an empty [`ChartData::Series`].
pub fn assemble(selection: &Selection, store: &TermStore) -> ChartData {
    if selection.is_empty() {
        return ChartData::Blank;
    }
    let mut points: Vec<ChartPoint> = selection
        .iter()
        .flat_map(|term| {
            store
                .series_for(term)
                .into_iter()
                .map(move |(date, counts)| ChartPoint { date, counts, term: term.to_string() })
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.term.cmp(&b.term)));
    ChartData::Series(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DuplicatePolicy;
    use crate::record::TermRecord;
    use crate::selection::{aggregate, PinnedTerms};
    use crate::store::tests::{d, sample_store};

    #[test]
    fn empty_selection_is_blank() {
        let c = assemble(&Selection::default(), &sample_store());
        assert!(c.is_blank());
        assert!(c.terms().is_empty());
    }

    #[test]
    fn free_text_to_chart() {
        let store = sample_store();
        let sel = aggregate(Some("covid"), &PinnedTerms::new(), &[]);
        let c = assemble(&sel, &store);
        assert_eq!(
            c.points(),
            [
                ChartPoint { date: d("2020-01-01"), counts: 100, term: "covid".into() },
                ChartPoint { date: d("2020-01-02"), counts: 150, term: "covid".into() },
            ]
        );
    }

    #[test]
    fn rows_only_for_selected_terms_and_every_known_term_contributes() {
        let store = sample_store();
        let sel: Selection = ["virus", "covid", "ghost"].into_iter().collect();
        let c = assemble(&sel, &store);
        assert!(c.points().iter().all(|p| sel.contains(&p.term)));
        assert_eq!(c.terms(), ["covid", "virus"]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn overlapping_dates_are_ordered_by_term() {
        let store = sample_store();
        let sel: Selection = ["virus", "covid"].into_iter().collect();
        let order: Vec<_> = assemble(&sel, &store).points().iter().map(|p| (p.date, p.term.clone())).collect();
        assert_eq!(
            order,
            [
                (d("2020-01-01"), "covid".to_string()),
                (d("2020-01-01"), "virus".to_string()),
                (d("2020-01-02"), "covid".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_terms_give_empty_series_not_blank() {
        let store = TermStore::from_records(vec![TermRecord::new("a", 1, d("2020-01-01"))], DuplicatePolicy::KeepAll);
        let c = assemble(&["zzz"].into_iter().collect(), &store);
        assert!(!c.is_blank());
        assert!(c.is_empty());
    }
}
