//! The read-only **term store**: daily n-gram observations plus the three
//! aggregate frequency tables, loaded once and shared by every lookup.
//!
//! Lookups never fail. An unknown term or date yields an empty result and a
//! `debug` log line ([`Miss::LookupMiss`]).
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::{DuplicatePolicy, StorePaths};
use crate::error::{DataLoadError, Miss};
use crate::ingest::{self, LoadReport};
use crate::record::{FrequentTerm, NgramKind, RankedTerm, TermRecord};
use crate::schema::TableId;

/// Daily term observations indexed by term and by date.
#[derive(Clone, Debug, Default)]
pub struct TermStore {
    records: Vec<TermRecord>,
    /// term -> record positions, ascending by date.
    by_term: HashMap<String, Vec<usize>>,
    /// date -> record positions, in load order.
    by_date: BTreeMap<NaiveDate, Vec<usize>>,
    frequent: [Vec<FrequentTerm>; 3],
}

impl TermStore {
    /// Load all six tables. Any missing or structurally broken file aborts the
    /// load; individual bad rows are skipped.
    pub fn load(paths: &StorePaths, policy: DuplicatePolicy) -> Result<(Self, Vec<LoadReport>), DataLoadError> {
        let mut reports = Vec::with_capacity(6);
        let mut records = Vec::new();
        for (kind, path) in paths.daily.iter() {
            let (rows, rep) = ingest::read_daily(path, TableId::daily(*kind))?;
            records.extend(rows);
            reports.push(rep);
        }
        let mut frequent: [Vec<FrequentTerm>; 3] = Default::default();
        for (kind, path) in paths.frequent.iter() {
            let (rows, rep) = ingest::read_frequent(path, TableId::frequent(*kind))?;
            frequent[*kind as usize] = rows;
            reports.push(rep);
        }
        let store = Self::from_records(records, policy).with_frequent(frequent);
        info!(records = store.len(), terms = store.by_term.len(), dates = store.by_date.len(), "term store ready");
        Ok((store, reports))
    }

    /// Build a store from already-parsed daily records.
    ///
    /// # Examples
    /// ```
    /// use ngram_trends::{config::DuplicatePolicy, record::{ymd, TermRecord}, TermStore};
    /// let d = ymd("2020-01-01").unwrap();
    /// let store = TermStore::from_records(
    ///     vec![TermRecord::new("covid", 100, d), TermRecord::new("covid", 100, d)],
    ///     DuplicatePolicy::DropExact,
    /// );
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn from_records(records: Vec<TermRecord>, policy: DuplicatePolicy) -> Self {
        let before = records.len();
        let records = resolve_duplicates(records, policy);
        if records.len() != before {
            debug!(?policy, before, after = records.len(), "resolved duplicate (term, date) records");
        }

        let mut by_term: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (i, r) in records.iter().enumerate() {
            by_term.entry(r.term.clone()).or_default().push(i);
            by_date.entry(r.date).or_default().push(i);
        }
        for ids in by_term.values_mut() {
            // Stable: repeated points on one date keep load order.
            ids.sort_by_key(|&i| records[i].date);
        }
        TermStore { records, by_term, by_date, frequent: Default::default() }
    }

    /// Attach the aggregate tables, indexed by [`NgramKind`].
    pub fn with_frequent(mut self, frequent: [Vec<FrequentTerm>; 3]) -> Self {
        self.frequent = frequent;
        self
    }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Every date with at least one record, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ { self.by_date.keys().copied() }

    /// Aggregate frequency table for `kind`, in file order.
    pub fn frequent(&self, kind: NgramKind) -> &[FrequentTerm] { &self.frequent[kind as usize] }

    /// Time series of `term` as `(date, counts)`, ascending by date.
    /// Empty for an unknown term.
    pub fn series_for(&self, term: &str) -> Vec<(NaiveDate, u64)> {
        match self.by_term.get(term) {
            Some(ids) => ids.iter().map(|&i| (self.records[i].date, self.records[i].counts)).collect(),
            None => {
                debug!(miss = %Miss::LookupMiss { key: term.to_string() }, "series lookup");
                Vec::new()
            }
        }
    }

    /// All terms recorded on `date`, by counts descending then term ascending.
    /// Empty for an unknown date.
    pub fn ranking_for(&self, date: NaiveDate) -> Vec<RankedTerm> {
        let Some(ids) = self.by_date.get(&date) else {
            debug!(miss = %Miss::LookupMiss { key: date.to_string() }, "ranking lookup");
            return Vec::new();
        };
        let mut rows: Vec<RankedTerm> = ids
            .iter()
            .map(|&i| RankedTerm { term: self.records[i].term.clone(), counts: self.records[i].counts })
            .collect();
        rows.sort_by(|a, b| b.counts.cmp(&a.counts).then_with(|| a.term.cmp(&b.term)));
        rows
    }

    /// Terms on `date` whose count lies in
    /// `[center * (1 - width), center * (1 + width)]` (bounds inclusive).
    ///
    /// A zero `center` yields an empty map. When a term has several records on
    /// the date, the largest in-band count is kept.
    pub fn neighborhood(&self, date: NaiveDate, center: u64, width: f64) -> BTreeMap<String, u64> {
        let mut out = BTreeMap::new();
        if center == 0 {
            return out;
        }
        let Some(ids) = self.by_date.get(&date) else {
            debug!(miss = %Miss::LookupMiss { key: date.to_string() }, "neighborhood lookup");
            return out;
        };
        for &i in ids {
            let r = &self.records[i];
            if in_band(r.counts, center, width) {
                let slot = out.entry(r.term.clone()).or_insert(r.counts);
                *slot = (*slot).max(r.counts);
            }
        }
        out
    }
}

/// Resolution of `width` in [`in_band`]: widths are compared in millionths.
const WIDTH_SCALE: u128 = 1_000_000;

/// Approximate `[lo, hi]` frequency band around `center`, for display.
pub fn band(center: u64, width: f64) -> (f64, f64) {
    let c = center as f64;
    (c * (1.0 - width), c * (1.0 + width))
}

/// Whether `count` lies in `[center * (1 - width), center * (1 + width)]`,
/// edges included.
///
/// Evaluated as `|count - center| * S <= center * round(width * S)` in integers
/// so counts sitting exactly on an edge are never lost to float rounding.
pub fn in_band(count: u64, center: u64, width: f64) -> bool {
    // Saturates for huge widths; NaN maps to zero.
    let w = (width.max(0.0) * WIDTH_SCALE as f64).round() as u128;
    let diff = u128::from(count.abs_diff(center)) * WIDTH_SCALE;
    match u128::from(center).checked_mul(w) {
        Some(limit) => diff <= limit,
        None => true,
    }
}

fn resolve_duplicates(records: Vec<TermRecord>, policy: DuplicatePolicy) -> Vec<TermRecord> {
    match policy {
        DuplicatePolicy::KeepAll => records,
        DuplicatePolicy::DropExact => {
            let mut seen = HashSet::with_capacity(records.len());
            records.into_iter().filter(|r| seen.insert(r.clone())).collect()
        }
        DuplicatePolicy::Sum => {
            let mut slot: HashMap<(String, NaiveDate), usize> = HashMap::new();
            let mut out: Vec<TermRecord> = Vec::with_capacity(records.len());
            for r in records {
                match slot.entry((r.term.clone(), r.date)) {
                    Entry::Occupied(e) => {
                        let i = *e.get();
                        out[i].counts = out[i].counts.saturating_add(r.counts);
                    }
                    Entry::Vacant(e) => {
                        e.insert(out.len());
                        out.push(r);
                    }
                }
            }
            out
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::ymd;

    pub(crate) fn d(s: &str) -> NaiveDate { ymd(s).unwrap() }

    /// covid 100 / 150 over two days, virus 90 on the first.
    pub(crate) fn sample_store() -> TermStore {
        TermStore::from_records(
            vec![
                TermRecord::new("covid", 100, d("2020-01-01")),
                TermRecord::new("covid", 150, d("2020-01-02")),
                TermRecord::new("virus", 90, d("2020-01-01")),
            ],
            DuplicatePolicy::DropExact,
        )
    }

    #[test]
    fn series_is_date_ordered() {
        let s = TermStore::from_records(
            vec![
                TermRecord::new("mask", 3, d("2020-02-03")),
                TermRecord::new("mask", 1, d("2020-02-01")),
                TermRecord::new("mask", 2, d("2020-02-02")),
            ],
            DuplicatePolicy::KeepAll,
        );
        let counts: Vec<u64> = s.series_for("mask").into_iter().map(|(_, c)| c).collect();
        assert_eq!(counts, [1, 2, 3]);
        assert!(s.series_for("unknown").is_empty());
    }

    #[test]
    fn ranking_sorted_by_counts_then_term() {
        let s = TermStore::from_records(
            vec![
                TermRecord::new("b", 5, d("2020-01-01")),
                TermRecord::new("a", 5, d("2020-01-01")),
                TermRecord::new("c", 9, d("2020-01-01")),
            ],
            DuplicatePolicy::KeepAll,
        );
        let names: Vec<_> = s.ranking_for(d("2020-01-01")).into_iter().map(|r| r.term).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn ranking_for_sample_day() {
        let r = sample_store().ranking_for(d("2020-01-01"));
        assert_eq!(
            r,
            vec![
                RankedTerm { term: "covid".into(), counts: 100 },
                RankedTerm { term: "virus".into(), counts: 90 },
            ]
        );
        assert!(sample_store().ranking_for(d("1999-12-31")).is_empty());
    }

    #[test]
    fn neighborhood_bounds_are_inclusive() {
        let s = TermStore::from_records(
            vec![
                TermRecord::new("low", 79, d("2020-01-01")),
                TermRecord::new("edge_lo", 80, d("2020-01-01")),
                TermRecord::new("mid", 100, d("2020-01-01")),
                TermRecord::new("edge_hi", 120, d("2020-01-01")),
                TermRecord::new("high", 121, d("2020-01-01")),
            ],
            DuplicatePolicy::KeepAll,
        );
        let n = s.neighborhood(d("2020-01-01"), 100, 0.2);
        let keys: Vec<_> = n.keys().map(String::as_str).collect();
        assert_eq!(keys, ["edge_hi", "edge_lo", "mid"]);
        assert_eq!(band(100, 0.2), (80.0, 120.0));
    }

    #[test]
    fn band_edges_survive_non_round_widths() {
        // 100 * 1.15 is 114.99999999999999 in f64.
        let s = TermStore::from_records(
            vec![
                TermRecord::new("edge", 115, d("2020-01-01")),
                TermRecord::new("mid", 100, d("2020-01-01")),
                TermRecord::new("floor", 85, d("2020-01-01")),
                TermRecord::new("out", 116, d("2020-01-01")),
            ],
            DuplicatePolicy::KeepAll,
        );
        let keys: Vec<_> = s.neighborhood(d("2020-01-01"), 100, 0.15).into_keys().collect();
        assert_eq!(keys, ["edge", "floor", "mid"]);

        for center in 1..2000u64 {
            for w in [0.15, 0.2, 0.25, 0.3] {
                let lo = center * (100 - (w * 100.0f64).round() as u64) / 100;
                let hi = center * (100 + (w * 100.0f64).round() as u64) / 100;
                if center * (100 - (w * 100.0f64).round() as u64) % 100 == 0 {
                    assert!(in_band(lo, center, w), "lo {lo} for {center} @ {w}");
                }
                if center * (100 + (w * 100.0f64).round() as u64) % 100 == 0 {
                    assert!(in_band(hi, center, w), "hi {hi} for {center} @ {w}");
                    assert!(!in_band(hi + 1, center, w), "hi+1 for {center} @ {w}");
                }
            }
        }
    }

    #[test]
    fn in_band_handles_wide_and_zero_widths() {
        assert!(in_band(100, 100, 0.0));
        assert!(!in_band(101, 100, 0.0));
        assert!(in_band(0, 100, 1.5));
        assert!(in_band(u64::MAX, u64::MAX / 2, f64::MAX));
    }

    #[test]
    fn neighborhood_of_zero_center_is_empty() {
        let s = sample_store();
        for w in [0.0, 0.2, 0.3, 5.0] {
            assert!(s.neighborhood(d("2020-01-01"), 0, w).is_empty());
        }
        assert!(s.neighborhood(d("2031-01-01"), 100, 0.2).is_empty());
    }

    #[test]
    fn duplicate_policies() {
        let rows = || {
            vec![
                TermRecord::new("covid", 10, d("2020-01-01")),
                TermRecord::new("covid", 10, d("2020-01-01")),
                TermRecord::new("covid", 5, d("2020-01-01")),
            ]
        };
        let keep = TermStore::from_records(rows(), DuplicatePolicy::KeepAll);
        assert_eq!(keep.series_for("covid").len(), 3);

        let drop = TermStore::from_records(rows(), DuplicatePolicy::DropExact);
        assert_eq!(drop.series_for("covid").len(), 2);

        let sum = TermStore::from_records(rows(), DuplicatePolicy::Sum);
        assert_eq!(sum.series_for("covid"), vec![(d("2020-01-01"), 25)]);
    }

    #[test]
    fn neighborhood_keeps_largest_in_band_duplicate() {
        let s = TermStore::from_records(
            vec![
                TermRecord::new("covid", 95, d("2020-01-01")),
                TermRecord::new("covid", 105, d("2020-01-01")),
            ],
            DuplicatePolicy::KeepAll,
        );
        assert_eq!(s.neighborhood(d("2020-01-01"), 100, 0.2).get("covid"), Some(&105));
    }

    #[test]
    fn load_reads_all_six_tables() {
        use crate::config::DashboardConfig;
        use std::fs;

        let dir = tempfile::tempdir().unwrap();
        let p = dir.path();
        fs::write(p.join("all_terms.csv"), ",term,counts,date\n0,covid,100,2020-01-01\n1,covid,x,2020-01-02\n").unwrap();
        fs::write(p.join("all_bigrams.csv"), "gram,counts,date\nstay home,40,2020-01-01\n").unwrap();
        fs::write(p.join("all_trigrams.csv"), "gram,counts,date\n").unwrap();
        fs::write(p.join("frequent_terms.csv"), "term,counts\ncovid,250\n").unwrap();
        fs::write(p.join("frequent_bigrams.csv"), "bigram,counts\nstay home,40\n").unwrap();
        fs::write(p.join("frequent_trigrams.csv"), "trigram,counts\n").unwrap();

        let cfg = DashboardConfig { data_dir: p.to_path_buf(), ..Default::default() };
        let (store, reports) = TermStore::load(&cfg.paths(), cfg.duplicate_policy).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(reports.len(), 6);
        assert_eq!(reports[0].skipped, 1);
        assert_eq!(store.frequent(NgramKind::Bigram)[0].term, "stay home");
        assert_eq!(store.ranking_for(d("2020-01-01"))[1].term, "stay home");

        fs::remove_file(p.join("frequent_trigrams.csv")).unwrap();
        assert!(matches!(
            TermStore::load(&cfg.paths(), cfg.duplicate_policy),
            Err(DataLoadError::Missing { .. })
        ));
    }
}
