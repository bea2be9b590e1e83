//! Per-day drilldown after a chart point is clicked: the full ranking for that
//! date, the similar-frequency word cloud around the clicked count, and a
//! one-line headline.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::RankedTerm;
use crate::store::TermStore;

/// A clicked chart point.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PointClick {
    pub date: NaiveDate,
    pub term: String,
    pub counts: u64,
}

/// Everything the side panel shows for one clicked date.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub ranking: Vec<RankedTerm>,
    pub cloud: BTreeMap<String, u64>,
    pub headline: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayDrilldown {
    /// No point clicked: render empty placeholders.
    #[default]
    NoSelection,
    Day(DayView),
}

impl DayDrilldown {
    pub fn ranking(&self) -> &[RankedTerm] {
        match self {
            DayDrilldown::NoSelection => &[],
            DayDrilldown::Day(v) => v.ranking.as_slice(),
        }
    }

    pub fn cloud(&self) -> Option<&BTreeMap<String, u64>> {
        match self {
            DayDrilldown::NoSelection => None,
            DayDrilldown::Day(v) => Some(&v.cloud),
        }
    }

    pub fn headline(&self) -> Option<&str> {
        match self {
            DayDrilldown::NoSelection => None,
            DayDrilldown::Day(v) => Some(&v.headline),
        }
    }
}

pub fn headline(click: &PointClick) -> String {
    format!("\"{}\": {} mentions on {}", click.term, click.counts, click.date.format("%Y-%m-%d"))
}

/// Recompute the drilldown for `click`, using `width` as the word-cloud band.
pub fn on_point_clicked(click: Option<&PointClick>, store: &TermStore, width: f64) -> DayDrilldown {
    let Some(click) = click else { return DayDrilldown::NoSelection };
    DayDrilldown::Day(DayView {
        date: click.date,
        ranking: store.ranking_for(click.date),
        cloud: store.neighborhood(click.date, click.counts, width),
        headline: headline(click),
    })
}
