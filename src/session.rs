//! Single-user dashboard session.
//!
//! The session owns the only mutable state (pinned terms, the latest table
//! snapshots, the latest free text and the drilldown state) and turns each UI
//! [`Event`] into a fresh render [`Update`]. Nothing is cached: every update is
//! recomputed from the read-only [`TermStore`].
//!
//! ```text
//! Idle ──click──▶ Drilldown(date) ──click──▶ Drilldown(date')
//!   ▲                   │
//!   └─────clear─────────┘        selection events never change this state
//! ```
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DashboardConfig;
use crate::drilldown::{on_point_clicked, DayDrilldown, PointClick};
use crate::schema::schema_of;
use crate::selection::{aggregate, PinnedTerms, Selection, TableSelection};
use crate::series::{assemble, ChartData};
use crate::store::TermStore;

/// Input from the UI layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    SubmitText { text: String },
    SelectRows(TableSelection),
    Pin { term: String },
    Unpin { term: String },
    ClickPoint(PointClick),
    ClearClick,
}

/// Output for the UI layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "update", content = "data", rename_all = "snake_case")]
pub enum Update {
    Chart(ChartData),
    Drilldown(DayDrilldown),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DrilldownState {
    #[default]
    Idle,
    Drilldown(PointClick),
}

pub struct Session<'s> {
    store: &'s TermStore,
    width: f64,
    pin_free_text: bool,
    pinned: PinnedTerms,
    free_text: Option<String>,
    tables: Vec<TableSelection>,
    state: DrilldownState,
}

impl<'s> Session<'s> {
    pub fn new(store: &'s TermStore, config: &DashboardConfig) -> Self {
        Session {
            store,
            width: config.width_fraction,
            pin_free_text: config.pin_free_text,
            pinned: PinnedTerms::new(),
            free_text: None,
            tables: Vec::new(),
            state: DrilldownState::Idle,
        }
    }

    pub fn pinned(&self) -> &PinnedTerms { &self.pinned }

    pub fn state(&self) -> &DrilldownState { &self.state }

    /// Current active terms.
    pub fn selection(&self) -> Selection {
        aggregate(self.free_text.as_deref(), &self.pinned, &self.tables)
    }

    pub fn chart(&self) -> ChartData { assemble(&self.selection(), self.store) }

    pub fn drilldown(&self) -> DayDrilldown {
        let click = match &self.state {
            DrilldownState::Idle => None,
            DrilldownState::Drilldown(c) => Some(c),
        };
        on_point_clicked(click, self.store, self.width)
    }

    pub fn handle(&mut self, event: Event) -> Update {
        debug!(?event, "session event");
        match event {
            Event::SubmitText { text } => {
                if self.pin_free_text {
                    self.pinned.add(&text);
                    self.free_text = None;
                } else {
                    self.free_text = Some(text);
                }
                Update::Chart(self.chart())
            }
            Event::SelectRows(sel) => {
                if !schema_of(sel.table).selectable {
                    debug!(table = %sel.table, "selection on a non-selectable table ignored");
                    return Update::Chart(self.chart());
                }
                self.tables.retain(|t| t.table != sel.table);
                if !sel.selected_rows.is_empty() {
                    self.tables.push(sel);
                }
                Update::Chart(self.chart())
            }
            Event::Pin { term } => {
                self.pinned.add(&term);
                Update::Chart(self.chart())
            }
            Event::Unpin { term } => {
                self.pinned.remove(&term);
                Update::Chart(self.chart())
            }
            Event::ClickPoint(click) => {
                self.state = DrilldownState::Drilldown(click);
                Update::Drilldown(self.drilldown())
            }
            Event::ClearClick => {
                self.state = DrilldownState::Idle;
                Update::Drilldown(DayDrilldown::NoSelection)
            }
        }
    }
}
