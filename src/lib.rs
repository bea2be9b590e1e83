#![forbid(unsafe_code)]
//! # ngram-trends
//!
//! Frequency trends for **terms**, **bigrams** and **trigrams** extracted from a
//! daily tweet corpus. The crate is the logic behind a trend dashboard:
//! it loads the daily and aggregate frequency tables once, then answers UI
//! events with plain data the UI can render directly.
//!
//! ## Pipeline
//! - [`selection::aggregate`]: free text + pinned terms + checked table rows → active terms.
//! - [`series::assemble`]: active terms → one date-ordered, term-tagged chart series.
//! - [`drilldown::on_point_clicked`]: clicked point → day ranking, word-cloud band, headline.
//! - [`session::Session`]: single-user state machine that feeds UI events through the above.
//!
//! ## Examples
//! ```rust
//! use ngram_trends::config::DuplicatePolicy;
//! use ngram_trends::record::{ymd, TermRecord};
//! use ngram_trends::selection::{aggregate, PinnedTerms};
//! use ngram_trends::{assemble, TermStore};
//!
//! let day = |s| ymd(s).unwrap();
//! let store = TermStore::from_records(vec![
//!     TermRecord::new("covid", 100, day("2020-01-01")),
//!     TermRecord::new("covid", 150, day("2020-01-02")),
//!     TermRecord::new("virus", 90, day("2020-01-01")),
//! ], DuplicatePolicy::DropExact);
//!
//! let selection = aggregate(Some("covid"), &PinnedTerms::new(), &[]);
//! let chart = assemble(&selection, &store);
//! assert_eq!(chart.len(), 2);
//!
//! let ranking = store.ranking_for(day("2020-01-01"));
//! assert_eq!(ranking[0].term, "covid");
//! assert_eq!(ranking[1].counts, 90);
//! ```

pub mod config;
pub mod drilldown;
pub mod error;
pub mod frames;
pub mod ingest;
pub mod logging;
pub mod record;
pub mod schema;
pub mod selection;
pub mod series;
pub mod session;
pub mod store;

pub use config::DashboardConfig;
pub use drilldown::{on_point_clicked, DayDrilldown, PointClick};
pub use error::DataLoadError;
pub use selection::{aggregate, Selection};
pub use series::{assemble, ChartData};
pub use store::TermStore;

use tracing::warn;

/// Load the store described by `config`, warning about tables that lost rows
/// during coercion.
pub fn open_store(config: &DashboardConfig) -> Result<TermStore, DataLoadError> {
    config.validate()?;
    let (store, reports) = TermStore::load(&config.paths(), config.duplicate_policy)?;
    for r in reports.iter().filter(|r| r.skipped > 0) {
        warn!(table = %r.table, kept = r.kept, skipped = r.skipped, "rows skipped during load");
    }
    Ok(store)
}

/// Crate version string (from `CARGO_PKG_VERSION`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
