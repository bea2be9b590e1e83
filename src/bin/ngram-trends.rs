use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use polars::prelude::DataFrame;

use ngram_trends::config::{DashboardConfig, DuplicatePolicy};
use ngram_trends::drilldown::{on_point_clicked, PointClick};
use ngram_trends::frames;
use ngram_trends::ingest::parse_date;
use ngram_trends::record::NgramKind;
use ngram_trends::selection::{aggregate, PinnedTerms};
use ngram_trends::session::{Event, Session};
use ngram_trends::{assemble, logging, open_store};

/// ngram-trends CLI
#[derive(Parser)]
#[command(name = "ngram-trends")]
#[command(version)]
#[command(about = "Term/bigram/trigram frequency trends over a daily tweet corpus", long_about = None)]
struct Cli {
    /// JSON config file (all fields optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the six frequency tables
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Word-cloud band half-width as a fraction of the clicked count
    #[arg(long, global = true)]
    width: Option<f64>,
    /// Duplicate (term, date) policy: keep-all, drop-exact or sum
    #[arg(long, global = true)]
    duplicates: Option<DuplicatePolicy>,
    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an aggregate frequency table
    Top {
        /// unigram, bigram or trigram
        #[arg(long, default_value = "unigram")]
        kind: NgramKind,
        /// Only the first N rows
        #[arg(long)]
        limit: Option<usize>,
        /// Emit CSV to stdout
        #[arg(long)]
        csv: bool,
    },

    /// List every date with records
    Dates,

    /// Chart series for a free-text term plus pinned terms
    Series {
        /// First value is the free-text input; the rest are pinned
        terms: Vec<String>,
        /// Additional pinned term (repeatable)
        #[arg(long)]
        pin: Vec<String>,
        /// Emit CSV to stdout
        #[arg(long)]
        csv: bool,
    },

    /// Drilldown for one date (YYYY-MM-DD)
    Day {
        date: String,
        /// Clicked term; enables the word cloud and headline
        #[arg(long)]
        term: Option<String>,
        /// Clicked count (defaults to the term's count on that date)
        #[arg(long, requires = "term")]
        count: Option<u64>,
        /// Emit CSV to stdout
        #[arg(long)]
        csv: bool,
    },

    /// Feed a JSON array of UI events through a session, one JSON update per line
    Replay {
        events: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let mut cfg = match &cli.config {
        Some(p) => DashboardConfig::from_file(p)?,
        None => DashboardConfig::default(),
    };
    if let Some(d) = cli.data_dir { cfg.data_dir = d; }
    if let Some(w) = cli.width { cfg.width_fraction = w; }
    if let Some(p) = cli.duplicates { cfg.duplicate_policy = p; }

    let store = open_store(&cfg).with_context(|| format!("loading tables from {}", cfg.data_dir.display()))?;
    frames::configure_display();

    match cli.command {
        Commands::Top { kind, limit, csv } => {
            let rows = store.frequent(kind);
            let rows = &rows[..limit.unwrap_or(rows.len()).min(rows.len())];
            emit(frames::frequent_frame(rows, kind)?, csv)?;
        }

        Commands::Dates => {
            for d in store.dates() {
                println!("{}", d.format("%Y-%m-%d"));
            }
        }

        Commands::Series { terms, pin, csv } => {
            let mut pinned = PinnedTerms::new();
            for t in terms.iter().skip(1).chain(pin.iter()) {
                pinned.add(t);
            }
            let selection = aggregate(terms.first().map(String::as_str), &pinned, &[]);
            let chart = assemble(&selection, &store);
            if chart.is_blank() {
                eprintln!("no terms selected");
                return Ok(());
            }
            emit(frames::chart_frame(&chart)?, csv)?;
        }

        Commands::Day { date, term, count, csv } => {
            let Some(day) = parse_date(&date) else { bail!("Invalid date: {}. Expected YYYY-MM-DD.", date) };
            match term {
                None => emit(frames::ranking_frame(&store.ranking_for(day))?, csv)?,
                Some(term) => {
                    let counts = count.unwrap_or_else(|| {
                        store.series_for(&term).into_iter().find(|(d, _)| *d == day).map(|(_, c)| c).unwrap_or(0)
                    });
                    let click = PointClick { date: day, term, counts };
                    let dd = on_point_clicked(Some(&click), &store, cfg.width_fraction);
                    if let Some(h) = dd.headline() {
                        eprintln!("{h}");
                    }
                    emit(frames::ranking_frame(dd.ranking())?, csv)?;
                    if let Some(cloud) = dd.cloud() {
                        eprintln!("word cloud (width {}): {} terms", cfg.width_fraction, cloud.len());
                        emit(frames::cloud_frame(cloud)?, csv)?;
                    }
                }
            }
        }

        Commands::Replay { events } => {
            let f = File::open(&events).with_context(|| format!("opening {}", events.display()))?;
            let events: Vec<Event> = serde_json::from_reader(BufReader::new(f))
                .with_context(|| format!("parsing {}", events.display()))?;
            let mut session = Session::new(&store, &cfg);
            let mut out = io::stdout().lock();
            for ev in events {
                let update = session.handle(ev);
                serde_json::to_writer(&mut out, &update)?;
                writeln!(out)?;
            }
        }
    }

    Ok(())
}

fn emit(mut df: DataFrame, csv: bool) -> anyhow::Result<()> {
    if csv {
        frames::write_csv(&mut df, io::stdout())?;
    } else {
        println!("{}", df);
    }
    Ok(())
}
