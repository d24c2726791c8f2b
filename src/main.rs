use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use atombind::extension::calendar::{CalendarExtension, EventEntry};
use atombind::util::Timestamp;
use atombind::{Entry, EntryDisposition, Feed, FeedParser, ParseObserver, ParserConfig, RootKind};

#[derive(Parser, Debug)]
#[command(name = "atombind", about = "Parse an Atom document and summarize it")]
struct Args {
    /// Atom feed or entry document. Use `-` for standard input.
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Parser settings (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Understand calendar event elements
    #[arg(long)]
    calendar: bool,

    /// Keep foreign elements no handler claims
    #[arg(long)]
    capture_unknown: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct DocumentSummary {
    root: String,
    version: Option<String>,
    id: Option<String>,
    title: Option<String>,
    updated: Option<Timestamp>,
    total_results: Option<u32>,
    entries: Vec<EntrySummary>,
}

#[derive(Debug, Serialize)]
struct EntrySummary {
    id: Option<String>,
    title: Option<String>,
    updated: Option<Timestamp>,
    links: usize,
    extensions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<EventSummary>,
}

#[derive(Debug, Serialize)]
struct EventSummary {
    starts: Vec<Timestamp>,
    all_day: bool,
    locations: Vec<String>,
    participants: usize,
    status: Option<String>,
}

impl EntrySummary {
    fn new(entry: &Entry, calendar: bool) -> Self {
        let event = (calendar && EventEntry::is_event(entry))
            .then(|| EventSummary::new(&EventEntry::from_entry(entry.clone())));
        Self {
            id: entry.id.as_ref().map(|id| id.uri.clone()),
            title: entry.title.as_ref().map(|t| t.text.clone()),
            updated: entry.updated,
            links: entry.links.len(),
            extensions: entry.base.extensions.len(),
            event,
        }
    }
}

impl EventSummary {
    fn new(event: &EventEntry) -> Self {
        use atombind::extension::calendar::ValueConstruct;
        Self {
            starts: event.times().map(|w| w.start).collect(),
            all_day: event.times().any(|w| w.all_day),
            locations: event
                .locations()
                .filter_map(|w| w.value_string.clone())
                .collect(),
            participants: event.participants().count(),
            status: event.status().map(|s| s.value().to_owned()),
        }
    }
}

/// Counts entries as they complete, for the progress log.
#[derive(Default)]
struct Progress {
    entries: usize,
}

impl ParseObserver for Progress {
    fn on_entry(&mut self, entry: &Entry) -> EntryDisposition {
        self.entries += 1;
        tracing::trace!(
            index = self.entries,
            id = entry.id.as_ref().map(|id| id.uri.as_str()),
            "Parsed entry"
        );
        EntryDisposition::Keep
    }

    fn on_feed(&mut self, feed: &Feed) {
        tracing::debug!(entries = feed.entries().len(), "Feed complete");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ParserConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => ParserConfig::default(),
    };
    config.capture_unknown |= args.capture_unknown;

    let mut parser = FeedParser::with_config(config);
    if args.calendar {
        parser.register_with(CalendarExtension::new);
    }

    let mut feed = Feed::new();
    let mut progress = Progress::default();
    let outcome = if args.input.as_os_str() == "-" {
        parser.parse_with(std::io::stdin().lock(), &mut feed, &mut progress)
    } else {
        let file = std::fs::File::open(&args.input)
            .with_context(|| format!("Failed to open '{}'", args.input.display()))?;
        parser.parse_with(std::io::BufReader::new(file), &mut feed, &mut progress)
    }
    .with_context(|| format!("Failed to parse '{}'", args.input.display()))?;

    let summary = DocumentSummary {
        root: match &outcome.root {
            RootKind::Feed => "feed".to_owned(),
            RootKind::Entry => "entry".to_owned(),
            RootKind::Other(name) => name.clone(),
        },
        version: outcome.version,
        id: feed.id.as_ref().map(|id| id.uri.clone()),
        title: feed.title.as_ref().map(|t| t.text.clone()),
        updated: feed.updated,
        total_results: feed.total_results,
        entries: feed
            .entries()
            .iter()
            .map(|entry| EntrySummary::new(entry, args.calendar))
            .collect(),
    };

    if args.json {
        let out = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
        println!("{out}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &DocumentSummary) {
    println!("root: {}", summary.root);
    if let Some(title) = &summary.title {
        println!("title: {title}");
    }
    if let Some(id) = &summary.id {
        println!("id: {id}");
    }
    if let Some(updated) = &summary.updated {
        println!("updated: {}", updated.to_rfc3339());
    }
    println!("entries: {}", summary.entries.len());
    for (i, entry) in summary.entries.iter().enumerate() {
        println!(
            "  [{i}] {} ({})",
            entry.title.as_deref().unwrap_or("(untitled)"),
            entry.id.as_deref().unwrap_or("no id")
        );
        if let Some(event) = &entry.event {
            for start in &event.starts {
                let when = if event.all_day {
                    start.date_naive().to_string()
                } else {
                    start.to_rfc3339()
                };
                println!("      when: {when}");
            }
            for place in &event.locations {
                println!("      where: {place}");
            }
        }
    }
}
