use catalog_sync_core::{SyncFailure, SyncReport, UpsertOutcome};
use catalog_sync_models::{Identity, MovieRecord, RELEASE_DATE_FORMAT};
use clap::ValueEnum;
use comfy_table::{Cell, CellAlignment, Table};
use owo_colors::OwoColorize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    fn key(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

/// Renders command results for the terminal or as JSON documents.
///
/// Commands hand over domain values; the format decides whether they become a
/// table, a few status lines or one JSON object. Errors are shown even when quiet.
pub struct Output {
    format: OutputFormat,
    quiet: bool,
}

impl Output {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Whether a live spinner makes sense for this invocation
    pub fn wants_progress(&self) -> bool {
        self.format == OutputFormat::Human && !self.quiet
    }

    pub fn success(&self, msg: impl AsRef<str>) {
        self.notice(Level::Success, msg.as_ref());
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.notice(Level::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.notice(Level::Warning, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.notice(Level::Error, msg.as_ref());
    }

    /// Either print `document` or run `human`, depending on the format
    pub fn render(&self, document: impl FnOnce() -> Value, human: impl FnOnce()) {
        if self.quiet {
            return;
        }
        match self.format {
            OutputFormat::Human => human(),
            OutputFormat::Json | OutputFormat::JsonPretty => self.emit(&document()),
        }
    }

    pub fn sync_report(&self, cycle: u64, feed_url: &str, report: &SyncReport) {
        self.render(
            || sync_report_document(cycle, feed_url, report),
            || {
                for error in &report.field_errors {
                    self.warn(format!("Skipped feed {}", error));
                }
                for event in &report.lenient_dates {
                    self.warn(format!(
                        "'{}' has release '{}', stored as {}",
                        event.title,
                        event.raw,
                        event.substituted.format(RELEASE_DATE_FORMAT)
                    ));
                }
                for failure in &report.store_failures {
                    self.error(format!("Could not store {}: {}", failure.identity, failure.error));
                }
                self.success(format!(
                    "Sync completed: {} new, {} updated, {} skipped; catalog has {} movies ({:.1?})",
                    report.inserted,
                    report.replaced,
                    report.field_errors.len(),
                    report.merged.len(),
                    report.duration
                ));
            },
        );
    }

    /// JSON callers get a failure document; on the terminal the returned error says it all
    pub fn sync_failure(&self, cycle: u64, feed_url: &str, failure: &SyncFailure) {
        if self.format != OutputFormat::Human {
            self.emit(&json!({
                "success": false,
                "cycle": cycle,
                "feed_url": feed_url,
                "error": failure.to_string(),
            }));
        }
    }

    pub fn movies(&self, movies: &[MovieRecord]) {
        self.render(
            || json!({ "movies": movies }),
            || {
                if movies.is_empty() {
                    self.info("The catalog is empty. Run 'reelsync sync' to fetch the feed.");
                    return;
                }
                println!("{}", movie_table(movies));
                self.info(format!("{} movies", movies.len()));
            },
        );
    }

    pub fn saved(&self, movie: &MovieRecord, outcome: UpsertOutcome) {
        self.render(
            || json!({ "success": true, "outcome": outcome, "movie": movie }),
            || {
                let verb = match outcome {
                    UpsertOutcome::Inserted => "Added",
                    UpsertOutcome::Replaced => "Updated",
                };
                self.success(format!("{} {}", verb, movie.identity()));
            },
        );
    }

    pub fn deleted(&self, identity: &Identity, removed: bool) {
        self.render(
            || json!({ "success": removed, "identity": identity }),
            || {
                if removed {
                    self.success(format!("Deleted {}", identity));
                } else {
                    self.warn(format!("No movie {} in the catalog", identity));
                }
            },
        );
    }

    fn notice(&self, level: Level, msg: &str) {
        if self.quiet && level != Level::Error {
            return;
        }
        match self.format {
            OutputFormat::Human => match level {
                Level::Success => println!("{} {}", "✓".green(), msg),
                Level::Info => println!("{}", msg),
                Level::Warning => println!("{} {}", "⚠".yellow(), msg),
                Level::Error => eprintln!("{} {}", "✗".red(), msg),
            },
            OutputFormat::Json | OutputFormat::JsonPretty => {
                self.emit(&json!({ "type": level.key(), "message": msg }));
            }
        }
    }

    fn emit(&self, document: &Value) {
        let text = match self.format {
            OutputFormat::JsonPretty => serde_json::to_string_pretty(document),
            OutputFormat::Json | OutputFormat::Human => serde_json::to_string(document),
        };
        println!("{}", text.unwrap_or_default());
    }
}

fn sync_report_document(cycle: u64, feed_url: &str, report: &SyncReport) -> Value {
    json!({
        "success": true,
        "cycle": cycle,
        "feed_url": feed_url,
        "inserted": report.inserted,
        "replaced": report.replaced,
        "catalog_size": report.merged.len(),
        "duration_seconds": report.duration.as_secs_f64(),
        "field_errors": report
            .field_errors
            .iter()
            .map(|e| json!({
                "index": e.index,
                "field": e.field.key(),
                "error": e.kind.to_string(),
            }))
            .collect::<Vec<_>>(),
        "lenient_dates": report
            .lenient_dates
            .iter()
            .map(|e| json!({
                "index": e.index,
                "title": e.title,
                "raw": e.raw,
                "substituted": e.substituted.format(RELEASE_DATE_FORMAT).to_string(),
            }))
            .collect::<Vec<_>>(),
        "store_failures": report.store_failures,
    })
}

fn movie_table(movies: &[MovieRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        ["Title", "Release", "Genre", "Guidance", "Rating", "Minutes", "Budget", "Watched"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(comfy_table::Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for movie in movies {
        table.add_row(vec![
            Cell::new(&movie.title),
            Cell::new(movie.release.format(RELEASE_DATE_FORMAT).to_string()),
            Cell::new(movie.genre),
            Cell::new(movie.guidance.map(|g| g.to_string()).unwrap_or_else(|| "-".to_string())),
            Cell::new(format!("{:.1}", movie.rating)).set_alignment(CellAlignment::Right),
            Cell::new(movie.duration_minutes).set_alignment(CellAlignment::Right),
            Cell::new(format_budget(movie.budget)).set_alignment(CellAlignment::Right),
            Cell::new(if movie.watched { "✓".green().to_string() } else { String::new() }),
        ]);
    }
    table
}

fn format_budget(budget: Option<f64>) -> String {
    match budget {
        Some(amount) if amount >= 1_000_000.0 => format!("${:.1}M", amount / 1_000_000.0),
        Some(amount) => format!("${:.0}", amount),
        None => "-".to_string(),
    }
}
