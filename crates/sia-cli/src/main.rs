use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sia_core::ScheduleKey;
use sia_reconcile::{
    derive_status, paginate, reconcile, KindFilter, MemoryStatusLookup, ReadFilter,
    ReconcileFilter,
};

#[derive(Parser)]
#[command(name = "sia")]
#[command(about = "Scheduling admin console tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect notification snapshots
    Notifications {
        #[command(subcommand)]
        action: NotificationCommands,
    },
}

#[derive(Subcommand)]
enum NotificationCommands {
    /// Reconcile a snapshot file and print the current view
    Show {
        /// JSON array of raw notification records
        #[arg(long)]
        file: PathBuf,
        /// Free-text search over recipient, title, message, category
        #[arg(long)]
        search: Option<String>,
        /// Kind filter: all | confirmation | assignment | other
        #[arg(long, default_value = "all")]
        kind: String,
        /// Read filter: all | read | unread
        #[arg(long, default_value = "all")]
        read: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 20)]
        per_page: usize,
        /// Optional JSON object mapping "scheduleType:scheduleId" to a
        /// fresher confirmation status
        #[arg(long)]
        status_file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Notifications { action } => match action {
            NotificationCommands::Show {
                file,
                search,
                kind,
                read,
                page,
                per_page,
                status_file,
            } => show(ShowArgs {
                file,
                search,
                kind,
                read,
                page,
                per_page,
                status_file,
            }),
        },
    }
}

struct ShowArgs {
    file: PathBuf,
    search: Option<String>,
    kind: String,
    read: String,
    page: usize,
    per_page: usize,
    status_file: Option<PathBuf>,
}

fn show(args: ShowArgs) -> Result<()> {
    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let events = sia_feed::decode_snapshot(&text)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    let filter = ReconcileFilter {
        search: args.search,
        kind: args.kind.parse::<KindFilter>().map_err(anyhow::Error::msg)?,
        read: args.read.parse::<ReadFilter>().map_err(anyhow::Error::msg)?,
    };
    let rows = reconcile(&events, &filter);

    let lookup = match args.status_file.as_deref() {
        Some(path) => load_status_lookup(path)?,
        None => MemoryStatusLookup::new(),
    };

    let visible = paginate(&rows, args.page, args.per_page);
    println!(
        "{} row(s), page {} ({} total)",
        visible.len(),
        args.page,
        rows.len()
    );
    for event in visible {
        let badge = derive_status(event, &lookup);
        let when = event
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "????-??-?? --:--".to_string());
        let note = badge
            .admin_info
            .map(|info| format!(" ({info})"))
            .unwrap_or_default();
        println!(
            "[{}] {} {} — {} <{}>{}",
            badge.status,
            when,
            event.title,
            event.recipient_name,
            event.recipient_category,
            note
        );
    }
    Ok(())
}

fn load_status_lookup(path: &Path) -> Result<MemoryStatusLookup> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let entries: BTreeMap<String, String> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut lookup = MemoryStatusLookup::new();
    for (key, status) in entries {
        lookup.insert(parse_schedule_key(&key), status);
    }
    Ok(lookup)
}

fn parse_schedule_key(raw: &str) -> ScheduleKey {
    let (type_part, id_part) = raw.split_once(':').unwrap_or((raw, "-"));
    ScheduleKey {
        schedule_type: type_part.parse().ok(),
        schedule_id: (id_part != "-" && !id_part.is_empty()).then(|| id_part.to_string()),
    }
}
