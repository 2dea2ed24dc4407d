use std::io::{stderr, stdout, BufWriter, Write};
use std::process::exit;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use expense_tracker::actors::{LifecycleCoordinator, ScreenActor, ScreenCommand};
use expense_tracker::engine::DerivedView;
use expense_tracker::models::{FilterSpec, Kind, Record, RecordDraft, SortSpec, StoreError};
use expense_tracker::storage::{MemoryStore, RecordStore};
use expense_tracker::types::RecordId;

const LOG_LEVEL_VARIABLE: &str = "EXPENSE_TRACKER_LOG";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: The command surface is small enough that positional arguments are parsed by hand
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        print_usage();
        exit(1);
    }

    let log_level = std::env::var(LOG_LEVEL_VARIABLE)
        .map(|s| parse_log_level(&s)).unwrap_or(LevelFilter::ERROR);

    setup_logging(log_level);

    let timer = Instant::now();
    let store = Arc::new(MemoryStore::open(&args[1]).await?);
    info!("Journal [{}] holds [{}] records", args[1], store.len());
    let rest = &args[3..];

    let outcome = match args[2].as_str() {
        "view" => view(&store, rest).await,
        "add" => add(store.clone(), rest).await,
        "edit" => edit(store.clone(), rest).await,
        "delete" => delete(store.clone(), rest).await,
        other => {
            eprintln!("Unknown command '{other}'");
            print_usage();
            exit(1);
        }
    };

    if let Err(error) = outcome {
        eprintln!("{error}");
        exit(1);
    }

    let duration = timer.elapsed();
    info!("Command completed in: {duration:?}");

    Ok(())
}

fn print_usage() {
    eprintln!("Usage: expense-tracker [journal].csv view [filter:optional] [sort:optional]");
    eprintln!("       expense-tracker [journal].csv add [credit|debit] [amount] [description] [YYYY-MM-DDTHH:MM:SS:optional]");
    eprintln!("       expense-tracker [journal].csv edit [id] [amount] [description]");
    eprintln!("       expense-tracker [journal].csv delete [id] [--confirm:optional]");
    eprintln!("Filters: none, date:FROM..TO, amount:>25.50, kind:credit, text:coffee (join with '&')");
    eprintln!("Sorts: date-asc, date-desc, amount-asc, amount-desc, unsorted");
    eprintln!("Log level is read from {LOG_LEVEL_VARIABLE}: error, warn, info, debug, trace (default: error)");
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries the CSV output, so logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

async fn view(store: &Arc<MemoryStore>, rest: &[String]) -> Result<()> {
    let filter = rest.first()
        .map(|value| FilterSpec::from_str(value)).transpose()?.unwrap_or_default();
    let sort = rest.get(1)
        .map(|value| SortSpec::from_str(value)).transpose()?.unwrap_or_default();

    let screen = ScreenActor::new(store.as_ref());
    screen.accept(ScreenCommand::SetFilter(filter));
    screen.accept(ScreenCommand::SetSort(sort));

    let view = screen.despawn().await?;

    write_view_to_stdout(&view)
}

async fn add(store: Arc<MemoryStore>, rest: &[String]) -> Result<()> {
    let [kind, amount, description, timestamp @ ..] = rest else {
        return Err(anyhow!("add expects [credit|debit] [amount] [description]"));
    };

    let timestamp = match timestamp.first() {
        Some(value) => NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)?,
        None => Local::now().naive_local()
    };

    let draft = RecordDraft {
        description: description.clone(),
        amount: amount.clone(),
        kind: Kind::from_str(kind)?,
        timestamp
    };

    let id = LifecycleCoordinator::new(store).create(draft).await?;
    println!("{id}");

    Ok(())
}

async fn edit(store: Arc<MemoryStore>, rest: &[String]) -> Result<()> {
    let [id, amount, description] = rest else {
        return Err(anyhow!("edit expects [id] [amount] [description]"));
    };

    let record = find_record(&store, id)?;
    LifecycleCoordinator::new(store).update(&record, description, amount).await?;

    Ok(())
}

async fn delete(store: Arc<MemoryStore>, rest: &[String]) -> Result<()> {
    let Some(id) = rest.first() else {
        return Err(anyhow!("delete expects [id]"));
    };

    let record = find_record(&store, id)?;
    let mut coordinator = LifecycleCoordinator::new(store);
    coordinator.request_delete(record.clone());

    if !rest.iter().any(|arg| arg == "--confirm") {
        coordinator.cancel_delete();
        eprintln!("Would delete \"{}\" for {} ({}), re-run with --confirm", record.description, record.amount, record.kind);
        return Ok(());
    }

    for id in coordinator.confirm_delete().await? {
        println!("{id}");
    }

    Ok(())
}

fn find_record(store: &MemoryStore, id: &str) -> Result<Record> {
    let id: RecordId = id.parse()?;
    Ok(store.get(id).ok_or(StoreError::NotFound(id))?)
}

fn write_view_to_stdout(view: &DerivedView) -> Result<()> {
    if view.totals.overflowed {
        warn!("Totals exceed the representable range and are capped");
    }

    let mut output = BufWriter::new(stdout().lock());

    {
        let mut writer = csv::Writer::from_writer(&mut output);

        if view.records.is_empty() {
            writer.write_record(["id", "timestamp", "description", "amount", "kind"])?;
        }

        for record in &view.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
    }

    writeln!(output)?;
    writeln!(output, "total_credit,total_debit,balance")?;
    writeln!(output, "{},{},{}", view.totals.total_credit, view.totals.total_debit, view.totals.balance)?;

    output.flush()?;

    Ok(())
}
