mod api;
mod codes;
mod error;
mod ingest;
mod logging;
mod models;
mod service;
mod store;

use clap::{Parser, Subcommand};
use ingest::{ingest_file, IngestSummary};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use store::SwiftStore;

#[derive(Parser)]
#[command(name = "swift-codes")]
#[command(about = "SWIFT/BIC code directory service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Preload the spreadsheet (best effort) and serve the REST API.
    Serve(ServeArgs),
    /// Load the spreadsheet into the database and exit.
    Import(ImportArgs),
}

#[derive(Parser)]
struct StoreArgs {
    /// SQLite database file, or `:memory:`.
    #[arg(long, env = "SWIFT_DATABASE", default_value = "swift_codes.db")]
    database: PathBuf,
    /// Workbook (.xlsx/.xls/.ods) or .csv export with the code list.
    #[arg(long, env = "SWIFT_DATA", default_value = "data/SWIFT_CODES.xlsx")]
    data: PathBuf,
}

#[derive(Parser)]
struct ServeArgs {
    #[command(flatten)]
    store: StoreArgs,
    #[arg(long, env = "SWIFT_BIND", default_value = "0.0.0.0:8080")]
    bind: String,
    #[arg(long, default_value_t = false)]
    skip_import: bool,
}

#[derive(Parser)]
struct ImportArgs {
    #[command(flatten)]
    store: StoreArgs,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    logging::init_logging("swift-codes")?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => run_serve(args),
        Command::Import(args) => run_import(args),
    }
}

fn open_store(args: &StoreArgs) -> Result<SwiftStore, String> {
    log::info!("Opening database {}", args.database.display());
    SwiftStore::open(&args.database).map_err(|err| {
        format!(
            "could not initialize database {}: {err}",
            args.database.display()
        )
    })
}

fn run_import(args: ImportArgs) -> Result<(), String> {
    let store = open_store(&args.store)?;
    let start = Instant::now();
    let summary = ingest_file(&store, &args.store.data).map_err(|err| err.to_string())?;
    log_ingest_summary(&summary, start);
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<(), String> {
    let store = open_store(&args.store)?;

    if args.skip_import {
        log::info!("Skipping import of {}", args.store.data.display());
    } else {
        // A failed preload leaves the store empty or partial; the API still starts.
        let start = Instant::now();
        match ingest_file(&store, &args.store.data) {
            Ok(summary) => log_ingest_summary(&summary, start),
            Err(err) => log::warn!("Failed to parse/store spreadsheet data: {err}"),
        }
    }

    let runtime = tokio::runtime::Runtime::new().map_err(|err| err.to_string())?;
    runtime.block_on(serve(Arc::new(store), &args.bind))
}

async fn serve(store: Arc<SwiftStore>, bind: &str) -> Result<(), String> {
    let records = store.count().map_err(|err| err.to_string())?;
    let app = api::router(store);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| format!("could not bind {bind}: {err}"))?;
    emit_info_line(&format!(
        "Server is starting on {bind} with {records} record(s)"
    ));
    axum::serve(listener, app)
        .await
        .map_err(|err| format!("server failed: {err}"))
}

fn log_ingest_summary(summary: &IngestSummary, start: Instant) {
    emit_info_line(&format!(
        "Import: rows={} inserted={} skipped={}",
        summary.total_rows, summary.inserted, summary.skipped
    ));
    emit_info_line(&format!(
        "Import time: {} ms",
        start.elapsed().as_millis()
    ));
}

fn emit_info_line(message: &str) {
    if log::log_enabled!(log::Level::Info) {
        log::info!("{}", message);
    } else {
        println!("{message}");
    }
}
