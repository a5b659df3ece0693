use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use search_sync::{
    config::Settings, csv_store::CsvWorkbook, history::HistoryRecorder, ScrapeClient, SearchSync,
    SyncOptions,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Sync,
    HistoryStats,
    HistoryClear,
    HistorySnapshot,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sync" => Ok(Command::Sync),
            "history-stats" => Ok(Command::HistoryStats),
            "history-clear" => Ok(Command::HistoryClear),
            "history-snapshot" => Ok(Command::HistorySnapshot),
            other => Err(anyhow!(
                "unknown command '{}' (expected sync, history-stats, history-clear or history-snapshot)",
                other
            )),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "search_sync=info".into()))
        .with(fmt::layer())
        .init();

    let command = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => Command::Sync,
    };

    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let mut workbook = CsvWorkbook::open(&settings.workbook_dir)
        .with_context(|| format!("Failed to open workbook at {}", settings.workbook_dir))?;
    tracing::debug!(dir = %workbook.dir().display(), ?command, "Workbook opened");

    let options = SyncOptions::from(&settings);
    let history = HistoryRecorder::new(&options.history_sheet);

    match command {
        Command::Sync => {
            let client = ScrapeClient::new(settings.scraper_url.as_deref())?;
            let sync = SearchSync::new(client, options);
            match sync.run(&mut workbook).await {
                Ok(report) => {
                    tracing::info!(
                        results = report.results,
                        history_rows = report.history_rows,
                        export = ?report.export,
                        "Sync complete"
                    );
                }
                Err(e) => {
                    tracing::error!("Sync failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Command::HistoryStats => {
            let stats = history.stats(&workbook).context("Failed to read history")?;
            println!("{}", stats);
        }
        Command::HistoryClear => {
            let removed = history.clear(&mut workbook).context("Failed to clear history")?;
            println!("Removed {} history rows", removed);
        }
        Command::HistorySnapshot => {
            let name = history
                .snapshot(&mut workbook, Local::now().naive_local())
                .context("Failed to snapshot history")?;
            println!("History copied to sheet '{}'", name);
        }
    }

    Ok(())
}
