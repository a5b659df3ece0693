// One search run: read filters, query the scraper, render, record history, format

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};

use crate::client::ScrapeClient;
use crate::config::Settings;
use crate::error::SyncResult;
use crate::export;
use crate::filter::{extract_filter, FILTER_REGION};
use crate::history::HistoryRecorder;
use crate::models::SearchFilter;
use crate::render::ResultRenderer;
use crate::table::TableStore;

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub search_sheet: String,
    pub history_sheet: String,
    pub export_dir: Option<PathBuf>,
    pub derive_engine_left: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            search_sheet: "search".to_string(),
            history_sheet: "history".to_string(),
            export_dir: None,
            derive_engine_left: false,
        }
    }
}

impl From<&Settings> for SyncOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            search_sheet: settings.search_sheet.clone(),
            history_sheet: settings.history_sheet.clone(),
            export_dir: settings.export_dir.as_ref().map(PathBuf::from),
            derive_engine_left: settings.derive_engine_left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub filter: SearchFilter,
    pub unknown_labels: Vec<String>,
    pub results: usize,
    pub history_rows: usize,
    pub export: Option<PathBuf>,
}

pub struct SearchSync {
    client: ScrapeClient,
    options: SyncOptions,
}

impl SearchSync {
    pub fn new(client: ScrapeClient, options: SyncOptions) -> Self {
        Self { client, options }
    }

    pub fn renderer(&self) -> ResultRenderer {
        ResultRenderer::new(&self.options.search_sheet).derive_engine_left(self.options.derive_engine_left)
    }

    pub fn history(&self) -> HistoryRecorder {
        HistoryRecorder::new(&self.options.history_sheet).derive_engine_left(self.options.derive_engine_left)
    }

    pub async fn run(&self, store: &mut dyn TableStore) -> SyncResult<SyncReport> {
        self.run_at(store, Local::now().naive_local()).await
    }

    // Nothing is written before the server has answered successfully.
    // A failure half way through rendering leaves the cells written so far.
    pub async fn run_at(&self, store: &mut dyn TableStore, now: NaiveDateTime) -> SyncResult<SyncReport> {
        let filter_rows = store.read(&self.options.search_sheet, FILTER_REGION)?;
        let extraction = extract_filter(&filter_rows);
        for label in &extraction.unknown_labels {
            tracing::warn!(label = %label, "Ignoring unrecognized filter label");
        }
        let filter = extraction.filter;

        tracing::info!(endpoint = %self.client.endpoint(), filter = ?filter, "Querying scraping server");
        let listings = self.client.query(&filter).await?;
        tracing::info!(results = listings.len(), "Scraping server answered");

        let renderer = self.renderer();
        let rendered = renderer.render(store, &listings)?;

        let filter_json = serde_json::to_string(&filter)?;
        let history_rows = self.history().record(store, &filter_json, &listings, now)?;

        renderer.apply_format(store, rendered)?;

        let export = match &self.options.export_dir {
            Some(dir) if !listings.is_empty() => Some(export::write_consolidated(
                dir,
                &filter,
                &listings,
                self.options.derive_engine_left,
                now,
            )?),
            _ => None,
        };

        Ok(SyncReport {
            filter,
            unknown_labels: extraction.unknown_labels,
            results: listings.len(),
            history_rows,
            export,
        })
    }
}
