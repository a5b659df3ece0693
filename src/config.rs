// Settings loaded with the 'config' crate and 'dotenv'

use anyhow::Result;
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    // Base URL of the scraping server; `/scrape` is appended
    pub scraper_url: Option<String>,
    pub workbook_dir: String,
    // Sheet holding the filter rows and the current results
    pub search_sheet: String,
    pub history_sheet: String,
    // Consolidated CSV exports are written here when set
    pub export_dir: Option<String>,
    pub derive_engine_left: bool,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            // Load from a configuration file (search_sync.toml)
            .add_source(File::with_name("search_sync").required(false))
            // Load from environment variables (e.g., SEARCH_SYNC_SCRAPER_URL)
            .add_source(Self::environment());
        Self::build(builder)
    }

    // `__` separates nested keys so single underscores stay inside key names
    fn environment() -> Environment {
        Environment::with_prefix("SEARCH_SYNC")
            .prefix_separator("_")
            .separator("__")
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder
            .set_default("workbook_dir", "workbook")?
            .set_default("search_sheet", "search")?
            .set_default("history_sheet", "history")?
            .set_default("derive_engine_left", false)?
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
