// Search filters from a table -> scraping server -> results and history tables

pub mod client;
pub mod config;
pub mod csv_store;
pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod format;
pub mod history;
pub mod models;
pub mod render;
pub mod sync;
pub mod table;

pub use client::ScrapeClient;
pub use error::{StoreError, SyncError, SyncResult};
pub use models::{Bounds, EngineHours, ListingResult, SearchFilter};
pub use sync::{SearchSync, SyncOptions, SyncReport};
pub use table::{MemoryStore, Region, Row, Sheet, TableStore};
