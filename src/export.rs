// Consolidated CSV export of one search: the filter block, a blank row, then the results

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::error::StoreError;
use crate::models::{ListingResult, SearchFilter};
use crate::render::{header_row, listing_row};
use crate::table::Row;

const SEARCH_HEADERS: [&str; 7] = [
    "Fabricante",
    "Modelo",
    "País",
    "Ano Mínimo",
    "Ano Máximo",
    "Preço Mínimo",
    "Preço Máximo",
];

fn or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn path_part(value: Option<&str>) -> String {
    let part: String = value
        .unwrap_or("Any")
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if part.is_empty() { "Any".to_string() } else { part }
}

/// `<dir>/<manufacturer>_<model>/resultados_<YYYYMMDD_HHMMSS>.csv`
pub fn export_path(dir: &Path, filter: &SearchFilter, at: NaiveDateTime) -> PathBuf {
    let folder = format!(
        "{}_{}",
        path_part(filter.manufacturer.as_deref()),
        path_part(filter.model.as_deref())
    );
    dir.join(folder)
        .join(format!("resultados_{}.csv", at.format("%Y%m%d_%H%M%S")))
}

pub fn consolidated_rows(filter: &SearchFilter, listings: &[ListingResult], derive_engine_left: bool) -> Vec<Row> {
    let mut rows: Vec<Row> = vec![
        SEARCH_HEADERS.iter().map(|h| h.to_string()).collect(),
        vec![
            or_empty(&filter.manufacturer),
            or_empty(&filter.model),
            or_empty(&filter.country),
            or_empty(&filter.year.min),
            or_empty(&filter.year.max),
            or_empty(&filter.price.min),
            or_empty(&filter.price.max),
        ],
        vec![String::new(); SEARCH_HEADERS.len()],
        header_row(),
    ];
    rows.extend(listings.iter().map(|l| listing_row(l, derive_engine_left)));
    rows
}

pub fn write_consolidated(
    dir: &Path,
    filter: &SearchFilter,
    listings: &[ListingResult],
    derive_engine_left: bool,
    at: NaiveDateTime,
) -> Result<PathBuf, StoreError> {
    let path = export_path(dir, filter, at);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |source: csv::Error| StoreError::Csv {
        path: path.clone(),
        source,
    };
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&path)
        .map_err(csv_err)?;
    for row in consolidated_rows(filter, listings, derive_engine_left) {
        writer.write_record(&row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| StoreError::Io {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), rows = listings.len(), "Wrote consolidated export");
    Ok(path)
}
