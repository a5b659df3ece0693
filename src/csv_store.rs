// Directory-backed workbook: one `<sheet>.csv` per sheet plus an optional
// `<sheet>.format.json` sidecar holding its formatting.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::error::StoreError;
use crate::format::SheetFormat;
use crate::table::{Row, Sheet, TableStore};

#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    dir: PathBuf,
}

impl CsvWorkbook {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn sheet_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    pub fn format_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.format.json"))
    }

    fn read_rows(path: &Path) -> Result<Vec<Row>, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = keep_blank_lines(&text);

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| StoreError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }

    fn read_format(path: &Path) -> Result<SheetFormat, StoreError> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Format {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SheetFormat::default()),
            Err(source) => Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

// The csv reader skips empty lines, but rows are addressed by index.
// An empty line outside a quoted field becomes one empty field so it still reads as a row.
fn keep_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_quotes = false;
    for line in text.split_inclusive('\n') {
        if !in_quotes && line.trim_end_matches(['\r', '\n']).is_empty() {
            out.push_str("\"\"");
        }
        out.push_str(line);
        if line.matches('"').count() % 2 == 1 {
            in_quotes = !in_quotes;
        }
    }
    out
}

impl TableStore for CsvWorkbook {
    fn load(&self, name: &str) -> Result<Option<Sheet>, StoreError> {
        let path = self.sheet_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let rows = Self::read_rows(&path)?;
        let format = Self::read_format(&self.format_path(name))?;
        Ok(Some(Sheet { rows, format }))
    }

    fn save(&mut self, name: &str, sheet: &Sheet) -> Result<(), StoreError> {
        let path = self.sheet_path(name);
        let csv_err = |source: csv::Error| StoreError::Csv {
            path: path.clone(),
            source,
        };

        // Text-typed tables quote every field so spreadsheet imports keep them as text
        let quote_style = if sheet.format.is_text_table() {
            QuoteStyle::Always
        } else {
            QuoteStyle::Necessary
        };
        let mut writer = WriterBuilder::new()
            .quote_style(quote_style)
            .from_path(&path)
            .map_err(csv_err)?;

        // Padded to a rectangle so blank rows survive as rows of empty fields
        let width = sheet.width().max(1);
        for row in &sheet.rows {
            let padded = row
                .iter()
                .map(String::as_str)
                .chain(std::iter::repeat("").take(width - row.len()));
            writer.write_record(padded).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        let format_path = self.format_path(name);
        let json = serde_json::to_string_pretty(&sheet.format).map_err(|source| StoreError::Format {
            path: format_path.clone(),
            source,
        })?;
        fs::write(&format_path, json).map_err(|source| StoreError::Io {
            path: format_path,
            source,
        })?;

        tracing::debug!(sheet = name, rows = sheet.rows.len(), path = %path.display(), "Saved sheet");
        Ok(())
    }
}
