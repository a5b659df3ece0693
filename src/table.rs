// Table access used by the sync pipeline.
// Backends only load and save whole sheets; region reads, writes and appends
// are provided on top of that so every backend behaves the same.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::format::SheetFormat;

pub type Row = Vec<String>;

// Rectangular block of cells, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Region {
    pub fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self { row, col, rows, cols }
    }
}

pub fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

// A grid of text cells plus its formatting. Rows may be ragged; missing cells read as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub rows: Vec<Row>,
    pub format: SheetFormat,
}

impl Sheet {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            format: SheetFormat::default(),
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    // Widest row, in cells
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    // Number of rows up to and including the last one holding a non-blank cell
    pub fn last_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|r| r.iter().any(|c| !is_blank(c)))
            .map_or(0, |i| i + 1)
    }

    pub fn read(&self, region: Region) -> Vec<Row> {
        (region.row..region.row + region.rows)
            .map(|r| {
                (region.col..region.col + region.cols)
                    .map(|c| self.cell(r, c).to_string())
                    .collect()
            })
            .collect()
    }

    // Writes `values` with its top-left cell at (row, col), growing the grid as needed
    pub fn write(&mut self, row: usize, col: usize, values: &[Row]) {
        for (offset, values_row) in values.iter().enumerate() {
            let index = row + offset;
            if self.rows.len() <= index {
                self.rows.resize(index + 1, Row::new());
            }
            let target = &mut self.rows[index];
            if target.len() < col + values_row.len() {
                target.resize(col + values_row.len(), String::new());
            }
            target[col..col + values_row.len()].clone_from_slice(values_row);
        }
    }

    // Drops every row from `row` downwards
    pub fn clear_from(&mut self, row: usize) {
        self.rows.truncate(row);
    }

    pub fn append(&mut self, values: Row) {
        let end = self.last_row();
        self.rows.truncate(end);
        self.rows.push(values);
    }
}

pub trait TableStore {
    fn load(&self, name: &str) -> Result<Option<Sheet>, StoreError>;

    fn save(&mut self, name: &str, sheet: &Sheet) -> Result<(), StoreError>;

    fn exists(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.load(name)?.is_some())
    }

    fn sheet(&self, name: &str) -> Result<Sheet, StoreError> {
        self.load(name)?
            .ok_or_else(|| StoreError::MissingSheet(name.to_string()))
    }

    // A missing sheet reads as blank cells
    fn read(&self, name: &str, region: Region) -> Result<Vec<Row>, StoreError> {
        Ok(self.load(name)?.unwrap_or_default().read(region))
    }

    fn write(&mut self, name: &str, row: usize, col: usize, values: &[Row]) -> Result<(), StoreError> {
        let mut sheet = self.load(name)?.unwrap_or_default();
        sheet.write(row, col, values);
        self.save(name, &sheet)
    }

    fn clear_from(&mut self, name: &str, row: usize) -> Result<(), StoreError> {
        let Some(mut sheet) = self.load(name)? else {
            return Ok(());
        };
        sheet.clear_from(row);
        self.save(name, &sheet)
    }

    fn append(&mut self, name: &str, values: Row) -> Result<(), StoreError> {
        self.append_rows(name, vec![values])
    }

    // Appends below the last non-blank row; the sheet must already exist
    fn append_rows(&mut self, name: &str, rows: Vec<Row>) -> Result<(), StoreError> {
        let mut sheet = self.sheet(name)?;
        for values in rows {
            sheet.append(values);
        }
        self.save(name, &sheet)
    }

    fn create(&mut self, name: &str, header: Row, format: SheetFormat) -> Result<(), StoreError> {
        if self.exists(name)? {
            return Err(StoreError::SheetExists(name.to_string()));
        }
        self.save(name, &Sheet { rows: vec![header], format })
    }

    fn copy(&mut self, from: &str, to: &str) -> Result<(), StoreError> {
        if self.exists(to)? {
            return Err(StoreError::SheetExists(to.to_string()));
        }
        let sheet = self.sheet(from)?;
        self.save(to, &sheet)
    }

    fn apply_format(&mut self, name: &str, format: SheetFormat) -> Result<(), StoreError> {
        let mut sheet = self.sheet(name)?;
        sheet.format = format;
        self.save(name, &sheet)
    }
}

// Sheets held in memory, mainly for tests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    sheets: BTreeMap<String, Sheet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, rows: Vec<Row>) -> Self {
        self.sheets.insert(name.to_string(), Sheet::with_rows(rows));
        self
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }
}

impl TableStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<Sheet>, StoreError> {
        Ok(self.sheets.get(name).cloned())
    }

    fn save(&mut self, name: &str, sheet: &Sheet) -> Result<(), StoreError> {
        self.sheets.insert(name.to_string(), sheet.clone());
        Ok(())
    }
}
