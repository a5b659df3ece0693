// Cosmetic formatting attached to a sheet.
// Backends persist it next to the cell data; nothing here changes cell values.

use serde::{Deserialize, Serialize};

use crate::table::Row;

// Extra characters added to the longest cell when sizing a column
const WIDTH_PADDING: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    Currency,
    Integer,
}

impl NumberFormat {
    // Spreadsheet-style pattern for the format
    pub fn pattern(&self) -> &'static str {
        match self {
            NumberFormat::Currency => "$#,##0.00",
            NumberFormat::Integer => "0",
        }
    }
}

// Inclusive 0-based row range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSpan {
    pub first: usize,
    pub last: usize,
}

impl RowSpan {
    pub fn contains(&self, row: usize) -> bool {
        (self.first..=self.last).contains(&row)
    }
}

// Alternating background colors over a row range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banding {
    pub rows: RowSpan,
    pub even: String,
    pub odd: String,
}

impl Banding {
    pub fn color_of(&self, row: usize) -> Option<&str> {
        if !self.rows.contains(row) {
            return None;
        }
        if (row - self.rows.first) % 2 == 0 {
            Some(&self.even)
        } else {
            Some(&self.odd)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFormat {
    #[serde(default)]
    pub number: Option<NumberFormat>,
    #[serde(default)]
    pub centered: bool,
    // Stored as text, never coerced to a number or date
    #[serde(default)]
    pub text: bool,
    #[serde(default)]
    pub width: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetFormat {
    #[serde(default)]
    pub frozen_rows: usize,
    #[serde(default)]
    pub bold_rows: Vec<usize>,
    #[serde(default)]
    pub borders: Option<RowSpan>,
    #[serde(default)]
    pub banding: Option<Banding>,
    #[serde(default)]
    pub columns: Vec<ColumnFormat>,
}

impl SheetFormat {
    // Frozen bold header with every column text-typed
    pub fn text_table(columns: usize) -> Self {
        Self {
            frozen_rows: 1,
            bold_rows: vec![0],
            columns: vec![
                ColumnFormat {
                    text: true,
                    ..ColumnFormat::default()
                };
                columns
            ],
            ..Self::default()
        }
    }

    pub fn is_text_table(&self) -> bool {
        !self.columns.is_empty() && self.columns.iter().all(|c| c.text)
    }

    pub fn column_mut(&mut self, index: usize) -> &mut ColumnFormat {
        if self.columns.len() <= index {
            self.columns.resize(index + 1, ColumnFormat::default());
        }
        &mut self.columns[index]
    }

    pub fn set_widths(&mut self, widths: &[usize]) {
        for (index, width) in widths.iter().enumerate() {
            self.column_mut(index).width = *width;
        }
    }
}

/// Column widths sized to the longest cell (in characters) plus padding.
pub fn auto_widths(rows: &[Row]) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if widths.len() <= index {
                widths.resize(index + 1, 0);
            }
            widths[index] = widths[index].max(len);
        }
    }
    widths.into_iter().map(|w| w + WIDTH_PADDING).collect()
}
