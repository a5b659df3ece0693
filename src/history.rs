// Append-only log of every search and the listings it returned.
// Rows are only ever appended; clearing and snapshots are explicit maintenance actions.

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::StoreError;
use crate::format::{auto_widths, SheetFormat};
use crate::models::ListingResult;
use crate::render::{listing_row, RESULT_HEADERS};
use crate::table::{is_blank, Row, Sheet, TableStore};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SNAPSHOT_SUFFIX_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn history_header() -> Row {
    ["Data/Hora", "Filtros"]
        .into_iter()
        .chain(RESULT_HEADERS)
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStats {
    pub rows: usize,
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
    pub span_days: Option<i64>,
}

impl fmt::Display for HistoryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rows", self.rows)?;
        if let (Some(earliest), Some(latest), Some(days)) = (self.earliest, self.latest, self.span_days) {
            write!(
                f,
                ", from {} to {} ({} days)",
                earliest.format(TIMESTAMP_FORMAT),
                latest.format(TIMESTAMP_FORMAT),
                days
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct HistoryRecorder {
    sheet: String,
    derive_engine_left: bool,
}

impl HistoryRecorder {
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            derive_engine_left: false,
        }
    }

    pub fn derive_engine_left(mut self, derive: bool) -> Self {
        self.derive_engine_left = derive;
        self
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    // A missing sheet and an existing sheet with no content both get the header
    fn ensure_table(&self, store: &mut dyn TableStore) -> Result<(), StoreError> {
        if let Some(sheet) = store.load(&self.sheet)? {
            if sheet.last_row() > 0 {
                return Ok(());
            }
        }
        let header = history_header();
        let mut format = SheetFormat::text_table(header.len());
        format.set_widths(&auto_widths(std::slice::from_ref(&header)));
        store.save(&self.sheet, &Sheet { rows: vec![header], format })?;
        tracing::info!(sheet = %self.sheet, "Created history table");
        Ok(())
    }

    /// Appends one row per listing, stamped with `at` and the search's filter JSON.
    /// Nothing is written (not even the table) when `listings` is empty.
    pub fn record(
        &self,
        store: &mut dyn TableStore,
        filter_json: &str,
        listings: &[ListingResult],
        at: NaiveDateTime,
    ) -> Result<usize, StoreError> {
        if listings.is_empty() {
            return Ok(0);
        }
        self.ensure_table(store)?;

        let timestamp = at.format(TIMESTAMP_FORMAT).to_string();
        let rows: Vec<Row> = listings
            .iter()
            .map(|listing| {
                let mut row = vec![timestamp.clone(), filter_json.to_string()];
                row.extend(listing_row(listing, self.derive_engine_left));
                row
            })
            .collect();
        let count = rows.len();
        store.append_rows(&self.sheet, rows)?;

        tracing::info!(sheet = %self.sheet, rows = count, "Appended history rows");
        Ok(count)
    }

    // Deletes every row below the header, returns how many went
    pub fn clear(&self, store: &mut dyn TableStore) -> Result<usize, StoreError> {
        let Some(sheet) = store.load(&self.sheet)? else {
            return Ok(0);
        };
        let removed = sheet.last_row().saturating_sub(1);
        store.clear_from(&self.sheet, 1)?;
        tracing::info!(sheet = %self.sheet, removed, "Cleared history");
        Ok(removed)
    }

    // Copies the whole table to `<sheet>_backup_<YYYYMMDD_HHMMSS>`, returns the new name
    pub fn snapshot(&self, store: &mut dyn TableStore, at: NaiveDateTime) -> Result<String, StoreError> {
        let name = format!("{}_backup_{}", self.sheet, at.format(SNAPSHOT_SUFFIX_FORMAT));
        store.copy(&self.sheet, &name)?;
        tracing::info!(sheet = %self.sheet, snapshot = %name, "Saved history snapshot");
        Ok(name)
    }

    pub fn stats(&self, store: &dyn TableStore) -> Result<HistoryStats, StoreError> {
        let sheet = store.load(&self.sheet)?.unwrap_or_default();
        let rows = sheet.last_row().saturating_sub(1);

        let mut earliest: Option<NaiveDateTime> = None;
        let mut latest: Option<NaiveDateTime> = None;
        for (index, row) in sheet.rows.iter().enumerate().skip(1).take(rows) {
            let raw = row.first().map(String::as_str).unwrap_or("");
            if is_blank(raw) {
                continue;
            }
            match NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT) {
                Ok(ts) => {
                    earliest = Some(earliest.map_or(ts, |e| e.min(ts)));
                    latest = Some(latest.map_or(ts, |l| l.max(ts)));
                }
                Err(e) => tracing::warn!(row = index + 1, value = raw, error = %e, "Skipping unparseable history timestamp"),
            }
        }

        let span_days = earliest.zip(latest).map(|(e, l)| (l - e).num_days());
        Ok(HistoryStats {
            rows,
            earliest,
            latest,
            span_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngineHours;
    use crate::table::MemoryStore;
    use chrono::NaiveDate;

    const SHEET: &str = "history";

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn listings(urls: &[&str]) -> Vec<ListingResult> {
        urls.iter()
            .map(|u| ListingResult {
                url: Some(u.to_string()),
                ..ListingResult::default()
            })
            .collect()
    }

    #[test]
    fn first_record_creates_bold_frozen_text_table() {
        let mut store = MemoryStore::new();
        let recorder = HistoryRecorder::new(SHEET);
        let appended = recorder
            .record(&mut store, "{\"model\":null}", &listings(&["a"]), at(1, 9))
            .unwrap();
        assert_eq!(appended, 1);

        let sheet = store.get(SHEET).unwrap();
        assert_eq!(sheet.rows[0], history_header());
        assert_eq!(sheet.rows[0].len(), 20);
        assert_eq!(sheet.format.frozen_rows, 1);
        assert_eq!(sheet.format.bold_rows, vec![0]);
        assert!(sheet.format.is_text_table());
        assert_eq!(sheet.rows[1][0], "2025-03-01 09:00:00");
        assert_eq!(sheet.rows[1][1], "{\"model\":null}");
        assert_eq!(sheet.rows[1][2], "a");
        assert_eq!(sheet.rows[1].len(), 20);
    }

    #[test]
    fn existing_empty_sheet_gets_a_header() {
        let mut store = MemoryStore::new().with_sheet(SHEET, vec![vec![String::new(); 3]]);
        let recorder = HistoryRecorder::new(SHEET);
        recorder
            .record(&mut store, "{}", &listings(&["a", "b"]), at(1, 0))
            .unwrap();

        let sheet = store.get(SHEET).unwrap();
        assert_eq!(sheet.rows[0], history_header());
        assert!(sheet.format.is_text_table());
        assert_eq!(sheet.cell(1, 2), "a");
        assert_eq!(sheet.cell(2, 2), "b");
        assert_eq!(recorder.stats(&store).unwrap().rows, 2);
        assert_eq!(recorder.clear(&mut store).unwrap(), 2);
    }

    #[test]
    fn derived_engine_left_is_recorded_when_enabled() {
        let listing = ListingResult {
            url: Some("a".to_string()),
            motor_1_tbo: Some("2,000".to_string()),
            motor_1_horas: Some(EngineHours {
                horas: Some("1500".to_string()),
                status: Some("SMOH".to_string()),
            }),
            ..ListingResult::default()
        };

        let mut store = MemoryStore::new();
        HistoryRecorder::new(SHEET)
            .derive_engine_left(true)
            .record(&mut store, "{}", std::slice::from_ref(&listing), at(1, 0))
            .unwrap();
        HistoryRecorder::new(SHEET)
            .record(&mut store, "{}", std::slice::from_ref(&listing), at(2, 0))
            .unwrap();

        let sheet = store.get(SHEET).unwrap();
        // engine-1-left sits after timestamp, filters and seven listing columns
        assert_eq!(sheet.rows[0][9], "Horas Restantes Motor 1");
        assert_eq!(sheet.cell(1, 9), "500.00");
        assert_eq!(sheet.cell(2, 9), "");
    }

    #[test]
    fn empty_results_leave_history_untouched() {
        let mut store = MemoryStore::new();
        let appended = HistoryRecorder::new(SHEET)
            .record(&mut store, "{}", &[], at(1, 9))
            .unwrap();
        assert_eq!(appended, 0);
        assert!(store.get(SHEET).is_none());
    }

    #[test]
    fn history_grows_monotonically_in_append_order() {
        let mut store = MemoryStore::new();
        let recorder = HistoryRecorder::new(SHEET);
        recorder
            .record(&mut store, "{\"n\":1}", &listings(&["a", "b"]), at(1, 9))
            .unwrap();
        recorder
            .record(&mut store, "{\"n\":2}", &listings(&["c", "d", "e"]), at(2, 9))
            .unwrap();

        let sheet = store.get(SHEET).unwrap();
        let urls: Vec<_> = sheet.rows[1..].iter().map(|r| r[2].as_str()).collect();
        assert_eq!(urls, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(sheet.rows[3][1], "{\"n\":2}");
        assert_eq!(recorder.stats(&store).unwrap().rows, 5);
    }

    #[test]
    fn stats_report_span_between_extremes() {
        let mut store = MemoryStore::new();
        let recorder = HistoryRecorder::new(SHEET);
        recorder.record(&mut store, "{}", &listings(&["a"]), at(10, 8)).unwrap();
        recorder.record(&mut store, "{}", &listings(&["b"]), at(2, 23)).unwrap();
        recorder.record(&mut store, "{}", &listings(&["c"]), at(12, 7)).unwrap();

        let stats = recorder.stats(&store).unwrap();
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.earliest, Some(at(2, 23)));
        assert_eq!(stats.latest, Some(at(12, 7)));
        // 9 days and 8 hours
        assert_eq!(stats.span_days, Some(9));
        assert_eq!(
            stats.to_string(),
            "3 rows, from 2025-03-02 23:00:00 to 2025-03-12 07:00:00 (9 days)"
        );
    }

    #[test]
    fn stats_skip_bad_timestamps_and_handle_missing_table() {
        let mut store = MemoryStore::new();
        let recorder = HistoryRecorder::new(SHEET);
        assert_eq!(
            recorder.stats(&store).unwrap(),
            HistoryStats {
                rows: 0,
                earliest: None,
                latest: None,
                span_days: None
            }
        );

        recorder.record(&mut store, "{}", &listings(&["a"]), at(5, 0)).unwrap();
        store.append(SHEET, vec!["yesterday".into(), "{}".into()]).unwrap();
        let stats = recorder.stats(&store).unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.earliest, Some(at(5, 0)));
        assert_eq!(stats.span_days, Some(0));
    }

    #[test]
    fn clear_keeps_header_only() {
        let mut store = MemoryStore::new();
        let recorder = HistoryRecorder::new(SHEET);
        recorder.record(&mut store, "{}", &listings(&["a", "b"]), at(1, 9)).unwrap();
        assert_eq!(recorder.clear(&mut store).unwrap(), 2);

        let sheet = store.get(SHEET).unwrap();
        assert_eq!(sheet.rows, vec![history_header()]);
        assert!(sheet.format.is_text_table());
        assert_eq!(recorder.clear(&mut MemoryStore::new()).unwrap(), 0);
    }

    #[test]
    fn snapshot_duplicates_table_under_timestamped_name() {
        let mut store = MemoryStore::new();
        let recorder = HistoryRecorder::new(SHEET);
        recorder.record(&mut store, "{}", &listings(&["a"]), at(1, 9)).unwrap();

        let name = recorder.snapshot(&mut store, at(4, 15)).unwrap();
        assert_eq!(name, "history_backup_20250304_150000");
        assert_eq!(store.get(&name), store.get(SHEET));

        recorder.record(&mut store, "{}", &listings(&["b"]), at(5, 9)).unwrap();
        assert_eq!(store.get(&name).unwrap().rows.len(), 2);
    }

    #[test]
    fn snapshot_of_missing_table_fails() {
        let mut store = MemoryStore::new();
        let err = HistoryRecorder::new(SHEET).snapshot(&mut store, at(1, 0)).unwrap_err();
        assert!(matches!(err, StoreError::MissingSheet(_)));
    }
}
