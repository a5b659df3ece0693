// Writes the current search's listings into the results block of the search sheet

use crate::engine::engine_left_time;
use crate::error::StoreError;
use crate::format::{auto_widths, Banding, NumberFormat, RowSpan, SheetFormat};
use crate::models::ListingResult;
use crate::table::{is_blank, Region, Row, TableStore};

pub const RESULTS_HEADER_ROW: usize = 4; // sheet row 5
pub const RESULTS_FIRST_ROW: usize = 5; // sheet row 6
pub const NO_RESULTS_MESSAGE: &str = "Nenhum resultado encontrado";

pub const RESULT_HEADERS: [&str; 18] = [
    "URL",
    "Título",
    "Preço",
    "Localização",
    "Ano",
    "Fabricante",
    "Modelo",
    "Horas Restantes Motor 1",
    "Horas Restantes Motor 2",
    "Horas Totais",
    "Motor 1 Horas",
    "Motor 1 Status",
    "Motor 2 Horas",
    "Motor 2 Status",
    "Motor 1 TBO",
    "Motor 2 TBO",
    "Vendedor",
    "Telefone",
];

const PRICE_COLUMN: usize = 2;
const INTEGER_COLUMNS: [usize; 8] = [4, 7, 8, 9, 10, 12, 14, 15];
const CENTERED_COLUMNS: [usize; 10] = [4, 7, 8, 9, 10, 11, 12, 13, 14, 15];
const BAND_EVEN: &str = "#ffffff";
const BAND_ODD: &str = "#f3f3f3";

fn text(field: Option<&str>) -> String {
    field.unwrap_or_default().to_string()
}

// Remaining time as sent, else derived from TBO and current hours when allowed
fn engine_left(sent: Option<&str>, tbo: Option<&str>, hours: Option<&str>, derive: bool) -> String {
    match sent {
        Some(left) => left.to_string(),
        None if derive => tbo
            .zip(hours)
            .and_then(|(tbo, hours)| engine_left_time(tbo, hours))
            .unwrap_or_default(),
        None => String::new(),
    }
}

/// One listing in result column order; absent fields are empty strings.
pub fn listing_row(listing: &ListingResult, derive_engine_left: bool) -> Row {
    vec![
        text(listing.url.as_deref()),
        text(listing.titulo.as_deref()),
        text(listing.preco.as_deref()),
        text(listing.localizacao.as_deref()),
        text(listing.ano.as_deref()),
        text(listing.fabricante.as_deref()),
        text(listing.modelo.as_deref()),
        engine_left(
            listing.motor_1_left.as_deref(),
            listing.motor_1_tbo.as_deref(),
            listing.engine_1_hours(),
            derive_engine_left,
        ),
        engine_left(
            listing.motor_2_left.as_deref(),
            listing.motor_2_tbo.as_deref(),
            listing.engine_2_hours(),
            derive_engine_left,
        ),
        text(listing.horas_totais.as_deref()),
        text(listing.engine_1_hours()),
        text(listing.engine_1_status()),
        text(listing.engine_2_hours()),
        text(listing.engine_2_status()),
        text(listing.motor_1_tbo.as_deref()),
        text(listing.motor_2_tbo.as_deref()),
        text(listing.vendedor.as_deref()),
        text(listing.telefone.as_deref()),
    ]
}

pub fn header_row() -> Row {
    RESULT_HEADERS.iter().map(|h| h.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendered {
    pub rows: usize,
    pub header_written: bool,
}

#[derive(Debug, Clone)]
pub struct ResultRenderer {
    sheet: String,
    derive_engine_left: bool,
}

impl ResultRenderer {
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

    // Replaces the results block with `listings`. Rows left over from an earlier
    // render are always cleared, also when nothing was found.
    pub fn render(
        &self,
        store: &mut dyn TableStore,
        listings: &[ListingResult],
    ) -> Result<Rendered, StoreError> {
        store.clear_from(&self.sheet, RESULTS_FIRST_ROW)?;

        if listings.is_empty() {
            store.write(
                &self.sheet,
                RESULTS_FIRST_ROW,
                0,
                &[vec![NO_RESULTS_MESSAGE.to_string()]],
            )?;
            tracing::info!(sheet = %self.sheet, "No listings, wrote empty-result message");
            return Ok(Rendered {
                rows: 0,
                header_written: false,
            });
        }

        let header_region = Region::new(RESULTS_HEADER_ROW, 0, 1, RESULT_HEADERS.len());
        let header_present = store
            .read(&self.sheet, header_region)?
            .iter()
            .flatten()
            .any(|cell| !is_blank(cell));
        if !header_present {
            store.write(&self.sheet, RESULTS_HEADER_ROW, 0, &[header_row()])?;
        }

        let rows: Vec<Row> = listings
            .iter()
            .map(|listing| listing_row(listing, self.derive_engine_left))
            .collect();
        store.write(&self.sheet, RESULTS_FIRST_ROW, 0, &rows)?;

        tracing::info!(sheet = %self.sheet, rows = rows.len(), header_written = !header_present, "Rendered listings");
        Ok(Rendered {
            rows: rows.len(),
            header_written: !header_present,
        })
    }

    // Borders, banding and number formats over the rendered block; widths over the whole sheet
    pub fn apply_format(&self, store: &mut dyn TableStore, rendered: Rendered) -> Result<(), StoreError> {
        let sheet = store.sheet(&self.sheet)?;
        let mut format = SheetFormat::default();

        if rendered.rows > 0 {
            let last = RESULTS_FIRST_ROW + rendered.rows - 1;
            format.borders = Some(RowSpan {
                first: RESULTS_HEADER_ROW,
                last,
            });
            format.bold_rows = vec![RESULTS_HEADER_ROW];
            format.banding = Some(Banding {
                rows: RowSpan {
                    first: RESULTS_FIRST_ROW,
                    last,
                },
                even: BAND_EVEN.to_string(),
                odd: BAND_ODD.to_string(),
            });
            format.column_mut(PRICE_COLUMN).number = Some(NumberFormat::Currency);
            for column in INTEGER_COLUMNS {
                format.column_mut(column).number = Some(NumberFormat::Integer);
            }
            for column in CENTERED_COLUMNS {
                format.column_mut(column).centered = true;
            }
        }
        format.set_widths(&auto_widths(&sheet.rows));

        store.apply_format(&self.sheet, format)
    }
}
