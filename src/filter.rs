// Builds a SearchFilter from the two-row filter block of the search sheet

use crate::models::{SearchFilter, ENGINE_LEFT_TIME_MAX_DEFAULT, ENGINE_LEFT_TIME_MIN_DEFAULT};
use crate::table::{Region, Row};

// Row 1 holds labels, row 2 the values, across the first ten columns
pub const FILTER_REGION: Region = Region {
    row: 0,
    col: 0,
    rows: 2,
    cols: 10,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExtraction {
    pub filter: SearchFilter,
    // Non-blank labels that matched no filter field, as written in the sheet
    pub unknown_labels: Vec<String>,
}

/// Trimmed cell text, or `None` when the cell is blank.
pub fn blank_to_null(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn extract_filter(rows: &[Row]) -> FilterExtraction {
    let labels = rows.first().map(Vec::as_slice).unwrap_or(&[]);
    let values = rows.get(1).map(Vec::as_slice).unwrap_or(&[]);

    let mut filter = SearchFilter::default();
    let mut unknown_labels = Vec::new();

    for (index, label) in labels.iter().enumerate() {
        let value = values.get(index).and_then(|v| blank_to_null(v));
        match label.trim().to_lowercase().as_str() {
            "fabricante" => filter.manufacturer = value,
            "modelo" => filter.model = value,
            "pais" => filter.country = value,
            "ano minimo" => filter.year.min = value,
            "ano maximo" => filter.year.max = value,
            "preco minimo" => filter.price.min = value,
            "preco maximo" => filter.price.max = value,
            "horas rest. motor minimo" => {
                filter.engine_left_time_min =
                    value.unwrap_or_else(|| ENGINE_LEFT_TIME_MIN_DEFAULT.to_string())
            }
            "horas rest. motor maximo" => {
                filter.engine_left_time_max =
                    value.unwrap_or_else(|| ENGINE_LEFT_TIME_MAX_DEFAULT.to_string())
            }
            "" => {}
            _ => unknown_labels.push(label.trim().to_string()),
        }
    }

    FilterExtraction {
        filter,
        unknown_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bounds;

    fn rows(labels: &[&str], values: &[&str]) -> Vec<Row> {
        vec![
            labels.iter().map(|c| c.to_string()).collect(),
            values.iter().map(|c| c.to_string()).collect(),
        ]
    }

    #[test]
    fn cessna_from_1990() {
        let extraction = extract_filter(&rows(&["Fabricante", "Ano Minimo"], &["Cessna", "1990"]));
        assert_eq!(
            extraction.filter,
            SearchFilter {
                manufacturer: Some("Cessna".into()),
                year: Bounds {
                    min: Some("1990".into()),
                    max: None
                },
                ..SearchFilter::default()
            }
        );
        assert!(extraction.unknown_labels.is_empty());
    }

    #[test]
    fn no_recognized_labels_gives_default_filter() {
        let extraction = extract_filter(&rows(&["Cor", "", "Notas"], &["azul", "x", "y"]));
        assert_eq!(extraction.filter, SearchFilter::default());
        assert_eq!(extraction.unknown_labels, vec!["Cor".to_string(), "Notas".to_string()]);
    }

    #[test]
    fn empty_input_gives_default_filter() {
        assert_eq!(extract_filter(&[]).filter, SearchFilter::default());
    }

    #[test]
    fn blank_values_become_null_or_engine_defaults() {
        let labels = [
            "fabricante",
            "modelo",
            "pais",
            "ano minimo",
            "ano maximo",
            "preco minimo",
            "preco maximo",
            "horas rest. motor minimo",
            "horas rest. motor maximo",
        ];
        let values = ["", "  ", "", "", "\t", "", "", " ", ""];
        let filter = extract_filter(&rows(&labels, &values)).filter;
        assert_eq!(filter, SearchFilter::default());
        assert_eq!(filter.engine_left_time_min, "0");
        assert_eq!(filter.engine_left_time_max, "1000000000");
    }

    #[test]
    fn labels_match_case_insensitively_after_trimming() {
        let filter = extract_filter(&rows(
            &["  MODELO ", "Pais", "Preco Maximo", "Horas Rest. Motor Minimo"],
            &["Seneca V", " Brasil ", "500000", "300"],
        ))
        .filter;
        assert_eq!(filter.model.as_deref(), Some("Seneca V"));
        assert_eq!(filter.country.as_deref(), Some("Brasil"));
        assert_eq!(filter.price.max.as_deref(), Some("500000"));
        assert_eq!(filter.engine_left_time_min, "300");
    }

    #[test]
    fn missing_value_row_is_blank() {
        let only_labels = vec![vec!["fabricante".to_string()]];
        assert_eq!(extract_filter(&only_labels).filter.manufacturer, None);
    }

    #[test]
    fn blank_to_null_trims() {
        assert_eq!(blank_to_null(" Piper "), Some("Piper".to_string()));
        assert_eq!(blank_to_null("   "), None);
    }
}
