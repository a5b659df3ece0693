// Wire types exchanged with the scraping server (POST /scrape)

use serde::{Deserialize, Serialize};

pub const ENGINE_LEFT_TIME_MIN_DEFAULT: &str = "0";
pub const ENGINE_LEFT_TIME_MAX_DEFAULT: &str = "1000000000";

// A min/max pair; either side may be open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<String>,
    pub max: Option<String>,
}

// Search criteria sent to the server. Numbers stay strings, the server parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub country: Option<String>,
    pub year: Bounds,
    pub price: Bounds,
    pub engine_left_time_min: String,
    pub engine_left_time_max: String,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            manufacturer: None,
            model: None,
            country: None,
            year: Bounds::default(),
            price: Bounds::default(),
            engine_left_time_min: ENGINE_LEFT_TIME_MIN_DEFAULT.to_string(),
            engine_left_time_max: ENGINE_LEFT_TIME_MAX_DEFAULT.to_string(),
        }
    }
}

// Hours and overhaul status of one engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineHours {
    #[serde(default, deserialize_with = "lenient::text")]
    pub horas: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub status: Option<String>,
}

// One scraped aircraft listing, field names match the server's JSON keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingResult {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub titulo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub preco: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub localizacao: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ano: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fabricante: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub modelo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub motor_1_left: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub motor_2_left: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub horas_totais: Option<String>,
    #[serde(default, deserialize_with = "lenient::engine_hours")]
    pub motor_1_horas: Option<EngineHours>,
    #[serde(default, deserialize_with = "lenient::engine_hours")]
    pub motor_2_horas: Option<EngineHours>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub motor_1_tbo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub motor_2_tbo: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub vendedor: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub telefone: Option<String>,
}

impl ListingResult {
    pub fn engine_1_hours(&self) -> Option<&str> {
        self.motor_1_horas.as_ref()?.horas.as_deref()
    }

    pub fn engine_1_status(&self) -> Option<&str> {
        self.motor_1_horas.as_ref()?.status.as_deref()
    }

    pub fn engine_2_hours(&self) -> Option<&str> {
        self.motor_2_horas.as_ref()?.horas.as_deref()
    }

    pub fn engine_2_status(&self) -> Option<&str> {
        self.motor_2_horas.as_ref()?.status.as_deref()
    }
}

// Scalars may arrive as numbers or booleans; they are carried as text.
// Containers in a scalar slot are rejected.
mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};
    use serde_json::Value;

    use super::EngineHours;

    fn scalar_text(value: Value) -> Result<Option<String>, String> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(format!("expected a scalar, found {other}")),
        }
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            Some(value) => scalar_text(value).map_err(D::Error::custom),
            None => Ok(None),
        }
    }

    // Older servers sent the engine time as a bare string ("1500 SMOH")
    pub fn engine_hours<'de, D>(deserializer: D) -> Result<Option<EngineHours>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(object @ Value::Object(_)) => EngineHours::deserialize(object)
                .map(Some)
                .map_err(D::Error::custom),
            Some(value) => {
                let horas = scalar_text(value).map_err(D::Error::custom)?;
                Ok(Some(EngineHours { horas, status: None }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_filter_serializes_nulls_and_engine_bounds() {
        let value = serde_json::to_value(SearchFilter::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "manufacturer": null,
                "model": null,
                "country": null,
                "year": { "min": null, "max": null },
                "price": { "min": null, "max": null },
                "engine_left_time_min": "0",
                "engine_left_time_max": "1000000000"
            })
        );
    }

    #[test]
    fn listing_fields_default_when_absent() {
        let listing: ListingResult = serde_json::from_value(json!({ "url": "https://a" })).unwrap();
        assert_eq!(listing.url.as_deref(), Some("https://a"));
        assert_eq!(listing.titulo, None);
        assert_eq!(listing.motor_1_horas, None);
    }

    #[test]
    fn numeric_fields_are_carried_as_text() {
        let listing: ListingResult = serde_json::from_value(json!({
            "ano": 2002,
            "horas_totais": 3200.5,
            "preco": null
        }))
        .unwrap();
        assert_eq!(listing.ano.as_deref(), Some("2002"));
        assert_eq!(listing.horas_totais.as_deref(), Some("3200.5"));
        assert_eq!(listing.preco, None);
    }

    #[test]
    fn engine_hours_accepts_object_or_bare_value() {
        let listing: ListingResult = serde_json::from_value(json!({
            "motor_1_horas": { "horas": "1500", "status": "SMOH" },
            "motor_2_horas": "900 SFOH"
        }))
        .unwrap();
        assert_eq!(listing.engine_1_hours(), Some("1500"));
        assert_eq!(listing.engine_1_status(), Some("SMOH"));
        assert_eq!(listing.engine_2_hours(), Some("900 SFOH"));
        assert_eq!(listing.engine_2_status(), None);
    }

    #[test]
    fn container_in_scalar_field_is_rejected() {
        let err = serde_json::from_value::<ListingResult>(json!({ "titulo": ["a", "b"] }));
        assert!(err.is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let listing: ListingResult =
            serde_json::from_value(json!({ "url": "u", "descricao": "long text", "imagens": [] }))
                .unwrap();
        assert_eq!(listing.url.as_deref(), Some("u"));
    }
}
