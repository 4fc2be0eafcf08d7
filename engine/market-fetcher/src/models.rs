use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Item catalog response (`GET /v2/items`)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItemsResponse {
    pub data: Vec<CatalogItem>,
}

/// Marketplace catalog entry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CatalogItem {
    #[serde(default)]
    pub id: Option<String>,

    /// URL-safe identifier used by the statistics endpoint
    #[serde(alias = "urlName", alias = "url_name")]
    pub slug: String,

    /// Localized display data keyed by language code
    #[serde(default)]
    pub i18n: HashMap<String, LocalizedItem>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LocalizedItem {
    pub name: String,
}

impl CatalogItem {
    /// Build a catalog entry with an English display name
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        let mut i18n = HashMap::new();
        i18n.insert("en".to_string(), LocalizedItem { name: name.into() });
        Self { id: None, slug: slug.into(), i18n }
    }

    /// English display name, as used by the drop tables
    pub fn name(&self) -> Option<&str> {
        self.i18n.get("en").map(|localized| localized.name.as_str())
    }
}

/// Item statistics response (`GET /v1/items/{slug}/statistics`)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItemStatistics {
    pub payload: StatisticsPayload,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatisticsPayload {
    pub statistics_closed: ClosedStatistics,
}

/// Closed-trade statistics buckets
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ClosedStatistics {
    /// One entry per day for the trailing 90 days
    #[serde(rename = "90days", default)]
    pub ninety_days: Vec<StatisticsEntry>,

    /// One entry per hour for the trailing 48 hours
    #[serde(rename = "48hours", default)]
    pub forty_eight_hours: Vec<StatisticsEntry>,
}

/// One bucket of closed trades
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StatisticsEntry {
    /// ISO-8601 bucket start (e.g., "2024-05-01T00:00:00.000+00:00")
    pub datetime: String,

    pub median: f64,

    #[serde(default)]
    pub volume: Option<f64>,

    #[serde(default)]
    pub min_price: Option<f64>,

    #[serde(default)]
    pub max_price: Option<f64>,

    #[serde(default)]
    pub avg_price: Option<f64>,
}

impl ItemStatistics {
    /// Statistics with only a 90-day series
    pub fn from_daily(entries: Vec<StatisticsEntry>) -> Self {
        Self {
            payload: StatisticsPayload {
                statistics_closed: ClosedStatistics { ninety_days: entries, ..Default::default() },
            },
        }
    }

    /// Daily closed-trade series for the trailing 90 days
    pub fn daily(&self) -> &[StatisticsEntry] {
        &self.payload.statistics_closed.ninety_days
    }
}

impl StatisticsEntry {
    pub fn new(datetime: impl Into<String>, median: f64) -> Self {
        Self {
            datetime: datetime.into(),
            median,
            volume: None,
            min_price: None,
            max_price: None,
            avg_price: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_item_from_v2_payload() {
        let json = r#"{
            "data": [
                {"id": "abc", "slug": "lith_a1_relic", "i18n": {"en": {"name": "Lith A1 Relic"}}},
                {
                    "urlName": "akstiletto_prime_barrel",
                    "i18n": {"en": {"name": "Akstiletto Prime Barrel"}}
                }
            ]
        }"#;

        let items: ItemsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(items.data.len(), 2);
        assert_eq!(items.data[0].slug, "lith_a1_relic");
        assert_eq!(items.data[0].name(), Some("Lith A1 Relic"));
        assert_eq!(items.data[1].slug, "akstiletto_prime_barrel");
        assert_eq!(items.data[1].name(), Some("Akstiletto Prime Barrel"));
    }

    #[test]
    fn test_statistics_payload() {
        let json = r#"{
            "payload": {
                "statistics_closed": {
                    "48hours": [],
                    "90days": [
                        {"datetime": "2024-05-01T00:00:00.000+00:00", "volume": 12, "median": 15.5,
                         "min_price": 10, "max_price": 20, "avg_price": 15.2}
                    ]
                },
                "statistics_live": {}
            }
        }"#;

        let stats: ItemStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.daily().len(), 1);
        assert_eq!(stats.daily()[0].median, 15.5);
        assert_eq!(stats.daily()[0].volume, Some(12.0));
    }
}
