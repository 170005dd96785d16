use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Severity of an incident as used by the downstream catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Outage,
    Degradation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    #[serde(rename = "INFRASTRUCTURE_SERVICE_HOSTING")]
    Hosting,
    #[serde(rename = "INFRASTRUCTURE_SERVICE_EMAIL")]
    Email,
    #[serde(rename = "INFRASTRUCTURE_SERVICE_DNS")]
    Dns,
    #[serde(rename = "INFRASTRUCTURE_SERVICE_CRM")]
    Crm,
    #[serde(rename = "INFRASTRUCTURE_SERVICE_CONTENT_DELIVERY_NETWORK")]
    ContentDeliveryNetwork,
}

/// A location or service reference: providers report either one name or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Affected {
    One(String),
    Many(Vec<String>),
}

impl Affected {
    pub fn is_empty(&self) -> bool {
        match self {
            Affected::One(name) => name.is_empty(),
            Affected::Many(names) => names.is_empty(),
        }
    }
}

impl From<String> for Affected {
    fn from(name: String) -> Self {
        Affected::One(name)
    }
}

impl From<Vec<String>> for Affected {
    fn from(names: Vec<String>) -> Self {
        Affected::Many(names)
    }
}

/// One normalized incident. Field order is the catalog column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub issue: String,
    pub provider_type: ProviderType,
    pub provider: String,
    pub service: Option<Affected>,
    pub location: Option<Affected>,
    /// Minutes between start and end. Derived, never read from the page.
    pub duration: i64,
    pub affect_rate: Option<f64>,
    pub impact: Option<Impact>,
    pub cause: Option<String>,
    pub intensity: Option<String>,
    #[serde(with = "event_time")]
    pub time: Option<NaiveDateTime>,
}

impl Event {
    /// True when the duration cannot be trusted: negative, or zero for an event with a known start.
    pub fn is_flagged(&self) -> bool {
        self.duration < 0 || (self.duration == 0 && self.time.is_some())
    }
}

/// `YYYY-MM-DD HH:MM` on the provider's own clock.
pub mod event_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_str(&time.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| NaiveDateTime::parse_from_str(&raw, FORMAT))
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn event() -> Event {
        Event {
            issue: "zx1y2".to_string(),
            provider_type: ProviderType::ContentDeliveryNetwork,
            provider: "Cloudflare".to_string(),
            service: None,
            location: Some(vec!["Frankfurt, Germany".to_string()].into()),
            duration: 47,
            affect_rate: None,
            impact: Some(Impact::Degradation),
            cause: None,
            intensity: None,
            time: NaiveDate::from_ymd_opt(2019, 6, 27)
                .and_then(|d| d.and_hms_opt(6, 13, 0)),
        }
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(event()).unwrap();
        assert_eq!(
            value,
            json!({
                "issue": "zx1y2",
                "provider_type": "INFRASTRUCTURE_SERVICE_CONTENT_DELIVERY_NETWORK",
                "provider": "Cloudflare",
                "service": null,
                "location": ["Frankfurt, Germany"],
                "duration": 47,
                "affect_rate": null,
                "impact": "degradation",
                "cause": null,
                "intensity": null,
                "time": "2019-06-27 06:13",
            })
        );
    }

    #[test]
    fn test_field_order_matches_catalog_columns() {
        let text = serde_json::to_string(&event()).unwrap();
        let columns = [
            "issue",
            "provider_type",
            "provider",
            "service",
            "location",
            "duration",
            "affect_rate",
            "impact",
            "cause",
            "intensity",
            "time",
        ];
        let positions: Vec<usize> = columns
            .iter()
            .map(|c| text.find(&format!("\"{c}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_single_service_round_trips_as_string() {
        let mut event = event();
        event.service = Some(Affected::One("Object Storage".to_string()));
        event.affect_rate = Some(0.123456789);

        let text = serde_json::to_string(&event).unwrap();
        assert!(text.contains("\"service\":\"Object Storage\""));
        assert_eq!(serde_json::from_str::<Event>(&text).unwrap(), event);
    }

    #[test]
    fn test_flagging() {
        let mut event = event();
        assert!(!event.is_flagged());

        event.duration = 0;
        assert!(event.is_flagged());

        event.time = None;
        assert!(!event.is_flagged(), "unresolved incidents are not flagged");

        event.duration = -1;
        assert!(event.is_flagged());
    }
}
