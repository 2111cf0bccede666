//! Search job parameters.
//!
//! # What this module handles:
//! - The caller-facing [`SearchParams`]
//! - Qualifying `from`/`to` with an IANA timezone
//! - The JSON body of `POST /search/jobs`
//!
//! # What this module does NOT handle:
//! - Query validation; the service rejects bad queries with a 400

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClientError, Result};

/// Field extraction mode for the job (`autoParsingMode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoParsingMode {
    Intelligent,
    Performance,
}

impl std::fmt::Display for AutoParsingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AutoParsingMode::Intelligent => "intelligent",
            AutoParsingMode::Performance => "performance",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for AutoParsingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intelligent" => Ok(Self::Intelligent),
            "performance" => Ok(Self::Performance),
            other => Err(format!(
                "unknown auto parsing mode '{other}' (expected intelligent or performance)"
            )),
        }
    }
}

/// Parameters of a search job.
///
/// The effective timezone is `time_zone`, else a string `timeZone` in `extra`,
/// else the client's configured one. It is used both to format `from`/`to`
/// and as the job's `timeZone`.
///
/// `extra` never replaces the typed body fields (`query`, `from`, `to`,
/// `timeZone`, `byReceiptTime`, and `autoParsingMode` when set).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
    pub time_zone: Option<String>,
    pub by_receipt_time: bool,
    pub auto_parsing_mode: Option<AutoParsingMode>,
    /// Additional body fields passed through verbatim.
    pub extra: Map<String, Value>,
}

impl SearchParams {
    pub fn new(
        query: impl Into<String>,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            query: query.into(),
            from,
            to,
            time_zone: None,
            by_receipt_time: false,
            auto_parsing_mode: None,
            extra: Map::new(),
        }
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    pub fn with_by_receipt_time(mut self, by_receipt_time: bool) -> Self {
        self.by_receipt_time = by_receipt_time;
        self
    }

    pub fn with_auto_parsing_mode(mut self, mode: AutoParsingMode) -> Self {
        self.auto_parsing_mode = Some(mode);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Timezone the job runs in, given the client's default.
    pub fn effective_time_zone<'a>(&'a self, default_time_zone: &'a str) -> Result<&'a str> {
        if let Some(tz) = &self.time_zone {
            return Ok(tz.as_str());
        }
        match self.extra.get(TIME_ZONE_KEY) {
            None => Ok(default_time_zone),
            Some(Value::String(tz)) => Ok(tz.as_str()),
            Some(other) => Err(ClientError::InvalidTimezone(other.to_string())),
        }
    }

    /// Build the job creation body, qualifying timestamps in the effective zone.
    pub(crate) fn to_body(&self, default_time_zone: &str) -> Result<Value> {
        let time_zone = self.effective_time_zone(default_time_zone)?;
        let tz = parse_time_zone(time_zone)?;

        let body = CreateJobBody {
            query: &self.query,
            from: format_timestamp(&self.from, tz),
            to: format_timestamp(&self.to, tz),
            time_zone,
            by_receipt_time: self.by_receipt_time,
            auto_parsing_mode: self.auto_parsing_mode,
        };
        let mut body = match serde_json::to_value(body) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(ClientError::InvalidResponse(
                    "search body is not a JSON object".to_string(),
                ));
            }
            Err(e) => {
                return Err(ClientError::InvalidResponse(format!(
                    "failed to encode search body: {e}"
                )));
            }
        };
        for (key, value) in &self.extra {
            body.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Ok(Value::Object(body))
    }
}

const TIME_ZONE_KEY: &str = "timeZone";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateJobBody<'a> {
    query: &'a str,
    from: String,
    to: String,
    time_zone: &'a str,
    #[serde(serialize_with = "crate::serde_helpers::bool_as_string")]
    by_receipt_time: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_parsing_mode: Option<AutoParsingMode>,
}

pub(crate) fn parse_time_zone(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ClientError::InvalidTimezone(name.to_string()))
}

/// `2019-06-25T10:14:31+09:00`: second precision, numeric offset.
pub fn format_timestamp(instant: &DateTime<FixedOffset>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .format("%Y-%m-%dT%H:%M:%S%:z")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_format_timestamp_in_tokyo() {
        let tz = parse_time_zone("Asia/Tokyo").unwrap();
        assert_eq!(
            format_timestamp(&utc("2019-06-25T01:14:31Z"), tz),
            "2019-06-25T10:14:31+09:00"
        );
    }

    #[test]
    fn test_format_timestamp_drops_subseconds() {
        let tz = parse_time_zone("UTC").unwrap();
        assert_eq!(
            format_timestamp(&utc("2019-06-25T01:14:31.987Z"), tz),
            "2019-06-25T01:14:31+00:00"
        );
    }

    #[test]
    fn test_body_uses_default_time_zone() {
        let params = SearchParams::new(
            "sample_query",
            utc("2019-06-25T01:14:31Z"),
            utc("2019-06-25T08:14:31Z"),
        )
        .with_by_receipt_time(true);

        let body = params.to_body("Asia/Tokyo").unwrap();
        assert_eq!(
            body,
            json!({
                "query": "sample_query",
                "from": "2019-06-25T10:14:31+09:00",
                "to": "2019-06-25T17:14:31+09:00",
                "timeZone": "Asia/Tokyo",
                "byReceiptTime": "true"
            })
        );
    }

    #[test]
    fn test_explicit_time_zone_overrides_default() {
        let params = SearchParams::new(
            "error",
            utc("2024-01-01T00:00:00Z"),
            utc("2024-01-01T01:00:00Z"),
        )
        .with_time_zone("Europe/Berlin")
        .with_auto_parsing_mode(AutoParsingMode::Intelligent)
        .with_extra("requiresRawMessages", json!(false));

        let body = params.to_body("Asia/Tokyo").unwrap();
        assert_eq!(body["timeZone"], "Europe/Berlin");
        assert_eq!(body["from"], "2024-01-01T01:00:00+01:00");
        assert_eq!(body["byReceiptTime"], "false");
        assert_eq!(body["autoParsingMode"], "intelligent");
        assert_eq!(body["requiresRawMessages"], false);
    }

    #[test]
    fn test_extra_time_zone_formats_timestamps() {
        let params = SearchParams::new(
            "error",
            utc("2024-01-01T00:00:00Z"),
            utc("2024-01-01T01:00:00Z"),
        )
        .with_extra("timeZone", json!("Europe/Berlin"));

        let body = params.to_body("Asia/Tokyo").unwrap();
        assert_eq!(body["timeZone"], "Europe/Berlin");
        assert_eq!(body["from"], "2024-01-01T01:00:00+01:00");
        assert_eq!(body["to"], "2024-01-01T02:00:00+01:00");
    }

    #[test]
    fn test_typed_time_zone_wins_over_extra() {
        let params = SearchParams::new(
            "error",
            utc("2024-01-01T00:00:00Z"),
            utc("2024-01-01T01:00:00Z"),
        )
        .with_time_zone("UTC")
        .with_extra("timeZone", json!("Europe/Berlin"));

        let body = params.to_body("Asia/Tokyo").unwrap();
        assert_eq!(body["timeZone"], "UTC");
        assert_eq!(body["from"], "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_extra_does_not_replace_typed_fields() {
        let params = SearchParams::new(
            "error",
            utc("2024-01-01T00:00:00Z"),
            utc("2024-01-01T01:00:00Z"),
        )
        .with_extra("query", json!("*"))
        .with_extra("from", json!("yesterday"))
        .with_extra("byReceiptTime", json!(true))
        .with_extra("autoParsingMode", json!("performance"));

        let body = params.to_body("UTC").unwrap();
        assert_eq!(body["query"], "error");
        assert_eq!(body["from"], "2024-01-01T00:00:00+00:00");
        assert_eq!(body["byReceiptTime"], "false");
        assert_eq!(body["autoParsingMode"], "performance");
    }

    #[test]
    fn test_non_string_extra_time_zone_is_rejected() {
        let params = SearchParams::new(
            "error",
            utc("2024-01-01T00:00:00Z"),
            utc("2024-01-01T01:00:00Z"),
        )
        .with_extra("timeZone", json!(9));

        assert!(matches!(
            params.to_body("Asia/Tokyo"),
            Err(ClientError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_unknown_time_zone_is_rejected() {
        let params = SearchParams::new(
            "error",
            utc("2024-01-01T00:00:00Z"),
            utc("2024-01-01T01:00:00Z"),
        )
        .with_time_zone("Mars/Olympus");

        let err = params.to_body("Asia/Tokyo").unwrap_err();
        assert!(matches!(err, ClientError::InvalidTimezone(ref tz) if tz == "Mars/Olympus"));
    }

    #[test]
    fn test_auto_parsing_mode_from_str() {
        assert_eq!(
            "Performance".parse::<AutoParsingMode>().unwrap(),
            AutoParsingMode::Performance
        );
        assert!("fast".parse::<AutoParsingMode>().is_err());
    }
}
