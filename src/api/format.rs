use bson::DateTime;
use chrono::{NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serializer;

/// `2025-01-15T10:30:00.000Z`
pub fn iso_datetime(value: &DateTime) -> String {
    value.to_chrono().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `2025-01-15`
pub fn iso_date(value: &DateTime) -> String {
    value.to_chrono().format("%Y-%m-%d").to_string()
}

pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` (read as UTC) and
/// bare dates (midnight UTC).
pub fn parse_date(value: &str) -> Option<DateTime> {
    let value = value.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(DateTime::from_chrono(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(DateTime::from_chrono(naive.and_utc()));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_chrono(naive.and_utc()))
}

/// Serialize whole numbers as JSON integers (`2` rather than `2.0`).
pub fn whole_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_millisecond_iso_and_date_only() {
        let dt = parse_date("2025-03-10T08:15:30.250Z").unwrap();
        assert_eq!(iso_datetime(&dt), "2025-03-10T08:15:30.250Z");
        assert_eq!(iso_date(&dt), "2025-03-10");
    }

    #[test]
    fn parses_bare_dates_as_utc_midnight() {
        let dt = parse_date("2025-12-31").unwrap();
        assert_eq!(iso_datetime(&dt), "2025-12-31T00:00:00.000Z");
        assert!(parse_date("next tuesday").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn offsets_are_normalised_to_utc() {
        let dt = parse_date("2025-01-01T01:00:00+02:00").unwrap();
        assert_eq!(iso_datetime(&dt), "2024-12-31T23:00:00.000Z");
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        #[derive(serde::Serialize)]
        struct Amount(#[serde(serialize_with = "whole_number")] f64);
        assert_eq!(serde_json::to_string(&Amount(3.0)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Amount(2.5)).unwrap(), "2.5");
    }
}
