use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

use kcal_core::csv_import::parse_timestamp;

pub(crate) const LBS_PER_KG: f64 = 2.20462;
pub(crate) const KG_PER_LB: f64 = 0.453_592;

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(today()),
        Some(s) => match s.as_str() {
            "today" => Ok(today()),
            "yesterday" => Ok(today() - chrono::Duration::days(1)),
            "tomorrow" => Ok(today() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Resolve `--at`: a full timestamp, a bare date (midnight), `now`, or
/// `today`/`yesterday` at the current time of day. Defaults to now.
pub(crate) fn parse_at(at: Option<String>) -> Result<NaiveDateTime> {
    let now = Local::now().naive_local();
    let Some(s) = at else {
        return Ok(now);
    };
    match s.trim() {
        "now" | "today" => Ok(now),
        "yesterday" => Ok(now - chrono::Duration::days(1)),
        other => parse_timestamp(other).with_context(|| {
            format!("Invalid time '{other}'. Use 'YYYY-MM-DD HH:MM', YYYY-MM-DD, now or yesterday")
        }),
    }
}

/// Convert a weight to kilograms. Accepts `kg`, `lb` and `lbs`.
pub(crate) fn to_kg(value: f64, unit: &str) -> Result<f64> {
    if value <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    match unit.to_lowercase().as_str() {
        "kg" => Ok(value),
        "lbs" | "lb" => Ok(no_neg_zero(value * KG_PER_LB)),
        _ => bail!("Invalid unit '{unit}'. Use 'kg' or 'lbs'"),
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// First 8 characters of an entry id, enough for `kcal delete`.
pub(crate) fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

pub(crate) fn opt_num(value: Option<f64>) -> String {
    value.map_or("-".into(), |v| format!("{v:.0}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        assert_eq!(parse_date(None).unwrap(), today());
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = today();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_at() {
        let ts = parse_at(Some("2024-01-15 08:30".to_string())).unwrap();
        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap()
        );
        let midnight = parse_at(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(midnight.time(), chrono::NaiveTime::MIN);
        let yesterday = parse_at(Some("yesterday".to_string())).unwrap();
        assert!(yesterday.date() < Local::now().date_naive() + chrono::Duration::days(1));
        assert!(parse_at(Some("soon".to_string())).is_err());
    }

    #[test]
    fn test_to_kg() {
        assert!((to_kg(80.0, "kg").unwrap() - 80.0).abs() < f64::EPSILON);
        assert!((to_kg(100.0, "LBS").unwrap() - 45.3592).abs() < 1e-9);
        assert!(to_kg(0.0, "kg").is_err());
        assert!(to_kg(80.0, "stone").is_err());
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("boom"), r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("日清カップヌードル", 8), "日清カップ...");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }
}
