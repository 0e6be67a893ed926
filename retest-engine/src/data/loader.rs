use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use common::{Bar, Result, StrategyError};

/// Load bars from a CSV file.
///
/// Expected columns: timestamp, open, high, low, close. Extra columns are
/// ignored, short rows skipped.
pub fn load_csv(path: &Path) -> Result<Vec<Bar>> {
    let file = File::open(path).map_err(|e| StrategyError::DataLoadError(e.to_string()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut bars = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| StrategyError::CsvError(e.to_string()))?;
        if record.len() < 5 {
            continue;
        }

        let timestamp = parse_timestamp(&record[0])?;
        let open = parse_price(&record[1], "open")?;
        let high = parse_price(&record[2], "high")?;
        let low = parse_price(&record[3], "low")?;
        let close = parse_price(&record[4], "close")?;

        bars.push(Bar::new(timestamp, open, high, low, close));
    }

    Ok(bars)
}

/// Load bars from a JSON array of Bar objects
pub fn load_json(path: &Path) -> Result<Vec<Bar>> {
    let file = File::open(path).map_err(|e| StrategyError::DataLoadError(e.to_string()))?;
    let bars: Vec<Bar> = serde_json::from_reader(BufReader::new(file))?;
    Ok(bars)
}

fn parse_price(field: &str, name: &str) -> Result<f64> {
    field
        .trim()
        .parse()
        .map_err(|_| StrategyError::CsvError(format!("Invalid {} price: {}", name, field)))
}

/// Parse RFC 3339, common date-time formats, or Unix seconds
fn parse_timestamp(field: &str) -> Result<DateTime<Utc>> {
    let field = field.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(field) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(field, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&dt));
    }

    if let Ok(date) = chrono::NaiveDate::parse_from_str(field, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    if let Ok(secs) = field.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(secs, 0) {
            return Ok(dt);
        }
    }

    Err(StrategyError::CsvError(format!(
        "Unable to parse timestamp: {}",
        field
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2024-01-15T09:00:00Z").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 15);
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn test_parse_timestamp_naive() {
        let ts = parse_timestamp("2024-01-15 09:00:00").unwrap();
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn test_parse_timestamp_date_only() {
        let ts = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_unix_seconds() {
        let ts = parse_timestamp("1705312800").unwrap();
        assert_eq!(ts.year(), 2024);
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert!(parse_timestamp("not a time").is_err());
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(parse_price("12.5", "open").is_ok());
        assert!(parse_price("abc", "open").is_err());
    }
}
