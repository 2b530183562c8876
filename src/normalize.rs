//! Pure conversions between platform wire formats and storage formats.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Timestamp layout the platform emits for published dates.
const WIRE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Timestamp layout rows are stored with; sortable and `strftime`-friendly.
const STORAGE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed ISO-8601 duration: {0:?}")]
    Duration(String),

    #[error("malformed timestamp: {0:?}")]
    Timestamp(String),
}

/// Parses an ISO-8601 duration (`PT1H2M3S`, `P2DT4H`, ...) into total seconds.
///
/// Only the day/hour/minute/second designators the platform actually emits
/// are supported; anything else is a [`ParseError::Duration`].
pub fn iso_duration_to_seconds(input: &str) -> Result<i64, ParseError> {
    let malformed = || ParseError::Duration(input.to_string());

    let rest = input.strip_prefix('P').ok_or_else(malformed)?;
    if rest.is_empty() {
        return Err(malformed());
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (rest, None),
    };
    if time_part == Some("") {
        return Err(malformed());
    }

    let mut total: i64 = 0;
    total += parse_components(date_part, &[('D', 86_400)]).ok_or_else(malformed)?;
    if let Some(time) = time_part {
        total += parse_components(time, &[('H', 3_600), ('M', 60), ('S', 1)])
            .ok_or_else(malformed)?;
    }

    Ok(total)
}

/// Parses one designator section, enforcing designator order. Returns `None`
/// on unknown designators, missing digits, or trailing garbage.
fn parse_components(section: &str, designators: &[(char, i64)]) -> Option<i64> {
    let mut total: i64 = 0;
    let mut cursor = section;
    let mut next_designator = 0;

    while !cursor.is_empty() {
        let digits_end = cursor.find(|c: char| !c.is_ascii_digit())?;
        if digits_end == 0 {
            return None;
        }
        let value: i64 = cursor[..digits_end].parse().ok()?;
        let designator = cursor[digits_end..].chars().next()?;

        let position = designators[next_designator..]
            .iter()
            .position(|(d, _)| *d == designator)?;
        let (_, multiplier) = designators[next_designator + position];
        next_designator += position + 1;

        total = total.checked_add(value.checked_mul(multiplier)?)?;
        cursor = &cursor[digits_end + designator.len_utf8()..];
    }

    Some(total)
}

/// Converts a strict `YYYY-MM-DDTHH:MM:SSZ` timestamp into the storage
/// layout. Empty input maps to `Ok(None)`: some records legitimately omit
/// a published date.
pub fn iso_timestamp_to_storage(input: &str) -> Result<Option<String>, ParseError> {
    if input.is_empty() {
        return Ok(None);
    }

    let parsed = NaiveDateTime::parse_from_str(input, WIRE_TIMESTAMP)
        .map_err(|_| ParseError::Timestamp(input.to_string()))?;

    Ok(Some(parsed.format(STORAGE_TIMESTAMP).to_string()))
}

/// Flattens a tag list into one comma-joined string for storage.
///
/// Known limitation carried over from the harvest format: commas embedded
/// in a tag are not escaped, so the join is lossy.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_full_designators() {
        assert_eq!(iso_duration_to_seconds("PT1H2M3S").unwrap(), 3723);
    }

    #[test]
    fn duration_seconds_only() {
        assert_eq!(iso_duration_to_seconds("PT45S").unwrap(), 45);
    }

    #[test]
    fn duration_minutes_only() {
        assert_eq!(iso_duration_to_seconds("PT4M").unwrap(), 240);
    }

    #[test]
    fn duration_with_days() {
        assert_eq!(iso_duration_to_seconds("P2DT4H").unwrap(), 2 * 86_400 + 4 * 3_600);
    }

    #[test]
    fn duration_zero() {
        assert_eq!(iso_duration_to_seconds("PT0S").unwrap(), 0);
    }

    #[test]
    fn duration_round_trips_total_seconds() {
        // Reference formatter: seconds -> PTxHxMxS -> seconds.
        for &seconds in &[0i64, 59, 61, 3_600, 3_723, 86_399] {
            let formatted = format!(
                "PT{}H{}M{}S",
                seconds / 3_600,
                (seconds % 3_600) / 60,
                seconds % 60
            );
            assert_eq!(iso_duration_to_seconds(&formatted).unwrap(), seconds);
        }
    }

    #[test]
    fn duration_rejects_malformed() {
        for bad in ["", "PT", "P", "1H2M", "PTxS", "PT1X", "PT1S2M", "PT1H garbage"] {
            assert!(
                iso_duration_to_seconds(bad).is_err(),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn timestamp_converts_to_storage_layout() {
        assert_eq!(
            iso_timestamp_to_storage("2020-08-23T20:55:00Z").unwrap(),
            Some("2020-08-23 20:55:00".to_string())
        );
    }

    #[test]
    fn timestamp_round_trips_instant() {
        let stored = iso_timestamp_to_storage("2022-01-31T09:05:07Z")
            .unwrap()
            .unwrap();
        let back = NaiveDateTime::parse_from_str(&stored, STORAGE_TIMESTAMP).unwrap();
        assert_eq!(back.format(WIRE_TIMESTAMP).to_string(), "2022-01-31T09:05:07Z");
    }

    #[test]
    fn timestamp_empty_is_none() {
        assert_eq!(iso_timestamp_to_storage("").unwrap(), None);
    }

    #[test]
    fn timestamp_rejects_malformed() {
        for bad in ["2020-08-23", "2020-08-23 20:55:00", "not a date", "2020-13-01T00:00:00Z"] {
            assert!(iso_timestamp_to_storage(bad).is_err());
        }
    }

    #[test]
    fn tags_join_unescaped() {
        let tags = vec!["music".to_string(), "live, acoustic".to_string()];
        assert_eq!(join_tags(&tags), "music,live, acoustic");
        assert_eq!(join_tags(&[]), "");
    }
}
