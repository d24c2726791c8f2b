use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

/// Timestamp type used throughout the object model. The original offset is
/// kept so that a document re-serializes with the zone it was written in.
pub type Timestamp = DateTime<FixedOffset>;

/// Parses an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as
/// midnight UTC.
///
/// The format is fixed and independent of the host locale. Surrounding
/// whitespace is ignored; anything else that does not match is an error.
///
/// # Examples
///
/// ```
/// use atombind::util::parse_timestamp;
///
/// assert!(parse_timestamp("2006-01-01T10:00:00.000-08:00").is_ok());
/// assert!(parse_timestamp("2006-01-01").is_ok());
/// assert!(parse_timestamp("01/01/2006").is_err());
/// ```
pub fn parse_timestamp(value: &str) -> Result<Timestamp, chrono::ParseError> {
    let value = value.trim();
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => Ok(ts),
        Err(rfc_err) => {
            if has_time_of_day(value) {
                return Err(rfc_err);
            }
            let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")?;
            Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        }
    }
}

/// True when the lexical value carries a time-of-day component.
pub fn has_time_of_day(value: &str) -> bool {
    value.contains('T')
}
