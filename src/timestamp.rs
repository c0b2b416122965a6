use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};

/// Parse an ISO-8601 timestamp into an absolute instant.
/// A trailing `Z` is rewritten to `+00:00` first; a timestamp without any
/// offset is taken as UTC.
pub fn parse_time(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(head) => format!("{}+00:00", head),
        None => raw.to_string(),
    };

    let rfc3339_err = match DateTime::parse_from_rfc3339(&normalized) {
        Ok(instant) => return Ok(instant),
        Err(e) => e,
    };

    parse_with_offset(&normalized)
        .or_else(|| parse_naive(&normalized).map(|naive| naive.and_utc().fixed_offset()))
        .ok_or(rfc3339_err)
}

/// ISO-8601 shapes RFC 3339 rejects: minutes-only times and compact offsets
fn parse_with_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    [
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%d %H:%M%:z",
        "%Y-%m-%d %H:%M:%S%.f%z",
    ]
    .iter()
    .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// ISO-8601 rendering kept in the instant's own offset, e.g.
/// `2024-01-01T10:00:00+00:00`. Microseconds appear only when non-zero.
pub fn format_instant(instant: &DateTime<FixedOffset>) -> String {
    let precision = if instant.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    instant.to_rfc3339_opts(precision, false)
}

/// Elapsed minutes between two instants, at microsecond resolution.
pub fn minutes_between(earlier: &DateTime<FixedOffset>, later: &DateTime<FixedOffset>) -> f64 {
    let delta = *later - *earlier;
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 60_000_000.0,
        None => delta.num_seconds() as f64 / 60.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zulu_marker_is_zero_offset() {
        let zulu = parse_time("2024-01-01T10:00:00Z").unwrap();
        let explicit = parse_time("2024-01-01T10:00:00+00:00").unwrap();

        assert_eq!(zulu, explicit);
        assert_eq!(zulu.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_offsets_compare_as_instants() {
        let paris = parse_time("2024-01-01T11:00:00+01:00").unwrap();
        let utc = parse_time("2024-01-01T10:00:00Z").unwrap();

        assert_eq!(paris, utc);
        // Offset is kept for display
        assert_eq!(format_instant(&paris), "2024-01-01T11:00:00+01:00");
    }

    #[test]
    fn test_missing_offset_is_utc() {
        let naive = parse_time("2024-01-01T10:00:00").unwrap();
        assert_eq!(format_instant(&naive), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn test_minutes_only_with_zulu() {
        let instant = parse_time("2024-01-01T10:00Z").unwrap();
        assert_eq!(format_instant(&instant), "2024-01-01T10:00:00+00:00");
        assert_eq!(instant, parse_time("2024-01-01T10:00").unwrap());
    }

    #[test]
    fn test_minutes_only_with_offset() {
        let instant = parse_time("2024-01-01T10:00+01:00").unwrap();
        assert_eq!(format_instant(&instant), "2024-01-01T10:00:00+01:00");
        assert_eq!(instant, parse_time("2024-01-01T09:00:00Z").unwrap());
    }

    #[test]
    fn test_compact_offset() {
        let instant = parse_time("2024-01-01T10:00:00+0100").unwrap();
        assert_eq!(format_instant(&instant), "2024-01-01T10:00:00+01:00");

        let fractional = parse_time("2024-01-01T10:00:00.5-0230").unwrap();
        assert_eq!(format_instant(&fractional), "2024-01-01T10:00:00.500000-02:30");
    }

    #[test]
    fn test_space_separated_minutes_with_offset() {
        let instant = parse_time("2024-01-01 10:00+05:30").unwrap();
        assert_eq!(format_instant(&instant), "2024-01-01T10:00:00+05:30");
    }

    #[test]
    fn test_fractional_seconds() {
        let instant = parse_time("2024-01-01T10:00:00.250Z").unwrap();
        assert_eq!(format_instant(&instant), "2024-01-01T10:00:00.250000+00:00");
    }

    #[test]
    fn test_malformed_timestamps_fail() {
        assert!(parse_time("yesterday").is_err());
        assert!(parse_time("10:00:00Z").is_err());
        assert!(parse_time("2024-01-01T10:00:00+5").is_err());
        assert!(parse_time("2024-0a-01T10:00:00Z").is_err());
        assert!(parse_time("").is_err());
    }

    #[test]
    fn test_minutes_between() {
        let start = parse_time("2024-01-01T10:00:00Z").unwrap();
        let end = parse_time("2024-01-01T10:03:30Z").unwrap();

        assert_eq!(minutes_between(&start, &end), 3.5);
        assert_eq!(minutes_between(&end, &start), -3.5);
    }
}
