use crate::error::AppError;

/// Formats a millisecond offset as `HH:MM:SS.mmm`.
pub fn format_timestamp(ms: i64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = ms % 1000;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Parses `HH:MM:SS.mmm` back into milliseconds. The millisecond part is
/// optional (`HH:MM:SS` is accepted).
pub fn parse_timestamp(timestamp: &str) -> Result<i64, AppError> {
    let err = || AppError::Parse(format!("invalid timestamp: {timestamp} (expected HH:MM:SS.mmm)"));

    let mut parts = timestamp.split(':');
    let hours: i64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let minutes: i64 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(err)?;
    let seconds_part = parts.next().ok_or_else(err)?;
    if parts.next().is_some() {
        return Err(err());
    }

    let (seconds, millis) = match seconds_part.split_once('.') {
        Some((s, ms)) => {
            if ms.len() != 3 {
                return Err(err());
            }
            (
                s.parse::<i64>().map_err(|_| err())?,
                ms.parse::<i64>().map_err(|_| err())?,
            )
        }
        None => (seconds_part.parse::<i64>().map_err(|_| err())?, 0),
    };

    if minutes >= 60 || seconds >= 60 {
        return Err(err());
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "00:00:00.000");
        assert_eq!(format_timestamp(1000), "00:00:01.000");
        assert_eq!(format_timestamp(61_500), "00:01:01.500");
        assert_eq!(format_timestamp(3_600_000 + 23 * 60_000 + 45_067), "01:23:45.067");
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("00:00:00.000").unwrap(), 0);
        assert_eq!(parse_timestamp("00:01:01.500").unwrap(), 61_500);
        assert_eq!(parse_timestamp("01:23:45.067").unwrap(), 5_025_067);
        assert_eq!(parse_timestamp("00:00:05").unwrap(), 5000);
    }

    #[test]
    fn test_round_trip() {
        for ms in [0, 999, 1000, 59_999, 60_000, 3_599_999, 3_600_000, 86_399_999] {
            assert_eq!(parse_timestamp(&format_timestamp(ms)).unwrap(), ms);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "1:2", "aa:bb:cc", "00:61:00.000", "00:00:61.000", "00:00:00.12", "00:00:00:00"] {
            assert!(parse_timestamp(bad).is_err(), "should reject {bad:?}");
        }
    }
}
