use chrono::{DateTime, Duration, DurationRound, Utc};

/// Rounds an instant up to the next full hour.
///
/// An instant that is already exactly on the hour is its own anchor; anything
/// past the hour (even by a nanosecond) rounds up. This is the anchor for the
/// slot grid.
pub fn next_full_hour(now: DateTime<Utc>) -> DateTime<Utc> {
    let floored = now.duration_trunc(Duration::hours(1)).unwrap_or(now);
    if floored == now {
        now
    } else {
        floored + Duration::hours(1)
    }
}

/// The end of the one-hour window starting at `start`.
pub fn slot_end(start: DateTime<Utc>) -> DateTime<Utc> {
    start + Duration::hours(1)
}

/// Consecutive hourly starts covering `horizon_hours` hours from `anchor`.
pub fn grid_starts(
    anchor: DateTime<Utc>,
    horizon_hours: u32,
) -> impl Iterator<Item = DateTime<Utc>> {
    (0..horizon_hours as i64).map(move |i| anchor + Duration::hours(i))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_full_hour_rounds_up_mid_hour() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(next_full_hour(now), expected);
    }

    #[test]
    fn test_next_full_hour_keeps_exact_hour() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        assert_eq!(next_full_hour(now), now);
    }

    #[test]
    fn test_next_full_hour_one_second_past() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 1).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap();
        assert_eq!(next_full_hour(now), expected);
    }

    #[test]
    fn test_grid_starts_are_consecutive_hours() {
        let anchor = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let starts: Vec<_> = grid_starts(anchor, 3).collect();
        assert_eq!(starts.len(), 3);
        assert_eq!(starts[0], anchor);
        assert_eq!(starts[1], anchor + Duration::hours(1));
        assert_eq!(starts[2], anchor + Duration::hours(2));
        assert_eq!(slot_end(starts[2]), anchor + Duration::hours(3));
    }
}
