use chrono::{DateTime, Utc};

/// "just now", "5m ago", "3h ago" or "2d ago". Future timestamps count as now.
pub fn format_relative_time(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created_at) = created_at else {
        return "unknown".to_string();
    };
    let seconds = now.signed_duration_since(created_at).num_seconds();
    match seconds {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn buckets_by_magnitude() {
        let at = |secs: i64| Some(now() - Duration::seconds(secs));
        assert_eq!(format_relative_time(at(5), now()), "just now");
        assert_eq!(format_relative_time(at(59), now()), "just now");
        assert_eq!(format_relative_time(at(60), now()), "1m ago");
        assert_eq!(format_relative_time(at(3_599), now()), "59m ago");
        assert_eq!(format_relative_time(at(7_200), now()), "2h ago");
        assert_eq!(format_relative_time(at(3 * 86_400 + 10), now()), "3d ago");
    }

    #[test]
    fn missing_or_future_timestamps() {
        assert_eq!(format_relative_time(None, now()), "unknown");
        assert_eq!(
            format_relative_time(Some(now() + Duration::seconds(90)), now()),
            "just now"
        );
    }
}
