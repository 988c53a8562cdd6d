use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Backend timestamps come either with an offset or as naive UTC.
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

pub fn format_relative_time(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(parsed) => {
            let duration = Utc::now().signed_duration_since(parsed);

            if duration.num_days() > 365 {
                format!("{}y ago", duration.num_days() / 365)
            } else if duration.num_days() > 30 {
                format!("{}mo ago", duration.num_days() / 30)
            } else if duration.num_days() > 0 {
                format!("{}d ago", duration.num_days())
            } else if duration.num_hours() > 0 {
                format!("{}h ago", duration.num_hours())
            } else if duration.num_minutes() > 0 {
                format!("{}m ago", duration.num_minutes())
            } else {
                "just now".to_string()
            }
        }
        None => "unknown".to_string(),
    }
}

/// Local date and time, or the raw value if it does not parse.
pub fn format_timestamp(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(parsed) => parsed.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => timestamp.to_string(),
    }
}

pub fn format_date(timestamp: &str) -> String {
    match parse_timestamp(timestamp) {
        Some(parsed) => parsed.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        None => timestamp.to_string(),
    }
}

/// Truncates on character boundaries, marking the cut with "...".
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn first_line(desc: &str) -> &str {
    desc.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_variants() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123456+00:00").is_some());
        assert!(parse_timestamp("2024-05-01T10:00:00.123456").is_some());
        assert!(parse_timestamp("2024-05-01 10:00:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_relative_time_unknown() {
        assert_eq!(format_relative_time("garbage"), "unknown");
        assert_eq!(format_timestamp("garbage"), "garbage");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Broken streetlight", 10), "Broken ...");
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("\n  \n  Water leak \nsecond"), "Water leak");
        assert_eq!(first_line(""), "");
    }
}
