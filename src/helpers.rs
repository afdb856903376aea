use chrono::{DateTime, Utc};

pub const NOT_AVAILABLE: &str = "N/A";

/// Parses an RFC 3339 API timestamp.
pub fn parse_timestamp(ts: Option<&str>) -> Option<DateTime<Utc>> {
    let ts = ts.filter(|s| !s.is_empty())?;
    DateTime::parse_from_rfc3339(ts).ok().map(|dt| dt.to_utc())
}

/// Coarse elapsed time: whole days, else whole hours, else whole minutes.
pub fn human_elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let d = now - since;
    let total_secs = d.num_seconds().max(0);

    let days = total_secs / 86400;
    let hours = (total_secs % 86400) / 3600;
    let minutes = (total_secs % 3600) / 60;

    if days > 0 {
        format!("{}d", days)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", minutes)
    }
}

/// Age of an object from its creation timestamp, `N/A` when absent.
pub fn format_age(created: Option<&str>, now: DateTime<Utc>) -> String {
    match parse_timestamp(created) {
        Some(t) => human_elapsed(t, now),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_timestamp(ts: Option<&str>) -> String {
    match parse_timestamp(ts) {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// CPU quantity in cores. `250m` is a quarter core.
pub fn parse_cpu(cpu: &str) -> f64 {
    let cpu = cpu.trim();
    let parsed = match cpu.strip_suffix('m') {
        Some(milli) => milli.parse::<f64>().map(|v| v / 1000.0),
        None => cpu.parse::<f64>(),
    };
    parsed.ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Memory quantity in binary gigabytes.
pub fn parse_memory_gb(memory: &str) -> f64 {
    const SUFFIXES: [(&str, f64); 4] = [
        ("Ki", 1024.0 * 1024.0),
        ("Mi", 1024.0),
        ("Gi", 1.0),
        ("Ti", 1.0 / 1024.0),
    ];

    let memory = memory.trim();
    let parsed = SUFFIXES
        .iter()
        .find_map(|(suffix, div)| {
            memory
                .strip_suffix(suffix)
                .map(|v| v.parse::<f64>().map(|n| n / div))
        })
        .unwrap_or_else(|| memory.parse::<f64>().map(|bytes| bytes / (1u64 << 30) as f64));

    parsed.ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Raw quantity for display; `"0"` means the value was never declared.
pub fn display_quantity(raw: &str) -> String {
    if raw.is_empty() || raw == "0" {
        NOT_AVAILABLE.to_string()
    } else {
        raw.to_string()
    }
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        round1(part / whole * 100.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ago(d: Duration) -> String {
        (now() - d).to_rfc3339()
    }

    #[test]
    fn test_age_buckets() {
        assert_eq!(format_age(Some(&ago(Duration::hours(25))), now()), "1d");
        assert_eq!(format_age(Some(&ago(Duration::minutes(45))), now()), "45m");
        assert_eq!(format_age(Some(&ago(Duration::minutes(150))), now()), "2h");
        assert_eq!(format_age(Some(&ago(Duration::seconds(20))), now()), "0m");
        assert_eq!(format_age(Some(&ago(Duration::days(400))), now()), "400d");
    }

    #[test]
    fn test_age_missing_or_invalid() {
        assert_eq!(format_age(None, now()), "N/A");
        assert_eq!(format_age(Some(""), now()), "N/A");
        assert_eq!(format_age(Some("yesterday"), now()), "N/A");
    }

    #[test]
    fn test_age_in_future_clamps() {
        assert_eq!(format_age(Some(&ago(Duration::hours(-3))), now()), "0m");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(Some("2024-01-01T08:30:00Z")),
            "2024-01-01 08:30:00"
        );
        assert_eq!(format_timestamp(None), "N/A");
    }

    #[test]
    fn test_parse_cpu() {
        assert_eq!(parse_cpu("0"), 0.0);
        assert_eq!(parse_cpu("250m"), 0.25);
        assert_eq!(parse_cpu("2"), 2.0);
        assert_eq!(parse_cpu("1.5"), 1.5);
        assert_eq!(parse_cpu(""), 0.0);
        assert_eq!(parse_cpu("lots"), 0.0);
        assert_eq!(parse_cpu("m"), 0.0);
    }

    #[test]
    fn test_parse_memory_gb() {
        assert_eq!(parse_memory_gb("1024Ki"), 0.0009765625);
        assert_eq!(parse_memory_gb("512Mi"), 0.5);
        assert_eq!(parse_memory_gb("2Gi"), 2.0);
        assert_eq!(parse_memory_gb("1Ti"), 1024.0);
        assert_eq!(parse_memory_gb("1073741824"), 1.0);
        assert_eq!(parse_memory_gb(""), 0.0);
        assert_eq!(parse_memory_gb("12XB"), 0.0);
    }

    #[test]
    fn test_display_quantity() {
        assert_eq!(display_quantity("0"), "N/A");
        assert_eq!(display_quantity(""), "N/A");
        assert_eq!(display_quantity("100m"), "100m");
    }

    #[test]
    fn test_percent_is_zero_safe() {
        assert_eq!(percent(1.0, 0.0), 0.0);
        assert_eq!(percent(1.0, 2.0), 50.0);
        assert_eq!(percent(1.0, 3.0), 33.3);
    }
}
