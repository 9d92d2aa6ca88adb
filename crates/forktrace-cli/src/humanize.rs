use chrono::Utc;

/// Renders a unix timestamp (seconds) as a relative string for
/// `/check-mail`'s inbox listing.
pub fn relative_timestamp(unix_seconds: i64) -> String {
    let now = Utc::now().timestamp();
    let delta = (now - unix_seconds).max(0);
    match delta {
        0..=9 => "just now".to_string(),
        10..=59 => format!("{delta}s ago"),
        60..=3599 => format!("{}m ago", delta / 60),
        3600..=86_399 => format!("{}h ago", delta / 3600),
        _ => format!("{}d ago", delta / 86_400),
    }
}
