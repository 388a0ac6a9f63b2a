//! Match-clock parsing and formatting.
//!
//! Clock strings are `MM:SS` (minutes may run past 59 for stoppage time)
//! or `H:MM:SS`. All values are whole-match seconds.

/// Parse a clock string (`MM:SS` or `H:MM:SS`) into seconds
///
/// Returns `None` for anything that is not purely digits separated by
/// colons, or when the seconds/minutes field of a longer form exceeds 59.
pub fn parse_clock(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }
    if !parts
        .iter()
        .all(|p| !p.is_empty() && p.len() <= 3 && p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let nums: Vec<u64> = parts.iter().filter_map(|p| p.parse().ok()).collect();
    if nums.len() != parts.len() {
        return None;
    }

    match nums.as_slice() {
        [m, s] if *s < 60 => Some((m * 60 + s) as f64),
        [h, m, s] if *m < 60 && *s < 60 => Some((h * 3600 + m * 60 + s) as f64),
        _ => None,
    }
}

/// Format seconds as `MM:SS` (minutes unbounded)
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
