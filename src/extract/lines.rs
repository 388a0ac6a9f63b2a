//! Line-level recognition of timestamped commentary.
//!
//! A qualifying line starts with a timestamp token followed by a
//! separator: `12s: ...`, `12.5s: ...` or `11:58 - ...`. Markdown bullets
//! in front of the token are tolerated.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::parse_clock;

static SECONDS_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)\s*s\s*:\s*(.*)$").expect("seconds line pattern")
});

static CLOCK_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,3}:\d{2}(?::\d{2})?)\s*[-–—]\s*(.*)$").expect("clock line pattern")
});

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[=\-_*~#\s]+$").expect("separator pattern"));

/// What a single raw line turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// Timestamped observation; `offset_seconds` is interpreted by the
    /// caller's timestamp convention
    Observation { offset_seconds: f64, text: &'a str },

    /// Blank line, separator or section header
    Discarded,

    /// Looked like content but carried no usable timestamp
    Malformed,
}

/// Classify one raw line
pub fn classify_line(raw: &str) -> LineKind<'_> {
    let line = raw.trim();

    if line.is_empty() || SEPARATOR.is_match(line) || is_header(line) {
        return LineKind::Discarded;
    }

    let line = strip_bullet(line);

    if let Some(caps) = SECONDS_LINE.captures(line) {
        let offset = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
        let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        return observation(offset, text);
    }

    if let Some(caps) = CLOCK_LINE.captures(line) {
        let offset = caps.get(1).and_then(|m| parse_clock(m.as_str()));
        let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        return observation(offset, text);
    }

    LineKind::Malformed
}

fn observation(offset: Option<f64>, text: &str) -> LineKind<'_> {
    match offset {
        Some(offset_seconds) if !text.is_empty() => LineKind::Observation {
            offset_seconds,
            text,
        },
        _ => LineKind::Malformed,
    }
}

fn is_header(line: &str) -> bool {
    if line.starts_with('#') || line.starts_with("===") {
        return true;
    }
    if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
        return true;
    }
    // "First half events:" but not "12s:" with an empty body
    line.ends_with(':') && !line.starts_with(|c: char| c.is_ascii_digit())
}

fn strip_bullet(line: &str) -> &str {
    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim_start();
        }
    }
    line
}
