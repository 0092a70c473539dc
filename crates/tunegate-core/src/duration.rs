//! ISO-8601 duration helpers.
//!
//! Providers report durations as milliseconds, seconds or ISO-8601 strings.
//! Everything is converted to a canonical `PT#H#M#S` string here so that a
//! `CanonicalResult` always carries a well-formed duration.

/// Duration reported when the source has no usable value.
pub const ZERO_DURATION: &str = "PT0S";

/// Format a number of seconds as an ISO-8601 duration (`PT1H2M3S`).
pub fn format_iso8601(total_secs: u64) -> String {
    if total_secs == 0 {
        return ZERO_DURATION.to_string();
    }

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}S", seconds));
    }
    out
}

/// Parse an ISO-8601 duration (`P1DT2H3M4S`, `PT4M13S`, `P0D`) into seconds.
///
/// Year and month designators are rejected since they have no fixed length.
/// Fractional seconds are truncated.
pub fn parse_iso8601(raw: &str) -> Option<u64> {
    let rest = raw.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut number = String::new();
    let mut in_time = false;
    let mut saw_component = false;

    for c in rest.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            'W' | 'D' | 'H' | 'M' | 'S' => {
                if number.is_empty() {
                    return None;
                }
                let multiplier = match (c, in_time) {
                    ('W', false) => 7 * 86_400,
                    ('D', false) => 86_400,
                    ('H', true) => 3600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return None,
                };
                let whole = if c == 'S' {
                    number.split('.').next().unwrap_or("")
                } else if number.contains('.') {
                    return None;
                } else {
                    number.as_str()
                };
                let value: u64 = whole.parse().ok()?;
                total = total.checked_add(value.checked_mul(multiplier)?)?;
                number.clear();
                saw_component = true;
            }
            _ => return None,
        }
    }

    if !number.is_empty() || !saw_component {
        return None;
    }
    Some(total)
}

/// Re-format an optional provider duration, defaulting to `PT0S`.
pub fn normalize_iso8601(raw: Option<&str>) -> String {
    raw.and_then(parse_iso8601)
        .map(format_iso8601)
        .unwrap_or_else(|| ZERO_DURATION.to_string())
}

/// Convert a millisecond count into an ISO-8601 duration.
pub fn from_millis(millis: Option<u64>) -> String {
    format_iso8601(millis.unwrap_or(0) / 1000)
}
