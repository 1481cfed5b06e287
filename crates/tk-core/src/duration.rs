//! Duration token parsing.
//!
//! Reports carry durations in two shapes: colon-delimited `H:MM:SS` (seconds
//! optional) or a plain decimal number of hours using `.` or `,` as the
//! fractional separator.

/// Parses a duration token into fractional hours, rejecting malformed input.
///
/// Returns `None` when the token is empty, non-numeric, negative, or not
/// finite. Quote characters and surrounding whitespace are ignored. On the
/// colon form, missing seconds default to 0.
pub fn parse_hours_checked(token: &str) -> Option<f64> {
    let clean = token.replace('"', "");
    let clean = clean.trim();
    if clean.is_empty() {
        return None;
    }

    if !clean.contains(':') {
        let hours: f64 = clean.replace(',', ".").parse().ok()?;
        if !hours.is_finite() || hours < 0.0 {
            return None;
        }
        return Some(hours);
    }

    let mut parts = clean.split(':');
    let h: u32 = parts.next()?.trim().parse().ok()?;
    let m: u32 = parts.next()?.trim().parse().ok()?;
    let s: u32 = match parts.next() {
        Some(part) => part.trim().parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    Some(f64::from(h) + f64::from(m) / 60.0 + f64::from(s) / 3600.0)
}

/// Parses a duration token into fractional hours.
///
/// Total function: malformed input yields `0.0` instead of an error, so a
/// bad duration in one row cannot abort a whole report.
pub fn parse_hours(token: &str) -> f64 {
    parse_hours_checked(token).unwrap_or(0.0)
}
