//! Day-granularity date helpers.
//!
//! All plan dates are [`jiff::civil::Date`] values. Arithmetic here never
//! panics: anything that would leave jiff's supported range yields `None`,
//! which callers treat as "no date".

use jiff::{civil::Date, Span};

/// Longest duration, in days, accepted for a single task.
pub const MAX_DURATION_DAYS: u32 = 36_500;

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Option<Date> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    text.parse::<Date>().ok()
}

/// Shift a date by a (possibly negative) number of days.
pub fn add_days(date: Date, days: i64) -> Option<Date> {
    let span = Span::new().try_days(days).ok()?;
    date.checked_add(span).ok()
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: Date, to: Date) -> Option<i64> {
    from.until(to).ok().map(|span| i64::from(span.get_days()))
}

/// Parse a duration token.
///
/// In strict mode only `<N>d` is accepted. The loose form also takes a bare
/// number, `N d`, `N day` and `N days`.
pub fn parse_duration(token: &str, strict: bool) -> Option<u32> {
    let token = token.trim();
    let digits_end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    if digits_end == 0 {
        return None;
    }
    let (number, unit) = token.split_at(digits_end);
    let unit_ok = if strict {
        unit == "d"
    } else {
        matches!(
            unit.trim().to_ascii_lowercase().as_str(),
            "" | "d" | "day" | "days"
        )
    };
    if !unit_ok {
        return None;
    }
    number
        .parse::<u32>()
        .ok()
        .filter(|days| *days <= MAX_DURATION_DAYS)
}
