//! Human-readable cooldown durations
//!
//! Cooldowns are written as a run of `<integer><unit>` tokens that are summed:
//! `45s`, `10m`, `1h30m`, `2d 12h`. Units are case-insensitive and accept
//! their long forms (`sec`, `minutes`, `hrs`, `days`, `weeks`).

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{CooldownError, Result};

static DURATION_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\d+\s*[A-Za-z]+\s*)+$").unwrap());

static DURATION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*([A-Za-z]+)").unwrap());

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit.to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(MINUTE),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(HOUR),
        "d" | "day" | "days" => Some(DAY),
        "w" | "week" | "weeks" => Some(WEEK),
        _ => None,
    }
}

/// Parse a cooldown string such as `1h30m` into a [`Duration`].
///
/// # Errors
///
/// Returns [`CooldownError::InvalidDurationFormat`] when the text is empty,
/// contains anything other than `<integer><unit>` tokens, uses an unknown
/// unit, or overflows.
pub fn parse(text: &str) -> Result<Duration> {
    if text.trim().is_empty() {
        return Err(CooldownError::invalid_duration(text, "empty duration"));
    }
    if !DURATION_SHAPE.is_match(text) {
        return Err(CooldownError::invalid_duration(
            text,
            "expected a sequence of <integer><unit> tokens",
        ));
    }

    let mut total: u64 = 0;
    for caps in DURATION_TOKEN.captures_iter(text) {
        let amount: u64 = caps[1]
            .parse()
            .map_err(|_| CooldownError::invalid_duration(text, "number too large"))?;
        let unit = &caps[2];
        let scale = unit_seconds(unit)
            .ok_or_else(|| CooldownError::invalid_duration(text, format!("unknown unit '{unit}'")))?;
        total = amount
            .checked_mul(scale)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| CooldownError::invalid_duration(text, "duration overflows"))?;
    }

    Ok(Duration::from_secs(total))
}

/// Render a remaining wait for actors, e.g. `1h 5m 3s`.
///
/// Sub-second remainders round up so a blocked actor never sees `0s`.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    if secs == 0 {
        return "0s".to_string();
    }

    let mut parts = Vec::new();
    for (scale, suffix) in [(DAY, "d"), (HOUR, "h"), (MINUTE, "m"), (1, "s")] {
        let amount = secs / scale;
        if amount > 0 {
            parts.push(format!("{amount}{suffix}"));
            secs %= scale;
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use proptest::prelude::*;

    #[test]
    fn parses_compound_tokens() {
        assert_eq!(parse("1h30m").unwrap(), Duration::from_secs(90 * 60));
        assert_eq!(parse("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse("2d").unwrap(), Duration::from_secs(2 * DAY));
        assert_eq!(parse("1w").unwrap(), Duration::from_secs(WEEK));
    }

    #[test]
    fn accepts_whitespace_long_units_and_case() {
        assert_eq!(parse(" 1 hour 30 MIN ").unwrap(), Duration::from_secs(90 * 60));
        assert_eq!(parse("10Seconds").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn repeated_units_are_summed() {
        assert_eq!(parse("30s30s").unwrap(), Duration::from_secs(60));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["bogus", "", "   ", "45", "1x", "h1", "1h-30m", "1.5h"] {
            let err = parse(input).unwrap_err();
            assert_eq!(err.code(), ErrorCode::DurationInvalid, "input {input:?}");
        }
    }

    #[test]
    fn rejects_overflow() {
        assert!(parse("99999999999999999999w").is_err());
        assert!(parse("18446744073709551615w").is_err());
    }

    #[test]
    fn formats_remaining_time() {
        assert_eq!(format_remaining(Duration::from_secs(20)), "20s");
        assert_eq!(format_remaining(Duration::from_secs(3_903)), "1h 5m 3s");
        assert_eq!(format_remaining(Duration::from_secs(DAY + 60)), "1d 1m");
        assert_eq!(format_remaining(Duration::from_millis(19_200)), "20s");
        assert_eq!(format_remaining(Duration::ZERO), "0s");
    }

    proptest! {
        #[test]
        fn parse_is_idempotent(h in 0u64..100, m in 0u64..100, s in 0u64..100) {
            let text = format!("{h}h{m}m{s}s");
            let first = parse(&text).unwrap();
            prop_assert_eq!(first, parse(&text).unwrap());
            prop_assert_eq!(first.as_secs(), h * HOUR + m * MINUTE + s);
        }

        #[test]
        fn formatted_remaining_parses_back(secs in 1u64..10_000_000) {
            let formatted = format_remaining(Duration::from_secs(secs));
            prop_assert_eq!(parse(&formatted).unwrap(), Duration::from_secs(secs));
        }
    }
}
