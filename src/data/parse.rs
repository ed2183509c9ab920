use log::debug;

// ---------------------------------------------------------------------------
// Duration text → minutes
// ---------------------------------------------------------------------------

/// The runtime layouts found in the exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationShape {
    /// `"<H>h <M>m"` (the space is optional).
    HoursMinutes { hours: u64, minutes: u64 },
    /// `"<H>h"`
    Hours(u64),
    /// `"<M>m"`
    Minutes(u64),
}

impl DurationShape {
    /// Recognise one of the three accepted layouts. Whitespace around the
    /// numbers is ignored; anything else yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if let Some((hours, rest)) = text.split_once('h') {
            let hours = parse_count(hours)?;
            let rest = rest.trim();
            if rest.is_empty() {
                return Some(DurationShape::Hours(hours));
            }
            let minutes = parse_count(rest.strip_suffix('m')?)?;
            return Some(DurationShape::HoursMinutes { hours, minutes });
        }
        let minutes = parse_count(text.strip_suffix('m')?)?;
        Some(DurationShape::Minutes(minutes))
    }

    /// Total runtime in minutes.
    pub fn minutes(self) -> u64 {
        match self {
            DurationShape::HoursMinutes { hours, minutes } => {
                hours.saturating_mul(60).saturating_add(minutes)
            }
            DurationShape::Hours(hours) => hours.saturating_mul(60),
            DurationShape::Minutes(minutes) => minutes,
        }
    }
}

fn parse_count(s: &str) -> Option<u64> {
    s.trim().parse::<u64>().ok()
}

/// Convert a runtime such as `"2h 15m"` into minutes.
///
/// A missing value is `0`, and so is text outside the accepted
/// [`DurationShape`]s.
pub fn parse_duration(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        return 0;
    };
    match DurationShape::parse(raw) {
        Some(shape) => shape.minutes(),
        None => {
            debug!("unrecognised duration {raw:?}, using 0 minutes");
            0
        }
    }
}

// ---------------------------------------------------------------------------
// Vote text → count
// ---------------------------------------------------------------------------

/// Convert a vote count such as `"12,345"`, `"(1.2K)"` or `"3M"` into an
/// integer. Any malformed input yields `0`.
pub fn parse_votes(raw: &str) -> u64 {
    match try_parse_votes(raw) {
        Some(votes) => votes,
        None => {
            debug!("unparseable vote count {raw:?}, using 0");
            0
        }
    }
}

fn try_parse_votes(raw: &str) -> Option<u64> {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ','))
        .collect();
    let cleaned = stripped.trim().to_uppercase();

    if cleaned.contains('K') {
        scaled(&cleaned.replace('K', ""), 1_000.0)
    } else if cleaned.contains('M') {
        scaled(&cleaned.replace('M', ""), 1_000_000.0)
    } else {
        cleaned.parse::<u64>().ok()
    }
}

/// Decimal prefix times `factor`, truncated toward zero. Products that do
/// not fit in a `u64` are rejected rather than clamped.
fn scaled(number: &str, factor: f64) -> Option<u64> {
    let value = number.trim().parse::<f64>().ok()? * factor;
    if !value.is_finite() || value < 0.0 || value >= u64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_hours_and_minutes() {
        for hours in 0..5 {
            for minutes in [0, 1, 15, 30, 58] {
                let text = format!("{hours}h {minutes}m");
                assert_eq!(parse_duration(Some(text.as_str())), hours * 60 + minutes, "{text}");
            }
        }
    }

    #[test]
    fn duration_single_unit() {
        assert_eq!(parse_duration(Some("45m")), 45);
        assert_eq!(parse_duration(Some("2h")), 120);
        assert_eq!(parse_duration(Some(" 1h30m ")), 90);
        assert_eq!(parse_duration(Some("1 h 5 m")), 65);
    }

    #[test]
    fn duration_missing_or_malformed_is_zero() {
        assert_eq!(parse_duration(None), 0);
        assert_eq!(parse_duration(Some("")), 0);
        assert_eq!(parse_duration(Some("95")), 0);
        assert_eq!(parse_duration(Some("1h 20min")), 0);
        assert_eq!(parse_duration(Some("abc")), 0);
    }

    #[test]
    fn duration_shape_is_reported() {
        assert_eq!(
            DurationShape::parse("2h 15m"),
            Some(DurationShape::HoursMinutes {
                hours: 2,
                minutes: 15
            })
        );
        assert_eq!(DurationShape::parse("3h"), Some(DurationShape::Hours(3)));
        assert_eq!(DurationShape::parse("95m"), Some(DurationShape::Minutes(95)));
        assert_eq!(DurationShape::parse("m"), None);
    }

    #[test]
    fn votes_plain_and_suffixed() {
        assert_eq!(parse_votes("12345"), 12345);
        assert_eq!(parse_votes("12,345"), 12345);
        assert_eq!(parse_votes("(1.2K)"), 1200);
        assert_eq!(parse_votes("1.5k"), 1500);
        assert_eq!(parse_votes("3M"), 3_000_000);
        assert_eq!(parse_votes(" (2.25M) "), 2_250_000);
    }

    #[test]
    fn votes_garbage_is_zero() {
        assert_eq!(parse_votes("garbage"), 0);
        assert_eq!(parse_votes(""), 0);
        assert_eq!(parse_votes("()"), 0);
        assert_eq!(parse_votes("-5K"), 0);
        assert_eq!(parse_votes("infK"), 0);
    }

    #[test]
    fn votes_out_of_range_is_zero() {
        assert_eq!(parse_votes("1e20K"), 0);
        assert_eq!(parse_votes("2e13M"), 0);
        assert_eq!(parse_votes("99999999999999999999"), 0);
        assert_eq!(parse_votes("1e6K"), 1_000_000_000);
    }
}
