//! Colon-delimited duration cells (`SS`, `MM:SS`, `HH:MM:SS`, fractional seconds).

use crate::error::DurationParseError;

/// What a call site wants back when a duration cell is blank or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentPolicy {
    /// Keep the value missing. Used for pace, where a zero would drag means down.
    Propagate,
    /// Treat the value as zero seconds. Used for rest time.
    Zero,
}

/// Parses a duration into seconds.
///
/// Tokens are read right to left as seconds, minutes, hours, each one weighted
/// by the next power of 60. A single token is seconds.
pub fn parse_duration(input: &str) -> Result<f64, DurationParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut total = 0.0;
    let mut weight = 1.0;
    for token in trimmed.rsplit(':') {
        let token = token.trim();
        let value: f64 = token
            .parse()
            .map_err(|_| DurationParseError::InvalidToken {
                input: trimmed.to_string(),
                token: token.to_string(),
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(DurationParseError::InvalidToken {
                input: trimmed.to_string(),
                token: token.to_string(),
            });
        }
        total += value * weight;
        weight *= 60.0;
    }

    Ok(total)
}

/// Parses an optional cell under the given absence policy.
///
/// `Propagate` returns `None` for blank or malformed input, `Zero` returns
/// `Some(0.0)`.
pub fn parse_with_policy(raw: Option<&str>, policy: AbsentPolicy) -> Option<f64> {
    let parsed = raw.map(parse_duration);
    match (parsed, policy) {
        (Some(Ok(seconds)), _) => Some(seconds),
        (_, AbsentPolicy::Propagate) => None,
        (_, AbsentPolicy::Zero) => Some(0.0),
    }
}

/// Pace seconds for one interval, missing when the cell is blank or bad.
pub fn pace_seconds(raw: Option<&str>) -> Option<f64> {
    parse_with_policy(raw, AbsentPolicy::Propagate)
}

/// Rest seconds, `0.0` when the cell is blank or bad.
pub fn rest_seconds(raw: Option<&str>) -> f64 {
    parse_with_policy(raw, AbsentPolicy::Zero).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parses_minutes_and_seconds() {
        assert!(approx(parse_duration("01:23").unwrap(), 83.0));
    }

    #[test]
    fn parses_hours_with_fractional_seconds() {
        assert!(approx(parse_duration("01:02:03.5").unwrap(), 3723.5));
    }

    #[test]
    fn single_token_is_seconds() {
        assert!(approx(parse_duration("83").unwrap(), 83.0));
        assert!(approx(parse_duration("00.00").unwrap(), 0.0));
    }

    #[test]
    fn hms_matches_weighted_sum() {
        for h in [0u32, 1, 2, 11] {
            for m in (0u32..60).step_by(7) {
                for s in (0u32..60).step_by(13) {
                    let input = format!("{h}:{m:02}:{s:02}.25");
                    let expected = f64::from(h) * 3600.0 + f64::from(m) * 60.0 + f64::from(s) + 0.25;
                    assert!(approx(parse_duration(&input).unwrap(), expected), "{input}");
                }
            }
        }
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert!(matches!(
            parse_duration("1;30"),
            Err(DurationParseError::InvalidToken { .. })
        ));
        assert!(matches!(
            parse_duration("ab:10"),
            Err(DurationParseError::InvalidToken { .. })
        ));
        assert!(parse_duration("-1:00").is_err());
    }

    #[test]
    fn absent_policies_stay_distinct() {
        assert_eq!(pace_seconds(None), None);
        assert_eq!(pace_seconds(Some("")), None);
        assert_eq!(rest_seconds(None), 0.0);
        assert_eq!(rest_seconds(Some("")), 0.0);
        assert_ne!(pace_seconds(Some("")), Some(rest_seconds(Some(""))));
    }

    #[test]
    fn malformed_rest_degrades_to_zero() {
        assert_eq!(rest_seconds(Some("n/a")), 0.0);
        assert_eq!(pace_seconds(Some("n/a")), None);
        assert_eq!(rest_seconds(Some("0:45")), 45.0);
    }
}
