use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration number in {0:?}")]
    BadNumber(String),
    #[error("unknown duration suffix {0:?}")]
    BadSuffix(String),
}

/// Parse a human duration like `30m`, `12h`, `3d`, `2w`, `1mo`, `1y`.
///
/// A month is 30 days, a year 365.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(DurationError::Empty);
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| DurationError::BadSuffix(s.to_string()))?;
    let (digits, suffix) = s.split_at(split);
    let n: i64 = digits
        .parse()
        .map_err(|_| DurationError::BadNumber(s.to_string()))?;

    let suffix = suffix.trim().to_lowercase();
    match suffix.as_str() {
        "m" | "min" | "mins" => Ok(Duration::minutes(n)),
        "h" | "hr" | "hrs" | "hour" | "hours" => Ok(Duration::hours(n)),
        "d" | "day" | "days" => Ok(Duration::days(n)),
        "w" | "wk" | "wks" | "week" | "weeks" => Ok(Duration::weeks(n)),
        "mo" | "month" | "months" => Ok(Duration::days(n * 30)),
        "y" | "yr" | "yrs" | "year" | "years" => Ok(Duration::days(n * 365)),
        _ => Err(DurationError::BadSuffix(suffix)),
    }
}
