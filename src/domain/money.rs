use std::fmt;

/// Prices are integer cents so that add-on totals never pick up float drift.
/// $10.00 = 1000 cents.
pub type Cents = i64;

/// Format cents with exactly two decimals.
/// Example: 1150 -> "11.50", 0 -> "0.00"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Format cents as a dollar amount, as written in the ledger's COST segment.
/// Example: 1150 -> "$11.50"
pub fn format_dollars(cents: Cents) -> String {
    format!("${}", format_cents(cents))
}

/// Parse a price such as "11.50", "$11.50", "7.5" or "3" into cents.
/// More than two decimal places is rejected rather than truncated, since a
/// price with sub-cent precision was not written by this tool.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let input = input.strip_prefix('$').unwrap_or(input);
    if input.is_empty() || input.starts_with('-') {
        return Err(ParseCentsError::InvalidFormat);
    }

    let (units, decimals) = match input.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (input, ""),
    };

    let units: i64 = if units.is_empty() {
        0
    } else {
        parse_digits(units)?
    };

    let decimal_cents = match decimals.len() {
        0 => 0,
        1 => parse_digits(decimals)? * 10,
        2 => parse_digits(decimals)?,
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(ParseCentsError::InvalidFormat)
}

fn parse_digits(s: &str) -> Result<i64, ParseCentsError> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseCentsError::InvalidFormat);
    }
    s.parse().map_err(|_| ParseCentsError::InvalidFormat)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid price format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}
