//! Pure display-formatting helpers
//!
//! Consumed by presentation components alongside the normalized offers:
//! duration compaction, French-locale price and date rendering, and the
//! booking deep link.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;

/// Non-breaking space used by French number and date formatting.
const NBSP: char = '\u{a0}';

static DURATION_RE: OnceLock<Regex> = OnceLock::new();

fn duration_re() -> &'static Regex {
    DURATION_RE.get_or_init(|| {
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?$").expect("duration regex is valid")
    })
}

/// Compact an ISO-8601-like duration token (`PT2H30M`, `PT45M`, `PT5H`) into
/// a human string (`"2h 30m"`, `"45m"`, `"5h"`).
///
/// Anything that does not match the `PT<n>H<n>M` shape is returned verbatim.
pub fn parse_duration(raw: &str) -> String {
    let Some(captures) = duration_re().captures(raw) else {
        return raw.to_string();
    };

    let hours = captures.get(1).map(|m| m.as_str());
    let minutes = captures.get(2).map(|m| m.as_str());

    match (hours, minutes) {
        (Some(h), Some(m)) => format!("{}h {}m", h, m),
        (Some(h), None) => format!("{}h", h),
        (None, Some(m)) => format!("{}m", m),
        // A bare "PT" carries no information
        (None, None) => raw.to_string(),
    }
}

fn currency_symbol(currency: &str) -> &str {
    match currency {
        "EUR" => "€",
        "USD" => "$US",
        "GBP" => "£GB",
        other => other,
    }
}

/// Render a price using French conventions: decimal comma, two decimals,
/// non-breaking-space thousands groups, symbol after the amount.
///
/// `format_price(100.0, "EUR")` renders as `"100,00 €"` (with a
/// non-breaking space before the symbol).
pub fn format_price(amount: f64, currency: &str) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    // Group the integer part in threes from the right
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(NBSP);
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!(
        "{}{},{:02}{}{}",
        sign,
        grouped,
        fraction,
        NBSP,
        currency_symbol(currency)
    )
}

const WEEKDAYS_FR: [&str; 7] = ["lun.", "mar.", "mer.", "jeu.", "ven.", "sam.", "dim."];
const MONTHS_FR: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

/// Render a provider timestamp (`2025-09-05T08:30:00`, RFC 3339 offsets also
/// accepted) as a short French date-time, e.g. `"ven. 5 sept. 08:30"`.
///
/// Unparsable input is returned verbatim so a raw timestamp still displays.
pub fn format_flight_date(iso: &str) -> String {
    let parsed = NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| chrono::DateTime::parse_from_rfc3339(iso).map(|dt| dt.naive_local()));

    let Ok(dt) = parsed else {
        return iso.to_string();
    };

    let weekday = WEEKDAYS_FR[dt.weekday().num_days_from_monday() as usize];
    let month = MONTHS_FR[dt.month0() as usize];
    format!(
        "{} {} {} {:02}:{:02}",
        weekday,
        dt.day(),
        month,
        dt.hour(),
        dt.minute()
    )
}

/// Departure date in the deep-link's compact `YYMMDD` form.
pub fn skyscanner_date(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// Deep link to a third-party flight search for the given route and date.
pub fn booking_url(origin: &str, destination: &str, date: NaiveDate) -> String {
    format!(
        "https://www.skyscanner.com/transport/flights/{}/{}/{}/",
        origin,
        destination,
        skyscanner_date(date)
    )
}
