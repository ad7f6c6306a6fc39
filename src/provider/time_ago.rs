use chrono::{DateTime, Duration, Months, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

// checked in this order, first match wins
const UNITS: [(&str, Unit); 7] = [
    ("second", Unit::Second),
    ("minute", Unit::Minute),
    ("hour", Unit::Hour),
    ("day", Unit::Day),
    ("week", Unit::Week),
    ("month", Unit::Month),
    ("year", Unit::Year),
];

/// Resolves phrases like `"3 days ago"` against `now`.
///
/// An unparsable amount counts as zero and an unknown unit yields `now`.
/// Months and years are subtracted on the calendar, so `"1 month ago"` at
/// March 31st is the last day of February. Results outside the representable
/// range saturate to the earliest instant.
pub fn parse_time_ago(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let amount: u32 = text
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    let lowercase = text.to_lowercase();
    let Some(unit) = UNITS.iter().find(|(keyword, _)| lowercase.contains(keyword)).map(|(_, u)| *u) else {
        return now;
    };

    let amount64 = i64::from(amount);

    let then = match unit {
        Unit::Second => now.checked_sub_signed(Duration::seconds(amount64)),
        Unit::Minute => now.checked_sub_signed(Duration::minutes(amount64)),
        Unit::Hour => now.checked_sub_signed(Duration::hours(amount64)),
        Unit::Day => now.checked_sub_signed(Duration::days(amount64)),
        Unit::Week => now.checked_sub_signed(Duration::weeks(amount64)),
        Unit::Month => now.checked_sub_months(Months::new(amount)),
        Unit::Year => amount.checked_mul(12).and_then(|m| now.checked_sub_months(Months::new(m))),
    };

    then.unwrap_or(DateTime::<Utc>::MIN_UTC)
}
