// Calendar month vocabulary.
//
// Records carry their month as a lower-case name. Ordering is always done
// through the calendar ordinal, never by comparing the names as strings.
use chrono::Month;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canonical month names in calendar order, as they appear in the source data.
pub const MONTH_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const CALENDAR: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

// Canonical names plus the English names and the accent-free "marco".
static LOOKUP: Lazy<HashMap<String, Month>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (name, month) in MONTH_NAMES.iter().zip(CALENDAR) {
        map.insert(name.to_string(), month);
        map.insert(month.name().to_lowercase(), month);
    }
    map.insert("marco".to_string(), Month::March);
    map
});

/// Resolve a month name case-insensitively. Unknown names yield `None`.
pub fn parse_month(name: &str) -> Option<Month> {
    LOOKUP.get(name.trim().to_lowercase().as_str()).copied()
}

/// Zero-based calendar position (January = 0).
pub fn month_index(month: Month) -> usize {
    month.number_from_month() as usize - 1
}

pub fn canonical_name(month: Month) -> &'static str {
    MONTH_NAMES[month_index(month)]
}

/// Month at a zero-based calendar position.
pub fn month_at(index: usize) -> Option<Month> {
    CALENDAR.get(index).copied()
}

/// The twelve months in calendar order.
pub fn calendar() -> impl Iterator<Item = Month> {
    CALENDAR.into_iter()
}

/// Three-letter chart label, e.g. `Mar` for `março`.
pub fn short_label(month: Month) -> String {
    capitalize(&canonical_name(month).chars().take(3).collect::<String>())
}

/// Period label used by the trend rankings, e.g. `Março/2024`.
pub fn period_label(year: i32, month: Month) -> String {
    format!("{}/{}", capitalize(canonical_name(month)), year)
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
