//! Weekday indices and token parsing.
//!
//! Weekdays are indexed 0 (Monday) through 4 (Friday). Tokens are
//! case-insensitive abbreviations or full names; trailing commas and
//! periods are tolerated.

/// Number of tracked weekdays (Monday through Friday).
pub const WEEKDAYS: usize = 5;

/// Short weekday labels, indexed by day.
const ABBREVS: [&str; WEEKDAYS] = ["Mon", "Tue", "Wed", "Thu", "Fri"];

/// Full weekday names, indexed by day.
const FULL_NAMES: [&str; WEEKDAYS] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Short label for a day index.
pub fn day_abbrev(day: u8) -> &'static str {
    ABBREVS.get(day as usize).copied().unwrap_or("?")
}

/// Full name for a day index.
pub fn day_full_name(day: u8) -> &'static str {
    FULL_NAMES.get(day as usize).copied().unwrap_or("?")
}

/// Render a day list as comma-joined short labels.
pub fn day_list(days: &[u8]) -> String {
    days.iter()
        .map(|&d| day_abbrev(d))
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_day_token(token: &str) -> Option<u8> {
    let token = token
        .trim()
        .trim_matches(|c| c == ',' || c == '.')
        .to_lowercase();
    ABBREVS
        .iter()
        .position(|a| a.eq_ignore_ascii_case(&token))
        .or_else(|| FULL_NAMES.iter().position(|n| n.eq_ignore_ascii_case(&token)))
        .map(|i| i as u8)
}

/// Parse weekday tokens into a sorted, deduplicated day list.
///
/// Unrecognized tokens are skipped; `None` when nothing parses.
pub fn parse_days<'a, I>(tokens: I) -> Option<Vec<u8>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut days: Vec<u8> = tokens.into_iter().filter_map(parse_day_token).collect();
    if days.is_empty() {
        return None;
    }
    days.sort_unstable();
    days.dedup();
    Some(days)
}
