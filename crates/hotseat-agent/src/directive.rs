//! Directive grammar embedded in model replies.
//!
//! A reply may end with one machine-parseable line:
//!
//! ```text
//! ACTION:SET:<day,day,...>:<this|next>
//! ACTION:CLEAR:<this|next>
//! ```
//!
//! Day indices are 0 (Monday) through 4 (Friday); the week segment
//! defaults to `this` when omitted. Anything not matching the grammar
//! is rejected, and a reply containing more than one directive line
//! offers no action at all. Raw directive text never reaches the user:
//! [`strip_directive`] removes it before display.

use std::sync::OnceLock;

use regex::Regex;

/// Which week a directive targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekTarget {
    This,
    Next,
}

/// A proposed schedule mutation, pending user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Replace the member's day set for the target week.
    Set { days: Vec<u8>, week: WeekTarget },
    /// Remove the member's entry for the target week.
    Clear { week: WeekTarget },
}

fn directive_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*ACTION:[^\n]*$").expect("directive pattern compiles"))
}

/// Extract the single directive from a model reply.
///
/// Returns `None` when no line matches, when the line is malformed, or
/// when more than one directive line is present.
pub fn parse_directive(text: &str) -> Option<Directive> {
    let lines: Vec<&str> = directive_line_re()
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .collect();
    if lines.len() != 1 {
        return None;
    }
    parse_directive_line(lines[0])
}

/// Remove every directive line from a reply before display.
pub fn strip_directive(text: &str) -> String {
    directive_line_re().replace_all(text, "").trim().to_string()
}

fn parse_directive_line(line: &str) -> Option<Directive> {
    let rest = line.strip_prefix("ACTION:")?;
    let fields: Vec<&str> = rest.split(':').map(str::trim).collect();
    match fields.as_slice() {
        ["SET", days, target] => Some(Directive::Set {
            days: parse_day_indices(days)?,
            week: parse_target(target)?,
        }),
        ["SET", days] => Some(Directive::Set {
            days: parse_day_indices(days)?,
            week: WeekTarget::This,
        }),
        ["CLEAR", target] => Some(Directive::Clear {
            week: parse_target(target)?,
        }),
        ["CLEAR", "", target] => Some(Directive::Clear {
            week: parse_target(target)?,
        }),
        ["CLEAR"] => Some(Directive::Clear {
            week: WeekTarget::This,
        }),
        _ => None,
    }
}

fn parse_target(s: &str) -> Option<WeekTarget> {
    match s {
        "this" => Some(WeekTarget::This),
        "next" => Some(WeekTarget::Next),
        _ => None,
    }
}

/// Comma-separated day indices in 0..=4, deduplicated and sorted.
/// An empty list or any out-of-range index rejects the directive.
fn parse_day_indices(s: &str) -> Option<Vec<u8>> {
    let mut days = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.parse::<u8>() {
            Ok(d) if d <= 4 => days.push(d),
            _ => return None,
        }
    }
    if days.is_empty() {
        return None;
    }
    days.sort_unstable();
    days.dedup();
    Some(days)
}
