//! Display formatting for net worth, percentages and durations.

/// Formats whole currency units with thousands separators: `$1,234,567`, `-$42`.
pub fn format_currency(value: i32) -> String {
    let digits = value.unsigned_abs().to_string();
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Rounds to the nearest tenth and drops a trailing `.0`.
pub fn format_tenths(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

/// Magnitude of a percentage change; direction is conveyed separately.
pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_tenths(value.abs()))
}

pub fn format_possessive(name: &str) -> String {
    if name.ends_with(['s', 'S']) {
        format!("{}'", name)
    } else {
        format!("{}'s", name)
    }
}

/// `1 month`, `3 months`, `1 year`, `2.5 years`.
pub(crate) fn pluralize(count: &str, unit: &str) -> String {
    if count == "1" {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
