use chrono::{DateTime, NaiveDate};

use crate::models::Compensation;

/// "2024-05-01" or an RFC 3339 timestamp as "May 1, 2024". Anything else is
/// shown as given.
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%b %-d, %Y").to_string();
    }
    let day = raw.get(..10).unwrap_or(raw);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn format_optional_date(raw: Option<&str>) -> String {
    match raw {
        Some(raw) if !raw.trim().is_empty() => format_date(raw),
        _ => "-".to_string(),
    }
}

pub fn compensation(comp: &Compensation) -> String {
    let kind = if comp.kind.is_empty() { "unpaid" } else { comp.kind.as_str() };
    match comp.amount {
        Some(amount) if amount > 0.0 => {
            let currency = comp.currency.as_deref().unwrap_or("INR");
            format!("{} {:.0} ({})", currency, amount, kind)
        }
        _ => kind.to_string(),
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn wrap(text: &str, width: usize) -> String {
    textwrap::fill(text, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-01"), "May 1, 2024");
        assert_eq!(format_date("2024-12-25T10:30:00.000Z"), "Dec 25, 2024");
        assert_eq!(format_date("next week"), "next week");
        assert_eq!(format_optional_date(None), "-");
    }

    #[test]
    fn test_compensation() {
        let mut comp = Compensation {
            kind: "paid".to_string(),
            amount: Some(15000.0),
            ..Compensation::default()
        };
        assert_eq!(compensation(&comp), "INR 15000 (paid)");
        comp.amount = None;
        assert_eq!(compensation(&comp), "paid");
        assert_eq!(compensation(&Compensation::default()), "unpaid");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Senior Rust Engineer", 10), "Senior ...");
        assert_eq!(truncate("नमस्ते दुनिया", 6), "नमस...");
    }
}
