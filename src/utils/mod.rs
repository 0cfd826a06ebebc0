use chrono::NaiveDate;

/// Codes are matched case-insensitively: trim and upper-case before lookup.
/// A presentation convenience, not a security property.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Helper function to format the date as "dd-mm-yyyy".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// Escapes the characters MarkdownV2 treats as syntax so dynamic values render
/// as literal text.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "_*[]()~`>#+-=|{}.!\\".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_code("  med001234 "), "MED001234");
        assert_eq!(normalize_code("MED001234"), "MED001234");
        assert_eq!(normalize_code("   "), "");
    }

    #[test]
    fn format_date_is_day_first() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(format_date(date), "14-03-2026");
    }

    #[test]
    fn escape_markdown_keeps_the_original_characters() {
        assert_eq!(escape_markdown("PC2024-A156"), "PC2024\\-A156");
        assert_eq!(escape_markdown("PharmaCorp Ltd."), "PharmaCorp Ltd\\.");
        assert_eq!(escape_markdown("plain text"), "plain text");
    }
}
