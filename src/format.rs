// Display helpers for dates

use chrono::NaiveDate;

/// Label shown for tasks without a due date
pub const NO_DUE_DATE: &str = "No due date";

/// Label for text that is not a `YYYY-MM-DD` date
pub const INVALID_DATE: &str = "Invalid Date";

/// Render a due date as `Jan 5, 2025`, or the placeholder when absent
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => NO_DUE_DATE.to_string(),
    }
}

/// Same as `format_date`, for raw form input
pub fn format_date_str(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return NO_DUE_DATE.to_string();
    }

    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(d) => format_date(Some(d)),
        Err(_) => INVALID_DATE.to_string(),
    }
}
