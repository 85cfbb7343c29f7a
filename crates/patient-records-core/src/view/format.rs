//! Display formatting for dates shown on cards and in the details view.

use chrono::NaiveDate;

/// Card style, e.g. "Jan 15, 2024".
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Details view style, e.g. "January 15, 2024".
pub fn format_date_long(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
