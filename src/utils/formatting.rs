use time::macros::format_description;
use time::{format_description, OffsetDateTime};

const REPORT_DATE_FORMAT: &[format_description::FormatItem<'_>] =
    format_description!("[month repr:long] [day padding:none], [year]");

/// Formats a date like `October 19, 2026`.
pub fn format_report_date(date_time: impl Into<OffsetDateTime>) -> String {
    let offset_date_time: OffsetDateTime = date_time.into();
    offset_date_time
        .format(REPORT_DATE_FORMAT)
        .unwrap_or_else(|_| offset_date_time.date().to_string())
}

pub fn format_mean(mean: f64) -> String {
    format!("{mean:.1}")
}
