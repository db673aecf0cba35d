use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    // %B also accepts the abbreviated month name when parsing
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%A, %B %d, %Y",
    "%a, %B %d, %Y",
];

/// Parses the date strings found in legacy post headers.
///
/// Accepts ISO-like dates with or without a time, RFC 3339, RFC 2822 and the
/// usual English long forms ("March 5, 2021", "5 Mar 2021"). Dates without a
/// time are placed at midnight. Offsets are dropped and the local wall time kept.
pub fn parse_date_time(buf: &str) -> Result<NaiveDateTime, String> {
    let buf = buf.trim();
    if buf.is_empty() {
        return Err("Empty date".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(buf) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(buf) {
        return Ok(dt.naive_local());
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(buf, fmt) {
            return Ok(dt);
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(buf, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| format!("Invalid date {}", buf));
        }
    }

    Err(format!("Unable to parse date time {}", buf))
}

/// Formats a date the way it is written back into a header. Fractional
/// seconds are only written when present.
pub fn format_header_date(date_time: &NaiveDateTime) -> String {
    date_time.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

pub fn format_date_time(date_time: &NaiveDateTime) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}
