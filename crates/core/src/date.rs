use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

re!(re_slash, r"^(\d{1,2})/(\d{1,2})/(\d{2}|\d{4})$");
re!(re_iso, r"^(\d{4})-(\d{1,2})-(\d{1,2})$");
re!(re_year, r"^(\d{4})$");
re!(re_serial, r"^(\d{1,6})(?:\.\d+)?$");

/// Day zero of spreadsheet date serials (1899-12-30, so that serial 1 is
/// 1899-12-31 and the 1900 leap-year quirk lines up for modern dates).
fn serial_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch")
}

/// Formats tried, in order, once the slash/ISO/serial shapes have failed.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y", "%d %b %Y", "%d %B %Y", "%b %d, %Y", "%B %d, %Y",
];

/// Tolerant date parser for sheet cells.
///
/// Accepts `D/M/YY` and `D/M/YYYY` (day first, two-digit years are 20yy),
/// `YYYY-M-D`, a bare `YYYY` (January 1st), spreadsheet serial day counts
/// of any other length, and a handful of generic
/// date/timestamp strings. Returns `None` for anything else, including
/// impossible calendar dates such as `31/2/24`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(c) = re_slash().captures(s) {
        let day: u32 = c[1].parse().ok()?;
        let month: u32 = c[2].parse().ok()?;
        let year: i32 = if c[3].len() == 2 {
            2000 + c[3].parse::<i32>().ok()?
        } else {
            c[3].parse().ok()?
        };
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(c) = re_iso().captures(s) {
        let year: i32 = c[1].parse().ok()?;
        let month: u32 = c[2].parse().ok()?;
        let day: u32 = c[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    // A bare four-digit value is a year, not a serial around 1905-1927.
    if let Some(c) = re_year().captures(s) {
        return NaiveDate::from_ymd_opt(c[1].parse().ok()?, 1, 1);
    }

    if let Some(c) = re_serial().captures(s) {
        let days: u64 = c[1].parse().ok()?;
        return serial_epoch().checked_add_days(Days::new(days));
    }

    parse_generic(s)
}

fn parse_generic(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Days since 1970-01-01; unparseable values sit at the epoch itself.
pub fn date_sort_key(raw: &str) -> i64 {
    parse_date(raw)
        .map(|d| d.signed_duration_since(NaiveDate::default()).num_days())
        .unwrap_or(0)
}

/// Short local display form, `d/m/yyyy`. Unparseable input renders blank.
pub fn format_short_date(raw: &str) -> String {
    parse_date(raw)
        .map(|d| d.format("%-d/%-m/%Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn slash_two_digit_year_is_day_first() {
        assert_eq!(parse_date("5/3/24"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn slash_four_digit_year() {
        assert_eq!(parse_date("15/11/2023"), Some(ymd(2023, 11, 15)));
    }

    #[test]
    fn iso_date() {
        assert_eq!(parse_date("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("2024-3-5"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn spreadsheet_serial() {
        assert_eq!(parse_date("45356"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date("1"), Some(ymd(1899, 12, 31)));
        assert_eq!(parse_date("45356.5"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn bare_year_is_january_first() {
        assert_eq!(parse_date("2024"), Some(ymd(2024, 1, 1)));
        assert_eq!(parse_date(" 1999 "), Some(ymd(1999, 1, 1)));
        assert_eq!(parse_date("45000"), Some(ymd(2023, 3, 15)));
    }

    #[test]
    fn rfc3339_timestamp() {
        assert_eq!(parse_date("2024-03-05T03:00:00.000Z"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn impossible_calendar_date_is_unparseable() {
        assert_eq!(parse_date("31/2/24"), None);
    }

    #[test]
    fn garbage_and_blank_are_unparseable() {
        assert_eq!(parse_date("vendido"), None);
        assert_eq!(parse_date("   "), None);
    }

    #[test]
    fn unparseable_sorts_before_valid_dates() {
        assert_eq!(date_sort_key("???"), 0);
        assert!(date_sort_key("???") < date_sort_key("5/3/24"));
        assert!(date_sort_key("1/1/2020") < date_sort_key("5/3/24"));
    }

    #[test]
    fn short_date_format() {
        assert_eq!(format_short_date("2024-03-05"), "5/3/2024");
        assert_eq!(format_short_date("nope"), "");
    }
}
