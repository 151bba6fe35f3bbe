use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Fixed month abbreviation order; the position of an abbreviation in this
/// list is its `month_index`.
pub const MONTH_ABBREVS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A numeric month cell above this value is a spreadsheet day serial.
/// One threshold for every call site.
pub const DAY_SERIAL_MIN: f64 = 40000.0;

/// Day 0 of the spreadsheet serial scheme.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 31);

/// A month cell as it arrives from a spreadsheet or a stored document.
#[derive(Debug, Clone, PartialEq)]
pub enum RawMonth<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> From<&'a str> for RawMonth<'a> {
    fn from(s: &'a str) -> Self {
        RawMonth::Text(s)
    }
}

impl From<f64> for RawMonth<'_> {
    fn from(n: f64) -> Self {
        RawMonth::Number(n)
    }
}

/// The canonical form of a month label.
///
/// `display` is the grouping key: two cells normalize to the same `display`
/// exactly when they belong to the same month bucket. `(year, month_index)`
/// is the ordering key; an unparsed label carries `(0, 0)` and sorts first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month_index: u32,
    pub display: String,
}

impl MonthKey {
    fn unparsed(display: String) -> Self {
        MonthKey {
            year: 0,
            month_index: 0,
            display,
        }
    }

    /// Chronological ordering key.
    pub fn sort_key(&self) -> (i32, u32) {
        (self.year, self.month_index)
    }

    /// Whether the label resolved to a real calendar month.
    pub fn is_parsed(&self) -> bool {
        self.year != 0
    }
}

/// Normalizes a raw month cell into its canonical `{year, month_index,
/// display}` form.
///
/// - A number above [`DAY_SERIAL_MIN`] is a day-serial count (day 0 =
///   Dec 31 1899) and becomes `"Mon-YY"`.
/// - Text of the form `"Jul-25"` parses against [`MONTH_ABBREVS`] with the
///   year suffix offset from 2000.
/// - Anything else (bare words like `"July"`, small numbers, unknown
///   abbreviations) passes through as an unparsed display that sorts first.
///   This is a deliberate degrade: a dirty label must never fail.
pub fn normalize_month(raw: RawMonth) -> MonthKey {
    match raw {
        RawMonth::Number(n) => {
            if n.is_finite() && n > DAY_SERIAL_MIN {
                serial_to_month_key(n)
            } else if n.is_finite() {
                // Keep integer-valued cells free of a trailing ".0".
                if n.fract() == 0.0 {
                    MonthKey::unparsed(format!("{}", n as i64))
                } else {
                    MonthKey::unparsed(n.to_string())
                }
            } else {
                MonthKey::unparsed(String::new())
            }
        }
        RawMonth::Text(s) => normalize_month_text(s),
    }
}

fn normalize_month_text(raw: &str) -> MonthKey {
    let display = raw.trim().to_string();

    let Some((abbr, year_suffix)) = display.split_once('-') else {
        return MonthKey::unparsed(display);
    };

    let month_index = MONTH_ABBREVS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(abbr.trim()));
    let year_suffix: Option<i32> = year_suffix.trim().parse().ok();

    match (month_index, year_suffix) {
        (Some(idx), Some(suffix)) if (0..100).contains(&suffix) => MonthKey {
            year: 2000 + suffix,
            month_index: idx as u32,
            display,
        },
        _ => MonthKey::unparsed(display),
    }
}

fn serial_to_month_key(serial: f64) -> MonthKey {
    let (y, m, d) = SERIAL_EPOCH;
    let Some(date) = NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|epoch| epoch.checked_add_signed(Duration::days(serial.floor() as i64)))
    else {
        return MonthKey::unparsed(serial.to_string());
    };

    let month_index = date.month0();
    let display = format!("{}-{:02}", MONTH_ABBREVS[month_index as usize], date.year() % 100);
    MonthKey {
        year: date.year(),
        month_index,
        display,
    }
}
