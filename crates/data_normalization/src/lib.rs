pub mod month;
pub mod numeric;

pub use month::{DAY_SERIAL_MIN, MONTH_ABBREVS, MonthKey, RawMonth, normalize_month};
pub use numeric::{coerce_count, coerce_number, coerce_percent};
