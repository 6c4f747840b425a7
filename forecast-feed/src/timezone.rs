use std::fmt::Display;

use serde::{Serialize, Serializer};
use time::{util, Date, Duration, Month};

/// UTC offset applicable to a Swedish calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UtcOffset {
    /// Normaltid, `+01:00`.
    Standard,
    /// Sommartid, `+02:00`.
    Daylight,
}

impl UtcOffset {
    pub fn as_str(&self) -> &'static str {
        match self {
            UtcOffset::Standard => "+01:00",
            UtcOffset::Daylight => "+02:00",
        }
    }
}

impl Display for UtcOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UtcOffset {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Returns the UTC offset in effect in Sweden on the given date.
///
/// Daylight saving is treated as the half-open interval from the last
/// Sunday of March (inclusive) to the last Sunday of October
/// (exclusive), at whole-day granularity. The October transition
/// Sunday itself is standard time. This deliberately ignores the
/// actual clock-change hour.
pub fn utc_offset(date: Date) -> UtcOffset {
    let dst_start = last_sunday(date.year(), Month::March);
    let dst_end = last_sunday(date.year(), Month::October);

    if date >= dst_start && date < dst_end {
        UtcOffset::Daylight
    } else {
        UtcOffset::Standard
    }
}

fn last_sunday(year: i32, month: Month) -> Date {
    let last = Date::from_calendar_date(year, month, util::days_in_year_month(year, month))
        .expect("last day of month is a valid date");
    last - Duration::days(i64::from(last.weekday().number_days_from_sunday()))
}
