use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static WIRE_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<year>-?\d{1,6})-(?P<month>\d{1,2})-(?P<day>\d{1,2})$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateKeyError {
    #[error("malformed date key {0:?}, expected YEAR-MONTH-DAY")]
    Malformed(String),
    #[error("{year}-{month}-{day} is not a calendar date")]
    OutOfRange { year: i32, month: u32, day: u32 },
}

/// Identity of a calendar day, truncated to day resolution in local time.
///
/// The wire form is `{year}-{month}-{day}` with no zero padding, e.g. `2024-2-5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, DateKeyError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or(DateKeyError::OutOfRange { year, month, day })
    }

    /// Today according to the local clock.
    pub fn today() -> Self {
        Self::from_local(Local::now())
    }

    /// Drops the time of day without converting to UTC.
    pub fn from_local(at: DateTime<Local>) -> Self {
        Self(at.date_naive())
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year(),
            month: self.month(),
        }
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// 0 = Sunday .. 6 = Saturday.
    pub fn weekday_from_sunday(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year(), self.month(), self.day())
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = WIRE_DATE_RE
            .captures(s.trim())
            .ok_or_else(|| DateKeyError::Malformed(s.to_string()))?;
        let year = caps["year"]
            .parse::<i32>()
            .map_err(|_| DateKeyError::Malformed(s.to_string()))?;
        let month = caps["month"]
            .parse::<u32>()
            .map_err(|_| DateKeyError::Malformed(s.to_string()))?;
        let day = caps["day"]
            .parse::<u32>()
            .map_err(|_| DateKeyError::Malformed(s.to_string()))?;
        Self::new(year, month, day)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A displayed month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, DateKeyError> {
        DateKey::new(year, month, 1).map(|d| d.year_month())
    }

    pub fn current() -> Self {
        DateKey::today().year_month()
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// 1-based.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> DateKey {
        // Constructors guarantee a valid month, so day 1 always exists.
        DateKey(
            NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN),
        )
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn contains(&self, date: DateKey) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn pred(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    /// Iterate every day of the month in order.
    pub fn iter_days(&self) -> impl Iterator<Item = DateKey> + '_ {
        (1..=self.days()).filter_map(move |day| DateKey::new(self.year, self.month, day).ok())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => write!(f, "{}", first.format("%B %Y")),
            None => write!(f, "{}-{}", self.year, self.month),
        }
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).map(|d| d.day()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn wire_format_is_unpadded() {
        let key = DateKey::new(2024, 2, 5).unwrap();
        assert_eq!(key.to_string(), "2024-2-5");
    }

    #[test]
    fn wire_format_round_trips() {
        for s in ["2024-2-29", "1999-12-31", "2025-1-1"] {
            let key: DateKey = s.parse().unwrap();
            assert_eq!(key.to_string(), s);
            assert_eq!(key.to_string().parse::<DateKey>().unwrap(), key);
        }
    }

    #[test]
    fn padded_input_normalizes() {
        let padded: DateKey = "2024-02-05".parse().unwrap();
        let plain: DateKey = "2024-2-5".parse().unwrap();
        assert_eq!(padded, plain);
        assert_eq!(padded.to_string(), "2024-2-5");
    }

    #[test]
    fn time_of_day_is_ignored() {
        let morning = Local.with_ymd_and_hms(2024, 6, 1, 0, 5, 0).unwrap();
        let night = Local.with_ymd_and_hms(2024, 6, 1, 23, 55, 0).unwrap();
        let a = DateKey::from_local(morning);
        let b = DateKey::from_local(night);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
        assert_eq!(a.to_string(), "2024-6-1");
    }

    #[test]
    fn rejects_invalid_dates() {
        assert!(matches!(
            "2023-2-29".parse::<DateKey>(),
            Err(DateKeyError::OutOfRange { .. })
        ));
        assert!(matches!(
            "2024-13-1".parse::<DateKey>(),
            Err(DateKeyError::OutOfRange { .. })
        ));
        assert!(matches!(
            "2024/2/1".parse::<DateKey>(),
            Err(DateKeyError::Malformed(_))
        ));
        assert!("".parse::<DateKey>().is_err());
    }

    #[test]
    fn serde_uses_wire_string() {
        let key = DateKey::new(2024, 3, 9).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2024-3-9\"");
        let back: DateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }

    #[test]
    fn year_month_navigation_wraps() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.succ(), YearMonth::new(2025, 1).unwrap());
        assert_eq!(dec.succ().pred(), dec);
        assert!(YearMonth::new(2024, 0).is_err());
    }

    #[test]
    fn year_month_only_holds_real_months() {
        assert!(YearMonth::new(2024, 13).is_err());
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!((feb.year(), feb.month()), (2024, 2));
        assert_eq!(feb.first_day(), DateKey::new(2024, 2, 1).unwrap());
        assert_eq!(feb.days(), 29);
    }

    #[test]
    fn weekday_counts_from_sunday() {
        // 2024-09-01 was a Sunday, 2024-02-01 a Thursday.
        assert_eq!(DateKey::new(2024, 9, 1).unwrap().weekday_from_sunday(), 0);
        assert_eq!(DateKey::new(2024, 2, 1).unwrap().weekday_from_sunday(), 4);
    }
}
