use chrono::{Datelike, Duration, Local, NaiveDate};
use crate::core::library::{LibraryError, LibraryResult};

pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub const DAY_FMT: &str = "%Y-%m-%d";

// Clock supplies the calendar date that due dates, card expiry and reconciliation compare against.
pub trait Clock: Sync + Send {
    fn today(&self) -> NaiveDate;

    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn parse(day: &str) -> LibraryResult<Self> {
        parse_day(day, "today").map(Self::new)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}

pub fn parse_day(value: &str, field_name: &str) -> LibraryResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DAY_FMT).map_err(|_| LibraryError::validation(
        format!("{} must use the YYYY-MM-DD format, got '{}'", field_name, value).as_str(), Some("400".to_string())))
}

pub fn add_days(day: NaiveDate, days: i64) -> LibraryResult<NaiveDate> {
    Duration::try_days(days)
        .and_then(|d| day.checked_add_signed(d))
        .ok_or_else(|| LibraryError::validation(
            format!("{} plus {} days is outside the supported calendar", day, days).as_str(), Some("400".to_string())))
}

pub mod serializer {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde::de::Error;
    use crate::utils::date::DATE_FMT;

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        format!("{}", time.format(DATE_FMT)).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let str_time: String = Deserialize::deserialize(deserializer)?;
        let time = NaiveDateTime::parse_from_str(&str_time, DATE_FMT).map_err(D::Error::custom)?;
        Ok(time)
    }
}
