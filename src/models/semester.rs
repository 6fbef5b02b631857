use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterDescriptor {
    pub id: i64,
    pub year: i32,
    pub period: u8,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub is_current: bool,
}

impl SemesterDescriptor {
    /// Selection key, e.g. `2024-2`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.year, self.period)
    }

    /// Semester assumed to be running on `today` when none has been loaded.
    pub fn fallback_current(today: NaiveDate) -> SemesterDescriptor {
        let period = if today.month() <= 6 { 1 } else { 2 };
        Self::synthesize(today.year(), period, true)
    }

    /// Semester immediately before the fallback current one.
    pub fn fallback_previous(today: NaiveDate) -> SemesterDescriptor {
        if today.month() <= 6 {
            Self::synthesize(today.year() - 1, 2, false)
        } else {
            Self::synthesize(today.year(), 1, false)
        }
    }

    fn synthesize(year: i32, period: u8, is_current: bool) -> SemesterDescriptor {
        let (start, end) = if period == 1 {
            ((1, 1), (5, 31))
        } else {
            ((8, 1), (11, 30))
        };
        // fixed month/day pairs are valid for every year
        let date = |(m, d): (u32, u32)| NaiveDate::from_ymd_opt(year, m, d).unwrap_or(NaiveDate::MIN);

        SemesterDescriptor {
            id: i64::from(year) * 10 + i64::from(period),
            year,
            period,
            start_date: date(start),
            end_date: date(end),
            is_current,
        }
    }
}
