use crate::error::{AnalyticsError, AnalyticsResult};
use chrono::{Duration, NaiveDate, Utc};

/// An inclusive range of calendar days to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl Period {
    pub fn create(start_date: NaiveDate, end_date: NaiveDate) -> AnalyticsResult<Self> {
        if start_date > end_date {
            return Err(AnalyticsError::InvalidPeriod {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// The last `days` days, ending today (UTC).
    pub fn days(days: u32) -> AnalyticsResult<Self> {
        Self::days_ending(Utc::now().date_naive(), days)
    }

    /// Fails with `InvalidPeriod` when the start would fall before the earliest representable date.
    pub fn days_ending(end_date: NaiveDate, days: u32) -> AnalyticsResult<Self> {
        let start_date = end_date
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or(AnalyticsError::InvalidPeriod {
                start: NaiveDate::MIN,
                end: end_date,
            })?;
        Self::create(start_date, end_date)
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}
