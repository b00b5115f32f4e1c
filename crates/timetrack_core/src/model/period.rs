//! Reporting period for task aggregation.
//!
//! Calendar dates are interpreted in UTC. A start date begins at midnight; an
//! end date covers the whole day.

use crate::model::person::PersonId;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Accepted calendar date layout, e.g. `31.12.2024`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

const LAST_MS_OF_DAY: i64 = 24 * 60 * 60 * 1000 - 1;

/// Inclusive `[start, end]` window over one person's tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodQuery {
    person_id: PersonId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl PeriodQuery {
    pub fn new(
        person_id: PersonId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self, PeriodError> {
        if start > end {
            return Err(PeriodError::StartAfterEnd { start, end });
        }
        Ok(Self {
            person_id,
            start,
            end,
        })
    }

    /// Builds a window from optional calendar dates.
    ///
    /// Missing start means the earliest representable instant; missing end
    /// means `now`.
    pub fn from_dates(
        person_id: PersonId,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Self, PeriodError> {
        let start = start.map_or(DateTime::<Utc>::MIN_UTC, start_of_day);
        let end = end.map_or(now, end_of_day);
        Self::new(person_id, start, end)
    }

    pub fn person_id(&self) -> PersonId {
        self.person_id
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// Parses a `DD.MM.YYYY` calendar date.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, PeriodError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| PeriodError::InvalidDate(raw.to_string()))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + Duration::milliseconds(LAST_MS_OF_DAY)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    InvalidDate(String),
    StartAfterEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Display for PeriodError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(raw) => write!(f, "date `{raw}` must use the DD.MM.YYYY format"),
            Self::StartAfterEnd { start, end } => {
                write!(f, "period start {start} is after period end {end}")
            }
        }
    }
}

impl Error for PeriodError {}

#[cfg(test)]
mod tests {
    use super::{parse_calendar_date, PeriodError, PeriodQuery};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    #[test]
    fn parse_calendar_date_reads_day_month_year() {
        assert_eq!(
            parse_calendar_date("05.03.2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert!(matches!(
            parse_calendar_date("2024-03-05"),
            Err(PeriodError::InvalidDate(_))
        ));
        assert!(parse_calendar_date("31.02.2024").is_err());
    }

    #[test]
    fn missing_bounds_default_to_earliest_and_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let period = PeriodQuery::from_dates(7, None, None, now).unwrap();
        assert_eq!(period.person_id(), 7);
        assert_eq!(period.start(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(period.end(), now);
    }

    #[test]
    fn end_date_covers_the_whole_day() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let period = PeriodQuery::from_dates(1, Some(day), Some(day), now).unwrap();

        assert_eq!(period.start(), Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(
            period.end().timestamp_millis(),
            Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0)
                .unwrap()
                .timestamp_millis()
                - 1
        );
    }

    #[test]
    fn start_after_end_is_rejected() {
        let now = Utc::now();
        let start = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let err = PeriodQuery::from_dates(1, Some(start), Some(end), now).unwrap_err();
        assert!(matches!(err, PeriodError::StartAfterEnd { .. }));
    }
}
