use chrono::NaiveDate;
use thiserror::Error;

pub use malsort_tracker::HistoryRecord;

/// Date layout used by the episode history view, e.g. `03/01/2020`.
pub const US_DATE_FORMAT: &str = "%m/%d/%Y";
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("malformed date {token:?} in update {update:?}")]
    Malformed { update: String, token: String },
    #[error("no date found in update {0:?}")]
    Missing(String),
}

pub fn parse_us_date(date: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date, US_DATE_FORMAT)
}

/// `2018-08-10`, the layout the list status endpoint expects.
pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

fn looks_like_date(token: &str) -> bool {
    token.matches('/').count() == 2 && token.chars().all(|c| c.is_ascii_digit() || c == '/')
}

/// Date of a single update line such as `Ep 12, watched on 03/01/2020 at 21:04`.
///
/// The first whitespace separated token shaped like `MM/DD/YYYY` is used.
pub fn update_date(update: &str) -> Result<NaiveDate, DateError> {
    let token = update
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_ascii_digit()))
        .find(|token| looks_like_date(token))
        .ok_or_else(|| DateError::Missing(update.to_string()))?;

    parse_us_date(token).map_err(|_| DateError::Malformed {
        update: update.to_string(),
        token: token.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchPeriod {
    pub start: NaiveDate,
    pub finish: NaiveDate,
}

impl WatchPeriod {
    /// Earliest and latest dates among `updates`, regardless of their order.
    /// Returns `None` when there are no updates.
    pub fn from_updates<S: AsRef<str>>(updates: &[S]) -> Result<Option<Self>, DateError> {
        let mut period: Option<WatchPeriod> = None;
        for update in updates {
            let date = update_date(update.as_ref())?;
            period = Some(match period {
                Some(p) => WatchPeriod {
                    start: p.start.min(date),
                    finish: p.finish.max(date),
                },
                None => WatchPeriod {
                    start: date,
                    finish: date,
                },
            });
        }

        Ok(period)
    }

    pub fn from_record(record: &HistoryRecord) -> Result<Option<Self>, DateError> {
        Self::from_updates(&record.updates)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn us_to_iso(date: &str) -> Result<String, chrono::ParseError> {
        Ok(format_iso(parse_us_date(date)?))
    }

    fn iso_to_us(date: &str) -> Result<String, chrono::ParseError> {
        Ok(NaiveDate::parse_from_str(date, ISO_DATE_FORMAT)?
            .format(US_DATE_FORMAT)
            .to_string())
    }

    #[test]
    fn test_us_to_iso() {
        assert_eq!(us_to_iso("08/10/2018").unwrap(), "2018-08-10");
        assert!(us_to_iso("13/10/2018").is_err());
        assert!(us_to_iso("02/30/2018").is_err());
    }

    #[test]
    fn test_date_round_trip() {
        let mut day = date(1999, 12, 25);
        let end = date(2024, 3, 1);
        while day <= end {
            let us = day.format(US_DATE_FORMAT).to_string();
            assert_eq!(iso_to_us(&us_to_iso(&us).unwrap()).unwrap(), us);
            day += chrono::Duration::days(17);
        }

        assert_eq!(iso_to_us(&us_to_iso("02/29/2020").unwrap()).unwrap(), "02/29/2020");
    }

    #[test]
    fn test_update_date() {
        assert_eq!(
            update_date("Ep 12, watched on 03/01/2020 at 21:04").unwrap(),
            date(2020, 3, 1)
        );
        assert_eq!(update_date("... 01/01/2020 Remove").unwrap(), date(2020, 1, 1));
    }

    #[test]
    fn test_update_date_errors() {
        assert_eq!(
            update_date("Ep 12, watched on 13/45/2020 at 21:04"),
            Err(DateError::Malformed {
                update: "Ep 12, watched on 13/45/2020 at 21:04".to_string(),
                token: "13/45/2020".to_string(),
            })
        );
        assert!(matches!(
            update_date("Ep 12, watched yesterday"),
            Err(DateError::Missing(_))
        ));
    }

    #[test]
    fn test_watch_period_most_recent_first() {
        let updates = ["... 03/01/2020 Remove", "... 01/01/2020 Remove"];

        let period = WatchPeriod::from_updates(&updates).unwrap().unwrap();

        assert_eq!(period.start.format(ISO_DATE_FORMAT).to_string(), "2020-01-01");
        assert_eq!(period.finish.format(ISO_DATE_FORMAT).to_string(), "2020-03-01");
    }

    #[test]
    fn test_watch_period_ignores_order() {
        let updates = [
            "Ep 2, watched on 01/05/2020 at 20:00",
            "Ep 26, watched on 03/01/2020 at 21:04",
            "Ep 1, watched on 12/31/2019 at 19:30",
        ];

        let period = WatchPeriod::from_updates(&updates).unwrap().unwrap();

        assert_eq!(period.start, date(2019, 12, 31));
        assert_eq!(period.finish, date(2020, 3, 1));
    }

    #[test]
    fn test_watch_period_empty() {
        let updates: [&str; 0] = [];
        assert_eq!(WatchPeriod::from_updates(&updates).unwrap(), None);
    }
}
