use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{PocketError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKind {
    type Err = PocketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(PocketError::UnknownPeriod(s.to_string())),
        }
    }
}

/// Report window; both ends are inclusive when filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBoundary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub fn resolve_period(kind: PeriodKind, now: NaiveDateTime) -> PeriodBoundary {
    let today = now.date();
    let start_date = match kind {
        PeriodKind::Day => today,
        PeriodKind::Week => today - Duration::days(i64::from(today.weekday().num_days_from_monday())),
        PeriodKind::Month => today.with_day(1).unwrap_or(today),
        PeriodKind::Year => today.with_ordinal(1).unwrap_or(today),
    };
    PeriodBoundary {
        start: midnight(start_date),
        end: now,
    }
}

/// Resolve a symbolic period token such as `month`. Unknown tokens fail.
pub fn resolve_period_token(token: &str, now: NaiveDateTime) -> Result<PeriodBoundary> {
    Ok(resolve_period(token.parse()?, now))
}

/// Human label for a report header, e.g. `March 2024`.
pub fn period_label(kind: PeriodKind, boundary: &PeriodBoundary) -> String {
    match kind {
        PeriodKind::Day => boundary.start.format("%d.%m.%Y").to_string(),
        PeriodKind::Week => format!(
            "{} - {}",
            boundary.start.format("%d.%m.%Y"),
            boundary.end.format("%d.%m.%Y")
        ),
        PeriodKind::Month => boundary.start.format("%B %Y").to_string(),
        PeriodKind::Year => boundary.start.format("%Y").to_string(),
    }
}
