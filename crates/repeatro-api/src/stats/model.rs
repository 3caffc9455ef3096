use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Window over which review statistics are aggregated, always ending at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// Last 24 hours
    Daily,
    /// Last 7 days
    Weekly,
    /// Since the same instant one calendar month ago
    Monthly,
}

impl TimeRange {
    /// Inclusive `(from, to)` bounds of the window ending at `now`.
    pub fn bounds(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = match self {
            Self::Daily => now - Duration::days(1),
            Self::Weekly => now - Duration::days(7),
            Self::Monthly => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        };
        (from, now)
    }
}

impl FromStr for TimeRange {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ApiError::Validation(format!(
                "Invalid time_range '{s}': expected daily, weekly or monthly"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub time_range: Option<String>,
    pub deck_id: Option<Uuid>,
}

impl StatsQuery {
    /// A missing range is rejected rather than defaulted.
    pub fn time_range(&self) -> Result<TimeRange, ApiError> {
        self.time_range
            .as_deref()
            .ok_or_else(|| ApiError::Validation("time_range is required".to_string()))?
            .parse()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AverageGradeResponse {
    pub average_grade: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewCountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_daily_and_weekly_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap();

        assert_eq!(
            TimeRange::Daily.bounds(now),
            (Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap(), now)
        );
        assert_eq!(
            TimeRange::Weekly.bounds(now),
            (Utc.with_ymd_and_hms(2024, 3, 3, 8, 30, 0).unwrap(), now)
        );
    }

    #[test]
    fn test_monthly_bounds_use_calendar_month() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();

        // February 2024 has 29 days; the day is clamped
        assert_eq!(
            TimeRange::Monthly.bounds(now).0,
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_time_range() {
        assert_eq!("daily".parse::<TimeRange>().unwrap(), TimeRange::Daily);
        assert_eq!("WEEKLY".parse::<TimeRange>().unwrap(), TimeRange::Weekly);
        assert_eq!("Monthly".parse::<TimeRange>().unwrap(), TimeRange::Monthly);
        assert!("yearly".parse::<TimeRange>().is_err());
        assert!("unspecified".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_missing_time_range_rejected() {
        let query = StatsQuery {
            time_range: None,
            deck_id: None,
        };

        assert!(matches!(query.time_range(), Err(ApiError::Validation(_))));
    }
}
