//! Business-hours and timezone windowing.
//!
//! A restaurant's business day starts at its opening time in its own timezone
//! and runs until the next opening time. Sales made at 01:30 after a late
//! service therefore count towards the previous calendar date. All windows are
//! returned as half-open UTC ranges `[start, end)`.

use crate::{
    entities::restaurant,
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Offset, Utc};
use chrono_tz::Tz;

const TIME_FORMAT: &str = "%H:%M";

/// Half-open UTC interval covering one or more business days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessWindow {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
}

impl BusinessWindow {
    /// Whether `instant` falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Opening hours of a restaurant, resolved against its timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    pub timezone: Tz,
    pub opening: NaiveTime,
    pub closing: NaiveTime,
}

/// Parses an `"HH:MM"` time of day.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| Error::validation(format!("Invalid time of day '{value}', expected HH:MM")))
}

/// Parses an IANA timezone name.
pub fn parse_timezone(value: &str) -> Result<Tz> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|_| Error::validation(format!("Unknown timezone '{value}'")))
}

/// Local date + time → UTC instant.
///
/// Ambiguous local times (DST fold) resolve to the earlier instant. Local
/// times that do not exist (DST gap) are read with the offset in force just
/// before the gap, which moves them forward by the width of the gap.
fn local_to_utc(timezone: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    if let Some(local) = naive.and_local_timezone(timezone).earliest() {
        return local.with_timezone(&Utc);
    }
    let offset_before_gap = (naive - Duration::days(1))
        .and_local_timezone(timezone)
        .earliest()
        .map_or(0, |before| before.offset().fix().local_minus_utc());
    naive.and_utc() - Duration::seconds(i64::from(offset_before_gap))
}

impl BusinessHours {
    /// Builds business hours from their textual settings.
    pub fn parse(timezone: &str, opening: &str, closing: &str) -> Result<Self> {
        Ok(Self {
            timezone: parse_timezone(timezone)?,
            opening: parse_time_of_day(opening)?,
            closing: parse_time_of_day(closing)?,
        })
    }

    /// Business hours configured on a restaurant.
    pub fn for_restaurant(restaurant: &restaurant::Model) -> Result<Self> {
        Self::parse(
            &restaurant.timezone,
            &restaurant.opening_time,
            &restaurant.closing_time,
        )
    }

    /// Business date that `instant` belongs to.
    ///
    /// Before the opening time the previous calendar date is still running.
    #[must_use]
    pub fn business_date_at(&self, instant: DateTime<Utc>) -> NaiveDate {
        let local = instant.with_timezone(&self.timezone);
        let today = local.date_naive();
        if local.time() < self.opening {
            today.pred_opt().unwrap_or(today)
        } else {
            today
        }
    }

    /// Business date running right now.
    #[must_use]
    pub fn current_business_date(&self) -> NaiveDate {
        self.business_date_at(Utc::now())
    }

    /// UTC window of a single business date.
    #[must_use]
    pub fn window_for(&self, date: NaiveDate) -> BusinessWindow {
        self.window_for_range(date, date)
    }

    /// UTC window spanning business dates `from..=to`.
    #[must_use]
    pub fn window_for_range(&self, from: NaiveDate, to: NaiveDate) -> BusinessWindow {
        let next = to.succ_opt().unwrap_or(to);
        BusinessWindow {
            start: local_to_utc(self.timezone, from, self.opening),
            end: local_to_utc(self.timezone, next, self.opening),
        }
    }

    /// Whether the restaurant is serving at `instant`.
    ///
    /// Equal opening and closing times mean the restaurant never closes. A
    /// closing time earlier than the opening time means service runs past
    /// midnight.
    #[must_use]
    pub fn is_open_at(&self, instant: DateTime<Utc>) -> bool {
        let time = instant.with_timezone(&self.timezone).time();
        if self.opening == self.closing {
            true
        } else if self.opening < self.closing {
            self.opening <= time && time < self.closing
        } else {
            time >= self.opening || time < self.closing
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_rejects_bad_settings() {
        assert!(BusinessHours::parse("Mars/Olympus", "10:00", "22:00").is_err());
        assert!(BusinessHours::parse("Asia/Kolkata", "25:00", "22:00").is_err());
        assert!(BusinessHours::parse("Asia/Kolkata", "10:00", "late").is_err());
        assert!(BusinessHours::parse("Asia/Kolkata", "10:00", "22:00").is_ok());
    }

    #[test]
    fn test_business_date_before_opening_belongs_to_previous_day() {
        // Kolkata is UTC+05:30 all year
        let hours = BusinessHours::parse("Asia/Kolkata", "11:00", "02:00").unwrap();

        // 2024-03-10 01:30 local
        assert_eq!(hours.business_date_at(utc(2024, 3, 9, 20, 0)), date(2024, 3, 9));
        // 2024-03-10 11:00 local, exactly at opening
        assert_eq!(hours.business_date_at(utc(2024, 3, 10, 5, 30)), date(2024, 3, 10));
        // 2024-03-10 23:59 local
        assert_eq!(hours.business_date_at(utc(2024, 3, 10, 18, 29)), date(2024, 3, 10));
    }

    #[test]
    fn test_window_for_date_is_half_open_in_utc() {
        let hours = BusinessHours::parse("Asia/Kolkata", "11:00", "02:00").unwrap();
        let window = hours.window_for(date(2024, 3, 10));

        assert_eq!(window.start, utc(2024, 3, 10, 5, 30));
        assert_eq!(window.end, utc(2024, 3, 11, 5, 30));
        assert!(window.contains(utc(2024, 3, 10, 5, 30)));
        assert!(window.contains(utc(2024, 3, 10, 20, 0)));
        assert!(!window.contains(utc(2024, 3, 11, 5, 30)));
    }

    #[test]
    fn test_window_across_dst_change_is_23_hours() {
        // US clocks spring forward at 02:00 on 2024-03-10
        let hours = BusinessHours::parse("America/New_York", "06:00", "23:00").unwrap();
        let window = hours.window_for(date(2024, 3, 9));

        assert_eq!(window.start, utc(2024, 3, 9, 11, 0));
        assert_eq!(window.end, utc(2024, 3, 10, 10, 0));
        assert_eq!(window.end - window.start, Duration::hours(23));
    }

    #[test]
    fn test_opening_inside_dst_gap_moves_forward() {
        // 02:30 does not exist in New York on 2024-03-10; it becomes 03:30 EDT
        let hours = BusinessHours::parse("America/New_York", "02:30", "23:00").unwrap();

        assert_eq!(hours.window_for(date(2024, 3, 10)).start, utc(2024, 3, 10, 7, 30));
        assert_eq!(hours.window_for(date(2024, 3, 9)).end, utc(2024, 3, 10, 7, 30));
        assert_eq!(hours.window_for(date(2024, 3, 11)).start, utc(2024, 3, 11, 6, 30));
    }

    #[test]
    fn test_window_for_range_spans_all_days() {
        let hours = BusinessHours::parse("UTC", "09:00", "17:00").unwrap();
        let window = hours.window_for_range(date(2024, 1, 1), date(2024, 1, 7));

        assert_eq!(window.start, utc(2024, 1, 1, 9, 0));
        assert_eq!(window.end, utc(2024, 1, 8, 9, 0));
    }

    #[test]
    fn test_is_open_same_day_service() {
        let hours = BusinessHours::parse("UTC", "09:00", "17:00").unwrap();
        assert!(!hours.is_open_at(utc(2024, 1, 1, 8, 59)));
        assert!(hours.is_open_at(utc(2024, 1, 1, 9, 0)));
        assert!(!hours.is_open_at(utc(2024, 1, 1, 17, 0)));
    }

    #[test]
    fn test_is_open_overnight_service() {
        let hours = BusinessHours::parse("UTC", "18:00", "02:00").unwrap();
        assert!(hours.is_open_at(utc(2024, 1, 1, 23, 0)));
        assert!(hours.is_open_at(utc(2024, 1, 2, 1, 59)));
        assert!(!hours.is_open_at(utc(2024, 1, 2, 2, 0)));
        assert!(!hours.is_open_at(utc(2024, 1, 2, 12, 0)));
    }

    #[test]
    fn test_is_open_around_the_clock() {
        let hours = BusinessHours::parse("UTC", "00:00", "00:00").unwrap();
        assert!(hours.is_open_at(utc(2024, 1, 1, 3, 0)));
        assert!(hours.is_open_at(utc(2024, 1, 1, 15, 0)));
    }
}
