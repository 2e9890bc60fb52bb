//! Shift calendar for the plant's fixed time zone.
//!
//! Three 8-hour shifts cover each calendar day:
//! - Shift A [06:00, 14:00)
//! - Shift B [14:00, 22:00)
//! - Shift C [22:00, 06:00) — wraps past midnight
//!
//! All boundaries are closed-start/open-end: a reading at exactly 06:00
//! local belongs to Shift A, at 14:00 to Shift B. The zone is a fixed
//! offset applied uniformly across the system.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Timelike, Utc};

use crate::types::{ShiftName, TimeWindow};

/// Default plant zone (Africa/Lagos, UTC+01:00, no DST).
pub const DEFAULT_TIMEZONE_NAME: &str = "Africa/Lagos";

const SECONDS_PER_HOUR: i32 = 3600;

/// Half-open `[start, end)` span of one shift, in UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ShiftWindow {
    /// Half-open containment test used for windowed slicing.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Maps instants to shifts and shift windows in one fixed-offset zone.
#[derive(Debug, Clone)]
pub struct ShiftCalendar {
    timezone_name: String,
    offset: FixedOffset,
}

/// Offset constructor for whole hours.
///
/// Out-of-range values fall back to UTC; config validation rejects them
/// before a calendar is ever built with one.
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * SECONDS_PER_HOUR)
        .or_else(|| FixedOffset::east_opt(0))
        .expect("zero offset is always representable")
}

impl Default for ShiftCalendar {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE_NAME, offset_from_hours(1))
    }
}

impl ShiftCalendar {
    pub fn new(timezone_name: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            timezone_name: timezone_name.into(),
            offset,
        }
    }

    /// IANA-style zone label reported in shift summaries.
    pub fn timezone_name(&self) -> &str {
        &self.timezone_name
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    fn local_hour(&self, instant: DateTime<Utc>) -> u32 {
        instant.with_timezone(&self.offset).hour()
    }

    /// Calendar date of an instant in the plant zone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Name of the shift an instant falls in.
    pub fn shift_name_for(&self, instant: DateTime<Utc>) -> ShiftName {
        match self.local_hour(instant) {
            6..=13 => ShiftName::A,
            14..=21 => ShiftName::B,
            _ => ShiftName::C,
        }
    }

    /// The 8-hour shift window containing the reference instant, anchored to
    /// the 06:00/14:00/22:00 local boundaries.
    ///
    /// For reference hours in [0, 6) the window is the previous calendar
    /// day's 22:00 through today's 06:00.
    pub fn shift_window_for(&self, instant: DateTime<Utc>) -> ShiftWindow {
        let local = instant.with_timezone(&self.offset);
        let hour = local.hour();

        let (anchor_date, anchor_hour) = match hour {
            6..=13 => (local.date_naive(), 6),
            14..=21 => (local.date_naive(), 14),
            22..=23 => (local.date_naive(), 22),
            _ => (local.date_naive() - Duration::days(1), 22),
        };

        let start_local = anchor_date.and_time(NaiveTime::MIN) + Duration::hours(anchor_hour);
        let start = DateTime::<Utc>::from_naive_utc_and_offset(start_local - self.offset, Utc);

        ShiftWindow {
            start,
            end: start + Duration::hours(8),
        }
    }

    /// Start instant for an ad-hoc query window.
    ///
    /// `hour`/`day`/`week` are simple lookbacks from `now`; `shift` is the
    /// start of the shift window containing `now`. This is deliberately a
    /// different notion from the full 8-hour summary window.
    pub fn resolve_window_start(&self, window: TimeWindow, now: DateTime<Utc>) -> DateTime<Utc> {
        match window {
            TimeWindow::Hour => now - Duration::hours(1),
            TimeWindow::Day => now - Duration::hours(24),
            TimeWindow::Week => now - Duration::days(7),
            TimeWindow::Shift => self.shift_window_for(now).start,
        }
    }
}
