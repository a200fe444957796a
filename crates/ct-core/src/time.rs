//! Time-of-day model.
//!
//! Snapshots are stamped with a Unix timestamp (seconds, UTC).  Traffic
//! volume depends only on the hour of day and whether the day is a weekend,
//! so `ClockTime` breaks a timestamp into exactly those two components
//! without a datetime library.
//!
//! | Period        | Hours (UTC)       | Volume multiplier |
//! |---------------|-------------------|-------------------|
//! | `MorningRush` | 07–09             | 2.5               |
//! | `Midday`      | 10–16             | 1.2               |
//! | `EveningRush` | 17–19             | 2.5               |
//! | `Evening`     | 20–21             | 1.0               |
//! | `Night`       | 22–06             | 0.3               |
//!
//! Weekends scale the multiplier by a further 0.7.

use std::fmt;

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;

/// Weekend volume scale applied on top of the period multiplier.
pub const WEEKEND_FACTOR: f64 = 0.7;

// ── DayPeriod ─────────────────────────────────────────────────────────────────

/// Coarse traffic period of the day.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DayPeriod {
    MorningRush,
    Midday,
    EveningRush,
    Evening,
    Night,
}

impl DayPeriod {
    /// Period containing `hour` (0–23).
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            7..=9 => DayPeriod::MorningRush,
            10..=16 => DayPeriod::Midday,
            17..=19 => DayPeriod::EveningRush,
            20..=21 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }

    /// Traffic volume multiplier for this period.
    pub fn multiplier(self) -> f64 {
        match self {
            DayPeriod::MorningRush | DayPeriod::EveningRush => 2.5,
            DayPeriod::Midday => 1.2,
            DayPeriod::Evening => 1.0,
            DayPeriod::Night => 0.3,
        }
    }

    pub fn is_rush_hour(self) -> bool {
        matches!(self, DayPeriod::MorningRush | DayPeriod::EveningRush)
    }
}

// ── ClockTime ─────────────────────────────────────────────────────────────────

/// Hour-of-day and day-of-week for a Unix timestamp (UTC).
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockTime {
    /// 0–23.
    pub hour: u32,
    /// 0 = Monday … 6 = Sunday.
    pub weekday: u32,
}

impl ClockTime {
    pub fn from_unix_secs(secs: i64) -> Self {
        let days = secs.div_euclid(SECS_PER_DAY);
        let secs_of_day = secs.rem_euclid(SECS_PER_DAY);
        // 1970-01-01 was a Thursday (weekday 3 with Monday = 0).
        let weekday = (days + 3).rem_euclid(7) as u32;
        let hour = (secs_of_day / SECS_PER_HOUR) as u32;
        Self { hour, weekday }
    }

    #[inline]
    pub fn is_weekend(self) -> bool {
        self.weekday >= 5
    }

    #[inline]
    pub fn period(self) -> DayPeriod {
        DayPeriod::from_hour(self.hour)
    }

    /// Combined period and weekend multiplier.
    pub fn volume_multiplier(self) -> f64 {
        let base = self.period().multiplier();
        if self.is_weekend() { base * WEEKEND_FACTOR } else { base }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
        write!(f, "{} {:02}:00", DAYS[self.weekday as usize % 7], self.hour)
    }
}

/// Current Unix time in seconds, or 0 if the system clock is before 1970.
pub fn now_unix_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
