//! Dates: relative date filters, display time zones and clocks

use crate::{CoreError, CoreResult, DateDisplayMode};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Relative or exact day a date filter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum DateFilterOption {
    Today,
    Yesterday,
    Tomorrow,
    SevenDaysAgo,
    SevenDaysFromNow,
    ThirtyDaysAgo,
    ThirtyDaysFromNow,
    /// `days_to_add` days from now (negative for the past)
    XDaysFromNow,
    /// The filter's `date`
    Exact,
}

/// A date filter value resolved against the current time when compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateFilter {
    pub option: DateFilterOption,
    #[serde(default)]
    pub days_to_add: i64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl DateFilter {
    pub fn new(option: DateFilterOption) -> Self {
        Self {
            option,
            days_to_add: 0,
            date: None,
        }
    }

    pub fn days_from_now(days: i64) -> Self {
        Self {
            option: DateFilterOption::XDaysFromNow,
            days_to_add: days,
            date: None,
        }
    }

    pub fn exact(date: DateTime<Utc>) -> Self {
        Self {
            option: DateFilterOption::Exact,
            days_to_add: 0,
            date: Some(date),
        }
    }

    /// The instant this filter refers to, or `None` for an exact filter with no date.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let offset_days = match self.option {
            DateFilterOption::Today => 0,
            DateFilterOption::Yesterday => -1,
            DateFilterOption::Tomorrow => 1,
            DateFilterOption::SevenDaysAgo => -7,
            DateFilterOption::SevenDaysFromNow => 7,
            DateFilterOption::ThirtyDaysAgo => -30,
            DateFilterOption::ThirtyDaysFromNow => 30,
            DateFilterOption::XDaysFromNow => self.days_to_add,
            DateFilterOption::Exact => return self.date,
        };
        Duration::try_days(offset_days).and_then(|delta| now.checked_add_signed(delta))
    }
}

// ============================================================================
// CLOCK
// ============================================================================

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ============================================================================
// TIME ZONE CONVERSION
// ============================================================================

/// Converts between stored UTC instants and the wall-clock time a field is displayed in.
pub trait DateTimeConverter: Send + Sync {
    /// `None` when the shifted time falls outside the representable range.
    fn utc_to_display(&self, utc: DateTime<Utc>, mode: DateDisplayMode) -> Option<NaiveDateTime>;

    fn display_to_utc(&self, display: NaiveDateTime, mode: DateDisplayMode) -> Option<DateTime<Utc>>;
}

/// Converter using fixed offsets for the user's and the server's zones.
///
/// `Raw` and `Utc` never convert. A mode whose offset is unknown is treated
/// like `Raw`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffsetDateTimeConverter {
    pub user_offset: Option<FixedOffset>,
    pub server_offset: Option<FixedOffset>,
}

impl OffsetDateTimeConverter {
    pub fn new(user_offset: Option<FixedOffset>, server_offset: Option<FixedOffset>) -> Self {
        Self {
            user_offset,
            server_offset,
        }
    }

    /// Build from offsets expressed in minutes east of UTC.
    pub fn from_minutes(user: Option<i32>, server: Option<i32>) -> CoreResult<Self> {
        Ok(Self {
            user_offset: user.map(|m| offset_from_minutes("user_utc_offset_minutes", m)).transpose()?,
            server_offset: server
                .map(|m| offset_from_minutes("server_utc_offset_minutes", m))
                .transpose()?,
        })
    }

    fn offset(&self, mode: DateDisplayMode) -> Option<FixedOffset> {
        match mode {
            DateDisplayMode::Raw | DateDisplayMode::Utc => None,
            DateDisplayMode::UserLocal => self.user_offset,
            DateDisplayMode::ServerLocal => self.server_offset,
        }
    }
}

impl DateTimeConverter for OffsetDateTimeConverter {
    fn utc_to_display(&self, utc: DateTime<Utc>, mode: DateDisplayMode) -> Option<NaiveDateTime> {
        match self.offset(mode) {
            Some(offset) => utc
                .naive_utc()
                .checked_add_signed(Duration::seconds(i64::from(offset.local_minus_utc()))),
            None => Some(utc.naive_utc()),
        }
    }

    fn display_to_utc(&self, display: NaiveDateTime, mode: DateDisplayMode) -> Option<DateTime<Utc>> {
        let shifted = match self.offset(mode) {
            Some(offset) => display.checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))?,
            None => display,
        };
        Some(Utc.from_utc_datetime(&shifted))
    }
}

pub(crate) fn offset_from_minutes(field: &str, minutes: i32) -> CoreResult<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| CoreError::Config {
            field: field.to_string(),
            reason: format!("{} minutes is not a valid UTC offset", minutes),
        })
}

// =============================================================================
// TESTS
// =============================================================================
