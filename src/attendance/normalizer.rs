use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Shift start, grace window and full-day credit used to classify a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendancePolicy {
    /// Minutes since midnight.
    pub shift_start: u32,
    pub grace_minutes: u32,
    pub full_day_hours: u8,
}

impl Default for AttendancePolicy {
    /// Morning shift: 08:00 start, 30 minutes grace, 8 hours credit.
    fn default() -> Self {
        Self {
            shift_start: 8 * 60,
            grace_minutes: 30,
            full_day_hours: 8,
        }
    }
}

impl AttendancePolicy {
    /// Last minute of the day that still counts as on time.
    pub fn late_after(&self) -> u32 {
        self.shift_start + self.grace_minutes
    }
}

/// A single scanner punch. Only zero-padded `HH:MM` and `HH:MM:SS` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Punch(NaiveTime);

impl Punch {
    pub fn parse(token: &str) -> Option<Self> {
        let bytes = token.as_bytes();
        let pair = |at: usize| -> Option<u32> {
            match (bytes.get(at), bytes.get(at + 1)) {
                (Some(hi), Some(lo)) if hi.is_ascii_digit() && lo.is_ascii_digit() => {
                    Some(u32::from(hi - b'0') * 10 + u32::from(lo - b'0'))
                }
                _ => None,
            }
        };

        let (hour, minute, second) = match bytes.len() {
            5 if bytes[2] == b':' => (pair(0)?, pair(3)?, 0),
            8 if bytes[2] == b':' && bytes[5] == b':' => (pair(0)?, pair(3)?, pair(6)?),
            _ => return None,
        };

        NaiveTime::from_hms_opt(hour, minute, second).map(Punch)
    }

    /// Seconds are dropped, the grace comparison works on whole minutes.
    pub fn minutes_since_midnight(&self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }
}

impl fmt::Display for Punch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.second() == 0 {
            write!(f, "{}", self.0.format("%H:%M"))
        } else {
            write!(f, "{}", self.0.format("%H:%M:%S"))
        }
    }
}

impl Serialize for Punch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Check-out side of a day. `Missing` (one punch only) is not the same as
/// `NotRecorded` (no punches at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOut {
    NotRecorded,
    Missing,
    At(Punch),
}

impl CheckOut {
    pub const MISSING_MARKER: &'static str = "missing";

    pub fn punch(&self) -> Option<Punch> {
        match self {
            CheckOut::At(punch) => Some(*punch),
            _ => None,
        }
    }
}

impl fmt::Display for CheckOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckOut::NotRecorded => f.write_str("-"),
            CheckOut::Missing => f.write_str(Self::MISSING_MARKER),
            CheckOut::At(punch) => punch.fmt(f),
        }
    }
}

impl Serialize for CheckOut {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CheckOut::NotRecorded => serializer.serialize_none(),
            CheckOut::Missing => serializer.serialize_str(Self::MISSING_MARKER),
            CheckOut::At(punch) => serializer.collect_str(punch),
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AttendanceStatus {
    Absent,
    OnTime,
    Late,
    MissingCheckout,
    /// The punch string could not be interpreted.
    Unreadable,
}

/// Interpretation of one day's punches. Derived on every read, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceOutcome {
    #[schema(value_type = Option<String>, example = "08:10")]
    pub check_in: Option<Punch>,
    #[schema(value_type = Option<String>, example = "16:00")]
    pub check_out: CheckOut,
    pub status: AttendanceStatus,
    #[schema(example = 8)]
    pub worked_hours: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

impl AttendanceOutcome {
    fn absent() -> Self {
        Self {
            check_in: None,
            check_out: CheckOut::NotRecorded,
            status: AttendanceStatus::Absent,
            worked_hours: None,
            problem: None,
        }
    }

    fn unreadable(problem: String) -> Self {
        Self {
            check_in: None,
            check_out: CheckOut::NotRecorded,
            status: AttendanceStatus::Unreadable,
            worked_hours: None,
            problem: Some(problem),
        }
    }
}

/// Normalizes a punch string with the default morning-shift policy.
pub fn normalize(fingerprints: &str) -> AttendanceOutcome {
    normalize_with(&AttendancePolicy::default(), fingerprints)
}

/// Derives check-in, check-out, status and worked-hours credit from a
/// whitespace-separated punch string. Intermediate punches are ignored.
///
/// A day with a single punch is always `MissingCheckout`, however late that
/// punch is. Any token that is not a zero-padded time makes the whole day
/// `Unreadable`.
pub fn normalize_with(policy: &AttendancePolicy, fingerprints: &str) -> AttendanceOutcome {
    let mut punches = Vec::new();
    for token in fingerprints.split_whitespace() {
        match Punch::parse(token) {
            Some(punch) => punches.push(punch),
            None => {
                return AttendanceOutcome::unreadable(format!("unreadable punch `{token}`"));
            }
        }
    }
    punches.sort_unstable();

    let (Some(&first), Some(&last)) = (punches.first(), punches.last()) else {
        return AttendanceOutcome::absent();
    };

    if punches.len() == 1 {
        return AttendanceOutcome {
            check_in: Some(first),
            check_out: CheckOut::Missing,
            status: AttendanceStatus::MissingCheckout,
            worked_hours: None,
            problem: None,
        };
    }

    let status = if first.minutes_since_midnight() > policy.late_after() {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::OnTime
    };

    AttendanceOutcome {
        check_in: Some(first),
        check_out: CheckOut::At(last),
        status,
        worked_hours: Some(policy.full_day_hours),
        problem: None,
    }
}
