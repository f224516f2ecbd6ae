//! Availability evaluation against recurring shift windows.
//!
//! A candidate is on duty when the evaluation time of day falls inside
//! their shift. Shifts whose start is later than their end wrap past
//! midnight. Off-duty candidates stay eligible with a proximity score that
//! decays linearly with the distance to the nearer shift boundary; only
//! weekend-ineligible candidates on a weekend can be removed entirely.

use crate::roster::Candidate;
use chrono::{DateTime, Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// What happens to weekend-ineligible candidates on Saturday and Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeekendPolicy {
    /// Remove them from consideration
    #[default]
    Exclude,
    /// Keep them with the floor availability score
    Penalize,
}

/// Which instant shift windows are evaluated at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationReference {
    /// The engine clock at decision time
    #[default]
    Now,
    /// The work item's opened timestamp
    OpenedAt,
}

/// How the distance from an off-duty time to the shift is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryDistance {
    /// Overnight shifts are unrolled onto one timeline: the end moves to the
    /// next day, and so does a time earlier than the start. Day shifts are
    /// never wrapped.
    #[default]
    Normalized,
    /// Shorter way around the 24-hour clock to either boundary
    Circular,
}

/// Availability tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityPolicy {
    /// Distance from a shift boundary at which the score reaches the floor
    pub horizon_minutes: u32,
    /// Lowest score an eligible candidate can receive
    pub floor: f64,
    /// Score used when a candidate's shift cannot be parsed
    pub malformed_shift_score: f64,
    pub weekend_policy: WeekendPolicy,
    /// Offset of shift-local time from UTC
    pub utc_offset_minutes: i32,
    pub reference: EvaluationReference,
    pub boundary_distance: BoundaryDistance,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            horizon_minutes: 240,
            floor: 0.1,
            malformed_shift_score: 0.5,
            weekend_policy: WeekendPolicy::Exclude,
            utc_offset_minutes: 0,
            reference: EvaluationReference::Now,
            boundary_distance: BoundaryDistance::Normalized,
        }
    }
}

impl AvailabilityPolicy {
    /// Convert a UTC instant to shift-local wall-clock time
    pub fn local_instant(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.naive_utc() + Duration::minutes(i64::from(self.utc_offset_minutes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid shift time '{value}', expected HH:MM or HH:MM:SS")]
pub struct ShiftParseError {
    pub value: String,
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, ShiftParseError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ShiftParseError {
            value: value.to_string(),
        })
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// A daily shift window, possibly wrapping past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl ShiftWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ShiftParseError> {
        Ok(Self::new(parse_time_of_day(start)?, parse_time_of_day(end)?))
    }

    /// Whether the shift crosses midnight
    pub fn is_overnight(&self) -> bool {
        self.start > self.end
    }

    /// Inclusive containment; overnight shifts cover `[start, 24:00) ∪ [00:00, end]`
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.is_overnight() {
            time >= self.start || time <= self.end
        } else {
            self.start <= time && time <= self.end
        }
    }

    /// Distance in whole minutes to the nearer shift boundary.
    ///
    /// For an overnight shift the end is pushed past midnight, and a time
    /// earlier than the start is pushed along with it. A 22:00-06:00 shift
    /// is therefore 60 minutes from 07:00 but 900 minutes from 21:00.
    pub fn distance_minutes(&self, time: NaiveTime) -> u32 {
        let mut now = minute_of_day(time);
        let start = minute_of_day(self.start);
        let mut end = minute_of_day(self.end);

        if start > end {
            end += MINUTES_PER_DAY;
            if now < start {
                now += MINUTES_PER_DAY;
            }
        }
        now.abs_diff(start).min(now.abs_diff(end))
    }

    /// Distance around the 24-hour clock to the nearer shift boundary.
    pub fn circular_distance_minutes(&self, time: NaiveTime) -> u32 {
        let now = minute_of_day(time);
        let circular = |boundary: NaiveTime| {
            let linear = now.abs_diff(minute_of_day(boundary));
            linear.min(MINUTES_PER_DAY - linear)
        };
        circular(self.start).min(circular(self.end))
    }

    pub fn distance_with(&self, time: NaiveTime, mode: BoundaryDistance) -> u32 {
        match mode {
            BoundaryDistance::Normalized => self.distance_minutes(time),
            BoundaryDistance::Circular => self.circular_distance_minutes(time),
        }
    }
}

/// Duty state at the evaluation instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OnDuty,
    OffDuty,
    /// Shift data could not be parsed
    Unknown,
}

/// Result of evaluating one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Availability {
    pub status: DutyStatus,
    /// In `[floor, 1.0]`
    pub score: f64,
    /// False when the candidate must be removed from consideration
    pub eligible: bool,
}

impl Availability {
    pub fn is_on_duty(&self) -> bool {
        self.status == DutyStatus::OnDuty
    }
}

pub fn is_weekend(instant: NaiveDateTime) -> bool {
    matches!(instant.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Map a distance from the shift to a score that falls linearly to the
/// floor at the horizon.
pub fn proximity_score(distance_minutes: u32, policy: &AvailabilityPolicy) -> f64 {
    let horizon = f64::from(policy.horizon_minutes.max(1));
    (1.0 - f64::from(distance_minutes) / horizon).max(policy.floor)
}

/// Evaluate a candidate at a shift-local instant.
pub fn evaluate(
    candidate: &Candidate,
    instant: NaiveDateTime,
    policy: &AvailabilityPolicy,
) -> Availability {
    if is_weekend(instant) && !candidate.weekend_eligible {
        return Availability {
            status: DutyStatus::OffDuty,
            score: policy.floor,
            eligible: policy.weekend_policy == WeekendPolicy::Penalize,
        };
    }

    let window = match ShiftWindow::parse(&candidate.shift_start, &candidate.shift_end) {
        Ok(window) => window,
        Err(e) => {
            tracing::warn!(
                candidate = %candidate.id,
                shift_start = %candidate.shift_start,
                shift_end = %candidate.shift_end,
                error = %e,
                "Malformed shift time, treating candidate as available with neutral score"
            );
            return Availability {
                status: DutyStatus::Unknown,
                score: policy.malformed_shift_score,
                eligible: true,
            };
        }
    };

    let time = instant.time();
    if window.contains(time) {
        Availability {
            status: DutyStatus::OnDuty,
            score: 1.0,
            eligible: true,
        }
    } else {
        Availability {
            status: DutyStatus::OffDuty,
            score: proximity_score(
                window.distance_with(time, policy.boundary_distance),
                policy,
            ),
            eligible: true,
        }
    }
}
