use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ClientError;
use crate::models::Formula;

/// When a schedule recurs. Serialized as the backend's lowercase strings
/// (`"daily"`, `"weekdays"`, `"weekends"`, a weekday name, or `"once"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekdays,
    Weekends,
    Day(Weekday),
    Once,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recurrence::Daily => "daily",
            Recurrence::Weekdays => "weekdays",
            Recurrence::Weekends => "weekends",
            Recurrence::Once => "once",
            Recurrence::Day(day) => match day {
                Weekday::Mon => "monday",
                Weekday::Tue => "tuesday",
                Weekday::Wed => "wednesday",
                Weekday::Thu => "thursday",
                Weekday::Fri => "friday",
                Weekday::Sat => "saturday",
                Weekday::Sun => "sunday",
            },
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recurrence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(Recurrence::Daily),
            "weekdays" => Ok(Recurrence::Weekdays),
            "weekends" => Ok(Recurrence::Weekends),
            "once" => Ok(Recurrence::Once),
            "monday" => Ok(Recurrence::Day(Weekday::Mon)),
            "tuesday" => Ok(Recurrence::Day(Weekday::Tue)),
            "wednesday" => Ok(Recurrence::Day(Weekday::Wed)),
            "thursday" => Ok(Recurrence::Day(Weekday::Thu)),
            "friday" => Ok(Recurrence::Day(Weekday::Fri)),
            "saturday" => Ok(Recurrence::Day(Weekday::Sat)),
            "sunday" => Ok(Recurrence::Day(Weekday::Sun)),
            other => Err(format!("unknown recurrence pattern: {other}")),
        }
    }
}

impl Serialize for Recurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// HH:MM wire format for schedule times (the backend rejects seconds).
pub mod hhmm {
    use super::*;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_hhmm(&raw).map_err(serde::de::Error::custom)
    }
}

/// Accepts `HH:MM` and the backend-tolerated `H:MM` shorthand.
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&format!("0{raw}"), "%H:%M"))
        .map_err(|_| format!("invalid time format {raw:?}, expected HH:MM"))
}

/// A stored schedule as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Schedule {
    pub id: u32,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub formula: Formula,
    pub cycle_time: f64,
    pub duration: f64,
    pub recurrence: Recurrence,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<NaiveDate>,
}

/// Outgoing payload for schedule create/update/overlap-check requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleDraft {
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub formula: Formula,
    pub cycle_time: f64,
    pub duration: f64,
    pub recurrence: Recurrence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_date: Option<NaiveDate>,
}

impl ScheduleDraft {
    /// Pre-submission checks mirroring the backend's required-field
    /// validation; a one-time schedule additionally needs its date.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.recurrence == Recurrence::Once && self.schedule_date.is_none() {
            return Err(ClientError::Validation(
                "one-time schedules require a date".into(),
            ));
        }
        if !self.cycle_time.is_finite() || self.cycle_time <= 0.0 {
            return Err(ClientError::Validation(
                "schedule cycle_time must be positive".into(),
            ));
        }
        if !self.duration.is_finite() || self.duration < 0.0 || self.duration > self.cycle_time {
            return Err(ClientError::Validation(
                "schedule duration must be within the cycle length".into(),
            ));
        }
        Ok(())
    }
}
