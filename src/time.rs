//! CF-convention time axis decoding.
//!
//! Time coordinates are stored as offsets from a reference instant, e.g.
//! `hours since 1979-01-01 00:00:00`. Only the real-world (proleptic)
//! Gregorian calendar is supported.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{ExtractError, Result};

/// Timestamp pattern embedded in output filenames (month-day-year-hour).
pub const TIMESTAMP_FORMAT: &str = "%m-%d-%Y-%H";

const CALENDARS: &[&str] = &["standard", "gregorian", "proleptic_gregorian"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parsed `<unit> since <reference>` string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    /// Length of one unit in seconds
    pub seconds_per_unit: f64,
    pub reference: NaiveDateTime,
}

impl TimeUnits {
    pub fn parse(units: &str) -> Result<Self> {
        let invalid = || ExtractError::InvalidTimeUnits(units.to_string());

        let (unit, reference) = units.trim().split_once(" since ").ok_or_else(invalid)?;
        let seconds_per_unit = match unit.trim().to_lowercase().as_str() {
            "days" | "day" | "d" => 86_400.0,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600.0,
            "minutes" | "minute" | "mins" | "min" => 60.0,
            "seconds" | "second" | "secs" | "sec" | "s" => 1.0,
            _ => return Err(invalid()),
        };
        let reference = parse_reference(reference).ok_or_else(invalid)?;

        Ok(Self {
            seconds_per_unit,
            reference,
        })
    }

    /// Convert one stored offset to an absolute timestamp.
    pub fn decode(&self, value: f64) -> Result<NaiveDateTime> {
        let millis = (value * self.seconds_per_unit * 1000.0).round();
        if !millis.is_finite() {
            return Err(ExtractError::InvalidTimeValue {
                value,
                reason: "is not finite",
            });
        }
        Duration::try_milliseconds(millis as i64)
            .and_then(|offset| self.reference.checked_add_signed(offset))
            .ok_or(ExtractError::InvalidTimeValue {
                value,
                reason: "is outside the representable date range",
            })
    }
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    // drop a trailing zone designator; offsets other than UTC are not used in
    // the prepped files
    let reference = reference
        .trim()
        .trim_end_matches(" UTC")
        .trim_end_matches('Z')
        .trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(reference, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(reference, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Check the `calendar` attribute of a time coordinate; `None` means the
/// default (standard) calendar.
pub fn check_calendar(calendar: Option<&str>) -> Result<()> {
    match calendar {
        None => Ok(()),
        Some(c) if CALENDARS.contains(&c.trim().to_lowercase().as_str()) => Ok(()),
        Some(c) => Err(ExtractError::UnsupportedCalendar(c.to_string())),
    }
}

/// Decode every offset of a time axis.
pub fn decode_times(
    units: &str,
    calendar: Option<&str>,
    values: &[f64],
) -> Result<Vec<NaiveDateTime>> {
    check_calendar(calendar)?;
    let units = TimeUnits::parse(units)?;
    values.iter().map(|&v| units.decode(v)).collect()
}

pub fn format_timestamp(time: &NaiveDateTime) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}
