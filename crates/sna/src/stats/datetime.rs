//! Mean, median, span and deviations over labeled timestamps.
//!
//! Arithmetic runs on floating-point epoch seconds; derived instants are
//! rounded to the microsecond and reported in UTC. Durations are broken
//! down like a conventional duration display: whole days (floored, so
//! possibly negative) plus a non-negative remainder of seconds.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::descriptive::percentile;
use super::METRICS_KEY;
use crate::error::{Error, Result};

const MICROS_PER_SECOND: i128 = 1_000_000;
const MICROS_PER_DAY: i128 = 86_400 * MICROS_PER_SECOND;

/// Legacy v1.1 `created_at` layout, e.g. `Mon Mar 16 11:19:30 +0000 2009`.
pub const LEGACY_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Signed offset in days plus remainder seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDelta {
    pub days: i64,
    pub seconds: i64,
}

/// Distance between the latest and earliest instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub days: i64,
    pub seconds: i64,
    pub microseconds: i64,
}

/// Split a signed microsecond count into days / seconds / microseconds.
fn decompose(total_micros: i128) -> (i64, i64, i64) {
    let days = total_micros.div_euclid(MICROS_PER_DAY);
    let rest = total_micros.rem_euclid(MICROS_PER_DAY);
    (
        days as i64,
        (rest / MICROS_PER_SECOND) as i64,
        (rest % MICROS_PER_SECOND) as i64,
    )
}

impl DayDelta {
    fn from_micros(total: i128) -> Self {
        let (days, seconds, _) = decompose(total);
        Self { days, seconds }
    }
}

impl Span {
    fn from_micros(total: i128) -> Self {
        let (days, seconds, microseconds) = decompose(total);
        Self {
            days,
            seconds,
            microseconds,
        }
    }
}

/// Metrics section of [`DatedMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatetimeMetrics {
    pub deviation_from_mean: IndexMap<String, DayDelta>,
    pub deviation_from_median: IndexMap<String, DayDelta>,
    pub time_span: Span,
    pub mean: String,
    pub median: String,
    pub max: String,
    pub min: String,
}

/// Labeled ISO-8601 timestamps with their metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatedMetrics {
    #[serde(flatten)]
    pub values: IndexMap<String, String>,
    pub metrics: DatetimeMetrics,
}

/// ISO-8601 rendering with `+HH:MM` offsets; fractional seconds only when
/// present.
pub fn isoformat(dt: &DateTime<FixedOffset>) -> String {
    let format = if dt.timestamp_subsec_micros() == 0 {
        SecondsFormat::Secs
    } else {
        SecondsFormat::Micros
    };
    dt.to_rfc3339_opts(format, false)
}

/// Parse an RFC 3339 or legacy timestamp. Timestamps without an offset are
/// rejected.
pub fn parse_instant(raw: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, LEGACY_FORMAT) {
        return Ok(dt);
    }
    let naive = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(raw, fmt).is_ok());
    if naive {
        Err(Error::validation(format!(
            "timestamp '{raw}' lacks a timezone offset"
        )))
    } else {
        Err(Error::validation(format!("unrecognized timestamp '{raw}'")))
    }
}

fn epoch_micros(dt: &DateTime<FixedOffset>) -> i128 {
    i128::from(dt.timestamp()) * MICROS_PER_SECOND + i128::from(dt.timestamp_subsec_micros())
}

fn epoch_seconds(dt: &DateTime<FixedOffset>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1e6
}

fn instant_from_seconds(seconds: f64) -> Result<DateTime<FixedOffset>> {
    let micros = (seconds * 1e6).round();
    DateTime::<Utc>::from_timestamp_micros(micros as i64)
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| Error::validation(format!("epoch {seconds} is out of range")))
}

/// Attach datetime metrics to a labeled collection of instants.
pub fn add_datetime_metrics(dates: IndexMap<String, DateTime<FixedOffset>>) -> Result<DatedMetrics> {
    if dates.is_empty() {
        return Err(Error::validation("datetime metrics require at least one timestamp"));
    }
    if dates.contains_key(METRICS_KEY) {
        return Err(Error::validation(format!(
            "'{METRICS_KEY}' is reserved and cannot be used as a label"
        )));
    }

    let timestamps: Vec<f64> = dates.values().map(epoch_seconds).collect();
    let mean = instant_from_seconds(timestamps.iter().sum::<f64>() / timestamps.len() as f64)?;

    let mut sorted = timestamps.clone();
    sorted.sort_by(f64::total_cmp);
    let median = instant_from_seconds(percentile(&sorted, 50.0))?;

    let deviations = |pivot: &DateTime<FixedOffset>| -> IndexMap<String, DayDelta> {
        let pivot = epoch_micros(pivot);
        dates
            .iter()
            .map(|(label, dt)| (label.clone(), DayDelta::from_micros(epoch_micros(dt) - pivot)))
            .collect()
    };

    let (Some(max), Some(min)) = (dates.values().max(), dates.values().min()) else {
        return Err(Error::validation("datetime metrics require at least one timestamp"));
    };

    let metrics = DatetimeMetrics {
        deviation_from_mean: deviations(&mean),
        deviation_from_median: deviations(&median),
        time_span: Span::from_micros(epoch_micros(max) - epoch_micros(min)),
        mean: isoformat(&mean),
        median: isoformat(&median),
        max: isoformat(max),
        min: isoformat(min),
    };

    let values = dates
        .iter()
        .map(|(label, dt)| (label.clone(), isoformat(dt)))
        .collect();

    Ok(DatedMetrics { values, metrics })
}
