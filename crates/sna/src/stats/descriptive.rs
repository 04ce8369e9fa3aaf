//! Descriptive statistics over labeled numeric values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::METRICS_KEY;
use crate::error::{Error, Result};

/// Fixed set of descriptive metrics.
///
/// `max` and `min` echo the caller's numbers exactly; everything else is
/// computed in `f64`. Standard deviation and variance are population
/// statistics. Percentiles (and therefore median and IQR) use linear
/// interpolation between closest ranks: `rank = p / 100 * (n - 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveMetrics {
    pub max: Number,
    pub min: Number,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub var: f64,
    pub range: f64,
    #[serde(rename = "IQR")]
    pub iqr: f64,
    /// Mean absolute deviation from the mean.
    pub mad: f64,
}

fn as_float(number: &Number) -> Result<f64> {
    number
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::validation(format!("{number} is not a finite number")))
}

impl DescriptiveMetrics {
    pub fn compute(values: &[Number]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::validation("descriptive metrics require at least one value"));
        }
        let floats = values.iter().map(as_float).collect::<Result<Vec<f64>>>()?;

        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| floats[a].total_cmp(&floats[b]));
        let sorted: Vec<f64> = order.iter().map(|&i| floats[i]).collect();
        let (lowest, highest) = (order[0], order[order.len() - 1]);

        let n = floats.len() as f64;
        let mean = floats.iter().sum::<f64>() / n;
        let var = floats.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let mad = floats.iter().map(|v| (v - mean).abs()).sum::<f64>() / n;

        Ok(Self {
            max: values[highest].clone(),
            min: values[lowest].clone(),
            mean,
            median: percentile(&sorted, 50.0),
            std: var.sqrt(),
            var,
            range: floats[highest] - floats[lowest],
            iqr: percentile(&sorted, 75.0) - percentile(&sorted, 25.0),
            mad,
        })
    }
}

/// Linearly interpolated percentile of an ascending, non-empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Labeled values plus their metrics, serialized side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Described {
    #[serde(flatten)]
    pub values: IndexMap<String, Number>,
    pub metrics: DescriptiveMetrics,
}

/// Attach descriptive metrics to a labeled collection.
///
/// The input is consumed and returned unchanged apart from the added
/// `metrics` entry.
pub fn add_descriptive_metrics(values: IndexMap<String, Number>) -> Result<Described> {
    if values.contains_key(METRICS_KEY) {
        return Err(Error::validation(format!(
            "'{METRICS_KEY}' is reserved and cannot be used as a label"
        )));
    }
    let numbers: Vec<Number> = values.values().cloned().collect();
    let metrics = DescriptiveMetrics::compute(&numbers)?;
    Ok(Described { values, metrics })
}

/// Read a JSON value as a number, keeping its exact representation.
pub fn number(value: &Value, field: &str) -> Result<Number> {
    match value {
        Value::Number(number) => Ok(number.clone()),
        other => Err(Error::validation(format!(
            "only numeric values are allowed, '{field}' is {other}"
        ))),
    }
}

/// Read a JSON value as an `f64`, failing on anything else.
pub fn numeric(value: &Value, field: &str) -> Result<f64> {
    value.as_f64().ok_or_else(|| {
        Error::validation(format!(
            "only numeric values are allowed, '{field}' is {value}"
        ))
    })
}
