//! Aggregations over fetched collections. Nothing here performs I/O.

pub mod datetime;
pub mod descriptive;
pub mod pair;
pub mod sets;
pub mod similarity;

/// Key under which computed metrics sit next to caller labels.
pub const METRICS_KEY: &str = "metrics";

pub use datetime::{add_datetime_metrics, parse_instant, DatedMetrics, DayDelta, Span};
pub use descriptive::{add_descriptive_metrics, Described, DescriptiveMetrics};
pub use pair::PairKey;
pub use sets::{difference, intersection, overlap_ranking};
pub use similarity::{rank_by_distance, Record};
