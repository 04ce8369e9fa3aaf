//! Wire types and lookup outcomes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::stats::Record;

/// Body of a v2 listing response.
#[derive(Debug, Default, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default)]
    pub includes: Option<Includes>,
    #[serde(default)]
    pub meta: Option<Meta>,
}

/// Expanded objects attached to a v2 response.
#[derive(Debug, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub users: Option<Vec<Value>>,
}

/// Pagination metadata of a v2 listing.
#[derive(Debug, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub result_count: Option<u64>,
}

/// Body of a v2 single-object lookup.
#[derive(Debug, Default, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub includes: Option<Includes>,
    #[serde(default)]
    pub errors: Option<Vec<ApiProblem>>,
}

/// One entry of an `errors` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiProblem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiProblem {
    fn text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or_default(),
            self.detail.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Why an entity cannot be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailability {
    Suspended,
    NotFound,
}

impl Unavailability {
    /// Recognize the documented error texts; anything else is not ours to
    /// interpret.
    pub fn detect(problems: &[ApiProblem]) -> Option<Self> {
        let texts: Vec<String> = problems.iter().map(ApiProblem::text).collect();
        if texts.iter().any(|t| t.contains("suspended")) {
            Some(Self::Suspended)
        } else if texts
            .iter()
            .any(|t| t.contains("not found") || t.contains("could not find"))
        {
            Some(Self::NotFound)
        } else {
            None
        }
    }

    /// Result marker, e.g. `{"suspended": true}`.
    #[must_use]
    pub fn marker(self) -> Value {
        match self {
            Self::Suspended => json!({ "suspended": true }),
            Self::NotFound => json!({ "not_found": true }),
        }
    }
}

impl std::fmt::Display for Unavailability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Suspended => "suspended",
            Self::NotFound => "not found",
        })
    }
}

/// Outcome of an entity lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Unavailable(Unavailability),
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Unavailable(_) => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Flatten a v2 object into a [`Record`]: `public_metrics` children are
/// hoisted to the top level next to the object's own fields.
pub fn flatten_record(value: Value) -> Record {
    let mut record = match value {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    if let Some(Value::Object(metrics)) = record.remove("public_metrics") {
        for (key, metric) in metrics {
            record.entry(key).or_insert(metric);
        }
    }
    record
}
