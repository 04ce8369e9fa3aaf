//! Ordered pair of entity labels used as a result key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Ordered 2-tuple of distinct labels.
///
/// Serializes as `"(first, second)"` so pair-keyed maps survive JSON. Commas,
/// parentheses and backslashes inside a label are escaped with `\`, which
/// keeps [`PairKey::encode`] and [`PairKey::decode`] inverse to each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub first: String,
    pub second: String,
}

impl PairKey {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    /// The same pair in the opposite direction.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::new(self.second.clone(), self.first.clone())
    }

    #[must_use]
    pub fn encode(&self) -> String {
        format!("({}, {})", escape(&self.first), escape(&self.second))
    }

    pub fn decode(encoded: &str) -> Result<Self, Error> {
        let malformed = || Error::validation(format!("malformed pair key: {encoded}"));
        let inner = encoded
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .ok_or_else(malformed)?;

        let mut parts = Vec::with_capacity(2);
        let mut current = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => current.push(chars.next().ok_or_else(malformed)?),
                ',' => {
                    parts.push(std::mem::take(&mut current));
                    // separator is ", "
                    if chars.next() != Some(' ') {
                        return Err(malformed());
                    }
                }
                '(' | ')' => return Err(malformed()),
                other => current.push(other),
            }
        }
        parts.push(current);

        match <[String; 2]>::try_from(parts) {
            Ok([first, second]) => Ok(Self { first, second }),
            Err(_) => Err(malformed()),
        }
    }
}

fn escape(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if matches!(c, '\\' | ',' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for PairKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for PairKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for PairKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::decode(&raw).map_err(serde::de::Error::custom)
    }
}
