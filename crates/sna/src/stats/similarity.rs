//! Euclidean-distance ranking of entities over numeric features.

use serde_json::{Map, Value};

use super::descriptive::numeric;
use super::pair::PairKey;
use crate::error::{Error, Result};

/// Flat attribute mapping of a fetched user or tweet.
pub type Record = Map<String, Value>;

/// Feature vector of `record`, in `features` order.
fn feature_vector(record: &Record, features: &[&str]) -> Result<Vec<f64>> {
    features
        .iter()
        .map(|feature| {
            let value = record.get(*feature).ok_or_else(|| {
                Error::validation(format!("feature '{feature}' is missing from record"))
            })?;
            numeric(value, feature)
        })
        .collect()
}

/// Label of a record: its `id_field` rendered as a string.
fn record_label(record: &Record, id_field: &str) -> Result<String> {
    match record.get(id_field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(Error::validation(format!(
            "record has no usable '{id_field}' field"
        ))),
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Distance between every unordered pair `(i, j)`, `i < j`, closest first.
///
/// Requires at least two features, each numeric on every item. Equal
/// distances keep pair enumeration order.
pub fn rank_by_distance(items: &[Record], features: &[&str], id_field: &str) -> Result<Vec<(PairKey, f64)>> {
    if features.len() < 2 {
        return Err(Error::validation(format!(
            "at least two features are required, {} provided",
            features.len()
        )));
    }
    if items.len() < 2 {
        return Err(Error::validation(format!(
            "at least two items are required, {} provided",
            items.len()
        )));
    }

    let labeled = items
        .iter()
        .map(|item| -> Result<(String, Vec<f64>)> {
            Ok((record_label(item, id_field)?, feature_vector(item, features)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut distances = Vec::with_capacity(labeled.len() * (labeled.len() - 1) / 2);
    for (i, (label_i, vec_i)) in labeled.iter().enumerate() {
        for (label_j, vec_j) in &labeled[i + 1..] {
            distances.push((
                PairKey::new(label_i.as_str(), label_j.as_str()),
                euclidean(vec_i, vec_j),
            ));
        }
    }
    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    Ok(distances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn users() -> Vec<Record> {
        vec![
            record(json!({"id": 1, "followers_count": 0, "following_count": 0})),
            record(json!({"id": 2, "followers_count": 3, "following_count": 4})),
            record(json!({"id": 3, "followers_count": 1, "following_count": 2})),
        ]
    }

    #[test]
    fn test_closest_pair_first() {
        let ranked = rank_by_distance(&users(), &["followers_count", "following_count"], "id").unwrap();
        let keys: Vec<_> = ranked.iter().map(|(k, _)| k.encode()).collect();
        assert_eq!(keys, vec!["(1, 3)", "(2, 3)", "(1, 2)"]);
        assert!((ranked[2].1 - 5.0).abs() < 1e-12);
        assert!(ranked.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let items = vec![
            record(json!({"id": "a", "x": 0, "y": 0})),
            record(json!({"id": "b", "x": 1, "y": 0})),
            record(json!({"id": "c", "x": 2, "y": 0})),
        ];
        let ranked = rank_by_distance(&items, &["x", "y"], "id").unwrap();
        assert_eq!(ranked[0].0, PairKey::new("a", "b"));
        assert_eq!(ranked[1].0, PairKey::new("b", "c"));
        assert_eq!(ranked[2].0, PairKey::new("a", "c"));
    }

    #[test]
    fn test_single_feature_rejected() {
        let err = rank_by_distance(&users(), &["only_one"], "id").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let mut items = users();
        items[1].insert("following_count".to_string(), json!("many"));
        let err = rank_by_distance(&items, &["followers_count", "following_count"], "id").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_missing_feature_rejected() {
        let err = rank_by_distance(&users(), &["followers_count", "listed_count"], "id").unwrap_err();
        assert!(err.to_string().contains("listed_count"));
    }
}
