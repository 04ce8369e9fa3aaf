//! Per-entity information and multi-entity comparisons.
//!
//! The [`Analyzer`] resolves each requested attribute or comparison to one
//! retrieval strategy, fetches what it needs through a [`TwitterClient`],
//! and hands the collections to the aggregations in [`crate::stats`].
//! Results are plain JSON values so any output layer can consume them.

mod attributes;

pub use attributes::{
    parse_list, Named, TweetAttribute, TweetComparison, UserAttribute, UserComparison,
};

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::{Error, Result};
use crate::resolve::EntityRef;
use crate::stats::descriptive::number;
use crate::stats::{
    add_datetime_metrics, add_descriptive_metrics, difference, intersection, overlap_ranking,
    parse_instant, rank_by_distance, PairKey, Record,
};
use crate::twitter::{Listing, Lookup, SubjectKind, TwitterClient};

/// Record field holding an entity's natural identifier.
pub const ID_FIELD: &str = "id";

type Records = IndexMap<String, Lookup<Record>>;
type LabeledSets = IndexMap<String, HashSet<String>>;

/// Time of the request, `YYYY-MM-DD HH:MM:SS.ffffff` in UTC.
fn utc_timestamp() -> Value {
    json!(Utc::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string())
}

/// IDs as a JSON array, numeric order for numeric IDs.
fn sorted_ids<I: IntoIterator<Item = String>>(ids: I) -> Value {
    let mut ids: Vec<String> = ids.into_iter().collect();
    ids.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    json!(ids)
}

/// Pair-keyed ranking as an ordered JSON object.
pub fn ranking_to_json<V: Into<Value>>(ranking: Vec<(PairKey, V)>) -> Value {
    let map: Map<String, Value> = ranking
        .into_iter()
        .map(|(pair, value)| (pair.encode(), value.into()))
        .collect();
    Value::Object(map)
}

fn labels(refs: &[EntityRef], what: &str) -> Result<Vec<String>> {
    if refs.len() < 2 {
        return Err(Error::validation(format!(
            "{what} list must contain at least two elements, {} provided",
            refs.len()
        )));
    }
    let labels: Vec<String> = refs.iter().map(EntityRef::label).collect();
    let unique: HashSet<&String> = labels.iter().collect();
    if unique.len() != labels.len() {
        return Err(Error::validation(format!("{what} list contains duplicates")));
    }
    Ok(labels)
}

fn available<'r>(records: &'r Records, label: &str) -> Result<&'r Record> {
    match records.get(label) {
        Some(Lookup::Found(record)) => Ok(record),
        Some(Lookup::Unavailable(reason)) => {
            Err(Error::validation(format!("'{label}' is {reason}")))
        }
        None => Err(Error::validation(format!("no record fetched for '{label}'"))),
    }
}

/// Descriptive metrics of `field` across all records.
fn numeric_comparison(records: &Records, field: &str) -> Result<Value> {
    let mut values = IndexMap::with_capacity(records.len());
    for label in records.keys() {
        let record = available(records, label)?;
        let value = record
            .get(field)
            .ok_or_else(|| Error::validation(format!("'{label}' has no '{field}'")))?;
        values.insert(label.clone(), number(value, field)?);
    }
    Ok(serde_json::to_value(add_descriptive_metrics(values)?)?)
}

/// Datetime metrics of the timestamp `field` across all records.
fn datetime_comparison(records: &Records, field: &str) -> Result<Value> {
    let mut dates = IndexMap::with_capacity(records.len());
    for label in records.keys() {
        let record = available(records, label)?;
        let raw = record
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation(format!("'{label}' has no timestamp '{field}'")))?;
        dates.insert(label.clone(), parse_instant(raw)?);
    }
    Ok(serde_json::to_value(add_datetime_metrics(dates)?)?)
}

/// `field` per record; unavailable entities show their marker.
fn field_comparison(records: &Records, field: &str) -> Value {
    let map: Map<String, Value> = records
        .iter()
        .map(|(label, lookup)| {
            let value = match lookup {
                Lookup::Found(record) => record.get(field).cloned().unwrap_or(Value::Null),
                Lookup::Unavailable(reason) => reason.marker(),
            };
            (label.clone(), value)
        })
        .collect();
    Value::Object(map)
}

fn fetched(sets: &HashMap<Listing, LabeledSets>, listing: Listing) -> Result<&LabeledSets> {
    sets.get(&listing)
        .ok_or_else(|| Error::validation(format!("{listing:?} was not fetched")))
}

fn common(sets: &LabeledSets) -> Result<Value> {
    Ok(sorted_ids(intersection(sets.values().cloned())?))
}

fn distinct(sets: &LabeledSets) -> Result<Value> {
    let map: Map<String, Value> = difference(sets)?
        .into_iter()
        .map(|(label, ids)| (label, sorted_ids(ids)))
        .collect();
    Ok(Value::Object(map))
}

fn overlap(sets: &LabeledSets) -> Result<Value> {
    Ok(ranking_to_json(overlap_ranking(sets)?))
}

impl UserComparison {
    /// Record field read by this comparison, if it reads one.
    fn record_field(self) -> Option<&'static str> {
        match self {
            Self::FollowersCount => Some("followers_count"),
            Self::FolloweesCount => Some("following_count"),
            Self::TweetsCount => Some("tweet_count"),
            Self::ListedCount => Some("listed_count"),
            Self::FavouritesCount => Some("like_count"),
            Self::CreatedAt => Some("created_at"),
            Self::Protected => Some("protected"),
            Self::Verified => Some("verified"),
            _ => None,
        }
    }

    /// Listing whose complete ID sets this comparison consumes.
    fn listing(self) -> Option<Listing> {
        match self {
            Self::CommonFollowers | Self::DistinctFollowers | Self::FollowersSimilarity => {
                Some(Listing::Followers)
            }
            Self::CommonFollowees | Self::DistinctFollowees | Self::FolloweesSimilarity => {
                Some(Listing::Followees)
            }
            _ => None,
        }
    }
}

impl TweetComparison {
    fn record_field(self) -> Option<&'static str> {
        match self {
            Self::ViewCount => Some("impression_count"),
            Self::LikeCount => Some("like_count"),
            Self::RetweetCount => Some("retweet_count"),
            Self::QuoteCount => Some("quote_count"),
            Self::ReplyCount => Some("reply_count"),
            Self::CreatedAt => Some("created_at"),
            _ => None,
        }
    }

    fn listing(self) -> Option<Listing> {
        match self {
            Self::CommonQuotingUsers | Self::DistinctQuotingUsers => Some(Listing::QuotingUsers),
            Self::CommonLikingUsers | Self::DistinctLikingUsers => Some(Listing::LikingUsers),
            Self::CommonRetweeters | Self::DistinctRetweeters => Some(Listing::Retweeters),
            _ => None,
        }
    }
}

/// Runs attribute lookups and comparisons against one client.
pub struct Analyzer<'a> {
    client: &'a TwitterClient,
    limit: Option<usize>,
    timestamp: bool,
}

impl<'a> Analyzer<'a> {
    #[must_use]
    pub fn new(client: &'a TwitterClient) -> Self {
        Self {
            client,
            limit: None,
            timestamp: false,
        }
    }

    /// Cap every paginated listing at `limit` items.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Add a `utc_timestamp` entry to comparison results.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    fn finish(&self, mut results: Map<String, Value>) -> Value {
        if self.timestamp {
            results.insert("utc_timestamp".to_string(), utc_timestamp());
        }
        Value::Object(results)
    }

    async fn listing_ids(&self, listing: Listing, subject: &EntityRef) -> Result<Value> {
        let ids = self.client.list_ids(listing, subject, self.limit).await?;
        Ok(json!(ids))
    }

    async fn fetch_records(&self, kind: SubjectKind, refs: &[EntityRef]) -> Result<Records> {
        let mut records = IndexMap::with_capacity(refs.len());
        for entity in refs {
            let lookup = match kind {
                SubjectKind::User => self.client.lookup_user(entity).await?,
                SubjectKind::Tweet => self.client.lookup_tweet(entity).await?,
            };
            records.insert(entity.label(), lookup);
        }
        Ok(records)
    }

    async fn fetch_sets(&self, listing: Listing, refs: &[EntityRef]) -> Result<LabeledSets> {
        let mut sets = IndexMap::with_capacity(refs.len());
        for entity in refs {
            let ids = self.client.list_ids(listing, entity, self.limit).await?;
            info!(listing = ?listing, entity = %entity, count = ids.len(), "Collected listing");
            sets.insert(entity.label(), ids.into_iter().collect());
        }
        Ok(sets)
    }

    async fn fetch_all_sets<I>(
        &self,
        listings: I,
        refs: &[EntityRef],
    ) -> Result<HashMap<Listing, LabeledSets>>
    where
        I: IntoIterator<Item = Listing>,
    {
        let mut all = HashMap::new();
        for listing in listings {
            if !all.contains_key(&listing) {
                let sets = self.fetch_sets(listing, refs).await?;
                all.insert(listing, sets);
            }
        }
        Ok(all)
    }

    /// Requested information about one user.
    ///
    /// A suspended or missing user yields the unavailability marker instead
    /// of attributes.
    pub async fn user_info(
        &self,
        user: &EntityRef,
        attributes: &[UserAttribute],
    ) -> Result<Value> {
        let record = match self.client.lookup_user(user).await? {
            Lookup::Found(record) => record,
            Lookup::Unavailable(reason) => return Ok(reason.marker()),
        };
        // Listings need the numeric ID; reuse the one we just fetched.
        let subject = match record.get(ID_FIELD).and_then(Value::as_str) {
            Some(id) => EntityRef::classify(id),
            None => user.clone(),
        };

        let mut info = Map::new();
        for attribute in attributes {
            let value = match attribute {
                UserAttribute::Field(name) => record
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::validation(format!("Invalid attribute for {name}")))?,
                UserAttribute::Followers => self.listing_ids(Listing::Followers, &subject).await?,
                UserAttribute::Followees => self.listing_ids(Listing::Followees, &subject).await?,
                UserAttribute::LikedTweets => {
                    self.listing_ids(Listing::LikedTweets, &subject).await?
                }
                UserAttribute::ComposedTweets => {
                    self.listing_ids(Listing::ComposedTweets, &subject).await?
                }
                UserAttribute::LatestActivity => self
                    .client
                    .latest_activity(&subject)
                    .await?
                    .unwrap_or(Value::Null),
                UserAttribute::UtcTimestamp => utc_timestamp(),
            };
            info.insert(attribute.as_str().to_string(), value);
        }
        Ok(Value::Object(info))
    }

    /// Requested information about one tweet.
    pub async fn tweet_info(
        &self,
        tweet: &EntityRef,
        attributes: &[TweetAttribute],
    ) -> Result<Value> {
        let record = match self.client.lookup_tweet(tweet).await? {
            Lookup::Found(record) => record,
            Lookup::Unavailable(reason) => {
                let mut marker = reason.marker();
                if attributes.contains(&TweetAttribute::Available) {
                    marker["available"] = json!(false);
                }
                return Ok(marker);
            }
        };

        let mut info = Map::new();
        for attribute in attributes {
            let value = match attribute {
                TweetAttribute::Field(name) => record
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::validation(format!("Invalid attribute for {name}")))?,
                TweetAttribute::AuthorInfo => record.get("author").cloned().unwrap_or(Value::Null),
                TweetAttribute::Retweeters => self.listing_ids(Listing::Retweeters, tweet).await?,
                TweetAttribute::LikingUsers => self.listing_ids(Listing::LikingUsers, tweet).await?,
                TweetAttribute::QuotingUsers => {
                    self.listing_ids(Listing::QuotingUsers, tweet).await?
                }
                TweetAttribute::Available => json!(true),
                TweetAttribute::ViewCount => record
                    .get("impression_count")
                    .cloned()
                    .unwrap_or(Value::Null),
                TweetAttribute::UtcTimestamp => utc_timestamp(),
            };
            info.insert(attribute.as_str().to_string(), value);
        }
        Ok(Value::Object(info))
    }

    /// Compare two or more users.
    pub async fn compare_users(
        &self,
        users: &[EntityRef],
        comparisons: &[UserComparison],
    ) -> Result<Value> {
        labels(users, "users")?;

        let records = if comparisons.iter().any(|c| c.record_field().is_some()) {
            self.fetch_records(SubjectKind::User, users).await?
        } else {
            Records::new()
        };
        let sets = self
            .fetch_all_sets(comparisons.iter().filter_map(|c| c.listing()), users)
            .await?;
        let sets_for = |listing| fetched(&sets, listing);

        let mut results = Map::new();
        for comparison in comparisons {
            info!(comparison = %comparison, users = users.len(), "Comparing users");
            let value = match comparison {
                UserComparison::Relationship => self.relationships(users).await?,
                UserComparison::FollowersCount
                | UserComparison::FolloweesCount
                | UserComparison::TweetsCount
                | UserComparison::ListedCount
                | UserComparison::FavouritesCount => {
                    let field = comparison.record_field().unwrap_or_default();
                    numeric_comparison(&records, field)?
                }
                UserComparison::CreatedAt => datetime_comparison(&records, "created_at")?,
                UserComparison::Protected => field_comparison(&records, "protected"),
                UserComparison::Verified => field_comparison(&records, "verified"),
                UserComparison::CommonFollowers => common(sets_for(Listing::Followers)?)?,
                UserComparison::DistinctFollowers => distinct(sets_for(Listing::Followers)?)?,
                UserComparison::CommonFollowees => common(sets_for(Listing::Followees)?)?,
                UserComparison::DistinctFollowees => distinct(sets_for(Listing::Followees)?)?,
                UserComparison::FollowersSimilarity => overlap(sets_for(Listing::Followers)?)?,
                UserComparison::FolloweesSimilarity => overlap(sets_for(Listing::Followees)?)?,
            };
            results.insert(comparison.as_str().to_string(), value);
        }
        Ok(self.finish(results))
    }

    /// Compare two or more tweets.
    pub async fn compare_tweets(
        &self,
        tweets: &[EntityRef],
        comparisons: &[TweetComparison],
    ) -> Result<Value> {
        labels(tweets, "tweets")?;

        let records = if comparisons.iter().any(|c| c.record_field().is_some()) {
            self.fetch_records(SubjectKind::Tweet, tweets).await?
        } else {
            Records::new()
        };
        let sets = self
            .fetch_all_sets(comparisons.iter().filter_map(|c| c.listing()), tweets)
            .await?;

        let mut results = Map::new();
        for comparison in comparisons {
            info!(comparison = %comparison, tweets = tweets.len(), "Comparing tweets");
            let value = match (comparison.record_field(), comparison.listing()) {
                (Some("created_at"), _) => datetime_comparison(&records, "created_at")?,
                (Some(field), _) => numeric_comparison(&records, field)?,
                (None, Some(listing)) => {
                    let labeled = fetched(&sets, listing)?;
                    match comparison {
                        TweetComparison::CommonQuotingUsers
                        | TweetComparison::CommonLikingUsers
                        | TweetComparison::CommonRetweeters => common(labeled)?,
                        _ => distinct(labeled)?,
                    }
                }
                (None, None) => {
                    return Err(Error::validation(format!(
                        "Invalid comparison attribute for {comparison}"
                    )))
                }
            };
            results.insert(comparison.as_str().to_string(), value);
        }
        Ok(self.finish(results))
    }

    /// Directional relationship for every ordered pair of distinct users.
    async fn relationships(&self, users: &[EntityRef]) -> Result<Value> {
        let mut pairs = Vec::with_capacity(users.len() * (users.len() - 1));
        for source in users {
            for target in users {
                if source != target {
                    let relationship = self.client.relationship(source, target).await?;
                    pairs.push((PairKey::new(source.label(), target.label()), relationship));
                }
            }
        }
        Ok(ranking_to_json(pairs))
    }

    /// Rank every pair of users or tweets by Euclidean distance over
    /// `features`, closest first.
    pub async fn similarity(
        &self,
        kind: SubjectKind,
        refs: &[EntityRef],
        features: &[&str],
    ) -> Result<Vec<(PairKey, f64)>> {
        if features.len() < 2 {
            return Err(Error::validation(format!(
                "at least two features are required, {} provided",
                features.len()
            )));
        }
        labels(refs, "entities")?;

        let records = self.fetch_records(kind, refs).await?;
        let items = records
            .keys()
            .map(|label| available(&records, label).cloned())
            .collect::<Result<Vec<_>>>()?;
        rank_by_distance(&items, features, ID_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::descriptive::DescriptiveMetrics;
    use crate::twitter::Unavailability;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn user(id: &str, followers: u64, created_at: &str, verified: bool) -> Lookup<Record> {
        Lookup::Found(record(json!({
            "id": id,
            "followers_count": followers,
            "created_at": created_at,
            "verified": verified
        })))
    }

    fn records() -> Records {
        IndexMap::from([
            ("1".to_string(), user("1", 150, "2009-03-16T11:19:30.000Z", true)),
            ("2".to_string(), user("2", 23, "2009-05-06T13:49:31.000Z", false)),
            ("3".to_string(), user("3", 78, "2010-06-27T19:10:20.000Z", false)),
        ])
    }

    #[test]
    fn test_numeric_comparison_attaches_metrics() {
        let value = numeric_comparison(&records(), "followers_count").unwrap();
        assert_eq!(value["1"], json!(150));
        let metrics: DescriptiveMetrics = serde_json::from_value(value["metrics"].clone()).unwrap();
        assert_eq!(metrics.max, serde_json::Number::from(150));
        assert!((metrics.median - 78.0).abs() < 1e-9);
    }

    #[test]
    fn test_unavailable_entity_fails_numeric_comparison() {
        let mut recs = records();
        recs.insert("4".to_string(), Lookup::Unavailable(Unavailability::Suspended));
        let err = numeric_comparison(&recs, "followers_count").unwrap_err();
        assert!(err.to_string().contains("suspended"));
    }

    #[test]
    fn test_field_comparison_marks_unavailable() {
        let mut recs = records();
        recs.insert("4".to_string(), Lookup::Unavailable(Unavailability::NotFound));
        let value = field_comparison(&recs, "verified");
        assert_eq!(value["1"], json!(true));
        assert_eq!(value["4"], json!({"not_found": true}));
    }

    #[test]
    fn test_datetime_comparison() {
        let value = datetime_comparison(&records(), "created_at").unwrap();
        assert_eq!(value["metrics"]["median"], json!("2009-05-06T13:49:31+00:00"));
        assert_eq!(value["metrics"]["mean"], json!("2009-09-05T14:46:27+00:00"));
    }

    #[test]
    fn test_set_comparisons() {
        let sets: LabeledSets = IndexMap::from([
            ("a".to_string(), ["1", "3", "5", "7"].map(String::from).into()),
            ("b".to_string(), ["3", "6", "7", "9"].map(String::from).into()),
            ("c".to_string(), ["0", "3", "7"].map(String::from).into()),
        ]);
        assert_eq!(common(&sets).unwrap(), json!(["3", "7"]));
        assert_eq!(
            distinct(&sets).unwrap(),
            json!({"a": ["1", "5"], "b": ["6", "9"], "c": ["0"]})
        );
        assert_eq!(overlap(&sets).unwrap()["(a, b)"], json!(2));
    }

    #[test]
    fn test_sorted_ids_numeric_order() {
        let ids = ["100", "9", "23"].map(String::from);
        assert_eq!(sorted_ids(ids), json!(["9", "23", "100"]));
    }

    #[test]
    fn test_labels_validation() {
        assert!(labels(&[EntityRef::from(1_u64)], "users").is_err());
        assert!(labels(&[EntityRef::from(1_u64), EntityRef::classify("1")], "users").is_err());
        assert_eq!(
            labels(&[EntityRef::from(1_u64), EntityRef::classify("jack")], "users").unwrap(),
            vec!["1", "jack"]
        );
    }
}
