//! Closed registries of requestable attributes and comparisons.
//!
//! Each name a caller can ask for maps to exactly one variant; the
//! [`crate::analysis::Analyzer`] owns the strategy behind each variant.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Enums whose unit variants are addressable by name.
pub trait Named: Sized + Clone + 'static {
    /// Every named variant, in documentation order.
    const ALL: &'static [Self];

    fn as_str(&self) -> &str;

    /// Look up a variant by name.
    fn lookup(name: &str) -> Option<Self> {
        Self::ALL.iter().find(|v| v.as_str() == name).cloned()
    }

    /// All names, for help output.
    fn names() -> Vec<String> {
        Self::ALL.iter().map(|v| v.as_str().to_string()).collect()
    }
}

/// Information that can be requested about a single user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserAttribute {
    /// IDs of all followers.
    Followers,
    /// IDs of all accounts the user follows.
    Followees,
    LikedTweets,
    ComposedTweets,
    /// Most recent timeline entry.
    LatestActivity,
    /// Time of the request.
    UtcTimestamp,
    /// Any field of the user record, e.g. `followers_count`.
    Field(String),
}

impl Named for UserAttribute {
    const ALL: &'static [Self] = &[
        Self::Followers,
        Self::Followees,
        Self::LikedTweets,
        Self::ComposedTweets,
        Self::LatestActivity,
        Self::UtcTimestamp,
    ];

    fn as_str(&self) -> &str {
        match self {
            Self::Followers => "followers",
            Self::Followees => "followees",
            Self::LikedTweets => "liked_tweets",
            Self::ComposedTweets => "composed_tweets",
            Self::LatestActivity => "latest_activity",
            Self::UtcTimestamp => "utc_timestamp",
            Self::Field(name) => name,
        }
    }
}

/// Information that can be requested about a single tweet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TweetAttribute {
    /// Record of the tweet's author.
    AuthorInfo,
    Retweeters,
    LikingUsers,
    QuotingUsers,
    /// Whether the tweet can still be retrieved.
    Available,
    /// Impression count.
    ViewCount,
    UtcTimestamp,
    /// Any field of the tweet record, e.g. `retweet_count`.
    Field(String),
}

impl Named for TweetAttribute {
    const ALL: &'static [Self] = &[
        Self::AuthorInfo,
        Self::Retweeters,
        Self::LikingUsers,
        Self::QuotingUsers,
        Self::Available,
        Self::ViewCount,
        Self::UtcTimestamp,
    ];

    fn as_str(&self) -> &str {
        match self {
            Self::AuthorInfo => "author_info",
            Self::Retweeters => "retweeters",
            Self::LikingUsers => "liking_users",
            Self::QuotingUsers => "quoting_users",
            Self::Available => "available",
            Self::ViewCount => "view_count",
            Self::UtcTimestamp => "utc_timestamp",
            Self::Field(name) => name,
        }
    }
}

/// Comparisons across two or more users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserComparison {
    Relationship,
    FollowersCount,
    FolloweesCount,
    TweetsCount,
    ListedCount,
    FavouritesCount,
    CommonFollowers,
    DistinctFollowers,
    CommonFollowees,
    DistinctFollowees,
    FollowersSimilarity,
    FolloweesSimilarity,
    CreatedAt,
    Protected,
    Verified,
}

impl Named for UserComparison {
    const ALL: &'static [Self] = &[
        Self::Relationship,
        Self::FollowersCount,
        Self::FolloweesCount,
        Self::TweetsCount,
        Self::ListedCount,
        Self::FavouritesCount,
        Self::CommonFollowers,
        Self::DistinctFollowers,
        Self::CommonFollowees,
        Self::DistinctFollowees,
        Self::FollowersSimilarity,
        Self::FolloweesSimilarity,
        Self::CreatedAt,
        Self::Protected,
        Self::Verified,
    ];

    fn as_str(&self) -> &str {
        match self {
            Self::Relationship => "relationship",
            Self::FollowersCount => "followers_count",
            Self::FolloweesCount => "followees_count",
            Self::TweetsCount => "tweets_count",
            Self::ListedCount => "listed_count",
            Self::FavouritesCount => "favourites_count",
            Self::CommonFollowers => "common_followers",
            Self::DistinctFollowers => "distinct_followers",
            Self::CommonFollowees => "common_followees",
            Self::DistinctFollowees => "distinct_followees",
            Self::FollowersSimilarity => "followers_similarity",
            Self::FolloweesSimilarity => "followees_similarity",
            Self::CreatedAt => "created_at",
            Self::Protected => "protected",
            Self::Verified => "verified",
        }
    }
}

/// Comparisons across two or more tweets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweetComparison {
    ViewCount,
    LikeCount,
    RetweetCount,
    QuoteCount,
    ReplyCount,
    CommonQuotingUsers,
    DistinctQuotingUsers,
    CommonLikingUsers,
    DistinctLikingUsers,
    CommonRetweeters,
    DistinctRetweeters,
    CreatedAt,
}

impl Named for TweetComparison {
    const ALL: &'static [Self] = &[
        Self::ViewCount,
        Self::LikeCount,
        Self::RetweetCount,
        Self::QuoteCount,
        Self::ReplyCount,
        Self::CommonQuotingUsers,
        Self::DistinctQuotingUsers,
        Self::CommonLikingUsers,
        Self::DistinctLikingUsers,
        Self::CommonRetweeters,
        Self::DistinctRetweeters,
        Self::CreatedAt,
    ];

    fn as_str(&self) -> &str {
        match self {
            Self::ViewCount => "view_count",
            Self::LikeCount => "like_count",
            Self::RetweetCount => "retweet_count",
            Self::QuoteCount => "quote_count",
            Self::ReplyCount => "reply_count",
            Self::CommonQuotingUsers => "common_quoting_users",
            Self::DistinctQuotingUsers => "distinct_quoting_users",
            Self::CommonLikingUsers => "common_liking_users",
            Self::DistinctLikingUsers => "distinct_liking_users",
            Self::CommonRetweeters => "common_retweeters",
            Self::DistinctRetweeters => "distinct_retweeters",
            Self::CreatedAt => "created_at",
        }
    }
}

fn parse_field_name(name: &str) -> Result<String, Error> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name.to_string())
    } else {
        Err(Error::validation(format!("Invalid attribute for {name}")))
    }
}

impl FromStr for UserAttribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match Self::lookup(s) {
            Some(known) => Ok(known),
            None => parse_field_name(s).map(Self::Field),
        }
    }
}

impl FromStr for TweetAttribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match Self::lookup(s) {
            Some(known) => Ok(known),
            None => parse_field_name(s).map(Self::Field),
        }
    }
}

impl FromStr for UserComparison {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s.trim())
            .ok_or_else(|| Error::validation(format!("Invalid comparison attribute for {s}")))
    }
}

impl FromStr for TweetComparison {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s.trim())
            .ok_or_else(|| Error::validation(format!("Invalid comparison attribute for {s}")))
    }
}

macro_rules! display_by_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_by_name!(UserAttribute, TweetAttribute, UserComparison, TweetComparison);

/// Parse a comma- or whitespace-separated list of names.
pub fn parse_list<T: FromStr<Err = Error>>(raw: &[String]) -> Result<Vec<T>, Error> {
    raw.iter()
        .flat_map(|chunk| chunk.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_round_trip() {
        for comparison in UserComparison::ALL {
            assert_eq!(&comparison.as_str().parse::<UserComparison>().unwrap(), comparison);
        }
        for comparison in TweetComparison::ALL {
            assert_eq!(&comparison.as_str().parse::<TweetComparison>().unwrap(), comparison);
        }
    }

    #[test]
    fn test_raw_fields_fall_through() {
        assert_eq!(
            "followers_count".parse::<UserAttribute>().unwrap(),
            UserAttribute::Field("followers_count".to_string())
        );
        assert_eq!("followers".parse::<UserAttribute>().unwrap(), UserAttribute::Followers);
        assert_eq!("available".parse::<TweetAttribute>().unwrap(), TweetAttribute::Available);
    }

    #[test]
    fn test_unknown_comparison_rejected() {
        let err = "hair_colour".parse::<UserComparison>().unwrap_err();
        assert!(err.is_validation());
        assert!("bad field!".parse::<UserAttribute>().is_err());
    }

    #[test]
    fn test_parse_list_splits_commas() {
        let raw = vec!["followers_count, verified".to_string(), "protected".to_string()];
        let parsed: Vec<UserComparison> = parse_list(&raw).unwrap();
        assert_eq!(
            parsed,
            vec![
                UserComparison::FollowersCount,
                UserComparison::Verified,
                UserComparison::Protected
            ]
        );
    }

    #[test]
    fn test_names_listed() {
        assert!(UserComparison::names().contains(&"common_followers".to_string()));
        assert_eq!(TweetComparison::names().len(), TweetComparison::ALL.len());
    }
}
