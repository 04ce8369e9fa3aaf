//! Paginated listing endpoints.

use async_trait::async_trait;
use serde_json::Value;

use super::client::TwitterClient;
use super::types::ListResponse;
use crate::error::Result;
use crate::paginate::{Page, PageRequest, PageSource};

/// What a listing is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKind {
    User,
    Tweet,
}

/// Where a listing's items live in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemLocation {
    Data,
    IncludedUsers,
}

/// Token-paginated listing endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listing {
    Followers,
    Followees,
    LikedTweets,
    ComposedTweets,
    LikingUsers,
    Retweeters,
    QuotingUsers,
}

impl Listing {
    pub const ALL: [Self; 7] = [
        Self::Followers,
        Self::Followees,
        Self::LikedTweets,
        Self::ComposedTweets,
        Self::LikingUsers,
        Self::Retweeters,
        Self::QuotingUsers,
    ];

    #[must_use]
    pub fn subject_kind(self) -> SubjectKind {
        match self {
            Self::Followers | Self::Followees | Self::LikedTweets | Self::ComposedTweets => {
                SubjectKind::User
            }
            Self::LikingUsers | Self::Retweeters | Self::QuotingUsers => SubjectKind::Tweet,
        }
    }

    /// Request path for `subject_id`.
    #[must_use]
    pub fn path(self, subject_id: &str) -> String {
        let (prefix, suffix) = match self {
            Self::Followers => ("users", "followers"),
            Self::Followees => ("users", "following"),
            Self::LikedTweets => ("users", "liked_tweets"),
            Self::ComposedTweets => ("users", "tweets"),
            Self::LikingUsers => ("tweets", "liking_users"),
            Self::Retweeters => ("tweets", "retweeted_by"),
            Self::QuotingUsers => ("tweets", "quote_tweets"),
        };
        format!("/2/{prefix}/{subject_id}/{suffix}")
    }

    /// Largest `max_results` the endpoint accepts.
    #[must_use]
    pub fn max_page_size(self) -> u32 {
        match self {
            Self::Followers | Self::Followees => 1000,
            _ => 100,
        }
    }

    /// Smallest `max_results` the endpoint accepts.
    #[must_use]
    pub fn min_page_size(self) -> u32 {
        match self {
            Self::LikedTweets | Self::QuotingUsers => 10,
            Self::ComposedTweets => 5,
            _ => 1,
        }
    }

    fn item_location(self) -> ItemLocation {
        match self {
            Self::QuotingUsers => ItemLocation::IncludedUsers,
            _ => ItemLocation::Data,
        }
    }

    fn extra_query(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::QuotingUsers => &[("expansions", "author_id")],
            _ => &[],
        }
    }

    /// Build the first request of a retrieval.
    #[must_use]
    pub fn first_request(self, subject_id: &str, page_size: u32, limit: Option<usize>) -> PageRequest {
        PageRequest::new(subject_id, page_size, self.max_page_size())
            .fit_to_limit(limit, self.min_page_size())
    }
}

/// A [`Listing`] bound to a client, fetchable page by page.
pub struct ListingSource<'a> {
    client: &'a TwitterClient,
    listing: Listing,
}

impl<'a> ListingSource<'a> {
    #[must_use]
    pub fn new(client: &'a TwitterClient, listing: Listing) -> Self {
        Self { client, listing }
    }
}

#[async_trait]
impl PageSource<Value> for ListingSource<'_> {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Value>> {
        let mut query = vec![("max_results".to_string(), request.page_size.to_string())];
        if let Some(token) = &request.cursor_token {
            query.push(("pagination_token".to_string(), token.clone()));
        }
        for (key, value) in self.listing.extra_query() {
            query.push(((*key).to_string(), (*value).to_string()));
        }

        let body = self
            .client
            .get_json(&self.listing.path(&request.subject), &query)
            .await?;
        let response: ListResponse = serde_json::from_value(body)?;

        let items = match self.listing.item_location() {
            ItemLocation::Data => response.data,
            ItemLocation::IncludedUsers => response.includes.and_then(|i| i.users),
        };
        let next_token = response.meta.and_then(|m| m.next_token);
        Ok(Page { items, next_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(Listing::Followers.path("7"), "/2/users/7/followers");
        assert_eq!(Listing::Retweeters.path("9"), "/2/tweets/9/retweeted_by");
        assert_eq!(Listing::QuotingUsers.path("9"), "/2/tweets/9/quote_tweets");
    }

    #[test]
    fn test_first_request_respects_endpoint_bounds() {
        let req = Listing::Followers.first_request("1", 5000, None);
        assert_eq!(req.page_size, 1000);

        let req = Listing::LikedTweets.first_request("1", 100, Some(3));
        assert_eq!(req.page_size, 10);

        let req = Listing::Retweeters.first_request("1", 100, Some(3));
        assert_eq!(req.page_size, 3);
    }

    #[test]
    fn test_subject_kinds() {
        let users = Listing::ALL
            .iter()
            .filter(|l| l.subject_kind() == SubjectKind::User)
            .count();
        assert_eq!(users, 4);
    }
}
