//! HTTP client for the Twitter/X REST API.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::config::{ClientConfig, Credentials};
use super::listing::{Listing, ListingSource, SubjectKind};
use super::types::{flatten_record, Lookup, LookupResponse, Unavailability};
use crate::error::{Error, Result};
use crate::paginate::paginate;
use crate::resolve::{EntityRef, Role};
use crate::stats::Record;

/// Fields requested on every user lookup.
pub const USER_FIELDS: &str =
    "created_at,description,location,pinned_tweet_id,profile_image_url,protected,public_metrics,url,verified";

/// Fields requested on every tweet lookup.
pub const TWEET_FIELDS: &str =
    "author_id,context_annotations,conversation_id,created_at,entities,in_reply_to_user_id,lang,possibly_sensitive,public_metrics,source";

/// Query pairs as sent on the wire.
pub type Query = [(String, String)];

/// Authenticated API client.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    client: Client,
    credentials: Credentials,
    config: ClientConfig,
}

impl TwitterClient {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            credentials,
            config,
        })
    }

    /// Client configured from `BEARER_TOKEN` and the `SNA_*` variables.
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?, ClientConfig::from_env())
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, path: &str, query: &Query) -> Result<(StatusCode, String)> {
        let url = format!("{}{path}", self.config.api_base);
        debug!(%url, params = query.len(), "GET");
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.credentials.bearer_token)
            .query(query)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Raw GET returning the JSON body. Non-success statuses become
    /// [`Error::Api`].
    pub async fn get_json(&self, path: &str, query: &Query) -> Result<Value> {
        let (status, body) = self.send(path, query).await?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// GET a single object. Suspended and missing entities come back as
    /// [`Lookup::Unavailable`]; every other failure propagates.
    async fn lookup(&self, path: &str, query: &Query) -> Result<Lookup<LookupResponse>> {
        let (status, body) = self.send(path, query).await?;

        let forbidden_or_missing =
            status == StatusCode::FORBIDDEN || status == StatusCode::NOT_FOUND;
        if !status.is_success() && !forbidden_or_missing {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: LookupResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if forbidden_or_missing => {
                return Err(Error::Api {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => return Err(e.into()),
        };

        if parsed.data.is_some() && status.is_success() {
            return Ok(Lookup::Found(parsed));
        }

        let problems = parsed.errors.as_deref().unwrap_or_default();
        match Unavailability::detect(problems) {
            Some(reason) => {
                warn!(path, %reason, "Entity unavailable");
                Ok(Lookup::Unavailable(reason))
            }
            None => Err(Error::Api {
                status: status.as_u16(),
                body,
            }),
        }
    }

    /// Fetch a user's flat attribute record by ID or username.
    pub async fn lookup_user(&self, user: &EntityRef) -> Result<Lookup<Record>> {
        let query = [("user.fields".to_string(), USER_FIELDS.to_string())];
        let found = self.lookup(&user.user_lookup_path(), &query).await?;
        Ok(match found {
            Lookup::Found(response) => {
                Lookup::Found(flatten_record(response.data.unwrap_or(Value::Null)))
            }
            Lookup::Unavailable(reason) => Lookup::Unavailable(reason),
        })
    }

    /// Fetch a tweet's flat attribute record. The author's record, when
    /// expanded, is attached under `author`.
    pub async fn lookup_tweet(&self, tweet: &EntityRef) -> Result<Lookup<Record>> {
        let id = tweet
            .id()
            .ok_or_else(|| Error::validation(format!("tweet reference '{tweet}' is not a numeric ID")))?;
        let query = [
            ("tweet.fields".to_string(), TWEET_FIELDS.to_string()),
            ("expansions".to_string(), "author_id".to_string()),
            ("user.fields".to_string(), USER_FIELDS.to_string()),
        ];
        let found = self.lookup(&format!("/2/tweets/{id}"), &query).await?;
        Ok(match found {
            Lookup::Found(response) => {
                let mut record = flatten_record(response.data.unwrap_or(Value::Null));
                let author = response
                    .includes
                    .and_then(|i| i.users)
                    .and_then(|users| users.into_iter().next());
                if let Some(author) = author {
                    record.insert("author".to_string(), Value::Object(flatten_record(author)));
                }
                Lookup::Found(record)
            }
            Lookup::Unavailable(reason) => Lookup::Unavailable(reason),
        })
    }

    /// Numeric ID of a user; handles cost one lookup.
    pub async fn resolve_user_id(&self, user: &EntityRef) -> Result<String> {
        if let Some(id) = user.id() {
            return Ok(id.to_string());
        }
        match self.lookup_user(user).await? {
            Lookup::Found(record) => match record.get("id") {
                Some(Value::String(id)) => Ok(id.clone()),
                Some(Value::Number(id)) => Ok(id.to_string()),
                _ => Err(Error::Api {
                    status: 200,
                    body: format!("user lookup for '{user}' returned no id"),
                }),
            },
            Lookup::Unavailable(reason) => Err(Error::validation(format!(
                "user '{user}' is {reason}"
            ))),
        }
    }

    /// IDs of every item of `listing` for `subject`, up to `limit`.
    pub async fn list_ids(
        &self,
        listing: Listing,
        subject: &EntityRef,
        limit: Option<usize>,
    ) -> Result<Vec<String>> {
        let subject_id = match listing.subject_kind() {
            SubjectKind::User => self.resolve_user_id(subject).await?,
            SubjectKind::Tweet => subject
                .id()
                .ok_or_else(|| Error::validation(format!("tweet reference '{subject}' is not a numeric ID")))?
                .to_string(),
        };

        let request = listing.first_request(&subject_id, self.config.page_size, limit);
        let source = ListingSource::new(self, listing);
        paginate(&source, request, limit, |item: Value| match item.get("id") {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(Error::Api {
                status: 200,
                body: format!("{listing:?} item without an id: {item}"),
            }),
        })
        .await
    }

    /// Directional relationship between two users (v1.1 friendships/show).
    pub async fn relationship(&self, source: &EntityRef, target: &EntityRef) -> Result<Value> {
        let query = [
            source.relationship_param(Role::Source),
            target.relationship_param(Role::Target),
        ];
        let body = self.get_json("/1.1/friendships/show.json", &query).await?;
        let sides = body
            .get("relationship")
            .and_then(|r| Some((r.get("source")?, r.get("target")?)));
        let Some((source_side, target_side)) = sides else {
            return Err(Error::Api {
                status: 200,
                body: format!("friendship response without a relationship: {body}"),
            });
        };
        Ok(json!({
            "source": source_side,
            "target": target_side,
        }))
    }

    /// Most recent timeline entry of a user, if any.
    pub async fn latest_activity(&self, user: &EntityRef) -> Result<Option<Value>> {
        let (key, value) = user.user_params();
        let query = [
            (key.to_string(), value),
            ("count".to_string(), "1".to_string()),
            ("include_rts".to_string(), "true".to_string()),
            ("trim_user".to_string(), "true".to_string()),
            ("tweet_mode".to_string(), "extended".to_string()),
        ];
        let body = self
            .get_json("/1.1/statuses/user_timeline.json", &query)
            .await?;
        Ok(match body {
            Value::Array(entries) => entries.into_iter().next(),
            _ => None,
        })
    }
}
