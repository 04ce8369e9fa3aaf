//! Twitter/X API collaborators: lookups, listings and raw requests.

mod client;
mod config;
mod listing;
mod types;

pub use client::{TwitterClient, TWEET_FIELDS, USER_FIELDS};
pub use config::{ClientConfig, Credentials, DEFAULT_API_BASE, DEFAULT_PAGE_SIZE};
pub use listing::{Listing, ListingSource, SubjectKind};
pub use types::{flatten_record, ApiProblem, Lookup, Unavailability};
