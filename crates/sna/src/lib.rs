//! Social network analysis over the Twitter/X API.
//!
//! This crate provides:
//! - Identifier resolution (numeric ID vs handle) into request parameters
//! - Token pagination of listing endpoints into complete result sets
//! - Set aggregation (intersection, difference, pairwise overlap ranking)
//! - Descriptive and datetime statistics over labeled values
//! - Euclidean similarity ranking of users and tweets
//! - An [`Analyzer`] that ties attribute lookups and comparisons together

pub mod analysis;
pub mod error;
pub mod paginate;
pub mod resolve;
pub mod stats;
pub mod twitter;

// Re-export main types
pub use analysis::{Analyzer, TweetAttribute, TweetComparison, UserAttribute, UserComparison};
pub use error::{Error, Result};
pub use paginate::{paginate, Page, PageRequest, PageSource};
pub use resolve::EntityRef;
pub use stats::{PairKey, Record};
pub use twitter::{ClientConfig, Credentials, Listing, Lookup, SubjectKind, TwitterClient};
