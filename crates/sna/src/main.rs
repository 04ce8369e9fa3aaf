//! SNA CLI - query and compare Twitter/X users and tweets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sna::analysis::{parse_list, ranking_to_json, Named};
use sna::{
    Analyzer, EntityRef, SubjectKind, TweetAttribute, TweetComparison, TwitterClient,
    UserAttribute, UserComparison,
};

/// SNA CLI - social network analysis over the Twitter/X API.
#[derive(Parser)]
#[command(name = "sna")]
#[command(about = "Twitter/X social network analysis")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Env file holding BEARER_TOKEN and SNA_* settings
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Cap every paginated listing at this many items
    #[arg(long, global = true)]
    limit: Option<usize>,

    /// Add the request time to comparison results
    #[arg(long, global = true)]
    timestamp: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Kind {
    Users,
    Tweets,
}

impl From<Kind> for SubjectKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Users => SubjectKind::User,
            Kind::Tweets => SubjectKind::Tweet,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch attributes of a single user
    UserInfo {
        /// User ID or handle
        user: String,

        /// Attributes, e.g. followers_count,followers
        #[arg(required = true)]
        attributes: Vec<String>,
    },

    /// Fetch attributes of a single tweet
    TweetInfo {
        /// Tweet ID
        tweet: String,

        /// Attributes, e.g. author_info,available
        #[arg(required = true)]
        attributes: Vec<String>,
    },

    /// Compare two or more users
    CompareUsers {
        /// Comma-separated user IDs or handles
        #[arg(long, value_delimiter = ',', required = true)]
        users: Vec<String>,

        /// Comma-separated comparisons
        #[arg(long, required = true)]
        compare: Vec<String>,
    },

    /// Compare two or more tweets
    CompareTweets {
        /// Comma-separated tweet IDs
        #[arg(long, value_delimiter = ',', required = true)]
        tweets: Vec<String>,

        /// Comma-separated comparisons
        #[arg(long, required = true)]
        compare: Vec<String>,
    },

    /// Rank pairs of users or tweets by feature distance
    Similarity {
        #[arg(long, value_enum, default_value = "users")]
        kind: Kind,

        /// Comma-separated IDs or handles
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,

        /// Comma-separated numeric record fields
        #[arg(long, value_delimiter = ',', required = true)]
        features: Vec<String>,
    },

    /// List every named attribute and comparison
    Attributes,
}

fn refs(raw: &[String]) -> Vec<EntityRef> {
    raw.iter().map(|r| EntityRef::classify(r)).collect()
}

fn print_json(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to render result")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("sna=debug,info")
    } else {
        EnvFilter::new("sna=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    if let Commands::Attributes = cli.command {
        return print_json(&json!({
            "user_attributes": UserAttribute::names(),
            "tweet_attributes": TweetAttribute::names(),
            "user_comparisons": UserComparison::names(),
            "tweet_comparisons": TweetComparison::names(),
        }));
    }

    let client = TwitterClient::from_env().context("Failed to configure API client")?;
    let analyzer = Analyzer::new(&client)
        .with_limit(cli.limit)
        .with_timestamp(cli.timestamp);

    let result = match cli.command {
        Commands::UserInfo { user, attributes } => {
            tracing::info!(user, "Fetching user info");
            let attributes: Vec<UserAttribute> = parse_list(&attributes)?;
            analyzer
                .user_info(&EntityRef::classify(&user), &attributes)
                .await?
        }
        Commands::TweetInfo { tweet, attributes } => {
            tracing::info!(tweet, "Fetching tweet info");
            let attributes: Vec<TweetAttribute> = parse_list(&attributes)?;
            analyzer
                .tweet_info(&EntityRef::classify(&tweet), &attributes)
                .await?
        }
        Commands::CompareUsers { users, compare } => {
            let comparisons: Vec<UserComparison> = parse_list(&compare)?;
            analyzer.compare_users(&refs(&users), &comparisons).await?
        }
        Commands::CompareTweets { tweets, compare } => {
            let comparisons: Vec<TweetComparison> = parse_list(&compare)?;
            analyzer.compare_tweets(&refs(&tweets), &comparisons).await?
        }
        Commands::Similarity {
            kind,
            ids,
            features,
        } => {
            let features: Vec<&str> = features.iter().map(String::as_str).collect();
            let ranking = analyzer
                .similarity(kind.into(), &refs(&ids), &features)
                .await?;
            ranking_to_json(ranking)
        }
        Commands::Attributes => Value::Null,
    };

    print_json(&result)
}
