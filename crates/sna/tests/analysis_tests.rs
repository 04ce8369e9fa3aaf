//! Integration tests for the analyzer: attribute lookups, comparisons and
//! similarity ranking over a mock API server.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sna::analysis::parse_list;
use sna::{
    Analyzer, ClientConfig, Credentials, EntityRef, SubjectKind, TweetAttribute, TweetComparison,
    TwitterClient, UserAttribute, UserComparison,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Fixtures
// =============================================================================

fn client_for(server: &MockServer) -> TwitterClient {
    let config = ClientConfig::default().with_api_base(server.uri());
    TwitterClient::new(Credentials::new("test-token"), config).expect("client builds")
}

/// (id, followers, created_at, verified, listed, likes, followers list)
const USERS: [(&str, u64, &str, bool, u64, u64, &[&str]); 3] = [
    ("1", 150, "2009-03-16T11:19:30.000Z", true, 1, 2, &["1", "3", "5", "7"]),
    ("2", 23, "2009-05-06T13:49:31.000Z", false, 4, 6, &["3", "6", "7", "9"]),
    ("3", 78, "2010-06-27T19:10:20.000Z", false, 2, 4, &["0", "3", "7"]),
];

async fn mount_users(server: &MockServer) {
    for (id, followers, created_at, verified, listed, likes, follower_ids) in USERS {
        Mock::given(method("GET"))
            .and(path(format!("/2/users/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "id": id,
                    "username": format!("user{id}"),
                    "created_at": created_at,
                    "verified": verified,
                    "protected": false,
                    "public_metrics": {
                        "followers_count": followers,
                        "following_count": 10,
                        "tweet_count": 100,
                        "listed_count": listed,
                        "like_count": likes
                    }
                }
            })))
            .mount(server)
            .await;

        let data: Vec<Value> = follower_ids.iter().map(|f| json!({ "id": f })).collect();
        Mock::given(method("GET"))
            .and(path(format!("/2/users/{id}/followers")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": data,
                "meta": { "result_count": follower_ids.len() }
            })))
            .mount(server)
            .await;
    }
}

async fn mount_suspended(server: &MockServer, handle: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/2/users/by/username/{handle}")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [{ "title": "Forbidden", "detail": "User has been suspended." }]
        })))
        .mount(server)
        .await;
}

fn refs(raw: &[&str]) -> Vec<EntityRef> {
    raw.iter().map(|r| EntityRef::classify(r)).collect()
}

// =============================================================================
// Comparisons
// =============================================================================

#[tokio::test]
async fn test_compare_users_aggregates() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    let client = client_for(&server);

    let comparisons: Vec<UserComparison> = parse_list(&[
        "followers_count,created_at,common_followers".to_string(),
        "distinct_followers,followers_similarity,verified".to_string(),
    ])
    .unwrap();
    let result = Analyzer::new(&client)
        .with_timestamp(true)
        .compare_users(&refs(&["1", "2", "3"]), &comparisons)
        .await
        .unwrap();

    let keys: Vec<&str> = result
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        vec![
            "followers_count",
            "created_at",
            "common_followers",
            "distinct_followers",
            "followers_similarity",
            "verified",
            "utc_timestamp"
        ]
    );

    let counts = &result["followers_count"];
    assert_eq!(counts["2"], json!(23));
    assert_eq!(counts["metrics"]["max"], json!(150));
    assert_eq!(counts["metrics"]["min"], json!(23));
    assert_eq!(counts["metrics"]["median"], json!(78.0));
    assert_eq!(counts["metrics"]["IQR"], json!(63.5));

    let created = &result["created_at"]["metrics"];
    assert_eq!(created["mean"], json!("2009-09-05T14:46:27+00:00"));
    assert_eq!(created["time_span"], json!({ "days": 468, "seconds": 28250, "microseconds": 0 }));

    assert_eq!(result["common_followers"], json!(["3", "7"]));
    assert_eq!(
        result["distinct_followers"],
        json!({ "1": ["1", "5"], "2": ["6", "9"], "3": ["0"] })
    );
    assert_eq!(result["followers_similarity"]["(1, 2)"], json!(2));
    assert_eq!(result["verified"], json!({ "1": true, "2": false, "3": false }));
    assert_eq!(result["utc_timestamp"].as_str().unwrap().len(), 26);
}

#[tokio::test]
async fn test_counts_are_echoed_exactly() {
    let server = MockServer::start().await;
    for (id, followers) in [("1", 9_007_199_254_740_993_u64), ("2", 23)] {
        Mock::given(method("GET"))
            .and(path(format!("/2/users/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "id": id, "public_metrics": { "followers_count": followers } }
            })))
            .mount(&server)
            .await;
    }
    let client = client_for(&server);

    let result = Analyzer::new(&client)
        .compare_users(&refs(&["1", "2"]), &[UserComparison::FollowersCount])
        .await
        .unwrap();
    let counts = &result["followers_count"];
    assert_eq!(counts["1"], json!(9_007_199_254_740_993_u64));
    assert_eq!(counts["2"], json!(23));
    assert_eq!(counts["metrics"]["max"], json!(9_007_199_254_740_993_u64));
    assert_eq!(counts["metrics"]["min"], json!(23));
}

#[tokio::test]
async fn test_compare_users_needs_two() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let err = Analyzer::new(&client)
        .compare_users(&refs(&["1"]), &[UserComparison::FollowersCount])
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_suspended_user_in_comparison() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    mount_suspended(&server, "spammer").await;
    let client = client_for(&server);
    let analyzer = Analyzer::new(&client);
    let users = refs(&["1", "spammer"]);

    let flags = analyzer
        .compare_users(&users, &[UserComparison::Verified])
        .await
        .unwrap();
    assert_eq!(flags["verified"], json!({ "1": true, "spammer": { "suspended": true } }));

    let err = analyzer
        .compare_users(&users, &[UserComparison::FollowersCount])
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_relationship_covers_ordered_pairs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/friendships/show.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "relationship": {
                "source": { "following": true },
                "target": { "followed_by": true }
            }
        })))
        .expect(2)
        .mount(&server)
        .await;
    let client = client_for(&server);

    let result = Analyzer::new(&client)
        .compare_users(&refs(&["1", "jack"]), &[UserComparison::Relationship])
        .await
        .unwrap();
    let pairs = result["relationship"].as_object().unwrap();
    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs["(1, jack)"]["source"]["following"], json!(true));
    assert!(pairs.contains_key("(jack, 1)"));
}

#[tokio::test]
async fn test_compare_tweets() {
    let server = MockServer::start().await;
    for (id, likes, likers) in [("10", 5, ["a1", "a2"]), ("11", 9, ["a2", "a3"])] {
        Mock::given(method("GET"))
            .and(path(format!("/2/tweets/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "id": id,
                    "created_at": "2021-05-01T10:00:00.000Z",
                    "public_metrics": { "like_count": likes }
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/2/tweets/{id}/liking_users")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": likers[0] }, { "id": likers[1] }],
                "meta": { "result_count": 2 }
            })))
            .mount(&server)
            .await;
    }
    let client = client_for(&server);

    let result = Analyzer::new(&client)
        .compare_tweets(
            &refs(&["10", "11"]),
            &[
                TweetComparison::LikeCount,
                TweetComparison::CommonLikingUsers,
                TweetComparison::DistinctLikingUsers,
            ],
        )
        .await
        .unwrap();
    assert_eq!(result["like_count"]["metrics"]["mean"], json!(7.0));
    assert_eq!(result["common_liking_users"], json!(["a2"]));
    assert_eq!(result["distinct_liking_users"], json!({ "10": ["a1"], "11": ["a3"] }));
    assert!(result.get("utc_timestamp").is_none());
}

// =============================================================================
// Single-entity info
// =============================================================================

#[tokio::test]
async fn test_user_info() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    let client = client_for(&server);
    let analyzer = Analyzer::new(&client).with_limit(Some(2));

    let attributes: Vec<UserAttribute> =
        parse_list(&["followers_count,followers,created_at".to_string()]).unwrap();
    let info = analyzer
        .user_info(&EntityRef::from(1_u64), &attributes)
        .await
        .unwrap();
    assert_eq!(
        info,
        json!({
            "followers_count": 150,
            "followers": ["1", "3"],
            "created_at": "2009-03-16T11:19:30.000Z"
        })
    );

    let err = analyzer
        .user_info(&EntityRef::from(1_u64), &[UserAttribute::Field("hair_colour".to_string())])
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_user_info_of_suspended_user() {
    let server = MockServer::start().await;
    mount_suspended(&server, "spammer").await;
    let client = client_for(&server);

    let info = Analyzer::new(&client)
        .user_info(&EntityRef::classify("spammer"), &[UserAttribute::Followers])
        .await
        .unwrap();
    assert_eq!(info, json!({ "suspended": true }));
}

#[tokio::test]
async fn test_tweet_info_of_missing_tweet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/404"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "title": "Not Found Error", "detail": "Could not find tweet with id: [404]." }]
        })))
        .mount(&server)
        .await;
    let client = client_for(&server);

    let info = Analyzer::new(&client)
        .tweet_info(&EntityRef::from(404_u64), &[TweetAttribute::Available])
        .await
        .unwrap();
    assert_eq!(info, json!({ "not_found": true, "available": false }));
}

// =============================================================================
// Similarity
// =============================================================================

#[tokio::test]
async fn test_user_similarity_ranking() {
    let server = MockServer::start().await;
    mount_users(&server).await;
    let client = client_for(&server);

    let ranking = Analyzer::new(&client)
        .similarity(
            SubjectKind::User,
            &refs(&["1", "2", "3"]),
            &["listed_count", "like_count"],
        )
        .await
        .unwrap();
    let order: Vec<String> = ranking.iter().map(|(pair, _)| pair.encode()).collect();
    assert_eq!(order, vec!["(1, 3)", "(2, 3)", "(1, 2)"]);
    assert!((ranking[2].1 - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_similarity_needs_two_features() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let err = Analyzer::new(&client)
        .similarity(SubjectKind::User, &refs(&["1", "2"]), &["like_count"])
        .await
        .unwrap_err();
    assert!(err.is_validation());
}
