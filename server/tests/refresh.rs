use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use aura_server::{
    aura::AuraEngine,
    db::types::UserRecord,
    store::{MemoryStore, ReputationStore},
};
use futures::future::join_all;
use httpmock::{prelude::*, Mock};
use serde_json::json;
use shared::{
    providers::{FetchOutcome, ProviderMetrics, ProvidersConfig},
    Provider,
};

fn config(server: &MockServer, timeout: Duration) -> ProvidersConfig {
    ProvidersConfig {
        leetcode_url: server.url("/graphql"),
        codeforces_url: server.url("/cf"),
        github_url: server.base_url(),
        github_token: None,
        timeout,
    }
}

fn engine(server: &MockServer, store: Arc<MemoryStore>, timeout: Duration) -> AuraEngine {
    AuraEngine::new(config(server, timeout).adapters(None).unwrap(), store)
}

fn user(id: i32, username: &str, handles: [&str; 3]) -> UserRecord {
    let mut user = UserRecord::newcomer(
        id,
        username.to_string(),
        format!("{username}@example.com"),
    );
    let [leetcode, codeforces, github] = handles;
    user.leetcode_handle = leetcode.to_string();
    user.codeforces_handle = codeforces.to_string();
    user.github_handle = github.to_string();
    user
}

async fn mock_leetcode<'a>(
    server: &'a MockServer,
    handle: &str,
    [easy, medium, hard]: [u32; 3],
) -> Mock<'a> {
    let body = json!({
        "data": {
            "matchedUser": {
                "profile": { "ranking": 42156 },
                "submitStats": {
                    "acSubmissionNum": [
                        { "difficulty": "All", "count": easy + medium + hard },
                        { "difficulty": "Easy", "count": easy },
                        { "difficulty": "Medium", "count": medium },
                        { "difficulty": "Hard", "count": hard }
                    ]
                }
            }
        }
    });
    let filter = json!({ "variables": { "username": handle } }).to_string();
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql").json_body_partial(filter);
            then.status(200).json_body(body);
        })
        .await
}

async fn mock_codeforces<'a>(server: &'a MockServer, handle: &str, rating: i32) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/cf/user.info")
                .query_param("handles", handle);
            then.status(200).json_body(json!({
                "status": "OK",
                "result": [{ "handle": handle, "rating": rating, "maxRating": rating + 150, "rank": "expert" }]
            }));
        })
        .await
}

async fn mock_github<'a>(server: &'a MockServer, handle: &str, public_repos: u32) -> Mock<'a> {
    let path = format!("/users/{handle}");
    server
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(json!({
                "login": handle,
                "public_repos": public_repos,
                "followers": 89
            }));
        })
        .await
}

#[tokio::test]
async fn refresh_stores_exact_score() {
    let server = MockServer::start_async().await;
    mock_leetcode(&server, "alice_lc", [50, 30, 10]).await;
    mock_codeforces(&server, "alice_cf", 1500).await;
    mock_github(&server, "alice-gh", 20).await;

    let store = Arc::new(MemoryStore::new());
    store
        .insert(user(1, "alice", ["alice_lc", "alice_cf", "alice-gh"]))
        .await;

    let updated = engine(&server, store.clone(), Duration::from_secs(8))
        .refresh("alice")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.aura_points, 4900);
    assert_eq!(updated.leetcode_easy, 50);
    assert_eq!(updated.leetcode_medium, 30);
    assert_eq!(updated.leetcode_hard, 10);
    assert_eq!(updated.leetcode_ranking, 42156);
    assert_eq!(updated.codeforces_rating, 1500);
    assert_eq!(updated.codeforces_max_rating, 1650);
    assert_eq!(updated.codeforces_rank, "expert");
    assert_eq!(updated.github_public_repos, 20);
    assert_eq!(updated.github_followers, 89);

    let stored = store.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn degraded_provider_only_zeroes_its_part() {
    let server = MockServer::start_async().await;
    mock_leetcode(&server, "alice_lc", [50, 30, 10]).await;
    mock_github(&server, "alice-gh", 20).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cf/user.info");
            then.status(200).body("<html>maintenance</html>");
        })
        .await;

    let store = Arc::new(MemoryStore::new());
    store
        .insert(user(1, "alice", ["alice_lc", "alice_cf", "alice-gh"]))
        .await;

    let updated = engine(&server, store, Duration::from_secs(8))
        .refresh("alice")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.aura_points, 900 + 1000);
    assert_eq!(updated.codeforces_rating, 0);
    assert_eq!(updated.codeforces_rank, "");
    assert_eq!(updated.github_public_repos, 20);
}

#[tokio::test]
async fn slow_provider_is_cut_off() {
    let server = MockServer::start_async().await;
    mock_leetcode(&server, "alice_lc", [50, 30, 10]).await;
    mock_codeforces(&server, "alice_cf", 1500).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/users/alice-gh");
            then.status(200)
                .delay(Duration::from_secs(5))
                .json_body(json!({ "public_repos": 20, "followers": 89 }));
        })
        .await;

    let store = Arc::new(MemoryStore::new());
    store
        .insert(user(1, "alice", ["alice_lc", "alice_cf", "alice-gh"]))
        .await;

    let started = Instant::now();
    let updated = engine(&server, store, Duration::from_millis(300))
        .refresh("alice")
        .await
        .unwrap()
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(updated.aura_points, 900 + 3000);
    assert_eq!(updated.github_public_repos, 0);
}

#[tokio::test]
async fn unknown_user_changes_nothing() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.any_request();
            then.status(500);
        })
        .await;

    let store = Arc::new(MemoryStore::new());
    store.insert(user(1, "alice", ["", "", ""])).await;
    let before = store.snapshot().await;

    let result = engine(&server, store.clone(), Duration::from_secs(8))
        .refresh("ghost")
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(store.snapshot().await, before);
    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn repeated_refresh_converges() {
    let server = MockServer::start_async().await;
    mock_leetcode(&server, "alice_lc", [50, 30, 10]).await;
    mock_codeforces(&server, "alice_cf", 1500).await;
    mock_github(&server, "alice-gh", 20).await;

    let store = Arc::new(MemoryStore::new());
    store
        .insert(user(1, "alice", ["alice_lc", "alice_cf", "alice-gh"]))
        .await;
    let engine = engine(&server, store, Duration::from_secs(8));

    let first = engine.refresh("alice").await.unwrap().unwrap();
    let second = engine.refresh("alice").await.unwrap().unwrap();

    assert_eq!(first.aura_points, second.aura_points);
    assert_eq!(first.stats(), second.stats());
}

#[tokio::test]
async fn missing_handles_fall_back_to_username() {
    let server = MockServer::start_async().await;
    let leetcode = mock_leetcode(&server, "alice", [1, 0, 0]).await;
    let codeforces = mock_codeforces(&server, "alice", 100).await;
    let github = mock_github(&server, "alice-gh", 2).await;

    let store = Arc::new(MemoryStore::new());
    store.insert(user(1, "alice", ["", "   ", "alice-gh"])).await;

    let updated = engine(&server, store, Duration::from_secs(8))
        .refresh("alice")
        .await
        .unwrap()
        .unwrap();

    leetcode.assert_async().await;
    codeforces.assert_async().await;
    github.assert_async().await;
    assert_eq!(updated.aura_points, 10 + 200 + 100);
}

#[tokio::test]
async fn unmatched_handles_score_zero() {
    let server = MockServer::start_async().await;

    let store = Arc::new(MemoryStore::new());
    store.insert(user(1, "nobody", ["", "", ""])).await;

    let updated = engine(&server, store, Duration::from_secs(8))
        .refresh("nobody")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.aura_points, 0);
    assert_eq!(updated.stats(), Default::default());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_refreshes_stay_consistent() {
    let server = MockServer::start_async().await;
    let store = Arc::new(MemoryStore::new());
    for i in 0..5u32 {
        let name = format!("user{i}");
        mock_github(&server, &format!("{name}-gh"), i + 1).await;
        store
            .insert(user(i as i32 + 1, &name, ["", "", &format!("{name}-gh")]))
            .await;
    }
    let engine = Arc::new(engine(&server, store.clone(), Duration::from_secs(8)));

    let refreshes = (0..5).flat_map(|i| {
        let engine = engine.clone();
        (0..3).map(move |_| {
            let engine = engine.clone();
            async move { engine.refresh(&format!("user{i}")).await }
        })
    });
    for result in join_all(refreshes).await {
        assert!(result.unwrap().is_some());
    }

    for user in store.snapshot().await {
        assert_eq!(user.aura_points as u64, user.stats().aura());
        assert_eq!(user.aura_points, user.id as i64 * 50);
    }

    let top = store.list_top_by_score(3).await.unwrap();
    let names: Vec<_> = top.iter().map(|r| r.username.as_str()).collect();
    assert_eq!(names, vec!["user4", "user3", "user2"]);
}

#[tokio::test]
async fn fetch_outcomes_are_counted() {
    let server = MockServer::start_async().await;
    mock_github(&server, "alice-gh", 20).await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/graphql");
            then.status(503);
        })
        .await;

    let store = Arc::new(MemoryStore::new());
    store.insert(user(1, "alice", ["alice_lc", "", "alice-gh"])).await;

    let metrics = Arc::new(ProviderMetrics::default());
    let adapters = config(&server, Duration::from_secs(8))
        .adapters(Some(metrics.clone()))
        .unwrap();
    AuraEngine::new(adapters, store)
        .refresh("alice")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(metrics.count(Provider::Github, FetchOutcome::Ok), 1);
    assert_eq!(metrics.count(Provider::LeetCode, FetchOutcome::Failed), 1);
    // the username fallback isn't known to codeforces, so the mock server answers 404
    assert_eq!(metrics.count(Provider::Codeforces, FetchOutcome::Failed), 1);
}
