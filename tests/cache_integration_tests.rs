//! Integration Tests for the Response Cache
//!
//! Drives the public API the way a client's view and mutation code would.

use std::sync::Arc;
use std::time::Duration;

use response_cache::{
    keys, ApiCacheUtils, CacheConfig, CacheOptions, CacheStats, ManualClock, ResponseCache,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// == Helper Functions ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Post {
    id: u64,
    author: String,
    body: String,
}

fn post(id: u64) -> Post {
    Post {
        id,
        author: "ana".to_string(),
        body: format!("post {id}"),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cache_with(options: &CacheOptions) -> (ResponseCache<Vec<Post>, ManualClock>, ManualClock) {
    init_tracing();
    let clock = ManualClock::starting_at(1_700_000_000_000);
    let config = CacheConfig::from_options(options);
    (ResponseCache::with_clock(&config, clock.clone()), clock)
}

// == End-to-end Scenarios ==

#[test]
fn test_posts_page_expires_and_is_swept_by_the_miss() {
    let (cache, clock) = cache_with(&CacheOptions::default());
    let page = vec![post(1), post(2)];

    cache.set("posts:1", page.clone(), Some(Duration::from_millis(2000)));
    assert_eq!(*cache.get("posts:1").unwrap(), page);

    clock.advance(Duration::from_millis(2500));
    assert!(cache.get("posts:1").is_none());

    assert_eq!(
        cache.stats(),
        CacheStats {
            total: 0,
            valid: 0,
            expired: 0,
            max_size: 100,
        }
    );
}

#[test]
fn test_capacity_two_evicts_first_insert() {
    init_tracing();
    let options: CacheOptions = serde_json::from_value(json!({"maxSize": 2})).unwrap();
    let cache: ResponseCache<i32, ManualClock> =
        ResponseCache::with_clock(&CacheConfig::from_options(&options), ManualClock::new());

    cache.set("a", 1, None);
    cache.set("b", 2, None);
    cache.set("c", 3, None);

    assert!(cache.get("a").is_none());
    assert_eq!(*cache.get("b").unwrap(), 2);
    assert_eq!(*cache.get("c").unwrap(), 3);
}

#[test]
fn test_capacity_plus_one_keeps_the_rest() {
    let (cache, _) = cache_with(&CacheOptions::default());

    for i in 0..=100u64 {
        cache.set(format!("post:{i}"), vec![post(i)], Some(Duration::from_secs(3600)));
    }

    assert_eq!(cache.len(), 100);
    assert!(cache.get("post:0").is_none());
    for i in 1..=100u64 {
        assert_eq!(cache.get(&format!("post:{i}")).unwrap()[0].id, i);
    }
}

#[test]
fn test_prefix_invalidation_leaves_other_namespaces() {
    init_tracing();
    let cache: ResponseCache<Value, ManualClock> =
        ResponseCache::with_clock(&CacheConfig::default(), ManualClock::new());

    cache.set("posts:1:{}", json!([1, 2]), None);
    cache.set("posts:2:{}", json!([3]), None);
    cache.set("categories", json!(["tech"]), None);

    assert_eq!(cache.invalidate_by_prefix("posts:"), 2);
    assert!(cache.get("posts:1:{}").is_none());
    assert!(cache.get("posts:2:{}").is_none());
    assert_eq!(*cache.get("categories").unwrap(), json!(["tech"]));
}

#[test]
fn test_operations_are_total() {
    let (cache, _) = cache_with(&CacheOptions::default());

    assert!(cache.get("missing").is_none());
    assert!(!cache.has("missing"));
    assert!(!cache.delete("missing"));
    assert!(!cache.invalidate("missing"));
    assert_eq!(cache.invalidate_by_prefix("missing"), 0);
    assert_eq!(cache.cleanup_expired(), 0);
    cache.clear();

    assert!(cache.is_empty());
    assert!(cache.keys().is_empty());
}

#[test]
fn test_stats_track_unswept_expired_entries() {
    let (cache, clock) = cache_with(&CacheOptions {
        ttl: Some(1_000),
        max_size: None,
    });

    cache.set("posts:1:{}", vec![post(1)], None);
    cache.set("user:7", vec![], Some(Duration::from_secs(600)));
    clock.advance(Duration::from_millis(1_001));

    let stats = cache.stats();
    assert_eq!(stats.total, cache.len());
    assert_eq!((stats.valid, stats.expired), (1, 1));
    assert_eq!(cache.keys(), vec!["posts:1:{}", "user:7"]);

    assert_eq!(cache.cleanup_expired(), 1);
    assert_eq!(cache.stats().expired, 0);
    assert_eq!(cache.keys(), vec!["user:7"]);
}

#[test]
fn test_returned_payload_is_a_snapshot() {
    let (cache, _) = cache_with(&CacheOptions::default());
    cache.set("posts:1:{}", vec![post(1)], None);

    let first = cache.get("posts:1:{}").unwrap();
    cache.set("posts:1:{}", vec![post(2)], None);

    assert_eq!(first[0].id, 1, "earlier snapshot is unaffected by overwrite");
    assert_eq!(cache.get("posts:1:{}").unwrap()[0].id, 2);
    assert_eq!(Arc::strong_count(&first), 1);
}

// == Resource Helpers ==

#[test]
fn test_feed_flow_with_helpers() {
    init_tracing();
    let clock = ManualClock::new();
    let utils = ApiCacheUtils::new(ResponseCache::with_clock(
        &CacheConfig::default(),
        clock.clone(),
    ));
    let filters = json!({"search": "go", "tags": ["rust", "async"]});

    assert!(utils.posts::<_, Vec<Post>>(1, &filters).unwrap().is_none());
    utils.set_posts(1, &filters, &vec![post(1), post(2)]).unwrap();
    utils.set_post(1, &post(1)).unwrap();

    // Same query, fields and tags in another order
    let reordered = json!({"tags": ["async", "rust"], "search": "go"});
    let cached: Vec<Post> = utils.posts(1, &reordered).unwrap().unwrap();
    assert_eq!(cached.len(), 2);

    // A new post lands: every list page is stale, single posts are not
    assert_eq!(utils.invalidate_posts(), 1);
    assert!(utils.posts::<_, Vec<Post>>(1, &reordered).unwrap().is_none());
    assert_eq!(utils.post::<Post>(1).unwrap(), Some(post(1)));

    utils.clear_all();
    assert_eq!(utils.stats().total, 0);
}

#[test]
fn test_key_helpers_are_deterministic() {
    let a = keys::posts_key(2, &json!({"search": "go", "page_size": 20})).unwrap();
    let b = keys::posts_key(2, &json!({"page_size": 20, "search": "go"})).unwrap();
    assert_eq!(a, b);
    assert!(a.starts_with(keys::POSTS_PREFIX));
}

// == Background Sweep ==

#[tokio::test(start_paused = true)]
async fn test_sweeper_reclaims_expired_entries() {
    let (cache, clock) = cache_with(&CacheOptions::default());
    cache.set("posts:1:{}", vec![post(1)], Some(Duration::from_millis(50)));
    cache.set("categories", vec![], Some(Duration::from_secs(1800)));

    let sweeper = cache.spawn_sweeper(Duration::from_millis(10));
    clock.advance(Duration::from_millis(51));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(cache.keys(), vec!["categories"]);
    sweeper.abort();
}

#[tokio::test(start_paused = true)]
async fn test_sweeper_runs_at_configured_interval() {
    init_tracing();
    let clock = ManualClock::starting_at(1_700_000_000_000);
    let config = CacheConfig::from_options(&CacheOptions::default())
        .with_cleanup_interval(Duration::from_secs(1));
    let cache: ResponseCache<Vec<Post>, ManualClock> =
        ResponseCache::with_clock(&config, clock.clone());
    cache.set("posts:1:{}", vec![post(1)], Some(Duration::from_millis(50)));

    let sweeper = cache.start_sweeper();
    clock.advance(Duration::from_millis(51));
    tokio::time::sleep(Duration::from_millis(1_100)).await;

    assert!(cache.is_empty());
    sweeper.abort();
}

#[tokio::test]
async fn test_read_through_serves_cached_value() {
    let (cache, _) = cache_with(&CacheOptions::default());
    let mut fetches = 0;

    for _ in 0..3 {
        let page = cache
            .get_or_fetch("posts:1:{}", None, || {
                fetches += 1;
                async { Ok::<_, std::io::Error>(vec![post(1)]) }
            })
            .await
            .unwrap();
        assert_eq!(page[0], post(1));
    }

    assert_eq!(fetches, 1);
}
