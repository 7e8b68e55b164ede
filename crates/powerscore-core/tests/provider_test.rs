#![allow(clippy::unwrap_used)]
// Integration tests for the remote providers against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use powerscore_api::IoClient;
use powerscore_core::model::SessionId;
use powerscore_core::{
    CachedSession, DataErrorKind, DataType, DerivationConfig, MemorySessionCache,
    NotificationBus, PollPolicies, PollPolicy, RemoteProviders, SessionCache,
    init_calculations,
};

// ── Helpers ─────────────────────────────────────────────────────────

const BASE: &str = "/api/v1/web/powerscore";
const ORIGIN: &str = "https://www.example.com";
const WAIT: Duration = Duration::from_secs(5);

struct Harness {
    server: MockServer,
    bus: NotificationBus,
    providers: RemoteProviders,
    cache: Arc<MemorySessionCache>,
}

fn fast(max_wait_ms: u64) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        max_wait: Duration::from_millis(max_wait_ms),
    }
}

async fn harness(policy: PollPolicy) -> Harness {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}{BASE}", server.uri())).unwrap();
    let client = IoClient::with_client(reqwest::Client::new(), base_url);

    let bus = NotificationBus::new();
    init_calculations(
        &bus,
        &DerivationConfig {
            sampling_seed: Some(1),
            ..DerivationConfig::default()
        },
    );
    let cache = Arc::new(MemorySessionCache::new());
    let policies = PollPolicies {
        sitemap: policy,
        psi: policy,
        templates: policy,
    };
    let providers = RemoteProviders::new(client, bus.clone(), cache.clone(), policies).unwrap();
    Harness {
        server,
        bus,
        providers,
        cache,
    }
}

fn action(suffix: &str) -> String {
    format!("{BASE}/{suffix}")
}

fn envelope(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "statusCode": 200, "body": body }))
}

fn not_written() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "statusCode": 404, "body": {} }))
}

async fn mount_action(server: &MockServer, suffix: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(action(suffix)))
        .respond_with(envelope(body))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, file_name: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(action("get-file.json")))
        .and(query_param("fileName", file_name))
        .respond_with(envelope(body))
        .mount(server)
        .await;
}

fn seed_cache(cache: &MemorySessionCache) {
    cache
        .store(&CachedSession {
            origin: ORIGIN.into(),
            id: SessionId::new("abc"),
            saved_at: chrono::Utc::now(),
        })
        .unwrap();
}

// ── Full chain ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_analysis_publishes_all_scores() {
    let h = harness(fast(2_000)).await;

    mount_action(&h.server, "setup.json", json!({ "origin": ORIGIN, "id": { "value": "abc" } }))
        .await;
    mount_action(&h.server, "dns.json", json!({ "payload": { "cname": "www.example.com.edgekey.net" } }))
        .await;
    mount_action(&h.server, "get-traffic.json", json!({ "popularityRank": "Top 5,000" })).await;
    mount_file(
        &h.server,
        "abc__sitemap.json",
        json!({
            "num_pages": 400,
            "num_languages": 2,
            "sitemaps": [[{ "page": "https://www.example.com/" }, { "page": "https://www.example.com/a/b" }]]
        }),
    )
    .await;
    mount_file(
        &h.server,
        "abc__psi.json",
        json!({
            "mobile": { "lighthouseResult": { "categories": { "performance": { "score": 0.5 } } } },
            "desktop": {}
        }),
    )
    .await;
    mount_file(
        &h.server,
        "abc__templates.json",
        json!({
            "templates": { "numTemplates": 10 },
            "integrations": { "commerce": true },
            "averageBlockCount": 20
        }),
    )
    .await;

    let scores = h.bus.wait_for(&[
        DataType::CodeComplexity,
        DataType::ImportComplexity,
        DataType::SiteComplexity,
    ]);
    h.providers.load_data(ORIGIN, false);

    let values = tokio::time::timeout(WAIT, scores).await.unwrap().unwrap();
    let scores: Vec<f64> = values.iter().map(|v| v.score().unwrap()).collect();
    assert_eq!(scores, vec![30.0, (20.0 + 60.0) / 3.0, 60.0]);

    assert_eq!(h.providers.session_id(), Some(SessionId::new("abc")));
    let cached = h.cache.load().unwrap().unwrap();
    assert_eq!(cached.origin, ORIGIN);
    assert_eq!(cached.id.as_str(), "abc");
}

#[tokio::test]
async fn test_setup_request_carries_force_flag() {
    let h = harness(fast(2_000)).await;

    Mock::given(method("POST"))
        .and(path(action("setup.json")))
        .and(body_partial_json(json!({ "powerscoreURL": ORIGIN, "force": "true" })))
        .respond_with(envelope(json!({ "origin": ORIGIN, "id": "fresh" })))
        .expect(1)
        .mount(&h.server)
        .await;
    seed_cache(&h.cache);

    let setup = h.bus.wait_for(&[DataType::Setup]);
    h.providers.load_data(ORIGIN, true);

    let values = tokio::time::timeout(WAIT, setup).await.unwrap().unwrap();
    assert_eq!(values[0].setup().unwrap().id.as_str(), "fresh");
}

// ── Session cache ───────────────────────────────────────────────────

#[tokio::test]
async fn test_cached_session_skips_setup_action() {
    let h = harness(fast(2_000)).await;

    Mock::given(method("POST"))
        .and(path(action("setup.json")))
        .respond_with(envelope(json!({ "origin": ORIGIN, "id": "other" })))
        .expect(0)
        .mount(&h.server)
        .await;
    mount_file(&h.server, "abc__sitemap.json", json!({ "num_pages": 3 })).await;
    seed_cache(&h.cache);

    let sitemap = h.bus.wait_for(&[DataType::Sitemap]);
    h.providers.load_data(ORIGIN, false);

    let values = tokio::time::timeout(WAIT, sitemap).await.unwrap().unwrap();
    assert_eq!(values[0].sitemap().unwrap().num_pages, 3);
    let setup = h.bus.latest(DataType::Setup).unwrap().unwrap();
    assert_eq!(setup.setup().unwrap().id.as_str(), "abc");
}

// ── Polling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_polled_action_triggers_then_publishes() {
    let h = harness(fast(2_000)).await;
    seed_cache(&h.cache);

    Mock::given(method("GET"))
        .and(path(action("get-file.json")))
        .and(query_param("fileName", "abc__sitemap.json"))
        .respond_with(not_written())
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    mount_file(&h.server, "abc__sitemap.json", json!({ "num_pages": 12 })).await;
    Mock::given(method("POST"))
        .and(path(action("trigger-action.json")))
        .and(body_partial_json(json!({
            "actionName": "powerscore/get-sitemap",
            "fileName": "abc__sitemap.json",
            "powerscoreURL": ORIGIN,
            "id": "abc"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "statusCode": 200 })))
        .expect(1)
        .mount(&h.server)
        .await;

    let sitemap = h.bus.wait_for(&[DataType::Sitemap]);
    h.providers.load_data(ORIGIN, false);

    let values = tokio::time::timeout(WAIT, sitemap).await.unwrap().unwrap();
    assert_eq!(values[0].sitemap().unwrap().num_pages, 12);
}

#[tokio::test]
async fn test_polled_action_times_out() {
    let h = harness(fast(50)).await;
    seed_cache(&h.cache);

    Mock::given(method("GET"))
        .and(path(action("get-file.json")))
        .respond_with(not_written())
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(action("trigger-action.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&h.server)
        .await;

    let sitemap = h.bus.wait_for(&[DataType::Sitemap]);
    h.providers.load_data(ORIGIN, false);

    let err = tokio::time::timeout(WAIT, sitemap).await.unwrap().unwrap_err();
    match err {
        powerscore_core::CoreError::Data(e) => {
            assert_eq!(e.kind, DataErrorKind::Timeout);
            assert_eq!(e.data_type, DataType::Sitemap);
        }
        other => panic!("expected timeout, got {other:?}"),
    }

    // Sampled URLs and templates inherit the timeout.
    let templates = h.bus.latest(DataType::Templates).unwrap().unwrap_err();
    assert_eq!(templates.kind, DataErrorKind::Timeout);
}

#[tokio::test]
async fn test_trigger_failure_fails_data_type() {
    let h = harness(fast(2_000)).await;
    seed_cache(&h.cache);

    Mock::given(method("GET"))
        .and(path(action("get-file.json")))
        .respond_with(not_written())
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(action("trigger-action.json")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&h.server)
        .await;

    let psi = h.bus.wait_for(&[DataType::PsiMobile]);
    h.providers.load_data(ORIGIN, false);

    let err = tokio::time::timeout(WAIT, psi).await.unwrap().unwrap_err();
    assert!(err.to_string().contains("psi failed (backend)"), "{err}");
}

#[tokio::test]
async fn test_shutdown_stops_polling() {
    let h = harness(PollPolicy {
        interval: Duration::from_millis(10),
        max_wait: Duration::from_secs(60),
    })
    .await;
    seed_cache(&h.cache);

    Mock::given(method("GET"))
        .and(path(action("get-file.json")))
        .respond_with(not_written())
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path(action("trigger-action.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&h.server)
        .await;

    h.providers.load_data(ORIGIN, false);
    tokio::time::timeout(WAIT, async {
        while h.providers.active_polls() < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();

    h.providers.shutdown();
    tokio::time::timeout(WAIT, h.providers.join_polls())
        .await
        .unwrap();

    assert_eq!(h.providers.active_polls(), 0);
    assert!(h.bus.latest(DataType::Sitemap).is_none());
    assert!(h.bus.latest(DataType::Psi).is_none());
}

// ── Failure propagation ─────────────────────────────────────────────

#[tokio::test]
async fn test_setup_failure_reaches_every_score() {
    let h = harness(fast(2_000)).await;

    Mock::given(method("POST"))
        .and(path(action("setup.json")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let site = h.bus.wait_for(&[DataType::SiteComplexity]);
    h.providers.load_data(ORIGIN, false);

    let err = tokio::time::timeout(WAIT, site).await.unwrap().unwrap_err();
    assert!(err.to_string().starts_with("setup failed (backend)"), "{err}");

    for data_type in [
        DataType::Sitemap,
        DataType::Dns,
        DataType::RawTraffic,
        DataType::Psi,
        DataType::Templates,
        DataType::CodeComplexity,
        DataType::ImportComplexity,
    ] {
        let err = h.bus.latest(data_type).unwrap().unwrap_err();
        assert_eq!(err.data_type, DataType::Setup, "{data_type}");
    }
    assert!(h.cache.load().unwrap().is_none());
}
