//! HTTP API tests against an in-process server.

use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tunegate_tests::{
    ApiTestClient, ItunesFixture, MockUpstreams, YouTubeFixture, init_test_logging,
    start_test_server,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn start(upstreams: &MockUpstreams) -> ApiTestClient {
    init_test_logging();
    let (addr, _handle) = start_test_server(&upstreams.service_config())
        .await
        .expect("Failed to start server");
    ApiTestClient::new(addr)
}

#[tokio::test]
async fn test_health_endpoint() {
    let upstreams = MockUpstreams::start().await;
    let client = start(&upstreams).await;

    let health = client.health().await.expect("Health check failed");
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "tunegate-api");
    assert_eq!(health["primary"], "youtube");
    assert!(health["version"].is_string());

    let ready = client.get("/ready").await.expect("Request failed");
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_search_returns_envelope() {
    let upstreams = MockUpstreams::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "despacito"))
        .and(query_param("maxResults", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(YouTubeFixture::search("Despacito", 5)),
        )
        .expect(1)
        .mount(&upstreams.youtube)
        .await;
    let client = start(&upstreams).await;

    let resp = client
        .search(&[("q", "despacito"), ("maxResults", "5"), ("order", "relevance")])
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["origin"], "primary");
    assert_eq!(body["fallback"], false);
    assert_eq!(body["items"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["items"][0]["playbackSource"], "primary");
    assert_eq!(body["items"][0]["durationIso8601"], "PT0S");
    assert_eq!(body["quota"]["limit"], 100);
    assert_eq!(body["quota"]["remaining"], 99);
    assert!(body.get("fallbackReason").is_none());

    let cached = client
        .search(&[("q", "despacito"), ("maxResults", "5")])
        .await
        .expect("Request failed");
    let body: Value = cached.json().await.expect("Failed to parse JSON");
    assert_eq!(body["origin"], "cache");
}

#[tokio::test]
async fn test_post_search_body() {
    let upstreams = MockUpstreams::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "daft punk"))
        .and(query_param("order", "viewCount"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(YouTubeFixture::search("Daft Punk", 3)),
        )
        .mount(&upstreams.youtube)
        .await;
    let client = start(&upstreams).await;

    let resp = client
        .post(
            "/api/v1/search",
            &json!({"query": "play daft punk", "maxResults": 3, "order": "viewCount"}),
        )
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["origin"], "primary");
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let upstreams = MockUpstreams::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(YouTubeFixture::search("x", 1)))
        .expect(0)
        .mount(&upstreams.youtube)
        .await;
    let client = start(&upstreams).await;

    for query in [vec![("q", "   ")], vec![]] {
        let resp = client.search(&query).await.expect("Request failed");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.expect("Failed to parse JSON");
        assert!(body["error"].as_str().is_some_and(|e| e.contains("empty")));
    }
}

#[tokio::test]
async fn test_malformed_body_is_bad_request_envelope() {
    let upstreams = MockUpstreams::start().await;
    let client = start(&upstreams).await;

    for body in [r#"{"query": "daft punk""#, r#"{"query": 42}"#] {
        let resp = client
            .post_raw("/api/v1/search", body)
            .await
            .expect("Request failed");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = resp.json().await.expect("Failed to parse JSON");
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_unknown_order_is_bad_request() {
    let upstreams = MockUpstreams::start().await;
    let client = start(&upstreams).await;

    let resp = client
        .search(&[("q", "despacito"), ("order", "loudness")])
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_degraded_search_is_still_ok() {
    let upstreams = MockUpstreams::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(YouTubeFixture::quota_exceeded()))
        .mount(&upstreams.youtube)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ItunesFixture::search("song", 4)))
        .mount(&upstreams.itunes)
        .await;
    let client = start(&upstreams).await;

    let resp = client
        .search(&[("q", "some song"), ("maxResults", "4")])
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["origin"], "secondary");
    assert_eq!(body["fallback"], true);
    assert_eq!(body["source"], "itunes");
    assert_eq!(body["fallbackReason"], "youtube_error");
    assert_eq!(body["items"][0]["playbackSource"], "secondary");
    assert!(body["items"][0]["previewRef"].is_string());
}

#[tokio::test]
async fn test_placeholder_is_ok() {
    let upstreams = MockUpstreams::start().await;
    for server in [&upstreams.youtube, &upstreams.itunes, &upstreams.deezer] {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(server)
            .await;
    }
    let client = start(&upstreams).await;

    let resp = client.search(&[("q", "lost track")]).await.expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["origin"], "placeholder");
    assert_eq!(body["fallbackReason"], "all_sources_failed");
    assert!(body["items"][0]["title"].as_str().is_some_and(|t| t.contains("lost track")));
}

#[tokio::test]
async fn test_popular_endpoint() {
    let upstreams = MockUpstreams::start().await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(YouTubeFixture::chart(12)))
        .expect(1)
        .mount(&upstreams.youtube)
        .await;
    let client = start(&upstreams).await;

    let resp = client.get("/api/v1/popular").await.expect("Request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["origin"], "primary");
    assert_eq!(body["quota"]["limit"], 20);

    let again: Value = client
        .get("/api/v1/popular")
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Failed to parse JSON");
    assert_eq!(again["origin"], "cache");
}

#[tokio::test]
async fn test_status_reports_buckets_and_outcomes() {
    let upstreams = MockUpstreams::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(YouTubeFixture::search("x", 2)))
        .mount(&upstreams.youtube)
        .await;
    let client = start(&upstreams).await;

    client.search(&[("q", "status check")]).await.expect("Request failed");
    client.search(&[("q", "")]).await.expect("Request failed");

    let body: Value = client
        .get("/api/v1/status")
        .await
        .expect("Request failed")
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(body["primary"], "youtube");
    assert_eq!(body["secondaries"], json!(["itunes", "deezer"]));
    assert_eq!(body["outcomes"]["primary"], 1);
    assert_eq!(body["outcomes"]["invalid"], 1);
    assert_eq!(body["totalServed"], 1);
    assert_eq!(body["cache"]["entries"], 1);

    let buckets = body["quota"].as_array().expect("quota array");
    let search = buckets
        .iter()
        .find(|b| b["bucket"] == "search")
        .expect("search bucket");
    assert_eq!(search["remaining"], 99);
    assert!(buckets.iter().any(|b| b["bucket"] == "listing"));
}
