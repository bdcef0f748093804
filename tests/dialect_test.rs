//! Dialect negotiation and response classification against mock servers.

mod common;

use arrlink::arr::{self, ArrClient, LidarrClient, VersionedClient};
use arrlink::config::{ArrConfig, ArrType};
use arrlink::{Dialect, Error};
use assert_matches::assert_matches;
use common::{mount_get, mount_status, server_with_version, API_KEY};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Negotiation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn v3_server_uses_v3_prefix() {
    let server = server_with_version("3.0.10.1567").await;
    let api = common::api(&server).await;

    assert_eq!(api.dialect(), Dialect::V3);
    assert_eq!(api.version(), "3.0.10.1567");
    assert_eq!(
        api.endpoint("movie/lookup"),
        format!("{}/api/v3/movie/lookup", server.uri())
    );
}

#[tokio::test]
async fn v4_server_uses_v3_prefix() {
    let server = server_with_version("4.0.0.700").await;
    let api = common::api(&server).await;

    assert_eq!(api.dialect(), Dialect::V4);
    assert!(api.endpoint("tag").ends_with("/api/v3/tag"));
}

#[tokio::test]
async fn legacy_server_falls_back_to_plain_prefix() {
    let server = MockServer::start().await;
    // No v3 status mock: the probe gets a 404 and retries under /api.
    mount_status(&server, "/api", "2.0.0.5344").await;
    mount_get(&server, "/api/profile", json!([{"id": 1, "name": "Any"}])).await;

    let api = common::api(&server).await;
    assert_eq!(api.dialect(), Dialect::Legacy);
    assert!(api.endpoint("movie").ends_with("/api/movie"));

    let profiles = api.quality_profiles().await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].name(), Some("Any"));
}

#[tokio::test]
async fn forced_v1_ignores_major_version() {
    let server = MockServer::start().await;
    mount_status(&server, "/api/v1", "0.8.1.2135").await;

    let api = VersionedClient::connect(&server.uri(), API_KEY, true)
        .await
        .unwrap();
    assert_eq!(api.dialect(), Dialect::V1);
    assert!(api.endpoint("metadataProfile").ends_with("/api/v1/metadataProfile"));
}

#[tokio::test]
async fn trailing_slash_in_url_is_ignored() {
    let server = server_with_version("3.2.2.5080").await;
    let api = VersionedClient::connect(&format!("{}/", server.uri()), API_KEY, false)
        .await
        .unwrap();
    assert_eq!(api.base_url(), server.uri());
}

#[tokio::test]
async fn missing_version_is_a_connection_failure() {
    let server = MockServer::start().await;
    mount_get(&server, "/api/v3/system/status", json!({"appName": "Radarr"})).await;

    let err = VersionedClient::connect(&server.uri(), API_KEY, false)
        .await
        .unwrap_err();
    assert_matches!(err, Error::ConnectionFailure(_));
}

#[tokio::test]
async fn nothing_answering_is_not_found() {
    let server = MockServer::start().await;
    let err = VersionedClient::connect(&server.uri(), API_KEY, false)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn rejected_key_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(path("/api/v3/system/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = VersionedClient::connect(&server.uri(), "wrong", false)
        .await
        .unwrap_err();
    assert_matches!(err, Error::Unauthorized(_));
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_key_travels_as_query_parameter() {
    let server = server_with_version("3.0.0.1").await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tag"))
        .and(query_param("apikey", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::api(&server).await;
    assert!(api.tags(false).await.unwrap().is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.headers.contains_key("x-api-key")));
}

#[tokio::test]
async fn html_body_is_a_connection_failure() {
    let server = server_with_version("3.0.0.1").await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tag"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>login</body></html>"),
        )
        .mount(&server)
        .await;

    let api = common::api(&server).await;
    assert_matches!(api.tags(false).await, Err(Error::ConnectionFailure(_)));
}

#[tokio::test]
async fn empty_success_body_is_no_content() {
    let server = server_with_version("3.0.0.1").await;
    Mock::given(method("DELETE"))
        .and(path("/api/v3/tag/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = common::api(&server).await;
    api.delete_tag(3).await.unwrap();
}

#[tokio::test]
async fn server_messages_are_extracted() {
    let server = server_with_version("3.0.0.1").await;
    Mock::given(method("POST"))
        .and(path("/api/v3/rootFolder"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([
            {"propertyName": "Path", "errorMessage": "Folder does not exist"},
            {"propertyName": "Path", "errorMessage": "Path is not writable"},
        ])))
        .mount(&server)
        .await;

    let api = common::api(&server).await;
    let err = api.create_root_folder("/nope").await.unwrap_err();
    assert_matches!(
        err,
        Error::Server { status: 400, ref message }
            if message == "Folder does not exist; Path is not writable"
    );
}

#[tokio::test]
async fn missing_item_is_not_found() {
    let server = server_with_version("3.0.0.1").await;
    let api = common::api(&server).await;
    assert_matches!(api.tag(42, false).await, Err(Error::NotFound(_)));
}

#[tokio::test]
async fn tag_detail_is_skipped_on_legacy() {
    let server = MockServer::start().await;
    mount_status(&server, "/api", "2.0.0.5344").await;
    mount_get(&server, "/api/tag", json!([{"id": 1, "label": "kids"}])).await;

    let api = common::api(&server).await;
    let tags = api.tags(true).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert!(!tags[0].is_detailed());
}

// ---------------------------------------------------------------------------
// Configured clients
// ---------------------------------------------------------------------------

#[tokio::test]
async fn v1_client_exposes_shared_resources() {
    let server = MockServer::start().await;
    mount_status(&server, "/api/v1", "1.3.5.3530").await;
    mount_get(
        &server,
        "/api/v1/metadataProfile",
        json!([{"id": 1, "name": "Standard", "minPopularity": 350.0}]),
    )
    .await;

    let lidarr = LidarrClient::connect(&server.uri(), API_KEY).await.unwrap();
    assert_eq!(lidarr.kind(), ArrType::Lidarr);
    assert!(lidarr.test_connection().await.unwrap());

    let profiles = lidarr.metadata_profiles().await.unwrap();
    assert_eq!(profiles[0].name(), Some("Standard"));
    assert_eq!(profiles[0].min_popularity(), Some(350.0));
}

#[tokio::test]
async fn configured_instance_loads_exclusions() {
    let server = server_with_version("3.0.9.1549").await;
    Mock::given(method("GET"))
        .and(path("/api/v3/importlistexclusion"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1, "tvdbId": 81189, "title": "Breaking Bad"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ArrConfig {
        name: "tv".into(),
        arr_type: ArrType::Sonarr,
        url: server.uri(),
        api_key: API_KEY.into(),
        enabled: true,
        timeout_secs: 5,
        respect_exclusions: true,
    };
    let client = arr::connect(&config).await.unwrap();
    assert_eq!(client.kind(), ArrType::Sonarr);
    assert_eq!(client.api().dialect(), Dialect::V3);
}
