//! Shared helpers for integration tests.
//!
//! Every test runs the real `reqwest` transport against a [`MockServer`].
//! Requests wiremock has no mock for are answered with 404, which is what
//! the dialect probe relies on to fall back to the legacy layout.

#![allow(dead_code)]

use arrlink::arr::{RadarrClient, SonarrClient, VersionedClient};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const API_KEY: &str = "0123456789abcdef";

/// Start a server whose v3 status endpoint reports `version`.
pub async fn server_with_version(version: &str) -> MockServer {
    let server = MockServer::start().await;
    mount_status(&server, "/api/v3", version).await;
    server
}

pub async fn mount_status(server: &MockServer, prefix: &str, version: &str) {
    Mock::given(method("GET"))
        .and(path(format!("{}/system/status", prefix)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "appName": "Mock",
            "version": version,
            "startTime": "2023-03-01T10:00:00Z",
        })))
        .mount(server)
        .await;
}

pub async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn api(server: &MockServer) -> VersionedClient {
    VersionedClient::connect(&server.uri(), API_KEY, false)
        .await
        .unwrap()
}

pub async fn radarr(server: &MockServer) -> RadarrClient {
    RadarrClient::connect(&server.uri(), API_KEY).await.unwrap()
}

pub async fn sonarr(server: &MockServer) -> SonarrClient {
    SonarrClient::connect(&server.uri(), API_KEY).await.unwrap()
}

// ---------------------------------------------------------------------------
// Shared resources
// ---------------------------------------------------------------------------

/// Root folders `/movies` (1) and `/tv` (2), quality profiles `Any` (1) and
/// `HD-1080p` (4).
pub async fn mount_resources(server: &MockServer, prefix: &str) {
    mount_get(
        server,
        &format!("{}/rootFolder", prefix),
        json!([
            {"id": 1, "path": "/movies", "freeSpace": 1024, "unmappedFolders": []},
            {"id": 2, "path": "/tv", "freeSpace": 2048, "unmappedFolders": []},
        ]),
    )
    .await;
    mount_get(
        server,
        &format!("{}/qualityProfile", prefix),
        json!([
            {"id": 1, "name": "Any"},
            {"id": 4, "name": "HD-1080p"},
        ]),
    )
    .await;
}

/// In-memory tag table served on `{prefix}/tag` for GET and POST.
#[derive(Clone, Default)]
pub struct TagStore {
    tags: Arc<Mutex<Vec<Value>>>,
}

impl TagStore {
    pub fn with_labels(labels: &[&str]) -> Self {
        let tags = labels
            .iter()
            .enumerate()
            .map(|(i, label)| json!({"id": i as i64 + 1, "label": label}))
            .collect();
        Self {
            tags: Arc::new(Mutex::new(tags)),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.tags
            .lock()
            .unwrap()
            .iter()
            .filter_map(|t| t["label"].as_str().map(str::to_string))
            .collect()
    }

    pub async fn mount(&self, server: &MockServer, prefix: &str) {
        let list = self.tags.clone();
        Mock::given(method("GET"))
            .and(path(format!("{}/tag", prefix)))
            .respond_with(move |_: &Request| {
                let tags = list.lock().unwrap().clone();
                ResponseTemplate::new(200).set_body_json(Value::Array(tags))
            })
            .mount(server)
            .await;

        let table = self.tags.clone();
        Mock::given(method("POST"))
            .and(path(format!("{}/tag", prefix)))
            .respond_with(move |request: &Request| {
                let body: Value = serde_json::from_slice(&request.body).unwrap();
                let mut tags = table.lock().unwrap();
                let tag = json!({"id": tags.len() as i64 + 1, "label": body["label"]});
                tags.push(tag.clone());
                ResponseTemplate::new(201).set_body_json(tag)
            })
            .mount(server)
            .await;
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

pub fn movie_json(id: Option<i64>, tmdb_id: i64, title: &str) -> Value {
    let mut movie = json!({
        "title": title,
        "tmdbId": tmdb_id,
        "year": 1979,
        "overview": format!("{} overview", title),
        "monitored": true,
        "tags": [],
    });
    if let Some(id) = id {
        movie["id"] = json!(id);
    }
    movie
}

pub fn series_json(id: Option<i64>, tvdb_id: i64, title: &str) -> Value {
    let mut series = json!({
        "title": title,
        "tvdbId": tvdb_id,
        "year": 2008,
        "monitored": true,
        "seasons": [
            {"seasonNumber": 1, "monitored": true},
            {"seasonNumber": 2, "monitored": true},
        ],
        "tags": [],
    });
    if let Some(id) = id {
        series["id"] = json!(id);
    }
    series
}

/// JSON bodies of every request the server received on `route`.
pub async fn bodies(server: &MockServer, http_method: &str, route: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == http_method && r.url.path() == route)
        .map(|r| serde_json::from_slice(&r.body).unwrap_or(Value::Null))
        .collect()
}
