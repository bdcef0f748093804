//! Tag, profile and root folder resolution.

mod common;

use arrlink::arr::{ProfileKind, Selector, TagRef};
use arrlink::Error;
use assert_matches::assert_matches;
use common::{mount_resources, server_with_version, TagStore};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[tokio::test]
async fn label_and_id_resolve_to_the_same_tag() {
    let server = server_with_version("3.0.0.1").await;
    TagStore::with_labels(&["kids", "4k"]).mount(&server, "/api/v3").await;
    let api = common::api(&server).await;

    let by_label = api
        .resolve_tags(&[TagRef::from("4K")], false)
        .await
        .unwrap();
    let by_id = api.resolve_tags(&[TagRef::from(2)], false).await.unwrap();
    assert_eq!(by_label, vec![2]);
    assert_eq!(by_label, by_id);
}

#[tokio::test]
async fn missing_label_is_created_once_and_stays_stable() {
    let server = server_with_version("3.0.0.1").await;
    let store = TagStore::with_labels(&["kids"]);
    store.mount(&server, "/api/v3").await;
    let api = common::api(&server).await;

    let created = api
        .resolve_tags(
            &[TagRef::from("New-Label"), TagRef::from("new-label")],
            true,
        )
        .await
        .unwrap();
    assert_eq!(created.len(), 1);
    assert_eq!(store.labels(), vec!["kids", "new-label"]);

    let again = api
        .resolve_tags(&[TagRef::from("new-label")], false)
        .await
        .unwrap();
    assert_eq!(again, created);
}

#[tokio::test]
async fn unknown_tags_are_dropped() {
    let server = server_with_version("3.0.0.1").await;
    TagStore::with_labels(&["kids"]).mount(&server, "/api/v3").await;
    let api = common::api(&server).await;

    let ids = api
        .resolve_tags(
            &[TagRef::from("ghost"), TagRef::from(99), TagRef::from("kids")],
            false,
        )
        .await
        .unwrap();
    assert_eq!(ids, vec![1]);
}

#[tokio::test]
async fn empty_tag_list_makes_no_requests() {
    let server = server_with_version("3.0.0.1").await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tag"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    let api = common::api(&server).await;

    assert!(api.resolve_tags(&[], true).await.unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Profiles and root folders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn profile_by_name_or_id() {
    let server = server_with_version("3.0.0.1").await;
    mount_resources(&server, "/api/v3").await;
    let api = common::api(&server).await;

    let by_name = api
        .resolve_profile(ProfileKind::Quality, &Selector::from("HD-1080p"))
        .await
        .unwrap();
    let by_id = api
        .resolve_profile(ProfileKind::Quality, &Selector::from(4))
        .await
        .unwrap();
    assert_eq!(by_name, 4);
    assert_eq!(by_id, 4);
}

#[tokio::test]
async fn unknown_profile_lists_server_options() {
    let server = server_with_version("3.0.0.1").await;
    mount_resources(&server, "/api/v3").await;
    let api = common::api(&server).await;

    let err = api
        .resolve_profile(ProfileKind::Quality, &Selector::from("Ultra-HD"))
        .await
        .unwrap_err();
    match err {
        Error::Invalid {
            title,
            value,
            options,
        } => {
            assert_eq!(title, "Quality Profile");
            assert_eq!(value, "Ultra-HD");
            assert_eq!(options, vec!["Any", "HD-1080p"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn root_folder_by_id_or_path() {
    let server = server_with_version("3.0.0.1").await;
    mount_resources(&server, "/api/v3").await;
    let api = common::api(&server).await;

    assert_eq!(
        api.resolve_root_folder(&Selector::from(2)).await.unwrap(),
        "/tv"
    );
    assert_eq!(
        api.resolve_root_folder(&Selector::from("/movies"))
            .await
            .unwrap(),
        "/movies"
    );
}

#[tokio::test]
async fn unknown_root_folder_is_invalid() {
    let server = server_with_version("3.0.0.1").await;
    mount_resources(&server, "/api/v3").await;
    let api = common::api(&server).await;

    let err = api
        .resolve_root_folder(&Selector::from("/music"))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        Error::Invalid { ref value, ref options, .. }
            if value == "/music" && options == &vec!["/movies".to_string(), "/tv".to_string()]
    );
}
