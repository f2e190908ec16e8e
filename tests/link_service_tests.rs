//! Link service integration tests against a temporary SQLite database.

use std::sync::Once;

use tempfile::TempDir;

use linkpulse::config::{AppConfig, init_config};
use linkpulse::errors::LinkpulseError;
use linkpulse::services::link_service::{self, CreateLink};
use linkpulse::storage::{LinkPatch, NewLink, SeaOrmStorage};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config(AppConfig::default());
    });
}

async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let path = td.path().join("link_service_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::new(&url, 5).await.unwrap();
    (storage, td)
}

#[tokio::test]
async fn test_create_link_generates_code() {
    let (storage, _td) = create_temp_storage().await;

    let created = link_service::create_link(
        &storage,
        "user-1",
        CreateLink {
            original_url: "https://example.com/page".to_string(),
            title: Some("Example".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(created.codes.len(), 1);
    assert_eq!(created.codes[0].len(), 6);
    assert!(created.link.is_active);
    assert!(!created.link.is_deleted);

    let found = storage.find_link_by_code(&created.codes[0]).await.unwrap();
    assert_eq!(found.unwrap().id, created.link.id);
}

#[tokio::test]
async fn test_create_link_with_custom_codes() {
    let (storage, _td) = create_temp_storage().await;

    let created = link_service::create_link(
        &storage,
        "user-1",
        CreateLink {
            original_url: "https://example.com".to_string(),
            custom_codes: vec!["fbSummer".to_string(), "zaloSummer".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(created.codes.len(), 2);
    for code in &created.codes {
        let found = storage.find_link_by_code(code).await.unwrap();
        assert_eq!(found.unwrap().id, created.link.id);
    }
}

#[tokio::test]
async fn test_duplicate_custom_code_conflicts() {
    let (storage, _td) = create_temp_storage().await;

    let first = CreateLink {
        original_url: "https://example.com/a".to_string(),
        custom_codes: vec!["taken".to_string()],
        ..Default::default()
    };
    link_service::create_link(&storage, "user-1", first.clone())
        .await
        .unwrap();

    let err = link_service::create_link(&storage, "user-2", first)
        .await
        .unwrap_err();
    assert!(matches!(err, LinkpulseError::Conflict(_)));
}

#[tokio::test]
async fn test_invalid_destination_rejected() {
    let (storage, _td) = create_temp_storage().await;

    let err = link_service::create_link(
        &storage,
        "user-1",
        CreateLink {
            original_url: "javascript:alert(1)".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LinkpulseError::Validation(_)));
}

#[tokio::test]
async fn test_invalid_custom_code_rejected() {
    let (storage, _td) = create_temp_storage().await;

    let err = link_service::create_link(
        &storage,
        "user-1",
        CreateLink {
            original_url: "https://example.com".to_string(),
            custom_codes: vec!["has space".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LinkpulseError::Validation(_)));
}

#[tokio::test]
async fn test_list_links_includes_codes_and_short_links() {
    let (storage, _td) = create_temp_storage().await;

    link_service::create_link(
        &storage,
        "user-1",
        CreateLink {
            original_url: "https://example.com/one".to_string(),
            custom_codes: vec!["one123".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let overviews = link_service::list_links(&storage, "user-1").await.unwrap();
    assert_eq!(overviews.len(), 1);
    assert_eq!(overviews[0].short_codes, vec!["one123"]);
    assert_eq!(
        overviews[0].short_links,
        vec!["http://localhost:4000/one123"]
    );
    assert_eq!(overviews[0].click_count, 0);
}

#[tokio::test]
async fn test_list_excludes_other_users() {
    let (storage, _td) = create_temp_storage().await;

    link_service::create_link(
        &storage,
        "user-1",
        CreateLink {
            original_url: "https://example.com/mine".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let other = link_service::list_links(&storage, "user-2").await.unwrap();
    assert!(other.is_empty());
}

#[tokio::test]
async fn test_update_by_owner() {
    let (storage, _td) = create_temp_storage().await;

    let created = link_service::create_link(
        &storage,
        "user-1",
        CreateLink {
            original_url: "https://example.com".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let updated = link_service::update_link(
        &storage,
        "user-1",
        created.link.id,
        LinkPatch {
            title: Some("New title".to_string()),
            is_active: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.title.as_deref(), Some("New title"));
    assert!(!updated.is_active);
    assert!(updated.updated_at >= created.link.updated_at);
}

#[tokio::test]
async fn test_update_by_non_owner_is_forbidden() {
    let (storage, _td) = create_temp_storage().await;

    let created = link_service::create_link(
        &storage,
        "user-1",
        CreateLink {
            original_url: "https://example.com".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = link_service::update_link(
        &storage,
        "user-2",
        created.link.id,
        LinkPatch {
            title: Some("hijack".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LinkpulseError::Forbidden(_)));
}

#[tokio::test]
async fn test_update_missing_link_is_not_found() {
    let (storage, _td) = create_temp_storage().await;

    let err = link_service::update_link(&storage, "user-1", 9999, LinkPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LinkpulseError::NotFound(_)));
}

#[tokio::test]
async fn test_soft_delete_ends_redirect_eligibility() {
    let (storage, _td) = create_temp_storage().await;

    let created = storage
        .create_link(NewLink {
            user_id: "user-1".to_string(),
            original_url: "https://example.com".to_string(),
            title: None,
            description: None,
            codes: vec!["gone42".to_string()],
        })
        .await
        .unwrap();

    link_service::update_link(
        &storage,
        "user-1",
        created.link.id,
        LinkPatch {
            is_deleted: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // The code still resolves (row is kept) but is no longer redirectable
    let link = storage.find_link_by_code("gone42").await.unwrap().unwrap();
    assert!(!link.is_redirectable());
}
