//! Redirect pipeline integration tests: the full state machine over actix
//! test requests and a temporary SQLite database.

use std::sync::Once;

use actix_web::{App, test, web};
use tempfile::TempDir;

use linkpulse::api;
use linkpulse::config::{AppConfig, init_config};
use linkpulse::services::geoip::GeoIpProvider;
use linkpulse::storage::{NewLink, SeaOrmStorage};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config(AppConfig::default());
    });
}

const ZALO_UA: &str =
    "Mozilla/5.0 (Linux; Android 13) AppleWebKit/537.36 Chrome/117 Mobile Safari/537.36 Zalo android/23.10.01";

async fn create_temp_storage() -> (web::Data<SeaOrmStorage>, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let path = td.path().join("redirect_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::new(&url, 5).await.unwrap();
    (web::Data::new(storage), td)
}

async fn seed_link(storage: &SeaOrmStorage, code: &str, url: &str) -> i64 {
    storage
        .create_link(NewLink {
            user_id: "user-1".to_string(),
            original_url: url.to_string(),
            title: None,
            description: None,
            codes: vec![code.to_string()],
        })
        .await
        .unwrap()
        .link
        .id
}

macro_rules! redirect_app {
    ($storage:expr) => {
        test::init_service(
            App::new()
                .app_data($storage.clone())
                .app_data(web::Data::new(GeoIpProvider::new(
                    &AppConfig::default().analytics,
                )))
                .configure(api::configure_redirect),
        )
        .await
    };
}

#[actix_web::test]
async fn test_happy_path_redirects_and_records() {
    let (storage, _td) = create_temp_storage().await;
    let link_id = seed_link(&storage, "abc123", "https://example.com/landing").await;
    let app = redirect_app!(storage);

    let req = test::TestRequest::get()
        .uri("/abc123")
        .insert_header(("User-Agent", ZALO_UA))
        .insert_header(("X-Forwarded-For", "203.0.113.7"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://example.com/landing"
    );
    assert_eq!(storage.count_clicks(&[link_id]).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_head_request_is_filtered() {
    let (storage, _td) = create_temp_storage().await;
    let link_id = seed_link(&storage, "abc123", "https://example.com").await;
    let app = redirect_app!(storage);

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::HEAD)
        .uri("/abc123")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 412);
    assert_eq!(storage.count_clicks(&[link_id]).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_prefetch_hint_is_filtered() {
    let (storage, _td) = create_temp_storage().await;
    let link_id = seed_link(&storage, "abc123", "https://example.com").await;
    let app = redirect_app!(storage);

    let req = test::TestRequest::get()
        .uri("/abc123")
        .insert_header(("Sec-Purpose", "prefetch"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 412);
    assert_eq!(storage.count_clicks(&[link_id]).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_unknown_code_is_404() {
    let (storage, _td) = create_temp_storage().await;
    let app = redirect_app!(storage);

    let req = test::TestRequest::get().uri("/nosuch").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_deleted_link_is_404() {
    let (storage, _td) = create_temp_storage().await;
    let link_id = seed_link(&storage, "dead42", "https://example.com").await;
    storage
        .update_link(
            link_id,
            linkpulse::storage::LinkPatch {
                is_deleted: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let app = redirect_app!(storage);

    let req = test::TestRequest::get()
        .uri("/dead42")
        .insert_header(("User-Agent", ZALO_UA))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
    assert_eq!(storage.count_clicks(&[link_id]).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_inactive_link_is_404() {
    let (storage, _td) = create_temp_storage().await;
    let link_id = seed_link(&storage, "off42", "https://example.com").await;
    storage
        .update_link(
            link_id,
            linkpulse::storage::LinkPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let app = redirect_app!(storage);

    let req = test::TestRequest::get().uri("/off42").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_malformed_destination_is_400_but_click_recorded() {
    let (storage, _td) = create_temp_storage().await;
    // Inserted directly through storage: a corrupted row the service-level
    // validation would have rejected at creation time
    let link_id = seed_link(&storage, "bad123", "not a url").await;
    let app = redirect_app!(storage);

    let req = test::TestRequest::get()
        .uri("/bad123")
        .insert_header(("User-Agent", ZALO_UA))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Destination validation happens after recording
    assert_eq!(resp.status(), 400);
    assert_eq!(storage.count_clicks(&[link_id]).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_invalid_short_code_is_404() {
    let (storage, _td) = create_temp_storage().await;
    let app = redirect_app!(storage);

    let req = test::TestRequest::get().uri("/has%20space").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
