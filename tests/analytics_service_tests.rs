//! Analytics aggregation integration tests against a temporary SQLite
//! database.

use std::sync::Once;

use tempfile::TempDir;

use linkpulse::config::{AppConfig, init_config};
use linkpulse::services::analytics_service;
use linkpulse::services::classifier::ClassifiedClient;
use linkpulse::services::geoip::GeoInfo;
use linkpulse::services::ClassifiedRequest;
use linkpulse::storage::{NewLink, SeaOrmStorage};

static INIT: Once = Once::new();

fn init_static_config() {
    INIT.call_once(|| {
        init_config(AppConfig::default());
    });
}

async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    init_static_config();
    let td = TempDir::new().unwrap();
    let path = td.path().join("analytics_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let storage = SeaOrmStorage::new(&url, 5).await.unwrap();
    (storage, td)
}

async fn seed_link(storage: &SeaOrmStorage, user_id: &str, code: &str) -> i64 {
    storage
        .create_link(NewLink {
            user_id: user_id.to_string(),
            original_url: "https://example.com".to_string(),
            title: Some("Seed".to_string()),
            description: None,
            codes: vec![code.to_string()],
        })
        .await
        .unwrap()
        .link
        .id
}

fn click(device_type: &str, source: &str, city: Option<&str>) -> ClassifiedRequest {
    ClassifiedRequest {
        client: ClassifiedClient {
            device_type: device_type.to_string(),
            device_name: "Test device".to_string(),
            browser: Some("Chrome".to_string()),
            browser_version: None,
            os: Some("Android".to_string()),
            os_version: None,
        },
        source: source.to_string(),
        user_agent: Some("test-agent".to_string()),
        ip: Some("203.0.113.7".to_string()),
        geo: Some(GeoInfo {
            country: Some("VN".to_string()),
            region: None,
            city: city.map(String::from),
        }),
    }
}

#[tokio::test]
async fn test_empty_overview() {
    let (storage, _td) = create_temp_storage().await;

    let overview = analytics_service::overview(&storage, "nobody").await.unwrap();
    assert_eq!(overview.summary.total_links, 0);
    assert_eq!(overview.summary.total_clicks, 0);
    assert_eq!(overview.summary.today_clicks, 0);
    assert_eq!(overview.summary.growth_percent, 0.0);
    assert_eq!(overview.trend7.len(), 7);
    assert_eq!(overview.trend30.len(), 30);
    assert!(overview.trend7.iter().all(|p| p.clicks == 0));
    assert!(overview.devices.is_empty());
    assert!(overview.top_link.is_none());
    assert!(overview.top_links.is_empty());
}

#[tokio::test]
async fn test_overview_counts_and_breakdowns() {
    let (storage, _td) = create_temp_storage().await;
    let link_id = seed_link(&storage, "user-1", "stats1").await;

    for _ in 0..3 {
        storage
            .create_click(link_id, &click("Mobile", "Facebook", Some("TP. Hồ Chí Minh")))
            .await
            .unwrap();
    }
    storage
        .create_click(link_id, &click("Desktop", "Browser: Chrome", Some("Hà Nội")))
        .await
        .unwrap();

    let overview = analytics_service::overview(&storage, "user-1").await.unwrap();
    assert_eq!(overview.summary.total_links, 1);
    assert_eq!(overview.summary.total_clicks, 4);
    assert_eq!(overview.summary.today_clicks, 4);

    // Today is the last trend entry and carries all the clicks
    assert_eq!(overview.trend7.len(), 7);
    assert_eq!(overview.trend7.last().unwrap().clicks, 4);
    assert_eq!(overview.trend30.len(), 30);

    // Device breakdown: Mobile 75%, Desktop 25%, summing to 100
    assert_eq!(overview.devices.len(), 2);
    assert_eq!(overview.devices[0].label, "Mobile");
    assert_eq!(overview.devices[0].count, 3);
    let sum: f64 = overview.devices.iter().map(|s| s.percent).sum();
    assert!((sum - 100.0).abs() < 1e-9);

    // Colors cycle the palette in descending-count order
    assert_eq!(overview.devices[0].color, "#6366F1");
    assert_eq!(overview.devices[1].color, "#10B981");

    assert_eq!(overview.sources[0].label, "Facebook");
    assert_eq!(overview.cities[0].label, "TP. Hồ Chí Minh");
}

#[tokio::test]
async fn test_top_links_ranking_and_ctr() {
    let (storage, _td) = create_temp_storage().await;
    let first = seed_link(&storage, "user-1", "top1").await;
    let second = seed_link(&storage, "user-1", "top2").await;

    for _ in 0..3 {
        storage
            .create_click(first, &click("Mobile", "Zalo", None))
            .await
            .unwrap();
    }
    storage
        .create_click(second, &click("Mobile", "Zalo", None))
        .await
        .unwrap();

    let overview = analytics_service::overview(&storage, "user-1").await.unwrap();

    let top = overview.top_link.unwrap();
    assert_eq!(top.id, first);
    assert_eq!(top.clicks, 3);
    assert_eq!(top.ctr, 75.0);
    assert!(top.short_links.contains(&"http://localhost:4000/top1".to_string()));

    assert_eq!(overview.top_links.len(), 2);
    assert_eq!(overview.top_links[1].id, second);
    assert_eq!(overview.top_links[1].ctr, 25.0);
}

#[tokio::test]
async fn test_inactive_links_excluded_from_analytics() {
    let (storage, _td) = create_temp_storage().await;
    let active = seed_link(&storage, "user-1", "act1").await;
    let hidden = seed_link(&storage, "user-1", "hid1").await;

    storage
        .create_click(active, &click("Mobile", "Zalo", None))
        .await
        .unwrap();
    storage
        .create_click(hidden, &click("Mobile", "Zalo", None))
        .await
        .unwrap();

    storage
        .update_link(
            hidden,
            linkpulse::storage::LinkPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let overview = analytics_service::overview(&storage, "user-1").await.unwrap();
    // The deactivated link drops out of both the click totals and the
    // link count
    assert_eq!(overview.summary.total_links, 1);
    assert_eq!(overview.summary.total_clicks, 1);
}

#[tokio::test]
async fn test_heatmap_empty_and_populated() {
    let (storage, _td) = create_temp_storage().await;

    let empty = analytics_service::heatmap(&storage, "user-1").await.unwrap();
    assert_eq!(empty.matrix.len(), 7);
    assert!(empty.matrix.iter().all(|row| row.is_empty()));

    let link_id = seed_link(&storage, "user-1", "heat1").await;
    storage
        .create_click(link_id, &click("Mobile", "Zalo", None))
        .await
        .unwrap();

    let heatmap = analytics_service::heatmap(&storage, "user-1").await.unwrap();
    assert_eq!(heatmap.matrix.len(), 7);
    assert!(heatmap.matrix.iter().all(|row| row.len() == 24));
    assert!(heatmap
        .matrix
        .iter()
        .flatten()
        .all(|&cell| (0.0..=1.0).contains(&cell)));
    assert!(heatmap.matrix.iter().flatten().any(|&cell| cell == 1.0));
}
