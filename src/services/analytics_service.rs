//! Analytics aggregation
//!
//! Read path over stored clicks, scoped to one user's active, non-deleted
//! links. All date bucketing happens here in Rust, in the configured display
//! timezone: storage hands back raw UTC timestamps and grouped counts, and
//! this module does the zero-filling, percentage math, palette assignment
//! and heatmap normalization.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::config::get_config;
use crate::errors::Result;
use crate::storage::{CategoryCount, ClickCategory, SeaOrmStorage};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_links: u64,
    pub total_clicks: u64,
    pub today_clicks: i64,
    /// Day-over-day growth percent; 0 when yesterday had no clicks
    pub growth_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// DD-MM-YYYY in the display timezone
    pub date: String,
    pub clicks: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownSlice {
    pub label: String,
    pub count: i64,
    pub percent: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopLink {
    pub id: i64,
    pub title: Option<String>,
    pub original_url: String,
    pub short_links: Vec<String>,
    pub clicks: i64,
    /// Share of the user's total clicks, whole percent
    pub ctr: f64,
    /// DD/MM/YYYY in the display timezone
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub summary: Summary,
    pub trend7: Vec<TrendPoint>,
    pub trend30: Vec<TrendPoint>,
    pub devices: Vec<BreakdownSlice>,
    pub sources: Vec<BreakdownSlice>,
    pub cities: Vec<BreakdownSlice>,
    pub top_link: Option<TopLink>,
    pub top_links: Vec<TopLink>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    /// 7 rows (Monday first) × 24 hour columns, each cell in [0,1].
    /// All rows are empty when no clicks exist.
    pub matrix: Vec<Vec<f64>>,
}

/// Full dashboard overview for one user.
pub async fn overview(storage: &SeaOrmStorage, user_id: &str) -> Result<AnalyticsOverview> {
    let config = get_config();
    let tz = config.analytics.display_tz();
    let palette = &config.analytics.chart_palette;

    let link_ids = storage.redirectable_link_ids_for_user(user_id).await?;
    let trend_since = Utc::now() - Duration::days(31);

    // Analytics scope is the active, non-deleted links only; the id set
    // fetched above is also the link count
    let total_links = link_ids.len() as u64;

    let (total_clicks, timestamps, devices, sources, cities, per_link) = tokio::try_join!(
        storage.count_clicks(&link_ids),
        storage.click_timestamps_since(&link_ids, trend_since),
        storage.count_by_category(&link_ids, ClickCategory::DeviceType),
        storage.count_by_category(&link_ids, ClickCategory::Source),
        storage.count_by_category(&link_ids, ClickCategory::City),
        storage.count_clicks_per_link(&link_ids),
    )?;

    let today = Utc::now().with_timezone(&tz).date_naive();
    let daily = bucket_by_local_date(&timestamps, tz);

    let today_clicks = *daily.get(&today).unwrap_or(&0);
    let yesterday_clicks = *daily.get(&(today - Duration::days(1))).unwrap_or(&0);

    let top_links = build_top_links(storage, user_id, &per_link, total_clicks, tz).await?;

    debug!(
        user_id,
        total_links, total_clicks, today_clicks, "Analytics overview computed"
    );

    Ok(AnalyticsOverview {
        summary: Summary {
            total_links,
            total_clicks,
            today_clicks,
            growth_percent: growth_percent(today_clicks, yesterday_clicks),
        },
        trend7: build_trend(&daily, today, 7),
        trend30: build_trend(&daily, today, 30),
        devices: build_breakdown(&devices, total_clicks, palette),
        sources: build_breakdown(&sources, total_clicks, palette),
        cities: build_breakdown(&cities, total_clicks, palette),
        top_link: top_links.first().cloned(),
        top_links,
    })
}

/// Day-of-week × hour-of-day heatmap for one user.
pub async fn heatmap(storage: &SeaOrmStorage, user_id: &str) -> Result<Heatmap> {
    let tz = get_config().analytics.display_tz();

    let link_ids = storage.redirectable_link_ids_for_user(user_id).await?;
    let timestamps = storage.all_click_timestamps(&link_ids).await?;

    Ok(Heatmap {
        matrix: build_heatmap(&timestamps, tz),
    })
}

async fn build_top_links(
    storage: &SeaOrmStorage,
    user_id: &str,
    per_link: &[(i64, i64)],
    total_clicks: u64,
    tz: Tz,
) -> Result<Vec<TopLink>> {
    let base_url = get_config().server.base_url.trim_end_matches('/').to_string();

    let links = storage.list_links_for_user(user_id).await?;
    let link_ids: Vec<i64> = links.iter().map(|l| l.id).collect();
    let codes = storage.codes_for_links(&link_ids).await?;

    // per_link is already sorted by count descending
    let top = per_link
        .iter()
        .take(10)
        .filter_map(|(link_id, clicks)| {
            let link = links.iter().find(|l| l.id == *link_id)?;
            let short_links: Vec<String> = codes
                .iter()
                .filter(|row| row.link_id == *link_id)
                .map(|row| format!("{}/{}", base_url, row.code))
                .collect();
            let ctr = if total_clicks == 0 {
                0.0
            } else {
                (*clicks as f64 / total_clicks as f64 * 100.0).round()
            };

            Some(TopLink {
                id: link.id,
                title: link.title.clone(),
                original_url: link.original_url.clone(),
                short_links,
                clicks: *clicks,
                ctr,
                created_at: link
                    .created_at
                    .with_timezone(&tz)
                    .format("%d/%m/%Y")
                    .to_string(),
            })
        })
        .collect();

    Ok(top)
}

/// Count clicks per calendar day of the display timezone.
fn bucket_by_local_date(timestamps: &[DateTime<Utc>], tz: Tz) -> HashMap<NaiveDate, i64> {
    let mut daily: HashMap<NaiveDate, i64> = HashMap::new();
    for ts in timestamps {
        *daily.entry(ts.with_timezone(&tz).date_naive()).or_insert(0) += 1;
    }
    daily
}

/// Contiguous zero-filled series for the trailing `days` calendar days,
/// oldest first, today inclusive.
fn build_trend(daily: &HashMap<NaiveDate, i64>, today: NaiveDate, days: i64) -> Vec<TrendPoint> {
    (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            TrendPoint {
                date: date.format("%d-%m-%Y").to_string(),
                clicks: *daily.get(&date).unwrap_or(&0),
            }
        })
        .collect()
}

fn growth_percent(today: i64, yesterday: i64) -> f64 {
    if yesterday == 0 {
        return 0.0;
    }
    (today - yesterday) as f64 / yesterday as f64 * 100.0
}

/// Percentage-and-color assignment over grouped counts. Rows arrive sorted
/// by count descending, so palette cycling follows that order.
fn build_breakdown(
    rows: &[CategoryCount],
    total_clicks: u64,
    palette: &[String],
) -> Vec<BreakdownSlice> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            let percent = if total_clicks == 0 {
                0.0
            } else {
                row.count as f64 / total_clicks as f64 * 100.0
            };
            BreakdownSlice {
                label: row.label.clone().unwrap_or_else(|| "Unknown".to_string()),
                count: row.count,
                percent,
                color: palette[i % palette.len()].clone(),
            }
        })
        .collect()
}

/// 7×24 click-count matrix (Monday-first rows) normalized by the maximum
/// cell. No clicks yields 7 empty rows rather than a zero matrix.
fn build_heatmap(timestamps: &[DateTime<Utc>], tz: Tz) -> Vec<Vec<f64>> {
    if timestamps.is_empty() {
        return vec![Vec::new(); 7];
    }

    let mut counts = [[0i64; 24]; 7];
    for ts in timestamps {
        let local = ts.with_timezone(&tz);
        let day = local.weekday().num_days_from_monday() as usize;
        let hour = local.hour() as usize;
        counts[day][hour] += 1;
    }

    let max = counts.iter().flatten().copied().max().unwrap_or(1).max(1);

    counts
        .iter()
        .map(|row| row.iter().map(|&c| c as f64 / max as f64).collect())
        .collect()
}
