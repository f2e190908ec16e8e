//! Click insertion and the raw rows behind analytics aggregation.
//!
//! Aggregation itself (zero-filling, timezone bucketing, normalization)
//! happens in the analytics service; this module only fetches counts,
//! grouped counts and timestamps.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::errors::Result;
use crate::services::ClassifiedRequest;
use migration::entities::{ClickEntity, click};

use super::SeaOrmStorage;

/// One grouped-count row for a categorical breakdown.
#[derive(Debug, Clone, FromQueryResult)]
pub struct CategoryCount {
    pub label: Option<String>,
    pub count: i64,
}

/// Which click column a categorical breakdown groups by.
#[derive(Debug, Clone, Copy)]
pub enum ClickCategory {
    DeviceType,
    Source,
    City,
}

impl ClickCategory {
    fn column(self) -> click::Column {
        match self {
            ClickCategory::DeviceType => click::Column::DeviceType,
            ClickCategory::Source => click::Column::Source,
            ClickCategory::City => click::Column::City,
        }
    }
}

impl SeaOrmStorage {
    /// Insert one click row with a server-assigned timestamp.
    pub async fn create_click(&self, link_id: i64, request: &ClassifiedRequest) -> Result<()> {
        let geo = request.geo.clone().unwrap_or_default();

        click::ActiveModel {
            link_id: Set(link_id),
            clicked_at: Set(Utc::now()),
            user_agent: Set(request.user_agent.clone()),
            device_type: Set(Some(request.client.device_type.clone())),
            device_name: Set(Some(request.client.device_name.clone())),
            browser: Set(request.client.browser.clone()),
            os: Set(request.client.os.clone()),
            ip_address: Set(request.ip.clone()),
            country: Set(geo.country),
            region: Set(geo.region),
            city: Set(geo.city),
            source: Set(Some(request.source.clone())),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(())
    }

    pub async fn count_clicks(&self, link_ids: &[i64]) -> Result<u64> {
        if link_ids.is_empty() {
            return Ok(0);
        }

        Ok(ClickEntity::find()
            .filter(click::Column::LinkId.is_in(link_ids.to_vec()))
            .count(&self.db)
            .await?)
    }

    /// Per-link click counts, for the top-N ranking.
    pub async fn count_clicks_per_link(&self, link_ids: &[i64]) -> Result<Vec<(i64, i64)>> {
        if link_ids.is_empty() {
            return Ok(Vec::new());
        }

        #[derive(FromQueryResult)]
        struct Row {
            link_id: i64,
            count: i64,
        }

        let rows = ClickEntity::find()
            .select_only()
            .column(click::Column::LinkId)
            .column_as(click::Column::Id.count(), "count")
            .filter(click::Column::LinkId.is_in(link_ids.to_vec()))
            .group_by(click::Column::LinkId)
            .order_by_desc(Expr::cust("count"))
            .into_model::<Row>()
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| (row.link_id, row.count)).collect())
    }

    /// Click timestamps newer than `since`, in UTC. Bucketing into display
    /// timezone dates happens in the caller.
    pub async fn click_timestamps_since(
        &self,
        link_ids: &[i64],
        since: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>> {
        if link_ids.is_empty() {
            return Ok(Vec::new());
        }

        let timestamps: Vec<DateTime<Utc>> = ClickEntity::find()
            .select_only()
            .column(click::Column::ClickedAt)
            .filter(click::Column::LinkId.is_in(link_ids.to_vec()))
            .filter(click::Column::ClickedAt.gte(since))
            .order_by_asc(click::Column::ClickedAt)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(timestamps)
    }

    /// All click timestamps for the given links, for the heatmap.
    pub async fn all_click_timestamps(&self, link_ids: &[i64]) -> Result<Vec<DateTime<Utc>>> {
        if link_ids.is_empty() {
            return Ok(Vec::new());
        }

        let timestamps: Vec<DateTime<Utc>> = ClickEntity::find()
            .select_only()
            .column(click::Column::ClickedAt)
            .filter(click::Column::LinkId.is_in(link_ids.to_vec()))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(timestamps)
    }

    /// Grouped counts for one categorical breakdown, largest group first.
    pub async fn count_by_category(
        &self,
        link_ids: &[i64],
        category: ClickCategory,
    ) -> Result<Vec<CategoryCount>> {
        if link_ids.is_empty() {
            return Ok(Vec::new());
        }

        let column = category.column();

        Ok(ClickEntity::find()
            .select_only()
            .column_as(column, "label")
            .column_as(click::Column::Id.count(), "count")
            .filter(click::Column::LinkId.is_in(link_ids.to_vec()))
            .group_by(column)
            .order_by_desc(Expr::cust("count"))
            .into_model::<CategoryCount>()
            .all(&self.db)
            .await?)
    }
}
