//! Link and short-code queries

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use crate::errors::{LinkpulseError, Result};
use migration::entities::{LinkEntity, ShortCodeEntity, link, short_code};

use super::SeaOrmStorage;

/// Input for link creation.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user_id: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Short codes to attach; already validated and uniqueness-checked by
    /// the caller
    pub codes: Vec<String>,
}

/// Partial update of a link's mutable fields.
#[derive(Debug, Clone, Default)]
pub struct LinkPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
}

/// A link together with all its short codes.
#[derive(Debug, Clone)]
pub struct LinkWithCodes {
    pub link: link::Model,
    pub codes: Vec<String>,
}

impl SeaOrmStorage {
    /// Resolve a short code to its owning link. Cached; the caller decides
    /// whether the link is redirectable.
    pub async fn find_link_by_code(&self, code: &str) -> Result<Option<link::Model>> {
        if let Some(cached) = self.link_cache.get(code) {
            return Ok(Some(cached));
        }

        let Some(code_row) = ShortCodeEntity::find_by_id(code).one(&self.db).await? else {
            return Ok(None);
        };

        let link = LinkEntity::find_by_id(code_row.link_id).one(&self.db).await?;

        if let Some(ref link) = link {
            self.link_cache.insert(code.to_string(), link.clone());
        }

        Ok(link)
    }

    pub async fn find_link_by_id(&self, id: i64) -> Result<Option<link::Model>> {
        Ok(LinkEntity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn code_exists(&self, code: &str) -> Result<bool> {
        Ok(ShortCodeEntity::find_by_id(code).one(&self.db).await?.is_some())
    }

    /// Insert a link and its short codes. Codes are globally unique; a
    /// duplicate surfaces as a conflict.
    pub async fn create_link(&self, new_link: NewLink) -> Result<LinkWithCodes> {
        let now = Utc::now();

        let link = link::ActiveModel {
            user_id: Set(new_link.user_id),
            original_url: Set(new_link.original_url),
            title: Set(new_link.title),
            description: Set(new_link.description),
            is_active: Set(true),
            is_deleted: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        for code in &new_link.codes {
            short_code::ActiveModel {
                code: Set(code.clone()),
                link_id: Set(link.id),
                created_at: Set(now),
            }
            .insert(&self.db)
            .await
            .map_err(|e| {
                LinkpulseError::conflict(format!("Short code '{}' already exists: {}", code, e))
            })?;
        }

        debug!("Created link {} with {} code(s)", link.id, new_link.codes.len());

        Ok(LinkWithCodes {
            link,
            codes: new_link.codes,
        })
    }

    pub async fn codes_for_link(&self, link_id: i64) -> Result<Vec<String>> {
        let codes = ShortCodeEntity::find()
            .filter(short_code::Column::LinkId.eq(link_id))
            .order_by_asc(short_code::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(codes.into_iter().map(|row| row.code).collect())
    }

    pub async fn codes_for_links(&self, link_ids: &[i64]) -> Result<Vec<short_code::Model>> {
        if link_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(ShortCodeEntity::find()
            .filter(short_code::Column::LinkId.is_in(link_ids.to_vec()))
            .order_by_asc(short_code::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// All of a user's non-deleted links, newest first.
    pub async fn list_links_for_user(&self, user_id: &str) -> Result<Vec<link::Model>> {
        Ok(LinkEntity::find()
            .filter(link::Column::UserId.eq(user_id))
            .filter(link::Column::IsDeleted.eq(false))
            .order_by_desc(link::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Ids of a user's active, non-deleted links (the analytics scope).
    pub async fn redirectable_link_ids_for_user(&self, user_id: &str) -> Result<Vec<i64>> {
        let ids: Vec<i64> = LinkEntity::find()
            .select_only()
            .column(link::Column::Id)
            .filter(link::Column::UserId.eq(user_id))
            .filter(link::Column::IsActive.eq(true))
            .filter(link::Column::IsDeleted.eq(false))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    /// Apply a partial update. The owner check happens in the service layer
    /// before this is called. Invalidate cached code entries for the link.
    pub async fn update_link(&self, id: i64, patch: LinkPatch) -> Result<link::Model> {
        let Some(existing) = LinkEntity::find_by_id(id).one(&self.db).await? else {
            return Err(LinkpulseError::not_found(format!("Link {} not found", id)));
        };

        let mut active: link::ActiveModel = existing.into();
        if let Some(title) = patch.title {
            active.title = Set(Some(title));
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(is_deleted) = patch.is_deleted {
            active.is_deleted = Set(is_deleted);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;

        for code in self.codes_for_link(id).await? {
            self.link_cache.invalidate(&code);
        }

        Ok(updated)
    }
}
